//! Runtime configuration types

use std::time::Duration;

use crate::wait::PollConfig;

/// AWS connection settings
#[derive(Debug, Clone)]
pub struct AwsSettings {
    /// AWS region
    pub region: String,
    /// AWS profile name (overrides default credential resolution)
    pub profile: Option<String>,
}

/// Status polling settings
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Maximum total time to wait for a target status, in seconds
    pub timeout_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self { timeout_secs: 600 }
    }
}

/// Configuration for one invocation
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub aws: AwsSettings,
    pub poll: PollSettings,
}

impl RunConfig {
    pub fn region(&self) -> &str {
        &self.aws.region
    }

    pub fn profile(&self) -> Option<&str> {
        self.aws.profile.as_deref()
    }

    /// Poll configuration derived from the settings.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig::with_timeout(Duration::from_secs(self.poll.timeout_secs))
    }
}
