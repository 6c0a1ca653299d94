//! Shared AWS configuration context
//!
//! Loads AWS SDK configuration once and hands out service clients built from
//! the same config.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use std::sync::Arc;

/// Shared AWS configuration context for creating service clients.
#[derive(Clone)]
pub struct AwsContext {
    config: Arc<SdkConfig>,
    region: String,
}

impl AwsContext {
    /// Load AWS configuration for the specified region.
    ///
    /// Credentials, region configuration and other SDK settings come from
    /// the environment, config files, and IAM roles.
    pub async fn new(region: &str) -> Self {
        Self::with_profile(region, None).await
    }

    /// Load AWS configuration for the specified region and optional profile.
    pub async fn with_profile(region: &str, profile: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()));
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;

        Self {
            config: Arc::new(config),
            region: region.to_string(),
        }
    }

    /// Get the underlying SDK config for direct client construction.
    pub fn sdk_config(&self) -> &SdkConfig {
        &self.config
    }

    /// Get the region string.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Create an EKS client from this context.
    pub fn eks_client(&self) -> aws_sdk_eks::Client {
        aws_sdk_eks::Client::new(self.sdk_config())
    }

    /// Create a QBusiness client from this context.
    pub fn qbusiness_client(&self) -> aws_sdk_qbusiness::Client {
        aws_sdk_qbusiness::Client::new(self.sdk_config())
    }
}

impl std::fmt::Debug for AwsContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsContext")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

/// Build a typed client wrapper from a pre-loaded context.
pub trait FromAwsContext {
    fn from_context(ctx: &AwsContext) -> Self;
}
