//! Error taxonomy and AWS error classification
//!
//! Provides typed errors for resource lifecycle operations using the SDK's
//! `.code()` method instead of string matching on Debug format.

use std::time::Duration;
use thiserror::Error;

use crate::wait::ResourceStatus;

/// Errors produced by lifecycle operations, finders and the status poller.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Input failed validation before any remote call was made
    #[error("invalid configuration: {0}")]
    Validation(String),

    /// A persisted composite identifier could not be parsed
    #[error(
        "unexpected format for identifier '{id}': expected {expected} parts separated by '{separator}'"
    )]
    MalformedIdentifier {
        id: String,
        expected: usize,
        separator: char,
    },

    /// Remote confirms absence (recoverable; read maps this to "removed")
    #[error("{resource_type} '{resource_id}' not found")]
    NotFound {
        resource_type: &'static str,
        resource_id: String,
    },

    /// Resource vanished immediately after a successful create (always fatal)
    #[error("{resource_type} '{resource_id}' not found immediately after creation")]
    PostCreateNotFound {
        resource_type: &'static str,
        resource_id: String,
    },

    /// Retryable remote failure (throttling, transport)
    #[error("transient AWS error{}: {message}", fmt_code(.code))]
    Transient {
        code: Option<String>,
        message: String,
    },

    /// Non-retryable remote failure
    #[error("AWS error{}: {message}", fmt_code(.code))]
    Api {
        code: Option<String>,
        message: String,
    },

    /// Poll deadline exceeded
    #[error("timeout waiting for {resource} after {elapsed:?} ({attempts} attempts)")]
    Timeout {
        resource: String,
        elapsed: Duration,
        attempts: u32,
    },

    /// Remote entity reached a terminal failure status while polling
    #[error("{resource} reached terminal state {status}")]
    FailedState {
        resource: String,
        status: ResourceStatus,
    },

    /// Wait was cancelled via its cancellation token
    #[error("wait for {resource} cancelled")]
    Cancelled { resource: String },

    /// Wrapper annotating a failure with the operation and identifier
    #[error("{op} {resource_type} '{resource_id}'")]
    Operation {
        op: &'static str,
        resource_type: &'static str,
        resource_id: String,
        #[source]
        source: Box<LifecycleError>,
    },
}

fn fmt_code(code: &Option<String>) -> String {
    match code {
        Some(c) => format!(" ({c})"),
        None => String::new(),
    }
}

impl LifecycleError {
    /// Check if this is a "not found" error, looking through operation wrappers.
    pub fn is_not_found(&self) -> bool {
        match self {
            LifecycleError::NotFound { .. } => true,
            LifecycleError::Operation { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            LifecycleError::Transient { .. } => true,
            LifecycleError::Operation { source, .. } => source.is_retryable(),
            _ => false,
        }
    }

    /// Annotate this error with the operation and identifier it belongs to.
    pub fn for_operation(
        self,
        op: &'static str,
        resource_type: &'static str,
        resource_id: impl Into<String>,
    ) -> Self {
        LifecycleError::Operation {
            op,
            resource_type,
            resource_id: resource_id.into(),
            source: Box::new(self),
        }
    }
}

/// Absorb a `NotFound` error, mapping it to `None`.
///
/// Used by idempotent delete (deleting an already-absent entity succeeds)
/// and by drift detection in read.
pub fn ignore_not_found<T>(result: Result<T, LifecycleError>) -> Result<Option<T>, LifecycleError> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// AWS error codes signalling absence
const NOT_FOUND_CODES: &[&str] = &[
    "ResourceNotFoundException",
    "NotFoundException",
    "NoSuchEntity",
];

/// AWS error codes signalling throttling/rate limiting
const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "TooManyRequestsException",
    "RequestLimitExceeded",
];

/// Classify an AWS service error by its error code.
pub fn classify_aws_error(
    code: Option<&str>,
    message: Option<&str>,
    resource_type: &'static str,
    resource_id: &str,
) -> LifecycleError {
    let message = message.unwrap_or("Unknown error").to_string();

    match code {
        Some(c) if NOT_FOUND_CODES.contains(&c) => LifecycleError::NotFound {
            resource_type,
            resource_id: resource_id.to_string(),
        },
        Some(c) if THROTTLING_CODES.contains(&c) => LifecycleError::Transient {
            code: Some(c.to_string()),
            message,
        },
        _ => LifecycleError::Api {
            code: code.map(|s| s.to_string()),
            message,
        },
    }
}

/// Classify an AWS SDK operation error.
///
/// Service errors are classified by code via `ProvideErrorMetadata`; timeouts
/// and dispatch failures (connection refused, DNS) are transient; anything
/// else is a plain API error.
pub fn classify_sdk_error<E, R>(
    err: &aws_sdk_eks::error::SdkError<E, R>,
    resource_type: &'static str,
    resource_id: &str,
) -> LifecycleError
where
    E: aws_sdk_eks::error::ProvideErrorMetadata + std::fmt::Debug,
    R: std::fmt::Debug,
{
    use aws_sdk_eks::error::SdkError;

    match err {
        SdkError::ServiceError(_) => {
            let meta = aws_sdk_eks::error::ProvideErrorMetadata::meta(err);
            classify_aws_error(meta.code(), meta.message(), resource_type, resource_id)
        }
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) => LifecycleError::Transient {
            code: None,
            message: format!("{err:?}"),
        },
        other => LifecycleError::Api {
            code: None,
            message: format!("{other:?}"),
        },
    }
}
