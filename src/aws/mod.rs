//! Per-service AWS modules
//!
//! Each service module exposes a `service_package()` registration manifest
//! plus the clients, finders and waiters for the resources it implements:
//! - EKS: access policy association lifecycle
//! - QBusiness: application/index/retriever finders and status waiters
//! - ElastiCache, SES: registry manifests only

pub mod context;
pub mod eks;
pub mod elasticache;
pub mod qbusiness;
pub mod ses;

pub use context::{AwsContext, FromAwsContext};
