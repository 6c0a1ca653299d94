//! ElastiCache service package
//!
//! Registration manifest only: ElastiCache is a registered service with no
//! resource adapters implemented in this crate yet.

use crate::registry::ServicePackage;

/// Service identifier used in the registry
pub const SERVICE_NAME: &str = "elasticache";

/// Resources this service registers with the host registry.
pub fn service_package() -> ServicePackage {
    ServicePackage {
        service: SERVICE_NAME,
        resources: vec![],
    }
}
