//! EKS service package

pub mod access_policy_association;

use std::sync::Arc;

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::registry::{ResourceRegistration, ServicePackage};

pub use access_policy_association::{
    AccessPolicyAssociationResource, AccessScope, find_access_policy_association,
};

/// Service identifier used in the registry
pub const SERVICE_NAME: &str = "eks";

/// Resources this service registers with the host registry.
pub fn service_package() -> ServicePackage {
    ServicePackage {
        service: SERVICE_NAME,
        resources: vec![ResourceRegistration {
            type_name: access_policy_association::TYPE_NAME,
            name: "Access Policy Association",
            factory: |ctx: &AwsContext| Arc::new(AccessPolicyAssociationResource::from_context(ctx)),
        }],
    }
}
