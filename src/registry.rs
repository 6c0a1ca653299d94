//! Resource adapter registry
//!
//! Explicit registry built at process initialization from per-service
//! packages and queried by resource type name. No behavioral logic lives
//! here; the packages are registration manifests.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::aws::context::AwsContext;
use crate::resource::ResourceAdapter;

/// Builds an adapter bound to a loaded AWS context.
pub type AdapterFactory = fn(&AwsContext) -> Arc<dyn ResourceAdapter>;

/// One registered resource type
pub struct ResourceRegistration {
    /// Stable type name, e.g. `aws_eks_access_policy_association`
    pub type_name: &'static str,
    /// Human-readable name, e.g. `Access Policy Association`
    pub name: &'static str,
    pub factory: AdapterFactory,
}

impl std::fmt::Debug for ResourceRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceRegistration")
            .field("type_name", &self.type_name)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Registration manifest for one AWS service
#[derive(Debug)]
pub struct ServicePackage {
    /// Service identifier, e.g. `eks`
    pub service: &'static str,
    /// Resource adapters the service exposes
    pub resources: Vec<ResourceRegistration>,
}

/// Registry of all service packages, queryable by service or type name.
#[derive(Debug)]
pub struct Registry {
    packages: BTreeMap<&'static str, ServicePackage>,
}

impl Registry {
    /// Build the registry from every service package in the crate.
    pub fn bootstrap() -> Self {
        let packages = [
            crate::aws::eks::service_package(),
            crate::aws::elasticache::service_package(),
            crate::aws::qbusiness::service_package(),
            crate::aws::ses::service_package(),
        ];

        Self {
            packages: packages.into_iter().map(|p| (p.service, p)).collect(),
        }
    }

    /// Registered service identifiers, sorted.
    pub fn services(&self) -> impl Iterator<Item = &ServicePackage> {
        self.packages.values()
    }

    /// Look up a service package by its identifier.
    pub fn service(&self, name: &str) -> Option<&ServicePackage> {
        self.packages.get(name)
    }

    /// Look up a resource registration by type name.
    pub fn resource(&self, type_name: &str) -> Option<&ResourceRegistration> {
        self.packages
            .values()
            .flat_map(|p| p.resources.iter())
            .find(|r| r.type_name == type_name)
    }

    /// Instantiate the adapter for a type name against a loaded context.
    pub fn adapter(
        &self,
        type_name: &str,
        ctx: &AwsContext,
    ) -> Option<Arc<dyn ResourceAdapter>> {
        self.resource(type_name).map(|r| (r.factory)(ctx))
    }
}
