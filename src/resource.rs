//! Resource adapter contract
//!
//! Each resource type implements a four-verb lifecycle (create, read, update,
//! delete) plus import-by-identifier. Configuration crosses the boundary as
//! JSON keyed by schema attribute names and is validated once into a typed
//! struct inside the adapter; thereafter field access is compile-time checked.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LifecycleError;
use crate::schema::ResourceSchema;

/// Working copy of a resource's identity and observed attributes.
///
/// Mutated only by the owning adapter during create/read/delete. The caller
/// clears the identifier (drops the state) when the remote entity is
/// confirmed absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceState {
    /// External composite identifier
    pub id: String,
    /// Observed attributes keyed by schema attribute name
    pub attributes: Value,
    /// Set when this state was just produced by a create call.
    ///
    /// Absence during a read of freshly created state is a remote consistency
    /// anomaly and fatal; absence of pre-existing state is drift.
    #[serde(skip, default)]
    pub freshly_created: bool,
}

impl ResourceState {
    /// State holding only an identifier, e.g. from import or CLI input.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Value::Null,
            freshly_created: false,
        }
    }
}

/// Lifecycle entry points for one resource type.
#[async_trait]
pub trait ResourceAdapter: Send + Sync {
    /// Registry type name, e.g. `aws_eks_access_policy_association`
    fn type_name(&self) -> &'static str;

    /// Human-readable resource name, e.g. `Access Policy Association`
    fn display_name(&self) -> &'static str;

    /// The declarative attribute schema for this resource
    fn schema(&self) -> ResourceSchema;

    /// Validate configuration, issue the remote create call, and read back
    /// the resulting state.
    async fn create(&self, config: Value) -> Result<ResourceState, LifecycleError>;

    /// Refresh state from the remote API.
    ///
    /// Returns `Ok(None)` when the remote confirms absence of a pre-existing
    /// resource (drift: the caller clears its state). Absence immediately
    /// after creation fails with `PostCreateNotFound`.
    async fn read(&self, state: &ResourceState) -> Result<Option<ResourceState>, LifecycleError>;

    /// Apply an in-place update. Resources whose attributes all force
    /// replacement reject this verb.
    async fn update(
        &self,
        _state: &ResourceState,
        _config: Value,
    ) -> Result<ResourceState, LifecycleError> {
        Err(LifecycleError::Validation(format!(
            "{} does not support in-place updates; all attributes force replacement",
            self.type_name()
        )))
    }

    /// Delete the remote entity. Idempotent: an already-absent entity is
    /// success.
    async fn delete(&self, state: &ResourceState) -> Result<(), LifecycleError>;

    /// Parse an external identifier and read the resource it names.
    async fn import(&self, id: &str) -> Result<ResourceState, LifecycleError>;
}
