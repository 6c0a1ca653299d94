//! driftwood - declarative lifecycle management for AWS resources
//!
//! Maps declarative configuration onto AWS API calls through narrow
//! per-resource adapters: composite identifier encoding, finders with a
//! not-found convention, a generic status poller for eventual consistency,
//! and a registry of service packages queried by resource type name.

pub mod aws;
pub mod config;
pub mod error;
pub mod id;
pub mod registry;
pub mod resource;
pub mod schema;
pub mod wait;

pub use error::{LifecycleError, ignore_not_found};
pub use registry::Registry;
pub use resource::{ResourceAdapter, ResourceState};
pub use wait::{Observation, PollConfig, ResourceStatus, poll_status};
