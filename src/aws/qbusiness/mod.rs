//! QBusiness service package
//!
//! Finders and status plumbing for QBusiness applications, indices and
//! retrievers. Indices and retrievers are addressed by composite
//! `application_id:index_id` / `application_id:retriever_id` identifiers.

pub mod status;

use crate::error::{LifecycleError, classify_sdk_error};
use crate::id;
use crate::registry::ServicePackage;

pub use status::{
    application_status, index_status, retriever_status, wait_for_application_active,
    wait_for_application_deleted, wait_for_index_active, wait_for_retriever_active,
};

/// Service identifier used in the registry
pub const SERVICE_NAME: &str = "qbusiness";

/// Resources this service registers with the host registry.
///
/// The status waiters are exposed as library functions; no standalone
/// resource adapters are registered here.
pub fn service_package() -> ServicePackage {
    ServicePackage {
        service: SERVICE_NAME,
        resources: vec![],
    }
}

const APPLICATION_LABEL: &str = "QBusiness Application";
const INDEX_LABEL: &str = "QBusiness Index";
const RETRIEVER_LABEL: &str = "QBusiness Retriever";

/// Parse an `application_id:index_id` (or retriever) composite id.
pub fn parse_scoped_id(id: &str) -> Result<(String, String), LifecycleError> {
    let mut parts = id::decode(id, 2)?.into_iter();
    Ok((parts.next().unwrap(), parts.next().unwrap()))
}

/// Point lookup of an application by id, with the not-found convention.
pub async fn find_application_by_id(
    client: &aws_sdk_qbusiness::Client,
    application_id: &str,
) -> Result<aws_sdk_qbusiness::operation::get_application::GetApplicationOutput, LifecycleError> {
    client
        .get_application()
        .application_id(application_id)
        .send()
        .await
        .map_err(|e| classify_sdk_error(&e, APPLICATION_LABEL, application_id))
}

/// Point lookup of an index within an application.
pub async fn find_index_by_id(
    client: &aws_sdk_qbusiness::Client,
    application_id: &str,
    index_id: &str,
) -> Result<aws_sdk_qbusiness::operation::get_index::GetIndexOutput, LifecycleError> {
    client
        .get_index()
        .application_id(application_id)
        .index_id(index_id)
        .send()
        .await
        .map_err(|e| classify_sdk_error(&e, INDEX_LABEL, index_id))
}

/// Point lookup of a retriever within an application.
pub async fn find_retriever_by_id(
    client: &aws_sdk_qbusiness::Client,
    application_id: &str,
    retriever_id: &str,
) -> Result<aws_sdk_qbusiness::operation::get_retriever::GetRetrieverOutput, LifecycleError> {
    client
        .get_retriever()
        .application_id(application_id)
        .retriever_id(retriever_id)
        .send()
        .await
        .map_err(|e| classify_sdk_error(&e, RETRIEVER_LABEL, retriever_id))
}
