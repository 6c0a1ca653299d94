//! Status refresh functions and waiters for QBusiness entities
//!
//! Each refresh issues one finder call and classifies the result into the
//! shared status domain; absence becomes `Observation::Absent` so the poller
//! can treat it as terminal. Waiters wrap the refreshes in the generic
//! status poller.

use aws_sdk_qbusiness::operation::get_application::GetApplicationOutput;
use aws_sdk_qbusiness::operation::get_index::GetIndexOutput;
use aws_sdk_qbusiness::operation::get_retriever::GetRetrieverOutput;
use tokio_util::sync::CancellationToken;

use crate::error::{LifecycleError, ignore_not_found};
use crate::wait::{Observation, PollConfig, ResourceStatus, poll_status};

use super::{find_application_by_id, find_index_by_id, find_retriever_by_id};

fn observe<T>(entity: Option<T>, status: Option<&str>) -> Observation<T> {
    match entity {
        Some(entity) => Observation::Present {
            entity,
            status: status.map(ResourceStatus::parse).unwrap_or_default(),
        },
        None => Observation::Absent,
    }
}

/// One status observation of an application.
pub async fn application_status(
    client: &aws_sdk_qbusiness::Client,
    application_id: &str,
) -> Result<Observation<GetApplicationOutput>, LifecycleError> {
    let output = ignore_not_found(find_application_by_id(client, application_id).await)?;
    let status = output
        .as_ref()
        .and_then(|o| o.status())
        .map(|s| s.as_str().to_string());
    Ok(observe(output, status.as_deref()))
}

/// One status observation of an index.
pub async fn index_status(
    client: &aws_sdk_qbusiness::Client,
    application_id: &str,
    index_id: &str,
) -> Result<Observation<GetIndexOutput>, LifecycleError> {
    let output = ignore_not_found(find_index_by_id(client, application_id, index_id).await)?;
    let status = output
        .as_ref()
        .and_then(|o| o.status())
        .map(|s| s.as_str().to_string());
    Ok(observe(output, status.as_deref()))
}

/// One status observation of a retriever.
pub async fn retriever_status(
    client: &aws_sdk_qbusiness::Client,
    application_id: &str,
    retriever_id: &str,
) -> Result<Observation<GetRetrieverOutput>, LifecycleError> {
    let output =
        ignore_not_found(find_retriever_by_id(client, application_id, retriever_id).await)?;
    let status = output
        .as_ref()
        .and_then(|o| o.status())
        .map(|s| s.as_str().to_string());
    Ok(observe(output, status.as_deref()))
}

/// Wait until an application reports `ACTIVE`.
pub async fn wait_for_application_active(
    client: &aws_sdk_qbusiness::Client,
    application_id: &str,
    config: PollConfig,
    cancel: Option<&CancellationToken>,
) -> Result<GetApplicationOutput, LifecycleError> {
    let name = format!("QBusiness application {application_id}");
    poll_status(
        config,
        cancel,
        || application_status(client, application_id),
        &[ResourceStatus::Active],
        &name,
    )
    .await?
    .ok_or_else(|| LifecycleError::NotFound {
        resource_type: "QBusiness Application",
        resource_id: application_id.to_string(),
    })
}

/// Wait until an application is gone.
pub async fn wait_for_application_deleted(
    client: &aws_sdk_qbusiness::Client,
    application_id: &str,
    config: PollConfig,
    cancel: Option<&CancellationToken>,
) -> Result<(), LifecycleError> {
    let name = format!("QBusiness application {application_id}");
    poll_status(
        config,
        cancel,
        || application_status(client, application_id),
        &[ResourceStatus::Deleted],
        &name,
    )
    .await?;
    Ok(())
}

/// Wait until an index reports `ACTIVE`.
pub async fn wait_for_index_active(
    client: &aws_sdk_qbusiness::Client,
    application_id: &str,
    index_id: &str,
    config: PollConfig,
    cancel: Option<&CancellationToken>,
) -> Result<GetIndexOutput, LifecycleError> {
    let name = format!("QBusiness index {application_id}:{index_id}");
    poll_status(
        config,
        cancel,
        || index_status(client, application_id, index_id),
        &[ResourceStatus::Active],
        &name,
    )
    .await?
    .ok_or_else(|| LifecycleError::NotFound {
        resource_type: "QBusiness Index",
        resource_id: index_id.to_string(),
    })
}

/// Wait until a retriever reports `ACTIVE`.
pub async fn wait_for_retriever_active(
    client: &aws_sdk_qbusiness::Client,
    application_id: &str,
    retriever_id: &str,
    config: PollConfig,
    cancel: Option<&CancellationToken>,
) -> Result<GetRetrieverOutput, LifecycleError> {
    let name = format!("QBusiness retriever {application_id}:{retriever_id}");
    poll_status(
        config,
        cancel,
        || retriever_status(client, application_id, retriever_id),
        &[ResourceStatus::Active],
        &name,
    )
    .await?
    .ok_or_else(|| LifecycleError::NotFound {
        resource_type: "QBusiness Retriever",
        resource_id: retriever_id.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_qbusiness::types::ApplicationStatus;

    #[test]
    fn remote_status_strings_map_into_the_shared_domain() {
        assert_eq!(
            ResourceStatus::parse(ApplicationStatus::Creating.as_str()),
            ResourceStatus::Creating
        );
        assert_eq!(
            ResourceStatus::parse(ApplicationStatus::Active.as_str()),
            ResourceStatus::Active
        );
        assert_eq!(
            ResourceStatus::parse(ApplicationStatus::Deleting.as_str()),
            ResourceStatus::Deleting
        );
        assert_eq!(
            ResourceStatus::parse(ApplicationStatus::Failed.as_str()),
            ResourceStatus::Failed
        );
        assert_eq!(
            ResourceStatus::parse(ApplicationStatus::Updating.as_str()),
            ResourceStatus::Updating
        );
    }

    #[test]
    fn missing_status_field_is_unknown() {
        let obs = observe(Some("entity"), None);
        assert!(matches!(
            obs,
            Observation::Present {
                status: ResourceStatus::Unknown,
                ..
            }
        ));
    }

    #[test]
    fn absent_entity_observes_absent() {
        let obs: Observation<&str> = observe(None, None);
        assert!(matches!(obs, Observation::Absent));
    }
}
