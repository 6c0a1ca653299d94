//! EKS access policy association lifecycle
//!
//! Associates an EKS access policy with a principal on a cluster. The remote
//! API has no point lookup, so the finder lists associations for the
//! cluster/principal pair and filters by policy ARN client-side. The external
//! id is the composite `cluster_name:principal_arn:policy_arn`.

use std::collections::BTreeSet;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::aws::context::{AwsContext, FromAwsContext};
use crate::error::{LifecycleError, classify_sdk_error, ignore_not_found};
use crate::id;
use crate::resource::{ResourceAdapter, ResourceState};
use crate::schema::{AttrKind, AttributeSchema, ResourceSchema};

/// Registry type name for this resource
pub const TYPE_NAME: &str = "aws_eks_access_policy_association";

/// Resource type label used in error messages
const RESOURCE_LABEL: &str = "EKS Access Policy Association";

/// Components of the composite identifier: cluster, principal ARN, policy ARN
const ID_ARITY: usize = 3;

/// Scope an access policy applies to: the whole cluster or a set of
/// namespaces. Namespace membership is unordered and deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessScope {
    #[serde(rename = "type")]
    pub scope_type: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub namespaces: BTreeSet<String>,
}

/// Desired configuration, validated once at the adapter boundary.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessPolicyAssociationConfig {
    pub cluster_name: String,
    pub principal_arn: String,
    pub policy_arn: String,
    pub access_scope: AccessScope,
}

impl AccessPolicyAssociationConfig {
    fn validate(&self) -> Result<(), LifecycleError> {
        validate_cluster_name(&self.cluster_name)?;
        validate_arn("principal_arn", &self.principal_arn)?;
        validate_arn("policy_arn", &self.policy_arn)?;
        if self.access_scope.scope_type.is_empty() {
            return Err(LifecycleError::Validation(
                "access_scope.type must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// EKS cluster names: 1-100 characters, alphanumeric start, then
/// alphanumerics, dashes and underscores.
fn validate_cluster_name(name: &str) -> Result<(), LifecycleError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() => {
            name.len() <= 100 && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(LifecycleError::Validation(format!(
            "'{name}' is not a valid EKS cluster name"
        )))
    }
}

/// Minimal ARN shape check: `arn:partition:service:region:account:resource`.
fn validate_arn(field: &str, value: &str) -> Result<(), LifecycleError> {
    let sections: Vec<&str> = value.splitn(6, ':').collect();
    let valid = sections.len() == 6
        && sections[0] == "arn"
        && !sections[1].is_empty()
        && !sections[2].is_empty()
        && !sections[5].is_empty();
    if valid {
        Ok(())
    } else {
        Err(LifecycleError::Validation(format!(
            "{field}: '{value}' is not a valid ARN"
        )))
    }
}

/// Compute the composite external id for an association.
pub fn association_id(
    cluster_name: &str,
    principal_arn: &str,
    policy_arn: &str,
) -> Result<String, LifecycleError> {
    id::encode(&[cluster_name, principal_arn, policy_arn])
}

/// Parse an external id back into (cluster_name, principal_arn, policy_arn).
pub fn parse_association_id(id: &str) -> Result<(String, String, String), LifecycleError> {
    let mut parts = id::decode(id, ID_ARITY)?.into_iter();
    // decode guarantees exactly ID_ARITY parts
    Ok((
        parts.next().unwrap(),
        parts.next().unwrap(),
        parts.next().unwrap(),
    ))
}

/// Find one association by cluster, principal and policy.
///
/// The API lacks a point lookup, so this lists associations for the
/// cluster/principal pair and filters by policy ARN. Absence (explicit
/// not-found, empty list, or no match) is `NotFound`; other remote failures
/// are classified for the caller to retry or surface.
pub async fn find_access_policy_association(
    client: &aws_sdk_eks::Client,
    cluster_name: &str,
    principal_arn: &str,
    policy_arn: &str,
) -> Result<aws_sdk_eks::types::AssociatedAccessPolicy, LifecycleError> {
    let resource_id = association_id(cluster_name, principal_arn, policy_arn)?;

    let output = client
        .list_associated_access_policies()
        .cluster_name(cluster_name)
        .principal_arn(principal_arn)
        .send()
        .await
        .map_err(|e| classify_sdk_error(&e, RESOURCE_LABEL, &resource_id))?;

    output
        .associated_access_policies()
        .iter()
        .find(|p| p.policy_arn() == Some(policy_arn))
        .cloned()
        .ok_or_else(|| LifecycleError::NotFound {
            resource_type: RESOURCE_LABEL,
            resource_id,
        })
}

/// Map the wire access scope onto the attribute representation.
///
/// An absent wire object maps to `None`, never an error.
fn flatten_access_scope(scope: Option<&aws_sdk_eks::types::AccessScope>) -> Option<AccessScope> {
    scope.map(|s| AccessScope {
        scope_type: s
            .r#type()
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
        namespaces: s.namespaces().iter().cloned().collect(),
    })
}

/// Map the attribute representation onto the wire access scope.
fn expand_access_scope(scope: &AccessScope) -> aws_sdk_eks::types::AccessScope {
    let mut builder = aws_sdk_eks::types::AccessScope::builder()
        .r#type(aws_sdk_eks::types::AccessScopeType::from(
            scope.scope_type.as_str(),
        ));
    if !scope.namespaces.is_empty() {
        builder = builder.set_namespaces(Some(scope.namespaces.iter().cloned().collect()));
    }
    builder.build()
}

fn format_timestamp(ts: Option<&aws_sdk_eks::primitives::DateTime>) -> Option<String> {
    ts.and_then(|dt| DateTime::<Utc>::from_timestamp(dt.secs(), dt.subsec_nanos()))
        .map(|dt| dt.to_rfc3339())
}

/// Absence outcome for read: drift clears state, a post-create vanish is a
/// remote consistency anomaly and fatal.
fn on_absent(state: &ResourceState) -> Result<Option<ResourceState>, LifecycleError> {
    if state.freshly_created {
        return Err(LifecycleError::PostCreateNotFound {
            resource_type: RESOURCE_LABEL,
            resource_id: state.id.clone(),
        });
    }
    warn!(id = %state.id, "Access policy association not found, removing from state");
    Ok(None)
}

/// Attribute schema for this resource. Every configuration attribute forces
/// replacement; the association has no in-place update.
fn resource_schema() -> ResourceSchema {
    ResourceSchema::new(vec![
        AttributeSchema::required("access_scope", AttrKind::Block)
            .force_new()
            .with_nested(vec![
                AttributeSchema::required("type", AttrKind::String).force_new(),
                AttributeSchema::optional("namespaces", AttrKind::StringSet).force_new(),
            ]),
        AttributeSchema::required("cluster_name", AttrKind::String).force_new(),
        AttributeSchema::required("policy_arn", AttrKind::String).force_new(),
        AttributeSchema::required("principal_arn", AttrKind::String).force_new(),
        AttributeSchema::computed("associated_at", AttrKind::String),
        AttributeSchema::computed("modified_at", AttrKind::String),
    ])
}

/// Lifecycle adapter for `aws_eks_access_policy_association`.
pub struct AccessPolicyAssociationResource {
    client: aws_sdk_eks::Client,
}

impl FromAwsContext for AccessPolicyAssociationResource {
    fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.eks_client(),
        }
    }
}

impl AccessPolicyAssociationResource {
    /// Create an adapter for the given region.
    pub async fn new(region: &str) -> Self {
        Self::from_context(&AwsContext::new(region).await)
    }

    async fn do_associate(
        &self,
        config: &AccessPolicyAssociationConfig,
        resource_id: &str,
    ) -> Result<(), LifecycleError> {
        self.client
            .associate_access_policy()
            .cluster_name(&config.cluster_name)
            .principal_arn(&config.principal_arn)
            .policy_arn(&config.policy_arn)
            .access_scope(expand_access_scope(&config.access_scope))
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, RESOURCE_LABEL, resource_id))?;
        Ok(())
    }

    async fn create_association(
        &self,
        config: AccessPolicyAssociationConfig,
    ) -> Result<ResourceState, LifecycleError> {
        config.validate()?;
        let resource_id = association_id(
            &config.cluster_name,
            &config.principal_arn,
            &config.policy_arn,
        )?;

        info!(
            cluster = %config.cluster_name,
            principal = %config.principal_arn,
            policy = %config.policy_arn,
            "Associating access policy"
        );

        // Only throttling-classified errors are retried; idempotency of the
        // mutation itself is the remote API's responsibility.
        (|| async { self.do_associate(&config, &resource_id).await })
            .retry(
                ExponentialBuilder::default()
                    .with_min_delay(Duration::from_secs(2))
                    .with_max_delay(Duration::from_secs(30))
                    .with_max_times(5),
            )
            .when(LifecycleError::is_retryable)
            .notify(|e, dur| {
                warn!(delay = ?dur, error = %e, "Transient error associating access policy, retrying");
            })
            .await
            .map_err(|e| e.for_operation("creating", RESOURCE_LABEL, resource_id.clone()))?;

        let state = ResourceState {
            id: resource_id.clone(),
            attributes: Value::Null,
            freshly_created: true,
        };
        self.read_association(&state).await?.ok_or_else(|| {
            // read maps post-create absence to an error, so this is unreachable
            // unless the remote returned an empty snapshot
            LifecycleError::PostCreateNotFound {
                resource_type: RESOURCE_LABEL,
                resource_id,
            }
        })
    }

    async fn read_association(
        &self,
        state: &ResourceState,
    ) -> Result<Option<ResourceState>, LifecycleError> {
        let (cluster_name, principal_arn, policy_arn) = parse_association_id(&state.id)
            .map_err(|e| e.for_operation("reading", RESOURCE_LABEL, state.id.clone()))?;

        let found = ignore_not_found(
            find_access_policy_association(
                &self.client,
                &cluster_name,
                &principal_arn,
                &policy_arn,
            )
            .await,
        )
        .map_err(|e| e.for_operation("reading", RESOURCE_LABEL, state.id.clone()))?;

        let Some(association) = found else {
            return on_absent(state);
        };

        let attributes = json!({
            "cluster_name": cluster_name,
            "principal_arn": principal_arn,
            "policy_arn": policy_arn,
            "access_scope": flatten_access_scope(association.access_scope()),
            "associated_at": format_timestamp(association.associated_at()),
            "modified_at": format_timestamp(association.modified_at()),
        });

        Ok(Some(ResourceState {
            id: state.id.clone(),
            attributes,
            freshly_created: state.freshly_created,
        }))
    }

    async fn delete_association(&self, state: &ResourceState) -> Result<(), LifecycleError> {
        let (cluster_name, principal_arn, policy_arn) = parse_association_id(&state.id)
            .map_err(|e| e.for_operation("deleting", RESOURCE_LABEL, state.id.clone()))?;

        debug!(id = %state.id, "Disassociating access policy");

        let result = self
            .client
            .disassociate_access_policy()
            .cluster_name(&cluster_name)
            .principal_arn(&principal_arn)
            .policy_arn(&policy_arn)
            .send()
            .await
            .map(|_| ())
            .map_err(|e| classify_sdk_error(&e, RESOURCE_LABEL, &state.id));

        // Delete is idempotent: an already-absent association is success.
        match ignore_not_found(result)
            .map_err(|e| e.for_operation("deleting", RESOURCE_LABEL, state.id.clone()))?
        {
            Some(()) => Ok(()),
            None => {
                debug!(id = %state.id, "Access policy association already gone");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ResourceAdapter for AccessPolicyAssociationResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn display_name(&self) -> &'static str {
        "Access Policy Association"
    }

    fn schema(&self) -> ResourceSchema {
        resource_schema()
    }

    async fn create(&self, config: Value) -> Result<ResourceState, LifecycleError> {
        let config: AccessPolicyAssociationConfig = serde_json::from_value(config)
            .map_err(|e| LifecycleError::Validation(format!("bad configuration shape: {e}")))?;
        self.create_association(config).await
    }

    async fn read(&self, state: &ResourceState) -> Result<Option<ResourceState>, LifecycleError> {
        self.read_association(state).await
    }

    async fn delete(&self, state: &ResourceState) -> Result<(), LifecycleError> {
        self.delete_association(state).await
    }

    async fn import(&self, id: &str) -> Result<ResourceState, LifecycleError> {
        parse_association_id(id)
            .map_err(|e| e.for_operation("importing", RESOURCE_LABEL, id.to_string()))?;
        let state = ResourceState::with_id(id);
        self.read_association(&state)
            .await?
            .ok_or_else(|| LifecycleError::NotFound {
                resource_type: RESOURCE_LABEL,
                resource_id: id.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLUSTER: &str = "cluster-a";
    const PRINCIPAL: &str = "arn:aws:iam::1:role/x";
    const POLICY: &str = "arn:aws:iam::1:policy/y";

    fn scope(namespaces: &[&str]) -> AccessScope {
        AccessScope {
            scope_type: "namespace".to_string(),
            namespaces: namespaces.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn id_round_trip() {
        let id = association_id(CLUSTER, PRINCIPAL, POLICY).unwrap();
        assert_eq!(id, "cluster-a:arn:aws:iam::1:role/x:arn:aws:iam::1:policy/y");

        let (cluster, principal, policy) = parse_association_id(&id).unwrap();
        assert_eq!(cluster, CLUSTER);
        assert_eq!(principal, PRINCIPAL);
        assert_eq!(policy, POLICY);
    }

    #[test]
    fn parse_rejects_wrong_segment_count() {
        assert!(matches!(
            parse_association_id("cluster-a:arn:aws:iam::1:role/x"),
            Err(LifecycleError::MalformedIdentifier { .. })
        ));
        // Extra segments before the ARNs must not merge into the cluster name
        assert!(matches!(
            parse_association_id("a:b:c:arn:aws:iam::1:role/x:arn:aws:iam::1:policy/y"),
            Err(LifecycleError::MalformedIdentifier { .. })
        ));
    }

    #[test]
    fn cluster_name_validation() {
        assert!(validate_cluster_name("cluster-a").is_ok());
        assert!(validate_cluster_name("0abc_DEF-1").is_ok());
        assert!(validate_cluster_name("").is_err());
        assert!(validate_cluster_name("-leading-dash").is_err());
        assert!(validate_cluster_name("has space").is_err());
        assert!(validate_cluster_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn arn_validation() {
        assert!(validate_arn("policy_arn", POLICY).is_ok());
        assert!(validate_arn("policy_arn", "not-an-arn").is_err());
        assert!(validate_arn("policy_arn", "arn:aws:iam").is_err());
        assert!(validate_arn("policy_arn", "arn::iam::1:policy/y").is_err());
    }

    #[test]
    fn config_validation() {
        let config = AccessPolicyAssociationConfig {
            cluster_name: CLUSTER.to_string(),
            principal_arn: PRINCIPAL.to_string(),
            policy_arn: POLICY.to_string(),
            access_scope: scope(&["default"]),
        };
        assert!(config.validate().is_ok());

        let bad = AccessPolicyAssociationConfig {
            access_scope: AccessScope {
                scope_type: String::new(),
                namespaces: BTreeSet::new(),
            },
            ..config
        };
        assert!(matches!(
            bad.validate(),
            Err(LifecycleError::Validation(_))
        ));
    }

    #[test]
    fn flatten_absent_scope_is_empty_not_an_error() {
        assert_eq!(flatten_access_scope(None), None);
    }

    #[test]
    fn scope_round_trip_deduplicates_namespaces() {
        let expanded = expand_access_scope(&scope(&["kube-system", "default", "default"]));
        let flattened = flatten_access_scope(Some(&expanded)).unwrap();
        assert_eq!(flattened.scope_type, "namespace");
        assert_eq!(
            flattened.namespaces.iter().collect::<Vec<_>>(),
            vec!["default", "kube-system"]
        );
    }

    #[test]
    fn expand_cluster_scope_omits_namespaces() {
        let expanded = expand_access_scope(&AccessScope {
            scope_type: "cluster".to_string(),
            namespaces: BTreeSet::new(),
        });
        assert!(expanded.namespaces().is_empty());
    }

    #[test]
    fn absence_after_create_is_fatal() {
        let state = ResourceState {
            id: "cluster-a:arn:aws:iam::1:role/x:arn:aws:iam::1:policy/y".to_string(),
            attributes: Value::Null,
            freshly_created: true,
        };
        assert!(matches!(
            on_absent(&state),
            Err(LifecycleError::PostCreateNotFound { .. })
        ));
    }

    #[test]
    fn absence_of_pre_existing_state_clears_silently() {
        let state =
            ResourceState::with_id("cluster-a:arn:aws:iam::1:role/x:arn:aws:iam::1:policy/y");
        assert!(matches!(on_absent(&state), Ok(None)));
    }

    #[test]
    fn schema_flags_match_contract() {
        let schema = resource_schema();

        for name in ["access_scope", "cluster_name", "policy_arn", "principal_arn"] {
            let attr = schema.attribute(name).unwrap();
            assert!(attr.required, "{name} should be required");
            assert!(attr.force_new, "{name} should force replacement");
        }

        for name in ["associated_at", "modified_at"] {
            let attr = schema.attribute(name).unwrap();
            assert!(attr.computed, "{name} should be computed");
        }

        let scope = schema.attribute("access_scope").unwrap();
        assert_eq!(scope.kind, AttrKind::Block);
        let namespaces = scope.nested.iter().find(|a| a.name == "namespaces").unwrap();
        assert_eq!(namespaces.kind, AttrKind::StringSet);
        assert!(!namespaces.required);
    }
}
