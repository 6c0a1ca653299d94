//! EKS integration tests - actually call AWS APIs
//!
//! These tests are marked `#[ignore]` and only run with:
//! ```
//! AWS_PROFILE=your_profile \
//! DRIFTWOOD_TEST_CLUSTER=your-cluster \
//! DRIFTWOOD_TEST_PRINCIPAL_ARN=arn:aws:iam::...:role/your-role \
//! cargo test --test eks_integration -- --ignored
//! ```
//!
//! They need an existing EKS cluster and an IAM principal that is safe to
//! associate test policies with.

mod aws_test_helpers;

use aws_test_helpers::*;
use driftwood::aws::eks::AccessPolicyAssociationResource;
use driftwood::resource::{ResourceAdapter, ResourceState};
use serde_json::json;

/// A managed policy that grants read-only visibility, safe for tests
const VIEW_POLICY_ARN: &str = "arn:aws:eks::aws:cluster-access-policy/AmazonEKSViewPolicy";

#[tokio::test]
#[ignore]
async fn access_policy_association_lifecycle() {
    let region = get_test_region();
    let cluster = require_env("DRIFTWOOD_TEST_CLUSTER");
    let principal = require_env("DRIFTWOOD_TEST_PRINCIPAL_ARN");

    let adapter = AccessPolicyAssociationResource::new(&region).await;

    // Create
    let state = adapter
        .create(json!({
            "cluster_name": cluster,
            "principal_arn": principal,
            "policy_arn": VIEW_POLICY_ARN,
            "access_scope": { "type": "cluster" },
        }))
        .await
        .expect("Should associate access policy");
    assert_eq!(state.id, format!("{cluster}:{principal}:{VIEW_POLICY_ARN}"));
    assert!(
        state.attributes.get("associated_at").is_some(),
        "associated_at should be populated from remote state"
    );

    // Read it back via import
    let imported = adapter
        .import(&state.id)
        .await
        .expect("Should import existing association");
    assert_eq!(imported.id, state.id);

    // Delete, then delete again: second delete must succeed (idempotent)
    adapter
        .delete(&state)
        .await
        .expect("Should disassociate access policy");
    adapter
        .delete(&state)
        .await
        .expect("Deleting an absent association should succeed");

    // Drift read on the stale state now reports absence
    let after = adapter
        .read(&ResourceState::with_id(&state.id))
        .await
        .expect("Read of absent association should not error");
    assert!(after.is_none(), "Association should be gone");
}

#[tokio::test]
#[ignore]
async fn read_of_never_created_association_reports_absence() {
    let region = get_test_region();
    let cluster = require_env("DRIFTWOOD_TEST_CLUSTER");
    let principal = require_env("DRIFTWOOD_TEST_PRINCIPAL_ARN");

    let adapter = AccessPolicyAssociationResource::new(&region).await;
    let id = format!(
        "{cluster}:{principal}:arn:aws:eks::aws:cluster-access-policy/AmazonEKSAdminPolicy"
    );

    let result = adapter
        .read(&ResourceState::with_id(&id))
        .await
        .expect("Read should absorb not-found");
    assert!(result.is_none());
}
