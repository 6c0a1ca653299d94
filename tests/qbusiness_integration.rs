//! QBusiness integration tests - actually call AWS APIs
//!
//! These tests are marked `#[ignore]` and only run with:
//! ```
//! AWS_PROFILE=your_profile \
//! DRIFTWOOD_TEST_QBUSINESS_APP=your-application-id \
//! cargo test --test qbusiness_integration -- --ignored
//! ```

mod aws_test_helpers;

use std::time::Duration;

use aws_test_helpers::*;
use driftwood::aws::context::AwsContext;
use driftwood::aws::qbusiness;
use driftwood::wait::{Observation, PollConfig};

#[tokio::test]
#[ignore]
async fn application_status_observes_existing_application() {
    let ctx = AwsContext::new(&get_test_region()).await;
    let client = ctx.qbusiness_client();
    let app_id = require_env("DRIFTWOOD_TEST_QBUSINESS_APP");

    let obs = qbusiness::application_status(&client, &app_id)
        .await
        .expect("Status refresh should succeed");
    assert!(
        matches!(obs, Observation::Present { .. }),
        "Test application should exist"
    );
}

#[tokio::test]
#[ignore]
async fn wait_for_application_active_returns_quickly_when_already_active() {
    let ctx = AwsContext::new(&get_test_region()).await;
    let client = ctx.qbusiness_client();
    let app_id = require_env("DRIFTWOOD_TEST_QBUSINESS_APP");

    let output = qbusiness::wait_for_application_active(
        &client,
        &app_id,
        PollConfig::with_timeout(Duration::from_secs(60)),
        None,
    )
    .await
    .expect("Application should reach ACTIVE");
    assert_eq!(output.application_id(), Some(app_id.as_str()));
}

#[tokio::test]
#[ignore]
async fn application_status_reports_absence_for_unknown_id() {
    let ctx = AwsContext::new(&get_test_region()).await;
    let client = ctx.qbusiness_client();

    let obs = qbusiness::application_status(&client, "00000000-0000-0000-0000-000000000000")
        .await
        .expect("Not-found should map to absence, not an error");
    assert!(matches!(obs, Observation::Absent));
}
