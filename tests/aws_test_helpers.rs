//! Shared plumbing for the AWS integration tests

/// Region the integration tests run against.
///
/// `AWS_REGION` wins, then `AWS_DEFAULT_REGION`; without either the tests
/// target us-east-2.
pub fn get_test_region() -> String {
    ["AWS_REGION", "AWS_DEFAULT_REGION"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .unwrap_or_else(|| "us-east-2".to_string())
}

/// Read an environment variable the test cannot run without.
pub fn require_env(name: &str) -> String {
    std::env::var(name)
        .unwrap_or_else(|_| panic!("integration test requires {name} to be set"))
}
