//! `SKIP_TEST_CLUSTER` policy for suites that need embedded PostgreSQL.

/// Returns true when `SKIP_TEST_CLUSTER` is "1", "true" or "yes"
/// (case-insensitive).
pub fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Skip with a marker when the policy allows it, otherwise fail loudly so CI
/// breakage is not masked.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("order store test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

#[cfg(test)]
mod tests {
    use env_lock::lock_env;
    use rstest::rstest;

    use super::should_skip_test_cluster;

    #[rstest]
    #[case(Some("1"), true)]
    #[case(Some("TRUE"), true)]
    #[case(Some("yes"), true)]
    #[case(Some("0"), false)]
    #[case(None, false)]
    fn skip_policy_reads_environment(#[case] value: Option<&str>, #[case] expected: bool) {
        let _guard = lock_env([("SKIP_TEST_CLUSTER", value)]);
        assert_eq!(should_skip_test_cluster(), expected);
    }
}
