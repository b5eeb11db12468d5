//! Unit tests for the SSH reachability checks against a simulated network.

#![allow(clippy::expect_used)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use netcheck::application::ports::KeyPair;
use netcheck::application::services::reachability::run_reachability_checks;
use netcheck::domain::{
    Expectation, HarnessConfig, HostRole, REACHABILITY_CHECKS, ReachabilityCheck, SshHost,
};

use crate::mocks::{FakeSsh, RecordingReporter, fast_config, topology};

fn hosts() -> BTreeMap<HostRole, SshHost> {
    let instances = topology();
    HostRole::ALL
        .into_iter()
        .map(|role| {
            let instance = &instances[&crate::mocks::instance_name(role)];
            let host = SshHost::for_role(role, instance, "terratest").expect("valid host");
            (role, host)
        })
        .collect()
}

fn key() -> KeyPair {
    KeyPair {
        private_key_path: PathBuf::from("/tmp/keys/id_rsa"),
        public_key: "ssh-rsa AAAA netcheck".to_string(),
    }
}

#[tokio::test]
async fn test_all_checks_pass_on_a_correct_topology() {
    let ssh = FakeSsh::default();
    let reporter = RecordingReporter::default();

    let results = run_reachability_checks(
        &ssh,
        &reporter,
        &hosts(),
        &key(),
        REACHABILITY_CHECKS,
        &fast_config(),
    )
    .await;

    assert_eq!(results.len(), 12);
    let failed: Vec<_> = results.iter().filter(|r| !r.passed()).collect();
    assert!(failed.is_empty(), "unexpected failures: {failed:#?}");
    assert!(reporter.failures().is_empty());
}

#[tokio::test]
async fn test_results_keep_table_order() {
    let results = run_reachability_checks(
        &FakeSsh::default(),
        &RecordingReporter::default(),
        &hosts(),
        &key(),
        REACHABILITY_CHECKS,
        &fast_config(),
    )
    .await;

    let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
    let expected: Vec<&str> = REACHABILITY_CHECKS.iter().map(|c| c.name).collect();
    assert_eq!(names, expected);
}

#[tokio::test]
async fn test_attempts_follow_the_expectation_budget() {
    let config = fast_config();
    let results = run_reachability_checks(
        &FakeSsh::default(),
        &RecordingReporter::default(),
        &hosts(),
        &key(),
        REACHABILITY_CHECKS,
        &config,
    )
    .await;

    for result in &results {
        match result.expect {
            Expectation::Success => assert_eq!(result.attempts, 1, "{}", result.name),
            Expectation::Failure => {
                assert_eq!(
                    result.attempts, config.ssh_max_retries_expect_error,
                    "{}",
                    result.name
                );
                assert!(result.last_error.is_some());
            }
        }
    }
}

#[tokio::test]
async fn test_unreachable_network_fails_every_success_check() {
    let ssh = FakeSsh {
        all_down: true,
        ..FakeSsh::default()
    };
    let reporter = RecordingReporter::default();
    let config = fast_config();

    let results = run_reachability_checks(
        &ssh,
        &reporter,
        &hosts(),
        &key(),
        REACHABILITY_CHECKS,
        &config,
    )
    .await;

    let expected_success = REACHABILITY_CHECKS
        .iter()
        .filter(|c| c.expect == Expectation::Success)
        .count();
    let failed: Vec<_> = results.iter().filter(|r| !r.passed()).collect();
    assert_eq!(failed.len(), expected_success);
    for result in failed {
        assert_eq!(result.attempts, config.ssh_max_retries);
        let msg = result.failure.as_deref().unwrap_or_default();
        assert!(msg.starts_with("Expected success but saw:"), "got: {msg}");
    }
    assert_eq!(reporter.failures().len(), expected_success);
}

#[tokio::test]
async fn test_wrong_echo_is_a_failure() {
    let ssh = FakeSsh {
        reply: "Goodbye\n".to_string(),
        ..FakeSsh::default()
    };
    let checks = [ReachabilityCheck {
        name: "public",
        expect: Expectation::Success,
        route: &[HostRole::Public],
    }];

    let results = run_reachability_checks(
        &ssh,
        &RecordingReporter::default(),
        &hosts(),
        &key(),
        &checks,
        &fast_config(),
    )
    .await;

    let msg = results[0].failure.as_deref().unwrap_or_default();
    assert!(msg.contains("Expected: Hello World. Got: Goodbye"), "got: {msg}");
}

#[tokio::test]
async fn test_unexpected_success_is_a_failure() {
    let checks = [ReachabilityCheck {
        name: "public to private (wrongly expected to fail)",
        expect: Expectation::Failure,
        route: &[HostRole::Public, HostRole::Private],
    }];

    let results = run_reachability_checks(
        &FakeSsh::default(),
        &RecordingReporter::default(),
        &hosts(),
        &key(),
        &checks,
        &fast_config(),
    )
    .await;

    assert_eq!(
        results[0].failure.as_deref(),
        Some("Expected an error but saw none.")
    );
    assert_eq!(results[0].attempts, 1);
}

#[tokio::test]
async fn test_missing_host_fails_without_probing() {
    let ssh = FakeSsh::default();
    let mut hosts = hosts();
    hosts.remove(&HostRole::Private);
    let checks = [ReachabilityCheck {
        name: "public to private",
        expect: Expectation::Success,
        route: &[HostRole::Public, HostRole::Private],
    }];

    let results = run_reachability_checks(
        &ssh,
        &RecordingReporter::default(),
        &hosts,
        &key(),
        &checks,
        &fast_config(),
    )
    .await;

    assert_eq!(results[0].attempts, 0);
    assert!(ssh.attempts.borrow().is_empty());
    let msg = results[0].failure.as_deref().unwrap_or_default();
    assert!(msg.contains("no host prepared for role private"), "got: {msg}");
}

#[tokio::test]
async fn test_checks_run_concurrently() {
    let ssh = FakeSsh::default();
    let config = HarnessConfig {
        ssh_max_retries_expect_error: 1,
        ..fast_config()
    };

    run_reachability_checks(
        &ssh,
        &RecordingReporter::default(),
        &hosts(),
        &key(),
        REACHABILITY_CHECKS,
        &config,
    )
    .await;

    assert!(ssh.max_in_flight.get() > 1, "probes were serialised");
}
