//! Application service — SSH reachability checks.
//!
//! All checks run concurrently and the call returns only once every one of
//! them has finished, so teardown never races a probe.

use std::cell::Cell;
use std::collections::BTreeMap;

use futures_util::future::join_all;

use crate::application::ports::{KeyPair, ProgressReporter, SshClient};
use crate::application::retry::do_with_retry;
use crate::domain::reachability::{echo_command, verdict, verify_echo};
use crate::domain::{HarnessConfig, HostRole, ReachabilityCheck, ReachabilityResult, SshHost};

/// Run `checks` against `hosts` and judge each one.
pub async fn run_reachability_checks(
    ssh: &impl SshClient,
    reporter: &impl ProgressReporter,
    hosts: &BTreeMap<HostRole, SshHost>,
    key: &KeyPair,
    checks: &[ReachabilityCheck],
    config: &HarnessConfig,
) -> Vec<ReachabilityResult> {
    let runs = checks
        .iter()
        .map(|check| run_check(ssh, hosts, key, check, config));
    let results = join_all(runs).await;

    for result in &results {
        match &result.failure {
            None => reporter.success(&format!("ssh {}", result.name)),
            Some(msg) => reporter.failure(&format!("ssh {}: {msg}", result.name)),
        }
    }
    results
}

async fn run_check(
    ssh: &impl SshClient,
    hosts: &BTreeMap<HostRole, SshHost>,
    key: &KeyPair,
    check: &ReachabilityCheck,
    config: &HarnessConfig,
) -> ReachabilityResult {
    let attempts = Cell::new(0);
    let outcome = match resolve_route(hosts, check.route) {
        Ok(route) => probe(ssh, &route, key, check, config, &attempts).await,
        Err(e) => Err(e),
    };
    ReachabilityResult {
        name: check.name.to_string(),
        expect: check.expect,
        route: check.route.to_vec(),
        attempts: attempts.get(),
        failure: verdict(check.expect, &outcome),
        last_error: outcome.err(),
    }
}

async fn probe(
    ssh: &impl SshClient,
    route: &[SshHost],
    key: &KeyPair,
    check: &ReachabilityCheck,
    config: &HarnessConfig,
    attempts: &Cell<u32>,
) -> Result<(), String> {
    let command = echo_command(&config.echo_text);
    let command = command.as_str();
    let echo_text = config.echo_text.as_str();
    let max_retries = config.ssh_retries_for(check.expect.expects_success());

    do_with_retry(
        "Attempting to SSH",
        max_retries,
        config.ssh_sleep_between_retries(),
        || {
            attempts.set(attempts.get() + 1);
            async move {
                let output = ssh.run(route, key, command).await?;
                verify_echo(echo_text, &output).map_err(anyhow::Error::msg)
            }
        },
    )
    .await
    .map_err(|e| e.to_string())
}

fn resolve_route(
    hosts: &BTreeMap<HostRole, SshHost>,
    roles: &[HostRole],
) -> Result<Vec<SshHost>, String> {
    roles
        .iter()
        .map(|role| {
            hosts
                .get(role)
                .cloned()
                .ok_or_else(|| format!("no host prepared for role {role}"))
        })
        .collect()
}
