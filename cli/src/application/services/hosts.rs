//! Application service — host preparation for the reachability checks.
//!
//! Resolves every host role to a cloud instance, attaches a fresh key pair to
//! each, and builds the SSH descriptors. Instances that should be private but
//! carry an external IP are reported, not fatal.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{
    CloudCompute, KeyGenerator, KeyPair, ProgressReporter, Provisioner, TerraformOptions,
};
use crate::application::retry::do_with_retry;
use crate::domain::error::HarnessError;
use crate::domain::hosts::unexpected_public_ip_message;
use crate::domain::{HarnessConfig, HostRole, Instance, SshHost};

/// Hosts ready for SSH, plus anything wrong with their exposure.
#[derive(Debug)]
pub struct PreparedHosts {
    pub key: KeyPair,
    pub hosts: BTreeMap<HostRole, SshHost>,
    pub exposure_failures: Vec<String>,
}

/// Resolve instances, provision the key, and build host descriptors.
///
/// # Errors
///
/// Returns an error if an instance output is missing, an instance cannot be
/// fetched, key generation fails, key attachment exhausts its retries, or a
/// role that must be addressed by external IP has none.
#[allow(clippy::too_many_arguments)]
pub async fn prepare_hosts(
    provisioner: &impl Provisioner,
    cloud: &impl CloudCompute,
    keygen: &impl KeyGenerator,
    reporter: &impl ProgressReporter,
    options: &TerraformOptions,
    project: &str,
    key_dir: &Path,
    config: &HarnessConfig,
) -> Result<PreparedHosts> {
    let mut instances: BTreeMap<HostRole, Instance> = BTreeMap::new();
    for role in HostRole::ALL {
        let name = instance_name(provisioner, options, role).await?;
        let instance = cloud
            .fetch_instance(project, &name)
            .await
            .with_context(|| format!("fetching {role} instance '{name}'"))?;
        instances.insert(role, instance);
    }

    reporter.step("generating SSH key pair...");
    let key = keygen
        .generate(key_dir)
        .await
        .context("generating SSH key pair")?;

    reporter.step("attaching SSH key to instances...");
    for instance in instances.values() {
        do_with_retry(
            "Adding SSH Key",
            config.ssh_key_retries,
            config.ssh_key_sleep(),
            || cloud.add_ssh_key(project, instance, &config.ssh_username, &key.public_key),
        )
        .await
        .with_context(|| format!("attaching SSH key to {}", instance.name))?;
    }
    reporter.success(&format!("SSH key attached to {} instances", instances.len()));

    let mut hosts = BTreeMap::new();
    let mut exposure_failures = Vec::new();
    for (role, instance) in &instances {
        if !role.has_public_ip() && instance.public_ip.is_some() {
            let msg = unexpected_public_ip_message(instance);
            reporter.failure(&msg);
            exposure_failures.push(msg);
        }
        let host = SshHost::for_role(*role, instance, &config.ssh_username)
            .with_context(|| format!("building host for role {role}"))?;
        hosts.insert(*role, host);
    }

    Ok(PreparedHosts {
        key,
        hosts,
        exposure_failures,
    })
}

async fn instance_name(
    provisioner: &impl Provisioner,
    options: &TerraformOptions,
    role: HostRole,
) -> Result<String> {
    let key = role.output_key();
    let name = provisioner
        .output(options, key)
        .await
        .with_context(|| format!("reading output {key}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(HarnessError::EmptyOutput(key.to_string()).into());
    }
    Ok(name.to_string())
}
