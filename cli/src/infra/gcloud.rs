//! Infrastructure implementation of the `CloudCompute` port on the `gcloud` CLI.

use std::io::Write as _;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::application::ports::{CloudCompute, CommandRunner};
use crate::domain::{Instance, InstanceError};
use crate::infra::command_runner::{DEFAULT_CMD_TIMEOUT, TokioCommandRunner};

const SSH_KEYS_METADATA: &str = "ssh-keys";

// ── gcloud JSON shapes ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Region {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComputeInstance {
    name: String,
    zone: String,
    #[serde(default)]
    network_interfaces: Vec<NetworkInterface>,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NetworkInterface {
    #[serde(default)]
    access_configs: Vec<AccessConfig>,
}

#[derive(Debug, Deserialize)]
struct AccessConfig {
    #[serde(rename = "natIP")]
    nat_ip: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default)]
    items: Vec<MetadataItem>,
}

#[derive(Debug, Deserialize)]
struct MetadataItem {
    key: String,
    #[serde(default)]
    value: String,
}

impl ComputeInstance {
    fn into_instance(self) -> Result<Instance, InstanceError> {
        let zone = zone_name(&self.zone).ok_or_else(|| InstanceError::BadZone {
            name: self.name.clone(),
            zone: self.zone.clone(),
        })?;
        let public_ip = self
            .network_interfaces
            .iter()
            .flat_map(|nic| nic.access_configs.iter())
            .find_map(|ac| ac.nat_ip.clone().filter(|ip| !ip.is_empty()));
        Ok(Instance {
            name: self.name,
            zone,
            public_ip,
        })
    }

    fn ssh_keys(&self) -> &str {
        self.metadata
            .items
            .iter()
            .find(|item| item.key == SSH_KEYS_METADATA)
            .map_or("", |item| item.value.as_str())
    }
}

/// Last path segment of a zone URL, or the value itself if it is already bare.
fn zone_name(zone: &str) -> Option<String> {
    let name = zone.rsplit('/').next()?.trim();
    (!name.is_empty()).then(|| name.to_string())
}

/// Append `line` to an `ssh-keys` metadata value unless it is already there.
#[must_use]
pub fn merge_ssh_keys(existing: &str, line: &str) -> Option<String> {
    if existing.lines().any(|l| l.trim() == line) {
        return None;
    }
    let mut merged = existing.trim_end().to_string();
    if !merged.is_empty() {
        merged.push('\n');
    }
    merged.push_str(line);
    Some(merged)
}

// ── Adapter ───────────────────────────────────────────────────────────────────

/// `CloudCompute` backed by the `gcloud` binary.
pub struct GcloudCompute<R: CommandRunner> {
    runner: R,
    binary: String,
}

impl<R: CommandRunner> GcloudCompute<R> {
    pub fn new(runner: R, binary: &str) -> Self {
        Self {
            runner,
            binary: binary.to_string(),
        }
    }

    /// The underlying command runner.
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    async fn gcloud_json<T: serde::de::DeserializeOwned>(&self, args: &[&str]) -> Result<T> {
        let out = self
            .runner
            .run(&self.binary, args)
            .await
            .with_context(|| format!("gcloud {}", args.join(" ")))?;
        anyhow::ensure!(
            out.status.success(),
            "gcloud {} failed: {}",
            args.join(" "),
            String::from_utf8_lossy(&out.stderr).trim()
        );
        serde_json::from_slice(&out.stdout)
            .with_context(|| format!("parsing output of gcloud {}", args.join(" ")))
    }

    async fn describe(&self, project: &str, instance: &Instance) -> Result<ComputeInstance> {
        self.gcloud_json(&[
            "compute",
            "instances",
            "describe",
            &instance.name,
            "--project",
            project,
            "--zone",
            &instance.zone,
            "--format=json",
        ])
        .await
    }
}

impl GcloudCompute<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner(binary: &str) -> Self {
        Self::new(TokioCommandRunner::new(DEFAULT_CMD_TIMEOUT), binary)
    }
}

impl<R: CommandRunner> CloudCompute for GcloudCompute<R> {
    async fn regions(&self, project: &str) -> Result<Vec<String>> {
        let regions: Vec<Region> = self
            .gcloud_json(&[
                "compute",
                "regions",
                "list",
                "--project",
                project,
                "--format=json",
            ])
            .await?;
        Ok(regions.into_iter().map(|r| r.name).collect())
    }

    async fn fetch_instance(&self, project: &str, name: &str) -> Result<Instance> {
        let filter = format!("--filter=name=({name})");
        let mut found: Vec<ComputeInstance> = self
            .gcloud_json(&[
                "compute",
                "instances",
                "list",
                "--project",
                project,
                &filter,
                "--format=json",
            ])
            .await?;
        // The filter is a regex match; keep exact names only.
        found.retain(|i| i.name == name);
        let instance = found.pop().ok_or_else(|| InstanceError::NotFound {
            name: name.to_string(),
            project: project.to_string(),
        })?;
        Ok(instance.into_instance()?)
    }

    async fn add_ssh_key(
        &self,
        project: &str,
        instance: &Instance,
        username: &str,
        public_key: &str,
    ) -> Result<()> {
        let current = self.describe(project, instance).await?;
        let line = format!("{username}:{}", public_key.trim());
        let Some(merged) = merge_ssh_keys(current.ssh_keys(), &line) else {
            debug!(instance = %instance.name, "ssh key already present");
            return Ok(());
        };

        let mut file = tempfile::NamedTempFile::new().context("creating ssh-keys temp file")?;
        file.write_all(merged.as_bytes())
            .context("writing ssh-keys temp file")?;
        let from_file = format!(
            "--metadata-from-file={SSH_KEYS_METADATA}={}",
            file.path().display()
        );

        let out = self
            .runner
            .run(
                &self.binary,
                &[
                    "compute",
                    "instances",
                    "add-metadata",
                    &instance.name,
                    "--project",
                    project,
                    "--zone",
                    &instance.zone,
                    &from_file,
                ],
            )
            .await
            .context("gcloud compute instances add-metadata")?;
        anyhow::ensure!(
            out.status.success(),
            "adding ssh key to {} failed: {}",
            instance.name,
            String::from_utf8_lossy(&out.stderr).trim()
        );
        Ok(())
    }
}
