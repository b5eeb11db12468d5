//! Domain types and validators for harness configuration.
//!
//! Pure functions only, with no I/O or async.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration, usually read from `netcheck.yaml`.
///
/// Every field has a default so partial files are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HarnessConfig {
    /// Tree copied into the temporary workspace.
    pub root_dir: PathBuf,
    /// Terraform root module, relative to `root_dir`.
    pub module_dir: PathBuf,
    /// Login user written into instance `ssh-keys` metadata.
    pub ssh_username: String,
    /// Text echoed back by every reachability probe.
    pub echo_text: String,
    /// Attempts for checks expected to succeed.
    pub ssh_max_retries: u32,
    /// Attempts for checks expected to fail.
    pub ssh_max_retries_expect_error: u32,
    pub ssh_sleep_between_retries_secs: u64,
    /// Attempts for attaching the key to one instance.
    pub ssh_key_retries: u32,
    pub ssh_key_sleep_secs: u64,
    pub ssh_connect_timeout_secs: u64,
    pub terraform_bin: String,
    pub gcloud_bin: String,
    pub terraform_max_retries: u32,
    pub terraform_sleep_between_retries_secs: u64,
    /// When non-empty, the random region is drawn from this list only.
    pub approved_regions: Vec<String>,
    pub forbidden_regions: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            module_dir: PathBuf::from("examples").join("network-management"),
            ssh_username: "terratest".to_string(),
            echo_text: "Hello World".to_string(),
            ssh_max_retries: 40,
            ssh_max_retries_expect_error: 3,
            ssh_sleep_between_retries_secs: 5,
            ssh_key_retries: 20,
            ssh_key_sleep_secs: 1,
            ssh_connect_timeout_secs: 10,
            terraform_bin: "terraform".to_string(),
            gcloud_bin: "gcloud".to_string(),
            terraform_max_retries: 3,
            terraform_sleep_between_retries_secs: 5,
            approved_regions: Vec::new(),
            forbidden_regions: Vec::new(),
        }
    }
}

impl HarnessConfig {
    #[must_use]
    pub fn ssh_sleep_between_retries(&self) -> Duration {
        Duration::from_secs(self.ssh_sleep_between_retries_secs)
    }

    #[must_use]
    pub fn ssh_key_sleep(&self) -> Duration {
        Duration::from_secs(self.ssh_key_sleep_secs)
    }

    #[must_use]
    pub fn ssh_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.ssh_connect_timeout_secs)
    }

    #[must_use]
    pub fn terraform_sleep_between_retries(&self) -> Duration {
        Duration::from_secs(self.terraform_sleep_between_retries_secs)
    }

    /// Retry budget for a reachability check with the given expectation.
    #[must_use]
    pub fn ssh_retries_for(&self, expect_success: bool) -> u32 {
        if expect_success {
            self.ssh_max_retries
        } else {
            self.ssh_max_retries_expect_error
        }
    }
}

// ── Validators ───────────────────────────────────────────────────────────────

/// Validates a loaded configuration.
///
/// # Errors
///
/// Returns the first [`ConfigError`] found.
pub fn validate_config(config: &HarnessConfig) -> Result<()> {
    let user_re = Regex::new(r"^[a-z_][a-z0-9_-]*$")?;
    if !user_re.is_match(&config.ssh_username) {
        return Err(ConfigError::InvalidUsername(config.ssh_username.clone()).into());
    }

    if config.echo_text.trim().is_empty() || config.echo_text.contains('\'') {
        return Err(ConfigError::InvalidEchoText.into());
    }

    for (key, value) in [
        ("ssh_max_retries", config.ssh_max_retries),
        ("ssh_max_retries_expect_error", config.ssh_max_retries_expect_error),
        ("ssh_key_retries", config.ssh_key_retries),
        ("terraform_max_retries", config.terraform_max_retries),
    ] {
        if value == 0 {
            return Err(ConfigError::ZeroRetries {
                key: key.to_string(),
                value,
            }
            .into());
        }
    }

    let conflicts: Vec<&str> = config
        .approved_regions
        .iter()
        .filter(|r| config.forbidden_regions.contains(r))
        .map(String::as_str)
        .collect();
    if !conflicts.is_empty() {
        return Err(ConfigError::RegionConflict(conflicts.join(", ")).into());
    }

    Ok(())
}

// ── Unit tests ───────────────────────────────────────────────────────────────
