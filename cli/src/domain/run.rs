//! Run identity: project discovery, naming, region choice, and persisted run state.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::error::HarnessError;

/// Environment variables consulted for the project id, in priority order.
pub const PROJECT_ENV_VARS: &[&str] = &[
    "GOOGLE_PROJECT",
    "GOOGLE_CLOUD_PROJECT",
    "GOOGLE_CLOUD_PROJECT_ID",
    "GCLOUD_PROJECT",
    "CLOUDSDK_CORE_PROJECT",
];

/// Length of the random suffix in a name prefix.
pub const UNIQUE_ID_LEN: usize = 6;

const UNIQUE_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// State carried between stages, and between invocations that skip `setup`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunState {
    /// Temporary copy of the module that Terraform runs in.
    pub workspace_dir: PathBuf,
    /// Module path relative to `workspace_dir`.
    pub module_subdir: PathBuf,
    pub project: String,
    pub region: String,
    pub name_prefix: String,
    pub created_at: DateTime<Utc>,
}

impl RunState {
    /// Directory holding the Terraform root module.
    #[must_use]
    pub fn module_path(&self) -> PathBuf {
        self.workspace_dir.join(&self.module_subdir)
    }
}

/// Resolve the project id from the first non-empty known variable.
///
/// # Errors
///
/// Returns [`HarnessError::MissingProject`] when none is set.
pub fn project_from_env(env: impl Fn(&str) -> Option<String>) -> Result<String, HarnessError> {
    PROJECT_ENV_VARS
        .iter()
        .find_map(|var| env(var).filter(|v| !v.trim().is_empty()))
        .ok_or_else(|| HarnessError::MissingProject {
            vars: PROJECT_ENV_VARS.join(", "),
        })
}

/// Random lowercase alphanumeric id, safe for GCP resource names.
pub fn unique_id(rng: &mut impl Rng) -> String {
    (0..UNIQUE_ID_LEN)
        .map(|_| char::from(UNIQUE_ID_ALPHABET[rng.gen_range(0..UNIQUE_ID_ALPHABET.len())]))
        .collect()
}

/// Name prefix for every resource created by one run.
pub fn name_prefix(rng: &mut impl Rng) -> String {
    format!("netcheck-{}", unique_id(rng))
}

/// Validates a name prefix against GCP naming rules.
///
/// # Errors
///
/// Returns [`HarnessError::InvalidNamePrefix`] on mismatch.
pub fn validate_name_prefix(prefix: &str) -> Result<()> {
    let re = Regex::new(r"^[a-z][a-z0-9-]{0,39}$")?;
    if !re.is_match(prefix) {
        return Err(HarnessError::InvalidNamePrefix(prefix.to_string()).into());
    }
    Ok(())
}

/// Pick a region at random from `available`, honouring the approved and
/// forbidden lists. An empty approved list approves everything.
pub fn choose_region(
    available: &[String],
    approved: &[String],
    forbidden: &[String],
    rng: &mut impl Rng,
) -> Option<String> {
    let candidates: Vec<&String> = available
        .iter()
        .filter(|r| approved.is_empty() || approved.contains(r))
        .filter(|r| !forbidden.contains(r))
        .collect();
    candidates.choose(rng).map(|r| (*r).clone())
}
