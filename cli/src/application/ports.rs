//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain`, never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;

use anyhow::Result;

use crate::domain::{Instance, RunState, SshHost};

// ── Value Types ───────────────────────────────────────────────────────────────

/// Inputs for one Terraform root module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformOptions {
    /// Directory holding the root module.
    pub dir: PathBuf,
    /// `-var` assignments, sorted for stable command lines.
    pub vars: BTreeMap<String, String>,
    /// Attempts for `init`/`apply` when stderr matches a transient error.
    pub max_retries: u32,
    pub sleep_between_retries: Duration,
}

impl TerraformOptions {
    /// Options for the network module under test: project, region, and a
    /// unique prefix for every resource name.
    #[must_use]
    pub fn for_run(state: &RunState, max_retries: u32, sleep_between_retries: Duration) -> Self {
        let vars = BTreeMap::from([
            ("project".to_string(), state.project.clone()),
            ("region".to_string(), state.region.clone()),
            ("name_prefix".to_string(), state.name_prefix.clone()),
        ]);
        Self {
            dir: state.module_path(),
            vars,
            max_retries,
            sleep_between_retries,
        }
    }
}

/// A generated SSH key pair on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub private_key_path: PathBuf,
    /// OpenSSH public key line, e.g. `ssh-rsa AAAA... comment`.
    pub public_key: String,
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    ///
    /// Implementations should delegate to `run_with_timeout` using the
    /// instance's configured default timeout.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program with a custom timeout override.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned or exceeds `timeout`.
    /// On timeout, the child process must be killed (not left orphaned).
    async fn run_with_timeout(
        &self,
        program: &str,
        args: &[&str],
        timeout: Duration,
    ) -> Result<Output>;
}

// ── Progress Reporting Port ───────────────────────────────────────────────────

/// Abstracts progress reporting so services can emit events without
/// depending on the Presentation layer. Sync trait, no async.
pub trait ProgressReporter {
    /// Emit an in-progress step message.
    fn step(&self, message: &str);
    /// Emit a success message.
    fn success(&self, message: &str);
    /// Emit a warning message.
    fn warn(&self, message: &str);
    /// Emit a failed-check message.
    fn failure(&self, message: &str);
}

// ── Collaborator Ports ────────────────────────────────────────────────────────

/// Infrastructure-as-code tool: apply, read outputs, destroy.
#[allow(async_fn_in_trait)]
pub trait Provisioner {
    /// Initialise the module and apply it.
    async fn init_and_apply(&self, options: &TerraformOptions) -> Result<()>;
    /// Read one output as a plain string.
    async fn output(&self, options: &TerraformOptions, key: &str) -> Result<String>;
    /// Read every output at once, rendered as by [`Provisioner::output`].
    async fn output_all(&self, options: &TerraformOptions) -> Result<BTreeMap<String, String>>;
    /// Destroy everything the module created.
    async fn destroy(&self, options: &TerraformOptions) -> Result<()>;
}

/// Cloud provider: regions, instances, and instance metadata.
#[allow(async_fn_in_trait)]
pub trait CloudCompute {
    /// Names of all regions available to `project`.
    async fn regions(&self, project: &str) -> Result<Vec<String>>;
    /// Look up an instance by name anywhere in `project`.
    async fn fetch_instance(&self, project: &str, name: &str) -> Result<Instance>;
    /// Append `username:public_key` to the instance's `ssh-keys` metadata.
    ///
    /// Metadata writes are fingerprinted and eventually consistent, so callers
    /// should expect transient mismatch errors and retry.
    async fn add_ssh_key(
        &self,
        project: &str,
        instance: &Instance,
        username: &str,
        public_key: &str,
    ) -> Result<()>;
}

/// Generates key material for the run.
#[allow(async_fn_in_trait)]
pub trait KeyGenerator {
    /// Create an RSA key pair inside `dir`.
    async fn generate(&self, dir: &Path) -> Result<KeyPair>;
}

/// Runs a command over SSH.
#[allow(async_fn_in_trait)]
pub trait SshClient {
    /// Run `command` on the last host of `route`, jumping through the earlier
    /// hosts in order. Returns stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if any hop refuses the connection or the command exits
    /// non-zero.
    async fn run(&self, route: &[SshHost], key: &KeyPair, command: &str) -> Result<String>;
}

// ── State and Filesystem Ports ────────────────────────────────────────────────

/// Abstracts run state persistence (load/save/clear).
#[allow(async_fn_in_trait)]
pub trait RunStateStore {
    /// Load the saved run state, returning `None` if none exists.
    async fn load_async(&self) -> Result<Option<RunState>>;
    /// Persist the given run state.
    async fn save_async(&self, state: &RunState) -> Result<()>;
    /// Forget the saved run state.
    async fn clear_async(&self) -> Result<()>;
}

/// Copies the tree holding the module into an isolated workspace.
#[allow(async_fn_in_trait)]
pub trait ModuleStager {
    /// Copy `root_dir` into a fresh temporary directory, leaving out local
    /// Terraform state, caches, and VCS metadata. Returns the new directory.
    ///
    /// The whole tree is copied so relative module sources keep resolving.
    async fn stage(&self, root_dir: &Path) -> Result<PathBuf>;
    /// Delete a workspace created by `stage`.
    async fn remove(&self, workspace_dir: &Path) -> Result<()>;
}
