//! Infrastructure implementation of the `RunStateStore` port.
//!
//! `JsonRunStateStore` provides async load/save using `tokio::task::spawn_blocking`
//! with atomic write (temp file + rename) so a crash mid-save never leaves a
//! half-written state file behind.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::RunStateStore;
use crate::domain::RunState;
use crate::domain::run::validate_name_prefix;

/// Default location of the run state, relative to the working directory.
pub const DEFAULT_STATE_PATH: &str = ".netcheck/run.json";

/// State file manager for the infra layer.
pub struct JsonRunStateStore {
    path: PathBuf,
}

impl JsonRunStateStore {
    /// Store under `.netcheck/run.json` in `base`.
    #[must_use]
    pub fn in_dir(base: &Path) -> Self {
        Self::with_path(base.join(DEFAULT_STATE_PATH))
    }

    /// Create a store with an explicit path (used in tests).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_sync(&self) -> Result<Option<RunState>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading state file {}", self.path.display()))?;
        let state: RunState = serde_json::from_str(&content)
            .with_context(|| format!("parsing state file {}", self.path.display()))?;
        validate_name_prefix(&state.name_prefix)?;
        Ok(Some(state))
    }

    fn save_sync(&self, state: &RunState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(state).context("serializing state")?;

        let temp_path = self.path.with_extension("json.tmp");
        std::fs::write(&temp_path, &content)
            .with_context(|| format!("writing temp file {}", temp_path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("setting permissions on {}", temp_path.display()))?;
        }

        std::fs::rename(&temp_path, &self.path)
            .with_context(|| format!("finalizing state file {}", self.path.display()))?;
        Ok(())
    }

    fn clear_sync(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("removing state file {}", self.path.display()))?;
        }
        Ok(())
    }
}

impl RunStateStore for JsonRunStateStore {
    async fn load_async(&self) -> Result<Option<RunState>> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || JsonRunStateStore::with_path(path).load_sync())
            .await
            .context("state load task panicked")?
    }

    async fn save_async(&self, state: &RunState) -> Result<()> {
        let path = self.path.clone();
        let state = state.clone();
        tokio::task::spawn_blocking(move || JsonRunStateStore::with_path(path).save_sync(&state))
            .await
            .context("state save task panicked")?
    }

    async fn clear_async(&self) -> Result<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || JsonRunStateStore::with_path(path).clear_sync())
            .await
            .context("state clear task panicked")?
    }
}
