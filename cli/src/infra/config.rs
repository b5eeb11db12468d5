//! YAML configuration loading for the harness.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::domain::{HarnessConfig, validate_config};

/// Environment variable naming a config file when `--config` is not given.
pub const CONFIG_ENV_VAR: &str = "NETCHECK_CONFIG";

/// Config file picked up from the working directory when nothing else is set.
pub const DEFAULT_CONFIG_FILE: &str = "netcheck.yaml";

/// Production config source backed by a YAML file on disk.
pub struct YamlConfigStore {
    path: PathBuf,
    explicit: bool,
}

impl YamlConfigStore {
    /// Resolve the config path: `explicit`, then `NETCHECK_CONFIG`, then
    /// `netcheck.yaml` in the working directory.
    #[must_use]
    pub fn resolve(explicit: Option<&Path>) -> Self {
        if let Some(path) = explicit {
            return Self {
                path: path.to_path_buf(),
                explicit: true,
            };
        }
        if let Some(val) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
            return Self {
                path: PathBuf::from(val),
                explicit: true,
            };
        }
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_FILE),
            explicit: false,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and validate the configuration.
    ///
    /// A missing default file yields defaults; a missing file that was named
    /// explicitly is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or fails validation.
    pub fn load(&self) -> Result<HarnessConfig> {
        let config = if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)
                .with_context(|| format!("cannot read {}", self.path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("cannot parse {}", self.path.display()))?
        } else if self.explicit {
            anyhow::bail!("config file {} does not exist", self.path.display());
        } else {
            HarnessConfig::default()
        };
        validate_config(&config)
            .with_context(|| format!("invalid config {}", self.path.display()))?;
        Ok(config)
    }
}
