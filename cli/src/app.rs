//! Application context — unified state passed to every command handler.
//!
//! `AppContext` carries the output context, the loaded configuration and the
//! run state store, so command signatures stay `(&AppContext, args)`.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::domain::HarnessConfig;
use crate::infra::config::YamlConfigStore;
use crate::infra::state::JsonRunStateStore;
use crate::output::{HumanRenderer, JsonRenderer, OutputContext, Renderer, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Output rendering flags.
pub struct OutputFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    pub output: OutputFlags,
    /// Explicit `--config` path.
    pub config: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode). Quiet in JSON mode so
    /// stdout carries only the JSON document.
    pub output: OutputContext,
    pub mode: OutputMode,
    pub config: HarnessConfig,
    /// Run state under `.netcheck/` in the working directory.
    pub store: JsonRunStateStore,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags, loading the config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or is invalid, or the
    /// working directory cannot be determined.
    pub fn new(flags: &AppFlags) -> Result<Self> {
        let config = YamlConfigStore::resolve(flags.config.as_deref()).load()?;
        Self::with_config(flags, config)
    }

    /// Construct an `AppContext` with default config, for commands that do
    /// not touch the cloud.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory cannot be determined.
    pub fn without_config(flags: &AppFlags) -> Result<Self> {
        Self::with_config(flags, HarnessConfig::default())
    }

    fn with_config(flags: &AppFlags, config: HarnessConfig) -> Result<Self> {
        let mode = if flags.output.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };
        let cwd = std::env::current_dir().context("cannot determine working directory")?;
        Ok(Self {
            output: OutputContext::new(
                flags.output.no_color,
                flags.output.quiet || flags.output.json,
            ),
            mode,
            config,
            store: JsonRunStateStore::in_dir(&cwd),
        })
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Returns the appropriate `Renderer` variant for the current output mode.
    #[must_use]
    pub fn renderer(&self) -> Renderer<'_> {
        match self.mode {
            OutputMode::Human => Renderer::Human(HumanRenderer::new(&self.output)),
            OutputMode::Json => Renderer::Json(JsonRenderer),
        }
    }

    /// Progress reporter for application services.
    #[must_use]
    pub fn reporter(&self) -> TerminalReporter<'_> {
        TerminalReporter::new(&self.output)
    }
}
