//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Harness errors ────────────────────────────────────────────────────────────

/// Errors raised while preparing a run.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("No Google Cloud project configured. Set one of: {vars}, or pass --project.")]
    MissingProject { vars: String },

    #[error("No usable region in project '{project}' after applying approved/forbidden lists.")]
    NoRegion { project: String },

    #[error("No saved run state. Run 'netcheck run' without --skip setup first.")]
    NoRunState,

    #[error("Invalid name prefix '{0}': must match ^[a-z][a-z0-9-]{{0,39}}$")]
    InvalidNamePrefix(String),

    #[error("Output '{0}' is empty")]
    EmptyOutput(String),

    #[error("{0} check(s) failed")]
    ChecksFailed(usize),
}

// ── Retry errors ──────────────────────────────────────────────────────────────

/// Outcome of an exhausted or aborted retry loop.
#[derive(Debug, Error)]
pub enum RetryError {
    #[error("'{description}' unsuccessful after {max_retries} retries: {last_error}")]
    MaxRetriesExceeded {
        description: String,
        max_retries: u32,
        last_error: String,
    },

    #[error("'{description}' failed with a non-retryable error: {error}")]
    Fatal { description: String, error: String },
}

// ── Instance errors ───────────────────────────────────────────────────────────

/// Errors related to cloud instances.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("Instance '{name}' not found in project '{project}'")]
    NotFound { name: String, project: String },

    #[error("Instance '{0}' has no external IP")]
    NoPublicIp(String),

    #[error("Instance '{name}' has an unparseable zone '{zone}'")]
    BadZone { name: String, zone: String },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to harness configuration validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid ssh_username '{0}': must match ^[a-z_][a-z0-9_-]*$")]
    InvalidUsername(String),

    #[error("echo_text must be non-empty and must not contain single quotes")]
    InvalidEchoText,

    #[error("{key} must be at least 1 (got {value})")]
    ZeroRetries { key: String, value: u32 },

    #[error("Regions both approved and forbidden: {0}")]
    RegionConflict(String),

    #[error("Unknown stage '{0}'. Valid stages: setup, deploy, validate, teardown")]
    UnknownStage(String),
}
