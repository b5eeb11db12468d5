//! JSON output helpers.
//!
//! Every `--json` code path prints exactly one pretty-printed document on
//! stdout. Failures use the error object from [`format_error`].

use anyhow::{Context, Result};

use crate::domain::{HarnessConfig, OutputExpectation, ReachabilityCheck, RunReport, RunState};

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Build the JSON document for a finished run.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized.
pub fn report_value(report: &RunReport) -> Result<serde_json::Value> {
    let mut value = serde_json::to_value(report).context("serializing report")?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("passed".to_string(), report.passed().into());
        obj.insert("failures".to_string(), report.failure_count().into());
    }
    Ok(value)
}

/// Build the JSON document listing the built-in checks.
#[must_use]
pub fn checks_value(
    outputs: &[OutputExpectation],
    reachability: &[ReachabilityCheck],
    config: &HarnessConfig,
) -> serde_json::Value {
    let checks: Vec<serde_json::Value> = reachability
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.name,
                "expect": c.expect,
                "route": c.route,
                "max_attempts": config.ssh_retries_for(c.expect.expects_success()),
            })
        })
        .collect();
    serde_json::json!({
        "outputs": outputs,
        "reachability": checks,
    })
}

/// Renders domain types as JSON on stdout.
pub struct JsonRenderer;

impl JsonRenderer {
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_report(&self, report: &RunReport) -> Result<()> {
        let value = report_value(report)?;
        println!(
            "{}",
            serde_json::to_string_pretty(&value).context("JSON serialization")?
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_checks(
        &self,
        outputs: &[OutputExpectation],
        reachability: &[ReachabilityCheck],
        config: &HarnessConfig,
    ) -> Result<()> {
        let out = checks_value(outputs, reachability, config);
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("JSON serialization")?
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_teardown(&self, state: &RunState) -> Result<()> {
        let out = serde_json::json!({
            "destroyed": true,
            "name_prefix": state.name_prefix,
            "project": state.project,
            "region": state.region,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("JSON serialization")?
        );
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn render_version(&self, version: &str) -> Result<()> {
        let out = serde_json::json!({ "version": version });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("JSON serialization")?
        );
        Ok(())
    }
}
