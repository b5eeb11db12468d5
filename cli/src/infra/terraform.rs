//! Infrastructure implementation of the `Provisioner` port on the Terraform CLI.
//!
//! Every call runs `terraform -chdir=<module> ...` through a `CommandRunner`
//! so tests can inject canned outputs.

use std::collections::BTreeMap;
use std::process::Output;

use anyhow::{Context, Result};
use regex::RegexSet;
use serde::Deserialize;
use tracing::info;

use crate::application::ports::{CommandRunner, Provisioner, TerraformOptions};
use crate::application::retry::{Fatal, do_with_retry};
use crate::infra::command_runner::{
    DEFAULT_CMD_TIMEOUT, DEFAULT_PROVISION_TIMEOUT, TokioCommandRunner,
};

/// stderr patterns worth another `init`/`apply` attempt.
pub const RETRYABLE_ERRORS: &[&str] = &[
    r"(?i)TLS handshake timeout",
    r"(?i)connection reset by peer",
    r"(?i)i/o timeout",
    r"(?i)Error installing provider",
    r"(?i)Failed to query available provider packages",
    r"(?i)googleapi: Error 5\d\d",
    r"(?i)Error 409: .*is not ready",
    r"(?i)The resource '.*' is not ready",
];

/// `Provisioner` backed by the `terraform` binary.
pub struct TerraformCli<R: CommandRunner> {
    runner: R,
    binary: String,
    retryable: RegexSet,
}

impl<R: CommandRunner> TerraformCli<R> {
    /// # Errors
    ///
    /// Returns an error if the built-in retryable-error patterns fail to compile.
    pub fn new(runner: R, binary: &str) -> Result<Self> {
        Ok(Self {
            runner,
            binary: binary.to_string(),
            retryable: RegexSet::new(RETRYABLE_ERRORS).context("compiling retryable errors")?,
        })
    }

    /// The underlying command runner.
    #[must_use]
    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn is_retryable(&self, stderr: &str) -> bool {
        self.retryable.is_match(stderr)
    }

    async fn terraform(&self, options: &TerraformOptions, args: &[&str]) -> Result<Output> {
        let chdir = format!("-chdir={}", options.dir.display());
        let mut full: Vec<&str> = vec![chdir.as_str()];
        full.extend_from_slice(args);
        self.runner
            .run(&self.binary, &full)
            .await
            .with_context(|| format!("terraform {}", args.first().copied().unwrap_or_default()))
    }

    /// Run one subcommand, retrying transient failures. Non-matching
    /// failures are fatal.
    async fn with_retries(&self, options: &TerraformOptions, args: &[&str]) -> Result<String> {
        let description = format!("terraform {}", args.first().copied().unwrap_or_default());
        let desc = description.as_str();
        let stdout = do_with_retry(
            desc,
            options.max_retries,
            options.sleep_between_retries,
            || async move {
                let out = self.terraform(options, args).await?;
                if out.status.success() {
                    return Ok(String::from_utf8_lossy(&out.stdout).into_owned());
                }
                let stderr = String::from_utf8_lossy(&out.stderr).into_owned();
                if self.is_retryable(&stderr) {
                    anyhow::bail!("{desc} failed: {stderr}");
                }
                Err(anyhow::Error::new(Fatal(format!("{desc} failed: {stderr}"))))
            },
        )
        .await?;
        Ok(stdout)
    }
}

impl TerraformCli<TokioCommandRunner> {
    /// Production runner with automation-friendly environment.
    ///
    /// # Errors
    ///
    /// See [`TerraformCli::new`].
    pub fn default_runner(binary: &str) -> Result<Self> {
        let runner = TokioCommandRunner::new(DEFAULT_PROVISION_TIMEOUT)
            .with_env("TF_IN_AUTOMATION", "1")
            .with_env("TF_INPUT", "0");
        Self::new(runner, binary)
    }
}

/// `-var` arguments for every option variable, in key order.
#[must_use]
pub fn var_args(options: &TerraformOptions) -> Vec<String> {
    options
        .vars
        .iter()
        .flat_map(|(k, v)| ["-var".to_string(), format!("{k}={v}")])
        .collect()
}

impl<R: CommandRunner> Provisioner for TerraformCli<R> {
    async fn init_and_apply(&self, options: &TerraformOptions) -> Result<()> {
        info!(dir = %options.dir.display(), "terraform init");
        self.with_retries(options, &["init", "-input=false"]).await?;

        let vars = var_args(options);
        let mut args = vec!["apply", "-input=false", "-auto-approve"];
        args.extend(vars.iter().map(String::as_str));
        info!(dir = %options.dir.display(), "terraform apply");
        self.with_retries(options, &args).await?;
        Ok(())
    }

    async fn output(&self, options: &TerraformOptions, key: &str) -> Result<String> {
        let chdir = format!("-chdir={}", options.dir.display());
        let out = self
            .runner
            .run_with_timeout(
                &self.binary,
                &[chdir.as_str(), "output", "-no-color", "-json", key],
                DEFAULT_CMD_TIMEOUT,
            )
            .await
            .with_context(|| format!("terraform output {key}"))?;
        anyhow::ensure!(
            out.status.success(),
            "terraform output {key} failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        );
        parse_output_value(&out.stdout).with_context(|| format!("parsing output {key}"))
    }

    async fn output_all(&self, options: &TerraformOptions) -> Result<BTreeMap<String, String>> {
        let chdir = format!("-chdir={}", options.dir.display());
        let out = self
            .runner
            .run_with_timeout(
                &self.binary,
                &[chdir.as_str(), "output", "-no-color", "-json"],
                DEFAULT_CMD_TIMEOUT,
            )
            .await
            .context("terraform output")?;
        anyhow::ensure!(
            out.status.success(),
            "terraform output failed: {}",
            String::from_utf8_lossy(&out.stderr).trim()
        );
        parse_outputs(&out.stdout)
    }

    async fn destroy(&self, options: &TerraformOptions) -> Result<()> {
        let vars = var_args(options);
        let mut args = vec!["destroy", "-input=false", "-auto-approve"];
        args.extend(vars.iter().map(String::as_str));
        info!(dir = %options.dir.display(), "terraform destroy");
        self.with_retries(options, &args).await?;
        Ok(())
    }
}

/// Render a `terraform output -json <key>` document as a plain string.
///
/// Strings are unquoted; other JSON values keep their compact JSON form.
///
/// # Errors
///
/// Returns an error if the document is not valid JSON.
pub fn parse_output_value(stdout: &[u8]) -> Result<String> {
    let value: serde_json::Value =
        serde_json::from_slice(stdout).context("output is not valid JSON")?;
    Ok(render_value(value))
}

/// One entry of `terraform output -json`.
#[derive(Debug, Deserialize)]
struct OutputEntry {
    value: serde_json::Value,
}

/// Render the `terraform output -json` document as key to plain string.
///
/// # Errors
///
/// Returns an error if the document is not an object of `{ "value": .. }` entries.
pub fn parse_outputs(stdout: &[u8]) -> Result<BTreeMap<String, String>> {
    let entries: BTreeMap<String, OutputEntry> =
        serde_json::from_slice(stdout).context("parsing terraform outputs")?;
    Ok(entries
        .into_iter()
        .map(|(key, entry)| (key, render_value(entry.value)))
        .collect())
}

fn render_value(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}
