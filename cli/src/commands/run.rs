//! `netcheck run` — stage, apply, validate and destroy the network module.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::network_test::{Ports, RunOptions, run_network_test};
use crate::domain::error::HarnessError;
use crate::domain::run::project_from_env;
use crate::domain::{HarnessConfig, Stage, StagePlan};
use crate::infra::fs::LocalModuleStager;
use crate::infra::gcloud::GcloudCompute;
use crate::infra::keygen::SshKeygen;
use crate::infra::ssh::OpenSshClient;
use crate::infra::terraform::TerraformCli;

/// Arguments for the run command.
#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Google Cloud project [default: $GOOGLE_PROJECT, $GOOGLE_CLOUD_PROJECT, ...]
    #[arg(long)]
    pub project: Option<String>,

    /// Region to deploy into [default: random region of the project]
    #[arg(long)]
    pub region: Option<String>,

    /// Tree copied into the temporary workspace
    #[arg(long, value_name = "DIR")]
    pub root_dir: Option<PathBuf>,

    /// Terraform root module, relative to the root dir
    #[arg(long, value_name = "DIR")]
    pub module_dir: Option<PathBuf>,

    /// Skip a stage: setup, deploy, validate or teardown (repeatable; also SKIP_<stage>=1)
    #[arg(long = "skip", value_name = "STAGE")]
    pub skip: Vec<Stage>,
}

impl RunArgs {
    /// Apply the directory overrides to `config`.
    #[must_use]
    pub fn apply_to(&self, mut config: HarnessConfig) -> HarnessConfig {
        if let Some(dir) = &self.root_dir {
            config.root_dir.clone_from(dir);
        }
        if let Some(dir) = &self.module_dir {
            config.module_dir.clone_from(dir);
        }
        config
    }
}

/// Entry point for `netcheck run`.
///
/// # Errors
///
/// Returns an error if the run cannot start, or [`HarnessError::ChecksFailed`]
/// once the report is rendered and any check failed.
pub async fn run(app: &AppContext, args: &RunArgs) -> Result<()> {
    let config = args.apply_to(app.config.clone());
    let plan = StagePlan::new(&args.skip, |k| std::env::var(k).ok());

    // The project only matters when setup runs; otherwise it comes from the
    // saved run state.
    let project = match (&args.project, plan.runs(Stage::Setup)) {
        (Some(p), _) => p.clone(),
        (None, true) => project_from_env(|k| std::env::var(k).ok())?,
        (None, false) => String::new(),
    };

    let provisioner = TerraformCli::default_runner(&config.terraform_bin)?;
    let cloud = GcloudCompute::default_runner(&config.gcloud_bin);
    let keygen = SshKeygen::default_runner();
    let ssh = OpenSshClient::default_runner(config.ssh_connect_timeout());
    let stager = LocalModuleStager;
    let ports = Ports {
        provisioner: &provisioner,
        cloud: &cloud,
        keygen: &keygen,
        ssh: &ssh,
        store: &app.store,
        stager: &stager,
    };

    let reporter = app.reporter();
    let report = run_network_test(
        &ports,
        &reporter,
        RunOptions {
            project: &project,
            region: args.region.as_deref(),
            plan: &plan,
            config: &config,
        },
    )
    .await?;
    reporter.finish();

    app.renderer().render_report(&report)?;
    if !report.passed() {
        return Err(HarnessError::ChecksFailed(report.failure_count()).into());
    }
    Ok(())
}
