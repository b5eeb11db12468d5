//! `netcheck teardown` — destroy a run whose teardown stage was skipped.

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::application::ports::{RunStateStore, TerraformOptions};
use crate::application::services::lifecycle::teardown;
use crate::domain::error::HarnessError;
use crate::infra::fs::LocalModuleStager;
use crate::infra::terraform::TerraformCli;

/// Entry point for `netcheck teardown`.
///
/// # Errors
///
/// Returns an error if no run state is saved or the destroy fails. The state
/// is kept on failure so the command can be repeated.
pub async fn run(app: &AppContext) -> Result<()> {
    let state = app
        .store
        .load_async()
        .await
        .context("loading run state")?
        .ok_or(HarnessError::NoRunState)?;

    let provisioner = TerraformCli::default_runner(&app.config.terraform_bin)?;
    let options = TerraformOptions::for_run(
        &state,
        app.config.terraform_max_retries,
        app.config.terraform_sleep_between_retries(),
    );

    let reporter = app.reporter();
    teardown(
        &provisioner,
        &LocalModuleStager,
        &app.store,
        &reporter,
        &state,
        &options,
    )
    .await?;
    reporter.finish();

    app.renderer().render_teardown(&state)
}
