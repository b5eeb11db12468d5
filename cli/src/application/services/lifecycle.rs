//! Application service — deploy and teardown of the module under test.

use anyhow::{Context, Result};

use crate::application::ports::{
    ModuleStager, ProgressReporter, Provisioner, RunStateStore, TerraformOptions,
};
use crate::domain::RunState;

/// `init` + `apply` the staged module.
///
/// # Errors
///
/// Returns an error if Terraform fails (after its own transient-error retries).
pub async fn deploy(
    provisioner: &impl Provisioner,
    reporter: &impl ProgressReporter,
    options: &TerraformOptions,
) -> Result<()> {
    reporter.step("applying infrastructure (terraform init + apply)...");
    provisioner
        .init_and_apply(options)
        .await
        .context("terraform init and apply")?;
    reporter.success("infrastructure applied");
    Ok(())
}

/// Destroy the infrastructure, then remove the workspace and saved state.
///
/// The workspace and state are kept when `destroy` fails so the run can be
/// torn down again with `netcheck teardown`.
///
/// # Errors
///
/// Returns an error if `destroy` fails or local cleanup fails.
pub async fn teardown(
    provisioner: &impl Provisioner,
    stager: &impl ModuleStager,
    store: &impl RunStateStore,
    reporter: &impl ProgressReporter,
    state: &RunState,
    options: &TerraformOptions,
) -> Result<()> {
    reporter.step("destroying infrastructure (terraform destroy)...");
    provisioner
        .destroy(options)
        .await
        .context("terraform destroy")?;
    reporter.success("infrastructure destroyed");

    stager
        .remove(&state.workspace_dir)
        .await
        .context("removing staged workspace")?;
    store.clear_async().await.context("clearing run state")?;
    Ok(())
}
