//! Application service — setup stage.
//!
//! Stages the module tree into a temporary workspace, decides project, region
//! and name prefix, and persists the result so later stages (or a later
//! invocation) can pick it up.

use anyhow::{Context, Result};
use chrono::Utc;

use crate::application::ports::{CloudCompute, ModuleStager, ProgressReporter, RunStateStore};
use crate::domain::error::HarnessError;
use crate::domain::run::{choose_region, name_prefix, validate_name_prefix};
use crate::domain::{HarnessConfig, RunState};

/// Caller-resolved inputs for the setup stage.
pub struct SetupOptions<'a> {
    pub project: &'a str,
    /// Fixed region; a random one is chosen when `None`.
    pub region: Option<&'a str>,
    pub config: &'a HarnessConfig,
}

/// Stage the module and record the run identity.
///
/// # Errors
///
/// Returns an error if staging fails, no region qualifies, or the state
/// cannot be saved. A staged workspace is removed again on failure.
pub async fn setup_run(
    stager: &impl ModuleStager,
    cloud: &impl CloudCompute,
    store: &impl RunStateStore,
    reporter: &impl ProgressReporter,
    opts: SetupOptions<'_>,
) -> Result<RunState> {
    let SetupOptions {
        project,
        region,
        config,
    } = opts;

    let region = match region {
        Some(r) => r.to_string(),
        None => pick_region(cloud, project, config).await?,
    };
    let prefix = name_prefix(&mut rand::thread_rng());
    validate_name_prefix(&prefix)?;

    reporter.step(&format!("staging {} ...", config.root_dir.display()));
    let workspace_dir = stager
        .stage(&config.root_dir)
        .await
        .context("staging module tree")?;

    let state = RunState {
        workspace_dir,
        module_subdir: config.module_dir.clone(),
        project: project.to_string(),
        region,
        name_prefix: prefix,
        created_at: Utc::now(),
    };

    if let Err(e) = store.save_async(&state).await {
        let _ = stager.remove(&state.workspace_dir).await;
        return Err(e.context("saving run state"));
    }

    reporter.success(&format!(
        "staged {} in {} ({})",
        state.name_prefix,
        state.region,
        state.workspace_dir.display()
    ));
    Ok(state)
}

async fn pick_region(
    cloud: &impl CloudCompute,
    project: &str,
    config: &HarnessConfig,
) -> Result<String> {
    let available = cloud
        .regions(project)
        .await
        .context("listing regions")?;
    choose_region(
        &available,
        &config.approved_regions,
        &config.forbidden_regions,
        &mut rand::thread_rng(),
    )
    .ok_or_else(|| {
        HarnessError::NoRegion {
            project: project.to_string(),
        }
        .into()
    })
}
