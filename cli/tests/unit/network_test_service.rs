//! Unit tests for the full run: stage ordering, skip handling and teardown
//! guarantees.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use netcheck::application::services::network_test::{Ports, RunOptions, run_network_test};
use netcheck::domain::{HarnessConfig, HarnessError, REACHABILITY_CHECKS, Stage, StagePlan};

use crate::mocks::{
    FakeCloud, FakeKeygen, FakeProvisioner, FakeSsh, FakeStager, MemoryStore, RecordingReporter,
    STAGED_DIR, fast_config, sample_state,
};

struct World {
    provisioner: FakeProvisioner,
    cloud: FakeCloud,
    keygen: FakeKeygen,
    ssh: FakeSsh,
    store: MemoryStore,
    stager: FakeStager,
    reporter: RecordingReporter,
}

impl Default for World {
    fn default() -> Self {
        Self {
            provisioner: FakeProvisioner::default(),
            cloud: FakeCloud::default(),
            keygen: FakeKeygen::default(),
            ssh: FakeSsh::default(),
            store: MemoryStore::default(),
            stager: FakeStager::default(),
            reporter: RecordingReporter::default(),
        }
    }
}

impl World {
    async fn run(
        &self,
        skip: &[Stage],
        config: &HarnessConfig,
    ) -> anyhow::Result<netcheck::domain::RunReport> {
        let plan = StagePlan::new(skip, |_| None);
        let ports = Ports {
            provisioner: &self.provisioner,
            cloud: &self.cloud,
            keygen: &self.keygen,
            ssh: &self.ssh,
            store: &self.store,
            stager: &self.stager,
        };
        run_network_test(
            &ports,
            &self.reporter,
            RunOptions {
                project: "my-project",
                region: Some("us-east1"),
                plan: &plan,
                config,
            },
        )
        .await
    }
}

#[tokio::test]
async fn test_full_run_passes_and_cleans_up() {
    let world = World::default();

    let report = world.run(&[], &fast_config()).await.expect("run completes");

    assert!(report.passed(), "report: {report:#?}");
    assert_eq!(report.project, "my-project");
    assert_eq!(report.region, "us-east1");
    assert_eq!(report.reachability.len(), REACHABILITY_CHECKS.len());
    assert_eq!(report.outputs.len(), 5);
    assert_eq!(*world.provisioner.calls.borrow(), ["apply", "destroy"]);
    assert_eq!(*world.stager.removed.borrow(), vec![PathBuf::from(STAGED_DIR)]);
    assert!(world.store.cleared.get());
    assert!(world.store.state.borrow().is_none());
}

#[tokio::test]
async fn test_apply_passes_run_variables() {
    let world = World::default();

    let report = world.run(&[], &fast_config()).await.expect("run completes");

    let vars = world
        .provisioner
        .applied_vars
        .borrow()
        .clone()
        .expect("apply was called");
    assert_eq!(vars["project"], "my-project");
    assert_eq!(vars["region"], "us-east1");
    assert_eq!(vars["name_prefix"], report.name_prefix);
}

#[tokio::test]
async fn test_apply_failure_still_destroys() {
    let world = World {
        provisioner: FakeProvisioner {
            fail_apply: true,
            ..FakeProvisioner::default()
        },
        ..World::default()
    };

    let report = world.run(&[], &fast_config()).await.expect("run completes");

    assert!(!report.passed());
    let aborted = report.aborted.as_deref().expect("run aborted");
    assert!(aborted.contains("quota exceeded"), "got: {aborted}");
    assert!(report.reachability.is_empty());
    assert_eq!(*world.provisioner.calls.borrow(), ["apply", "destroy"]);
    assert!(world.store.cleared.get());
}

#[tokio::test]
async fn test_failed_checks_still_destroy() {
    let world = World {
        ssh: FakeSsh {
            all_down: true,
            ..FakeSsh::default()
        },
        ..World::default()
    };

    let report = world.run(&[], &fast_config()).await.expect("run completes");

    assert!(!report.passed());
    assert!(report.failure_count() > 0);
    assert_eq!(*world.provisioner.calls.borrow(), ["apply", "destroy"]);
}

#[tokio::test]
async fn test_destroy_failure_keeps_state_for_retry() {
    let world = World {
        provisioner: FakeProvisioner {
            fail_destroy: true,
            ..FakeProvisioner::default()
        },
        ..World::default()
    };

    let report = world.run(&[], &fast_config()).await.expect("run completes");

    assert!(!report.passed());
    assert!(report.teardown_error.is_some());
    assert!(world.store.state.borrow().is_some(), "state kept");
    assert!(world.stager.removed.borrow().is_empty(), "workspace kept");
}

#[tokio::test]
async fn test_skip_teardown_keeps_state_and_workspace() {
    let world = World::default();

    let report = world
        .run(&[Stage::Teardown], &fast_config())
        .await
        .expect("run completes");

    assert!(report.passed());
    assert_eq!(report.skipped_stages, vec![Stage::Teardown]);
    assert_eq!(*world.provisioner.calls.borrow(), ["apply"]);
    assert!(world.store.state.borrow().is_some());
    assert!(
        world
            .reporter
            .warnings()
            .iter()
            .any(|w| w.contains("netcheck teardown"))
    );
}

#[tokio::test]
async fn test_skip_setup_without_saved_state_fails_before_provisioning() {
    let world = World::default();

    let err = world
        .run(&[Stage::Setup], &fast_config())
        .await
        .expect_err("no state to reuse");

    assert!(matches!(
        err.downcast_ref::<HarnessError>(),
        Some(HarnessError::NoRunState)
    ));
    assert!(world.provisioner.calls.borrow().is_empty());
}

#[tokio::test]
async fn test_skip_setup_reuses_saved_state() {
    let saved = sample_state();
    let world = World {
        store: MemoryStore::with_state(saved.clone()),
        ..World::default()
    };

    let report = world
        .run(&[Stage::Setup, Stage::Deploy], &fast_config())
        .await
        .expect("run completes");

    assert_eq!(report.project, saved.project);
    assert_eq!(report.region, saved.region);
    assert_eq!(report.name_prefix, saved.name_prefix);
    assert!(world.stager.staged_from.borrow().is_empty());
    assert_eq!(*world.provisioner.calls.borrow(), ["destroy"]);
    assert_eq!(*world.stager.removed.borrow(), vec![saved.workspace_dir]);
}

#[tokio::test]
async fn test_skip_validate_runs_no_checks() {
    let world = World::default();

    let report = world
        .run(&[Stage::Validate], &fast_config())
        .await
        .expect("run completes");

    assert!(report.passed());
    assert!(report.outputs.is_empty());
    assert!(report.reachability.is_empty());
    assert!(world.ssh.attempts.borrow().is_empty());
    assert!(world.keygen.generated_in.borrow().is_none());
}
