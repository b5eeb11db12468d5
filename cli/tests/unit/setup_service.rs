//! Unit tests for the setup stage.

#![allow(clippy::expect_used)]

use std::path::PathBuf;

use netcheck::application::services::setup::{SetupOptions, setup_run};
use netcheck::domain::HarnessError;
use netcheck::domain::run::validate_name_prefix;

use crate::mocks::{FakeCloud, FakeStager, MemoryStore, RecordingReporter, STAGED_DIR, fast_config};

#[tokio::test]
async fn test_setup_saves_state_with_random_region() {
    let stager = FakeStager::default();
    let cloud = FakeCloud::default();
    let store = MemoryStore::default();
    let reporter = RecordingReporter::default();
    let config = fast_config();

    let state = setup_run(
        &stager,
        &cloud,
        &store,
        &reporter,
        SetupOptions {
            project: "my-project",
            region: None,
            config: &config,
        },
    )
    .await
    .expect("setup should succeed");

    assert_eq!(state.project, "my-project");
    assert!(cloud.regions.contains(&state.region), "got: {}", state.region);
    assert!(validate_name_prefix(&state.name_prefix).is_ok());
    assert_eq!(state.workspace_dir, PathBuf::from(STAGED_DIR));
    assert_eq!(state.module_subdir, config.module_dir);
    assert_eq!(store.state.borrow().as_ref(), Some(&state));
    assert_eq!(*stager.staged_from.borrow(), vec![config.root_dir.clone()]);
}

#[tokio::test]
async fn test_setup_uses_explicit_region_without_listing() {
    let cloud = FakeCloud {
        regions: Vec::new(),
        ..FakeCloud::default()
    };
    let store = MemoryStore::default();
    let config = fast_config();

    let state = setup_run(
        &FakeStager::default(),
        &cloud,
        &store,
        &RecordingReporter::default(),
        SetupOptions {
            project: "p",
            region: Some("asia-east1"),
            config: &config,
        },
    )
    .await
    .expect("setup should succeed");

    assert_eq!(state.region, "asia-east1");
}

#[tokio::test]
async fn test_setup_respects_approved_regions() {
    let config = netcheck::domain::HarnessConfig {
        approved_regions: vec!["europe-west1".to_string()],
        ..fast_config()
    };

    for _ in 0..10 {
        let state = setup_run(
            &FakeStager::default(),
            &FakeCloud::default(),
            &MemoryStore::default(),
            &RecordingReporter::default(),
            SetupOptions {
                project: "p",
                region: None,
                config: &config,
            },
        )
        .await
        .expect("setup should succeed");
        assert_eq!(state.region, "europe-west1");
    }
}

#[tokio::test]
async fn test_setup_fails_when_every_region_is_forbidden() {
    let config = netcheck::domain::HarnessConfig {
        forbidden_regions: vec!["us-east1".to_string(), "europe-west1".to_string()],
        ..fast_config()
    };
    let stager = FakeStager::default();

    let err = setup_run(
        &stager,
        &FakeCloud::default(),
        &MemoryStore::default(),
        &RecordingReporter::default(),
        SetupOptions {
            project: "p",
            region: None,
            config: &config,
        },
    )
    .await
    .expect_err("no region qualifies");

    assert!(matches!(
        err.downcast_ref::<HarnessError>(),
        Some(HarnessError::NoRegion { .. })
    ));
    assert!(stager.staged_from.borrow().is_empty(), "nothing staged");
}

#[tokio::test]
async fn test_setup_removes_workspace_when_state_cannot_be_saved() {
    let stager = FakeStager::default();
    let store = MemoryStore {
        fail_save: true,
        ..MemoryStore::default()
    };
    let config = fast_config();

    let err = setup_run(
        &stager,
        &FakeCloud::default(),
        &store,
        &RecordingReporter::default(),
        SetupOptions {
            project: "p",
            region: Some("us-east1"),
            config: &config,
        },
    )
    .await
    .expect_err("save fails");

    assert!(format!("{err:#}").contains("saving run state"));
    assert_eq!(*stager.removed.borrow(), vec![PathBuf::from(STAGED_DIR)]);
}

#[tokio::test]
async fn test_setup_propagates_staging_failure() {
    let stager = FakeStager {
        fail: true,
        ..FakeStager::default()
    };
    let store = MemoryStore::default();
    let config = fast_config();

    let err = setup_run(
        &stager,
        &FakeCloud::default(),
        &store,
        &RecordingReporter::default(),
        SetupOptions {
            project: "p",
            region: Some("us-east1"),
            config: &config,
        },
    )
    .await
    .expect_err("staging fails");

    assert!(format!("{err:#}").contains("staging module tree"));
    assert!(store.state.borrow().is_none());
}
