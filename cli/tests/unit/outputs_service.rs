//! Unit tests for the output checks.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;
use netcheck::application::ports::{Provisioner, TerraformOptions};
use netcheck::application::services::outputs::check_outputs;
use netcheck::domain::OUTPUT_EXPECTATIONS;

use crate::mocks::{FakeProvisioner, RecordingReporter, terraform_options};

#[tokio::test]
async fn test_all_expected_outputs_pass() {
    let reporter = RecordingReporter::default();
    let results = check_outputs(
        &FakeProvisioner::default(),
        &reporter,
        &terraform_options(Path::new("/tmp/module")),
        OUTPUT_EXPECTATIONS,
    )
    .await;

    assert_eq!(results.len(), OUTPUT_EXPECTATIONS.len());
    assert!(results.iter().all(|r| r.passed()));
    assert!(reporter.failures().is_empty());
}

#[tokio::test]
async fn test_wrong_and_missing_outputs_fail_independently() {
    let mut provisioner = FakeProvisioner::default();
    provisioner
        .outputs
        .insert("private_subnetwork_gateway".to_string(), "10.0.32.1".to_string());
    provisioner.outputs.remove("private_persistence");
    let reporter = RecordingReporter::default();

    let results = check_outputs(
        &provisioner,
        &reporter,
        &terraform_options(Path::new("/tmp/module")),
        OUTPUT_EXPECTATIONS,
    )
    .await;

    let failed: BTreeMap<&str, &str> = results
        .iter()
        .filter_map(|r| r.failure.as_deref().map(|f| (r.key.as_str(), f)))
        .collect();
    assert_eq!(failed.len(), 2);
    assert_eq!(
        failed["private_subnetwork_gateway"],
        "expected a private gateway of 10.0.16.1 but saw 10.0.32.1"
    );
    assert!(failed["private_persistence"].contains("could not find private_persistence"));
    assert_eq!(reporter.failures().len(), 2);
}

struct BrokenState;

impl Provisioner for BrokenState {
    async fn init_and_apply(&self, _options: &TerraformOptions) -> Result<()> {
        Ok(())
    }
    async fn output(&self, _options: &TerraformOptions, _key: &str) -> Result<String> {
        anyhow::bail!("state locked")
    }
    async fn output_all(&self, _options: &TerraformOptions) -> Result<BTreeMap<String, String>> {
        anyhow::bail!("state locked")
    }
    async fn destroy(&self, _options: &TerraformOptions) -> Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_unreadable_outputs_fail_every_row() {
    let results = check_outputs(
        &BrokenState,
        &RecordingReporter::default(),
        &terraform_options(Path::new("/tmp/module")),
        OUTPUT_EXPECTATIONS,
    )
    .await;

    assert!(results.iter().all(|r| {
        r.actual.is_none() && r.failure.as_deref().is_some_and(|f| f.contains("state locked"))
    }));
}
