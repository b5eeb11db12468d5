//! Application service — compare Terraform outputs with their expected values.

use crate::application::ports::{ProgressReporter, Provisioner, TerraformOptions};
use crate::domain::{OutputCheckResult, OutputExpectation};

/// Read the module outputs once and evaluate every expectation against them.
///
/// Each row is independent: a missing or wrong value is recorded and the
/// remaining rows still run. If the outputs cannot be read at all, every row
/// fails with that error.
pub async fn check_outputs(
    provisioner: &impl Provisioner,
    reporter: &impl ProgressReporter,
    options: &TerraformOptions,
    expectations: &[OutputExpectation],
) -> Vec<OutputCheckResult> {
    let outputs = provisioner
        .output_all(options)
        .await
        .map_err(|e| format!("{e:#}"));

    let mut results = Vec::with_capacity(expectations.len());
    for expectation in expectations {
        let lookup = match &outputs {
            Ok(map) => map
                .get(expectation.key)
                .map(String::as_str)
                .ok_or("no output with that name"),
            Err(e) => Err(e.as_str()),
        };
        let result = expectation.evaluate(lookup);
        match &result.failure {
            None => reporter.success(&format!("output {} = {}", result.key, result.expected)),
            Some(msg) => reporter.failure(&format!("output {}: {msg}", result.key)),
        }
        results.push(result);
    }
    results
}
