//! Aggregated results of one run.

use serde::Serialize;

use crate::domain::outputs::OutputCheckResult;
use crate::domain::reachability::ReachabilityResult;
use crate::domain::stage::Stage;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RunReport {
    pub project: String,
    pub region: String,
    pub name_prefix: String,
    pub skipped_stages: Vec<Stage>,
    pub outputs: Vec<OutputCheckResult>,
    /// Instances that should be private but carry an external IP.
    pub exposure_failures: Vec<String>,
    pub reachability: Vec<ReachabilityResult>,
    /// Error from the stage that aborted the run, if any.
    pub aborted: Option<String>,
    pub teardown_error: Option<String>,
}

impl RunReport {
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.outputs.iter().filter(|o| !o.passed()).count()
            + self.exposure_failures.len()
            + self.reachability.iter().filter(|r| !r.passed()).count()
            + usize::from(self.aborted.is_some())
            + usize::from(self.teardown_error.is_some())
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.failure_count() == 0
    }
}
