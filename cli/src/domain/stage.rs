//! Run stages and the rules for skipping them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::ConfigError;

/// The four stages of a run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Setup,
    Deploy,
    Validate,
    Teardown,
}

impl Stage {
    pub const ALL: [Stage; 4] = [Stage::Setup, Stage::Deploy, Stage::Validate, Stage::Teardown];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Deploy => "deploy",
            Self::Validate => "validate",
            Self::Teardown => "teardown",
        }
    }

    /// Environment variable that skips this stage when set, e.g. `SKIP_teardown`.
    #[must_use]
    pub fn skip_env_var(self) -> String {
        format!("SKIP_{}", self.name())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownStage(s.to_string()))
    }
}

/// Which stages run in this invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagePlan {
    skipped: Vec<Stage>,
}

impl StagePlan {
    /// Build a plan from explicit `--skip` stages plus `SKIP_<stage>` variables.
    ///
    /// `env` looks up a variable; any non-empty value counts as set.
    pub fn new(explicit: &[Stage], env: impl Fn(&str) -> Option<String>) -> Self {
        let mut skipped: Vec<Stage> = explicit.to_vec();
        for stage in Stage::ALL {
            let set = env(&stage.skip_env_var()).is_some_and(|v| !v.is_empty());
            if set && !skipped.contains(&stage) {
                skipped.push(stage);
            }
        }
        Self { skipped }
    }

    #[must_use]
    pub fn runs(&self, stage: Stage) -> bool {
        !self.skipped.contains(&stage)
    }

    #[must_use]
    pub fn skipped(&self) -> &[Stage] {
        &self.skipped
    }
}
