//! Expected Terraform output values and their evaluation.

use serde::Serialize;

/// What an output value represents. Drives the failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    PublicGateway,
    PrivateGateway,
    NetworkTag,
}

impl OutputKind {
    fn noun(self) -> &'static str {
        match self {
            Self::PublicGateway => "a public gateway",
            Self::PrivateGateway => "a private gateway",
            Self::NetworkTag => "a tag",
        }
    }
}

/// One row of the output table: `key` must read back as `expected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputExpectation {
    pub key: &'static str,
    pub expected: &'static str,
    pub kind: OutputKind,
}

// The gateway addresses prove the API allocated the intended blocks; the CIDR
// itself only echoes the module config back.
pub const OUTPUT_EXPECTATIONS: &[OutputExpectation] = &[
    OutputExpectation {
        key: "public_subnetwork_gateway",
        expected: "10.0.0.1",
        kind: OutputKind::PublicGateway,
    },
    OutputExpectation {
        key: "private_subnetwork_gateway",
        expected: "10.0.16.1",
        kind: OutputKind::PrivateGateway,
    },
    OutputExpectation {
        key: "public",
        expected: "public",
        kind: OutputKind::NetworkTag,
    },
    OutputExpectation {
        key: "private",
        expected: "private",
        kind: OutputKind::NetworkTag,
    },
    OutputExpectation {
        key: "private_persistence",
        expected: "private-persistence",
        kind: OutputKind::NetworkTag,
    },
];

/// Result of evaluating one [`OutputExpectation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputCheckResult {
    pub key: String,
    pub expected: String,
    pub actual: Option<String>,
    /// `None` when the check passed.
    pub failure: Option<String>,
}

impl OutputCheckResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

impl OutputExpectation {
    /// Evaluate a lookup result against this expectation.
    ///
    /// `lookup` is the value read from state, or the read error message.
    #[must_use]
    pub fn evaluate(&self, lookup: Result<&str, &str>) -> OutputCheckResult {
        match lookup {
            Err(err) => OutputCheckResult {
                key: self.key.to_string(),
                expected: self.expected.to_string(),
                actual: None,
                failure: Some(format!("could not find {} in outputs: {err}", self.key)),
            },
            Ok(actual) => {
                let failure = (actual != self.expected).then(|| {
                    format!(
                        "expected {} of {} but saw {actual}",
                        self.kind.noun(),
                        self.expected
                    )
                });
                OutputCheckResult {
                    key: self.key.to_string(),
                    expected: self.expected.to_string(),
                    actual: Some(actual.to_string()),
                    failure,
                }
            }
        }
    }
}
