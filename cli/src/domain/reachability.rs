//! The fixed table of SSH reachability checks and how their outcomes are judged.

use serde::Serialize;

use crate::domain::hosts::HostRole;

/// What a reachability check expects to happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Expectation {
    Success,
    Failure,
}

impl Expectation {
    #[must_use]
    pub fn expects_success(self) -> bool {
        self == Self::Success
    }
}

/// One row: SSH along `route` (first hop is dialled directly, the rest are
/// reached through the previous hops) and run the echo probe on the last hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReachabilityCheck {
    pub name: &'static str,
    pub expect: Expectation,
    pub route: &'static [HostRole],
}

use Expectation::{Failure, Success};
use HostRole::{External, Private, PrivatePersistence, PrivatePublic, Public, PublicNoIp};

#[rustfmt::skip]
pub const REACHABILITY_CHECKS: &[ReachabilityCheck] = &[
    ReachabilityCheck { name: "public", expect: Success, route: &[Public] },
    ReachabilityCheck { name: "public to external", expect: Success, route: &[Public, External] },
    ReachabilityCheck { name: "public to public-no-ip", expect: Success, route: &[Public, PublicNoIp] },
    ReachabilityCheck { name: "public to private-public", expect: Success, route: &[Public, PrivatePublic] },
    ReachabilityCheck { name: "public to private", expect: Success, route: &[Public, Private] },
    ReachabilityCheck {
        name: "public to private-public to external",
        expect: Success,
        route: &[Public, PrivatePublic, External],
    },
    ReachabilityCheck {
        name: "public to private to private-persistence",
        expect: Success,
        route: &[Public, Private, PrivatePersistence],
    },
    ReachabilityCheck { name: "public-no-ip", expect: Failure, route: &[PublicNoIp] },
    ReachabilityCheck { name: "private-public", expect: Failure, route: &[PrivatePublic] },
    ReachabilityCheck { name: "private", expect: Failure, route: &[Private] },
    ReachabilityCheck {
        name: "public to private-persistence",
        expect: Failure,
        route: &[Public, PrivatePersistence],
    },
    ReachabilityCheck {
        name: "public to private to external",
        expect: Failure,
        route: &[Public, Private, External],
    },
];

/// Shell command run on the final hop.
#[must_use]
pub fn echo_command(echo_text: &str) -> String {
    format!("echo '{echo_text}'")
}

/// Compare probe output with the echo text, ignoring surrounding whitespace.
///
/// # Errors
///
/// Returns a message describing the mismatch.
pub fn verify_echo(echo_text: &str, output: &str) -> Result<(), String> {
    if echo_text.trim() == output.trim() {
        Ok(())
    } else {
        Err(format!("Expected: {echo_text}. Got: {output}"))
    }
}

/// Judge a check from its expectation and the final retry outcome.
///
/// Returns `None` when the outcome matches the expectation, otherwise the
/// failure message.
#[must_use]
pub fn verdict(expect: Expectation, outcome: &Result<(), String>) -> Option<String> {
    match (expect, outcome) {
        (Expectation::Success, Err(err)) => Some(format!("Expected success but saw: {err}")),
        (Expectation::Failure, Ok(())) => Some("Expected an error but saw none.".to_string()),
        _ => None,
    }
}

/// Result of one reachability check after retries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReachabilityResult {
    pub name: String,
    pub expect: Expectation,
    pub route: Vec<HostRole>,
    /// Probe attempts made, including the last one.
    pub attempts: u32,
    /// Last probe error, if the probe never succeeded.
    pub last_error: Option<String>,
    /// `None` when the check passed.
    pub failure: Option<String>,
}

impl ReachabilityResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}
