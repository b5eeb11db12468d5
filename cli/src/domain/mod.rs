//! Domain layer — pure types, fixed check tables, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod hosts;
pub mod outputs;
pub mod reachability;
pub mod report;
pub mod run;
pub mod stage;

pub use config::{HarnessConfig, validate_config};
pub use error::{ConfigError, HarnessError, InstanceError, RetryError};
pub use hosts::{HostRole, Instance, SshHost};
pub use outputs::{OUTPUT_EXPECTATIONS, OutputCheckResult, OutputExpectation};
pub use reachability::{Expectation, REACHABILITY_CHECKS, ReachabilityCheck, ReachabilityResult};
pub use report::RunReport;
pub use run::RunState;
pub use stage::{Stage, StagePlan};
