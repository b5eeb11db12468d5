//! Command implementations

pub mod checks;
pub mod run;
pub mod teardown;
pub mod version;
