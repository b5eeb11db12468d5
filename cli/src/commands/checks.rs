//! `netcheck checks` — list the built-in checks without touching the cloud.

use anyhow::Result;

use crate::app::AppContext;
use crate::domain::{OUTPUT_EXPECTATIONS, REACHABILITY_CHECKS};

/// Print the output expectations and the reachability table.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn run(app: &AppContext) -> Result<()> {
    app.renderer()
        .render_checks(OUTPUT_EXPECTATIONS, REACHABILITY_CHECKS, &app.config)
}
