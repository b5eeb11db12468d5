//! `TerminalReporter` — Presentation-layer implementation of `ProgressReporter`.
//!
//! Wraps `&OutputContext` and implements the `application::ports::ProgressReporter`
//! trait so application services can emit progress events without depending on
//! any presentation type directly.

use std::cell::RefCell;

use indicatif::ProgressBar;
use owo_colors::OwoColorize as _;

use crate::application::ports::ProgressReporter;
use crate::output::{OutputContext, progress};

/// Terminal progress reporter that wraps an `OutputContext`.
///
/// - `step()` starts a spinner on a TTY, else prints `"  → {message}"`
/// - `success()` prints `"  ✓ {message}"`
/// - `warn()` prints `"  ! {message}"`
/// - `failure()` prints `"  ✗ {message}"`
///
/// All four are suppressed when `ctx.quiet`.
pub struct TerminalReporter<'a> {
    ctx: &'a OutputContext,
    spinner: RefCell<Option<ProgressBar>>,
}

impl<'a> TerminalReporter<'a> {
    /// Create a new `TerminalReporter` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self {
            ctx,
            spinner: RefCell::new(None),
        }
    }

    /// Stop the active spinner, if any.
    pub fn finish(&self) {
        if let Some(pb) = self.spinner.borrow_mut().take() {
            progress::finish_step(&pb);
        }
    }

    /// Print a line without tearing the active spinner.
    fn line(&self, line: &str) {
        if self.ctx.quiet {
            return;
        }
        match self.spinner.borrow().as_ref() {
            Some(pb) => pb.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}

impl Drop for TerminalReporter<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

impl ProgressReporter for TerminalReporter<'_> {
    fn step(&self, message: &str) {
        self.finish();
        if self.ctx.show_progress() {
            *self.spinner.borrow_mut() = Some(progress::spinner(message));
        } else {
            self.line(&format!("  {} {message}", "→".style(self.ctx.styles.step)));
        }
    }

    fn success(&self, message: &str) {
        self.line(&format!("  {} {message}", "✓".style(self.ctx.styles.pass)));
    }

    fn warn(&self, message: &str) {
        self.line(&format!("  {} {message}", "!".style(self.ctx.styles.warning)));
    }

    fn failure(&self, message: &str) {
        self.line(&format!("  {} {message}", "✗".style(self.ctx.styles.fail)));
    }
}
