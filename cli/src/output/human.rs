//! Human-readable terminal renderer.

use owo_colors::OwoColorize as _;

use crate::domain::{
    HarnessConfig, HostRole, OutputExpectation, ReachabilityCheck, ReachabilityResult, RunReport,
    RunState,
};
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render the CLI version information.
    pub fn render_version(&self, version: &str) {
        println!("netcheck {version}");
    }

    /// Render the summary of a run. Failures are printed even when quiet.
    pub fn render_report(&self, report: &RunReport) {
        if !self.ctx.quiet {
            println!();
            self.ctx.header("Network Test Report");
            println!();
            self.ctx.kv("Project:    ", &report.project);
            self.ctx.kv("Region:     ", &report.region);
            self.ctx.kv("Name prefix:", &report.name_prefix);
            if !report.skipped_stages.is_empty() {
                let skipped: Vec<&str> = report.skipped_stages.iter().map(|s| s.name()).collect();
                self.ctx.kv("Skipped:    ", &skipped.join(", "));
            }
        }

        if !report.outputs.is_empty() {
            self.section("Outputs:");
            for out in &report.outputs {
                match &out.failure {
                    None => self.print_check(true, &format!("{} = {}", out.key, out.expected)),
                    Some(msg) => self.print_check(false, &format!("{}: {msg}", out.key)),
                }
            }
        }

        if !report.exposure_failures.is_empty() {
            self.section("Exposure:");
            for msg in &report.exposure_failures {
                self.print_check(false, msg);
            }
        }

        if !report.reachability.is_empty() {
            self.section("Reachability:");
            for result in &report.reachability {
                self.print_reachability(result);
            }
        }

        if let Some(err) = &report.aborted {
            self.section("Aborted:");
            self.print_check(false, err);
        }
        if let Some(err) = &report.teardown_error {
            self.section("Teardown:");
            self.print_check(false, err);
        }

        println!();
        let failures = report.failure_count();
        if failures == 0 {
            if !self.ctx.quiet {
                println!("  {} All checks passed", "✓".style(self.ctx.styles.pass));
            }
        } else {
            println!(
                "  {} {failures} check(s) failed",
                "✗".style(self.ctx.styles.fail)
            );
        }
        println!();
    }

    /// Render the built-in output and reachability tables.
    pub fn render_checks(
        &self,
        outputs: &[OutputExpectation],
        reachability: &[ReachabilityCheck],
        config: &HarnessConfig,
    ) {
        println!();
        self.ctx.header("Terraform outputs");
        println!();
        for out in outputs {
            println!("    {:<28} {}", out.key, out.expected);
        }
        println!();
        self.ctx.header("SSH reachability");
        println!();
        for check in reachability {
            let expect = if check.expect.expects_success() {
                "reachable".style(self.ctx.styles.pass).to_string()
            } else {
                "blocked".style(self.ctx.styles.warning).to_string()
            };
            let attempts = config.ssh_retries_for(check.expect.expects_success());
            println!(
                "    {:<44} {expect:<10} {}",
                route_label(check.route),
                format!("{attempts} attempts").style(self.ctx.styles.dim)
            );
        }
        println!();
    }

    /// Render the confirmation of a finished teardown.
    pub fn render_teardown(&self, state: &RunState) {
        self.ctx.success(&format!(
            "{} destroyed in {}/{}",
            state.name_prefix, state.project, state.region
        ));
    }

    fn print_reachability(&self, result: &ReachabilityResult) {
        let route = route_label(&result.route);
        match &result.failure {
            None => {
                let outcome = if result.expect.expects_success() {
                    "reachable"
                } else {
                    "blocked"
                };
                self.print_check(true, &format!("{route} ({outcome})"));
            }
            Some(msg) => self.print_check(
                false,
                &format!("{route}: {msg} ({} attempts)", result.attempts),
            ),
        }
    }

    fn section(&self, title: &str) {
        println!();
        println!("  {}", title.style(self.ctx.styles.emphasis));
    }

    fn print_check(&self, ok: bool, msg: &str) {
        if ok {
            if !self.ctx.quiet {
                println!("    {} {msg}", "✓".style(self.ctx.styles.pass));
            }
        } else {
            println!("    {} {msg}", "✗".style(self.ctx.styles.fail));
        }
    }
}

/// `public → private → external`
#[must_use]
pub fn route_label(route: &[HostRole]) -> String {
    route
        .iter()
        .map(|r| r.label())
        .collect::<Vec<_>>()
        .join(" → ")
}
