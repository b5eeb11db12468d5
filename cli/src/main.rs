//! netcheck - integration test harness for a cloud network module

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

use netcheck::cli::Cli;
use netcheck::domain::{ConfigError, HarnessError};
use netcheck::output::json::format_error;

#[tokio::main]
async fn main() {
    // Diagnostics are opt-in through RUST_LOG; user-facing progress is
    // printed by the commands themselves.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();

    let cli = Cli::parse();
    let json = cli.json;
    if let Err(e) = cli.run().await {
        // The report has already been rendered.
        let checks_failed = matches!(
            e.downcast_ref::<HarnessError>(),
            Some(HarnessError::ChecksFailed(_))
        );
        if json && !checks_failed {
            match format_error(&format!("{e:#}"), error_code(&e)) {
                Ok(doc) => println!("{doc}"),
                Err(_) => eprintln!("Error: {e:#}"),
            }
        } else {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(1);
    }
}

/// Stable machine-readable code for the JSON error object.
fn error_code(e: &anyhow::Error) -> &'static str {
    if let Some(err) = e.downcast_ref::<HarnessError>() {
        return match err {
            HarnessError::MissingProject { .. } => "missing_project",
            HarnessError::NoRegion { .. } => "no_region",
            HarnessError::NoRunState => "no_run_state",
            HarnessError::InvalidNamePrefix(_) => "invalid_name_prefix",
            HarnessError::EmptyOutput(_) => "empty_output",
            HarnessError::ChecksFailed(_) => "checks_failed",
        };
    }
    if e.downcast_ref::<ConfigError>().is_some() {
        return "invalid_config";
    }
    "error"
}
