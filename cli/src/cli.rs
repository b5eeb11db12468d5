//! CLI argument parsing with clap derive

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::app::{AppContext, AppFlags, OutputFlags};
use crate::commands;

/// Provision the network module under test and verify its outputs and SSH reachability
#[derive(Parser)]
#[command(
    name = "netcheck",
    version,
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true,
    after_help = "Diagnostic logs go to stderr; set RUST_LOG (e.g. RUST_LOG=netcheck=debug)."
)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Harness config file (YAML); defaults to $NETCHECK_CONFIG, then ./netcheck.yaml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Stage, apply, validate and destroy the network module
    Run(commands::run::RunArgs),

    /// Destroy the infrastructure of a run whose teardown was skipped
    Teardown,

    /// List the built-in output and reachability checks
    Checks,

    /// Show version
    Version,
}

impl Cli {
    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the command fails, or any
    /// check of a run fails.
    pub async fn run(self) -> Result<()> {
        let Cli {
            json,
            quiet,
            no_color,
            config,
            command,
        } = self;
        let flags = AppFlags {
            output: OutputFlags {
                no_color,
                quiet,
                json,
            },
            config,
        };
        match command {
            Command::Version => {
                let app = AppContext::without_config(&flags)?;
                commands::version::run(&app)
            }
            Command::Checks => {
                let app = AppContext::new(&flags)?;
                commands::checks::run(&app)
            }
            Command::Run(args) => {
                let app = AppContext::new(&flags)?;
                commands::run::run(&app, &args).await
            }
            Command::Teardown => {
                let app = AppContext::new(&flags)?;
                commands::teardown::run(&app).await
            }
        }
    }
}
