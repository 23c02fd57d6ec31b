//! Command-line interface for envlayer
//!
//! `show` prints what a layered load resolves to; `secrets` lists what the
//! secret store would override.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod secrets;
mod show;
mod utils;

/// Inspect layered per-environment configuration and secret overrides
#[derive(Parser)]
#[command(name = "envlayer", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log each loading step to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Print the merged configuration for the resolved environment
    Show(show::ShowArgs),

    /// List secrets discovered in the secret store (values masked)
    Secrets(secrets::SecretsArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Show(args) => show::run(args),
        Command::Secrets(args) => secrets::run(args),
    }
}

/// Logs go to stderr so `show` output stays valid JSON. RUST_LOG is honored;
/// without it the level is WARN, or DEBUG with `--verbose`.
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}
