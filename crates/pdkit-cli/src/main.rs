//! pdkit CLI - Command-line tools for Pure Data patches.

mod commands;

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pdkit")]
#[command(author, version, about = "Pure Data patch toolkit", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Configuration file (default: ./pdkit.toml, then the user config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite a patch in canonical form
    Fmt(commands::fmt::FmtArgs),

    /// Summarize a patch
    Info(commands::info::InfoArgs),

    /// Check connections against port counts and report cycles
    Validate(commands::validate::ValidateArgs),

    /// Remove duplicate cords, pass-through objects and unused objects
    Optimize(commands::optimize::OptimizeArgs),

    /// Reposition every box by connection depth or on a grid
    Layout(commands::layout::LayoutArgs),

    /// List abstractions and externals found on disk
    Discover(commands::discover::DiscoverArgs),

    /// Report object classes missing from an allow list
    Check(commands::check::CheckArgs),

    /// Rename a send/receive symbol throughout a patch
    Rename(commands::rename::RenameArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Fmt(args) => commands::fmt::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Validate(args) => commands::validate::run(args, config),
        Commands::Optimize(args) => commands::optimize::run(args, config),
        Commands::Layout(args) => commands::layout::run(args, config),
        Commands::Discover(args) => commands::discover::run(args, config),
        Commands::Check(args) => commands::check::run(args),
        Commands::Rename(args) => commands::rename::run(args),
    }
}
