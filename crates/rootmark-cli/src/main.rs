//! Rootmark CLI - exercise the collector from the command line.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

mod commands;
mod config;

#[derive(Parser)]
#[command(
    name = "rootmark",
    version,
    about = "Manually rooted mark/sweep collector playground"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Heap budget in bytes (overrides the config file; 0 means 1MB)
    #[arg(long, global = true)]
    heap_size: Option<usize>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the two-record walkthrough
    Demo(commands::demo::DemoCommand),

    /// Build synthetic object graphs and collect them
    Stress(commands::stress::StressCommand),

    /// Show the effective collector configuration
    Info(commands::info::InfoCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config(cli.config.as_deref())?;
    let gc_config = config.gc_config(cli.heap_size).normalized();

    match cli.command {
        Commands::Demo(cmd) => cmd.run(gc_config),
        Commands::Stress(cmd) => cmd.run(gc_config),
        Commands::Info(cmd) => cmd.run(&gc_config),
    }
}
