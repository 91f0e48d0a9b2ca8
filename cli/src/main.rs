//! # DevStudio Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the DevStudio CLI application.
//! It handles:
//! - Command-line argument parsing using Clap
//! - Setting up the logging system based on verbosity flags
//! - Routing execution to appropriate command handlers
//!
//! ## Architecture
//!
//! - Each top-level command (`run`, `emulators`, etc.) is a variant in the `Commands` enum
//! - Commands are mapped to handler functions in their respective modules
//! - All errors are propagated to this level for consistent handling
//!
//! Logs go to stderr, as do DevStudio's own status lines; stdout carries only
//! the supervised command's output.
//!
//! ## Examples
//!
//! ```bash
//! # Get help
//! devstudio --help
//!
//! # Start the emulators with debug logging
//! devstudio -vv emulators --only hosting,functions
//! ```
//!
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

// Declare the top-level modules of the CLI crate.
mod commands; // Subcommand handlers (run, emulators, deploy, git, health, info, last)
mod common; // Process runner and control loop
mod core; // Core infrastructure (errors, config, prefs, project detection)

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "devstudio",
    about = "DevStudio: supervised emulator, deploy and git commands",
    long_about = "Run Firebase emulators, deploys, git shortcuts or any shell command\n\
                  under supervision: merged live output, Ctrl-C to stop, meaningful exit status.",
    propagate_version = true,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

/// Enum defining all available top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    #[command(alias = "r")]
    Run(commands::run::RunArgs),
    #[command(alias = "emu")]
    Emulators(commands::emulators::EmulatorsArgs),
    Deploy(commands::deploy::DeployArgs),
    #[command(alias = "g")]
    Git(commands::git::GitArgs),
    Health(commands::health::HealthArgs),
    Info(commands::info::InfoArgs),
    Last(commands::last::LastArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let command_result = match cli.command {
        Commands::Run(args) => commands::run::handle_run(args).await,
        Commands::Emulators(args) => commands::emulators::handle_emulators(args).await,
        Commands::Deploy(args) => commands::deploy::handle_deploy(args).await,
        Commands::Git(args) => commands::git::handle_git(args).await,
        Commands::Health(args) => commands::health::handle_health(args).await,
        Commands::Info(args) => commands::info::handle_info(args).await,
        Commands::Last(args) => commands::last::handle_last(args).await,
    };

    if let Err(e) = command_result {
        tracing::error!("Command execution failed: {:?}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
