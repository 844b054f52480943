//! prepwise CLI: the main entry point.
//!
//! Commands:
//! - `onboard`  : Write the default config file
//! - `serve`    : Start the HTTP API server
//! - `allocate` : Print a day allocation as JSON
//! - `prompt`   : Print the producer prompt
//! - `syllabus` : Summarise the syllabus and its data-quality warnings
//! - `config`   : Validate, show or locate the config file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::plan_input::PlanArgs;

#[derive(Parser)]
#[command(
    name = "prepwise",
    about = "prepwise: exam study-plan allocation and curriculum service",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the configuration directory and file
    Onboard,

    /// Start the HTTP API server
    Serve {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Allocate preparation days across the syllabus
    Allocate(PlanArgs),

    /// Render the prompt for the curriculum producer
    Prompt(PlanArgs),

    /// Show the syllabus and its data-quality warnings
    Syllabus {
        /// Syllabus JSON file (defaults to the configured or built-in one)
        #[arg(long)]
        syllabus: Option<PathBuf>,

        /// Print the raw syllabus JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Load and validate the config file
    Validate,
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Serve { port } => commands::serve::run(port).await?,
        Commands::Allocate(args) => commands::allocate::run(args).await?,
        Commands::Prompt(args) => commands::prompt::run(args).await?,
        Commands::Syllabus { syllabus, json } => commands::syllabus::run(syllabus, json).await?,
        Commands::Config { action } => match action {
            ConfigAction::Validate => commands::config_cmd::validate().await?,
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}
