//! displaykit CLI: screen geometry, display info, and GPU backend checks.
//!
//! Usage:
//!   displaykit glcheck [OPTIONS]   Select a rendering backend and self-test it
//!   displaykit screens [OPTIONS]   Show the normalized screen geometry
//!   displaykit info [OPTIONS]      Show display and version information
//!   displaykit check               Check environment requirements

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use displaykit_common::config::AppConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "displaykit",
    about = "Display geometry normalization and GPU rendering backend probing",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select a rendering backend and run its draw/present self-test
    Glcheck {
        /// Backend option string, e.g. "native" or "opengl:gtk,native"
        #[arg(long)]
        backends: Option<String>,

        /// Enable backends whose driver is blocklisted
        #[arg(long)]
        force: bool,

        /// Show the test window instead of drawing off-screen
        #[arg(long)]
        show: bool,

        /// How long to keep the shown window up (seconds)
        #[arg(long, default_value = "3")]
        duration: u64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the normalized screen geometry
    Screens {
        /// Read display data from a JSON fixture instead of the system
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Horizontal device-to-logical scale
        #[arg(long, default_value = "1.0")]
        scale_x: f64,

        /// Vertical device-to-logical scale
        #[arg(long, default_value = "1.0")]
        scale_y: f64,

        /// Print the screen as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show display and version information
    Info {
        /// Read display data from a JSON fixture instead of the system
        #[arg(long)]
        fixture: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check environment requirements
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    displaykit_common::logging::init_logging(&config.logging)?;

    match cli.command {
        Commands::Glcheck {
            backends,
            force,
            show,
            duration,
            json,
        } => {
            let options = commands::glcheck::GlCheckArgs {
                backends,
                force,
                show: show.then(|| std::time::Duration::from_secs(duration)),
                json,
            };
            let usable = commands::glcheck::run(config.render, options).await?;
            Ok(if usable {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Screens {
            fixture,
            scale_x,
            scale_y,
            json,
        } => {
            commands::screens::run(&config.geometry, fixture, scale_x, scale_y, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Info { fixture, json } => {
            commands::info::run(&config.geometry, fixture, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Check => {
            commands::check::run()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
