//! CLI subcommand definitions and handlers.
//!
//! - `portprobe scan <network> <host> <start> <end> <concurrency> <throttle>`
//! - `portprobe config set|get|list` - Manage the key/value store
//! - `portprobe serve` - Serve the key/value store over HTTP
//! - `portprobe version` - Print the version

mod config;
mod scan;
mod serve;

pub use config::{ConfigAction, ConfigCommand};
pub use scan::ScanCommand;
pub use serve::ServeCommand;

use crate::config::AppSettings;
use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// portprobe - probe a range of ports on a single host.
#[derive(Parser, Debug)]
#[command(name = "portprobe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Probe a range of TCP/UDP ports on a host", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to custom settings file
    #[arg(long, global = true, value_name = "PATH", env = "PORTPROBE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a range of ports on a host
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Set or retrieve configuration values
    Config(ConfigCommand),

    /// Serve configuration lookups over HTTP
    Serve(ServeCommand),

    /// Display the version number
    Version,
}

impl Cli {
    /// Default log filter implied by the global flags.
    pub fn log_filter(&self, settings: &AppSettings) -> String {
        if self.verbose {
            "debug".to_string()
        } else if self.quiet {
            "warn".to_string()
        } else {
            settings.log_level.clone()
        }
    }

    /// Run the selected subcommand.
    pub async fn execute(&self, settings: &AppSettings) -> CliResult<()> {
        match &self.command {
            Commands::Scan(cmd) => cmd.execute(settings, self.quiet).await,
            Commands::Config(cmd) => cmd.execute(settings, self.quiet),
            Commands::Serve(cmd) => cmd.execute(settings).await,
            Commands::Version => {
                println!("portprobe version {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}
