//! Config subcommand implementation.
//!
//! Handles `portprobe config` for reading and writing the key/value store.

use crate::config::{AppSettings, ConfigStore};
use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::Path;

/// Set or retrieve configuration values.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Store actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Set a value
    Set {
        /// Key to set
        key: String,
        /// Value to store
        value: String,
    },

    /// Print a value (empty if unset)
    Get {
        /// Key to look up
        key: String,
    },

    /// List all values
    List,
}

impl ConfigCommand {
    /// Execute the config command against the store named by `settings`.
    pub fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let path = settings.store_file()?;
        let stdout = io::stdout();
        self.run(&path, &mut stdout.lock(), quiet)
    }

    fn run<W: Write>(&self, path: &Path, out: &mut W, quiet: bool) -> CliResult<()> {
        let store = ConfigStore::load(path)?;

        match &self.action {
            ConfigAction::Set { key, value } => {
                store.set(key.as_str(), value.as_str());
                store.save(path)?;
                if !quiet {
                    writeln!(out, "Configuration set: {} = {}", key, value)?;
                }
            }
            ConfigAction::Get { key } => {
                writeln!(out, "{}", store.get(key).unwrap_or_default())?;
            }
            ConfigAction::List => {
                for (key, value) in store.entries() {
                    writeln!(out, "{} = {}", key, value)?;
                }
            }
        }

        Ok(())
    }
}
