//! Serve subcommand implementation.

use crate::config::{AppSettings, ConfigStore};
use crate::error::CliResult;
use crate::server;
use clap::Parser;

/// Serve configuration lookups over HTTP.
#[derive(Parser, Debug)]
pub struct ServeCommand {
    /// Address to bind (defaults to the `listen_addr` setting)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,
}

impl ServeCommand {
    /// Load the store and serve it until interrupted.
    pub async fn execute(&self, settings: &AppSettings) -> CliResult<()> {
        let store = ConfigStore::load(&settings.store_file()?)?;
        let addr = self.bind.as_deref().unwrap_or(&settings.listen_addr);
        server::serve(addr, store).await
    }
}
