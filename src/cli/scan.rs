//! Scan subcommand implementation.
//!
//! Handles `portprobe scan <network> <host> <start> <end> <concurrency> <throttle>`.

use crate::config::AppSettings;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use crate::scanner::{ConnectProber, PortScanner, ScanRequest};
use crate::types::Network;
use clap::{ArgAction, Parser};

/// Scan a range of ports on a host.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Network to probe over (tcp, tcp4, tcp6, udp, udp4, udp6)
    #[arg(value_name = "NETWORK")]
    pub network: Network,

    /// Target IP address or hostname
    #[arg(value_name = "HOST")]
    pub host: String,

    /// First port of the range (1-65535)
    #[arg(value_name = "START_PORT")]
    pub start_port: u32,

    /// Last port of the range (1-65535)
    #[arg(value_name = "END_PORT")]
    pub end_port: u32,

    /// Number of concurrent workers
    #[arg(value_name = "CONCURRENCY")]
    pub concurrency: usize,

    /// Pause between probes (true|false)
    #[arg(value_name = "THROTTLE", action = ArgAction::Set, value_parser = clap::value_parser!(bool))]
    pub throttle: bool,

    /// Output format for results
    #[arg(short, long, value_enum, default_value = "plain")]
    pub output: OutputFormat,
}

impl ScanCommand {
    /// Build the engine request from the positional arguments.
    pub fn request(&self) -> ScanRequest {
        ScanRequest::new(&self.host, self.start_port, self.end_port)
            .with_network(self.network)
            .with_concurrency(self.concurrency)
            .with_throttle(self.throttle)
    }

    /// Build a scanner configured from `settings`.
    pub fn scanner(&self, settings: &AppSettings) -> CliResult<PortScanner> {
        let prober = match settings.connect_timeout() {
            Some(limit) => ConnectProber::new().with_timeout(limit),
            None => ConnectProber::new(),
        };

        Ok(PortScanner::new()
            .with_prober(prober)
            .with_throttle_policy(settings.throttle_policy()?))
    }

    /// Execute the scan command.
    pub async fn execute(&self, settings: &AppSettings, quiet: bool) -> CliResult<()> {
        let scanner = self.scanner(settings)?;

        if !self.network.is_tcp() && !quiet {
            output::print_warning(
                "UDP is connectionless; ports report open whenever the local dial succeeds.",
            );
        }

        let report = scanner.scan(self.request()).await?;

        output::print_report(&report, self.output)?;

        if !quiet && self.output == OutputFormat::Plain {
            output::print_info(&report.summary());
        }

        Ok(())
    }
}
