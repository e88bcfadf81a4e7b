//! # portprobe - Port Range Prober
//!
//! portprobe checks a contiguous range of TCP or UDP ports on one host and
//! classifies each as open, closed, or timed out, returning a sorted report
//! together with the elapsed wall-clock time.
//!
//! ## Features
//!
//! - **Bounded parallelism**: a fixed pool of workers fed from a bounded job queue
//! - **Pluggable probing**: any [`scanner::ProbeStrategy`] can replace the default connect prober
//! - **Adaptive throttling**: randomized per-probe pauses that grow as the target starts failing probes
//! - **Failure isolation**: per-port errors are recorded on that port's result and never abort a scan
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portprobe::scanner::{PortScanner, ScanRequest};
//!
//! #[tokio::main]
//! async fn main() {
//!     let request = ScanRequest::new("127.0.0.1", 1, 1024).with_concurrency(100);
//!     let report = PortScanner::new().scan(request).await.unwrap();
//!
//!     for result in &report.results {
//!         println!("Port {}: {}", result.port, result.status);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Port and network newtypes
//! - [`scanner`] - Validation, worker pool, probing, throttling and collection
//! - [`config`] - Application settings and the key/value store
//! - [`server`] - HTTP lookups into the key/value store
//! - [`cli`] - Command-line subcommands
//! - [`output`] - Report rendering
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ConfigError, ScanError};
pub use scanner::{
    PortResult, PortScanner, PortStatus, ProbeOutcome, ProbeStrategy, ScanReport, ScanRequest,
};
pub use types::{Network, Port, PortRange};
