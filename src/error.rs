//! Error types for portprobe.
//!
//! Uses `thiserror` for ergonomic error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Parameter errors raised before any probe is dispatched.
///
/// Per-probe failures (refused, unreachable, timed out) are never reported
/// through this type; they are recorded on the affected `PortResult`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("invalid host: {0}")]
    InvalidHost(String),

    #[error("invalid port range {start}-{end}, valid range (1-65535)")]
    InvalidPortRange { start: u32, end: u32 },

    #[error("start port {start} cannot be greater than end port {end}")]
    StartPortGreaterThanEnd { start: u32, end: u32 },

    #[error("concurrency must be at least 1")]
    InvalidConcurrency,
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Error type for network protocol parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("unknown network '{0}' (expected tcp, tcp4, tcp6, udp, udp4 or udp6)")]
    Unknown(String),
}

/// Configuration and key/value store errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid configuration format: {0}")]
    InvalidFormat(String),

    #[error("invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidFormat(e.to_string())
    }
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for CLI command execution.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("server error: {0}")]
    Server(String),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
