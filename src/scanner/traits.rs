//! Probe strategy abstraction.
//!
//! Defines the single capability the scan engine needs from the network,
//! so the default connect prober and deterministic test doubles are
//! interchangeable.

use crate::types::{Network, Port};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a probed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// A connection was established.
    Open,
    /// The connection attempt failed (refused, unreachable, ...).
    Closed,
    /// The connection attempt timed out.
    Timeout,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Timeout => write!(f, "timeout"),
        }
    }
}

/// What a probe strategy reports for one port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub status: PortStatus,
    /// Text of the underlying failure, if any.
    pub error: Option<String>,
}

impl ProbeOutcome {
    /// A successful connection.
    pub fn open() -> Self {
        Self {
            status: PortStatus::Open,
            error: None,
        }
    }

    /// A failed connection with its cause.
    pub fn closed(error: impl fmt::Display) -> Self {
        Self {
            status: PortStatus::Closed,
            error: Some(error.to_string()),
        }
    }

    /// A timed-out connection with its cause.
    pub fn timed_out(error: impl fmt::Display) -> Self {
        Self {
            status: PortStatus::Timeout,
            error: Some(error.to_string()),
        }
    }

    /// Whether the probe reported an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Result of scanning a single port. Immutable once emitted by a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortResult {
    /// The port number that was scanned.
    pub port: Port,
    /// Status reported by the probe.
    pub status: PortStatus,
    /// Error text recorded by the probe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PortResult {
    /// Build the result for `port` from a probe outcome.
    pub fn from_outcome(port: Port, outcome: ProbeOutcome) -> Self {
        Self {
            port,
            status: outcome.status,
            error: outcome.error,
        }
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

/// A way of attempting one connection and classifying the outcome.
///
/// Implementations must be safe to call from many workers at once.
///
/// # Example
///
/// ```ignore
/// use portprobe::scanner::{ProbeOutcome, ProbeStrategy};
///
/// struct AlwaysOpen;
///
/// #[async_trait::async_trait]
/// impl ProbeStrategy for AlwaysOpen {
///     async fn probe(&self, _: Network, _: &str, _: Port) -> ProbeOutcome {
///         ProbeOutcome::open()
///     }
/// }
/// ```
#[async_trait]
pub trait ProbeStrategy: Send + Sync {
    /// Probe `port` on `host` over `network`.
    async fn probe(&self, network: Network, host: &str, port: Port) -> ProbeOutcome;
}
