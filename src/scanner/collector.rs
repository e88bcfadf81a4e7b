//! Result collection and the final scan report.

use crate::scanner::traits::{PortResult, PortStatus};
use crate::types::Network;
use serde::{Serialize, Serializer};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Complete, ordered scan results.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub host: String,
    pub network: Network,
    /// One entry per scanned port, ascending by port.
    pub results: Vec<PortResult>,
    /// Wall-clock time from scan start until the last result was drained.
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    pub elapsed: Duration,
}

impl ScanReport {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_open()).count()
    }

    pub fn closed_count(&self) -> usize {
        self.count(PortStatus::Closed)
    }

    pub fn timeout_count(&self) -> usize {
        self.count(PortStatus::Timeout)
    }

    fn count(&self, status: PortStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }

    /// Get a short summary of the scan.
    pub fn summary(&self) -> String {
        format!(
            "{} ({}) - {} open, {} closed, {} timeout [{:.2}s]",
            self.host,
            self.network,
            self.open_count(),
            self.closed_count(),
            self.timeout_count(),
            self.elapsed.as_secs_f64()
        )
    }
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

/// Drain `results` until every sender is gone, then sort by port.
///
/// The channel closes only after the last worker drops its sender, so the
/// returned vector holds everything the workers emitted.
pub async fn collect(
    mut results: mpsc::Receiver<PortResult>,
    expected: usize,
    started: Instant,
) -> (Vec<PortResult>, Duration) {
    let mut collected = Vec::with_capacity(expected);
    while let Some(result) = results.recv().await {
        collected.push(result);
    }
    collected.sort_unstable_by_key(|r| r.port);
    (collected, started.elapsed())
}
