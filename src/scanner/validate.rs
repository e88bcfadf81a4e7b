//! Scan parameter validation.
//!
//! Every check here runs before a single worker is spawned; a request that
//! fails validation produces no probes and no partial results.

use crate::error::{ScanError, ScanResult};
use crate::types::{Port, PortRange};
use std::net::IpAddr;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Check that `host` is an IP literal or a name that resolves.
pub async fn validate_host(host: &str) -> ScanResult<()> {
    let host = host.trim();

    if host.parse::<IpAddr>().is_ok() {
        return Ok(());
    }

    if !is_valid_hostname(host) {
        return Err(ScanError::InvalidHost(host.to_string()));
    }

    let resolver = TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
        debug!(error = %e, "system resolver config unavailable, using defaults");
        TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
    });

    match resolver.lookup_ip(host).await {
        Ok(response) if response.iter().next().is_some() => Ok(()),
        Ok(_) => Err(ScanError::InvalidHost(host.to_string())),
        Err(e) => {
            debug!(host, error = %e, "host lookup failed");
            Err(ScanError::InvalidHost(host.to_string()))
        }
    }
}

/// Check both bounds and their order, producing the range to scan.
pub fn validate_ports(start: u32, end: u32) -> ScanResult<PortRange> {
    let (Some(start_port), Some(end_port)) = (Port::from_u32(start), Port::from_u32(end)) else {
        return Err(ScanError::InvalidPortRange { start, end });
    };

    PortRange::new(start_port, end_port)
        .map_err(|_| ScanError::StartPortGreaterThanEnd { start, end })
}

/// Concurrency of zero would leave the job queue without consumers.
pub fn validate_concurrency(concurrency: usize) -> ScanResult<usize> {
    if concurrency == 0 {
        Err(ScanError::InvalidConcurrency)
    } else {
        Ok(concurrency)
    }
}

/// Check if a string is a valid hostname.
fn is_valid_hostname(s: &str) -> bool {
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    let s = s.strip_suffix('.').unwrap_or(s);

    // Each label must be 1-63 characters
    for label in s.split('.') {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        // Must start and end with alphanumeric
        if !label.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if !label.chars().last().is_some_and(|c| c.is_ascii_alphanumeric()) {
            return false;
        }
        // Can only contain alphanumeric and hyphens
        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return false;
        }
    }

    true
}
