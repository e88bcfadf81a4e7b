//! Scanner module - the port range scan engine.
//!
//! A scan is validated once, then run by a fixed pool of tokio workers that
//! pull ports from a bounded job queue, probe them through a pluggable
//! [`ProbeStrategy`], optionally throttle, and push results to a collector
//! that sorts them into a [`ScanReport`].

pub mod collector;
pub mod connect;
pub mod throttle;
pub mod traits;
pub mod validate;

use crate::error::ScanResult;
use crate::types::{Network, Port, PortRange};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, trace};

pub use collector::ScanReport;
pub use connect::ConnectProber;
pub use throttle::{Throttle, ThrottlePolicy};
pub use traits::{PortResult, PortStatus, ProbeOutcome, ProbeStrategy};

/// Parameters for one scan, as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    /// Defaults to TCP when unset.
    pub network: Option<Network>,
    /// IP literal or resolvable host name.
    pub host: String,
    pub start_port: u32,
    pub end_port: u32,
    /// Number of concurrent workers, at least 1.
    pub concurrency: usize,
    /// Pause after every probe.
    pub throttle: bool,
}

impl ScanRequest {
    /// Create a request with a single worker and no throttling.
    pub fn new(host: impl Into<String>, start_port: u32, end_port: u32) -> Self {
        Self {
            network: None,
            host: host.into(),
            start_port,
            end_port,
            concurrency: 1,
            throttle: false,
        }
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = Some(network);
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_throttle(mut self, throttle: bool) -> Self {
        self.throttle = throttle;
        self
    }
}

/// Entry point for running scans.
///
/// Holds the probe strategy and throttle policy; each call to
/// [`PortScanner::scan`] builds its own job and result pipeline.
#[derive(Clone, Default)]
pub struct PortScanner {
    prober: Option<Arc<dyn ProbeStrategy>>,
    throttle_policy: ThrottlePolicy,
}

impl fmt::Debug for PortScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortScanner")
            .field("custom_prober", &self.prober.is_some())
            .field("throttle_policy", &self.throttle_policy)
            .finish()
    }
}

impl PortScanner {
    /// Create a scanner that will use [`ConnectProber`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the probe strategy.
    pub fn with_prober(mut self, prober: impl ProbeStrategy + 'static) -> Self {
        self.prober = Some(Arc::new(prober));
        self
    }

    pub fn with_throttle_policy(mut self, policy: ThrottlePolicy) -> Self {
        self.throttle_policy = policy;
        self
    }

    /// Check `request` and fill in defaults.
    ///
    /// Fails with the first problem found, in order: host, port bounds,
    /// port order, concurrency.
    pub async fn validate(&self, request: ScanRequest) -> ScanResult<ValidatedScan> {
        validate::validate_host(&request.host).await?;
        let range = validate::validate_ports(request.start_port, request.end_port)?;
        let concurrency = validate::validate_concurrency(request.concurrency)?;

        let prober = self
            .prober
            .clone()
            .unwrap_or_else(|| Arc::new(ConnectProber::new()));

        Ok(ValidatedScan {
            network: request.network.unwrap_or_default(),
            host: request.host.trim().to_string(),
            range,
            concurrency,
            throttle: request.throttle,
            throttle_policy: self.throttle_policy,
            prober,
        })
    }

    /// Validate `request` and run it to completion.
    ///
    /// Only validation can fail; per-port failures are recorded on the
    /// corresponding [`PortResult`].
    pub async fn scan(&self, request: ScanRequest) -> ScanResult<ScanReport> {
        let scan = self.validate(request).await?;
        Ok(scan.run().await)
    }
}

/// A request that passed validation. Consumed by [`ValidatedScan::run`].
pub struct ValidatedScan {
    network: Network,
    host: String,
    range: PortRange,
    concurrency: usize,
    throttle: bool,
    throttle_policy: ThrottlePolicy,
    prober: Arc<dyn ProbeStrategy>,
}

impl fmt::Debug for ValidatedScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedScan")
            .field("network", &self.network)
            .field("host", &self.host)
            .field("range", &self.range)
            .field("concurrency", &self.concurrency)
            .field("throttle", &self.throttle)
            .finish_non_exhaustive()
    }
}

/// State every worker of one scan shares read-only, plus the error counter.
struct WorkerContext {
    network: Network,
    host: String,
    prober: Arc<dyn ProbeStrategy>,
    throttle: Throttle,
    throttle_enabled: bool,
}

impl ValidatedScan {
    pub fn network(&self) -> Network {
        self.network
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn range(&self) -> PortRange {
        self.range
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn throttle(&self) -> bool {
        self.throttle
    }

    /// Probe every port in the range exactly once and return the sorted report.
    ///
    /// # Panics
    ///
    /// Resumes the panic of a worker whose probe strategy panicked.
    pub async fn run(self) -> ScanReport {
        let started = Instant::now();
        let total = self.range.len();
        // Extra workers beyond the port count would exit without a job.
        let workers = self.concurrency.min(total);

        info!(
            host = %self.host,
            network = %self.network,
            ports = %self.range,
            concurrency = self.concurrency,
            throttle = self.throttle,
            "starting scan"
        );

        let (job_tx, job_rx) = mpsc::channel::<Port>(workers);
        let (result_tx, result_rx) = mpsc::channel::<PortResult>(total);
        let job_rx = Arc::new(Mutex::new(job_rx));

        let ctx = Arc::new(WorkerContext {
            network: self.network,
            host: self.host.clone(),
            prober: self.prober,
            throttle: Throttle::new(self.throttle_policy),
            throttle_enabled: self.throttle,
        });

        let mut pool = JoinSet::new();
        for worker_id in 0..workers {
            pool.spawn(run_worker(
                worker_id,
                Arc::clone(&ctx),
                Arc::clone(&job_rx),
                result_tx.clone(),
            ));
        }
        drop(job_rx);

        let supervisor = tokio::spawn(supervise(pool, result_tx));

        let range = self.range;
        let dispatcher = tokio::spawn(async move {
            for port in range.iter() {
                if job_tx.send(port).await.is_err() {
                    break;
                }
            }
        });

        let (results, elapsed) = collector::collect(result_rx, total, started).await;

        match supervisor.await {
            Ok(None) => {}
            Ok(Some(payload)) => std::panic::resume_unwind(payload),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => {}
        }
        if let Err(e) = dispatcher.await {
            if e.is_panic() {
                std::panic::resume_unwind(e.into_panic());
            }
        }

        debug!(
            errors = ctx.throttle.error_count(),
            collected = results.len(),
            "all workers finished"
        );
        info!(host = %self.host, elapsed = ?elapsed, "scan completed");

        ScanReport {
            host: self.host,
            network: self.network,
            results,
            elapsed,
        }
    }
}

/// Completion barrier: join every worker, then close the result queue.
///
/// Holds the last result sender, so the collector sees the queue close only
/// after all workers have exited. Returns the first worker panic, if any.
async fn supervise(
    mut pool: JoinSet<()>,
    results: mpsc::Sender<PortResult>,
) -> Option<Box<dyn Any + Send>> {
    let mut panicked = None;
    while let Some(joined) = pool.join_next().await {
        if let Err(e) = joined {
            if e.is_panic() && panicked.is_none() {
                panicked = Some(e.into_panic());
            }
        }
    }
    drop(results);
    trace!("worker pool drained, result queue closed");
    panicked
}

async fn run_worker(
    worker_id: usize,
    ctx: Arc<WorkerContext>,
    jobs: Arc<Mutex<mpsc::Receiver<Port>>>,
    results: mpsc::Sender<PortResult>,
) {
    trace!(worker = worker_id, "worker started");

    loop {
        let port = {
            let mut rx = jobs.lock().await;
            rx.recv().await
        };

        let Some(port) = port else {
            break;
        };

        let outcome = ctx.prober.probe(ctx.network, &ctx.host, port).await;
        if outcome.is_error() {
            ctx.throttle.record_error();
        }
        trace!(
            worker = worker_id,
            port = port.as_u16(),
            status = %outcome.status,
            error = outcome.error.as_deref().unwrap_or(""),
            "probed"
        );

        if results
            .send(PortResult::from_outcome(port, outcome))
            .await
            .is_err()
        {
            break;
        }

        if ctx.throttle_enabled {
            ctx.throttle.pause().await;
        }
    }

    trace!(worker = worker_id, "worker exiting");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// Even ports open, odd ports closed.
    struct EvenOpen;

    #[async_trait]
    impl ProbeStrategy for EvenOpen {
        async fn probe(&self, _: Network, _: &str, port: Port) -> ProbeOutcome {
            if port.as_u16() % 2 == 0 {
                ProbeOutcome::open()
            } else {
                ProbeOutcome {
                    status: PortStatus::Closed,
                    error: None,
                }
            }
        }
    }

    /// Counts visits per port.
    #[derive(Default)]
    struct Recording {
        seen: Arc<StdMutex<HashMap<u16, usize>>>,
    }

    #[async_trait]
    impl ProbeStrategy for Recording {
        async fn probe(&self, _: Network, _: &str, port: Port) -> ProbeOutcome {
            tokio::task::yield_now().await;
            *self.seen.lock().unwrap().entry(port.as_u16()).or_default() += 1;
            ProbeOutcome::closed("connection refused")
        }
    }

    /// Fails every probe, alternating timeout and refusal.
    struct AlwaysFails;

    #[async_trait]
    impl ProbeStrategy for AlwaysFails {
        async fn probe(&self, _: Network, host: &str, port: Port) -> ProbeOutcome {
            if port.as_u16() % 3 == 0 {
                ProbeOutcome::timed_out(format!("dial {}:{}: i/o timeout", host, port))
            } else {
                ProbeOutcome::closed(format!("dial {}:{}: unreachable", host, port))
            }
        }
    }

    struct Panics;

    #[async_trait]
    impl ProbeStrategy for Panics {
        async fn probe(&self, _: Network, _: &str, port: Port) -> ProbeOutcome {
            if port.as_u16() == 3 {
                panic!("probe exploded");
            }
            ProbeOutcome::open()
        }
    }

    fn assert_complete_and_sorted(report: &ScanReport, start: u16, end: u16) {
        let ports: Vec<u16> = report.results.iter().map(|r| r.port.as_u16()).collect();
        let expected: Vec<u16> = (start..=end).collect();
        assert_eq!(ports, expected);
    }

    #[tokio::test]
    async fn test_validate_defaults() {
        let scan = PortScanner::new()
            .validate(ScanRequest::new("127.0.0.1", 1, 65535))
            .await
            .unwrap();
        assert_eq!(scan.network(), Network::Tcp);
        assert_eq!(scan.range().len(), 65535);
        assert_eq!(scan.concurrency(), 1);
        assert!(!scan.throttle());
    }

    #[tokio::test]
    async fn test_validate_errors() {
        let scanner = PortScanner::new();

        let err = scanner
            .validate(ScanRequest::new("invalid_host", 1, 65535))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidHost(_)));

        let err = scanner
            .validate(ScanRequest::new("127.0.0.1", 0, 65535))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidPortRange { .. }));

        let err = scanner
            .validate(ScanRequest::new("127.0.0.1", 1, 0))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidPortRange { .. }));

        let err = scanner
            .validate(ScanRequest::new("127.0.0.1", 65535, 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::StartPortGreaterThanEnd { .. }));

        let err = scanner
            .validate(ScanRequest::new("127.0.0.1", 1, 10).with_concurrency(0))
            .await
            .unwrap_err();
        assert_eq!(err, ScanError::InvalidConcurrency);
    }

    #[tokio::test]
    async fn test_host_checked_before_ports() {
        let err = PortScanner::new()
            .scan(ScanRequest::new("invalid_host", 0, 99999))
            .await
            .unwrap_err();
        assert!(matches!(err, ScanError::InvalidHost(_)));
    }

    #[tokio::test]
    async fn test_scan_with_mock_prober() {
        let report = PortScanner::new()
            .with_prober(EvenOpen)
            .scan(ScanRequest::new("127.0.0.1", 1, 10).with_concurrency(2))
            .await
            .unwrap();

        assert_eq!(report.len(), 10);
        assert_eq!(report.open_count(), 5);
        assert!(report
            .results
            .iter()
            .all(|r| r.is_open() == (r.port.as_u16() % 2 == 0)));
        assert_complete_and_sorted(&report, 1, 10);
    }

    #[tokio::test]
    async fn test_each_port_probed_once() {
        let prober = Recording::default();
        let seen = Arc::clone(&prober.seen);

        let report = PortScanner::new()
            .with_prober(prober)
            .scan(ScanRequest::new("127.0.0.1", 1, 10).with_concurrency(5))
            .await
            .unwrap();

        assert_eq!(report.len(), 10);
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 10);
        for port in 1..=10u16 {
            assert_eq!(seen.get(&port), Some(&1), "port {} visit count", port);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_results_sorted_under_parallelism() {
        let prober = Recording::default();
        let seen = Arc::clone(&prober.seen);

        let report = PortScanner::new()
            .with_prober(prober)
            .scan(ScanRequest::new("127.0.0.1", 1000, 1999).with_concurrency(64))
            .await
            .unwrap();

        assert_complete_and_sorted(&report, 1000, 1999);
        assert!(seen.lock().unwrap().values().all(|&n| n == 1));
    }

    #[tokio::test]
    async fn test_single_port_range() {
        let report = PortScanner::new()
            .with_prober(EvenOpen)
            .scan(ScanRequest::new("127.0.0.1", 80, 80))
            .await
            .unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report.results[0].port.as_u16(), 80);
        assert_eq!(report.results[0].status, PortStatus::Open);
    }

    #[tokio::test]
    async fn test_failing_probes_do_not_abort_scan() {
        let report = PortScanner::new()
            .with_prober(AlwaysFails)
            .scan(
                ScanRequest::new("127.0.0.1", 1, 12)
                    .with_network(Network::Udp)
                    .with_concurrency(3),
            )
            .await
            .unwrap();

        assert_eq!(report.network, Network::Udp);
        assert_complete_and_sorted(&report, 1, 12);
        for result in &report.results {
            let expected = if result.port.as_u16() % 3 == 0 {
                PortStatus::Timeout
            } else {
                PortStatus::Closed
            };
            assert_eq!(result.status, expected);
            assert!(result.error.as_deref().is_some_and(|e| !e.is_empty()));
        }
        assert_eq!(report.timeout_count(), 4);
        assert_eq!(report.closed_count(), 8);
    }

    #[tokio::test]
    async fn test_concurrency_above_port_count() {
        let report = PortScanner::new()
            .with_prober(EvenOpen)
            .scan(ScanRequest::new("127.0.0.1", 20, 24).with_concurrency(500))
            .await
            .unwrap();
        assert_complete_and_sorted(&report, 20, 24);
    }

    #[tokio::test]
    async fn test_large_range() {
        let report = PortScanner::new()
            .with_prober(Recording::default())
            .scan(ScanRequest::new("127.0.0.1", 1, 10000).with_concurrency(100))
            .await
            .unwrap();
        assert_eq!(report.len(), 10000);
        assert_complete_and_sorted(&report, 1, 10000);
    }

    #[tokio::test]
    async fn test_throttle_adds_delay() {
        let request = ScanRequest::new("127.0.0.1", 1, 5).with_concurrency(1);

        let fast = PortScanner::new()
            .with_prober(EvenOpen)
            .scan(request.clone())
            .await
            .unwrap();

        let slow = PortScanner::new()
            .with_prober(EvenOpen)
            .scan(request.with_throttle(true))
            .await
            .unwrap();

        assert!(
            slow.elapsed >= Duration::from_millis(250),
            "expected throttling to add delay; took {:?}",
            slow.elapsed
        );
        assert!(slow.elapsed > fast.elapsed);
        assert_eq!(slow.len(), 5);
    }

    #[tokio::test]
    async fn test_custom_throttle_policy() {
        let ms = Duration::from_millis;
        let policy = ThrottlePolicy::new(ms(30), ms(31), 100, ms(0)).unwrap();
        let report = PortScanner::new()
            .with_prober(AlwaysFails)
            .with_throttle_policy(policy)
            .scan(
                ScanRequest::new("127.0.0.1", 1, 4)
                    .with_concurrency(2)
                    .with_throttle(true),
            )
            .await
            .unwrap();
        // Two probes per worker, each followed by a pause.
        assert!(report.elapsed >= ms(60));
    }

    #[tokio::test]
    #[should_panic(expected = "probe exploded")]
    async fn test_probe_panic_propagates() {
        let _ = PortScanner::new()
            .with_prober(Panics)
            .scan(ScanRequest::new("127.0.0.1", 1, 5).with_concurrency(2))
            .await;
    }

    #[tokio::test]
    async fn test_result_queue_closes_after_last_worker_exits() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let (tx, mut rx) = mpsc::channel::<PortResult>(1);
        let finished = Arc::new(AtomicBool::new(false));

        let mut pool = JoinSet::new();
        let flag = Arc::clone(&finished);
        pool.spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            flag.store(true, Ordering::SeqCst);
        });

        let supervisor = tokio::spawn(supervise(pool, tx));

        assert!(rx.recv().await.is_none());
        assert!(finished.load(Ordering::SeqCst));
        assert!(supervisor.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_supervisor_reports_worker_panic_after_joining_all() {
        use std::sync::atomic::{AtomicBool, Ordering};

        let (tx, mut rx) = mpsc::channel::<PortResult>(1);
        let slow_done = Arc::new(AtomicBool::new(false));

        let mut pool = JoinSet::new();
        pool.spawn(async { panic!("worker failed") });
        let flag = Arc::clone(&slow_done);
        pool.spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            flag.store(true, Ordering::SeqCst);
        });

        let payload = supervise(pool, tx).await.unwrap();
        assert_eq!(payload.downcast_ref::<&str>(), Some(&"worker failed"));
        assert!(slow_done.load(Ordering::SeqCst));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_loopback_scan_with_default_prober() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let report = PortScanner::new()
            .scan(ScanRequest::new("127.0.0.1", port.into(), port.into()))
            .await
            .unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report.results[0].status, PortStatus::Open);
        assert!(report.results[0].error.is_none());
    }
}
