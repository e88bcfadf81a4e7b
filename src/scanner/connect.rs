//! Default connection prober.
//!
//! Performs a plain connect using the operating system's socket API and
//! classifies the outcome. No special privileges are required.

use crate::scanner::traits::{ProbeOutcome, ProbeStrategy};
use crate::types::{Network, Port};
use async_trait::async_trait;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::{lookup_host, TcpStream, UdpSocket};
use tokio::time::timeout;

/// Connect-based probe strategy.
///
/// Without an explicit timeout the attempt is bounded only by the network
/// stack's own connect timeout.
#[derive(Debug, Clone, Default)]
pub struct ConnectProber {
    connect_timeout: Option<Duration>,
}

impl ConnectProber {
    /// Create a prober that relies on the stack's implicit timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound every connect attempt by `connect_timeout`.
    pub fn with_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = Some(connect_timeout);
        self
    }

    /// The configured connect timeout, if any.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// Resolve `host:port` and keep the addresses `network` allows.
    async fn resolve(network: Network, host: &str, port: Port) -> io::Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = lookup_host((host, port.as_u16()))
            .await?
            .filter(|addr| network.accepts(addr))
            .collect();

        if addrs.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no {} address found for {}", network, host),
            ));
        }
        Ok(addrs)
    }

    async fn connect(network: Network, host: &str, port: Port) -> io::Result<()> {
        let addrs = Self::resolve(network, host, port).await?;

        if network.is_tcp() {
            let stream = TcpStream::connect(&addrs[..]).await?;
            drop(stream);
            return Ok(());
        }

        // Datagram sockets have no handshake; a successful connect is the
        // whole dial.
        let mut last_err = None;
        for addr in addrs {
            let local: SocketAddr = if addr.is_ipv4() {
                (Ipv4Addr::UNSPECIFIED, 0).into()
            } else {
                (Ipv6Addr::UNSPECIFIED, 0).into()
            };
            let attempt = async {
                let socket = UdpSocket::bind(local).await?;
                socket.connect(addr).await
            };
            match attempt.await {
                Ok(()) => return Ok(()),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::AddrNotAvailable)))
    }
}

#[async_trait]
impl ProbeStrategy for ConnectProber {
    async fn probe(&self, network: Network, host: &str, port: Port) -> ProbeOutcome {
        let attempt = Self::connect(network, host, port);

        let result = match self.connect_timeout {
            Some(limit) => match timeout(limit, attempt).await {
                Ok(result) => result,
                Err(_) => {
                    return ProbeOutcome::timed_out(format!(
                        "dial {} {}:{}: connection timed out after {:?}",
                        network, host, port, limit
                    ))
                }
            },
            None => attempt.await,
        };

        match result {
            Ok(()) => ProbeOutcome::open(),
            Err(e) => classify(network, host, port, &e),
        }
    }
}

/// Map a connect failure onto a port status.
fn classify(network: Network, host: &str, port: Port, err: &io::Error) -> ProbeOutcome {
    let message = format!("dial {} {}:{}: {}", network, host, port, err);
    match err.kind() {
        io::ErrorKind::TimedOut => ProbeOutcome::timed_out(message),
        _ => ProbeOutcome::closed(message),
    }
}
