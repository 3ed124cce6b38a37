//! The central **abstraction** for port sweeping.
//!
//! A sweep crosses every target with every configured port and runs one
//! [`Prober::probe`] per pair. The [`ScanEngine`] owns the scheduling: a
//! semaphore caps how many probes are in flight, each probe is bounded by the
//! configured timeout, open ports flow through a channel as they are found,
//! and a [`tokio::task::JoinSet`] acts as the barrier that must drain before
//! the elapsed time is reported.
//!
//! **Architectural Note:**
//! The engine only depends on the [`Prober`] trait. The production
//! implementation is [`crate::network::tcp::TcpProber`]; tests swap in
//! simulated probers to observe concurrency and timing without real sockets.

use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use async_trait::async_trait;

mod engine;
mod progress;
mod run;

pub use engine::ScanEngine;
pub use progress::{ProgressSnapshot, ScanProgress};
pub use run::{ScanReport, ScanRun};

/// Outcome of one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// The handshake completed.
    Open,
    /// Refused, filtered, unreachable or timed out. Closed and filtered are not told apart.
    Closed,
    /// The attempt could not be made at all.
    Error(String),
}

impl ProbeResult {
    pub fn is_open(&self) -> bool {
        matches!(self, ProbeResult::Open)
    }
}

/// Defines how a single `(address, port)` pair is tested for reachability.
///
/// Implementations should not enforce their own timeout; the engine wraps every
/// call in the configured one and treats an expired probe as closed.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, addr: SocketAddrV4) -> ProbeResult;
}

/// An open port, delivered as soon as its probe finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OpenPortEvent {
    pub address: Ipv4Addr,
    pub port: u16,
}

impl OpenPortEvent {
    pub fn new(address: Ipv4Addr, port: u16) -> Self {
        Self { address, port }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.address, self.port))
    }
}

impl From<SocketAddrV4> for OpenPortEvent {
    fn from(addr: SocketAddrV4) -> Self {
        Self::new(*addr.ip(), addr.port())
    }
}

impl fmt::Display for OpenPortEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}

/// Totals for a sweep, produced once every dispatched probe has been joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub targets: u64,
    pub ports_per_target: usize,
    pub dispatched: u64,
    pub completed: u64,
    pub open: u64,
    pub errors: u64,
    pub elapsed: Duration,
}

impl ScanSummary {
    /// Probes the sweep would run if nothing cancelled it.
    pub fn total_probes(&self) -> u64 {
        self.targets * self.ports_per_target as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_port_event_formats_as_socket_addr() {
        let event = OpenPortEvent::new(Ipv4Addr::new(10, 0, 0, 1), 8080);
        assert_eq!(event.to_string(), "10.0.0.1:8080");
        assert_eq!(event.socket_addr(), "10.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(OpenPortEvent::from(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 22)).port, 22);
    }

    #[test]
    fn only_open_is_open() {
        assert!(ProbeResult::Open.is_open());
        assert!(!ProbeResult::Closed.is_open());
        assert!(!ProbeResult::Error("denied".into()).is_open());
    }
}
