use std::io;
use std::net::{SocketAddr, SocketAddrV4};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::scanner::{ProbeResult, Prober};

/// Pause before retrying a connect that failed for lack of sockets or local ports.
const RESOURCE_BACKOFF: Duration = Duration::from_millis(50);

/// `ENFILE` and `EMFILE`.
#[cfg(unix)]
const DESCRIPTORS_EXHAUSTED: &[i32] = &[23, 24];
/// `WSAEMFILE`.
#[cfg(windows)]
const DESCRIPTORS_EXHAUSTED: &[i32] = &[10024];
#[cfg(not(any(unix, windows)))]
const DESCRIPTORS_EXHAUSTED: &[i32] = &[];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectFailure {
    NotOpen,
    Exhausted,
    Unusable,
}

/// Probes with a plain TCP connect and closes the stream straight away.
///
/// Nothing is written or read; a completed handshake is the whole test.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpProber;

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, addr: SocketAddrV4) -> ProbeResult {
        connect_with_retry(addr, |target| TcpStream::connect(SocketAddr::V4(target))).await
    }
}

/// Drives `connect` until it gives a verdict, backing off while sockets run short.
///
/// Never gives up on exhaustion by itself; the caller's timeout bounds it.
pub(crate) async fn connect_with_retry<F, Fut, S>(addr: SocketAddrV4, mut connect: F) -> ProbeResult
where
    F: FnMut(SocketAddrV4) -> Fut,
    Fut: Future<Output = io::Result<S>>,
{
    loop {
        match connect(addr).await {
            Ok(stream) => {
                drop(stream);
                return ProbeResult::Open;
            }
            Err(e) => match classify(&e) {
                ConnectFailure::NotOpen => {
                    trace!("{addr} not open: {e}");
                    return ProbeResult::Closed;
                }
                ConnectFailure::Exhausted => {
                    debug!("Out of sockets probing {addr}, backing off: {e}");
                    tokio::time::sleep(RESOURCE_BACKOFF).await;
                }
                ConnectFailure::Unusable => return ProbeResult::Error(e.to_string()),
            },
        }
    }
}

fn classify(err: &io::Error) -> ConnectFailure {
    if err
        .raw_os_error()
        .is_some_and(|code| DESCRIPTORS_EXHAUSTED.contains(&code))
    {
        return ConnectFailure::Exhausted;
    }

    match err.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::TimedOut
        | io::ErrorKind::HostUnreachable
        | io::ErrorKind::NetworkUnreachable
        | io::ErrorKind::NetworkDown
        | io::ErrorKind::NotConnected => ConnectFailure::NotOpen,
        io::ErrorKind::AddrNotAvailable | io::ErrorKind::AddrInUse => ConnectFailure::Exhausted,
        _ => ConnectFailure::Unusable,
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::net::TcpListener;

    async fn loopback_listener() -> (TcpListener, SocketAddrV4) {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
        let SocketAddr::V4(addr) = listener.local_addr().unwrap() else {
            unreachable!("bound to an IPv4 address");
        };
        (listener, addr)
    }

    #[tokio::test]
    async fn listening_port_is_open() {
        let (_listener, addr) = loopback_listener().await;
        assert_eq!(TcpProber.probe(addr).await, ProbeResult::Open);
    }

    #[tokio::test]
    async fn released_port_is_closed() {
        let (listener, addr) = loopback_listener().await;
        drop(listener);
        assert_eq!(TcpProber.probe(addr).await, ProbeResult::Closed);
    }

    #[test]
    fn refusals_and_unreachables_are_not_open() {
        for kind in [
            io::ErrorKind::ConnectionRefused,
            io::ErrorKind::TimedOut,
            io::ErrorKind::HostUnreachable,
            io::ErrorKind::NetworkUnreachable,
        ] {
            assert_eq!(classify(&io::Error::from(kind)), ConnectFailure::NotOpen);
        }
    }

    #[test]
    fn socket_shortages_are_retried() {
        assert_eq!(
            classify(&io::Error::from(io::ErrorKind::AddrNotAvailable)),
            ConnectFailure::Exhausted
        );
        #[cfg(unix)]
        assert_eq!(classify(&io::Error::from_raw_os_error(24)), ConnectFailure::Exhausted);
    }

    #[test]
    fn other_failures_are_unusable() {
        assert_eq!(
            classify(&io::Error::from(io::ErrorKind::PermissionDenied)),
            ConnectFailure::Unusable
        );
    }

    fn emfile() -> io::Error {
        #[cfg(unix)]
        return io::Error::from_raw_os_error(24);
        #[cfg(not(unix))]
        return io::Error::from(io::ErrorKind::AddrNotAvailable);
    }

    #[tokio::test]
    async fn exhausted_attempt_is_retried_after_backoff() {
        let addr = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 22);
        let mut attempts: usize = 0;
        let started = std::time::Instant::now();

        let result = connect_with_retry(addr, |_| {
            attempts += 1;
            let outcome = if attempts == 1 { Err(emfile()) } else { Ok(()) };
            std::future::ready(outcome)
        })
        .await;

        assert_eq!(result, ProbeResult::Open);
        assert_eq!(attempts, 2);
        assert!(started.elapsed() >= RESOURCE_BACKOFF);
    }

    #[tokio::test]
    async fn endless_exhaustion_is_cut_off_by_caller_timeout() {
        let addr = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 22);
        let attempts = AtomicUsize::new(0);

        let result = tokio::time::timeout(
            Duration::from_millis(220),
            connect_with_retry(addr, |_| {
                attempts.fetch_add(1, Ordering::SeqCst);
                std::future::ready(Err::<(), _>(emfile()))
            }),
        )
        .await;

        assert!(result.is_err(), "exhaustion must never produce a verdict");
        let tries = attempts.load(Ordering::SeqCst);
        // 220ms of 50ms back-offs: a handful of attempts, not a busy loop.
        assert!((2..=6).contains(&tries), "unexpected attempt count {tries}");
    }

    #[tokio::test]
    async fn refused_attempt_is_not_retried() {
        let addr = SocketAddrV4::new(Ipv4Addr::new(10, 0, 0, 1), 22);
        let mut attempts: usize = 0;

        let result = connect_with_retry(addr, |_| {
            attempts += 1;
            std::future::ready(Err::<(), _>(io::Error::from(io::ErrorKind::ConnectionRefused)))
        })
        .await;

        assert_eq!(result, ProbeResult::Closed);
        assert_eq!(attempts, 1);
    }

    #[tokio::test]
    #[ignore]
    async fn unroutable_address_hangs_until_caller_timeout() {
        let addr = SocketAddrV4::new(Ipv4Addr::new(203, 0, 113, 1), 443);
        let result = tokio::time::timeout(Duration::from_millis(500), TcpProber.probe(addr)).await;
        assert!(result.is_err() || result == Ok(ProbeResult::Closed));
    }
}
