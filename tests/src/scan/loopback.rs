use std::net::Ipv4Addr;
use std::time::Duration;

use sweepr_common::config::ScanConfig;
use sweepr_common::network::port::PortRange;
use sweepr_common::network::target::TargetSet;
use sweepr_core::scanner::ScanReport;
use sweepr_core::{OpenPortEvent, ScanEngine};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

const LOCALHOST: Ipv4Addr = Ipv4Addr::LOCALHOST;

async fn bind_loopback() -> anyhow::Result<(TcpListener, u16)> {
    let listener = TcpListener::bind((LOCALHOST, 0)).await?;
    let port = listener.local_addr()?.port();
    Ok((listener, port))
}

/// Ports around `port`, clamped to the valid range.
fn window(port: u16, radius: u16) -> PortRange {
    let start = port.saturating_sub(radius).max(1);
    let end = port.saturating_add(radius);
    PortRange::new(start, end).expect("window is ordered")
}

fn fast_config(ports: PortRange) -> ScanConfig {
    ScanConfig::default()
        .with_timeout(Duration::from_millis(500))
        .with_concurrency(64)
        .with_ports(ports)
}

/// Verifies that a live listener on loopback is reported exactly once.
#[tokio::test]
async fn finds_listener_on_loopback() -> anyhow::Result<()> {
    let (_listener, port) = bind_loopback().await?;

    let engine = ScanEngine::new(fast_config(window(port, 8)))?;
    let targets: TargetSet = "127.0.0.1".parse()?;
    let ScanReport { open, outcome } = engine.start(targets).collect().await;

    let summary = outcome?;
    let expected = OpenPortEvent::new(LOCALHOST, port);
    let hits = open.iter().filter(|event| **event == expected).count();
    assert_eq!(hits, 1, "listener port {port} should be reported once, got {open:?}");
    assert_eq!(summary.completed, summary.total_probes());
    assert_eq!(summary.open, open.len() as u64);
    Ok(())
}

/// A listener bound to 127.0.0.1 must not show up on the other loopback addresses.
#[tokio::test]
async fn range_only_reports_the_bound_address() -> anyhow::Result<()> {
    let (_listener, port) = bind_loopback().await?;

    let engine = ScanEngine::new(fast_config(window(port, 0)))?;
    let targets: TargetSet = "127.0.0.1-127.0.0.3".parse()?;
    let report = engine.start(targets).collect().await;

    let summary = report.outcome?;
    assert_eq!(summary.targets, 3);
    assert_eq!(summary.completed, 3);
    assert_eq!(report.open, vec![OpenPortEvent::new(LOCALHOST, port)]);
    Ok(())
}

#[tokio::test]
async fn concurrency_limit_does_not_change_results() -> anyhow::Result<()> {
    let (_listener, port) = bind_loopback().await?;
    let ports = window(port, 16);

    let mut results = Vec::new();
    for limit in [1, 1_000] {
        let engine = ScanEngine::new(fast_config(ports).with_concurrency(limit))?;
        let mut open = engine.start("127.0.0.1".parse()?).collect().await.open;
        open.sort_by_key(|event| event.port);
        results.push(open);
    }

    assert!(results[0].contains(&OpenPortEvent::new(LOCALHOST, port)));
    assert_eq!(results[0], results[1]);
    Ok(())
}

#[tokio::test]
async fn pre_cancelled_sweep_dispatches_nothing() -> anyhow::Result<()> {
    let engine = ScanEngine::new(fast_config(PortRange::full()))?;
    let token = CancellationToken::new();
    token.cancel();

    let report = engine.start_with_token("127.0.0.1".parse()?, token).collect().await;

    assert!(report.open.is_empty());
    let err = report.outcome.expect_err("sweep should report cancellation");
    assert!(err.is_cancelled());
    Ok(())
}

/// Full sweep of every port on loopback with the default settings.
#[tokio::test]
#[ignore = "probes all 65535 ports of 127.0.0.1"]
async fn full_sweep_of_loopback() -> anyhow::Result<()> {
    let (_listener, port) = bind_loopback().await?;

    let engine = ScanEngine::new(ScanConfig::default())?;
    let report = engine.start("127.0.0.1".parse()?).collect().await;

    let summary = report.outcome?;
    assert_eq!(summary.total_probes(), 65_535);
    assert_eq!(summary.completed, 65_535);
    assert!(report.open.contains(&OpenPortEvent::new(LOCALHOST, port)));
    Ok(())
}
