use std::net::Ipv4Addr;
use std::time::Duration;

use sweepr_common::config::ScanConfig;
use sweepr_common::error::ParseError;
use sweepr_common::network::port::PortRange;
use sweepr_common::network::target;
use sweepr_core::{OpenPortEvent, ScanEngine};
use tokio::net::TcpListener;

/// Expanding a list and sweeping it reports each listed occurrence, duplicates included.
#[tokio::test]
async fn expanded_list_is_swept_in_full() -> anyhow::Result<()> {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
    let port = listener.local_addr()?.port();

    let targets = target::expand("127.0.0.1  127.0.0.1")?;
    assert_eq!(targets.len(), 2);

    let config = ScanConfig::default()
        .with_timeout(Duration::from_millis(500))
        .with_ports(PortRange::new(port, port)?);
    let mut run = ScanEngine::new(config)?.start(targets);

    let mut open: Vec<OpenPortEvent> = Vec::new();
    while let Some(event) = run.next_event().await {
        open.push(event);
    }
    let summary = run.finish().await?;

    assert_eq!(summary.total_probes(), 2);
    assert_eq!(open, vec![OpenPortEvent::new(Ipv4Addr::LOCALHOST, port); 2]);
    drop(listener);
    Ok(())
}

#[test]
fn malformed_input_never_reaches_the_engine() {
    assert_eq!(target::expand("   "), Err(ParseError::Empty));
    assert!(matches!(
        target::expand("10.0.0.9-10.0.0.1"),
        Err(ParseError::InvertedRange { .. })
    ));
    assert!(matches!(
        target::expand("10.0.0.1 10.0.0.300"),
        Err(ParseError::InvalidAddress { .. })
    ));
}
