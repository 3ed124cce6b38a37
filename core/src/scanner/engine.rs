//! Semaphore-gated dispatch of probes across `targets × ports`.

use std::net::SocketAddrV4;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sweepr_common::config::ScanConfig;
use sweepr_common::error::ConfigError;
use sweepr_common::network::target::TargetSet;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::{OpenPortEvent, ProbeResult, Prober, ScanProgress, ScanRun, ScanSummary};
use crate::network::tcp::TcpProber;

/// Runs sweeps with a fixed prober and configuration.
///
/// Every call to [`ScanEngine::start`] gets its own gate, sink and counters,
/// so concurrent sweeps from the same engine never throttle each other.
pub struct ScanEngine {
    prober: Arc<dyn Prober>,
    config: ScanConfig,
}

pub(super) struct SweepOutcome {
    pub summary: ScanSummary,
    pub cancelled: bool,
}

struct Sweep {
    prober: Arc<dyn Prober>,
    config: ScanConfig,
    targets: TargetSet,
    sink: mpsc::UnboundedSender<OpenPortEvent>,
    cancel: CancellationToken,
    progress: Arc<ScanProgress>,
}

impl ScanEngine {
    /// An engine that probes with real TCP connects.
    pub fn new(config: ScanConfig) -> Result<Self, ConfigError> {
        Self::with_prober(config, TcpProber)
    }

    pub fn with_prober<P>(config: ScanConfig, prober: P) -> Result<Self, ConfigError>
    where
        P: Prober + 'static,
    {
        config.validate()?;
        Ok(Self {
            prober: Arc::new(prober),
            config,
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Starts sweeping `targets` on the current tokio runtime.
    pub fn start(&self, targets: TargetSet) -> ScanRun {
        self.start_with_token(targets, CancellationToken::new())
    }

    /// Like [`ScanEngine::start`], but cancellable through a caller-owned token.
    ///
    /// The run listens on a child of `cancel`: cancelling `cancel` stops the run,
    /// while finishing or dropping the run leaves `cancel` untouched.
    pub fn start_with_token(&self, targets: TargetSet, cancel: CancellationToken) -> ScanRun {
        let cancel = cancel.child_token();
        let (sink, events) = mpsc::unbounded_channel();
        let total: u64 = targets.len() * self.config.ports.len() as u64;
        let progress = Arc::new(ScanProgress::new(total));

        let sweep = Sweep {
            prober: Arc::clone(&self.prober),
            config: self.config,
            targets,
            sink,
            cancel: cancel.clone(),
            progress: Arc::clone(&progress),
        };
        let driver = tokio::spawn(sweep.run());

        ScanRun::new(events, driver, cancel, progress)
    }
}

impl Sweep {
    async fn run(self) -> SweepOutcome {
        let Sweep {
            prober,
            config,
            targets,
            sink,
            cancel,
            progress,
        } = self;

        let gate = Arc::new(Semaphore::new(config.concurrency.min(Semaphore::MAX_PERMITS)));
        let mut probes: JoinSet<()> = JoinSet::new();
        let mut cancelled: bool = false;

        info!(
            "Sweeping {} targets across ports {} (limit {}, timeout {:?})",
            targets.len(),
            config.ports,
            config.concurrency,
            config.timeout
        );
        let started: Instant = Instant::now();

        'dispatch: for address in targets.iter() {
            for port in config.ports.iter() {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        cancelled = true;
                        break 'dispatch;
                    }
                    permit = Arc::clone(&gate).acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_closed) => break 'dispatch,
                    },
                };

                let addr = SocketAddrV4::new(address, port);
                let prober = Arc::clone(&prober);
                let sink = sink.clone();
                let progress_ref = Arc::clone(&progress);
                let limit: Duration = config.timeout;

                probes.spawn(async move {
                    let result = probe_with_timeout(prober.as_ref(), addr, limit).await;
                    match result {
                        ProbeResult::Open => {
                            progress_ref.record_open();
                            if sink.send(OpenPortEvent::from(addr)).is_err() {
                                trace!("Event receiver gone, dropping {addr}");
                            }
                        }
                        ProbeResult::Closed => {}
                        ProbeResult::Error(reason) => {
                            progress_ref.record_error();
                            debug!("Probe to {addr} could not run: {reason}");
                        }
                    }
                    progress_ref.record_completed();
                    drop(permit);
                });
                progress.record_dispatched();

                while let Some(joined) = probes.try_join_next() {
                    reap(joined, &progress);
                }
            }
        }

        // Join barrier: nothing is reported until every dispatched probe is back.
        while let Some(joined) = probes.join_next().await {
            reap(joined, &progress);
        }
        let elapsed: Duration = started.elapsed();
        drop(sink);

        let snapshot = progress.snapshot();
        let summary = ScanSummary {
            targets: targets.len(),
            ports_per_target: config.ports.len(),
            dispatched: snapshot.dispatched,
            completed: snapshot.completed,
            open: snapshot.open,
            errors: snapshot.errors,
            elapsed,
        };

        if cancelled {
            warn!(
                "Sweep cancelled after {} of {} probes",
                summary.dispatched,
                summary.total_probes()
            );
        } else {
            info!("Sweep finished in {:.2}s", elapsed.as_secs_f64());
        }

        SweepOutcome { summary, cancelled }
    }
}

/// Runs one probe, abandoning it as closed once `limit` expires.
async fn probe_with_timeout(prober: &dyn Prober, addr: SocketAddrV4, limit: Duration) -> ProbeResult {
    match timeout(limit, prober.probe(addr)).await {
        Ok(result) => result,
        Err(_elapsed) => {
            trace!("Probe to {addr} abandoned after {limit:?}");
            ProbeResult::Closed
        }
    }
}

fn reap(joined: Result<(), JoinError>, progress: &ScanProgress) {
    if let Err(e) = joined {
        error!("Probe task failed: {e}");
        progress.record_completed();
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
