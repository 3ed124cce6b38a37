use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::debug;

use super::engine::SweepOutcome;
use super::{OpenPortEvent, ScanProgress, ScanSummary};
use crate::error::ScanError;

/// Handle to a sweep in progress.
///
/// Open ports are read lazily with [`ScanRun::next_event`]. Once it returns
/// `None` every probe has been joined, and [`ScanRun::finish`] yields the
/// summary with the elapsed time. Dropping the handle cancels the sweep.
pub struct ScanRun {
    events: mpsc::UnboundedReceiver<OpenPortEvent>,
    driver: JoinHandle<SweepOutcome>,
    cancel: CancellationToken,
    progress: Arc<ScanProgress>,
    _cancel_on_drop: DropGuard,
}

/// Everything a sweep produced, for callers that do not stream.
#[derive(Debug)]
pub struct ScanReport {
    pub open: Vec<OpenPortEvent>,
    pub outcome: Result<ScanSummary, ScanError>,
}

impl ScanRun {
    pub(super) fn new(
        events: mpsc::UnboundedReceiver<OpenPortEvent>,
        driver: JoinHandle<SweepOutcome>,
        cancel: CancellationToken,
        progress: Arc<ScanProgress>,
    ) -> Self {
        let _cancel_on_drop = cancel.clone().drop_guard();
        Self {
            events,
            driver,
            cancel,
            progress,
            _cancel_on_drop,
        }
    }

    /// Waits for the next open port. `None` means the sweep is over.
    pub async fn next_event(&mut self) -> Option<OpenPortEvent> {
        self.events.recv().await
    }

    /// Stops dispatching new probes. Probes already in flight run to completion or timeout.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn progress(&self) -> Arc<ScanProgress> {
        Arc::clone(&self.progress)
    }

    /// Waits for the sweep to end and returns its summary.
    ///
    /// Meant to be called after [`ScanRun::next_event`] returned `None`; events
    /// still queued at this point are discarded.
    pub async fn finish(mut self) -> Result<ScanSummary, ScanError> {
        let outcome = (&mut self.driver).await?;

        self.events.close();
        let mut discarded: usize = 0;
        while self.events.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            debug!(discarded, "Unread open-port events dropped");
        }

        match outcome.cancelled {
            true => Err(ScanError::Cancelled {
                summary: outcome.summary,
            }),
            false => Ok(outcome.summary),
        }
    }

    /// Drains every event, then finishes.
    pub async fn collect(mut self) -> ScanReport {
        let mut open: Vec<OpenPortEvent> = Vec::new();
        while let Some(event) = self.next_event().await {
            open.push(event);
        }
        let outcome = self.finish().await;
        ScanReport { open, outcome }
    }
}
