use tokio::task::JoinError;

use crate::scanner::ScanSummary;

/// Ways a sweep can end other than normal completion.
///
/// Individual probe failures never show up here; they are folded into "not open".
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The run was stopped early. In-flight probes were still joined before this was returned.
    #[error(
        "sweep cancelled after {} of {} probes",
        .summary.completed,
        .summary.total_probes()
    )]
    Cancelled { summary: ScanSummary },

    #[error("sweep driver task failed: {0}")]
    Driver(#[from] JoinError),
}

impl ScanError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ScanError::Cancelled { .. })
    }
}
