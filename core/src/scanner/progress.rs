use std::sync::atomic::{AtomicU64, Ordering};

/// Live counters for a sweep, shared between probe tasks and whoever reports progress.
#[derive(Debug, Default)]
pub struct ScanProgress {
    total: AtomicU64,
    dispatched: AtomicU64,
    completed: AtomicU64,
    open: AtomicU64,
    errors: AtomicU64,
}

/// A point-in-time copy of [`ScanProgress`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub total: u64,
    pub dispatched: u64,
    pub completed: u64,
    pub open: u64,
    pub errors: u64,
}

impl ProgressSnapshot {
    pub fn in_flight(&self) -> u64 {
        self.dispatched.saturating_sub(self.completed)
    }
}

impl ScanProgress {
    pub(crate) fn new(total: u64) -> Self {
        let progress = Self::default();
        progress.total.store(total, Ordering::Relaxed);
        progress
    }

    pub(crate) fn record_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_open(&self) {
        self.open.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total.load(Ordering::Relaxed),
            dispatched: self.dispatched.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            open: self.open.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}
