//! Sweep engine for `sweepr`.
//!
//! * [`scanner`]: the bounded-concurrency sweep and its prober seam.
//! * [`network`]: concrete probers.
//! * [`error`]: run-level failures.

pub mod error;
pub mod network;
pub mod scanner;

pub use error::ScanError;
pub use scanner::{OpenPortEvent, ProbeResult, Prober, ScanEngine, ScanRun, ScanSummary};
