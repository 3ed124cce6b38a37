/// Target that the terminal formatter renders as a success line.
pub const SUCCESS_TARGET: &str = "sweepr::success";

/// Logs an `info` event tagged as a success.
#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        ::tracing::info!(target: $crate::log::SUCCESS_TARGET, $($arg)*)
    };
}
