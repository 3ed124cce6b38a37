use std::time::Duration;

use crate::error::ConfigError;
use crate::network::port::PortRange;

/// Connect timeout applied to every probe unless overridden.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// In-flight probe cap unless overridden.
///
/// Kept under the usual 1024 open-file soft limit, since every in-flight
/// probe holds one socket.
pub const DEFAULT_CONCURRENCY: usize = 1_000;

/// Settings that shape a single sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// How long a single connect may take before it is abandoned as not open.
    pub timeout: Duration,
    /// Maximum number of probes in flight at any instant.
    pub concurrency: usize,
    /// Ports probed on every target.
    pub ports: PortRange,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
            ports: PortRange::full(),
        }
    }
}

impl ScanConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_ports(mut self, ports: PortRange) -> Self {
        self.ports = ports;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

/// Presentation options for the terminal front end.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Hides the startup banner.
    pub no_banner: bool,
    /// 0 prints everything, 1 drops decorations, 2 prints bare `addr:port` lines.
    pub quiet: u8,
    /// Skips the raw-mode key listener, so 'q' cannot stop a sweep.
    pub disable_input: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_bounded() {
        let cfg = ScanConfig::default();
        assert_eq!(cfg.timeout, Duration::from_secs(10));
        assert_eq!(cfg.concurrency, DEFAULT_CONCURRENCY);
        assert_eq!(cfg.ports, PortRange::full());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_values() {
        let cfg = ScanConfig::default().with_concurrency(0);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroConcurrency));

        let cfg = ScanConfig::default().with_timeout(Duration::ZERO);
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTimeout));
    }
}
