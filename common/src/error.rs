use std::net::{AddrParseError, Ipv4Addr};

/// Raised while turning raw target text into a [`crate::network::target::TargetSet`].
///
/// Any of these aborts the run before a single probe is sent.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid IPv4 address '{token}': {source}")]
    InvalidAddress {
        token: String,
        #[source]
        source: AddrParseError,
    },

    #[error("range start {start} is greater than range end {end}")]
    InvertedRange { start: Ipv4Addr, end: Ipv4Addr },

    #[error("no targets given")]
    Empty,

    #[error("invalid port range '{0}'")]
    InvalidPortRange(String),
}

/// Rejected scan settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("concurrency limit must be at least 1")]
    ZeroConcurrency,

    #[error("probe timeout must be greater than zero")]
    ZeroTimeout,
}
