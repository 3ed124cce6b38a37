use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::ParseError;

pub const MIN_PORT: u16 = 1;
pub const MAX_PORT: u16 = u16::MAX;

/// Inclusive span of TCP ports probed on every target.
///
/// Port 0 is never part of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    start: u16,
    end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Result<Self, ParseError> {
        if start < MIN_PORT || start > end {
            return Err(ParseError::InvalidPortRange(format!("{start}-{end}")));
        }
        Ok(Self { start, end })
    }

    /// Every port from 1 to 65535.
    pub const fn full() -> Self {
        Self {
            start: MIN_PORT,
            end: MAX_PORT,
        }
    }

    pub fn start(&self) -> u16 {
        self.start
    }

    pub fn end(&self) -> u16 {
        self.end
    }

    pub fn len(&self) -> usize {
        usize::from(self.end - self.start) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> RangeInclusive<u16> {
        self.start..=self.end
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for PortRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for PortRange {
    type Err = ParseError;

    /// Accepts a single port (`"443"`) or an inclusive span (`"1-1024"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseError::InvalidPortRange(s.to_string());
        let parse_port = |part: &str| part.trim().parse::<u16>().map_err(|_| invalid());

        match s.split_once('-') {
            Some((start, end)) => Self::new(parse_port(start)?, parse_port(end)?),
            None => {
                let port = parse_port(s)?;
                Self::new(port, port)
            }
        }
    }
}
