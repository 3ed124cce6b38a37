//! # Scan Target Model
//!
//! Turns raw target text into the ordered set of IPv4 addresses to sweep.
//!
//! Two input forms are understood, told apart by the presence of a `-`:
//! * **Range**: `"A-B"` (e.g. `192.168.1.250-192.168.2.5`), split on the first `-`.
//! * **List**: whitespace-separated addresses (e.g. `"10.0.0.1 10.0.0.7"`).
//!
//! A single address is simply a one-element list.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::ParseError;
use crate::network::range::Ipv4Range;

/// The parsed shape of a target specification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A contiguous, ascending block of addresses.
    Range { ipv4_range: Ipv4Range },
    /// Addresses in the order they were typed, duplicates kept.
    List { addrs: Vec<Ipv4Addr> },
}

impl FromStr for Target {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('-') {
            Some((start_str, end_str)) => parse_ip_range(start_str, end_str),
            None => parse_list(s),
        }
    }
}

/// Ordered sequence of addresses produced once per scan.
///
/// Ranges are kept as their bounds and walked lazily, so a `/8` does not
/// allocate sixteen million entries up front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetSet {
    target: Target,
}

impl TargetSet {
    pub fn len(&self) -> u64 {
        match &self.target {
            Target::Range { ipv4_range } => ipv4_range.len(),
            Target::List { addrs } => addrs.len() as u64,
        }
    }

    /// Never true for a parsed set; both parse paths reject empty input.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> Box<dyn Iterator<Item = Ipv4Addr> + Send + '_> {
        match &self.target {
            Target::Range { ipv4_range } => Box::new(ipv4_range.iter()),
            Target::List { addrs } => Box::new(addrs.iter().copied()),
        }
    }

    pub fn to_vec(&self) -> Vec<Ipv4Addr> {
        self.iter().collect()
    }

    pub fn target(&self) -> &Target {
        &self.target
    }
}

impl From<Target> for TargetSet {
    fn from(target: Target) -> Self {
        Self { target }
    }
}

impl From<Ipv4Range> for TargetSet {
    fn from(ipv4_range: Ipv4Range) -> Self {
        Self::from(Target::Range { ipv4_range })
    }
}

impl FromStr for TargetSet {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        expand(s)
    }
}

impl fmt::Display for TargetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::Range { ipv4_range } => {
                write!(f, "{}-{}", ipv4_range.start_addr(), ipv4_range.end_addr())
            }
            Target::List { addrs } => {
                let joined: Vec<String> = addrs.iter().map(Ipv4Addr::to_string).collect();
                write!(f, "{}", joined.join(" "))
            }
        }
    }
}

/// Expands raw target text into a [`TargetSet`].
pub fn expand(raw: &str) -> Result<TargetSet, ParseError> {
    let target: Target = raw.parse()?;
    Ok(TargetSet::from(target))
}

/// Parses both halves of `"A-B"` and builds the inclusive range.
fn parse_ip_range(start_str: &str, end_str: &str) -> Result<Target, ParseError> {
    let start_addr = parse_ipv4(start_str.trim())?;
    let end_addr = parse_ipv4(end_str.trim())?;

    let ipv4_range = Ipv4Range::new(start_addr, end_addr)?;
    Ok(Target::Range { ipv4_range })
}

/// Parses a whitespace-separated address list.
fn parse_list(s: &str) -> Result<Target, ParseError> {
    let addrs = s
        .split_whitespace()
        .map(parse_ipv4)
        .collect::<Result<Vec<Ipv4Addr>, ParseError>>()?;

    if addrs.is_empty() {
        return Err(ParseError::Empty);
    }

    Ok(Target::List { addrs })
}

fn parse_ipv4(token: &str) -> Result<Ipv4Addr, ParseError> {
    token
        .parse::<Ipv4Addr>()
        .map_err(|source| ParseError::InvalidAddress {
            token: token.to_string(),
            source,
        })
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
