//! # IPv4 Address Arithmetic
//!
//! Conversions between dotted-decimal addresses and their 32-bit ordinals,
//! plus the inclusive [`Ipv4Range`] built on top of them.
//!
//! The ordinal uses big-endian octet packing, so `a.b.c.d` becomes
//! `(a << 24) | (b << 16) | (c << 8) | d` and ordering of ordinals matches
//! numeric address ordering.

use std::net::Ipv4Addr;

use crate::error::ParseError;

/// Packs an address into its 32-bit ordinal.
pub fn to_ordinal(addr: Ipv4Addr) -> u32 {
    let [a, b, c, d] = addr.octets();
    (u32::from(a) << 24) | (u32::from(b) << 16) | (u32::from(c) << 8) | u32::from(d)
}

/// Unpacks a 32-bit ordinal back into an address.
pub fn from_ordinal(ordinal: u32) -> Ipv4Addr {
    Ipv4Addr::new(
        (ordinal >> 24) as u8,
        (ordinal >> 16) as u8,
        (ordinal >> 8) as u8,
        ordinal as u8,
    )
}

/// Represents a continuous range of IPv4 addresses, inclusive on both ends.
///
/// A range can only be built with `start_addr <= end_addr`, so it is never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    start_addr: Ipv4Addr,
    end_addr: Ipv4Addr,
}

impl Ipv4Range {
    /// Builds a range, rejecting inverted bounds instead of swapping them.
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Result<Self, ParseError> {
        if to_ordinal(start_addr) > to_ordinal(end_addr) {
            return Err(ParseError::InvertedRange {
                start: start_addr,
                end: end_addr,
            });
        }
        Ok(Self {
            start_addr,
            end_addr,
        })
    }

    pub fn start_addr(&self) -> Ipv4Addr {
        self.start_addr
    }

    pub fn end_addr(&self) -> Ipv4Addr {
        self.end_addr
    }

    /// Number of addresses covered. A full `0.0.0.0-255.255.255.255` range holds 2^32.
    pub fn len(&self) -> u64 {
        u64::from(to_ordinal(self.end_addr)) - u64::from(to_ordinal(self.start_addr)) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone {
        let start: u32 = to_ordinal(self.start_addr);
        let end: u32 = to_ordinal(self.end_addr);
        (start..=end).map(from_ordinal)
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
