//! MAC address handling
//!
//! Addresses live in two forms. On the wire (and in command strings) a MAC
//! is six bytes in network order. Inside the table it is a 64-bit word whose
//! low 48 bits carry the address byte-for-byte from packet memory and whose
//! high 16 bits are zero; the table packs its own metadata into those bits.

use std::fmt;
use std::str::FromStr;

use crate::status::Status;

/// Number of bytes in a MAC address
pub const MAC_ADDR_LEN: usize = 6;

/// Mask selecting the 48 address bits of an internal-form word
pub const ADDR_MASK: u64 = (1 << 48) - 1;

/// A six-byte MAC address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddr([u8; MAC_ADDR_LEN]);

impl MacAddr {
    /// Create an address from its wire-order bytes
    #[inline]
    pub const fn new(octets: [u8; MAC_ADDR_LEN]) -> Self {
        Self(octets)
    }

    /// Get the wire-order bytes
    #[inline]
    pub const fn octets(&self) -> [u8; MAC_ADDR_LEN] {
        self.0
    }

    /// Convert to the table-internal 64-bit form
    ///
    /// The six bytes land in the low 48 bits exactly as a little-endian load
    /// of packet memory would place them, so `aa:bb:cc:dd:ee:ff` becomes
    /// `0x0000_FFEE_DDCC_BBAA`.
    #[inline]
    pub const fn to_internal(&self) -> u64 {
        let b = self.0;
        u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], 0, 0])
    }

    /// Recover an address from its internal form
    #[inline]
    pub const fn from_internal(addr: u64) -> Self {
        let b = addr.to_le_bytes();
        Self([b[0], b[1], b[2], b[3], b[4], b[5]])
    }
}

impl FromStr for MacAddr {
    type Err = Status;

    /// Parse `HH:HH:HH:HH:HH:HH`; anything that does not yield exactly six
    /// two-hex-digit bytes is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut octets = [0u8; MAC_ADDR_LEN];
        let mut parts = s.split(':');

        for octet in octets.iter_mut() {
            let part = parts.next().ok_or(Status::InvalidArgument)?;
            if part.len() != 2 {
                return Err(Status::InvalidArgument);
            }
            *octet = u8::from_str_radix(part, 16).map_err(|_| Status::InvalidArgument)?;
        }

        if parts.next().is_some() {
            return Err(Status::InvalidArgument);
        }
        Ok(Self(octets))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// Reduce the first 8 bytes of a packet head to internal form
#[inline]
pub const fn from_packet_head(head: u64) -> u64 {
    head & ADDR_MASK
}

/// Counter form of an internal address, used when synthesising runs of
/// consecutive addresses.
///
/// The word is reinterpreted as big-endian and shifted right by 16 so that
/// incrementing the counter steps the low three address bytes in
/// host-natural order while the wire byte order is preserved.
#[inline]
pub const fn to_counter(addr: u64) -> u64 {
    u64::from_be(addr) >> 16
}

/// Convert a counter back to an internal-form address
#[inline]
pub const fn from_counter(counter: u64) -> u64 {
    (counter << 16).to_be() & ADDR_MASK
}
