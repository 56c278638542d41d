//! Bucket-row probes
//!
//! A probe compares a query word (address with the occupancy bit OR'd in)
//! against the slots of one bucket row and reports the 1-based index of the
//! first match, or 0 for a miss. Two implementations exist with identical
//! contracts: a scalar loop, and an AVX2 parallel compare for 4-slot rows.

use std::sync::atomic::Ordering;

use crate::table::slot::{AtomicSlot, SlotEntry};

/// Row width the vector probe operates on
pub const PROBE_WIDTH: usize = 4;

/// Probe a bucket row of any width
///
/// Rows of `PROBE_WIDTH` slots take the parallel-compare path; narrower rows
/// fall back to the scalar loop.
#[inline]
pub(crate) fn probe_row(query: u64, row: &[AtomicSlot]) -> u32 {
    if row.len() == PROBE_WIDTH {
        probe4(query, row)
    } else {
        probe_scalar(query, row)
    }
}

/// Scalar probe: masked compare of each slot word in turn
#[inline]
pub(crate) fn probe_scalar(query: u64, row: &[AtomicSlot]) -> u32 {
    for (i, slot) in row.iter().enumerate() {
        if slot.load(Ordering::Relaxed).matches(query) {
            return i as u32 + 1;
        }
    }
    0
}

/// Probe a 4-slot row, using AVX2 when the host supports it
#[inline]
pub(crate) fn probe4(query: u64, row: &[AtomicSlot]) -> u32 {
    debug_assert_eq!(row.len(), PROBE_WIDTH);

    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    {
        if is_x86_feature_detected!("avx2") {
            // SAFETY: AVX2 is available and the row holds PROBE_WIDTH slots
            return unsafe { probe4_avx2(query, row.as_ptr()) };
        }
    }

    probe_scalar(query, row)
}

/// AVX2 probe: broadcast the query, load the row, mask out the gate bits,
/// compare all four lanes at once and take the first set movemask bit.
///
/// If more than one lane matches (which the table invariants forbid, but a
/// torn row under racy mutation could transiently produce) the
/// lowest-indexed lane wins, same as the scalar loop.
///
/// # Safety
/// The caller must ensure AVX2 is available and that `row` points to
/// `PROBE_WIDTH` contiguous slot words.
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
#[target_feature(enable = "avx2")]
unsafe fn probe4_avx2(query: u64, row: *const AtomicSlot) -> u32 {
    use std::arch::x86_64::*;

    unsafe {
        let q = _mm256_set1_epi64x(query as i64);
        let words = _mm256_loadu_si256(row as *const __m256i);
        let masked = _mm256_and_si256(words, _mm256_set1_epi64x(SlotEntry::PROBE_MASK as i64));
        let hits = _mm256_movemask_pd(_mm256_castsi256_pd(_mm256_cmpeq_epi64(masked, q))) as u32;

        if hits == 0 { 0 } else { hits.trailing_zeros() + 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of(words: [u64; PROBE_WIDTH]) -> [AtomicSlot; PROBE_WIDTH] {
        words.map(|w| {
            let slot = AtomicSlot::empty();
            slot.store(SlotEntry::from_control(w), Ordering::Relaxed);
            slot
        })
    }

    #[test]
    fn test_scalar_hit_and_miss() {
        let a = SlotEntry::new(0xAAAA, 1).control();
        let b = SlotEntry::new(0xBBBB, 2).control();
        let row = row_of([0, a, b, 0]);

        assert_eq!(probe_scalar(SlotEntry::query(0xAAAA), &row), 2);
        assert_eq!(probe_scalar(SlotEntry::query(0xBBBB), &row), 3);
        assert_eq!(probe_scalar(SlotEntry::query(0xCCCC), &row), 0);
    }

    #[test]
    fn test_scalar_ignores_unoccupied() {
        // a cleared-occupancy word with a matching address must not hit
        let stale = SlotEntry::new(0xAAAA, 1).control() & !SlotEntry::OCCUPIED_BIT;
        let row = row_of([stale, 0, 0, 0]);
        assert_eq!(probe_scalar(SlotEntry::query(0xAAAA), &row), 0);
    }

    #[test]
    fn test_scalar_first_match_wins() {
        let a = SlotEntry::new(0xAAAA, 1).control();
        let row = row_of([0, a, a, a]);
        assert_eq!(probe_scalar(SlotEntry::query(0xAAAA), &row), 2);
    }

    #[test]
    fn test_probe4_matches_scalar() {
        // the two implementations must agree bit for bit on arbitrary rows
        let patterns: &[[u64; 4]] = &[
            [0, 0, 0, 0],
            [
                SlotEntry::new(0x1111, 1).control(),
                SlotEntry::new(0x2222, 2).control(),
                SlotEntry::new(0x3333, 3).control(),
                SlotEntry::new(0x4444, 4).control(),
            ],
            [
                SlotEntry::new(0x1111, 1).control(),
                0,
                SlotEntry::new(0x1111, 9).control(),
                u64::MAX,
            ],
            [u64::MAX, u64::MAX, u64::MAX, u64::MAX],
        ];
        let queries = [
            SlotEntry::query(0x1111),
            SlotEntry::query(0x2222),
            SlotEntry::query(0x4444),
            SlotEntry::query(0x9999),
            SlotEntry::query(SlotEntry::ADDR_MASK),
        ];

        for words in patterns {
            let row = row_of(*words);
            for &query in &queries {
                assert_eq!(
                    probe4(query, &row),
                    probe_scalar(query, &row),
                    "probe disagreement for query {query:#x} on row {words:x?}"
                );
            }
        }
    }

    #[test]
    fn test_probe4_randomized_equivalence() {
        use rand::Rng;

        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            let words: [u64; 4] = std::array::from_fn(|_| rng.r#gen());
            let row = row_of(words);

            // half the queries are drawn from the row so hits are common
            let addr = if rng.r#gen::<bool>() {
                words[rng.gen_range(0..4)] & SlotEntry::ADDR_MASK
            } else {
                rng.r#gen::<u64>() & SlotEntry::ADDR_MASK
            };
            let query = SlotEntry::query(addr);

            assert_eq!(probe4(query, &row), probe_scalar(query, &row));
        }
    }
}
