//! Loom-based model-checked tests for the data-plane visibility rules.
//!
//! These tests replicate the two single-word handoffs the module relies on:
//! the per-batch default-gate read, and the slot-word install observed by a
//! concurrent lookup.  Each test builds a self-contained harness using loom
//! atomics so that Loom can exhaustively explore all interleavings WITHOUT
//! touching production code.
//!
//! Run with:
//! ```bash
//! cargo test --test loom_gate
//! ```

use loom::sync::Arc;
use loom::sync::atomic::{AtomicU16, AtomicU64, Ordering};
use loom::thread;

/// The control plane swaps the default gate with one release store while a
/// batch reads it once with an acquire load.  Every packet of the batch must
/// observe the same gate, and that gate must be either the old or the new
/// value.
#[test]
fn test_loom_default_gate_handoff() {
    const OLD_GATE: u16 = 1;
    const NEW_GATE: u16 = 7;

    loom::model(|| {
        let gate = Arc::new(AtomicU16::new(OLD_GATE));

        let writer = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                gate.store(NEW_GATE, Ordering::Release);
            })
        };

        let reader = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                // one read per batch; packets never re-read
                let batch_gate = gate.load(Ordering::Acquire);
                let ogates = [batch_gate; 4];

                assert!(batch_gate == OLD_GATE || batch_gate == NEW_GATE);
                assert!(ogates.iter().all(|&g| g == batch_gate));
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    });
}

/// Two consecutive batches must never observe the default gate moving
/// backwards once the new value has been seen.
#[test]
fn test_loom_default_gate_monotonic_within_reader() {
    const OLD_GATE: u16 = 1;
    const NEW_GATE: u16 = 7;

    loom::model(|| {
        let gate = Arc::new(AtomicU16::new(OLD_GATE));

        let writer = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                gate.store(NEW_GATE, Ordering::Release);
            })
        };

        let reader = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                let first = gate.load(Ordering::Acquire);
                let second = gate.load(Ordering::Acquire);

                if first == NEW_GATE {
                    assert_eq!(second, NEW_GATE);
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    });
}

/// A slot install is a single 64-bit store: a concurrent lookup load must
/// observe either the empty word or the complete packed entry, never a mix
/// of address, gate and occupancy bits.
#[test]
fn test_loom_slot_install_is_all_or_nothing() {
    // addr 0xABCD, gate 5, occupied
    const PACKED: u64 = 0xABCD | (5 << 48) | (1 << 63);

    loom::model(|| {
        let slot = Arc::new(AtomicU64::new(0));

        let writer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                slot.store(PACKED, Ordering::Release);
            })
        };

        let reader = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                let word = slot.load(Ordering::Relaxed);
                assert!(word == 0 || word == PACKED, "torn slot word {word:#x}");
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    });
}

/// A delete clears the whole word at once: a concurrent lookup sees the
/// live entry or the empty slot, and a reader that saw the slot empty keeps
/// seeing it empty.
#[test]
fn test_loom_slot_clear_is_all_or_nothing() {
    const PACKED: u64 = 0xABCD | (5 << 48) | (1 << 63);

    loom::model(|| {
        let slot = Arc::new(AtomicU64::new(PACKED));

        let writer = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                slot.store(0, Ordering::Release);
            })
        };

        let reader = {
            let slot = Arc::clone(&slot);
            thread::spawn(move || {
                let first = slot.load(Ordering::Relaxed);
                assert!(first == 0 || first == PACKED);

                let second = slot.load(Ordering::Relaxed);
                assert!(second == 0 || second == PACKED);
                if first == 0 {
                    assert_eq!(second, 0, "cleared slot came back");
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
    });
}
