//! The forwarding table
//!
//! A bounded dictionary from 48-bit MAC address to gate index. Each address
//! has two candidate bucket rows derived from one CRC-32 hash; an insert
//! that finds its home row full may relocate one resident to its alternate
//! row, but never chains further displacements.
//!
//! Lookups are safe to run concurrently with each other and with the
//! mutating operations; a torn row read costs at worst one spurious miss or
//! a stale gate. The mutating operations (`add`, `delete`, `flush`) must be
//! serialized by the caller.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::module::GateIdx;
use crate::status::Status;
use crate::table::hash::MacHash;
use crate::table::probe;
use crate::table::slot::SlotEntry;
use crate::table::slot_array::SlotArray;

/// Bounded MAC-to-gate forwarding table
pub struct L2Table {
    slots: SlotArray,
    /// Number of occupied slots; advisory
    count: AtomicU64,
}

impl L2Table {
    /// Create a table of `size` bucket rows with `bucket` slots each
    ///
    /// `size` must be a power of two in `[1, MAX_TABLE_SIZE]` and `bucket` a
    /// power of two in `[1, MAX_BUCKET_SIZE]`.
    pub fn new(size: u64, bucket: u64) -> Result<Self, Status> {
        Ok(Self {
            slots: SlotArray::new(size, bucket)?,
            count: AtomicU64::new(0),
        })
    }

    /// Number of bucket rows
    #[inline]
    pub fn size(&self) -> u64 {
        self.slots.size()
    }

    /// Slots per bucket row
    #[inline]
    pub fn bucket(&self) -> u64 {
        self.slots.bucket()
    }

    /// Number of live entries
    #[inline]
    pub fn len(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Check if the table holds no entries
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up the gate installed for `addr`
    ///
    /// Probes the primary bucket row, then the alternate; at most two row
    /// probes and `2 * B` slot reads. Never mutates the table.
    pub fn find(&self, addr: u64) -> Option<GateIdx> {
        let hash = MacHash::new(addr);
        let index = hash.primary_index(self.slots.size());
        let query = SlotEntry::query(addr);

        let row = self.slots.row(index);
        let hit = probe::probe_row(query, row);
        if hit != 0 {
            return Some(row[hit as usize - 1].load(Ordering::Relaxed).gate());
        }

        let alt = hash.alt_index(self.slots.size_power(), index);
        let row = self.slots.row(alt);
        let hit = probe::probe_row(query, row);
        if hit != 0 {
            return Some(row[hit as usize - 1].load(Ordering::Relaxed).gate());
        }

        None
    }

    /// Install `gate` for `addr`
    ///
    /// Fails with `AlreadyExists` if the address is present, and with
    /// `OutOfMemory` if neither an empty home slot nor a one-step
    /// displacement can make room.
    pub fn add(&self, addr: u64, gate: GateIdx) -> Result<(), Status> {
        if self.find(addr).is_some() {
            return Err(Status::AlreadyExists);
        }

        let (index, bucket) = self.free_slot_for(addr)?;
        self.slots
            .slot(index, bucket)
            .store(SlotEntry::new(addr, gate), Ordering::Release);
        self.count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Remove the entry for `addr`
    pub fn delete(&self, addr: u64) -> Result<(), Status> {
        let (index, bucket) = self.locate(addr).ok_or(Status::NotFound)?;
        self.slots.slot(index, bucket).clear(Ordering::Release);
        self.count.fetch_sub(1, Ordering::Relaxed);
        Ok(())
    }

    /// Remove every entry, preserving the table geometry
    pub fn flush(&self) {
        self.slots.clear();
        self.count.store(0, Ordering::Relaxed);
    }

    /// Gather occupancy statistics by walking the slot array
    pub fn stats(&self) -> TableStats {
        let mut occupied = 0;
        for index in 0..self.slots.size() as u32 {
            for slot in self.slots.row(index) {
                if slot.load(Ordering::Relaxed).is_occupied() {
                    occupied += 1;
                }
            }
        }

        TableStats {
            size: self.slots.size(),
            bucket: self.slots.bucket(),
            occupied,
            load_factor: occupied as f64 / self.slots.num_slots() as f64,
        }
    }

    /// Find a free slot for a new entry, displacing one resident if needed
    ///
    /// Scans the home row for an empty slot first. If the row is full, each
    /// resident in turn is considered for relocation to its alternate row;
    /// the first relocation that succeeds frees that resident's slot. A
    /// resident whose alternate row folds back onto its own row, or onto
    /// this row, ends the attempt for the whole row.
    fn free_slot_for(&self, addr: u64) -> Result<(u32, u32), Status> {
        let size = self.slots.size();
        let bucket = self.slots.bucket() as u32;
        let index = MacHash::new(addr).primary_index(size);

        for b in 0..bucket {
            if self.slots.slot(index, b).load(Ordering::Relaxed).is_empty() {
                return Ok((index, b));
            }
        }

        for b in 0..bucket {
            let victim = self.slots.slot(index, b).load(Ordering::Relaxed);
            let victim_hash = MacHash::new(victim.addr());
            let home = victim_hash.primary_index(size);
            let alt = victim_hash.alt_index(self.slots.size_power(), home);

            if alt == home || alt == index {
                break;
            }

            for vb in 0..bucket {
                if self.slots.slot(alt, vb).load(Ordering::Relaxed).is_empty() {
                    self.slots.slot(alt, vb).store(victim, Ordering::Release);
                    self.slots.slot(index, b).clear(Ordering::Release);
                    return Ok((index, b));
                }
            }
        }

        Err(Status::OutOfMemory)
    }

    /// Locate `addr` by scalar scan of its primary, then alternate row
    fn locate(&self, addr: u64) -> Option<(u32, u32)> {
        let hash = MacHash::new(addr);
        let index = hash.primary_index(self.slots.size());
        let query = SlotEntry::query(addr);

        let hit = probe::probe_scalar(query, self.slots.row(index));
        if hit != 0 {
            return Some((index, hit - 1));
        }

        let alt = hash.alt_index(self.slots.size_power(), index);
        let hit = probe::probe_scalar(query, self.slots.row(alt));
        if hit != 0 {
            return Some((alt, hit - 1));
        }

        None
    }
}

impl std::fmt::Debug for L2Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L2Table")
            .field("size", &self.size())
            .field("bucket", &self.bucket())
            .field("count", &self.len())
            .finish()
    }
}

/// Occupancy statistics for a table
#[derive(Debug, Clone)]
pub struct TableStats {
    /// Number of bucket rows
    pub size: u64,
    /// Slots per bucket row
    pub bucket: u64,
    /// Number of occupied slots
    pub occupied: u64,
    /// Occupied fraction of all slots
    pub load_factor: f64,
}

impl std::fmt::Display for TableStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} x {} slots, {} occupied ({:.2}%)",
            self.size,
            self.bucket,
            self.occupied,
            self.load_factor * 100.0
        )
    }
}
