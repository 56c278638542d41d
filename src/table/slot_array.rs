//! Backing storage for the forwarding table
//!
//! A fixed, cache-line-aligned array of `N x B` slot words, laid out so that
//! the `B` slots of one bucket row are adjacent. With `B = 4` a row is 32
//! bytes, which lets the vector probe fetch a whole row in one load.

use std::ptr::NonNull;
use std::sync::atomic::Ordering;

use crate::constants::{CACHE_LINE_BYTES, MAX_BUCKET_SIZE, MAX_TABLE_SIZE};
use crate::status::Status;
use crate::table::slot::AtomicSlot;
use crate::utility::{aligned_alloc_zeroed, aligned_free, is_power_of_two};

/// Fixed-size slot storage
pub struct SlotArray {
    /// Pointer to the slot array
    slots: NonNull<AtomicSlot>,
    /// Number of bucket rows (N); power of two
    size: u64,
    /// Slots per row (B); power of two
    bucket: u64,
    /// log2(N), precomputed
    size_power: u32,
}

impl SlotArray {
    /// Allocate a zeroed `size x bucket` slot array
    ///
    /// `size` must be a power of two in `[1, MAX_TABLE_SIZE]` and `bucket` a
    /// power of two in `[1, MAX_BUCKET_SIZE]`.
    pub fn new(size: u64, bucket: u64) -> Result<Self, Status> {
        if size == 0 || size > MAX_TABLE_SIZE || !is_power_of_two(size) {
            return Err(Status::InvalidArgument);
        }
        if bucket == 0 || bucket > MAX_BUCKET_SIZE || !is_power_of_two(bucket) {
            return Err(Status::InvalidArgument);
        }

        let bytes = (size * bucket) as usize * std::mem::size_of::<AtomicSlot>();
        let ptr =
            unsafe { aligned_alloc_zeroed(CACHE_LINE_BYTES, bytes) }.ok_or(Status::OutOfMemory)?;

        Ok(Self {
            slots: ptr.cast(),
            size,
            bucket,
            size_power: size.trailing_zeros(),
        })
    }

    /// Number of bucket rows
    #[inline]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Slots per bucket row
    #[inline]
    pub fn bucket(&self) -> u64 {
        self.bucket
    }

    /// log2 of the row count
    #[inline]
    pub fn size_power(&self) -> u32 {
        self.size_power
    }

    /// Total number of slots
    #[inline]
    pub fn num_slots(&self) -> u64 {
        self.size * self.bucket
    }

    /// Flat offset of slot `bucket` in row `index`
    #[inline]
    fn offset(&self, index: u32, bucket: u32) -> usize {
        debug_assert!((index as u64) < self.size);
        debug_assert!((bucket as u64) < self.bucket);
        index as usize * self.bucket as usize + bucket as usize
    }

    /// Get one slot of a bucket row
    #[inline]
    pub fn slot(&self, index: u32, bucket: u32) -> &AtomicSlot {
        let offset = self.offset(index, bucket);
        // SAFETY: offset is bounds-checked above; the array lives as long as self
        unsafe { &*self.slots.as_ptr().add(offset) }
    }

    /// Get the whole bucket row at `index`
    #[inline]
    pub fn row(&self, index: u32) -> &[AtomicSlot] {
        let offset = self.offset(index, 0);
        // SAFETY: rows are contiguous and in bounds
        unsafe { std::slice::from_raw_parts(self.slots.as_ptr().add(offset), self.bucket as usize) }
    }

    /// Clear every slot
    ///
    /// Slots are cleared one atomic store at a time so that a concurrent
    /// lookup observes each word either before or after its wipe.
    pub fn clear(&self) {
        for offset in 0..self.num_slots() as usize {
            // SAFETY: offset < num_slots
            let slot = unsafe { &*self.slots.as_ptr().add(offset) };
            slot.clear(Ordering::Relaxed);
        }
    }
}

impl Drop for SlotArray {
    fn drop(&mut self) {
        let bytes = self.num_slots() as usize * std::mem::size_of::<AtomicSlot>();
        // SAFETY: allocated in `new` with the same alignment and size
        unsafe { aligned_free(self.slots.cast(), CACHE_LINE_BYTES, bytes) };
    }
}

// Safety: slots are only accessed through atomic operations
unsafe impl Send for SlotArray {}
unsafe impl Sync for SlotArray {}
