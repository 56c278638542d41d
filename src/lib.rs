//! l2fwd - An L2 forwarding table for software packet pipelines
//!
//! This crate provides the MAC-address classification stage of a
//! batch-oriented packet pipeline:
//! - **L2Table**: a bounded, cuckoo-hashed, multi-way-bucketed dictionary
//!   from 48-bit MAC address to output gate, with a SIMD-accelerated lookup
//!   fast path
//! - **L2Forward**: the module wrapping the table: per-batch classification,
//!   a per-module default gate, and the control-plane command surface
//!
//! # Features
//!
//! - Line-rate batch lookups: two bucket probes per packet, wide-SIMD
//!   compare on 4-slot rows
//! - Bounded insertion: at most one cuckoo displacement per add
//! - Lock-free data plane: lookups run concurrently with control-plane
//!   mutation under well-defined visibility rules
//!
//! # Quick Start
//!
//! ```rust
//! use l2fwd::module::{L2Forward, L2ForwardConfig, MacEntryArg};
//!
//! let module = L2Forward::new(&L2ForwardConfig::default())?;
//! module.add(&[MacEntryArg {
//!     addr: "aa:bb:cc:dd:ee:ff".to_string(),
//!     gate: 1,
//! }])?;
//!
//! assert_eq!(module.lookup(&["aa:bb:cc:dd:ee:ff".to_string()])?, vec![1]);
//! # Ok::<(), l2fwd::module::CommandError>(())
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod mac;
pub mod module;
pub mod status;
pub mod table;
mod utility;

// Re-exports for convenience
pub use mac::MacAddr;
pub use module::{GateIdx, L2Forward, L2ForwardConfig, Module, Packet, PacketBatch};
pub use status::Status;
pub use table::L2Table;

/// Constants used throughout the library
pub mod constants {
    /// Size of a cache line in bytes
    pub const CACHE_LINE_BYTES: usize = 64;

    /// Maximum number of bucket rows in a table
    pub const MAX_TABLE_SIZE: u64 = 1 << 26;

    /// Default number of bucket rows
    pub const DEFAULT_TABLE_SIZE: u64 = 1024;

    /// Maximum slots per bucket row
    pub const MAX_BUCKET_SIZE: u64 = 4;

    /// Maximum packets per batch
    pub const MAX_PKT_BURST: usize = 32;

    /// Number of output gates a module may expose
    pub const MAX_GATES: u16 = 8192;

    /// Sentinel gate meaning "discard the packet"
    pub const DROP_GATE: u16 = MAX_GATES;
}

/// Prelude module for common imports
pub mod prelude {
    pub use crate::mac::MacAddr;
    pub use crate::module::{
        GateIdx, GateSink, L2Forward, L2ForwardConfig, Module, Packet, PacketBatch,
    };
    pub use crate::status::Status;
    pub use crate::table::L2Table;
}
