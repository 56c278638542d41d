//! Module runtime seams
//!
//! The forwarding module plugs into a surrounding packet pipeline. That
//! pipeline is out of scope here; this module defines the thin typed seams
//! it is assumed to provide: gate indices, a process-batch callback, a class
//! descriptor for registration, and the `run_split` primitive that routes
//! each packet of a batch to its output gate.

mod batch;
mod commands;
mod l2_forward;

pub use batch::{Packet, PacketBatch};
pub use commands::{CommandArg, CommandError, CommandResponse, MacEntryArg, PopulateArg};
pub use l2_forward::{L2Forward, L2ForwardConfig};

use crate::constants::MAX_GATES;

/// Index of an output gate
pub type GateIdx = u16;

/// A packet-processing module
pub trait Module {
    /// Classify one batch, handing each packet to `sink` via `run_split`
    fn process_batch(&self, batch: PacketBatch, sink: &mut dyn GateSink);
}

/// Consumer of packets routed to output gates
///
/// Implemented by the surrounding pipeline; packets routed to the drop gate
/// or to an out-of-range gate never reach the sink.
pub trait GateSink {
    /// Accept one packet on `gate`
    fn consume(&mut self, gate: GateIdx, pkt: Packet);
}

/// Route each packet of a batch to the gate chosen for it
///
/// `ogates` carries one gate per packet, in batch order. Packets whose gate
/// is out of range (including the drop sentinel) are discarded.
pub fn run_split(sink: &mut dyn GateSink, ogates: &[GateIdx], batch: PacketBatch) {
    debug_assert!(ogates.len() >= batch.len());

    for (pkt, &gate) in batch.into_iter().zip(ogates) {
        if gate >= MAX_GATES {
            continue;
        }
        sink.consume(gate, pkt);
    }
}

/// Static description of a module class, used for registration with the
/// surrounding pipeline
#[derive(Debug, Clone, Copy)]
pub struct ModuleClass {
    /// Class name
    pub name: &'static str,
    /// One-line description
    pub help: &'static str,
    /// Default instance name
    pub def_module_name: &'static str,
    /// Number of input gates
    pub num_igates: usize,
    /// Number of output gates
    pub num_ogates: usize,
    /// Commands the class accepts
    pub commands: &'static [CommandDesc],
}

/// One entry of a module's command table
#[derive(Debug, Clone, Copy)]
pub struct CommandDesc {
    /// Command name
    pub name: &'static str,
    /// Safe to run concurrently with the data plane
    pub mt_safe: bool,
}
