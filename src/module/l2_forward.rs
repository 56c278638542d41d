//! L2 forwarding module
//!
//! Classifies each packet of a batch by destination MAC address and routes
//! it to the gate installed for that address, or to the module's default
//! gate on a miss. Entries are installed explicitly by the control plane;
//! the module does no learning.

use std::sync::atomic::{AtomicU16, Ordering};

use parking_lot::Mutex;

use crate::constants::{DEFAULT_TABLE_SIZE, DROP_GATE, MAX_BUCKET_SIZE, MAX_GATES, MAX_PKT_BURST};
use crate::mac::{self, MacAddr};
use crate::module::commands::{
    CommandArg, CommandError, CommandResponse, MacEntryArg, PopulateArg,
};
use crate::module::{CommandDesc, GateIdx, GateSink, Module, ModuleClass, PacketBatch, run_split};
use crate::status::Status;
use crate::table::L2Table;

/// Configuration of an `L2Forward` instance
#[derive(Debug, Clone)]
pub struct L2ForwardConfig {
    /// Number of bucket rows; power of two
    pub size: u64,
    /// Slots per bucket row; power of two
    pub bucket: u64,
}

impl Default for L2ForwardConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_TABLE_SIZE,
            bucket: MAX_BUCKET_SIZE,
        }
    }
}

/// The L2 forwarding module
///
/// `process_batch`, `lookup` and `set_default_gate` are safe to call
/// concurrently. The mutating commands (`add`, `delete`, `populate`) are
/// serialized on an internal lock against each other; the data plane keeps
/// running while they execute.
#[derive(Debug)]
pub struct L2Forward {
    table: L2Table,
    /// Gate for packets whose address is not in the table; read once per
    /// batch
    default_gate: AtomicU16,
    /// Serializes mutating commands
    command_lock: Mutex<()>,
}

impl L2Forward {
    /// Class descriptor for pipeline registration
    pub const CLASS: ModuleClass = ModuleClass {
        name: "L2Forward",
        help: "classifies packets with destination MAC address",
        def_module_name: "l2_forward",
        num_igates: 1,
        num_ogates: MAX_GATES as usize,
        commands: &[
            CommandDesc {
                name: "add",
                mt_safe: false,
            },
            CommandDesc {
                name: "delete",
                mt_safe: false,
            },
            CommandDesc {
                name: "set_default_gate",
                mt_safe: true,
            },
            CommandDesc {
                name: "lookup",
                mt_safe: true,
            },
            CommandDesc {
                name: "populate",
                mt_safe: false,
            },
        ],
    };

    /// Create a module instance
    ///
    /// Allocates the forwarding table and points the default gate at the
    /// drop sentinel. Fails with a diagnostic quoting the offending
    /// geometry on an invalid `size` or `bucket`, or if allocation fails.
    pub fn new(config: &L2ForwardConfig) -> Result<Self, CommandError> {
        let table = L2Table::new(config.size, config.bucket).map_err(|status| {
            CommandError::new(
                status,
                format!(
                    "initialization failed with argument size: '{}' bucket: '{}'",
                    config.size, config.bucket
                ),
            )
        })?;

        tracing::info!(
            size = config.size,
            bucket = config.bucket,
            "l2 forward table created"
        );

        Ok(Self {
            table,
            default_gate: AtomicU16::new(DROP_GATE),
            command_lock: Mutex::new(()),
        })
    }

    /// Access the underlying table
    pub fn table(&self) -> &L2Table {
        &self.table
    }

    /// Current default gate
    pub fn default_gate(&self) -> GateIdx {
        self.default_gate.load(Ordering::Acquire)
    }

    /// Install each `(addr, gate)` entry in argument order
    ///
    /// Not transactional: the first failure aborts the command and earlier
    /// entries keep their effect.
    pub fn add(&self, entries: &[MacEntryArg]) -> Result<(), CommandError> {
        let _guard = self.command_lock.lock();

        for entry in entries {
            let addr: MacAddr = entry
                .addr
                .parse()
                .map_err(|_| CommandError::bad_mac(&entry.addr))?;

            match self.table.add(addr.to_internal(), entry.gate) {
                Ok(()) => {}
                Err(Status::AlreadyExists) => {
                    return Err(CommandError::new(
                        Status::AlreadyExists,
                        format!("MAC address '{}' already exists", entry.addr),
                    ));
                }
                Err(Status::OutOfMemory) => {
                    return Err(CommandError::new(Status::OutOfMemory, "not enough space"));
                }
                Err(status) => return Err(CommandError::new(status, status.to_string())),
            }
        }
        Ok(())
    }

    /// Remove each address in argument order
    ///
    /// Not transactional: the first miss aborts the command and earlier
    /// removals keep their effect.
    pub fn delete(&self, addrs: &[String]) -> Result<(), CommandError> {
        let _guard = self.command_lock.lock();

        for addr in addrs {
            let parsed: MacAddr = addr.parse().map_err(|_| CommandError::bad_mac(addr))?;

            match self.table.delete(parsed.to_internal()) {
                Ok(()) => {}
                Err(Status::NotFound) => {
                    return Err(CommandError::new(
                        Status::NotFound,
                        format!("MAC address '{addr}' does not exist"),
                    ));
                }
                Err(status) => return Err(CommandError::new(status, status.to_string())),
            }
        }
        Ok(())
    }

    /// Replace the default gate
    ///
    /// A single release store; safe to call while batches are in flight,
    /// which observe the change at their next batch boundary. The value is
    /// deliberately not range-checked.
    pub fn set_default_gate(&self, gate: GateIdx) {
        self.default_gate.store(gate, Ordering::Release);
    }

    /// Look up each address, returning gates in argument order
    ///
    /// Aborts on the first unknown address. Safe to call concurrently with
    /// the data plane.
    pub fn lookup(&self, addrs: &[String]) -> Result<Vec<GateIdx>, CommandError> {
        let mut gates = Vec::with_capacity(addrs.len());

        for addr in addrs {
            let parsed: MacAddr = addr.parse().map_err(|_| CommandError::bad_mac(addr))?;

            match self.table.find(parsed.to_internal()) {
                Some(gate) => gates.push(gate),
                None => {
                    return Err(CommandError::new(
                        Status::NotFound,
                        format!("MAC address '{addr}' does not exist"),
                    ));
                }
            }
        }
        Ok(gates)
    }

    /// Install `count` consecutive addresses starting at `base`, assigning
    /// gate `i % gate_count` to entry `i`
    ///
    /// The address steps in the big-endian counter form, so the run is
    /// consecutive as read on the wire. Per-entry insert failures are
    /// ignored; a `count` beyond what the table can hold installs what fits.
    pub fn populate(&self, arg: &PopulateArg) -> Result<(), CommandError> {
        let _guard = self.command_lock.lock();

        let base: MacAddr = arg
            .base
            .parse()
            .map_err(|_| CommandError::bad_mac(&arg.base))?;
        if arg.gate_count == 0 {
            return Err(CommandError::new(
                Status::InvalidArgument,
                "gate_count must be positive",
            ));
        }

        let mut counter = mac::to_counter(base.to_internal());
        let mut installed = 0u64;
        for i in 0..arg.count {
            let gate = (i % arg.gate_count) as GateIdx;
            if self.table.add(mac::from_counter(counter), gate).is_ok() {
                installed += 1;
            }
            counter += 1;
        }

        tracing::debug!(requested = arg.count, installed, "populate finished");
        Ok(())
    }

    /// Dispatch a command by name
    pub fn run_command(
        &self,
        cmd: &str,
        arg: CommandArg,
    ) -> Result<CommandResponse, CommandError> {
        match (cmd, arg) {
            ("add", CommandArg::Add(entries)) => {
                self.add(&entries).map(|_| CommandResponse::Empty)
            }
            ("delete", CommandArg::Delete(addrs)) => {
                self.delete(&addrs).map(|_| CommandResponse::Empty)
            }
            ("set_default_gate", CommandArg::SetDefaultGate(gate)) => {
                self.set_default_gate(gate);
                Ok(CommandResponse::Empty)
            }
            ("lookup", CommandArg::Lookup(addrs)) => {
                self.lookup(&addrs).map(CommandResponse::Gates)
            }
            ("populate", CommandArg::Populate(arg)) => {
                self.populate(&arg).map(|_| CommandResponse::Empty)
            }
            (cmd, _) if Self::CLASS.commands.iter().any(|c| c.name == cmd) => Err(
                CommandError::new(
                    Status::InvalidArgument,
                    format!("wrong argument type for command '{cmd}'"),
                ),
            ),
            (cmd, _) => Err(CommandError::new(
                Status::InvalidArgument,
                format!("unknown command '{cmd}'"),
            )),
        }
    }
}

impl Module for L2Forward {
    /// Classify one batch
    ///
    /// The default gate is read once per batch, so a concurrent
    /// `set_default_gate` is observed atomically at batch boundaries.
    fn process_batch(&self, batch: PacketBatch, sink: &mut dyn GateSink) {
        let default_gate = self.default_gate.load(Ordering::Acquire);
        let mut ogates = [DROP_GATE; MAX_PKT_BURST];

        for (ogate, pkt) in ogates.iter_mut().zip(batch.iter()) {
            *ogate = default_gate;
            if let Some(gate) = self.table.find(pkt.dst_mac()) {
                *ogate = gate;
            }
        }

        let cnt = batch.len();
        run_split(sink, &ogates[..cnt], batch);
    }
}
