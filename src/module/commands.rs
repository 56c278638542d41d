//! Control-plane command types
//!
//! The RPC layer that turns wire messages into these types is out of scope;
//! the types derive serde traits so it can bind to them directly.

use serde::{Deserialize, Serialize};

use crate::module::GateIdx;
use crate::status::Status;

/// One entry of an `add` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacEntryArg {
    /// MAC address as `HH:HH:HH:HH:HH:HH`
    pub addr: String,
    /// Output gate to install
    pub gate: GateIdx,
}

/// Argument of a `populate` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulateArg {
    /// First MAC address of the run
    pub base: String,
    /// Number of consecutive addresses to install
    pub count: u64,
    /// Entry `i` is assigned gate `i % gate_count`
    pub gate_count: u64,
}

/// Argument of one module command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandArg {
    /// Entries for `add`
    Add(Vec<MacEntryArg>),
    /// Addresses for `delete`
    Delete(Vec<String>),
    /// Gate for `set_default_gate`
    SetDefaultGate(GateIdx),
    /// Addresses for `lookup`
    Lookup(Vec<String>),
    /// Parameters for `populate`
    Populate(PopulateArg),
}

/// Result payload of a successful command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandResponse {
    /// Command produced no payload
    Empty,
    /// Gates returned by `lookup`, in argument order
    Gates(Vec<GateIdx>),
}

/// A failed command: a status code plus a diagnostic referencing the
/// offending argument
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CommandError {
    /// Status code of the failure
    pub status: Status,
    /// Human-readable diagnostic
    pub message: String,
}

impl CommandError {
    /// Create a command error
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Diagnostic for a string that is not a well-formed MAC address
    pub fn bad_mac(addr: &str) -> Self {
        Self::new(
            Status::InvalidArgument,
            format!("{addr} is not a proper mac address"),
        )
    }
}
