//! Conformance-testing state model for the Ethereum Virtual Machine.
//!
//! This crate defines a precise, serializable representation of an EVM
//! execution state and the value types EVM instructions operate over,
//! together with the equality, diff, and journaling machinery used to
//! compare execution outcomes across independent EVM implementations. It
//! does not execute any instruction itself.

pub mod accounts;
pub mod address;
pub mod bytes;
pub mod call_journal;
pub mod code;
pub mod context;
pub mod error;
pub mod logs;
pub mod memory;
pub mod opcode;
pub mod revision;
pub mod serde_json_io;
pub mod stack;
pub mod state;
pub mod storage;
pub mod u256;

pub use accounts::{Accounts, AccountsBuilder};
pub use address::{Address, Hash};
pub use bytes::{Bytes, ImmutableHashArray};
pub use call_journal::{CallJournal, CallKind, CallParams, CallResult, FutureCall, PastCall};
pub use code::Code;
pub use context::{BlockContext, CallContext, TransactionContext};
pub use error::{Error, Result};
pub use logs::{LogEntry, Logs};
pub use memory::{ExpansionCosts, Memory, MAX_MEMORY_EXPANSION_SIZE};
pub use opcode::OpCode;
pub use revision::Revision;
pub use serde_json_io::{export_state_json, import_state_json};
pub use stack::Stack;
pub use state::{State, Status};
pub use storage::{Storage, TransientStorage};
pub use u256::U256;
