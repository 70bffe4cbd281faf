//! The aggregate EVM execution state and its status-dependent equality,
//! diff, and pretty-printing.

use crate::accounts::Accounts;
use crate::address::Address;
use crate::bytes::{Bytes, ImmutableHashArray};
use crate::call_journal::CallJournal;
use crate::code::Code;
use crate::context::{BlockContext, CallContext, TransactionContext};
use crate::logs::Logs;
use crate::memory::Memory;
use crate::revision::Revision;
use crate::stack::Stack;
use crate::storage::{Storage, TransientStorage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Execution outcome. Governs which fields participate in equality (see
/// `State::eq`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Running,
    Stopped,
    Returned,
    Reverted,
    Failed,
}

impl Status {
    fn is_halted(&self) -> bool {
        matches!(self, Status::Stopped | Status::Returned | Status::Reverted)
    }
}

/// The aggregate EVM execution state record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct State {
    pub status: Status,
    pub revision: Revision,
    pub read_only: bool,
    pub pc: u64,
    pub gas: i64,
    pub gas_refund: i64,
    pub code: Code,
    pub stack: Stack,
    pub memory: Memory,
    pub storage: Storage,
    pub transient_storage: TransientStorage,
    pub accounts: Accounts,
    pub logs: Logs,
    pub call_context: CallContext,
    pub block_context: BlockContext,
    pub transaction_context: TransactionContext,
    pub call_data: Bytes,
    pub last_call_return_data: Bytes,
    pub return_data: Bytes,
    pub call_journal: CallJournal,
    pub has_self_destructed: bool,
    pub self_destructed_journal: Vec<Address>,
    pub recent_block_hashes: ImmutableHashArray,
}

impl Default for State {
    fn default() -> Self {
        Self {
            status: Status::Running,
            revision: Revision::Cancun,
            read_only: false,
            pc: 0,
            gas: 0,
            gas_refund: 0,
            code: Code::new(Vec::new()),
            stack: Stack::default(),
            memory: Memory::default(),
            storage: Storage::default(),
            transient_storage: TransientStorage::default(),
            accounts: Accounts::default(),
            logs: Logs::default(),
            call_context: CallContext::default(),
            block_context: BlockContext::default(),
            transaction_context: TransactionContext::default(),
            call_data: Bytes::default(),
            last_call_return_data: Bytes::default(),
            return_data: Bytes::default(),
            call_journal: CallJournal::default(),
            has_self_destructed: false,
            self_destructed_journal: Vec::new(),
            recent_block_hashes: ImmutableHashArray::default(),
        }
    }
}

impl State {
    /// Status-dependent equality: see the field-relevance rules in `diff`.
    pub fn eq(&self, other: &Self) -> bool {
        self.diff(other).is_empty()
    }

    /// Human-readable list of differences, one per differing field. Empty
    /// iff `self.eq(other)`.
    ///
    /// If either side is `Failed`, every other field is ignored: two
    /// `Failed` states are always equal, and a `Failed`/non-`Failed` pair is
    /// never equal. Otherwise `pc` is ignored once execution has halted
    /// (`Stopped`/`Returned`/`Reverted`), `return_data` is compared only for
    /// `Stopped`/`Reverted`, and `last_call_return_data` is compared only
    /// while `Running`.
    pub fn diff(&self, other: &Self) -> Vec<String> {
        let mut out = Vec::new();

        if self.status == Status::Failed && other.status == Status::Failed {
            return out;
        }
        if self.status != other.status {
            out.push(format!("status: {:?} != {:?}", self.status, other.status));
            return out;
        }

        if self.revision != other.revision {
            out.push(format!("revision: {} != {}", self.revision, other.revision));
        }
        if self.read_only != other.read_only {
            out.push(format!(
                "read_only: {} != {}",
                self.read_only, other.read_only
            ));
        }
        if !self.status.is_halted() && self.pc != other.pc {
            out.push(format!("pc: {} != {}", self.pc, other.pc));
        }
        if self.gas != other.gas {
            out.push(format!("gas: {} != {}", self.gas, other.gas));
        }
        if self.gas_refund != other.gas_refund {
            out.push(format!(
                "gas_refund: {} != {}",
                self.gas_refund, other.gas_refund
            ));
        }
        if self.code != other.code {
            out.push("code differs".to_string());
        }
        if self.stack != other.stack {
            out.push("stack differs".to_string());
        }
        if self.memory != other.memory {
            out.push("memory differs".to_string());
        }
        out.extend(self.storage.diff(&other.storage));
        out.extend(self.transient_storage.diff(&other.transient_storage));
        out.extend(self.accounts.diff(&other.accounts));
        out.extend(self.logs.diff(&other.logs));
        if self.call_context != other.call_context {
            out.push("call_context differs".to_string());
        }
        if self.block_context != other.block_context {
            out.push("block_context differs".to_string());
        }
        if self.transaction_context != other.transaction_context {
            out.push("transaction_context differs".to_string());
        }
        if self.call_data != other.call_data {
            out.push("call_data differs".to_string());
        }
        if self.status == Status::Running
            && self.last_call_return_data != other.last_call_return_data
        {
            out.push("last_call_return_data differs".to_string());
        }
        if matches!(self.status, Status::Stopped | Status::Reverted)
            && self.return_data != other.return_data
        {
            out.push("return_data differs".to_string());
        }
        out.extend(self.call_journal.diff(&other.call_journal));
        if self.has_self_destructed != other.has_self_destructed {
            out.push(format!(
                "has_self_destructed: {} != {}",
                self.has_self_destructed, other.has_self_destructed
            ));
        }
        if self.self_destructed_journal != other.self_destructed_journal {
            out.push("self_destructed_journal differs".to_string());
        }
        if self.recent_block_hashes != other.recent_block_hashes {
            out.push("recent_block_hashes differs".to_string());
        }

        out
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        State::eq(self, other)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "status: {:?}", self.status)?;
        writeln!(f, "revision: {}", self.revision)?;
        writeln!(f, "read_only: {}", self.read_only)?;
        let pc_annotation = if self.pc as usize >= self.code.len() {
            "out of bounds".to_string()
        } else if self.code.is_data(self.pc as i64) {
            "points to data".to_string()
        } else {
            match self.code.get_operation(self.pc as i64) {
                Ok(op) => format!("operation: {op}"),
                Err(_) => "points to data".to_string(),
            }
        };
        writeln!(f, "pc: {} ({pc_annotation})", self.pc)?;
        writeln!(f, "gas: {}", self.gas)?;
        writeln!(f, "gas_refund: {}", self.gas_refund)?;
        if self.code.len() > 20 {
            writeln!(
                f,
                "code: {}... (size: {})",
                self.code.to_human_readable_string(0, 20),
                self.code.len()
            )?;
        } else {
            let len = self.code.len();
            writeln!(f, "code: {}", self.code.to_human_readable_string(0, len))?;
        }
        writeln!(f, "stack: size {}", self.stack.len())?;
        for (i, v) in self.stack.iter().take(5).enumerate() {
            writeln!(f, "  [{i}] {v}")?;
        }
        writeln!(f, "memory: size {}", self.memory.len())?;
        writeln!(f, "storage: {:?}", self.storage)?;
        writeln!(f, "transient_storage: {:?}", self.transient_storage)?;
        writeln!(f, "accounts: {:?}", self.accounts)?;
        writeln!(f, "logs: {:?}", self.logs)?;
        writeln!(f, "call_context: {:?}", self.call_context)?;
        writeln!(f, "block_context: {:?}", self.block_context)?;
        writeln!(f, "transaction_context: {:?}", self.transaction_context)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_ignores_all_other_fields() {
        let a = State {
            status: Status::Failed,
            gas: 1,
            ..State::default()
        };
        let b = State {
            status: Status::Failed,
            gas: 12345,
            pc: 999,
            gas_refund: 77,
            ..State::default()
        };
        assert!(a.eq(&b));
        assert!(a.diff(&b).is_empty());
    }

    #[test]
    fn failed_vs_running_never_equal() {
        let a = State {
            status: Status::Failed,
            ..State::default()
        };
        let b = State::default();
        assert!(!a.eq(&b));
    }

    #[test]
    fn halted_pc_is_ignored() {
        let a = State {
            status: Status::Stopped,
            pc: 0,
            ..State::default()
        };
        let b = State {
            status: Status::Stopped,
            pc: 40,
            ..State::default()
        };
        assert!(a.eq(&b));
    }

    #[test]
    fn running_pc_matters() {
        let a = State {
            status: Status::Running,
            pc: 0,
            ..State::default()
        };
        let b = State {
            status: Status::Running,
            pc: 40,
            ..State::default()
        };
        assert!(!a.eq(&b));
    }

    #[test]
    fn last_call_return_data_only_compared_when_running() {
        let mut a = State {
            status: Status::Running,
            ..State::default()
        };
        let b = State {
            status: Status::Running,
            ..State::default()
        };
        a.last_call_return_data = Bytes::from_vec(vec![1]);
        assert!(!a.eq(&b));

        let mut a2 = a.clone();
        let mut b2 = b.clone();
        a2.status = Status::Stopped;
        b2.status = Status::Stopped;
        assert!(a2.eq(&b2));
    }

    #[test]
    fn return_data_only_compared_for_stopped_or_reverted() {
        let mut a = State {
            status: Status::Returned,
            ..State::default()
        };
        let mut b = a.clone();
        a.return_data = Bytes::from_vec(vec![9]);
        assert!(a.eq(&b));

        a.status = Status::Stopped;
        b.status = Status::Stopped;
        assert!(!a.eq(&b));
        b.return_data = Bytes::from_vec(vec![9]);
        assert!(a.eq(&b));
    }

    #[test]
    fn diff_eq_consistency() {
        let a = State::default();
        let mut b = State::default();
        b.gas = 5;
        assert_eq!(a.eq(&b), a.diff(&b).is_empty());
        assert_eq!(a.diff(&b).len(), 1);
    }

    #[test]
    fn display_does_not_panic_on_default_state() {
        let s = State::default();
        let rendered = s.to_string();
        assert!(rendered.contains("status"));
    }
}
