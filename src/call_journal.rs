//! Recorded and pre-scripted recursive-call log used to script and verify
//! nested calls against an EVM-under-test.

use crate::address::Address;
use crate::bytes::Bytes;
use crate::u256::U256;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The kind of call-like instruction that produced a `PastCall`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallKind {
    Call,
    DelegateCall,
    CallCode,
    StaticCall,
    Create,
    Create2,
}

/// Parameters of a call actually performed by the EVM-under-test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallParams {
    pub kind: CallKind,
    pub recipient: Address,
    pub sender: Address,
    pub input: Bytes,
    pub value: U256,
    pub gas: i64,
    pub code_address: Address,
}

/// A call actually performed by the EVM-under-test, captured for
/// verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastCall {
    pub kind: CallKind,
    pub recipient: Address,
    pub sender: Address,
    pub input: Bytes,
    pub value: U256,
    pub gas: i64,
    pub code_address: Address,
}

/// A pre-scripted result the harness hands back when the EVM-under-test
/// initiates a call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureCall {
    pub success: bool,
    pub output: Bytes,
    pub gas_costs: i64,
    pub gas_refund: i64,
    pub created_account: Option<Address>,
}

/// The result handed back to the EVM-under-test for a call it initiated.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallResult {
    pub success: bool,
    pub output: Bytes,
    pub gas_left: i64,
    pub gas_refund: i64,
    pub created_account: Option<Address>,
}

/// Two sequences: calls actually performed (`past`), and pre-scripted
/// results to hand back for calls the EVM-under-test initiates (`future`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallJournal {
    past: Vec<PastCall>,
    future: VecDeque<FutureCall>,
}

impl CallJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages a result to be returned by the next call the EVM-under-test
    /// initiates.
    pub fn push_future(&mut self, call: FutureCall) {
        self.future.push_back(call);
    }

    pub fn past(&self) -> &[PastCall] {
        &self.past
    }

    /// Records `params` as a past call, pops the next staged `FutureCall`
    /// from the head of `future` (or a default if empty), and returns the
    /// result the EVM-under-test should observe.
    pub fn call(&mut self, params: CallParams) -> CallResult {
        let gas = params.gas;
        self.past.push(PastCall {
            kind: params.kind,
            recipient: params.recipient,
            sender: params.sender,
            input: params.input,
            value: params.value,
            gas,
            code_address: params.code_address,
        });
        let next = self.future.pop_front().unwrap_or_default();
        CallResult {
            success: next.success,
            output: next.output,
            gas_left: (gas - next.gas_costs).max(0),
            gas_refund: next.gas_refund,
            created_account: next.created_account,
        }
    }

    pub fn diff(&self, other: &Self) -> Vec<String> {
        let mut out = Vec::new();
        if self.past.len() != other.past.len() {
            out.push(format!(
                "call_journal.past length differs: {} != {}",
                self.past.len(),
                other.past.len()
            ));
        } else {
            for (i, (a, b)) in self.past.iter().zip(other.past.iter()).enumerate() {
                if a != b {
                    out.push(format!("call_journal.past[{i}] differs"));
                }
            }
        }
        if self.future.len() != other.future.len() {
            out.push(format!(
                "call_journal.future length differs: {} != {}",
                self.future.len(),
                other.future.len()
            ));
        } else {
            for (i, (a, b)) in self.future.iter().zip(other.future.iter()).enumerate() {
                if a != b {
                    out.push(format!("call_journal.future[{i}] differs"));
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_pops_staged_future_and_records_past() {
        let mut journal = CallJournal::new();
        journal.push_future(FutureCall {
            success: true,
            output: Bytes::from_vec(vec![42]),
            gas_costs: 100,
            gas_refund: 0,
            created_account: None,
        });
        let result = journal.call(CallParams {
            kind: CallKind::Call,
            recipient: Address::zero(),
            sender: Address::zero(),
            input: Bytes::new(),
            value: U256::zero(),
            gas: 1000,
            code_address: Address::zero(),
        });
        assert!(result.success);
        assert_eq!(result.gas_left, 900);
        assert_eq!(journal.past().len(), 1);
    }

    #[test]
    fn call_with_no_staged_future_uses_default() {
        let mut journal = CallJournal::new();
        let result = journal.call(CallParams {
            kind: CallKind::Create,
            recipient: Address::zero(),
            sender: Address::zero(),
            input: Bytes::new(),
            value: U256::zero(),
            gas: 500,
            code_address: Address::zero(),
        });
        assert!(!result.success);
        assert_eq!(result.gas_left, 500);
    }

    #[test]
    fn gas_left_never_negative() {
        let mut journal = CallJournal::new();
        journal.push_future(FutureCall {
            gas_costs: 10_000,
            ..Default::default()
        });
        let result = journal.call(CallParams {
            kind: CallKind::Call,
            recipient: Address::zero(),
            sender: Address::zero(),
            input: Bytes::new(),
            value: U256::zero(),
            gas: 100,
            code_address: Address::zero(),
        });
        assert_eq!(result.gas_left, 0);
    }
}
