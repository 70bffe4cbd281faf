//! Per-call, per-block, and per-transaction environment records.

use crate::address::{Address, Hash};
use crate::u256::U256;
use serde::{Deserialize, Serialize};

/// The account the code executes as, the transaction origin, the
/// immediate caller, and the value transferred into the call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallContext {
    pub account_address: Address,
    pub origin_address: Address,
    pub caller_address: Address,
    pub value: U256,
}

/// Per-block environment visible to executing code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BlockContext {
    pub base_fee: U256,
    pub blob_base_fee: U256,
    pub block_number: u64,
    pub chain_id: U256,
    pub coinbase: Address,
    pub gas_limit: u64,
    pub gas_price: U256,
    pub prev_randao: U256,
    pub timestamp: u64,
}

/// Per-transaction environment visible to executing code.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionContext {
    pub origin_address: Address,
    pub blob_hashes: Vec<Hash>,
}
