//! Account table: balances, code, and EIP-2929 warm/cold access tracking.

use crate::address::{Address, Hash};
use crate::bytes::Bytes;
use crate::u256::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

fn empty_code_hash() -> Hash {
    Hash::from_bytes(&Keccak256::digest([])).expect("Keccak256 always yields 32 bytes")
}

/// Account table keyed by `Address`. Each backing map is reference-counted
/// copy-on-write, same as `Storage`.
#[derive(Clone, Debug, Default)]
pub struct Accounts {
    balance: Arc<HashMap<Address, U256>>,
    code: Arc<HashMap<Address, Bytes>>,
    warm: Arc<HashSet<Address>>,
}

impl Accounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AccountsBuilder {
        AccountsBuilder::default()
    }

    pub fn get_balance(&self, address: &Address) -> U256 {
        self.balance.get(address).copied().unwrap_or_else(U256::zero)
    }

    pub fn set_balance(&mut self, address: Address, value: U256) {
        Arc::make_mut(&mut self.balance).insert(address, value);
    }

    pub fn remove_balance(&mut self, address: &Address) {
        Arc::make_mut(&mut self.balance).remove(address);
    }

    pub fn get_code(&self, address: &Address) -> Bytes {
        self.code.get(address).cloned().unwrap_or_default()
    }

    pub fn set_code(&mut self, address: Address, code: Bytes) {
        Arc::make_mut(&mut self.code).insert(address, code);
    }

    pub fn remove_code(&mut self, address: &Address) {
        Arc::make_mut(&mut self.code).remove(address);
    }

    pub fn mark_warm(&mut self, address: Address) {
        Arc::make_mut(&mut self.warm).insert(address);
    }

    pub fn mark_cold(&mut self, address: &Address) {
        Arc::make_mut(&mut self.warm).remove(address);
    }

    pub fn is_warm(&self, address: &Address) -> bool {
        self.warm.contains(address)
    }

    /// An account exists iff its balance is > 0 or its code is non-empty.
    pub fn exists(&self, address: &Address) -> bool {
        !self.get_balance(address).is_zero() || !self.get_code(address).is_empty()
    }

    /// An account is empty iff balance == 0 and code length == 0.
    pub fn is_empty(&self, address: &Address) -> bool {
        !self.exists(address)
    }

    /// Keccak-256 of the account's code, or the canonical empty-Keccak
    /// value for an account with no code.
    pub fn code_hash(&self, address: &Address) -> Hash {
        let code = self.get_code(address);
        if code.is_empty() {
            empty_code_hash()
        } else {
            Hash::from_bytes(&Keccak256::digest(code.as_slice()))
                .expect("Keccak256 always yields 32 bytes")
        }
    }

    pub fn addresses(&self) -> impl Iterator<Item = &Address> {
        self.balance
            .keys()
            .chain(self.code.keys())
            .collect::<HashSet<_>>()
            .into_iter()
    }

    pub fn diff(&self, other: &Self) -> Vec<String> {
        let mut out = Vec::new();
        let mut addrs: Vec<&Address> = self.addresses().chain(other.addresses()).collect();
        addrs.sort();
        addrs.dedup();
        for a in addrs {
            if self.get_balance(a) != other.get_balance(a) {
                out.push(format!(
                    "accounts[{a}].balance: {} != {}",
                    self.get_balance(a),
                    other.get_balance(a)
                ));
            }
            if self.get_code(a) != other.get_code(a) {
                out.push(format!("accounts[{a}].code differs"));
            }
        }
        if *self.warm != *other.warm {
            out.push("accounts.warm differs".to_string());
        }
        out
    }
}

impl PartialEq for Accounts {
    fn eq(&self, other: &Self) -> bool {
        let mut addrs: Vec<&Address> = self.addresses().chain(other.addresses()).collect();
        addrs.sort();
        addrs.dedup();
        addrs.iter().all(|a| {
            self.get_balance(a) == other.get_balance(a) && self.get_code(a) == other.get_code(a)
        }) && *self.warm == *other.warm
    }
}

impl Eq for Accounts {}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct AccountsWire {
    balance: HashMap<Address, U256>,
    code: HashMap<Address, Bytes>,
    warm: HashSet<Address>,
}

impl Serialize for Accounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            balance: &'a HashMap<Address, U256>,
            code: &'a HashMap<Address, Bytes>,
            warm: &'a HashSet<Address>,
        }
        Wire {
            balance: &self.balance,
            code: &self.code,
            warm: &self.warm,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Accounts {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = AccountsWire::deserialize(deserializer)?;
        Ok(Accounts {
            balance: Arc::new(wire.balance),
            code: Arc::new(wire.code),
            warm: Arc::new(wire.warm),
        })
    }
}

/// Builder exposing the same setters as `Accounts` for construction before
/// freezing into an immutable `Accounts`.
#[derive(Default)]
pub struct AccountsBuilder {
    inner: Accounts,
}

impl AccountsBuilder {
    pub fn balance(mut self, address: Address, value: U256) -> Self {
        self.inner.set_balance(address, value);
        self
    }

    pub fn code(mut self, address: Address, code: Bytes) -> Self {
        self.inner.set_code(address, code);
        self
    }

    pub fn warm(mut self, address: Address) -> Self {
        self.inner.mark_warm(address);
        self
    }

    pub fn build(self) -> Accounts {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exists_requires_balance_or_code() {
        let mut a = Accounts::new();
        let addr = Address::zero();
        assert!(!a.exists(&addr));
        a.set_balance(addr, U256::from(1u64));
        assert!(a.exists(&addr));
        assert!(!a.is_empty(&addr));
    }

    #[test]
    fn code_hash_of_missing_account_is_empty_keccak() {
        let a = Accounts::new();
        assert_eq!(
            a.code_hash(&Address::zero()).to_string(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn clone_cow_independence() {
        let mut a1 = Accounts::new();
        let addr = Address([1; 20]);
        a1.set_balance(addr, U256::from(100u64));
        let snapshot = a1.clone();
        let mut a2 = a1.clone();
        a2.set_balance(addr, U256::from(999u64));
        assert_eq!(a1, snapshot);
        assert_eq!(a1.get_balance(&addr), U256::from(100u64));
        assert_eq!(a2.get_balance(&addr), U256::from(999u64));
    }

    #[test]
    fn builder_constructs_frozen_accounts() {
        let addr = Address([2; 20]);
        let accounts = Accounts::builder()
            .balance(addr, U256::from(5u64))
            .warm(addr)
            .build();
        assert!(accounts.exists(&addr));
        assert!(accounts.is_warm(&addr));
    }
}
