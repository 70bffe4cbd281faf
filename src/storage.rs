//! Per-contract persistent (`Storage`) and per-transaction (`TransientStorage`)
//! key-value stores, copy-on-write over their backing maps.

use crate::u256::U256;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

fn maps_equal_ignoring_zero(a: &HashMap<U256, U256>, b: &HashMap<U256, U256>) -> bool {
    let nonzero = |m: &HashMap<U256, U256>| -> HashMap<&U256, &U256> {
        m.iter().filter(|(_, v)| !v.is_zero()).collect()
    };
    nonzero(a) == nonzero(b)
}

fn diff_maps_ignoring_zero(a: &HashMap<U256, U256>, b: &HashMap<U256, U256>, out: &mut Vec<String>, label: &str) {
    let mut keys: Vec<&U256> = a.keys().chain(b.keys()).collect();
    keys.sort();
    keys.dedup();
    for k in keys {
        let av = a.get(k).copied().unwrap_or_else(U256::zero);
        let bv = b.get(k).copied().unwrap_or_else(U256::zero);
        if av != bv {
            out.push(format!("{label}[{k}]: {av} != {bv}"));
        }
    }
}

/// Per-contract persistent key-value store, partitioned into the value
/// after in-transaction modifications (`current`), the value at
/// transaction start (`original`), and the set of keys accessed this
/// transaction (`warm`).
///
/// Each backing map is reference-counted; a clone is `O(1)` and shares the
/// backing store until the first mutation, at which point the mutator
/// allocates a fresh copy (`Arc::make_mut`).
#[derive(Clone, Debug, Default)]
pub struct Storage {
    current: Arc<HashMap<U256, U256>>,
    original: Arc<HashMap<U256, U256>>,
    warm: Arc<HashSet<U256>>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_current(&self, key: &U256) -> U256 {
        self.current.get(key).copied().unwrap_or_else(U256::zero)
    }

    pub fn set_current(&mut self, key: U256, value: U256) {
        Arc::make_mut(&mut self.current).insert(key, value);
    }

    pub fn remove_current(&mut self, key: &U256) {
        Arc::make_mut(&mut self.current).remove(key);
    }

    pub fn get_original(&self, key: &U256) -> U256 {
        self.original.get(key).copied().unwrap_or_else(U256::zero)
    }

    pub fn set_original(&mut self, key: U256, value: U256) {
        Arc::make_mut(&mut self.original).insert(key, value);
    }

    pub fn remove_original(&mut self, key: &U256) {
        Arc::make_mut(&mut self.original).remove(key);
    }

    pub fn mark_warm(&mut self, key: U256) {
        Arc::make_mut(&mut self.warm).insert(key);
    }

    pub fn mark_cold(&mut self, key: &U256) {
        Arc::make_mut(&mut self.warm).remove(key);
    }

    pub fn is_warm(&self, key: &U256) -> bool {
        self.warm.contains(key)
    }

    pub fn diff(&self, other: &Self) -> Vec<String> {
        let mut out = Vec::new();
        diff_maps_ignoring_zero(&self.current, &other.current, &mut out, "storage.current");
        if *self.original != *other.original {
            out.push("storage.original differs".to_string());
        }
        if *self.warm != *other.warm {
            out.push("storage.warm differs".to_string());
        }
        out
    }
}

impl PartialEq for Storage {
    fn eq(&self, other: &Self) -> bool {
        maps_equal_ignoring_zero(&self.current, &other.current)
            && *self.original == *other.original
            && *self.warm == *other.warm
    }
}

impl Eq for Storage {}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StorageWire {
    current: HashMap<U256, U256>,
    original: HashMap<U256, U256>,
    warm: HashSet<U256>,
}

impl Serialize for Storage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            current: &'a HashMap<U256, U256>,
            original: &'a HashMap<U256, U256>,
            warm: &'a HashSet<U256>,
        }
        Wire {
            current: &self.current,
            original: &self.original,
            warm: &self.warm,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Storage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let wire = StorageWire::deserialize(deserializer)?;
        Ok(Storage {
            current: Arc::new(wire.current),
            original: Arc::new(wire.original),
            warm: Arc::new(wire.warm),
        })
    }
}

/// Per-contract transient key-value store, cleared at transaction end.
/// Setting a key to zero deletes it, so a zero value never materializes;
/// equality and diff ignore zero entries regardless (the invariant is
/// enforced at the write site, not relied upon by comparisons).
#[derive(Clone, Debug, Default)]
pub struct TransientStorage {
    map: Arc<HashMap<U256, U256>>,
}

impl TransientStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &U256) -> U256 {
        self.map.get(key).copied().unwrap_or_else(U256::zero)
    }

    pub fn set(&mut self, key: U256, value: U256) {
        if value.is_zero() {
            Arc::make_mut(&mut self.map).remove(&key);
        } else {
            Arc::make_mut(&mut self.map).insert(key, value);
        }
    }

    pub fn diff(&self, other: &Self) -> Vec<String> {
        let mut out = Vec::new();
        diff_maps_ignoring_zero(&self.map, &other.map, &mut out, "transient_storage");
        out
    }
}

impl PartialEq for TransientStorage {
    fn eq(&self, other: &Self) -> bool {
        maps_equal_ignoring_zero(&self.map, &other.map)
    }
}

impl Eq for TransientStorage {}

impl Serialize for TransientStorage {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.map.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TransientStorage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let map = HashMap::<U256, U256>::deserialize(deserializer)?;
        Ok(TransientStorage { map: Arc::new(map) })
    }
}
