//! EVM memory: a contiguous byte vector that grows in 32-byte words on
//! demand, plus the expansion-cost arithmetic used to price that growth.

use crate::address::Hash;
use crate::error::{Error, Result};
use crate::u256::U256;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};

/// Memory capacity ceiling; expansion beyond this saturates the cost to
/// `i64::MAX` rather than growing further.
pub const MAX_MEMORY_EXPANSION_SIZE: u64 = 0x1F_FFFF_FFE0;

const WORD_SIZE: u64 = 32;

fn word_cost(bytes: u64) -> u128 {
    let w = (bytes as u128 + (WORD_SIZE as u128 - 1)) / WORD_SIZE as u128;
    w * w / 512 + 3 * w
}

/// Result of `Memory::expansion_costs`: gas cost (saturating at
/// `i64::MAX`), and the offset/size as resolved `u64`s.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExpansionCosts {
    pub cost: i64,
    pub offset: u64,
    pub size: u64,
}

/// Contiguous EVM memory buffer.
///
/// Deep-cloned on `Clone` (a `Vec<u8>` clone is already a full copy), which
/// satisfies the copy-on-write contract's "deep clone is simplest"
/// alternative.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Memory(Vec<u8>);

impl Serialize for Memory {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Memory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.len() % 2 != 0 || !s.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(D::Error::custom(format!(
                "Memory hex must have even length and be all hex digits, got {s:?}"
            )));
        }
        let bytes = hex::decode(&s).map_err(D::Error::custom)?;
        Ok(Memory(bytes))
    }
}

impl Memory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    /// The central memory-expansion-cost algorithm. Does not mutate memory.
    pub fn expansion_costs(&self, offset: U256, size: U256) -> ExpansionCosts {
        // Rule 1.
        if !size.fits_u64() {
            return ExpansionCosts { cost: i64::MAX, offset: 0, size: 0 };
        }
        // Rules 2-3.
        if !offset.fits_u64() {
            return if size.is_zero() {
                ExpansionCosts { cost: 0, offset: 0, size: 0 }
            } else {
                ExpansionCosts { cost: i64::MAX, offset: 0, size: 0 }
            };
        }
        let offset_u = offset.as_u64();
        let size_u = size.as_u64();
        // Rule 4.
        if size_u == 0 {
            return ExpansionCosts { cost: 0, offset: offset_u, size: 0 };
        }
        // Rule 5.
        let new_end = match offset_u.checked_add(size_u) {
            Some(v) => v,
            None => {
                return ExpansionCosts {
                    cost: i64::MAX,
                    offset: offset_u,
                    size: size_u,
                }
            }
        };
        // Rule 6.
        if new_end <= self.0.len() as u64 {
            return ExpansionCosts { cost: 0, offset: offset_u, size: size_u };
        }
        // Rule 7.
        if new_end > MAX_MEMORY_EXPANSION_SIZE {
            return ExpansionCosts {
                cost: i64::MAX,
                offset: offset_u,
                size: size_u,
            };
        }
        // Rule 8.
        let cost_wide = word_cost(new_end) - word_cost(self.0.len() as u64);
        let cost = if cost_wide > i64::MAX as u128 {
            i64::MAX
        } else {
            cost_wide as i64
        };
        ExpansionCosts { cost, offset: offset_u, size: size_u }
    }

    fn grow_to(&mut self, new_end: u64) {
        if new_end as usize <= self.0.len() {
            return;
        }
        let words = (new_end + WORD_SIZE - 1) / WORD_SIZE;
        self.0.resize((words * WORD_SIZE) as usize, 0);
    }

    fn checked_region(&mut self, offset: U256, size: U256) -> Result<(usize, usize)> {
        let ec = self.expansion_costs(offset, size);
        if ec.cost == i64::MAX {
            return Err(Error::MemoryCapacityExceeded);
        }
        if ec.size > 0 {
            self.grow_to(ec.offset + ec.size);
        }
        Ok((ec.offset as usize, ec.size as usize))
    }

    /// Writes `data` at `offset`, growing memory in 32-byte words as needed.
    pub fn write(&mut self, data: &[u8], offset: U256) -> Result<()> {
        let (off, _) = self.checked_region(offset, U256::from(data.len()))?;
        self.0[off..off + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Reads `size` bytes at `offset`, growing memory in 32-byte words as
    /// needed. A zero-size read does not grow memory.
    pub fn read(&mut self, offset: U256, size: U256) -> Result<Vec<u8>> {
        let (off, len) = self.checked_region(offset, size)?;
        Ok(self.0[off..off + len].to_vec())
    }

    /// Keccak-256 digest of the span at `offset..offset+size`, growing
    /// memory as needed. A zero-size span hashes to the empty-Keccak value.
    pub fn hash(&mut self, offset: U256, size: U256) -> Result<Hash> {
        let data = self.read(offset, size)?;
        let digest = Keccak256::digest(&data);
        Ok(Hash::from_bytes(&digest).expect("Keccak256 always yields 32 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_scenario_s3() {
        let mem = Memory::new();
        let ec = mem.expansion_costs(U256::from(128u64), U256::from(32u64));
        assert_eq!(ec, ExpansionCosts { cost: 15, offset: 128, size: 32 });
    }

    #[test]
    fn expansion_overflow_scenario_s4() {
        let mem = Memory::new();
        let huge_offset = U256::one().shl(&U256::from(64u64));
        let ec = mem.expansion_costs(huge_offset, U256::from(32u64));
        assert_eq!(ec, ExpansionCosts { cost: i64::MAX, offset: 0, size: 0 });
    }

    #[test]
    fn zero_size_read_does_not_grow() {
        let mut mem = Memory::new();
        mem.read(U256::from(1000u64), U256::zero()).unwrap();
        assert_eq!(mem.len(), 0);
    }

    #[test]
    fn write_then_read_round_trips() {
        let mut mem = Memory::new();
        mem.write(&[1, 2, 3, 4], U256::zero()).unwrap();
        assert_eq!(mem.len() % 32, 0);
        let read = mem.read(U256::zero(), U256::from(4u64)).unwrap();
        assert_eq!(read, vec![1, 2, 3, 4]);
    }

    #[test]
    fn empty_span_hashes_to_empty_keccak() {
        let mut mem = Memory::new();
        let h = mem.hash(U256::zero(), U256::zero()).unwrap();
        assert_eq!(
            h.to_string(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }
}
