//! Immutable EVM bytecode with a precomputed code/data mask and a
//! lazily-memoized Keccak-256 digest.

use crate::address::Hash;
use crate::error::{Error, Result};
use crate::opcode::OpCode;
use once_cell::sync::OnceCell;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sha3::{Digest, Keccak256};
use std::fmt;
use std::sync::Arc;

struct Inner {
    bytes: Vec<u8>,
    is_code: Vec<bool>,
    /// Number of positions past `bytes.len()` that belong to a trailing
    /// `PUSHn`'s data region that ran off the end of the code. These still
    /// read as data, not as the implicit-`STOP` padding beyond them.
    trailing_data_overhang: usize,
    hash: OnceCell<Hash>,
}

/// Immutable byte code. Cheap to clone (an `Arc` around the parsed inner
/// representation) and safe to share across threads: the hash is computed
/// at most once via a single-initialization guard.
#[derive(Clone)]
pub struct Code(Arc<Inner>);

impl Code {
    /// Takes an owned copy of `bytes` and computes the `is_code` bitmap by a
    /// single linear scan: on encountering `PUSHn` at position `p`, the next
    /// `n` bytes are marked as data and skipped.
    pub fn new(bytes: Vec<u8>) -> Self {
        let len = bytes.len();
        let mut is_code = vec![true; len];
        let mut trailing_data_overhang = 0;
        let mut i = 0;
        while i < len {
            let op = OpCode::from(bytes[i]);
            if op.is_push() {
                let data_len = op.width() - 1;
                let data_end = i + 1 + data_len;
                for j in i + 1..data_end.min(len) {
                    is_code[j] = false;
                }
                trailing_data_overhang = data_end.saturating_sub(len);
                i += op.width();
            } else {
                trailing_data_overhang = 0;
                i += 1;
            }
        }
        Self(Arc::new(Inner {
            bytes,
            is_code,
            trailing_data_overhang,
            hash: OnceCell::new(),
        }))
    }

    pub fn len(&self) -> usize {
        self.0.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.bytes.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0.bytes
    }

    /// Memoized Keccak-256 digest of the raw bytes.
    pub fn hash(&self) -> Hash {
        *self.0.hash.get_or_init(|| {
            let digest = Keccak256::digest(&self.0.bytes);
            Hash::from_bytes(&digest).expect("Keccak256 always yields 32 bytes")
        })
    }

    /// Out-of-range positions read as code (implicit STOP), except a
    /// trailing `PUSHn`'s data region that runs past the end of the code,
    /// which still reads as data.
    pub fn is_code(&self, i: i64) -> bool {
        if i < 0 {
            return true;
        }
        let i = i as usize;
        let len = self.0.is_code.len();
        if i < len {
            return self.0.is_code[i];
        }
        i >= len + self.0.trailing_data_overhang
    }

    pub fn is_data(&self, i: i64) -> bool {
        !self.is_code(i)
    }

    /// Returns `STOP` for `i < 0` or `i >= len`; `InvalidPosition` if `i` is
    /// a data byte; otherwise the byte at `i` as an opcode.
    pub fn get_operation(&self, i: i64) -> Result<OpCode> {
        if i < 0 || i as usize >= self.len() {
            return Ok(OpCode::STOP);
        }
        if self.is_data(i) {
            return Err(Error::InvalidPosition);
        }
        Ok(OpCode::from(self.0.bytes[i as usize]))
    }

    /// `InvalidPosition` if `i` is a code byte; 0 if beyond the end;
    /// otherwise the data byte at `i`.
    pub fn get_data(&self, i: i64) -> Result<u8> {
        if self.is_code(i) {
            return Err(Error::InvalidPosition);
        }
        if i as usize >= self.len() {
            return Ok(0);
        }
        Ok(self.0.bytes[i as usize])
    }

    /// Copies `code[start..end]` into the front of `dst`, returning the
    /// number of bytes copied. Panics if `start > end`, `start < 0`, or
    /// `end > len` (precondition violations, not data errors).
    pub fn copy_code_slice(&self, start: usize, end: usize, dst: &mut [u8]) -> usize {
        assert!(start <= end, "copy_code_slice: start > end");
        assert!(end <= self.len(), "copy_code_slice: end beyond code length");
        let n = end - start;
        dst[..n].copy_from_slice(&self.0.bytes[start..end]);
        n
    }

    /// `len(N)` followed by up to `length` space-separated tokens: the
    /// opcode name if the position is code, the decimal byte if data,
    /// `op(0x..)` for an unused opcode at a code position.
    pub fn to_human_readable_string(&self, start: usize, length: usize) -> String {
        let mut out = format!("len({})", self.len());
        if start >= self.len() {
            return out;
        }
        let mut tokens = Vec::with_capacity(length);
        let mut i = start;
        while i < self.len() && tokens.len() < length {
            if self.is_code(i as i64) {
                tokens.push(OpCode::from(self.0.bytes[i]).to_string());
            } else {
                tokens.push(self.0.bytes[i].to_string());
            }
            i += 1;
        }
        if !tokens.is_empty() {
            out.push(' ');
            out.push_str(&tokens.join(" "));
        }
        out
    }
}

impl PartialEq for Code {
    fn eq(&self, other: &Self) -> bool {
        // Hash comparison is a quick reject before the full byte compare.
        self.hash() == other.hash() && self.0.bytes == other.0.bytes
    }
}

impl Eq for Code {}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Code({})", self.to_human_readable_string(0, 20))
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0.bytes))
    }
}

impl<'de> Deserialize<'de> for Code {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.len() % 2 != 0 || !s.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(D::Error::custom(format!(
                "Code hex must have even length and be all hex digits, got {s:?}"
            )));
        }
        let bytes = hex::decode(&s).map_err(D::Error::custom)?;
        Ok(Code::new(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_code_hash_scenario_s6() {
        let hash = Code::new(vec![]).hash();
        assert_eq!(
            hash.to_string(),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn code_parsing_scenario_s5() {
        let code = Code::new(vec![
            OpCode::ADD.to_u8(),
            OpCode::PUSH1.to_u8(),
            0x00,
            OpCode::PUSH2.to_u8(),
            0x01,
        ]);
        let expected = [true, true, false, true, false, false, true, true];
        for (i, want) in expected.iter().enumerate() {
            assert_eq!(code.is_code(i as i64), *want, "position {i}");
        }
        assert!(matches!(code.get_operation(2), Err(Error::InvalidPosition)));
        assert_eq!(code.get_data(2).unwrap(), 0x00);
    }

    #[test]
    fn out_of_range_reads_as_stop() {
        let code = Code::new(vec![OpCode::ADD.to_u8()]);
        assert_eq!(code.get_operation(100).unwrap(), OpCode::STOP);
        assert_eq!(code.get_data(100).unwrap(), 0);
    }

    #[test]
    fn hash_is_memoized_across_clones() {
        let code = Code::new(vec![1, 2, 3]);
        let clone = code.clone();
        assert_eq!(code.hash(), clone.hash());
    }
}
