//! Immutable byte strings and the fixed-256-element hash array.

use crate::address::Hash;
use crate::error::{Error, Result};
use rand::RngCore;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Immutable, cheap-to-clone byte string.
///
/// Backed by `bytes::Bytes`, the same refcounted-slice type the teacher
/// already depends on for zero-copy buffers.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(bytes::Bytes);

impl Bytes {
    pub fn new() -> Self {
        Self(bytes::Bytes::new())
    }

    pub fn from_vec(v: Vec<u8>) -> Self {
        Self(bytes::Bytes::from(v))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn random(rng: &mut impl RngCore, len: usize) -> Self {
        let mut v = vec![0u8; len];
        rng.fill_bytes(&mut v);
        Self::from_vec(v)
    }

    fn from_hex(s: &str) -> Result<Self> {
        if s.len() % 2 != 0 || !s.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidFormat(format!(
                "Bytes hex must have even length and be all hex digits, got {s:?}"
            )));
        }
        if s.bytes().any(|c| c.is_ascii_uppercase()) {
            return Err(Error::InvalidFormat(format!(
                "Bytes hex must be lowercase, got {s:?}"
            )));
        }
        let v = hex::decode(s).map_err(|e| Error::InvalidFormat(e.to_string()))?;
        Ok(Self::from_vec(v))
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(v: Vec<u8>) -> Self {
        Self::from_vec(v)
    }
}

impl From<&[u8]> for Bytes {
    fn from(v: &[u8]) -> Self {
        Self::from_vec(v.to_vec())
    }
}

impl std::ops::Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes({})", hex::encode(&self.0))
    }
}

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(&self.0))
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(D::Error::custom)
    }
}

/// A logical array of exactly 256 `Hash` values.
///
/// A default-initialized instance is equivalent to all-zero hashes, and
/// equality ignores identity: two default instances, and a constructed
/// all-zero instance, all compare equal. Cheap to clone (an `Option<Arc<_>>`
/// behind the scenes).
#[derive(Clone, Default)]
pub struct ImmutableHashArray(Option<Arc<[Hash; 256]>>);

impl ImmutableHashArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_array(hashes: [Hash; 256]) -> Self {
        if hashes.iter().all(|h| *h == Hash::zero()) {
            return Self::default();
        }
        Self(Some(Arc::new(hashes)))
    }

    pub fn get(&self, index: usize) -> Result<Hash> {
        if index >= 256 {
            return Err(Error::OutOfBounds);
        }
        Ok(match &self.0 {
            Some(arr) => arr[index],
            None => Hash::zero(),
        })
    }

    pub fn set(&mut self, index: usize, value: Hash) -> Result<()> {
        if index >= 256 {
            return Err(Error::OutOfBounds);
        }
        let mut arr = match &self.0 {
            Some(arr) => (**arr),
            None => [Hash::zero(); 256],
        };
        arr[index] = value;
        if arr.iter().all(|h| *h == Hash::zero()) {
            self.0 = None;
        } else {
            self.0 = Some(Arc::new(arr));
        }
        Ok(())
    }

    pub fn is_default(&self) -> bool {
        self.0.is_none()
    }

    fn materialized(&self) -> [Hash; 256] {
        match &self.0 {
            Some(arr) => **arr,
            None => [Hash::zero(); 256],
        }
    }
}

impl PartialEq for ImmutableHashArray {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            _ => self.materialized() == other.materialized(),
        }
    }
}

impl Eq for ImmutableHashArray {}

impl fmt::Debug for ImmutableHashArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            write!(f, "ImmutableHashArray(default)")
        } else {
            write!(f, "ImmutableHashArray(..)")
        }
    }
}

impl Serialize for ImmutableHashArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match &self.0 {
            None => serializer.serialize_none(),
            Some(arr) => {
                use serde::ser::SerializeSeq;
                let mut seq = serializer.serialize_seq(Some(256))?;
                for h in arr.iter() {
                    seq.serialize_element(h)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ImmutableHashArray {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let opt: Option<Vec<Hash>> = Option::deserialize(deserializer)?;
        match opt {
            None => Ok(Self::default()),
            Some(v) => {
                if v.len() != 256 {
                    return Err(D::Error::custom(format!(
                        "ImmutableHashArray must have exactly 256 elements, got {}",
                        v.len()
                    )));
                }
                let mut arr = [Hash::zero(); 256];
                arr.copy_from_slice(&v);
                Ok(Self::from_array(arr))
            }
        }
    }
}
