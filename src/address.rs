//! Fixed-width identifiers: 20-byte `Address` and 32-byte `Hash`.

use crate::error::{Error, Result};
use crate::u256::U256;
use rand::RngCore;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! fixed_width_id {
    ($name:ident, $len:expr) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            pub fn zero() -> Self {
                Self([0u8; $len])
            }

            pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
                if bytes.len() != $len {
                    return Err(Error::InvalidFormat(format!(
                        concat!(stringify!($name), " must be exactly {} bytes, got {}"),
                        $len,
                        bytes.len()
                    )));
                }
                let mut out = [0u8; $len];
                out.copy_from_slice(bytes);
                Ok(Self(out))
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn random(rng: &mut impl RngCore) -> Self {
                let mut out = [0u8; $len];
                rng.fill_bytes(&mut out);
                Self(out)
            }

            fn from_hex(s: &str) -> Result<Self> {
                if s.len() != $len * 2 || !s.bytes().all(|c| c.is_ascii_hexdigit()) {
                    return Err(Error::InvalidFormat(format!(
                        concat!(stringify!($name), " must be ", stringify!($len), " lowercase hex bytes, got {:?}"),
                        s
                    )));
                }
                if s.bytes().any(|c| c.is_ascii_uppercase()) {
                    return Err(Error::InvalidFormat(format!(
                        concat!(stringify!($name), " hex must be lowercase, got {:?}"),
                        s
                    )));
                }
                let bytes = hex::decode(s)
                    .map_err(|e| Error::InvalidFormat(e.to_string()))?;
                Self::from_bytes(&bytes)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Self::from_hex(&s).map_err(D::Error::custom)
            }
        }
    };
}

fixed_width_id!(Address, 20);
fixed_width_id!(Hash, 32);

impl Address {
    /// Uses the low-order 20 bytes of `u` in big-endian order.
    pub fn from_u256(u: &U256) -> Self {
        Self(u.bytes_be::<20>())
    }

    pub fn to_u256(&self) -> U256 {
        U256::from_bytes(&self.0).expect("20 bytes always fits")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_u256_round_trip() {
        let a = Address([1; 20]);
        assert_eq!(Address::from_u256(&a.to_u256()), a);
    }

    #[test]
    fn hex_round_trip() {
        let h = Hash([7; 32]);
        let s = h.to_string();
        let parsed: Hash = serde_json::from_value(serde_json::Value::String(s)).unwrap();
        assert_eq!(parsed, h);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(Address::from_bytes(&[0; 19]).is_err());
    }
}
