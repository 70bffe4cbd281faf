//! 256-bit unsigned integer value type with EVM arithmetic semantics.
//!
//! Internal layout: four 64-bit limbs in little-endian limb order (`limbs[0]`
//! is least significant). The stored value is always in `[0, 2**256)`.

use crate::error::{Error, Result};
use num_bigint::{BigInt, Sign};
use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

#[derive(Clone, Copy, Default, Eq)]
pub struct U256 {
    /// Little-endian limbs: `limbs[0]` is the least significant 64 bits.
    limbs: [u64; 4],
}

impl U256 {
    /// Constructs from up to four `u64` words, most-significant-first.
    /// Fewer than four arguments pad with leading zeros.
    pub fn new(words: &[u64]) -> Result<Self> {
        if words.len() > 4 {
            return Err(Error::TooManyArguments(format!(
                "U256::new takes at most 4 words, got {}",
                words.len()
            )));
        }
        let mut limbs = [0u64; 4];
        for (i, &w) in words.iter().rev().enumerate() {
            limbs[i] = w;
        }
        Ok(Self { limbs })
    }

    /// Constructs from up to 32 bytes, big-endian.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() > 32 {
            return Err(Error::TooManyArguments(format!(
                "U256::from_bytes takes at most 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut padded = [0u8; 32];
        padded[32 - bytes.len()..].copy_from_slice(bytes);
        Ok(Self::from_be_bytes_32(&padded))
    }

    fn from_be_bytes_32(b: &[u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let chunk: [u8; 8] = b[32 - (i + 1) * 8..32 - i * 8].try_into().unwrap();
            limbs[i] = u64::from_be_bytes(chunk);
        }
        Self { limbs }
    }

    /// Constructs from an arbitrary-precision signed integer.
    pub fn from_big_int(b: &BigInt) -> Result<Self> {
        if b.sign() == Sign::Minus {
            return Err(Error::NegativeInput);
        }
        let (_, be_bytes) = b.to_bytes_be();
        if be_bytes.len() > 32 {
            return Err(Error::Overflow);
        }
        Ok(Self::from_bytes(&be_bytes).expect("checked above"))
    }

    pub fn to_big_int(&self) -> BigInt {
        BigInt::from_bytes_be(Sign::Plus, &self.bytes_be::<32>())
    }

    pub const fn zero() -> Self {
        Self { limbs: [0; 4] }
    }

    pub const fn one() -> Self {
        Self {
            limbs: [1, 0, 0, 0],
        }
    }

    /// All-ones: `2**256 - 1`.
    pub const fn max() -> Self {
        Self {
            limbs: [u64::MAX; 4],
        }
    }

    pub fn is_zero(&self) -> bool {
        self.limbs == [0; 4]
    }

    pub fn fits_u64(&self) -> bool {
        self.limbs[1] == 0 && self.limbs[2] == 0 && self.limbs[3] == 0
    }

    pub fn as_u64(&self) -> u64 {
        self.limbs[0]
    }

    pub fn as_usize(&self) -> usize {
        self.as_u64() as usize
    }

    /// Big-endian, zero-padded representation in `N` bytes. Truncates toward
    /// the low-order `N` bytes if the value does not fit (used by
    /// `Address`'s low-20-byte projection).
    pub fn bytes_be<const N: usize>(&self) -> [u8; N] {
        let full = self.to_be_bytes_32();
        let mut out = [0u8; N];
        let n = N.min(32);
        out[N - n..].copy_from_slice(&full[32 - n..]);
        out
    }

    fn to_be_bytes_32(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..4 {
            out[32 - (i + 1) * 8..32 - i * 8].copy_from_slice(&self.limbs[i].to_be_bytes());
        }
        out
    }

    pub fn eq_val(&self, other: &Self) -> bool {
        self.limbs == other.limbs
    }

    pub fn ne_val(&self, other: &Self) -> bool {
        !self.eq_val(other)
    }

    pub fn lt(&self, other: &Self) -> bool {
        self.cmp_unsigned(other) == Ordering::Less
    }

    pub fn gt(&self, other: &Self) -> bool {
        self.cmp_unsigned(other) == Ordering::Greater
    }

    pub fn ge(&self, other: &Self) -> bool {
        !self.lt(other)
    }

    pub fn le(&self, other: &Self) -> bool {
        !self.gt(other)
    }

    fn cmp_unsigned(&self, other: &Self) -> Ordering {
        for i in (0..4).rev() {
            match self.limbs[i].cmp(&other.limbs[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    fn is_negative(&self) -> bool {
        self.limbs[3] & (1 << 63) != 0
    }

    /// Signed less-than (two's complement on 256 bits).
    pub fn slt(&self, other: &Self) -> bool {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => true,
            (false, true) => false,
            _ => self.cmp_unsigned(other) == Ordering::Less,
        }
    }

    /// Signed greater-than (two's complement on 256 bits).
    pub fn sgt(&self, other: &Self) -> bool {
        other.slt(self)
    }

    fn bit(&self, i: usize) -> bool {
        self.limbs[i / 64] & (1u64 << (i % 64)) != 0
    }

    fn set_bit(&mut self, i: usize) {
        self.limbs[i / 64] |= 1u64 << (i % 64);
    }

    pub fn add(&self, other: &Self) -> Self {
        let mut limbs = [0u64; 4];
        let mut carry = 0u128;
        for i in 0..4 {
            let s = self.limbs[i] as u128 + other.limbs[i] as u128 + carry;
            limbs[i] = s as u64;
            carry = s >> 64;
        }
        Self { limbs }
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.wrapping_neg())
    }

    fn wrapping_neg(&self) -> Self {
        self.not().add(&Self::one())
    }

    pub fn mul(&self, other: &Self) -> Self {
        let mut wide = [0u64; 8];
        for i in 0..4 {
            let mut carry = 0u128;
            for j in 0..4 {
                if i + j >= 8 {
                    break;
                }
                let p = self.limbs[i] as u128 * other.limbs[j] as u128
                    + wide[i + j] as u128
                    + carry;
                wide[i + j] = p as u64;
                carry = p >> 64;
            }
            let mut k = i + 4;
            while carry > 0 && k < 8 {
                let s = wide[k] as u128 + carry;
                wide[k] = s as u64;
                carry = s >> 64;
                k += 1;
            }
        }
        Self {
            limbs: [wide[0], wide[1], wide[2], wide[3]],
        }
    }

    /// Full 512-bit product, returned as (high, low) 256-bit halves.
    fn widening_mul(&self, other: &Self) -> (Self, Self) {
        let mut wide = [0u64; 8];
        for i in 0..4 {
            let mut carry = 0u128;
            for j in 0..4 {
                let p =
                    self.limbs[i] as u128 * other.limbs[j] as u128 + wide[i + j] as u128 + carry;
                wide[i + j] = p as u64;
                carry = p >> 64;
            }
            let mut k = i + 4;
            while carry > 0 {
                let s = wide[k] as u128 + carry;
                wide[k] = s as u64;
                carry = s >> 64;
                k += 1;
            }
        }
        (
            Self {
                limbs: [wide[4], wide[5], wide[6], wide[7]],
            },
            Self {
                limbs: [wide[0], wide[1], wide[2], wide[3]],
            },
        )
    }

    fn divmod(&self, divisor: &Self) -> (Self, Self) {
        let mut quotient = Self::zero();
        let mut remainder = Self::zero();
        for i in (0..256).rev() {
            let (r, qbit) = Self::shift_reduce(remainder, self.bit(i), divisor);
            remainder = r;
            if qbit {
                quotient.set_bit(i);
            }
        }
        (quotient, remainder)
    }

    /// Shifts `bit` into `r` (losing `r`'s top bit), then reduces modulo `m`
    /// if the (conceptually 257-bit) result is `>= m`. Returns the reduced
    /// remainder and whether a subtraction occurred (the corresponding
    /// quotient bit in long division).
    fn shift_reduce(r: Self, bit: bool, m: &Self) -> (Self, bool) {
        let overflowed = r.bit(255);
        let mut shifted = r.shl_one();
        if bit {
            shifted.limbs[0] |= 1;
        }
        if overflowed {
            (shifted.sub(m), true)
        } else if shifted.ge(m) {
            (shifted.sub(m), true)
        } else {
            (shifted, false)
        }
    }

    fn shl_one(&self) -> Self {
        let mut limbs = [0u64; 4];
        let mut carry = 0u64;
        for i in 0..4 {
            limbs[i] = (self.limbs[i] << 1) | carry;
            carry = self.limbs[i] >> 63;
        }
        Self { limbs }
    }

    /// Unsigned division; `b == 0` returns 0.
    pub fn div(&self, b: &Self) -> Self {
        if b.is_zero() {
            return Self::zero();
        }
        self.divmod(b).0
    }

    /// Unsigned remainder; `b == 0` returns 0.
    pub fn rem(&self, b: &Self) -> Self {
        if b.is_zero() {
            return Self::zero();
        }
        self.divmod(b).1
    }

    fn abs_and_sign(&self) -> (Self, bool) {
        let negative = self.is_negative();
        let abs = if negative { self.wrapping_neg() } else { *self };
        (abs, negative)
    }

    /// Two's-complement signed division, truncating toward zero; `b == 0`
    /// returns 0.
    pub fn sdiv(&self, b: &Self) -> Self {
        if b.is_zero() {
            return Self::zero();
        }
        let (abs_a, neg_a) = self.abs_and_sign();
        let (abs_b, neg_b) = b.abs_and_sign();
        let q = abs_a.div(&abs_b);
        if neg_a != neg_b {
            q.wrapping_neg()
        } else {
            q
        }
    }

    /// Two's-complement signed remainder, truncating toward zero, taking
    /// the sign of the dividend; `b == 0` returns 0.
    pub fn smod(&self, b: &Self) -> Self {
        if b.is_zero() {
            return Self::zero();
        }
        let (abs_a, neg_a) = self.abs_and_sign();
        let (abs_b, _) = b.abs_and_sign();
        let r = abs_a.rem(&abs_b);
        if neg_a && !r.is_zero() {
            r.wrapping_neg()
        } else {
            r
        }
    }

    /// `(self + b) mod m`; returns 0 if `m == 0`.
    pub fn add_mod(&self, b: &Self, m: &Self) -> Self {
        if m.is_zero() {
            return Self::zero();
        }
        let sum = self.add(b);
        let carry_bit = Self::carry_of_add(self, b);
        let mut r = Self::zero();
        let (r1, _) = Self::shift_reduce(r, carry_bit, m);
        r = r1;
        for i in (0..256).rev() {
            let (r2, _) = Self::shift_reduce(r, sum.bit(i), m);
            r = r2;
        }
        r
    }

    fn carry_of_add(a: &Self, b: &Self) -> bool {
        let mut carry = 0u128;
        for i in 0..4 {
            let s = a.limbs[i] as u128 + b.limbs[i] as u128 + carry;
            carry = s >> 64;
        }
        carry != 0
    }

    /// `(self * b) mod m`; returns 0 if `m == 0`.
    pub fn mul_mod(&self, b: &Self, m: &Self) -> Self {
        if m.is_zero() {
            return Self::zero();
        }
        let (hi, lo) = self.widening_mul(b);
        let mut r = Self::zero();
        for i in (0..256).rev() {
            let (r2, _) = Self::shift_reduce(r, hi.bit(i), m);
            r = r2;
        }
        for i in (0..256).rev() {
            let (r2, _) = Self::shift_reduce(r, lo.bit(i), m);
            r = r2;
        }
        r
    }

    /// Unsigned exponentiation, modulo `2**256`.
    pub fn exp(&self, power: &Self) -> Self {
        let mut base = *self;
        let mut power = *power;
        let mut result = Self::one();
        while !power.is_zero() {
            if power.bit(0) {
                result = result.mul(&base);
            }
            base = base.mul(&base);
            power = power.shr(&Self::one());
        }
        result
    }

    /// EVM SIGNEXTEND: `self` is the 0-based byte index (the low `self + 1`
    /// bytes of `b` carry a signed integer); sign-extends `b` to 256 bits.
    pub fn sign_extend(&self, b: Self) -> Self {
        if self.ge(&Self::new(&[32]).unwrap()) {
            return b;
        }
        let byte_index = self.as_usize();
        let t = 8 * (byte_index + 1) - 1;
        let sign_set = b.bit(t);
        let low_mask = if t == 255 {
            Self::max()
        } else {
            Self::one().shl(&Self::new(&[(t + 1) as u64]).unwrap()).sub(&Self::one())
        };
        if sign_set {
            b.or(&low_mask.not())
        } else {
            b.and(&low_mask)
        }
    }

    pub fn and(&self, other: &Self) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            limbs[i] = self.limbs[i] & other.limbs[i];
        }
        Self { limbs }
    }

    pub fn or(&self, other: &Self) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            limbs[i] = self.limbs[i] | other.limbs[i];
        }
        Self { limbs }
    }

    pub fn xor(&self, other: &Self) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            limbs[i] = self.limbs[i] ^ other.limbs[i];
        }
        Self { limbs }
    }

    pub fn not(&self) -> Self {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            limbs[i] = !self.limbs[i];
        }
        Self { limbs }
    }

    /// Returns 0 if `b >= 256`; else left-shifts `self` by `b`.
    pub fn shl(&self, b: &Self) -> Self {
        if !b.fits_u64() || b.as_u64() >= 256 {
            return Self::zero();
        }
        self.shl_u32(b.as_u64() as u32)
    }

    fn shl_u32(&self, shift: u32) -> Self {
        if shift == 0 {
            return *self;
        }
        let limb_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;
        let mut limbs = [0u64; 4];
        for i in (0..4).rev() {
            if i >= limb_shift {
                let src = i - limb_shift;
                let mut v = self.limbs[src] << bit_shift;
                if bit_shift > 0 && src > 0 {
                    v |= self.limbs[src - 1] >> (64 - bit_shift);
                }
                limbs[i] = v;
            }
        }
        Self { limbs }
    }

    /// Returns 0 if `b >= 256`; else logical right-shifts `self` by `b`.
    pub fn shr(&self, b: &Self) -> Self {
        if !b.fits_u64() || b.as_u64() >= 256 {
            return Self::zero();
        }
        self.shr_u32(b.as_u64() as u32)
    }

    fn shr_u32(&self, shift: u32) -> Self {
        if shift == 0 {
            return *self;
        }
        let limb_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let src = i + limb_shift;
            if src < 4 {
                let mut v = self.limbs[src] >> bit_shift;
                if bit_shift > 0 && src + 1 < 4 {
                    v |= self.limbs[src + 1] << (64 - bit_shift);
                }
                limbs[i] = v;
            }
        }
        Self { limbs }
    }

    /// Arithmetic (sign-preserving) right shift.
    pub fn srsh(&self, b: &Self) -> Self {
        let negative = self.is_negative();
        if !b.fits_u64() || b.as_u64() >= 256 {
            return if negative { Self::max() } else { Self::zero() };
        }
        let shift = b.as_u64() as u32;
        if shift == 0 {
            return *self;
        }
        if !negative {
            return self.shr_u32(shift);
        }
        // `!(!self >> shift)`: complementing a negative value clears its
        // sign bit, so the logical shift fills with zero exactly where the
        // arithmetic shift should fill with one.
        self.not().shr_u32(shift).not()
    }
}

impl PartialEq for U256 {
    fn eq(&self, other: &Self) -> bool {
        self.eq_val(other)
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp_unsigned(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cmp_unsigned(other)
    }
}

impl std::hash::Hash for U256 {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.limbs.hash(state);
    }
}

impl From<u64> for U256 {
    fn from(v: u64) -> Self {
        Self::new(&[v]).expect("single word never overflows")
    }
}

impl From<u32> for U256 {
    fn from(v: u32) -> Self {
        Self::from(v as u64)
    }
}

impl From<usize> for U256 {
    fn from(v: usize) -> Self {
        Self::from(v as u64)
    }
}

impl fmt::Display for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:016x} {:016x} {:016x} {:016x}",
            self.limbs[3], self.limbs[2], self.limbs[1], self.limbs[0]
        )
    }
}

impl fmt::Debug for U256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U256({})", self)
    }
}

impl std::str::FromStr for U256 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let groups: Vec<&str> = s.split(' ').collect();
        if groups.len() != 4 {
            return Err(Error::InvalidFormat(format!(
                "expected 4 hex groups separated by single spaces, got {}",
                groups.len()
            )));
        }
        if s.contains("  ") || s.starts_with(' ') || s.ends_with(' ') {
            return Err(Error::InvalidFormat(
                "unexpected whitespace in U256 text form".into(),
            ));
        }
        let mut limbs = [0u64; 4];
        for (i, g) in groups.iter().enumerate() {
            if g.len() != 16 || !g.bytes().all(|c| c.is_ascii_hexdigit()) {
                return Err(Error::InvalidFormat(format!(
                    "group {i} must be exactly 16 hex digits, got {g:?}"
                )));
            }
            if g.bytes().any(|c| c.is_ascii_uppercase()) {
                return Err(Error::InvalidFormat(format!(
                    "group {i} must be lowercase hex, got {g:?}"
                )));
            }
            limbs[3 - i] = u64::from_str_radix(g, 16).map_err(|e| {
                Error::InvalidFormat(format!("group {i} is not valid hex: {e}"))
            })?;
        }
        Ok(Self { limbs })
    }
}

impl Serialize for U256 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for U256 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smod_scenario_s1() {
        let a = U256::max().sub(&U256::from(7u64));
        let b = U256::max().sub(&U256::from(2u64));
        assert_eq!(a.smod(&b), U256::max().sub(&U256::one()));
    }

    #[test]
    fn exp_scenario_s2() {
        assert_eq!(U256::from(7u64).exp(&U256::from(5u64)), U256::from(16807u64));
    }

    #[test]
    fn text_round_trip() {
        let u = U256::from(0xdeadbeefu64);
        let text = u.to_string();
        let parsed: U256 = text.parse().unwrap();
        assert_eq!(u, parsed);
    }

    #[test]
    fn text_rejects_bad_format() {
        assert!("not a number".parse::<U256>().is_err());
        assert!(" 0000000000000000 0000000000000000 0000000000000000 0000000000000000"
            .parse::<U256>()
            .is_err());
        assert!("0000000000000000 0000000000000000 0000000000000000 000000000000000"
            .parse::<U256>()
            .is_err());
    }

    #[test]
    fn add_mod_wraps() {
        assert_eq!(
            U256::max().add_mod(&U256::from(2u64), &U256::from(2u64)),
            U256::one()
        );
    }

    #[test]
    fn signed_order() {
        assert!(U256::max().slt(&U256::zero()));
        assert!(!U256::zero().slt(&U256::max()).then_some(()).is_none());
    }

    #[test]
    fn shift_saturation() {
        assert_eq!(U256::one().shl(&U256::from(256u64)), U256::zero());
        assert_eq!(U256::one().shr(&U256::from(256u64)), U256::zero());
    }

    #[test]
    fn srsh_negative_large_shift() {
        assert_eq!(U256::max().srsh(&U256::from(1000u64)), U256::max());
        assert_eq!(U256::one().srsh(&U256::from(1000u64)), U256::zero());
    }

    #[test]
    fn not_involution() {
        let u = U256::from(0x1234_5678_9abc_def0u64);
        assert_eq!(u.not().not(), u);
    }
}
