//! Property-based tests for `U256`'s round-trip and arithmetic laws.

use evmstate::u256::U256;
use proptest::prelude::*;

fn arb_u256() -> impl Strategy<Value = U256> {
    (any::<u64>(), any::<u64>(), any::<u64>(), any::<u64>())
        .prop_map(|(a, b, c, d)| U256::new(&[a, b, c, d]).unwrap())
}

proptest! {
    #[test]
    fn round_trips_through_text(u in arb_u256()) {
        let text = u.to_string();
        let parsed: U256 = text.parse().unwrap();
        prop_assert_eq!(u, parsed);
    }

    #[test]
    fn round_trips_through_bytes(u in arb_u256()) {
        let bytes = u.bytes_be::<32>();
        let parsed = U256::from_bytes(&bytes).unwrap();
        prop_assert_eq!(u, parsed);
    }

    #[test]
    fn add_is_commutative(a in arb_u256(), b in arb_u256()) {
        prop_assert_eq!(a.add(&b), b.add(&a));
    }

    #[test]
    fn add_is_associative(a in arb_u256(), b in arb_u256(), c in arb_u256()) {
        prop_assert_eq!(a.add(&b).add(&c), a.add(&b.add(&c)));
    }

    #[test]
    fn mul_is_commutative(a in arb_u256(), b in arb_u256()) {
        prop_assert_eq!(a.mul(&b), b.mul(&a));
    }

    #[test]
    fn mul_is_associative(a in arb_u256(), b in arb_u256(), c in arb_u256()) {
        prop_assert_eq!(a.mul(&b).mul(&c), a.mul(&b.mul(&c)));
    }

    #[test]
    fn not_is_an_involution(u in arb_u256()) {
        prop_assert_eq!(u.not().not(), u);
    }

    #[test]
    fn shr_shl_8_clears_top_byte(u in arb_u256()) {
        let mask = U256::max().shr(&U256::from(8u64));
        let shifted = u.shl(&U256::from(8u64)).shr(&U256::from(8u64));
        prop_assert_eq!(shifted, u.and(&mask));
    }

    #[test]
    fn srsh_of_negative_sets_top_k_bits(u in arb_u256(), k in 1u64..=256) {
        // Force the sign bit on so `u` is treated as negative.
        let negative = u.or(&U256::one().shl(&U256::from(255u64)));
        let shifted = negative.srsh(&U256::from(k));
        let expected_ones = U256::max().shl(&U256::from(256 - k));
        prop_assert_eq!(shifted.and(&expected_ones), expected_ones);
    }
}
