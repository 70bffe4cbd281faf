//! Property-based tests for `Code`'s code/data bitmap.

use evmstate::code::Code;
use evmstate::opcode::OpCode;
use proptest::prelude::*;

proptest! {
    #[test]
    fn every_in_range_position_is_exactly_one_of_code_or_data(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let code = Code::new(bytes.clone());
        for p in 0..bytes.len() {
            let is_code = code.is_code(p as i64);
            let is_data = code.is_data(p as i64);
            prop_assert_ne!(is_code, is_data);
        }
    }

    #[test]
    fn pushn_data_region_is_marked_data(n in 1usize..=32, filler in prop::collection::vec(any::<u8>(), 0..8)) {
        let opcode = OpCode::PUSH1.to_u8() + (n as u8 - 1);
        let mut bytes = vec![opcode];
        bytes.extend(std::iter::repeat(0u8).take(n));
        bytes.extend(filler);
        let code = Code::new(bytes.clone());
        prop_assert!(code.is_code(0));
        for i in 1..=n.min(bytes.len().saturating_sub(1)) {
            prop_assert!(code.is_data(i as i64), "byte {} of a PUSH{} should be data", i, n);
        }
    }
}
