//! End-to-end literal scenarios from the state model's contract, exercised
//! through the crate's public API only.

use evmstate::code::Code;
use evmstate::memory::{ExpansionCosts, Memory};
use evmstate::opcode::OpCode;
use evmstate::revision::Revision;
use evmstate::u256::U256;

#[test]
fn s1_u256_smod() {
    let a = U256::max().sub(&U256::from(7u64));
    let b = U256::max().sub(&U256::from(2u64));
    assert_eq!(a.smod(&b), U256::max().sub(&U256::one()));
}

#[test]
fn s2_u256_exp() {
    assert_eq!(U256::from(7u64).exp(&U256::from(5u64)), U256::from(16807u64));
}

#[test]
fn s3_memory_expansion() {
    let mem = Memory::new();
    let ec = mem.expansion_costs(U256::from(128u64), U256::from(32u64));
    assert_eq!(
        ec,
        ExpansionCosts {
            cost: 15,
            offset: 128,
            size: 32
        }
    );
}

#[test]
fn s4_memory_expansion_overflow() {
    let mem = Memory::new();
    let huge_offset = U256::one().shl(&U256::from(64u64));
    let ec = mem.expansion_costs(huge_offset, U256::from(32u64));
    assert_eq!(
        ec,
        ExpansionCosts {
            cost: i64::MAX,
            offset: 0,
            size: 0
        }
    );
}

#[test]
fn s5_code_parsing() {
    let code = Code::new(vec![
        OpCode::ADD.to_u8(),
        OpCode::PUSH1.to_u8(),
        0x00,
        OpCode::PUSH2.to_u8(),
        0x01,
    ]);
    let expected_is_code = [true, true, false, true, false, false, true, true];
    for (i, want) in expected_is_code.iter().enumerate() {
        assert_eq!(code.is_code(i as i64), *want, "position {i}");
    }
    assert!(code.get_operation(2).is_err());
    assert_eq!(code.get_data(2).unwrap(), 0x00);
}

#[test]
fn s6_empty_code_keccak() {
    assert_eq!(
        Code::new(vec![]).hash().to_string(),
        "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
    );
}

#[test]
fn s7_revision_lookup() {
    assert_eq!(Revision::for_block(1500), Revision::Berlin);
    assert_eq!(Revision::for_block(5500), Revision::Cancun);
    assert_eq!(Revision::for_block(9_999_999), Revision::UnknownNext);
}
