//! Property-based tests for `State`'s status-dependent equality, its
//! consistency with `diff`, and JSON round-tripping.

use evmstate::serde_json_io::{export_state_json, import_state_json};
use evmstate::state::{State, Status};
use proptest::prelude::*;

fn arb_status() -> impl Strategy<Value = Status> {
    prop_oneof![
        Just(Status::Running),
        Just(Status::Stopped),
        Just(Status::Returned),
        Just(Status::Reverted),
        Just(Status::Failed),
    ]
}

proptest! {
    #[test]
    fn two_failed_states_are_always_equal(gas_a in any::<i64>(), pc_a in any::<u64>(), gas_b in any::<i64>(), pc_b in any::<u64>()) {
        let a = State { status: Status::Failed, gas: gas_a, pc: pc_a, ..State::default() };
        let b = State { status: Status::Failed, gas: gas_b, pc: pc_b, ..State::default() };
        prop_assert!(a.eq(&b));
    }

    #[test]
    fn halted_states_ignore_pc(status in prop_oneof![Just(Status::Stopped), Just(Status::Returned), Just(Status::Reverted)], pc_a in any::<u64>(), pc_b in any::<u64>()) {
        let a = State { status, pc: pc_a, ..State::default() };
        let b = State { status, pc: pc_b, ..State::default() };
        prop_assert!(a.eq(&b));
    }

    #[test]
    fn diff_empty_iff_eq(status_a in arb_status(), status_b in arb_status(), gas_a in any::<i64>(), gas_b in any::<i64>()) {
        let a = State { status: status_a, gas: gas_a, ..State::default() };
        let b = State { status: status_b, gas: gas_b, ..State::default() };
        prop_assert_eq!(a.eq(&b), a.diff(&b).is_empty());
    }

    #[test]
    fn json_round_trip_preserves_eq(status in arb_status(), gas in any::<i64>(), gas_refund in any::<i64>(), pc in any::<u64>()) {
        let state = State { status, gas, gas_refund, pc, ..State::default() };
        let mut path = std::env::temp_dir();
        path.push(format!("evmstate-proptest-{}-{}.json", std::process::id(), gas));
        export_state_json(&state, &path).unwrap();
        let loaded = import_state_json(&path).unwrap();
        std::fs::remove_file(&path).ok();
        prop_assert!(state.eq(&loaded));
    }
}
