//! Property tests for circular adjacency and resize re-indexing.

use proptest::prelude::*;
use symposium_table::{check_table, InvariantViolation, PhilosopherId, SeatState, StateTable};

fn arb_state() -> impl Strategy<Value = SeatState> {
    prop_oneof![
        Just(SeatState::Thinking),
        Just(SeatState::Hungry),
        Just(SeatState::Eating),
        Just(SeatState::Talking),
        Just(SeatState::Sleeping),
    ]
}

proptest! {
    #[test]
    fn adjacency_is_symmetric(n in 1usize..64, i in 0usize..64) {
        let i = i % n;
        let table = StateTable::new(n);
        let (left, right) = table.neighbors(i).unwrap();

        // i is the right neighbor of its left neighbor and vice versa.
        prop_assert_eq!(table.neighbors(left).unwrap().1, i);
        prop_assert_eq!(table.neighbors(right).unwrap().0, i);
    }

    #[test]
    fn insert_then_remove_restores_seating(n in 1usize..32, after in 0usize..32) {
        let after = after % n;
        let mut table = StateTable::new(n);
        let original: Vec<_> = table.seats().iter().map(|s| s.occupant).collect();

        let at = table.insert_seat(after, PhilosopherId(1000)).unwrap();
        prop_assert_eq!(table.len(), n + 1);
        table.remove_seat(at).unwrap();

        let restored: Vec<_> = table.seats().iter().map(|s| s.occupant).collect();
        prop_assert_eq!(restored, original);
        // Both commits count, even though the net size change is zero.
        prop_assert_eq!(table.generation(), 2);
    }

    #[test]
    fn insert_shifts_only_later_indices(n in 1usize..32, after in 0usize..32) {
        let after = after % n;
        let mut table = StateTable::new(n);

        table.insert_seat(after, PhilosopherId(1000)).unwrap();

        for original in 0..n as u64 {
            let expected = if (original as usize) <= after {
                original as usize
            } else {
                original as usize + 1
            };
            prop_assert_eq!(table.seat_of(PhilosopherId(original)), Some(expected));
        }
    }

    #[test]
    fn audit_matches_bruteforce_adjacency(
        states in prop::collection::vec(arb_state(), 2..32),
    ) {
        let n = states.len();
        let mut table = StateTable::new(n);
        for (i, &s) in states.iter().enumerate() {
            table.set_state(i, s).unwrap();
        }

        let reported = check_table(&table)
            .into_iter()
            .any(|v| matches!(v, InvariantViolation::AdjacentEaters { .. }));
        let exists = (0..n).any(|i| {
            let j = (i + 1) % n;
            i != j && states[i] == SeatState::Eating && states[j] == SeatState::Eating
        });
        prop_assert_eq!(reported, exists);
    }
}
