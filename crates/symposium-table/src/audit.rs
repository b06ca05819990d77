//! Best-effort invariant inspection.
//!
//! Detection here is a diagnostic, not enforcement: an observer racing the
//! monitor can report a violation that never existed at any quiescent point,
//! so callers log these and keep going rather than treating them as ground
//! truth. The monitor's blocking predicates are what actually uphold the
//! invariants.

use std::collections::HashSet;
use std::fmt;

use crate::seat::{PhilosopherId, SeatState};
use crate::table::StateTable;

/// A suspected invariant violation observed during a state inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Two circularly-adjacent seats both Eating.
    AdjacentEaters { seat: usize, neighbor: usize },

    /// More than one seat Talking.
    MultipleTalkers { count: usize },

    /// The same occupant id on more than one seat.
    DuplicateOccupant { id: PhilosopherId },

    /// Talk floor held while the sleep counter is positive.
    TalkDuringSleep { sleepers: usize },

    /// Recorded sleep counter disagrees with the seats actually Sleeping.
    SleepCounterDrift { recorded: usize, seated: usize },

    /// Pepper availability outside `[0, capacity]`, or availability plus
    /// holders no longer summing to capacity.
    PepperImbalance {
        available: usize,
        holders: usize,
        capacity: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AdjacentEaters { seat, neighbor } => {
                write!(f, "seats {seat} and {neighbor} are adjacent and both Eating")
            }
            Self::MultipleTalkers { count } => {
                write!(f, "{count} seats are Talking at once")
            }
            Self::DuplicateOccupant { id } => {
                write!(f, "{id} occupies more than one seat")
            }
            Self::TalkDuringSleep { sleepers } => {
                write!(f, "talk floor held while {sleepers} seat(s) are Sleeping")
            }
            Self::SleepCounterDrift { recorded, seated } => {
                write!(
                    f,
                    "sleep counter records {recorded} but {seated} seat(s) are Sleeping"
                )
            }
            Self::PepperImbalance {
                available,
                holders,
                capacity,
            } => {
                write!(
                    f,
                    "pepper pool out of balance: {available} available + {holders} held != capacity {capacity}"
                )
            }
        }
    }
}

/// Inspect the table-local invariants: no adjacent eaters, at most one
/// talker, distinct occupants.
///
/// The monitor layers its counter-backed checks (talk vs. sleep, pepper
/// conservation) on top of this.
pub fn check_table(table: &StateTable) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let seats = table.seats();

    // Adjacent eaters, each unordered pair reported once.
    let mut reported: HashSet<(usize, usize)> = HashSet::new();
    for (i, seat) in seats.iter().enumerate() {
        if !seat.state.is_eating() {
            continue;
        }
        let (_, right) = table
            .neighbors(i)
            .expect("enumerated index is always in bounds");
        if right != i && seats[right].state.is_eating() {
            let pair = (i.min(right), i.max(right));
            if reported.insert(pair) {
                violations.push(InvariantViolation::AdjacentEaters {
                    seat: pair.0,
                    neighbor: pair.1,
                });
            }
        }
    }

    let talkers = seats
        .iter()
        .filter(|s| s.state == SeatState::Talking)
        .count();
    if talkers > 1 {
        violations.push(InvariantViolation::MultipleTalkers { count: talkers });
    }

    let mut seen: HashSet<PhilosopherId> = HashSet::new();
    for seat in seats {
        if !seen.insert(seat.occupant) {
            violations.push(InvariantViolation::DuplicateOccupant { id: seat.occupant });
        }
    }

    violations
}
