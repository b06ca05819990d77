//! The ordered, circularly-indexed seat table.

use thiserror::Error;

use crate::seat::{PhilosopherId, Seat, SeatState};

/// Errors from structural table operations.
///
/// An out-of-bounds index is a programming error on the caller's side and is
/// reported eagerly rather than indexed modulo-N, which would silently hit
/// the wrong seat.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// Seat index past the end of the current table.
    #[error("seat index {index} out of bounds for table of {len}")]
    SeatOutOfBounds { index: usize, len: usize },

    /// The occupant is not seated at this table.
    #[error("{id} has no seat at this table")]
    UnknownOccupant { id: PhilosopherId },

    /// A resize was attempted while some seat was not Thinking.
    #[error("table not quiescent: seat {index} is {state}")]
    NotQuiescent { index: usize, state: SeatState },

    /// An occupant id would appear twice.
    #[error("{id} is already seated at index {index}")]
    DuplicateOccupant { id: PhilosopherId, index: usize },
}

/// Ordered sequence of seats with circular adjacency and a resize generation.
///
/// The generation starts at 0 and is bumped by every committed insert or
/// removal. Any index computed against generation g must be revalidated once
/// the live generation differs from g.
#[derive(Debug, Clone, Default)]
pub struct StateTable {
    seats: Vec<Seat>,
    generation: u64,
}

impl StateTable {
    /// A table of `n` Thinking seats occupied by philosophers `0..n`.
    pub fn new(n: usize) -> Self {
        Self::with_occupants((0..n as u64).map(PhilosopherId))
    }

    /// A table of Thinking seats for the given occupants, in order.
    ///
    /// Occupant ids are assumed distinct; [`check_table`](crate::check_table)
    /// reports duplicates as a diagnostic.
    pub fn with_occupants(occupants: impl IntoIterator<Item = PhilosopherId>) -> Self {
        Self {
            seats: occupants.into_iter().map(Seat::thinking).collect(),
            generation: 0,
        }
    }

    /// Number of seats.
    pub fn len(&self) -> usize {
        self.seats.len()
    }

    /// Whether the table has no seats.
    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// Current resize generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All seats in table order.
    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    /// The state array alone, for snapshot records.
    pub fn states(&self) -> Vec<SeatState> {
        self.seats.iter().map(|s| s.state).collect()
    }

    /// State of the seat at `index`.
    pub fn state(&self, index: usize) -> Result<SeatState, TableError> {
        self.seat(index).map(|s| s.state)
    }

    /// Occupant of the seat at `index`.
    pub fn occupant(&self, index: usize) -> Result<PhilosopherId, TableError> {
        self.seat(index).map(|s| s.occupant)
    }

    /// Current index of the given occupant, if seated.
    pub fn seat_of(&self, id: PhilosopherId) -> Option<usize> {
        self.seats.iter().position(|s| s.occupant == id)
    }

    /// Replace the state at `index`, returning the previous state.
    pub fn set_state(&mut self, index: usize, state: SeatState) -> Result<SeatState, TableError> {
        let len = self.seats.len();
        let seat = self
            .seats
            .get_mut(index)
            .ok_or(TableError::SeatOutOfBounds { index, len })?;
        Ok(std::mem::replace(&mut seat.state, state))
    }

    /// Circular neighbors `(left, right)` of `index`.
    ///
    /// For a one-seat table both neighbors are the seat itself; for two
    /// seats both are the other seat.
    pub fn neighbors(&self, index: usize) -> Result<(usize, usize), TableError> {
        let len = self.seats.len();
        if index >= len {
            return Err(TableError::SeatOutOfBounds { index, len });
        }
        Ok(((index + len - 1) % len, (index + 1) % len))
    }

    /// Whether every seat is Thinking. An empty table is quiescent.
    pub fn is_quiescent(&self) -> bool {
        self.seats.iter().all(|s| s.state.is_thinking())
    }

    /// First non-Thinking seat, if any. Used for quiescence error reporting.
    fn busy_seat(&self) -> Option<(usize, SeatState)> {
        self.seats
            .iter()
            .enumerate()
            .find(|(_, seat)| !seat.state.is_thinking())
            .map(|(busy, seat)| (busy, seat.state))
    }

    /// Insert a fresh Thinking seat directly after `after`, shifting every
    /// later seat one index up. Quiescence-gated; bumps the generation.
    ///
    /// Returns the index of the new seat.
    pub fn insert_seat(
        &mut self,
        after: usize,
        occupant: PhilosopherId,
    ) -> Result<usize, TableError> {
        let len = self.seats.len();
        if after >= len {
            return Err(TableError::SeatOutOfBounds { index: after, len });
        }
        if let Some((busy, state)) = self.busy_seat() {
            return Err(TableError::NotQuiescent { index: busy, state });
        }
        if let Some(index) = self.seat_of(occupant) {
            return Err(TableError::DuplicateOccupant { id: occupant, index });
        }
        let at = after + 1;
        self.seats.insert(at, Seat::thinking(occupant));
        self.generation += 1;
        Ok(at)
    }

    /// Remove the seat at `index`, shifting every later seat one index down.
    /// Quiescence-gated; bumps the generation. Returns the removed seat.
    pub fn remove_seat(&mut self, index: usize) -> Result<Seat, TableError> {
        let len = self.seats.len();
        if index >= len {
            return Err(TableError::SeatOutOfBounds { index, len });
        }
        if let Some((busy, state)) = self.busy_seat() {
            return Err(TableError::NotQuiescent { index: busy, state });
        }
        let seat = self.seats.remove(index);
        self.generation += 1;
        Ok(seat)
    }

    fn seat(&self, index: usize) -> Result<&Seat, TableError> {
        self.seats.get(index).ok_or(TableError::SeatOutOfBounds {
            index,
            len: self.seats.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_wrap_around() {
        let table = StateTable::new(4);
        assert_eq!(table.neighbors(0).unwrap(), (3, 1));
        assert_eq!(table.neighbors(3).unwrap(), (2, 0));
    }

    #[test]
    fn single_seat_is_its_own_neighbor() {
        let table = StateTable::new(1);
        assert_eq!(table.neighbors(0).unwrap(), (0, 0));
    }

    #[test]
    fn two_seats_share_both_sides() {
        let table = StateTable::new(2);
        assert_eq!(table.neighbors(0).unwrap(), (1, 1));
        assert_eq!(table.neighbors(1).unwrap(), (0, 0));
    }

    #[test]
    fn out_of_bounds_is_reported_not_wrapped() {
        let table = StateTable::new(3);
        assert_eq!(
            table.neighbors(3),
            Err(TableError::SeatOutOfBounds { index: 3, len: 3 })
        );
        assert!(table.state(7).is_err());
    }

    #[test]
    fn set_state_returns_previous() {
        let mut table = StateTable::new(2);
        let prev = table.set_state(1, SeatState::Hungry).unwrap();
        assert_eq!(prev, SeatState::Thinking);
        assert_eq!(table.state(1).unwrap(), SeatState::Hungry);
        assert!(!table.is_quiescent());
    }

    #[test]
    fn insert_reindexes_later_seats() {
        let mut table = StateTable::new(4);
        let before: Vec<_> = table.seats().iter().map(|s| s.occupant).collect();

        let at = table.insert_seat(2, PhilosopherId(99)).unwrap();
        assert_eq!(at, 3);
        assert_eq!(table.len(), 5);
        assert_eq!(table.generation(), 1);
        assert_eq!(table.occupant(3).unwrap(), PhilosopherId(99));
        assert_eq!(table.state(3).unwrap(), SeatState::Thinking);

        // Old seats 3 and beyond moved up by one; earlier seats untouched.
        assert_eq!(table.occupant(4).unwrap(), before[3]);
        assert_eq!(table.occupant(2).unwrap(), before[2]);
    }

    #[test]
    fn remove_reindexes_later_seats() {
        let mut table = StateTable::new(4);
        let removed = table.remove_seat(1).unwrap();
        assert_eq!(removed.occupant, PhilosopherId(1));
        assert_eq!(table.len(), 3);
        assert_eq!(table.generation(), 1);
        assert_eq!(table.occupant(1).unwrap(), PhilosopherId(2));
        assert_eq!(table.seat_of(PhilosopherId(3)), Some(2));
    }

    #[test]
    fn resize_rejected_unless_quiescent() {
        let mut table = StateTable::new(4);
        table.set_state(0, SeatState::Hungry).unwrap();

        assert_eq!(
            table.insert_seat(2, PhilosopherId(99)),
            Err(TableError::NotQuiescent {
                index: 0,
                state: SeatState::Hungry
            })
        );
        assert_eq!(
            table.remove_seat(2),
            Err(TableError::NotQuiescent {
                index: 0,
                state: SeatState::Hungry
            })
        );
        // Rejection leaves size and generation untouched.
        assert_eq!(table.len(), 4);
        assert_eq!(table.generation(), 0);
    }

    #[test]
    fn duplicate_occupant_rejected() {
        let mut table = StateTable::new(3);
        assert_eq!(
            table.insert_seat(0, PhilosopherId(2)),
            Err(TableError::DuplicateOccupant {
                id: PhilosopherId(2),
                index: 2
            })
        );
    }
}
