//! Symposium Seat Table
//!
//! Circularly-indexed table of philosopher seats with the structural
//! invariants of the dinner:
//!
//! - **Adjacency**: seat i's neighbors are (i−1 mod N) and (i+1 mod N).
//!   A one-seat table is its own neighbor; a two-seat table has the same
//!   seat on both sides.
//! - **Quiescence**: the table may change size only while every seat is
//!   Thinking. Each committed resize bumps a generation counter so index
//!   arithmetic computed before the resize can be detected as stale.
//! - **Identity**: each row carries a stable [`PhilosopherId`] that travels
//!   with the row across resizes; indices are positional and ephemeral.
//!
//! This crate is pure data. It holds no locks and does no I/O; the blocking
//! protocol lives in `symposium-monitor`, which owns a `StateTable` behind
//! its mutex.

mod audit;
mod seat;
mod table;

pub use audit::{check_table, InvariantViolation};
pub use seat::{PhilosopherId, Seat, SeatState};
pub use table::{StateTable, TableError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_table_is_quiescent() {
        let table = StateTable::new(5);
        assert!(table.is_quiescent());
        assert_eq!(table.len(), 5);
        assert_eq!(table.generation(), 0);
    }
}
