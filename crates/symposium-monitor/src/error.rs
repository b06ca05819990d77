//! Error types for symposium-monitor.

use symposium_table::{PhilosopherId, TableError};
use thiserror::Error;

/// Result type for monitor operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during monitor operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A structural table error: out-of-bounds index, duplicate occupant.
    /// These are programming errors on the caller's side and fail fast.
    #[error("table error: {0}")]
    Table(#[from] TableError),

    /// The seat claim was computed against an older table generation.
    /// Normal during resizes: re-resolve the seat by occupant id and retry.
    #[error("seat claim at generation {held} is stale, table is at generation {current}")]
    StaleClaim { held: u64, current: u64 },

    /// The occupant no longer has a seat; its agent loop should terminate.
    #[error("{id} no longer has a seat at this table")]
    SeatVacated { id: PhilosopherId },

    /// Another agent panicked while holding the monitor lock. Fatal for the
    /// observing agent only; counters were restored on the panicking side.
    #[error("monitor lock poisoned by a panicking agent")]
    Poisoned,
}

impl Error {
    /// Whether the caller should re-resolve its seat claim and retry.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleClaim { .. })
    }
}
