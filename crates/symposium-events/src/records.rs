//! Immutable records emitted over the dinner's lifetime.

use serde::{Deserialize, Serialize};
use symposium_table::SeatState;

/// One observation of the table: who is doing what, and how much pepper is
/// left. Ordinals are assigned by the monitor under its lock, so record
/// order is the lock order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// Monotonic observation ordinal.
    pub ordinal: u64,
    /// Per-seat states in table order.
    pub seats: Vec<SeatState>,
    /// Pepper shakers available at observation time.
    pub pepper_available: usize,
}

impl TableSnapshot {
    /// Build a snapshot record from its parts.
    pub fn new(ordinal: u64, seats: Vec<SeatState>, pepper_available: usize) -> Self {
        Self {
            ordinal,
            seats,
            pepper_available,
        }
    }
}

/// A record accepted by the logger collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LogRecord {
    /// Routine table observation.
    Snapshot(TableSnapshot),

    /// A suspected invariant violation or other noteworthy condition,
    /// reported opportunistically. Diagnostics are best-effort assertions,
    /// never ground truth.
    Diagnostic { ordinal: u64, detail: String },
}

impl LogRecord {
    /// The observation ordinal this record belongs to.
    pub fn ordinal(&self) -> u64 {
        match self {
            Self::Snapshot(snapshot) => snapshot.ordinal,
            Self::Diagnostic { ordinal, .. } => *ordinal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_with_type_tag() {
        let record = LogRecord::Snapshot(TableSnapshot::new(
            7,
            vec![SeatState::Thinking, SeatState::Eating],
            1,
        ));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"type\":\"Snapshot\""), "{json}");
        assert!(json.contains("\"ordinal\":7"), "{json}");

        let back: LogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
        assert_eq!(back.ordinal(), 7);
    }

    #[test]
    fn diagnostic_carries_its_ordinal() {
        let record = LogRecord::Diagnostic {
            ordinal: 3,
            detail: "sleep counter records 1 but 0 seat(s) are Sleeping".into(),
        };
        assert_eq!(record.ordinal(), 3);
    }
}
