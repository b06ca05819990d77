//! Symposium Event Log
//!
//! The logger collaborator of the dinner: immutable state-snapshot and
//! diagnostic records, plus sinks to deliver them.
//!
//! Delivery is strictly best-effort. A [`RecordSink`] must never block the
//! caller and never surface a failure into an agent loop — a dinner with a
//! dead log keeps eating. The two provided sinks are
//! [`EventLog`] (an unbounded channel drained by a writer thread emitting
//! JSON Lines) and [`MemoryRecorder`] (an in-memory vector for tests and
//! replay).

mod records;
mod sink;

pub use records::{LogRecord, TableSnapshot};
pub use sink::{EventLog, LogSender, MemoryRecorder, RecordSink};
