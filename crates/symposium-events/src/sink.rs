//! Record sinks: where dinner records go to be remembered (or not).

use std::io::{self, Write};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::{debug, trace};

use crate::records::LogRecord;

/// A destination for dinner records.
///
/// Implementations must never block the caller and must swallow their own
/// failures: the monitor and the agent loops do not wait for, or hear back
/// from, the logger.
pub trait RecordSink: Send + Sync {
    /// Deliver one record, best-effort.
    fn record(&self, record: LogRecord);
}

/// Intake messages; the shutdown sentinel lets the log close even while
/// agent threads still hold senders.
enum Intake {
    Record(LogRecord),
    Shutdown,
}

/// Channel-backed log: records are queued without backpressure and drained
/// by a dedicated writer thread emitting one JSON object per line.
pub struct EventLog {
    tx: mpsc::Sender<Intake>,
    writer: Option<thread::JoinHandle<()>>,
}

impl EventLog {
    /// Start a log draining into `writer`.
    pub fn to_writer<W: Write + Send + 'static>(mut writer: W) -> io::Result<Self> {
        let (tx, rx) = mpsc::channel::<Intake>();
        let handle = thread::Builder::new()
            .name("symposium-log".into())
            .spawn(move || {
                for intake in rx {
                    let record = match intake {
                        Intake::Record(record) => record,
                        Intake::Shutdown => break,
                    };
                    match serde_json::to_string(&record) {
                        Ok(line) => {
                            if writeln!(writer, "{line}").is_err() {
                                // Dead sink: keep draining so senders never
                                // notice, per the best-effort contract.
                                debug!("log writer failed; discarding further records");
                            }
                        }
                        Err(err) => debug!(%err, "unserializable record dropped"),
                    }
                }
                let _ = writer.flush();
            })?;
        Ok(Self {
            tx,
            writer: Some(handle),
        })
    }

    /// A cheap clonable handle for agent threads.
    pub fn sender(&self) -> LogSender {
        LogSender {
            tx: self.tx.clone(),
        }
    }

    /// Close the intake and wait for the writer to drain everything queued
    /// so far. Records sent after this point are dropped silently.
    pub fn finish(mut self) {
        self.close();
    }

    fn close(&mut self) {
        let _ = self.tx.send(Intake::Shutdown);
        if let Some(handle) = self.writer.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        self.close();
    }
}

/// Sending half of an [`EventLog`].
#[derive(Clone)]
pub struct LogSender {
    tx: mpsc::Sender<Intake>,
}

impl RecordSink for LogSender {
    fn record(&self, record: LogRecord) {
        if self.tx.send(Intake::Record(record)).is_err() {
            trace!("log closed; record dropped");
        }
    }
}

/// In-memory sink for tests and replay.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl MemoryRecorder {
    /// An empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in delivery order.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    /// Number of records delivered so far.
    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSink for MemoryRecorder {
    fn record(&self, record: LogRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::TableSnapshot;
    use symposium_table::SeatState;

    /// A `Write` the test can read back after the writer thread is done.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn snapshot(ordinal: u64) -> LogRecord {
        LogRecord::Snapshot(TableSnapshot::new(ordinal, vec![SeatState::Thinking], 2))
    }

    #[test]
    fn event_log_writes_one_json_line_per_record() {
        let buf = SharedBuf::default();
        let log = EventLog::to_writer(buf.clone()).unwrap();

        let sender = log.sender();
        sender.record(snapshot(0));
        sender.record(LogRecord::Diagnostic {
            ordinal: 1,
            detail: "2 seats are Talking at once".into(),
        });
        log.finish();

        let bytes = buf.0.lock().unwrap().clone();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: LogRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.ordinal(), 0);
        let second: LogRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.ordinal(), 1);
    }

    #[test]
    fn sender_outliving_the_log_drops_silently() {
        let buf = SharedBuf::default();
        let log = EventLog::to_writer(buf).unwrap();
        let sender = log.sender();
        drop(log);

        // The writer is gone; delivery must neither block nor panic.
        sender.record(snapshot(0));
    }

    #[test]
    fn memory_recorder_keeps_delivery_order() {
        let recorder = MemoryRecorder::new();
        assert!(recorder.is_empty());

        recorder.record(snapshot(0));
        recorder.record(snapshot(1));

        let records = recorder.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].ordinal(), 0);
        assert_eq!(records[1].ordinal(), 1);
    }
}
