//! Error types for symposium-dinner.

use thiserror::Error;

/// Result type for dinner operations.
pub type Result<T> = std::result::Result<T, DinnerError>;

/// Errors that can end an agent loop or a dinner.
#[derive(Debug, Error)]
pub enum DinnerError {
    /// The monitor failed in a non-recoverable way (poisoned lock, bad
    /// seat index). Stale-claim errors are retried internally and never
    /// surface here.
    #[error("monitor error: {0}")]
    Monitor(#[from] symposium_monitor::Error),

    /// The runtime could not start an agent thread.
    #[error("failed to start an agent thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// An agent thread panicked; its seat state is suspect and the monitor
    /// lock may be poisoned for everyone else.
    #[error("agent thread panicked")]
    AgentPanicked,
}
