//! Thin facade over the thread runtime: start and join, nothing else.

use std::thread;

use symposium_table::PhilosopherId;

use crate::agent::Departure;
use crate::error::{DinnerError, Result};

/// Handle to one running agent loop.
#[derive(Debug)]
pub struct AgentHandle {
    id: PhilosopherId,
    inner: thread::JoinHandle<Result<Departure>>,
}

impl AgentHandle {
    /// Which philosopher this handle belongs to.
    pub fn id(&self) -> PhilosopherId {
        self.id
    }

    /// Wait for the agent loop to exit.
    ///
    /// A panicking agent is reported as [`DinnerError::AgentPanicked`]
    /// rather than propagating the panic into the coordinator.
    pub fn join(self) -> Result<Departure> {
        match self.inner.join() {
            Ok(outcome) => outcome,
            Err(_) => Err(DinnerError::AgentPanicked),
        }
    }
}

/// Start one agent loop on a named OS thread.
pub fn spawn(
    id: PhilosopherId,
    run: impl FnOnce() -> Result<Departure> + Send + 'static,
) -> Result<AgentHandle> {
    let inner = thread::Builder::new()
        .name(format!("philosopher-{}", id.0))
        .spawn(run)?;
    Ok(AgentHandle { id, inner })
}
