//! The membership coordinator: identities, seats, threads.
//!
//! The coordinator owns the mapping between philosopher identities and
//! running agent threads. It allocates ids monotonically (never reused, so
//! a resolved id is unambiguous for the whole dinner), commits resizes
//! through the monitor's quiescence gate, and starts/joins the threads.
//! Surviving agents are never re-bound eagerly after a resize — they
//! discover the new indexing lazily through stale-claim retries.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use symposium_events::RecordSink;
use symposium_monitor::{Error as MonitorError, Resize, ResizeDirection, TableMonitor};
use symposium_table::PhilosopherId;

use crate::agent::{Departure, Philosopher};
use crate::error::Result;
use crate::policy::DinnerPolicy;
use crate::runtime::{self, AgentHandle};

/// Tally of how the dinner's agent loops ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DinnerSummary {
    /// Loops that ran every cycle.
    pub completed: usize,
    /// Loops whose seat was shrunk away.
    pub vacated: usize,
    /// Loops stopped by [`Symposium::halt`].
    pub halted: usize,
    /// Loops that failed (panic or unrecoverable monitor error).
    pub failed: usize,
}

impl DinnerSummary {
    /// Total agent loops accounted for.
    pub fn agents(&self) -> usize {
        self.completed + self.vacated + self.halted + self.failed
    }
}

impl std::fmt::Display for DinnerSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} completed, {} left early, {} halted, {} failed",
            self.completed, self.vacated, self.halted, self.failed
        )
    }
}

/// One dinner: the shared monitor plus everything needed to seat, start
/// and collect philosophers.
pub struct Symposium {
    monitor: Arc<TableMonitor>,
    policy: DinnerPolicy,
    sink: Arc<dyn RecordSink>,
    seed: u64,
    next_id: AtomicU64,
    handles: Mutex<Vec<AgentHandle>>,
    stops: Mutex<HashMap<PhilosopherId, Arc<AtomicBool>>>,
}

impl Symposium {
    /// Seat `seats` philosophers (ids `0..seats`), all Thinking.
    ///
    /// `seed` derives every philosopher's private random stream, so a
    /// whole dinner is reproducible up to thread scheduling.
    pub fn new(
        seats: usize,
        policy: DinnerPolicy,
        seed: u64,
        sink: Arc<dyn RecordSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            monitor: Arc::new(TableMonitor::new(seats)),
            policy,
            sink,
            seed,
            next_id: AtomicU64::new(seats as u64),
            handles: Mutex::new(Vec::new()),
            stops: Mutex::new(HashMap::new()),
        })
    }

    /// Handle to the shared monitor (for observation and tests).
    pub fn monitor(&self) -> Arc<TableMonitor> {
        Arc::clone(&self.monitor)
    }

    /// Start one agent thread per seated philosopher.
    pub fn start(self: &Arc<Self>) -> Result<()> {
        let seats = self.monitor.seat_count()?;
        for id in 0..seats as u64 {
            self.spawn_agent(PhilosopherId(id))?;
        }
        info!(seats, "philosophers came in for dinner");
        Ok(())
    }

    /// Grow the table by one seat after `caller`'s seat and start the
    /// newcomer's loop. Returns whether a seat was actually added;
    /// a quiescence rejection is a normal `false`.
    pub fn grow(self: &Arc<Self>, caller: PhilosopherId) -> Result<bool> {
        // The id is burned even if the resize is rejected; ids are
        // plentiful and must never be reused.
        let newcomer = PhilosopherId(self.next_id.fetch_add(1, Ordering::Relaxed));
        loop {
            let claim = match self.monitor.claim_of(caller) {
                Ok(claim) => claim,
                Err(MonitorError::SeatVacated { .. }) => return Ok(false),
                Err(err) => return Err(err.into()),
            };
            match self
                .monitor
                .try_resize(claim, ResizeDirection::Grow { newcomer })
            {
                Ok(Resize::Grew {
                    newcomer,
                    index,
                    generation,
                }) => {
                    info!(%newcomer, index, generation, "a new philosopher joins the table");
                    self.spawn_agent(newcomer)?;
                    return Ok(true);
                }
                Ok(_) => return Ok(false),
                Err(err) if err.is_stale() => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Remove `caller`'s own seat. Returns whether the removal committed;
    /// the caller's loop must terminate itself on `true`.
    pub fn shrink(&self, caller: PhilosopherId) -> Result<bool> {
        loop {
            let claim = match self.monitor.claim_of(caller) {
                Ok(claim) => claim,
                // Already gone; nothing left to remove.
                Err(MonitorError::SeatVacated { .. }) => return Ok(true),
                Err(err) => return Err(err.into()),
            };
            match self.monitor.try_resize(claim, ResizeDirection::Shrink) {
                Ok(Resize::Shrank {
                    removed,
                    generation,
                }) => {
                    info!(%removed, generation, "a philosopher leaves the table");
                    return Ok(true);
                }
                Ok(_) => return Ok(false),
                Err(err) if err.is_stale() => continue,
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Ask every agent to stop at its next cycle boundary. Agents blocked
    /// inside the monitor finish their current operation first; nothing is
    /// interrupted mid-wait.
    pub fn halt(&self) {
        let stops = self.stops.lock().expect("membership registry poisoned");
        for stop in stops.values() {
            stop.store(true, Ordering::Relaxed);
        }
    }

    /// Wait for every agent loop to exit, including philosophers seated
    /// mid-dinner by grows.
    pub fn join(&self) -> DinnerSummary {
        let mut summary = DinnerSummary::default();
        loop {
            let handle = {
                let mut handles = self.handles.lock().expect("membership registry poisoned");
                handles.pop()
            };
            let Some(handle) = handle else { break };
            let id = handle.id();
            match handle.join() {
                Ok(Departure::Completed) => summary.completed += 1,
                Ok(Departure::Vacated) => summary.vacated += 1,
                Ok(Departure::Halted) => summary.halted += 1,
                Err(err) => {
                    warn!(philosopher = %id, %err, "agent loop failed");
                    summary.failed += 1;
                }
            }
        }
        info!(%summary, "all philosophers have left");
        summary
    }

    fn spawn_agent(self: &Arc<Self>, id: PhilosopherId) -> Result<()> {
        let stop = Arc::new(AtomicBool::new(false));
        // Distinct per-philosopher stream from the dinner seed.
        let seed = self.seed ^ id.0.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        let philosopher = Philosopher::new(
            id,
            Arc::clone(&self.monitor),
            self.policy.clone(),
            Arc::clone(&self.sink),
            Arc::clone(&stop),
            seed,
        );
        let coordinator = Arc::clone(self);
        let handle = runtime::spawn(id, move || philosopher.run(&coordinator))?;

        self.stops
            .lock()
            .expect("membership registry poisoned")
            .insert(id, stop);
        self.handles
            .lock()
            .expect("membership registry poisoned")
            .push(handle);
        Ok(())
    }
}
