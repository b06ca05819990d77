//! The philosopher agent loop.
//!
//! One loop per seat, driven to completion over a fixed number of dining
//! cycles. The loop owns nothing shared beyond its identity: all shared
//! state is reached through the injected monitor handle, records go to the
//! injected sink, and every randomized decision comes from the injected
//! policy. Between monitor calls the loop burns bounded busy periods with
//! no lock held.
//!
//! Seat indices are resolved per operation: the loop asks the monitor for
//! its current claim, runs the operation, and retries from scratch when the
//! claim went stale under a concurrent resize. A vacated seat ends the loop
//! between operations; the loop never cancels anyone else.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use symposium_events::{LogRecord, RecordSink, TableSnapshot};
use symposium_monitor::{Error as MonitorError, SeatClaim, TableMonitor};
use symposium_table::PhilosopherId;

use crate::error::Result;
use crate::membership::Symposium;
use crate::policy::DinnerPolicy;

/// How an agent loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    /// Ran every dining cycle.
    Completed,
    /// Left early because its seat was shrunk away.
    Vacated,
    /// Stopped by the coordinator between cycles.
    Halted,
}

/// Outcome of one claim-validated monitor call.
enum Attempt<T> {
    Done(T),
    Vacated,
}

/// One participant: seat identity plus injected collaborators.
pub struct Philosopher {
    id: PhilosopherId,
    monitor: Arc<TableMonitor>,
    policy: DinnerPolicy,
    sink: Arc<dyn RecordSink>,
    stop: Arc<AtomicBool>,
    rng: StdRng,
}

impl Philosopher {
    /// Bind a philosopher to a seat occupant id.
    pub fn new(
        id: PhilosopherId,
        monitor: Arc<TableMonitor>,
        policy: DinnerPolicy,
        sink: Arc<dyn RecordSink>,
        stop: Arc<AtomicBool>,
        seed: u64,
    ) -> Self {
        Self {
            id,
            monitor,
            policy,
            sink,
            stop,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// This philosopher's stable identity.
    pub fn id(&self) -> PhilosopherId {
        self.id
    }

    /// Run the full dining loop.
    pub fn run(mut self, symposium: &Arc<Symposium>) -> Result<Departure> {
        debug!(philosopher = %self.id, steps = self.policy.steps, "sat down");
        for _ in 0..self.policy.steps {
            if self.stop.load(Ordering::Relaxed) {
                debug!(philosopher = %self.id, "halted between cycles");
                return Ok(Departure::Halted);
            }
            if let Some(departure) = self.cycle(symposium)? {
                debug!(philosopher = %self.id, ?departure, "left the table early");
                return Ok(departure);
            }
        }
        debug!(philosopher = %self.id, "finished every cycle");
        Ok(Departure::Completed)
    }

    /// One dining cycle:
    /// eat → think → maybe talk → maybe nap → maybe resize.
    fn cycle(&mut self, symposium: &Arc<Symposium>) -> Result<Option<Departure>> {
        // The meal. Pepper, when wanted, is held strictly inside it.
        if let Some(gone) = self.step(|c| self.monitor.pick_up(c))? {
            return Ok(Some(gone));
        }
        self.observe_and_report();
        let seasoning = self.policy.wants_pepper(&mut self.rng);
        if seasoning {
            if let Some(gone) = self.step(|c| self.monitor.request_pepper(c))? {
                return Ok(Some(gone));
            }
        }
        self.busy("eating");
        if seasoning {
            if let Some(gone) = self.step(|c| self.monitor.return_pepper(c))? {
                return Ok(Some(gone));
            }
        }
        self.observe_and_report();
        if let Some(gone) = self.step(|c| self.monitor.put_down(c))? {
            return Ok(Some(gone));
        }

        self.busy("thinking");
        self.observe_and_report();

        if self.policy.wants_talk(&mut self.rng) {
            if let Some(gone) = self.step(|c| self.monitor.request_talk(c))? {
                return Ok(Some(gone));
            }
            let phrase = self.policy.phrase(&mut self.rng);
            info!(philosopher = %self.id, "says: {phrase}");
            self.observe_and_report();
            self.busy("talking");
            if let Some(gone) = self.step(|c| self.monitor.end_talk(c))? {
                return Ok(Some(gone));
            }
            self.observe_and_report();
        }

        if self.policy.wants_nap(&mut self.rng) {
            if let Some(gone) = self.step(|c| self.monitor.request_sleep(c))? {
                return Ok(Some(gone));
            }
            self.observe_and_report();
            self.busy("napping");
            if let Some(gone) = self.step(|c| self.monitor.end_sleep(c))? {
                return Ok(Some(gone));
            }
            self.observe_and_report();
        }

        if self.policy.wants_resize(&mut self.rng) {
            if self.policy.prefers_growth(&mut self.rng) {
                symposium.grow(self.id)?;
            } else if symposium.shrink(self.id)? {
                return Ok(Some(Departure::Vacated));
            }
        }

        Ok(None)
    }

    /// Run one monitor operation under a freshly resolved seat claim,
    /// retrying transparently when a resize made the claim stale.
    fn step(
        &self,
        op: impl Fn(SeatClaim) -> symposium_monitor::Result<()>,
    ) -> Result<Option<Departure>> {
        match self.with_seat(op)? {
            Attempt::Done(()) => Ok(None),
            Attempt::Vacated => Ok(Some(Departure::Vacated)),
        }
    }

    fn with_seat<T>(
        &self,
        op: impl Fn(SeatClaim) -> symposium_monitor::Result<T>,
    ) -> Result<Attempt<T>> {
        loop {
            let claim = match self.monitor.claim_of(self.id) {
                Ok(claim) => claim,
                Err(MonitorError::SeatVacated { .. }) => return Ok(Attempt::Vacated),
                Err(err) => return Err(err.into()),
            };
            match op(claim) {
                Ok(value) => return Ok(Attempt::Done(value)),
                Err(err) if err.is_stale() => continue,
                Err(MonitorError::SeatVacated { .. }) => return Ok(Attempt::Vacated),
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// A bounded busy period with no lock held.
    fn busy(&mut self, doing: &'static str) {
        let pause = self.policy.action_duration(&mut self.rng);
        debug!(philosopher = %self.id, doing, ?pause, "busy");
        thread::sleep(pause);
    }

    /// Snapshot the table for the logger and relay any audit findings.
    /// Both are best-effort: a failing observation is logged and skipped.
    fn observe_and_report(&self) {
        let observation = match self.monitor.observe() {
            Ok(observation) => observation,
            Err(err) => {
                debug!(philosopher = %self.id, %err, "observation unavailable");
                return;
            }
        };
        let ordinal = observation.ordinal;
        self.sink.record(LogRecord::Snapshot(TableSnapshot::new(
            ordinal,
            observation.states,
            observation.pepper_available,
        )));

        match self.monitor.audit() {
            Ok(violations) => {
                for violation in violations {
                    warn!(philosopher = %self.id, %violation, "invariant suspect");
                    self.sink.record(LogRecord::Diagnostic {
                        ordinal,
                        detail: violation.to_string(),
                    });
                }
            }
            Err(err) => debug!(philosopher = %self.id, %err, "audit unavailable"),
        }
    }
}
