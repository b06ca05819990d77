//! The table monitor: one mutex, three condition variables, every rule.
//!
//! All shared state of the dinner lives behind a single [`Mutex`]; every
//! operation is a critical section and every blocking operation waits in a
//! predicate loop (release lock, wait, reacquire, re-test), so a spurious or
//! stale wakeup can never grant a resource.
//!
//! # Eat eligibility
//!
//! Both chopsticks are taken atomically inside the monitor: a seat moves
//! Hungry → Eating only when the full predicate holds, and never holds one
//! chopstick while waiting for the other. With no partial hold there is no
//! hold-and-wait and therefore no circular wait — the classic deadlock
//! cannot form, regardless of table size.
//!
//! Starvation is curbed with hunger tickets. Every seat entering Hungry
//! draws a monotonically increasing ticket; a seat may eat only if neither
//! neighbor is Eating and no Hungry neighbor holds an older ticket. Among
//! hungry seats the oldest ticket in any neighborhood is blocked only by
//! eaters, and eaters always put their chopsticks down after a bounded busy
//! period, so the oldest hungry seat always makes progress and later
//! arrivals can never overtake it. This is best-effort priority, not a
//! bounded-waiting-time guarantee.
//!
//! # Resizes and stale indices
//!
//! Seat indices are only stable between resizes. Callers therefore pass a
//! [`SeatClaim`] — an index plus the table generation it was resolved at —
//! and every operation revalidates the claim on entry and after every wake.
//! A claim that lost a race with a resize fails with
//! [`Error::StaleClaim`](crate::Error::StaleClaim); the caller re-resolves
//! its seat by occupant id and retries. Resizes commit only when every seat
//! is Thinking (quiescence), so no seat ever holds a resource across a
//! re-indexing.

use std::sync::{Condvar, Mutex, MutexGuard};

use tracing::{debug, error, trace};

use symposium_table::{
    check_table, InvariantViolation, PhilosopherId, SeatState, StateTable, TableError,
};

use crate::error::{Error, Result};

/// Default number of pepper shakers on the table.
pub const DEFAULT_PEPPER_CAPACITY: usize = 2;

/// Configuration for a table monitor.
#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    /// Size of the pepper pool (capacity C).
    pub pepper_capacity: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            pepper_capacity: DEFAULT_PEPPER_CAPACITY,
        }
    }
}

impl MonitorConfig {
    /// Set the pepper pool capacity.
    #[must_use]
    pub fn with_pepper_capacity(mut self, capacity: usize) -> Self {
        self.pepper_capacity = capacity;
        self
    }
}

/// A seat index pinned to the table generation it was resolved at.
///
/// Obtained from [`TableMonitor::claim_of`]; valid until the next committed
/// resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatClaim {
    /// Positional seat index.
    pub index: usize,
    /// Table generation the index was observed at.
    pub generation: u64,
}

/// Which way to resize the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    /// Insert a fresh Thinking seat for `newcomer` after the caller's seat.
    Grow { newcomer: PhilosopherId },
    /// Remove the caller's own seat.
    Shrink,
}

/// Outcome of a resize attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resize {
    /// A seat was inserted; the newcomer's loop should be started.
    Grew {
        newcomer: PhilosopherId,
        index: usize,
        generation: u64,
    },
    /// The caller's seat was removed; its loop should terminate.
    Shrank {
        removed: PhilosopherId,
        generation: u64,
    },
    /// The table was not quiescent (or down to its last seat). Normal
    /// outcome, retried on a later cycle; never an error.
    Rejected,
}

/// An immutable observation of the table, for the logger collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Monotonic ordinal assigned under the monitor lock.
    pub ordinal: u64,
    /// Per-seat states in table order.
    pub states: Vec<SeatState>,
    /// Pepper shakers currently available.
    pub pepper_available: usize,
}

/// Everything the monitor lock guards.
#[derive(Debug)]
struct MonitorState {
    table: StateTable,
    /// Hunger ticket per seat, `Some` only while Hungry. Parallel to the
    /// table; rebuilt (all `None`) on every resize, which is sound because
    /// resizes require quiescence.
    tickets: Vec<Option<u64>>,
    next_ticket: u64,
    talk_occupied: bool,
    pending_talk: usize,
    sleeping: usize,
    pepper_available: usize,
    pepper_holders: usize,
    pepper_capacity: usize,
    ordinal: u64,
}

impl MonitorState {
    /// Check a claim against the live table. Generation first: a stale
    /// claim's index is meaningless and must not be bounds-interpreted.
    fn validate(&self, claim: SeatClaim) -> Result<()> {
        let current = self.table.generation();
        if claim.generation != current {
            return Err(Error::StaleClaim {
                held: claim.generation,
                current,
            });
        }
        let len = self.table.len();
        if claim.index >= len {
            return Err(Error::Table(TableError::SeatOutOfBounds {
                index: claim.index,
                len,
            }));
        }
        Ok(())
    }

    /// The eat-eligibility predicate. Callers hold the lock and have
    /// validated `seat`.
    fn can_eat(&self, seat: usize) -> bool {
        let (left, right) = self
            .table
            .neighbors(seat)
            .expect("validated seat index is in bounds");
        let mine = self.tickets[seat];
        [left, right].into_iter().all(|n| {
            if n == seat {
                // One-seat table: a seat never blocks itself.
                return true;
            }
            match self.table.state(n).expect("neighbor index is in bounds") {
                SeatState::Eating => false,
                SeatState::Hungry => match (self.tickets[n], mine) {
                    // An older hungry neighbor eats first.
                    (Some(theirs), Some(ours)) => theirs > ours,
                    // Ticketless hungry neighbor should not exist; yield.
                    (None, _) | (_, None) => false,
                },
                _ => true,
            }
        })
    }

    /// Roll a Hungry seat back to Thinking after an aborted wait.
    fn abandon_hunger(&mut self, seat: usize) {
        if let Some(slot) = self.tickets.get_mut(seat) {
            *slot = None;
        }
        let _ = self.table.set_state(seat, SeatState::Thinking);
    }

    fn seated_sleepers(&self) -> usize {
        self.table
            .seats()
            .iter()
            .filter(|s| s.state == SeatState::Sleeping)
            .count()
    }
}

/// The shared synchronization monitor for one table.
///
/// Cheap to share: wrap in an `Arc` and hand a clone to every agent loop.
/// There is deliberately no global instance.
#[derive(Debug)]
pub struct TableMonitor {
    state: Mutex<MonitorState>,
    /// Eat eligibility. Broadcast: a put-down may free both neighbors.
    chopsticks: Condvar,
    /// Talk floor and sleep exclusion. Broadcast.
    floor: Condvar,
    /// Pepper pool. Single wake — see [`TableMonitor::return_pepper`].
    pepper: Condvar,
}

impl TableMonitor {
    /// A monitor for `seats` philosophers (ids `0..seats`), default config.
    pub fn new(seats: usize) -> Self {
        Self::with_config(seats, MonitorConfig::default())
    }

    /// A monitor for `seats` philosophers with explicit configuration.
    pub fn with_config(seats: usize, config: MonitorConfig) -> Self {
        Self::with_table(StateTable::new(seats), config)
    }

    /// A monitor over a pre-seated table (custom occupant ids).
    pub fn with_table(table: StateTable, config: MonitorConfig) -> Self {
        let seats = table.len();
        Self {
            state: Mutex::new(MonitorState {
                table,
                tickets: vec![None; seats],
                next_ticket: 0,
                talk_occupied: false,
                pending_talk: 0,
                sleeping: 0,
                pepper_available: config.pepper_capacity,
                pepper_holders: 0,
                pepper_capacity: config.pepper_capacity,
                ordinal: 0,
            }),
            chopsticks: Condvar::new(),
            floor: Condvar::new(),
            pepper: Condvar::new(),
        }
    }

    /// Number of seats at the table right now.
    pub fn seat_count(&self) -> Result<usize> {
        Ok(self.lock()?.table.len())
    }

    /// Pepper pool capacity.
    pub fn pepper_capacity(&self) -> Result<usize> {
        Ok(self.lock()?.pepper_capacity)
    }

    /// Resolve an occupant's current seat into a claim.
    pub fn claim_of(&self, id: PhilosopherId) -> Result<SeatClaim> {
        let state = self.lock()?;
        let index = state
            .table
            .seat_of(id)
            .ok_or(Error::SeatVacated { id })?;
        Ok(SeatClaim {
            index,
            generation: state.table.generation(),
        })
    }

    /// Become Hungry and block until both chopsticks are available.
    ///
    /// While the caller waits it is Hungry, which pins the table
    /// non-quiescent — the claim cannot go stale mid-wait.
    pub fn pick_up(&self, claim: SeatClaim) -> Result<()> {
        let mut state = self.lock()?;
        state.validate(claim)?;
        let seat = claim.index;

        let ticket = state.next_ticket;
        state.next_ticket += 1;
        state.tickets[seat] = Some(ticket);
        state.table.set_state(seat, SeatState::Hungry)?;
        trace!(seat, ticket, "hungry, waiting for chopsticks");

        while !state.can_eat(seat) {
            state = match self.chopsticks.wait(state) {
                Ok(guard) => guard,
                Err(poisoned) => {
                    // Aborted wait: roll back before surfacing, so the
                    // neighbors are not blocked on a phantom Hungry seat.
                    poisoned.into_inner().abandon_hunger(seat);
                    return Err(Error::Poisoned);
                }
            };
        }

        state.tickets[seat] = None;
        state.table.set_state(seat, SeatState::Eating)?;
        debug!(seat, "started eating");
        Ok(())
    }

    /// Put both chopsticks down and return to Thinking.
    pub fn put_down(&self, claim: SeatClaim) -> Result<()> {
        let mut state = self.lock()?;
        state.validate(claim)?;
        state.table.set_state(claim.index, SeatState::Thinking)?;
        debug!(seat = claim.index, "done eating");
        // Either neighbor's eligibility may have changed.
        self.chopsticks.notify_all();
        Ok(())
    }

    /// Request the talk floor; blocks while it is held or anyone sleeps.
    ///
    /// The pending-requester counter is incremented for the whole span of
    /// the request (through [`end_talk`](Self::end_talk)) and restored on
    /// every abort path, so sleepers are never gated on a ghost requester.
    pub fn request_talk(&self, claim: SeatClaim) -> Result<()> {
        let mut state = self.lock()?;
        state.validate(claim)?;
        state.pending_talk += 1;
        trace!(seat = claim.index, pending = state.pending_talk, "requesting talk floor");

        while state.talk_occupied || state.sleeping > 0 {
            state = match self.floor.wait(state) {
                Ok(guard) => guard,
                Err(poisoned) => {
                    let mut guard = poisoned.into_inner();
                    guard.pending_talk = guard.pending_talk.saturating_sub(1);
                    self.floor.notify_all();
                    return Err(Error::Poisoned);
                }
            };
            // The caller is Thinking while it waits, so a resize may have
            // committed; the claim must be re-proven before use.
            if let Err(err) = state.validate(claim) {
                // A sleeper may be gated on this requester alone; the
                // lowered pending counter is an enabling change.
                state.pending_talk -= 1;
                self.floor.notify_all();
                return Err(err);
            }
        }

        state.talk_occupied = true;
        state.table.set_state(claim.index, SeatState::Talking)?;
        debug!(seat = claim.index, "took the talk floor");
        Ok(())
    }

    /// Release the talk floor and return to Thinking.
    pub fn end_talk(&self, claim: SeatClaim) -> Result<()> {
        let mut state = self.lock()?;
        state.validate(claim)?;
        state.table.set_state(claim.index, SeatState::Thinking)?;
        state.talk_occupied = false;
        if state.pending_talk == 0 {
            // Counter drift is a bug, surfaced but never left negative.
            error!(seat = claim.index, "end_talk with no pending requesters");
        } else {
            state.pending_talk -= 1;
        }
        debug!(seat = claim.index, "released the talk floor");
        self.floor.notify_all();
        Ok(())
    }

    /// Fall asleep; blocks while the floor is held or requested.
    ///
    /// Talk requesters have priority: a sleeper waits for the pending
    /// counter to drain. The converse cannot cycle — sleepers wake on their
    /// own after a bounded nap, never by waiting on talkers.
    pub fn request_sleep(&self, claim: SeatClaim) -> Result<()> {
        let mut state = self.lock()?;
        state.validate(claim)?;

        while state.talk_occupied || state.pending_talk > 0 {
            state = match self.floor.wait(state) {
                Ok(guard) => guard,
                Err(_) => return Err(Error::Poisoned),
            };
            state.validate(claim)?;
        }

        state.sleeping += 1;
        state.table.set_state(claim.index, SeatState::Sleeping)?;
        debug!(seat = claim.index, sleeping = state.sleeping, "fell asleep");
        Ok(())
    }

    /// Wake up and return to Thinking.
    pub fn end_sleep(&self, claim: SeatClaim) -> Result<()> {
        let mut state = self.lock()?;
        state.validate(claim)?;
        if state.sleeping == 0 {
            // Clamped, surfaced, never persisted as a negative count.
            error!(seat = claim.index, "end_sleep would drive the sleep counter negative");
        } else {
            state.sleeping -= 1;
        }
        state.table.set_state(claim.index, SeatState::Thinking)?;
        debug!(seat = claim.index, sleeping = state.sleeping, "woke up");
        self.floor.notify_all();
        Ok(())
    }

    /// Take a pepper shaker; blocks while the pool is empty.
    pub fn request_pepper(&self, claim: SeatClaim) -> Result<()> {
        let mut state = self.lock()?;
        state.validate(claim)?;

        while state.pepper_available == 0 {
            state = match self.pepper.wait(state) {
                Ok(guard) => guard,
                Err(_) => return Err(Error::Poisoned),
            };
            state.validate(claim)?;
        }

        state.pepper_available -= 1;
        state.pepper_holders += 1;
        trace!(seat = claim.index, available = state.pepper_available, "took a pepper shaker");
        Ok(())
    }

    /// Return a pepper shaker and wake ONE waiter.
    ///
    /// Single-wake release is the pool's semaphore semantics: a waiter that
    /// loses the race to a newly-arrived requester goes back to waiting and
    /// can in principle be overtaken forever. Known fairness gap, kept.
    pub fn return_pepper(&self, claim: SeatClaim) -> Result<()> {
        let mut state = self.lock()?;
        state.validate(claim)?;
        if state.pepper_available >= state.pepper_capacity {
            error!(
                seat = claim.index,
                capacity = state.pepper_capacity,
                "pepper return would exceed capacity"
            );
        } else {
            state.pepper_available += 1;
        }
        state.pepper_holders = state.pepper_holders.saturating_sub(1);
        trace!(seat = claim.index, available = state.pepper_available, "returned a pepper shaker");
        self.pepper.notify_one();
        Ok(())
    }

    /// Attempt to grow or shrink the table at the caller's seat.
    ///
    /// Commits only when every seat is Thinking; a rejection is a normal
    /// outcome, not an error. On commit every condition variable is
    /// broadcast so blocked waiters revalidate their claims against the new
    /// generation.
    pub fn try_resize(&self, claim: SeatClaim, direction: ResizeDirection) -> Result<Resize> {
        let mut state = self.lock()?;
        state.validate(claim)?;

        if !state.table.is_quiescent() {
            trace!(seat = claim.index, "resize rejected: table not quiescent");
            return Ok(Resize::Rejected);
        }

        let outcome = match direction {
            ResizeDirection::Grow { newcomer } => {
                let index = state.table.insert_seat(claim.index, newcomer)?;
                let generation = state.table.generation();
                debug!(seat = claim.index, %newcomer, index, generation, "table grew");
                Resize::Grew {
                    newcomer,
                    index,
                    generation,
                }
            }
            ResizeDirection::Shrink => {
                if state.table.len() <= 1 {
                    trace!(seat = claim.index, "resize rejected: last seat stays");
                    return Ok(Resize::Rejected);
                }
                let seat = state.table.remove_seat(claim.index)?;
                let generation = state.table.generation();
                debug!(removed = %seat.occupant, generation, "table shrank");
                Resize::Shrank {
                    removed: seat.occupant,
                    generation,
                }
            }
        };

        // Quiescence means no ticket is live; a fresh ticket vector of the
        // new length keeps it parallel to the table.
        state.tickets = vec![None; state.table.len()];

        self.chopsticks.notify_all();
        self.floor.notify_all();
        self.pepper.notify_all();
        Ok(outcome)
    }

    /// Take an immutable observation for the logger. Assigns the next
    /// snapshot ordinal under the lock.
    pub fn observe(&self) -> Result<Observation> {
        let mut state = self.lock()?;
        let ordinal = state.ordinal;
        state.ordinal += 1;
        Ok(Observation {
            ordinal,
            states: state.table.states(),
            pepper_available: state.pepper_available,
        })
    }

    /// Best-effort invariant inspection under the lock.
    ///
    /// Findings are diagnostics for the logger, not ground truth: detection
    /// races with observation, so violations are reported and the dinner
    /// keeps going.
    pub fn audit(&self) -> Result<Vec<InvariantViolation>> {
        let state = self.lock()?;
        let mut violations = check_table(&state.table);

        if state.talk_occupied && state.sleeping > 0 {
            violations.push(InvariantViolation::TalkDuringSleep {
                sleepers: state.sleeping,
            });
        }

        let seated = state.seated_sleepers();
        if seated != state.sleeping {
            violations.push(InvariantViolation::SleepCounterDrift {
                recorded: state.sleeping,
                seated,
            });
        }

        if state.pepper_available + state.pepper_holders != state.pepper_capacity {
            violations.push(InvariantViolation::PepperImbalance {
                available: state.pepper_available,
                holders: state.pepper_holders,
                capacity: state.pepper_capacity,
            });
        }

        Ok(violations)
    }

    fn lock(&self) -> Result<MutexGuard<'_, MonitorState>> {
        self.state.lock().map_err(|_| Error::Poisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claim(monitor: &TableMonitor, id: u64) -> SeatClaim {
        monitor.claim_of(PhilosopherId(id)).unwrap()
    }

    #[test]
    fn untouched_monitor_is_quiescent_with_full_pool() {
        let monitor = TableMonitor::new(4);
        let obs = monitor.observe().unwrap();
        assert_eq!(obs.ordinal, 0);
        assert!(obs.states.iter().all(|s| s.is_thinking()));
        assert_eq!(obs.pepper_available, DEFAULT_PEPPER_CAPACITY);
        assert!(monitor.audit().unwrap().is_empty());
    }

    #[test]
    fn lone_philosopher_eats_without_blocking() {
        let monitor = TableMonitor::new(1);
        let c = claim(&monitor, 0);
        monitor.pick_up(c).unwrap();
        assert_eq!(monitor.observe().unwrap().states, vec![SeatState::Eating]);
        monitor.put_down(c).unwrap();
        assert!(monitor.audit().unwrap().is_empty());
    }

    #[test]
    fn stale_claim_is_rejected_with_both_generations() {
        let monitor = TableMonitor::new(3);
        let old = claim(&monitor, 0);
        let grown = monitor
            .try_resize(old, ResizeDirection::Grow { newcomer: PhilosopherId(9) })
            .unwrap();
        assert!(matches!(grown, Resize::Grew { index: 1, .. }));

        assert_eq!(
            monitor.pick_up(old),
            Err(Error::StaleClaim { held: 0, current: 1 })
        );
        // Re-resolving by occupant id yields a usable claim.
        let fresh = claim(&monitor, 0);
        assert_eq!(fresh.generation, 1);
        monitor.pick_up(fresh).unwrap();
    }

    #[test]
    fn resize_rejected_while_any_seat_is_busy() {
        let monitor = TableMonitor::new(4);
        monitor.pick_up(claim(&monitor, 1)).unwrap();

        let outcome = monitor
            .try_resize(claim(&monitor, 0), ResizeDirection::Shrink)
            .unwrap();
        assert_eq!(outcome, Resize::Rejected);
        assert_eq!(monitor.seat_count().unwrap(), 4);
        // A rejection does not bump the generation.
        assert_eq!(claim(&monitor, 0).generation, 0);
    }

    #[test]
    fn last_seat_cannot_be_shrunk_away() {
        let monitor = TableMonitor::new(1);
        let outcome = monitor
            .try_resize(claim(&monitor, 0), ResizeDirection::Shrink)
            .unwrap();
        assert_eq!(outcome, Resize::Rejected);
    }

    #[test]
    fn shrink_vacates_the_caller() {
        let monitor = TableMonitor::new(3);
        let outcome = monitor
            .try_resize(claim(&monitor, 1), ResizeDirection::Shrink)
            .unwrap();
        assert_eq!(
            outcome,
            Resize::Shrank {
                removed: PhilosopherId(1),
                generation: 1
            }
        );
        assert_eq!(
            monitor.claim_of(PhilosopherId(1)),
            Err(Error::SeatVacated { id: PhilosopherId(1) })
        );
        assert_eq!(monitor.seat_count().unwrap(), 2);
    }

    #[test]
    fn pepper_pool_counts_down_and_clamps_up() {
        let monitor = TableMonitor::with_config(3, MonitorConfig::default().with_pepper_capacity(1));
        let c = claim(&monitor, 0);
        monitor.pick_up(c).unwrap();
        monitor.request_pepper(c).unwrap();
        assert_eq!(monitor.observe().unwrap().pepper_available, 0);

        monitor.return_pepper(c).unwrap();
        assert_eq!(monitor.observe().unwrap().pepper_available, 1);

        // A second return would exceed capacity: clamped and surfaced.
        monitor.return_pepper(c).unwrap();
        assert_eq!(monitor.observe().unwrap().pepper_available, 1);
        monitor.put_down(c).unwrap();
    }

    #[test]
    fn out_of_bounds_claim_fails_fast() {
        let monitor = TableMonitor::new(2);
        let bogus = SeatClaim {
            index: 7,
            generation: 0,
        };
        assert_eq!(
            monitor.pick_up(bogus),
            Err(Error::Table(TableError::SeatOutOfBounds { index: 7, len: 2 }))
        );
    }

    #[test]
    fn sleep_counter_never_goes_negative() {
        let monitor = TableMonitor::new(2);
        let c = claim(&monitor, 0);
        // end_sleep without request_sleep: clamped, and the seat still
        // lands back in Thinking.
        monitor.end_sleep(c).unwrap();
        let obs = monitor.observe().unwrap();
        assert!(obs.states.iter().all(|s| s.is_thinking()));
    }
}
