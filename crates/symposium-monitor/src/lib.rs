//! Symposium Resource Monitor
//!
//! One mutual-exclusion domain for the whole dinner. The monitor owns the
//! seat table and every counter, and exposes the blocking operations the
//! agent loops drive:
//!
//! - **Chopsticks**: [`pick_up`](TableMonitor::pick_up) /
//!   [`put_down`](TableMonitor::put_down) — atomic two-chopstick
//!   acquisition with hunger-ticket priority (deadlock-free, see
//!   `monitor` module docs).
//! - **Talk floor**: [`request_talk`](TableMonitor::request_talk) /
//!   [`end_talk`](TableMonitor::end_talk) — single holder, excluded while
//!   anyone sleeps.
//! - **Sleep**: [`request_sleep`](TableMonitor::request_sleep) /
//!   [`end_sleep`](TableMonitor::end_sleep) — counted, excluded while the
//!   floor is held or requested.
//! - **Pepper pool**: [`request_pepper`](TableMonitor::request_pepper) /
//!   [`return_pepper`](TableMonitor::return_pepper) — bounded counting
//!   pool with single-wake release.
//! - **Resize**: [`try_resize`](TableMonitor::try_resize) — quiescence-gated
//!   insertion/removal with generation-validated seat claims.
//!
//! Observability never bypasses the lock:
//! [`observe`](TableMonitor::observe) produces snapshot records for the
//! logger and [`audit`](TableMonitor::audit) reports best-effort invariant
//! diagnostics.

mod error;
mod monitor;

pub use error::{Error, Result};
pub use monitor::{
    MonitorConfig, Observation, Resize, ResizeDirection, SeatClaim, TableMonitor,
    DEFAULT_PEPPER_CAPACITY,
};

// Re-export the table vocabulary for convenience.
pub use symposium_table::{InvariantViolation, PhilosopherId, SeatState};
