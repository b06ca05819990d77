//! Symposium Dinner
//!
//! The agent side of the dining-philosophers monitor: per-seat agent loops
//! ([`Philosopher`]), pure policy knobs ([`DinnerPolicy`]), and the
//! membership coordinator ([`Symposium`]) that seats, starts, resizes and
//! joins the whole dinner.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use symposium_dinner::{DinnerPolicy, Symposium};
//! use symposium_events::MemoryRecorder;
//!
//! let recorder = MemoryRecorder::new();
//! let symposium = Symposium::new(5, DinnerPolicy::fast(), 42, Arc::new(recorder.clone()));
//! symposium.start().unwrap();
//! let summary = symposium.join();
//! assert_eq!(summary.failed, 0);
//! ```

mod agent;
mod error;
mod membership;
mod policy;
mod runtime;

pub use agent::{Departure, Philosopher};
pub use error::{DinnerError, Result};
pub use membership::{DinnerSummary, Symposium};
pub use policy::{DinnerPolicy, DEFAULT_SEATS, DEFAULT_STEPS};
pub use runtime::AgentHandle;
