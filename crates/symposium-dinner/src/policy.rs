//! Pure policy knobs for the agent loops.
//!
//! Everything here is a side-effect-free decision function over an injected
//! random source. The monitor never sees any of it: probabilities and busy
//! durations shape the traffic, not the synchronization contract.

use std::time::Duration;

use rand::Rng;

/// Default number of seats at the table.
pub const DEFAULT_SEATS: usize = 5;

/// Default dining cycles per philosopher.
pub const DEFAULT_STEPS: usize = 100;

/// Things a philosopher may say while holding the talk floor.
const PHRASES: &[&str] = &[
    "Eh, it's not easy to be a philosopher: eat, think, talk, eat...",
    "You know, true is false and false is true if you think of it",
    "2 + 2 = 5 for extremely large values of 2...",
    "If thee cannot speak, thee must be silent",
    "To live is to suffer, to survive is to find some meaning in the suffering.",
    "When you look into an abyss, the abyss also looks into you.",
    "God is dead. God remains dead. And we have killed him.",
    "Love is a serious mental disease.",
    "Man - a being in search of meaning.",
    "One of the penalties for refusing to participate in politics is that you end up being governed by your inferiors.",
];

/// Tunables for one dinner. Clone one copy per philosopher.
#[derive(Debug, Clone)]
pub struct DinnerPolicy {
    /// Dining cycles each philosopher runs to completion.
    pub steps: usize,
    /// Ceiling for every randomized busy period (eating, thinking,
    /// talking, napping).
    pub max_action: Duration,
    /// Per-cycle chance of requesting the talk floor.
    pub talk_probability: f64,
    /// Per-cycle chance of taking a nap after the meal.
    pub nap_probability: f64,
    /// Per-meal chance of seasoning with a pepper shaker.
    pub pepper_probability: f64,
    /// Per-cycle chance of attempting a resize.
    pub resize_probability: f64,
    /// Given a resize attempt, the chance it grows rather than shrinks.
    pub grow_bias: f64,
}

impl Default for DinnerPolicy {
    fn default() -> Self {
        Self {
            steps: DEFAULT_STEPS,
            max_action: Duration::from_millis(1000),
            talk_probability: 0.35,
            nap_probability: 0.2,
            pepper_probability: 0.4,
            resize_probability: 0.05,
            grow_bias: 0.5,
        }
    }
}

impl DinnerPolicy {
    /// A policy tuned for tests and demos: few cycles, sub-millisecond
    /// busy periods, lively probabilities.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            steps: 8,
            max_action: Duration::from_millis(2),
            talk_probability: 0.5,
            nap_probability: 0.3,
            pepper_probability: 0.5,
            resize_probability: 0.1,
            grow_bias: 0.5,
        }
    }

    /// Set the number of dining cycles.
    #[must_use]
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    /// Set the busy-period ceiling.
    #[must_use]
    pub fn with_max_action(mut self, max_action: Duration) -> Self {
        self.max_action = max_action;
        self
    }

    /// Disable resizing entirely (fixed table size).
    #[must_use]
    pub fn without_resizing(mut self) -> Self {
        self.resize_probability = 0.0;
        self
    }

    /// Draw a busy duration in `[0, max_action]`.
    pub fn action_duration(&self, rng: &mut impl Rng) -> Duration {
        let ceiling = self.max_action.as_millis() as u64;
        Duration::from_millis(rng.gen_range(0..=ceiling))
    }

    /// Decide whether to request the talk floor this cycle.
    pub fn wants_talk(&self, rng: &mut impl Rng) -> bool {
        rng.gen_bool(self.talk_probability)
    }

    /// Decide whether to nap this cycle.
    pub fn wants_nap(&self, rng: &mut impl Rng) -> bool {
        rng.gen_bool(self.nap_probability)
    }

    /// Decide whether to season the current meal.
    pub fn wants_pepper(&self, rng: &mut impl Rng) -> bool {
        rng.gen_bool(self.pepper_probability)
    }

    /// Decide whether to attempt a resize this cycle.
    pub fn wants_resize(&self, rng: &mut impl Rng) -> bool {
        rng.gen_bool(self.resize_probability)
    }

    /// Given a resize attempt, decide whether to grow the table.
    pub fn prefers_growth(&self, rng: &mut impl Rng) -> bool {
        rng.gen_bool(self.grow_bias)
    }

    /// Something brilliant to say.
    pub fn phrase(&self, rng: &mut impl Rng) -> &'static str {
        PHRASES[rng.gen_range(0..PHRASES.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn action_duration_respects_ceiling() {
        let policy = DinnerPolicy::default().with_max_action(Duration::from_millis(5));
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            assert!(policy.action_duration(&mut rng) <= Duration::from_millis(5));
        }
    }

    #[test]
    fn degenerate_probabilities_are_deterministic() {
        let mut policy = DinnerPolicy::default();
        policy.talk_probability = 0.0;
        policy.resize_probability = 1.0;

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert!(!policy.wants_talk(&mut rng));
            assert!(policy.wants_resize(&mut rng));
        }
    }

    #[test]
    fn phrases_come_from_the_table() {
        let policy = DinnerPolicy::default();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert!(PHRASES.contains(&policy.phrase(&mut rng)));
        }
    }
}
