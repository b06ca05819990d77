//! Seat states and occupant identity.

use std::fmt;

/// Stable identity of a philosopher, allocated once and never reused.
///
/// Seat *indices* shift when the table is resized; the occupant id moves
/// with its row, so it is the only safe way to refer to an agent across
/// resize events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhilosopherId(pub u64);

impl fmt::Display for PhilosopherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// What a seat is doing right now. Exactly one state per seat at any instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SeatState {
    /// Holding no resources. The only state a resize may observe.
    #[default]
    Thinking,
    /// Waiting for both chopsticks.
    Hungry,
    /// Holding both chopsticks.
    Eating,
    /// Holding the talk floor.
    Talking,
    /// Counted in the global sleep counter.
    Sleeping,
}

impl SeatState {
    /// Whether this seat would permit a resize (quiescence per seat).
    pub const fn is_thinking(self) -> bool {
        matches!(self, Self::Thinking)
    }

    /// Whether this seat holds both chopsticks.
    pub const fn is_eating(self) -> bool {
        matches!(self, Self::Eating)
    }
}

impl fmt::Display for SeatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thinking => write!(f, "Thinking"),
            Self::Hungry => write!(f, "Hungry"),
            Self::Eating => write!(f, "Eating"),
            Self::Talking => write!(f, "Talking"),
            Self::Sleeping => write!(f, "Sleeping"),
        }
    }
}

/// One table position: an occupant and its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Seat {
    /// Who sits here. Stable across resizes.
    pub occupant: PhilosopherId,
    /// What the occupant is doing.
    pub state: SeatState,
}

impl Seat {
    /// A fresh Thinking seat for the given occupant.
    pub const fn thinking(occupant: PhilosopherId) -> Self {
        Self {
            occupant,
            state: SeatState::Thinking,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_thinking() {
        assert_eq!(SeatState::default(), SeatState::Thinking);
        assert!(SeatState::Thinking.is_thinking());
        assert!(!SeatState::Hungry.is_thinking());
    }

    #[test]
    fn state_display() {
        assert_eq!(format!("{}", SeatState::Eating), "Eating");
        assert_eq!(format!("{}", SeatState::Sleeping), "Sleeping");
        assert_eq!(format!("{}", PhilosopherId(3)), "P3");
    }
}
