//! Difficulty source trait and a fixed stub implementation.
//!
//! The sequencer never owns difficulty: travel speed and the game-over
//! state belong to the host, and the loop reaches them only through the
//! [`DifficultySource`] handle it was given at start. The handle replaces
//! any globally reachable game-state singleton with an explicit, swappable
//! dependency.
//!
//! The sequencer's own cadence never consumes the speed -- it re-publishes
//! the reading on display events for collaborators that move obstacles,
//! and ends the run when the source reports game over.

use std::sync::atomic::{AtomicBool, Ordering};

/// A source of travel speed and game-over state.
///
/// Implementations are read at the start of every sequence; they should be
/// cheap and never block.
pub trait DifficultySource: Send + Sync {
    /// Current obstacle travel speed.
    fn speed(&self) -> f64;

    /// Whether the session has ended. A `true` reading ends the run
    /// before the next sequence begins.
    fn is_game_over(&self) -> bool;
}

/// A difficulty source with a constant speed and a game-over latch.
///
/// Useful for exercising the loop without a real ramp, and for hosts whose
/// speed is managed elsewhere entirely.
#[derive(Debug)]
pub struct FixedDifficulty {
    speed: f64,
    game_over: AtomicBool,
}

impl FixedDifficulty {
    /// Create a source that always reports the given speed.
    pub const fn new(speed: f64) -> Self {
        Self {
            speed,
            game_over: AtomicBool::new(false),
        }
    }

    /// Latch the game-over flag. There is no unlatch; a new session gets
    /// a new source.
    pub fn set_game_over(&self) {
        self.game_over.store(true, Ordering::Release);
    }
}

impl DifficultySource for FixedDifficulty {
    fn speed(&self) -> f64 {
        self.speed
    }

    fn is_game_over(&self) -> bool {
        self.game_over.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn fixed_source_reports_its_speed() {
        let source = FixedDifficulty::new(8.0);
        assert!((source.speed() - 8.0).abs() < f64::EPSILON);
        assert!(!source.is_game_over());
    }

    #[test]
    fn game_over_latch_sticks() {
        let source = FixedDifficulty::new(8.0);
        source.set_game_over();
        assert!(source.is_game_over());
        assert!(source.is_game_over());
    }
}
