//! Real-time difficulty ramp.
//!
//! Travel speed starts at a configured baseline and climbs linearly with
//! elapsed wall-clock time until it hits the configured ceiling. The ramp
//! is a pure function of elapsed time, so reads are lock-free and two
//! collaborators polling at the same instant see the same value.
//!
//! The sequencer reads this through the [`DifficultySource`] seam; its own
//! cadence never consumes the speed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use telegraph_core::config::DifficultyConfig;
use telegraph_core::difficulty::DifficultySource;

/// Linear speed ramp with a game-over latch.
#[derive(Debug)]
pub struct RampDifficulty {
    initial_speed: f64,
    increase_per_sec: f64,
    max_speed: f64,
    started_at: Instant,
    game_over: AtomicBool,
}

impl RampDifficulty {
    /// Create a ramp from difficulty configuration, starting now.
    pub fn new(config: &DifficultyConfig) -> Self {
        Self {
            initial_speed: config.initial_speed,
            increase_per_sec: config.speed_increase_per_sec,
            max_speed: config.max_speed,
            started_at: Instant::now(),
            game_over: AtomicBool::new(false),
        }
    }

    /// Speed after the given number of elapsed seconds, clamped at the
    /// ceiling.
    fn speed_after(&self, elapsed_secs: f64) -> f64 {
        self.increase_per_sec
            .mul_add(elapsed_secs, self.initial_speed)
            .min(self.max_speed)
    }

    /// Latch the game-over flag; the running sequencer ends before its
    /// next sequence. A new session gets a new ramp.
    pub fn set_game_over(&self) {
        self.game_over.store(true, Ordering::Release);
    }
}

impl DifficultySource for RampDifficulty {
    fn speed(&self) -> f64 {
        self.speed_after(self.started_at.elapsed().as_secs_f64())
    }

    fn is_game_over(&self) -> bool {
        self.game_over.load(Ordering::Acquire)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn reference_config() -> DifficultyConfig {
        DifficultyConfig {
            initial_speed: 8.0,
            speed_increase_per_sec: 0.1,
            max_speed: 22.0,
        }
    }

    #[test]
    fn starts_at_the_initial_speed() {
        let ramp = RampDifficulty::new(&reference_config());
        assert!((ramp.speed_after(0.0) - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn climbs_linearly_until_the_ceiling() {
        let ramp = RampDifficulty::new(&reference_config());
        assert!((ramp.speed_after(10.0) - 9.0).abs() < 1e-9);
        // 8 + 0.1 * 140 = 22, exactly the ceiling.
        assert!((ramp.speed_after(140.0) - 22.0).abs() < 1e-9);
        assert!((ramp.speed_after(10_000.0) - 22.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_increase_stays_flat() {
        let config = DifficultyConfig {
            initial_speed: 8.0,
            speed_increase_per_sec: 0.0,
            max_speed: 22.0,
        };
        let ramp = RampDifficulty::new(&config);
        assert!((ramp.speed_after(1_000.0) - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn game_over_latch_sticks() {
        let ramp = RampDifficulty::new(&reference_config());
        assert!(!ramp.is_game_over());
        ramp.set_game_over();
        assert!(ramp.is_game_over());
    }
}
