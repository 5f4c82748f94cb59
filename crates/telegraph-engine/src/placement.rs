//! Logging stand-in for the external placement system.
//!
//! A real host would instantiate obstacles in its world when spawn events
//! arrive. The engine binary has no world, so this observer logs every
//! event with structured fields (and the full JSON payload at trace
//! level) and keeps the session tallies the end-of-run summary reports.

use telegraph_core::sequencer::SequenceObserver;
use telegraph_types::{DisplayEvent, SpawnEvent};
use tracing::{debug, info, trace};

/// Observer that bridges sequencer events to the log.
#[derive(Debug, Default)]
pub struct PlacementLog {
    spawns: u64,
    high_score: u64,
}

impl PlacementLog {
    /// Create an empty placement log.
    pub const fn new() -> Self {
        Self {
            spawns: 0,
            high_score: 0,
        }
    }

    /// Total spawn events observed this session.
    pub const fn spawn_count(&self) -> u64 {
        self.spawns
    }

    /// Highest counter value announced this session.
    pub const fn high_score(&self) -> u64 {
        self.high_score
    }
}

impl SequenceObserver for PlacementLog {
    fn on_display(&mut self, event: &DisplayEvent) {
        self.high_score = self.high_score.max(event.counter);
        info!(
            counter = event.counter,
            code = %event.code,
            speed = event.speed,
            "Display updated"
        );
    }

    fn on_spawn(&mut self, event: &SpawnEvent) {
        self.spawns = self.spawns.saturating_add(1);
        debug!(
            sequence = event.sequence,
            symbol_index = event.symbol_index,
            symbol = %event.symbol,
            candidate = %event.candidate,
            x = event.offset.x,
            y = event.offset.y,
            z = event.offset.z,
            "Obstacle spawned"
        );
        if let Ok(payload) = serde_json::to_string(event) {
            trace!(payload, "spawn event payload");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use telegraph_types::{CandidateId, Position, Symbol};

    use super::*;

    #[test]
    fn tallies_spawns_and_high_score() {
        let mut log = PlacementLog::new();

        log.on_display(&DisplayEvent {
            counter: 3,
            code: String::from("...--"),
            speed: 9.5,
        });
        log.on_spawn(&SpawnEvent {
            sequence: 3,
            symbol_index: 0,
            symbol: Symbol::Dot,
            candidate: CandidateId::new("rock_low"),
            offset: Position::ZERO,
        });
        log.on_spawn(&SpawnEvent {
            sequence: 3,
            symbol_index: 1,
            symbol: Symbol::Dash,
            candidate: CandidateId::new("rock_tall"),
            offset: Position::ZERO,
        });
        log.on_display(&DisplayEvent {
            counter: 1,
            code: String::from(".----"),
            speed: 9.6,
        });

        assert_eq!(log.spawn_count(), 2);
        // High score keeps the peak, not the latest.
        assert_eq!(log.high_score(), 3);
    }
}
