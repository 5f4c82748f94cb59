//! Event payloads emitted by the running sequencer.
//!
//! Two event kinds leave the core: a display event at the start of every
//! sequence (score and rendered code, for whatever UI the host runs), and a
//! spawn event per landed symbol (for the external placement system). Both
//! are plain serde-ready data; the core never waits on their consumers.

use serde::{Deserialize, Serialize};

use crate::ids::CandidateId;
use crate::symbol::Symbol;

/// A world-space offset applied to everything the sequencer spawns.
///
/// The sequencer does not own a coordinate system; it forwards the offset
/// it was configured with so the placement system can position obstacles
/// relative to the emitter.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// Offset along the travel axis.
    pub x: f64,
    /// Vertical offset.
    pub y: f64,
    /// Depth offset.
    pub z: f64,
}

impl Position {
    /// The zero offset.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a position from explicit components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Emitted once per landed symbol: the placement system should instantiate
/// the named candidate at the given offset.
///
/// Symbols whose weighted draw misses every candidate produce no spawn
/// event at all -- a gap in the obstacle stream, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEvent {
    /// Counter value of the sequence this spawn belongs to.
    pub sequence: u64,
    /// Zero-based position of the symbol within the flat symbol stream.
    pub symbol_index: u32,
    /// Whether the symbol is a dot or a dash.
    pub symbol: Symbol,
    /// The candidate chosen by the weighted draw.
    pub candidate: CandidateId,
    /// World-space offset of the emitter at spawn time.
    pub offset: Position,
}

/// Emitted at the start of every sequence, before any of its spawn events.
///
/// Hosts use this to refresh the score readout and the Morse-code display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayEvent {
    /// The counter value being encoded (this is also the current score).
    pub counter: u64,
    /// The rendered code, digit groups joined by single spaces.
    pub code: String,
    /// Current travel speed reported by the difficulty source, re-published
    /// for collaborators that scale obstacle movement.
    pub speed: f64,
}

/// A single item in the sequencer's outbound event stream.
///
/// Channel-based hosts receive this union; callback-based hosts get the
/// two payloads through separate observer methods instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SequencerEvent {
    /// A sequence is beginning; refresh score and code displays.
    Display(DisplayEvent),
    /// A symbol landed; instantiate the named candidate.
    Spawn(SpawnEvent),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn spawn_event_serializes_with_snake_case_fields() {
        let event = SpawnEvent {
            sequence: 12,
            symbol_index: 3,
            symbol: Symbol::Dash,
            candidate: CandidateId::new("rock_tall"),
            offset: Position::new(24.0, 0.0, 0.0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["sequence"], 12);
        assert_eq!(json["symbol_index"], 3);
        assert_eq!(json["candidate"], "rock_tall");
        assert_eq!(json["offset"]["x"], 24.0);
    }

    #[test]
    fn event_union_is_kind_tagged() {
        let event = SequencerEvent::Display(DisplayEvent {
            counter: 0,
            code: String::from("-----"),
            speed: 8.0,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "display");
        assert_eq!(json["counter"], 0);
        assert_eq!(json["code"], "-----");
    }

    #[test]
    fn display_event_roundtrips() {
        let original = SequencerEvent::Display(DisplayEvent {
            counter: 42,
            code: String::from("....- ..---"),
            speed: 11.5,
        });
        let json = serde_json::to_string(&original).unwrap();
        let restored: SequencerEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, original);
    }
}
