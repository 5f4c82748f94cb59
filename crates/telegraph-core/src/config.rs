//! Configuration loading and typed config structures for the sequencer.
//!
//! The canonical configuration lives in `telegraph-config.yaml` at the
//! project root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and validates the file.
//!
//! Validation is strict about timing (gap bounds must be ordered, intervals
//! finite and non-negative) and about weight ranges, but deliberately lax
//! about weight sums: a table that does not sum to 1 loads fine and only
//! logs a warning, because under-assigned probability mass is a supported
//! way of thinning the obstacle stream.

use std::path::Path;

use serde::Deserialize;
use telegraph_types::Position;

use crate::selection::{CandidateTable, SpawnCandidate};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but its values are unusable.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Whether entering the run loop resets the counter or continues from its
/// current value.
///
/// The two behaviors suit different hosts: `Reset` is the fresh-game
/// default, `Resume` lets a host briefly tear the loop down (scene change,
/// pause screen) and pick the session back up mid-score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartBehavior {
    /// Zero the counter when the run begins.
    #[default]
    Reset,
    /// Keep whatever counter value the state currently holds.
    Resume,
}

/// Top-level sequencer configuration.
///
/// Mirrors the structure of `telegraph-config.yaml`. All fields have
/// defaults matching the reference tuning.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SequencerConfig {
    /// World-level settings (name, seed).
    #[serde(default)]
    pub world: WorldConfig,

    /// Cadence settings (symbol interval, gap bounds).
    #[serde(default)]
    pub timing: TimingConfig,

    /// Emitter settings (start behavior, spawn offset).
    #[serde(default)]
    pub emitter: EmitterConfig,

    /// Weighted candidate tables for each symbol kind.
    #[serde(default)]
    pub candidates: CandidatesConfig,

    /// Difficulty ramp parameters, consumed by the host's speed source.
    #[serde(default)]
    pub difficulty: DifficultyConfig,

    /// Run boundary parameters.
    #[serde(default)]
    pub bounds: RunBoundsConfig,
}

impl SequencerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values fail validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the values fail validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check timing, difficulty, and weight-range invariants.
    ///
    /// Weight sums are deliberately not an error; the tables warn about
    /// them instead (see [`CandidateTable::validate`]).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first violated
    /// invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()?;
        self.difficulty.validate()?;
        self.candidates.validate()?;
        Ok(())
    }

    /// Build the selection table for dot symbols.
    pub fn dot_table(&self) -> CandidateTable {
        self.candidates.table(&self.candidates.dot)
    }

    /// Build the selection table for dash symbols.
    pub fn dash_table(&self) -> CandidateTable {
        self.candidates.table(&self.candidates.dash)
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable session name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducible candidate draws and gap lengths.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
        }
    }
}

/// Cadence configuration, all values in seconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TimingConfig {
    /// Pause after each emitted symbol.
    #[serde(default = "default_symbol_interval_secs")]
    pub symbol_interval_secs: f64,

    /// Lower bound of the randomized inter-sequence gap.
    #[serde(default = "default_min_gap_secs")]
    pub min_gap_secs: f64,

    /// Upper bound of the randomized inter-sequence gap.
    #[serde(default = "default_max_gap_secs")]
    pub max_gap_secs: f64,
}

impl TimingConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (label, value) in [
            ("timing.symbol_interval_secs", self.symbol_interval_secs),
            ("timing.min_gap_secs", self.min_gap_secs),
            ("timing.max_gap_secs", self.max_gap_secs),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    reason: format!("{label} must be a finite non-negative number, got {value}"),
                });
            }
        }
        if self.min_gap_secs > self.max_gap_secs {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "timing.min_gap_secs ({}) must not exceed timing.max_gap_secs ({})",
                    self.min_gap_secs, self.max_gap_secs
                ),
            });
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            symbol_interval_secs: default_symbol_interval_secs(),
            min_gap_secs: default_min_gap_secs(),
            max_gap_secs: default_max_gap_secs(),
        }
    }
}

/// Emitter configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EmitterConfig {
    /// Whether a run starts from zero or from the current counter.
    #[serde(default)]
    pub start_behavior: StartBehavior,

    /// World-space offset carried on every spawn event.
    #[serde(default)]
    pub position_offset: Position,
}

/// One configured candidate: a name and its selection weight.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CandidateWeightConfig {
    /// Host-side identifier of the spawnable thing.
    pub name: String,

    /// Selection weight in `[0, 1]`.
    pub weight: f64,
}

/// Weighted candidate lists for each symbol kind.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CandidatesConfig {
    /// Candidates drawn for dot symbols, in draw order.
    #[serde(default = "default_dot_candidates")]
    pub dot: Vec<CandidateWeightConfig>,

    /// Candidates drawn for dash symbols, in draw order.
    #[serde(default = "default_dash_candidates")]
    pub dash: Vec<CandidateWeightConfig>,
}

impl CandidatesConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (label, list) in [("candidates.dot", &self.dot), ("candidates.dash", &self.dash)] {
            for entry in list {
                if !entry.weight.is_finite() || entry.weight < 0.0 || entry.weight > 1.0 {
                    return Err(ConfigError::Invalid {
                        reason: format!(
                            "{label} entry '{}' has weight {}, expected a value in [0, 1]",
                            entry.name, entry.weight
                        ),
                    });
                }
            }
        }
        // Sum mismatches warn rather than fail.
        self.table(&self.dot).validate("dot");
        self.table(&self.dash).validate("dash");
        Ok(())
    }

    fn table(&self, list: &[CandidateWeightConfig]) -> CandidateTable {
        CandidateTable::new(
            list.iter()
                .map(|entry| SpawnCandidate::new(entry.name.as_str(), entry.weight))
                .collect(),
        )
    }
}

impl Default for CandidatesConfig {
    fn default() -> Self {
        Self {
            dot: default_dot_candidates(),
            dash: default_dash_candidates(),
        }
    }
}

/// Difficulty ramp configuration.
///
/// The sequencer's own cadence never consumes these values; they
/// parameterize the host's speed source, whose readings are re-published
/// on display events for collaborators that move obstacles.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DifficultyConfig {
    /// Travel speed at the start of a run.
    #[serde(default = "default_initial_speed")]
    pub initial_speed: f64,

    /// Speed gained per elapsed real-time second.
    #[serde(default = "default_speed_increase_per_sec")]
    pub speed_increase_per_sec: f64,

    /// Ceiling the ramp clamps to.
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
}

impl DifficultyConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        for (label, value) in [
            ("difficulty.initial_speed", self.initial_speed),
            ("difficulty.speed_increase_per_sec", self.speed_increase_per_sec),
            ("difficulty.max_speed", self.max_speed),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    reason: format!("{label} must be a finite non-negative number, got {value}"),
                });
            }
        }
        if self.initial_speed > self.max_speed {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "difficulty.initial_speed ({}) must not exceed difficulty.max_speed ({})",
                    self.initial_speed, self.max_speed
                ),
            });
        }
        Ok(())
    }
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            initial_speed: default_initial_speed(),
            speed_increase_per_sec: default_speed_increase_per_sec(),
            max_speed: default_max_speed(),
        }
    }
}

/// Run boundary parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RunBoundsConfig {
    /// Stop after this many completed sequences (0 = unlimited).
    #[serde(default)]
    pub max_sequences: u64,

    /// Stop after this many wall-clock seconds (0 = unlimited).
    #[serde(default)]
    pub max_real_time_seconds: u64,
}

fn default_world_name() -> String {
    String::from("telegraph")
}

const fn default_seed() -> u64 {
    1_337
}

const fn default_symbol_interval_secs() -> f64 {
    0.5
}

const fn default_min_gap_secs() -> f64 {
    1.0
}

const fn default_max_gap_secs() -> f64 {
    2.0
}

const fn default_initial_speed() -> f64 {
    8.0
}

const fn default_speed_increase_per_sec() -> f64 {
    0.1
}

const fn default_max_speed() -> f64 {
    22.0
}

fn default_dot_candidates() -> Vec<CandidateWeightConfig> {
    vec![CandidateWeightConfig {
        name: String::from("dot_obstacle"),
        weight: 1.0,
    }]
}

fn default_dash_candidates() -> Vec<CandidateWeightConfig> {
    vec![CandidateWeightConfig {
        name: String::from("dash_obstacle"),
        weight: 1.0,
    }]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let config = SequencerConfig::default();
        assert!((config.timing.symbol_interval_secs - 0.5).abs() < f64::EPSILON);
        assert!((config.timing.min_gap_secs - 1.0).abs() < f64::EPSILON);
        assert!((config.timing.max_gap_secs - 2.0).abs() < f64::EPSILON);
        assert!((config.difficulty.initial_speed - 8.0).abs() < f64::EPSILON);
        assert!((config.difficulty.max_speed - 22.0).abs() < f64::EPSILON);
        assert_eq!(config.emitter.start_behavior, StartBehavior::Reset);
        assert_eq!(config.bounds.max_sequences, 0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_a_full_yaml_document() {
        let yaml = r"
world:
  name: desert-run
  seed: 99
timing:
  symbol_interval_secs: 0.25
  min_gap_secs: 0.5
  max_gap_secs: 1.5
emitter:
  start_behavior: resume
  position_offset:
    x: 24.0
    y: -1.0
    z: 0.0
candidates:
  dot:
    - name: rock_low
      weight: 0.6
    - name: cactus_small
      weight: 0.4
  dash:
    - name: rock_tall
      weight: 1.0
difficulty:
  initial_speed: 6.0
  speed_increase_per_sec: 0.2
  max_speed: 18.0
bounds:
  max_sequences: 100
  max_real_time_seconds: 600
";
        let config = SequencerConfig::parse(yaml).unwrap();
        assert_eq!(config.world.name, "desert-run");
        assert_eq!(config.world.seed, 99);
        assert_eq!(config.emitter.start_behavior, StartBehavior::Resume);
        assert!((config.emitter.position_offset.x - 24.0).abs() < f64::EPSILON);
        assert_eq!(config.candidates.dot.len(), 2);
        assert_eq!(config.dot_table().len(), 2);
        assert_eq!(config.dash_table().len(), 1);
        assert_eq!(config.bounds.max_sequences, 100);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config = SequencerConfig::parse("world:\n  seed: 7\n").unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.name, "telegraph");
        assert!((config.timing.symbol_interval_secs - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.candidates.dot.len(), 1);
    }

    #[test]
    fn rejects_inverted_gap_bounds() {
        let yaml = "timing:\n  min_gap_secs: 3.0\n  max_gap_secs: 1.0\n";
        let result = SequencerConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_negative_intervals() {
        let yaml = "timing:\n  symbol_interval_secs: -0.1\n";
        let result = SequencerConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_out_of_range_weights() {
        let yaml = "candidates:\n  dot:\n    - name: rock\n      weight: 1.5\n  dash: []\n";
        let result = SequencerConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn shortfall_weight_sums_load_with_a_warning_only() {
        let yaml = "candidates:\n  dot:\n    - name: rock\n      weight: 0.3\n  dash:\n    - name: wall\n      weight: 1.0\n";
        let config = SequencerConfig::parse(yaml).unwrap();
        assert!((config.dot_table().weight_sum() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn rejects_inverted_speed_bounds() {
        let yaml = "difficulty:\n  initial_speed: 30.0\n  max_speed: 22.0\n";
        let result = SequencerConfig::parse(yaml);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
