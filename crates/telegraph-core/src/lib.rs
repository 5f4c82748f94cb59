//! Sequencer core for Telegraph: the Morse-cadence obstacle generator.
//!
//! This crate owns the loop that turns an incrementing counter into a timed
//! stream of dot/dash spawn events: encode the counter as Morse code, emit
//! one spawn per symbol at a fixed cadence, rest for a randomized gap,
//! advance the counter, repeat. The counter doubles as the session score.
//!
//! # Modules
//!
//! - [`morse`] -- Pure encoding of a counter value into digit-grouped
//!   dot/dash sequences.
//! - [`selection`] -- Weighted candidate tables and the cumulative draw
//!   policy used to pick what spawns for each symbol.
//! - [`config`] -- Configuration loading from `telegraph-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- Shared control plane: pause/resume, stop, run bounds,
//!   and the read-only score mirror.
//! - [`difficulty`] -- [`DifficultySource`] trait and [`FixedDifficulty`].
//! - [`sequencer`] -- The sequencer loop itself, its observer seam, and the
//!   run result.
//!
//! [`DifficultySource`]: difficulty::DifficultySource
//! [`FixedDifficulty`]: difficulty::FixedDifficulty

pub mod config;
pub mod control;
pub mod difficulty;
pub mod morse;
pub mod selection;
pub mod sequencer;
