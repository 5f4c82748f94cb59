//! Error types for the sequencer engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and run execution.

/// Top-level error for the sequencer engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: telegraph_core::config::ConfigError,
    },

    /// The sequencer rejected a state transition.
    #[error("sequencer error: {source}")]
    Sequencer {
        /// The underlying sequencer error.
        #[from]
        source: telegraph_core::control::SequencerError,
    },
}
