//! Sequencer engine binary for Telegraph.
//!
//! This is the main entry point that wires together the sequencer loop,
//! the difficulty ramp, the control plane, and the placement log. It loads
//! configuration, initializes all subsystems, and runs the sequencer until
//! a termination condition is met.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `telegraph-config.yaml`
//! 3. Create the shared control plane from the run bounds
//! 4. Create the real-time difficulty ramp
//! 5. Seed the sequencer state from the configured world seed
//! 6. Arm ctrl-c as the stop signal
//! 7. Run the sequencer loop
//! 8. Log the result

mod error;
mod placement;
mod speed_ramp;

use std::path::Path;
use std::sync::Arc;

use telegraph_core::config::SequencerConfig;
use telegraph_core::control::SequencerControl;
use telegraph_core::sequencer::{self, SequencerState};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::placement::PlacementLog;
use crate::speed_ramp::RampDifficulty;

/// Application entry point for the sequencer engine.
///
/// Initializes all subsystems and runs the sequencer loop. Returns an
/// error code on failure.
///
/// # Errors
///
/// Returns an error if configuration loading or the run itself fails.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("telegraph-engine starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        world_name = config.world.name,
        seed = config.world.seed,
        symbol_interval_secs = config.timing.symbol_interval_secs,
        min_gap_secs = config.timing.min_gap_secs,
        max_gap_secs = config.timing.max_gap_secs,
        start_behavior = ?config.emitter.start_behavior,
        dot_candidates = config.candidates.dot.len(),
        dash_candidates = config.candidates.dash.len(),
        "Configuration loaded"
    );

    // 3. Create the control plane.
    let control = Arc::new(SequencerControl::new(&config.bounds));
    info!(
        max_sequences = control.max_sequences(),
        max_real_time_seconds = control.max_real_time_seconds(),
        "Control plane initialized"
    );

    // 4. Create the difficulty ramp.
    let difficulty = RampDifficulty::new(&config.difficulty);
    info!(
        initial_speed = config.difficulty.initial_speed,
        speed_increase_per_sec = config.difficulty.speed_increase_per_sec,
        max_speed = config.difficulty.max_speed,
        "Difficulty ramp initialized"
    );

    // 5. Seed the sequencer state.
    let mut state = SequencerState::new(config.world.seed);
    let mut placement = PlacementLog::new();

    // 6. Arm ctrl-c as the stop signal, standing in for the host's own
    //    stop surface.
    {
        let stop_control = Arc::clone(&control);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("ctrl-c received, stopping sequencer");
                let _ = stop_control.request_stop();
            }
        });
    }

    info!("Entering sequencer loop");

    // 7. Run the sequencer.
    let result =
        sequencer::run_sequencer(&mut state, &config, &difficulty, &control, &mut placement)
            .await
            .map_err(EngineError::from)?;

    // 8. Log results.
    sequencer::log_run_end(&result);

    info!(
        end_reason = ?result.end_reason,
        final_score = control.score(),
        high_score = placement.high_score(),
        spawns = placement.spawn_count(),
        "telegraph-engine shutdown complete"
    );

    Ok(())
}

/// Load the sequencer configuration.
///
/// The path comes from the `TELEGRAPH_CONFIG` environment variable when
/// set, otherwise `telegraph-config.yaml` relative to the working
/// directory. A missing file falls back to defaults.
fn load_config() -> Result<SequencerConfig, EngineError> {
    let path_var = std::env::var("TELEGRAPH_CONFIG");
    let path_str = path_var.as_deref().unwrap_or("telegraph-config.yaml");
    let config_path = Path::new(path_str);
    if config_path.exists() {
        let config = SequencerConfig::from_file(config_path)?;
        Ok(config)
    } else {
        info!("Config file not found, using defaults");
        Ok(SequencerConfig::default())
    }
}
