//! The sequencer loop: counter in, timed spawn events out.
//!
//! This module provides [`run_sequencer`], the top-level async function
//! that drives the spawn cadence with support for:
//!
//! - **Bounded runs**: stop after `max_sequences` or `max_real_time_seconds`
//! - **Pause/resume**: the host can hold the loop between sequences
//! - **Clean stop**: a stop request wakes any in-flight suspension, which
//!   is abandoned with no partial spawn and no counter advance
//! - **Game-over coupling**: the difficulty source can end the run
//!
//! Per sequence the loop encodes the counter, publishes the score mirror,
//! emits a display event, emits one spawn per landed symbol at the fixed
//! cadence, rests for the randomized gap, and advances the counter. The
//! display event for a sequence is always observable before any of its
//! spawn events.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use telegraph_types::{DisplayEvent, SequencerEvent, SpawnEvent, Symbol};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{SequencerConfig, StartBehavior, TimingConfig};
use crate::control::{SequenceEndReason, SequencerControl, SequencerError};
use crate::difficulty::DifficultySource;
use crate::morse;

/// Result of a sequencer run.
#[derive(Debug)]
pub struct SequencerResult {
    /// The reason the run ended.
    pub end_reason: SequenceEndReason,
    /// Number of fully completed sequences (symbols and gap included).
    pub sequences_completed: u64,
    /// The counter value when the run ended.
    pub final_counter: u64,
}

/// Callback invoked for each event the loop emits.
///
/// Implementations bridge the loop to the host: a placement system for
/// spawn events, a score/code readout for display events. The loop never
/// waits on an observer, so implementations should return promptly.
pub trait SequenceObserver: Send {
    /// Called at the start of every sequence, before its spawn events.
    fn on_display(&mut self, event: &DisplayEvent);

    /// Called for every landed symbol.
    fn on_spawn(&mut self, event: &SpawnEvent);
}

/// A no-op observer for testing.
pub struct NoOpObserver;

impl SequenceObserver for NoOpObserver {
    fn on_display(&mut self, _event: &DisplayEvent) {}
    fn on_spawn(&mut self, _event: &SpawnEvent) {}
}

/// An observer that forwards every event into an unbounded channel.
///
/// For hosts that prefer consuming a stream over implementing the
/// callback trait. Events emitted after the receiver is dropped are
/// discarded silently.
#[derive(Debug)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<SequencerEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its event stream.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SequencerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl SequenceObserver for ChannelObserver {
    fn on_display(&mut self, event: &DisplayEvent) {
        let _ = self.sender.send(SequencerEvent::Display(event.clone()));
    }

    fn on_spawn(&mut self, event: &SpawnEvent) {
        let _ = self.sender.send(SequencerEvent::Spawn(event.clone()));
    }
}

/// Loop-owned sequencer state: the counter and the seeded RNG.
///
/// Owned exclusively by whoever drives the loop. While a run borrows the
/// state mutably nothing else can touch it, which is what makes
/// [`reset_score`](Self::reset_score) a strictly-idle operation.
#[derive(Debug)]
pub struct SequencerState {
    counter: u64,
    rng: StdRng,
}

impl SequencerState {
    /// Create a fresh state with the counter at 0.
    ///
    /// The seed fixes both candidate draws and gap lengths, so two runs
    /// from the same seed and config emit identical streams.
    pub fn new(seed: u64) -> Self {
        Self {
            counter: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Create a state with an explicit counter value (state restoration,
    /// tests).
    pub fn from_parts(seed: u64, counter: u64) -> Self {
        Self {
            counter,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Return the current counter value.
    pub const fn counter(&self) -> u64 {
        self.counter
    }

    /// Zero the counter and immediately emit a display event for 0, with
    /// no spawn events.
    ///
    /// Only callable while no run borrows the state, so a live loop can
    /// never have its counter yanked out from under it.
    pub fn reset_score(
        &mut self,
        control: &SequencerControl,
        difficulty: &dyn DifficultySource,
        observer: &mut dyn SequenceObserver,
    ) {
        self.counter = 0;
        let code = morse::encode(0);
        control.publish_score(0);
        observer.on_display(&DisplayEvent {
            counter: 0,
            code: code.to_string(),
            speed: difficulty.speed(),
        });
        debug!("score reset to 0");
    }
}

/// Run the sequencer loop until a termination condition is met.
///
/// This is the main entry point for a run. It acquires the control's
/// running flag (rejecting a second concurrent run), honors pause and stop
/// requests, applies the configured start behavior, and releases the flag
/// on the way out whatever the end reason.
///
/// # Arguments
///
/// * `state` - Mutable sequencer state (counter, RNG)
/// * `config` - Cadence, candidate tables, start behavior, spawn offset
/// * `difficulty` - Source of travel speed and game-over state
/// * `control` - Shared control plane (pause, stop, score, bounds)
/// * `observer` - Called for every display and spawn event
///
/// # Errors
///
/// Returns [`SequencerError::AlreadyRunning`] if another run holds the
/// control.
pub async fn run_sequencer(
    state: &mut SequencerState,
    config: &SequencerConfig,
    difficulty: &dyn DifficultySource,
    control: &Arc<SequencerControl>,
    observer: &mut dyn SequenceObserver,
) -> Result<SequencerResult, SequencerError> {
    control.begin_run()?;

    info!(
        start_behavior = ?config.emitter.start_behavior,
        symbol_interval_secs = config.timing.symbol_interval_secs,
        min_gap_secs = config.timing.min_gap_secs,
        max_gap_secs = config.timing.max_gap_secs,
        max_sequences = control.max_sequences(),
        max_real_time_seconds = control.max_real_time_seconds(),
        "Sequencer starting"
    );

    let result = run_loop(state, config, difficulty, control, observer).await;

    control.set_end_reason(result.end_reason.clone()).await;
    control.end_run();
    Ok(result)
}

/// The loop body, separated so the running flag is always released.
async fn run_loop(
    state: &mut SequencerState,
    config: &SequencerConfig,
    difficulty: &dyn DifficultySource,
    control: &SequencerControl,
    observer: &mut dyn SequenceObserver,
) -> SequencerResult {
    let dot_table = config.dot_table();
    let dash_table = config.dash_table();
    if dot_table.is_empty() || dash_table.is_empty() {
        warn!("a candidate table is empty; its symbols will never spawn");
    }

    if config.emitter.start_behavior == StartBehavior::Reset {
        state.counter = 0;
    }

    let symbol_interval = duration_secs(config.timing.symbol_interval_secs);
    let mut sequences_completed: u64 = 0;

    let end_reason = loop {
        // --- Hold while paused (a stop request releases the hold) ---
        control.wait_if_paused().await;

        // --- Checks before the sequence begins ---
        if control.is_stop_requested() {
            break SequenceEndReason::StopRequested;
        }
        if difficulty.is_game_over() {
            debug!(counter = state.counter, "difficulty source reports game over");
            break SequenceEndReason::GameOver;
        }
        if control.time_limit_reached() {
            break SequenceEndReason::MaxRealTimeReached;
        }

        // --- Encode and announce the sequence ---
        let code = morse::encode(state.counter);
        let display_event = DisplayEvent {
            counter: state.counter,
            code: code.to_string(),
            speed: difficulty.speed(),
        };
        control.publish_score(state.counter);
        observer.on_display(&display_event);
        debug!(counter = display_event.counter, code = %display_event.code, "Sequence started");

        // --- Emit one spawn per landed symbol at the fixed cadence ---
        let mut symbol_index: u32 = 0;
        let mut stopped = false;
        for symbol in code.symbols() {
            let table = match symbol {
                Symbol::Dot => &dot_table,
                Symbol::Dash => &dash_table,
            };
            if let Some(candidate) = table.select(&mut state.rng) {
                observer.on_spawn(&SpawnEvent {
                    sequence: display_event.counter,
                    symbol_index,
                    symbol,
                    candidate: candidate.clone(),
                    offset: config.emitter.position_offset,
                });
            }
            if suspend(control, symbol_interval).await {
                stopped = true;
                break;
            }
            symbol_index = symbol_index.saturating_add(1);
        }
        if stopped {
            break SequenceEndReason::StopRequested;
        }

        // --- Rest before the next sequence ---
        let gap = sample_gap(&mut state.rng, &config.timing);
        if suspend(control, gap).await {
            break SequenceEndReason::StopRequested;
        }

        // --- Advance the counter ---
        match state.counter.checked_add(1) {
            Some(next) => state.counter = next,
            None => break SequenceEndReason::CounterOverflow,
        }
        sequences_completed = sequences_completed.saturating_add(1);
        if control.sequence_limit_reached(sequences_completed) {
            break SequenceEndReason::MaxSequencesReached;
        }
    };

    SequencerResult {
        end_reason,
        sequences_completed,
        final_counter: state.counter,
    }
}

/// Sleep cooperatively, returning `true` if a stop was requested.
///
/// A stop request wakes the sleep early; the caller must not emit the
/// step the suspension was pacing. Stale stop-notify permits from a
/// previous run are absorbed without shortening the sleep.
async fn suspend(control: &SequencerControl, duration: Duration) -> bool {
    if control.is_stop_requested() {
        return true;
    }
    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            () = &mut sleep => return control.is_stop_requested(),
            () = control.stop_notified() => {
                if control.is_stop_requested() {
                    return true;
                }
            }
        }
    }
}

/// Draw the inter-sequence gap uniformly from the configured bounds.
fn sample_gap(rng: &mut StdRng, timing: &TimingConfig) -> Duration {
    let secs = if timing.max_gap_secs > timing.min_gap_secs {
        rng.random_range(timing.min_gap_secs..=timing.max_gap_secs)
    } else {
        timing.min_gap_secs
    };
    duration_secs(secs)
}

/// Convert a seconds value to a [`Duration`], treating anything
/// non-finite or negative as zero. Config validation rejects such values
/// up front; this keeps hand-built configs from panicking the loop.
fn duration_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
}

/// Log the run end sequence.
///
/// This should be called after [`run_sequencer`] returns to record the
/// outcome; the control's score mirror remains readable afterwards.
pub fn log_run_end(result: &SequencerResult) {
    info!(
        end_reason = ?result.end_reason,
        sequences_completed = result.sequences_completed,
        final_counter = result.final_counter,
        "Sequencer run ended"
    );
}
