//! Shared control plane for runtime sequencer management.
//!
//! This module provides the shared state used by the sequencer loop and
//! whatever host surface drives it. The host can pause/resume, request a
//! clean stop, and read the current score -- all without touching the
//! loop's own state.
//!
//! # Architecture
//!
//! All mutable control fields use [`std::sync::atomic`] types so they can
//! be shared between the loop task and host tasks without locks on the hot
//! path. Stop requests additionally ring a [`Notify`] so an in-flight
//! suspension wakes instead of sleeping out a multi-second gap.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, Notify};

use crate::config::RunBoundsConfig;

/// Errors raised by invalid sequencer state transitions.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SequencerError {
    /// A run was started while another run holds this control.
    #[error("sequencer is already running")]
    AlreadyRunning,

    /// A stop was requested while no run was active.
    #[error("sequencer is not running")]
    NotRunning,
}

/// Reason why a sequencer run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequenceEndReason {
    /// The host requested a stop.
    StopRequested,
    /// Reached the configured `max_sequences` limit.
    MaxSequencesReached,
    /// Reached the configured `max_real_time_seconds` limit.
    MaxRealTimeReached,
    /// The difficulty source reported game over.
    GameOver,
    /// The counter reached `u64::MAX` and cannot advance.
    CounterOverflow,
}

/// Shared sequencer control state.
///
/// Wrapped in an `Arc` and shared between the run loop and the host.
/// Atomic fields are used for lock-free reads on the loop hot path.
#[derive(Debug)]
pub struct SequencerControl {
    /// Whether a run loop currently holds this control.
    running: AtomicBool,

    /// Whether the run is currently paused.
    paused: AtomicBool,

    /// Notification used to wake the loop when resumed.
    resume_notify: Notify,

    /// Whether a stop has been requested.
    stop_requested: AtomicBool,

    /// Notification used to wake an in-flight suspension on stop.
    stop_notify: Notify,

    /// Score mirror: the counter value as of the most recent display event.
    score: AtomicU64,

    /// Wall-clock time when the control was created.
    started_at: DateTime<Utc>,

    /// Maximum number of completed sequences (0 = unlimited).
    max_sequences: u64,

    /// Maximum wall-clock seconds (0 = unlimited).
    max_real_time_seconds: u64,

    /// Reason the run ended, if it has.
    end_reason: Mutex<Option<SequenceEndReason>>,
}

impl SequencerControl {
    /// Create a new control from run bounds.
    pub fn new(bounds: &RunBoundsConfig) -> Self {
        Self {
            running: AtomicBool::new(false),
            paused: AtomicBool::new(false),
            resume_notify: Notify::new(),
            stop_requested: AtomicBool::new(false),
            stop_notify: Notify::new(),
            score: AtomicU64::new(0),
            started_at: Utc::now(),
            max_sequences: bounds.max_sequences,
            max_real_time_seconds: bounds.max_real_time_seconds,
            end_reason: Mutex::new(None),
        }
    }

    // -----------------------------------------------------------------------
    // Run ownership
    // -----------------------------------------------------------------------

    /// Acquire the running flag for a new run.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::AlreadyRunning`] if another run already
    /// holds this control.
    pub fn begin_run(&self) -> Result<(), SequencerError> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_already| SequencerError::AlreadyRunning)?;
        Ok(())
    }

    /// Release the running flag and clear any pending stop request, so the
    /// control can host a fresh run.
    pub fn end_run(&self) {
        self.stop_requested.store(false, Ordering::Release);
        self.running.store(false, Ordering::Release);
    }

    /// Check whether a run currently holds this control.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    // -----------------------------------------------------------------------
    // Pause / Resume
    // -----------------------------------------------------------------------

    /// Check whether the run is paused.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Pause the run. The loop will hold before its next sequence.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
    }

    /// Resume the run and wake the loop.
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        self.resume_notify.notify_one();
    }

    /// Wait until the run is no longer paused.
    ///
    /// Returns immediately if not paused, and also returns when a stop is
    /// requested so a paused run can still be shut down.
    pub async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::Acquire) {
            if self.stop_requested.load(Ordering::Acquire) {
                return;
            }
            tokio::select! {
                () = self.resume_notify.notified() => {}
                () = self.stop_notify.notified() => {}
            }
        }
    }

    // -----------------------------------------------------------------------
    // Stop
    // -----------------------------------------------------------------------

    /// Request a clean stop of the active run.
    ///
    /// Takes effect at the loop's next suspension point: the pending
    /// symbol is abandoned without spawning and the counter keeps its
    /// value.
    ///
    /// # Errors
    ///
    /// Returns [`SequencerError::NotRunning`] if no run holds this
    /// control.
    pub fn request_stop(&self) -> Result<(), SequencerError> {
        if !self.is_running() {
            return Err(SequencerError::NotRunning);
        }
        self.stop_requested.store(true, Ordering::Release);
        self.stop_notify.notify_one();
        Ok(())
    }

    /// Check whether a stop has been requested.
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Wait until a stop request rings the stop notifier.
    pub async fn stop_notified(&self) {
        self.stop_notify.notified().await;
    }

    /// Record the reason the run ended.
    pub async fn set_end_reason(&self, reason: SequenceEndReason) {
        let mut guard = self.end_reason.lock().await;
        *guard = Some(reason);
    }

    /// Get the reason the run ended, if it has.
    pub async fn end_reason(&self) -> Option<SequenceEndReason> {
        self.end_reason.lock().await.clone()
    }

    // -----------------------------------------------------------------------
    // Score mirror
    // -----------------------------------------------------------------------

    /// Counter value as of the most recent display event.
    pub fn score(&self) -> u64 {
        self.score.load(Ordering::Acquire)
    }

    /// Publish a new score value. Called by the loop (and by score resets)
    /// whenever a display event is emitted; hosts only ever read.
    pub fn publish_score(&self, value: u64) {
        self.score.store(value, Ordering::Release);
    }

    // -----------------------------------------------------------------------
    // Boundaries
    // -----------------------------------------------------------------------

    /// Check whether the sequence limit has been reached.
    ///
    /// Returns `true` if `max_sequences > 0` and `completed >= max_sequences`.
    pub const fn sequence_limit_reached(&self, completed: u64) -> bool {
        self.max_sequences > 0 && completed >= self.max_sequences
    }

    /// Check whether the wall-clock time limit has been reached.
    pub fn time_limit_reached(&self) -> bool {
        if self.max_real_time_seconds == 0 {
            return false;
        }
        self.elapsed_seconds() >= self.max_real_time_seconds
    }

    /// Return the wall-clock creation time.
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Return elapsed seconds since the control was created.
    pub fn elapsed_seconds(&self) -> u64 {
        let elapsed = Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds();
        // `num_seconds` can be negative if clocks are weird; treat as 0.
        u64::try_from(elapsed.max(0)).unwrap_or(u64::MAX)
    }

    /// Get the configured max sequences.
    pub const fn max_sequences(&self) -> u64 {
        self.max_sequences
    }

    /// Get the configured max real-time seconds.
    pub const fn max_real_time_seconds(&self) -> u64 {
        self.max_real_time_seconds
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn unbounded() -> RunBoundsConfig {
        RunBoundsConfig::default()
    }

    #[test]
    fn initial_state_is_idle() {
        let control = SequencerControl::new(&unbounded());
        assert!(!control.is_running());
        assert!(!control.is_paused());
        assert!(!control.is_stop_requested());
        assert_eq!(control.score(), 0);
    }

    #[test]
    fn begin_run_is_exclusive() {
        let control = SequencerControl::new(&unbounded());
        assert!(control.begin_run().is_ok());
        assert_eq!(control.begin_run(), Err(SequencerError::AlreadyRunning));
        control.end_run();
        assert!(control.begin_run().is_ok());
    }

    #[test]
    fn stop_from_idle_is_an_error() {
        let control = SequencerControl::new(&unbounded());
        assert_eq!(control.request_stop(), Err(SequencerError::NotRunning));
    }

    #[test]
    fn stop_request_sets_and_clears_with_the_run() {
        let control = SequencerControl::new(&unbounded());
        control.begin_run().unwrap();
        control.request_stop().unwrap();
        assert!(control.is_stop_requested());
        control.end_run();
        // A fresh run must not inherit the old stop request.
        assert!(!control.is_stop_requested());
    }

    #[test]
    fn pause_and_resume() {
        let control = SequencerControl::new(&unbounded());
        control.pause();
        assert!(control.is_paused());
        control.resume();
        assert!(!control.is_paused());
    }

    #[test]
    fn score_mirror_publishes() {
        let control = SequencerControl::new(&unbounded());
        control.publish_score(12);
        assert_eq!(control.score(), 12);
    }

    #[test]
    fn sequence_limit_zero_means_unlimited() {
        let control = SequencerControl::new(&unbounded());
        assert!(!control.sequence_limit_reached(999_999));
    }

    #[test]
    fn sequence_limit_reached() {
        let bounds = RunBoundsConfig {
            max_sequences: 3,
            max_real_time_seconds: 0,
        };
        let control = SequencerControl::new(&bounds);
        assert!(!control.sequence_limit_reached(2));
        assert!(control.sequence_limit_reached(3));
        assert!(control.sequence_limit_reached(4));
    }

    #[test]
    fn time_limit_zero_means_unlimited() {
        let control = SequencerControl::new(&unbounded());
        assert!(!control.time_limit_reached());
    }

    #[tokio::test]
    async fn end_reason_roundtrips() {
        let control = SequencerControl::new(&unbounded());
        assert!(control.end_reason().await.is_none());
        control
            .set_end_reason(SequenceEndReason::StopRequested)
            .await;
        assert_eq!(
            control.end_reason().await,
            Some(SequenceEndReason::StopRequested)
        );
    }

    #[tokio::test]
    async fn paused_wait_releases_on_stop_request() {
        let control = SequencerControl::new(&unbounded());
        control.begin_run().unwrap();
        control.pause();
        control.request_stop().unwrap();
        // Must return instead of hanging until resume.
        control.wait_if_paused().await;
        assert!(control.is_stop_requested());
    }
}
