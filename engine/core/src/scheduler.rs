//! Lip-Sync Scheduling
//!
//! Owns the lifecycle of the one active dialogue message. Arrival arms a
//! teardown deadline computed from a per-character duration estimate —
//! the fallback clock used when no authoritative audio timing exists.
//! An audio "ended" event can pre-empt the deadline; whichever path
//! fires first wins, and the loser is a guaranteed no-op.
//!
//! Deadlines are expressed against the engine's accumulated frame clock
//! and polled on the render tick, never as OS timers, so completion
//! races are deterministic and cancellation is just dropping state.

use std::time::Duration;

use tracing::debug;

use crate::events::{AudioPlaybackEvent, AudioPlaybackStatus};
use crate::messages::MessageId;

/// Where the playback clock authority currently comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackMode {
    /// Running on the text-length duration estimate.
    Estimated,
    /// Real audio playback events have been observed for this message.
    AudioCorrelated,
    /// Terminal: presentation finished (by either path).
    Ended,
}

/// Scheduling state for the active message.
#[derive(Clone, Debug)]
pub struct PlaybackState {
    /// The message being presented.
    pub message_id: MessageId,
    /// Current clock authority.
    pub mode: PlaybackMode,
    /// Engine-clock instant the message was armed.
    pub armed_at: Duration,
    /// Engine-clock instant the estimate deadline fires.
    pub deadline: Duration,
    /// Complete-once guard; set by the first completion path to fire.
    pub completed: bool,
    /// Last playback position reported by the audio channel, seconds.
    /// Diagnostic only; it does not drive blend weights.
    pub last_audio_time: Option<f32>,
}

/// Schedules teardown for the active dialogue message.
#[derive(Debug)]
pub struct LipSyncScheduler {
    active: Option<PlaybackState>,
    per_char: Duration,
    fallback: Duration,
}

impl LipSyncScheduler {
    /// Create a scheduler from the estimate constants.
    #[must_use]
    pub fn new(per_char: Duration, fallback: Duration) -> Self {
        Self {
            active: None,
            per_char,
            fallback,
        }
    }

    /// Duration estimate for a message text.
    ///
    /// Empty text gets the fixed fallback duration; otherwise one
    /// per-character unit per character, at least one.
    #[must_use]
    pub fn estimate(&self, text: &str) -> Duration {
        if text.is_empty() {
            self.fallback
        } else {
            let chars = text.chars().count().max(1) as u32;
            self.per_char * chars
        }
    }

    /// Arm scheduling for a new message at engine-clock instant `now`.
    ///
    /// Unconditionally replaces any previous message: its deadline is
    /// cancelled and its completion will never be reported.
    pub fn begin(&mut self, message_id: MessageId, text: &str, now: Duration) -> Duration {
        if let Some(previous) = self.active.take() {
            debug!(superseded = %previous.message_id, completed = previous.completed, "superseding active message");
        }

        let estimate = self.estimate(text);
        self.active = Some(PlaybackState {
            message_id,
            mode: PlaybackMode::Estimated,
            armed_at: now,
            deadline: now + estimate,
            completed: false,
            last_audio_time: None,
        });
        estimate
    }

    /// Poll the estimate deadline; the timer completion path.
    ///
    /// Returns the finished message id the first time the deadline has
    /// passed, and `None` ever after.
    pub fn poll_deadline(&mut self, now: Duration) -> Option<MessageId> {
        let state = self.active.as_mut()?;
        if state.completed || now < state.deadline {
            return None;
        }
        state.completed = true;
        state.mode = PlaybackMode::Ended;
        Some(state.message_id.clone())
    }

    /// Feed one audio playback event; the audio completion path.
    ///
    /// Events for any id other than the active message are ignored
    /// (stale echoes are expected under at-least-once delivery plus
    /// supersession). Returns the finished message id when an "ended"
    /// event completes the message first.
    pub fn audio_event(&mut self, event: &AudioPlaybackEvent) -> Option<MessageId> {
        let Some(state) = self.active.as_mut() else {
            debug!(message_id = %event.message_id, "audio event with no active message, ignored");
            return None;
        };
        if state.message_id != event.message_id {
            debug!(message_id = %event.message_id, active = %state.message_id, "stale audio event ignored");
            return None;
        }

        match event.status {
            AudioPlaybackStatus::Playing => {
                state.last_audio_time = Some(event.current_time);
                if !state.completed {
                    state.mode = PlaybackMode::AudioCorrelated;
                }
                None
            }
            AudioPlaybackStatus::Ended => {
                if state.completed {
                    return None;
                }
                state.completed = true;
                state.mode = PlaybackMode::Ended;
                Some(state.message_id.clone())
            }
        }
    }

    /// Whether a message is currently being presented.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.active.as_ref().is_some_and(|state| !state.completed)
    }

    /// Id of the active message, finished or not.
    #[must_use]
    pub fn active_id(&self) -> Option<&MessageId> {
        self.active.as_ref().map(|state| &state.message_id)
    }

    /// Time since the active message was armed.
    #[must_use]
    pub fn elapsed(&self, now: Duration) -> Option<Duration> {
        self.active
            .as_ref()
            .map(|state| now.saturating_sub(state.armed_at))
    }

    /// Scheduling state of the active message, for diagnostics.
    #[must_use]
    pub fn state(&self) -> Option<&PlaybackState> {
        self.active.as_ref()
    }

    /// Drop all scheduling state (engine shutdown).
    pub fn clear(&mut self) {
        self.active = None;
    }
}
