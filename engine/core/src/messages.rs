//! Engine Messages
//!
//! Messages sent from the engine to the hosting surface. The engine owns
//! presentation lifecycle; the surface just reacts (enable the input box
//! again, advance the transcript, play the next queued line).

use serde::{Deserialize, Serialize};

/// Dialogue message identifier.
///
/// Produced by whatever created the message (chat backend, script
/// player); the engine only compares ids, it never interprets them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

impl MessageId {
    /// Generate a new unique message ID.
    #[must_use]
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("msg_{id}"))
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Messages from the engine to the hosting surface.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// A dialogue message was accepted and its presentation armed.
    PlaybackStarted {
        /// The message now being presented.
        message_id: MessageId,
    },

    /// Presentation of a message finished.
    ///
    /// Emitted exactly once per message id, whichever completion path
    /// (estimate deadline or audio "ended" event) fires first. Never
    /// emitted for messages superseded before finishing.
    PlaybackCompleted {
        /// The message that finished.
        message_id: MessageId,
    },
}
