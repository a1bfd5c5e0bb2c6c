//! Inbound Events
//!
//! Everything the hosting application feeds the engine: dialogue
//! messages to present, and audio playback events from whatever is
//! actually playing the synthesized speech.

use serde::{Deserialize, Serialize};

use crate::messages::MessageId;
use crate::viseme::LipSyncTrack;

/// One line of dialogue to present on the avatar.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueMessage {
    /// Unique id; audio events correlate by this id.
    pub id: MessageId,

    /// The spoken text. Its length drives the fallback duration
    /// estimate when no authoritative audio timing arrives.
    pub text: String,

    /// Body-animation clip to crossfade to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_key: Option<String>,

    /// Facial expression preset while speaking (default: neutral).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression_key: Option<String>,

    /// Timed mouth-shape cues for the utterance, if the speech pipeline
    /// produced them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lipsync: Option<LipSyncTrack>,
}

/// Playback phase reported by the audio channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioPlaybackStatus {
    /// Audio for the message is currently playing.
    Playing,
    /// Audio for the message finished.
    Ended,
}

/// One event from the audio playback channel.
///
/// Delivery is at-least-once; consumers must be idempotent. Events whose
/// id does not match the active message are stale echoes and are
/// ignored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AudioPlaybackEvent {
    /// Which message's audio this event describes.
    #[serde(rename = "messageId")]
    pub message_id: MessageId,
    /// Playback phase.
    pub status: AudioPlaybackStatus,
    /// Playback position in seconds.
    #[serde(rename = "currentTime", default)]
    pub current_time: f32,
    /// Total audio duration in seconds, when known.
    #[serde(default)]
    pub duration: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialogue_message_parses_with_optional_fields_absent() {
        let json = r#"{"id":"msg_1","text":"Hello there"}"#;
        let message: DialogueMessage = serde_json::from_str(json).expect("message should parse");

        assert_eq!(message.id, MessageId("msg_1".to_string()));
        assert_eq!(message.animation_key, None);
        assert_eq!(message.lipsync, None);
    }

    #[test]
    fn test_audio_event_uses_channel_field_names() {
        let json = r#"{"messageId":"msg_3","status":"ended","currentTime":2.4,"duration":2.4}"#;
        let event: AudioPlaybackEvent = serde_json::from_str(json).expect("event should parse");

        assert_eq!(event.status, AudioPlaybackStatus::Ended);
        assert!((event.current_time - 2.4).abs() < f32::EPSILON);
    }
}
