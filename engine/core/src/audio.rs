//! Audio Playback Bus
//!
//! The engine never touches audio hardware; whatever actually plays the
//! synthesized speech publishes [`AudioPlaybackEvent`]s on this bus. The
//! bus is injected into the engine at construction rather than living in
//! ambient global state, so tests can simulate event timing exactly.
//!
//! Events are buffered on an unbounded channel and drained cooperatively
//! on the render tick — deferred callbacks on the same loop, no
//! listener threads.

use tokio::sync::mpsc;

use crate::events::AudioPlaybackEvent;

/// Publishing half of the audio playback channel.
///
/// Cloneable; hand one to every audio player that should report
/// playback progress. Publishing never blocks.
#[derive(Clone, Debug)]
pub struct AudioEventBus {
    tx: mpsc::UnboundedSender<AudioPlaybackEvent>,
}

impl AudioEventBus {
    /// Create a connected bus/bridge pair.
    #[must_use]
    pub fn channel() -> (Self, AudioBridge) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, AudioBridge { rx })
    }

    /// Publish one playback event.
    ///
    /// Silently dropped if the engine (and its bridge) is gone; a
    /// publisher outliving the engine is not an error.
    pub fn publish(&self, event: AudioPlaybackEvent) {
        let _ = self.tx.send(event);
    }
}

/// Receiving half, owned by the engine.
#[derive(Debug)]
pub struct AudioBridge {
    rx: mpsc::UnboundedReceiver<AudioPlaybackEvent>,
}

impl AudioBridge {
    /// Drain every event published since the last tick.
    pub fn drain(&mut self) -> Vec<AudioPlaybackEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::AudioPlaybackStatus;
    use crate::messages::MessageId;

    fn event(status: AudioPlaybackStatus) -> AudioPlaybackEvent {
        AudioPlaybackEvent {
            message_id: MessageId("msg_1".to_string()),
            status,
            current_time: 0.0,
            duration: 1.0,
        }
    }

    #[test]
    fn test_events_buffer_until_drained() {
        let (bus, mut bridge) = AudioEventBus::channel();

        bus.publish(event(AudioPlaybackStatus::Playing));
        bus.publish(event(AudioPlaybackStatus::Ended));

        let drained = bridge.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[1].status, AudioPlaybackStatus::Ended);
        assert!(bridge.drain().is_empty());
    }

    #[test]
    fn test_publish_after_bridge_dropped_is_harmless() {
        let (bus, bridge) = AudioEventBus::channel();
        drop(bridge);

        bus.publish(event(AudioPlaybackStatus::Playing));
    }

    #[test]
    fn test_bus_clones_feed_the_same_bridge() {
        let (bus, mut bridge) = AudioEventBus::channel();
        let second = bus.clone();

        bus.publish(event(AudioPlaybackStatus::Playing));
        second.publish(event(AudioPlaybackStatus::Ended));

        assert_eq!(bridge.drain().len(), 2);
    }
}
