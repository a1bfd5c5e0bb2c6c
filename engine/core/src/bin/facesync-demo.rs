//! Facesync Demo
//!
//! Headless demonstration of the facial animation engine against an
//! in-process fixture scene. Scripts two dialogue messages:
//!
//! 1. A greeting with a lip-sync track, finished early by a simulated
//!    audio "ended" event (the authoritative completion path).
//! 2. An empty-text message that runs out its fixed fallback estimate
//!    (the timer completion path).
//!
//! # Usage
//!
//! ```bash
//! facesync-demo
//!
//! # With verbose logging
//! RUST_LOG=debug facesync-demo
//! ```
//!
//! # Environment Variables
//!
//! - `FACESYNC_CONFIG`: path to an alternate engine configuration file
//! - `FACESYNC_VISEME_THRESHOLD`: overrides the table-selection threshold
//! - `RUST_LOG`: log level (trace, debug, info, warn, error)

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use facesync_core::{
    load_config, AudioEventBus, AudioPlaybackEvent, AudioPlaybackStatus, DialogueMessage,
    EngineEvent, FaceEngine, FixtureScene, LipSyncTrack, MessageId, MouthCue, PhonemeCode,
};

/// Frame period for the demo render loop (~60fps).
const FRAME: Duration = Duration::from_millis(16);

/// Safety cap so a scripting mistake cannot loop forever.
const MAX_TICKS: u32 = 1200;

fn demo_scene() -> FixtureScene {
    FixtureScene::new("demo-patient")
        .with_mesh(
            "Head",
            &[
                "viseme_aa",
                "viseme_kk",
                "viseme_ee",
                "viseme_oh",
                "viseme_sil",
                "eyeSquintLeft",
                "eyeSquintRight",
                "browInnerUp",
            ],
        )
        .with_mesh("Teeth", &["viseme_aa"])
        .with_clips(&["sitting", "talk"])
}

fn greeting() -> DialogueMessage {
    DialogueMessage {
        id: MessageId::new(),
        text: "Good morning, doctor. My chest has been hurting.".to_string(),
        animation_key: Some("talk".to_string()),
        expression_key: Some("distressed".to_string()),
        lipsync: Some(LipSyncTrack {
            mouth_cues: vec![
                MouthCue { start: 0.0, end: 0.4, value: PhonemeCode::A },
                MouthCue { start: 0.4, end: 0.8, value: PhonemeCode::E },
                MouthCue { start: 0.8, end: 1.2, value: PhonemeCode::B },
                MouthCue { start: 1.2, end: 1.6, value: PhonemeCode::A },
            ],
        }),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    info!(?config, "engine configuration loaded");

    let mut scene = demo_scene();
    let (audio_bus, audio_bridge) = AudioEventBus::channel();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let mut engine = FaceEngine::new(config, audio_bridge, event_tx);

    let first = greeting();
    let first_id = first.id.clone();
    engine.handle_message(first);

    let mut ticker = tokio::time::interval(FRAME);
    let mut completions = 0u32;

    for tick in 0..MAX_TICKS {
        ticker.tick().await;
        engine.update(&mut scene, FRAME);

        // Simulated audio player: progress reports, then an early finish
        // that pre-empts the text-length estimate.
        if tick == 30 {
            audio_bus.publish(AudioPlaybackEvent {
                message_id: first_id.clone(),
                status: AudioPlaybackStatus::Playing,
                current_time: 0.5,
                duration: 1.8,
            });
        }
        if tick == 110 {
            audio_bus.publish(AudioPlaybackEvent {
                message_id: first_id.clone(),
                status: AudioPlaybackStatus::Ended,
                current_time: 1.8,
                duration: 1.8,
            });
        }

        while let Ok(event) = event_rx.try_recv() {
            match event {
                EngineEvent::PlaybackStarted { message_id } => {
                    info!(%message_id, "playback started");
                }
                EngineEvent::PlaybackCompleted { message_id } => {
                    info!(%message_id, "playback completed");
                    completions += 1;
                    if completions == 1 {
                        // Second act: no text, no track; the fallback
                        // estimate is the only clock.
                        engine.handle_message(DialogueMessage {
                            id: MessageId::new(),
                            text: String::new(),
                            animation_key: Some("sitting".to_string()),
                            expression_key: Some("thinking".to_string()),
                            lipsync: None,
                        });
                    }
                }
            }
        }

        if completions >= 2 {
            break;
        }

        if tick % 60 == 0 {
            info!(
                clock_ms = engine.clock().as_millis() as u64,
                animating = engine.is_animating(),
                expression = engine.active_expression(),
                clip = engine.active_clip().unwrap_or("-"),
                mouth_aa = scene.influence_by_name(0, "viseme_aa").unwrap_or(0.0),
                "tick"
            );
        }
    }

    engine.shutdown();
    info!(
        completions,
        writes = scene.influence_writes(),
        "demo finished"
    );
    Ok(())
}
