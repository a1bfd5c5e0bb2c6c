//! Facesync Core - Viseme-Driven Facial Animation and Lip-Sync
//!
//! This crate drives a 3D avatar's face in sync with dialogue, completely
//! independent of any rendering framework. The hosting application owns
//! the scene graph and the render loop; the engine owns everything about
//! what the face should be doing on each tick.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     Hosting Application                           │
//! │   asset loading · rendering · chat UI · speech synthesis          │
//! │                                                                   │
//! │   DialogueMessage (down)        AudioPlaybackEvent (down)         │
//! │   EngineEvent (up)              AvatarScene (shared seam)         │
//! └───────────┬──────────────────────────┬───────────────────────────┘
//!             │                          │
//! ┌───────────┼──────────────────────────┼───────────────────────────┐
//! │           │        FACESYNC CORE     │                            │
//! │  ┌────────┴──────────────────────────┴─────────────────────────┐ │
//! │  │                        FaceEngine                            │ │
//! │  │  ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌───────────────┐  │ │
//! │  │  │ Viseme   │ │ Lip-Sync │ │Expression │ │     Clip      │  │ │
//! │  │  │ Resolver │ │Scheduler │ │ Blender   │ │  Controller   │  │ │
//! │  │  └──────────┘ └──────────┘ └───────────┘ └───────────────┘  │ │
//! │  │                     ┌────────────┐                           │ │
//! │  │                     │ BlendState │  (sole influence writer)  │ │
//! │  │                     └────────────┘                           │ │
//! │  └─────────────────────────────────────────────────────────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`FaceEngine`]: the per-tick orchestrator; drive it from the render loop
//! - [`AvatarScene`]: the seam to the hosting application's loaded asset
//! - [`DialogueMessage`]: one line of dialogue to present
//! - [`AudioEventBus`]: injected channel for real audio playback timing
//! - [`EngineEvent`]: lifecycle messages back to the surface
//! - [`EngineConfig`]: every tunable, with TOML file support
//!
//! # Quick Start
//!
//! ```ignore
//! use facesync_core::{
//!     AudioEventBus, DialogueMessage, EngineConfig, FaceEngine, MessageId,
//! };
//! use tokio::sync::mpsc;
//!
//! let (audio_bus, audio_bridge) = AudioEventBus::channel();
//! let (event_tx, mut event_rx) = mpsc::unbounded_channel();
//! let mut engine = FaceEngine::new(EngineConfig::default(), audio_bridge, event_tx);
//!
//! engine.handle_message(DialogueMessage {
//!     id: MessageId::new(),
//!     text: "Good morning, doctor.".to_string(),
//!     animation_key: Some("sitting".to_string()),
//!     expression_key: Some("smile".to_string()),
//!     lipsync: None,
//! });
//!
//! // In the render loop:
//! //   engine.update(&mut scene, frame_delta);
//! //   while let Ok(event) = event_rx.try_recv() { /* react */ }
//! ```
//!
//! # Module Overview
//!
//! - [`audio`]: injected audio playback bus (bridge drained on the tick)
//! - [`blend`]: shared blend state, the sole writer of influence values
//! - [`clips`]: body-animation crossfade state machine
//! - [`config`]: engine tunables and TOML configuration loading
//! - [`engine`]: the [`FaceEngine`] frame loop
//! - [`events`]: inbound dialogue messages and audio playback events
//! - [`expression`]: facial expression presets and blending
//! - [`messages`]: outbound engine events and message ids
//! - [`registry`]: morph-target discovery
//! - [`scene`]: the [`AvatarScene`] trait and an in-process fixture
//! - [`scheduler`]: estimate deadlines and the complete-once guard
//! - [`viseme`]: the phoneme alphabet and viseme-map resolution
//!
//! # Concurrency Model
//!
//! Single-threaded and cooperative. Nothing here spawns threads, sleeps,
//! or locks; timers are deadlines against the accumulated frame clock,
//! and channel callbacks are buffered events drained on the render tick.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod audio;
pub mod blend;
pub mod clips;
pub mod config;
pub mod engine;
pub mod events;
pub mod expression;
pub mod messages;
pub mod registry;
pub mod scene;
pub mod scheduler;
pub mod viseme;

// Re-exports for convenience
pub use audio::{AudioBridge, AudioEventBus};
pub use blend::BlendState;
pub use clips::ClipController;
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, EngineConfig, EngineToml,
};
pub use engine::FaceEngine;
pub use events::{AudioPlaybackEvent, AudioPlaybackStatus, DialogueMessage};
pub use expression::{preset, ExpressionBlender, DEFAULT_EXPRESSION, PRESET_NAMES};
pub use messages::{EngineEvent, MessageId};
pub use registry::{discover, MorphInventory, MorphLocation};
pub use scene::{AvatarScene, FixtureScene};
pub use scheduler::{LipSyncScheduler, PlaybackMode, PlaybackState};
pub use viseme::{
    is_mouth_related, resolve_map, LipSyncTrack, MapStrategy, MouthCue, PhonemeCode, VisemeMap,
    VisemeResolver,
};
