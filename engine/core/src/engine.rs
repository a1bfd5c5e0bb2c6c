//! Face Engine
//!
//! The per-tick orchestrator. Owns every animation component and the
//! shared blend state, and is driven by the hosting render loop:
//!
//! 1. A [`DialogueMessage`] arrives: the scheduler arms its estimate
//!    deadline, the expression preset switches, a clip request is queued.
//! 2. Each render tick, [`FaceEngine::update`] drains the audio bridge,
//!    polls the deadline, advances the clip crossfade, stages expression
//!    and viseme targets, and lets the blend state write the scene.
//! 3. Exactly one [`EngineEvent::PlaybackCompleted`] goes out per
//!    message, whichever completion path fires first.
//!
//! Everything is single-threaded and cooperative. Timers are deadlines
//! against the accumulated frame clock; audio callbacks are buffered
//! events drained on the same loop. Superseding a message, shutting the
//! engine down, or a winning audio event all cancel any other pending
//! teardown path by construction.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::audio::AudioBridge;
use crate::blend::BlendState;
use crate::clips::ClipController;
use crate::config::EngineConfig;
use crate::events::DialogueMessage;
use crate::expression::{ExpressionBlender, DEFAULT_EXPRESSION};
use crate::messages::{EngineEvent, MessageId};
use crate::registry::{discover, MorphInventory};
use crate::scene::AvatarScene;
use crate::scheduler::{LipSyncScheduler, PlaybackState};
use crate::viseme::{is_mouth_related, VisemeMap, VisemeResolver};

/// Discovery and resolution results for the current asset.
#[derive(Debug)]
struct ResolvedAsset {
    asset_id: String,
    inventory: MorphInventory,
    map: VisemeMap,
}

/// The facial animation and lip-sync engine.
pub struct FaceEngine {
    config: EngineConfig,
    resolver: VisemeResolver,
    resolved: Option<ResolvedAsset>,
    clips: ClipController,
    expression: ExpressionBlender,
    scheduler: LipSyncScheduler,
    bridge: AudioBridge,
    blend: BlendState,
    clock: Duration,
    active_message: Option<DialogueMessage>,
    pending_clip: Option<String>,
    events: mpsc::UnboundedSender<EngineEvent>,
}

impl FaceEngine {
    /// Create an engine.
    ///
    /// `bridge` is the receiving half of the injected audio playback
    /// channel; `events` carries lifecycle messages back to the surface.
    #[must_use]
    pub fn new(
        config: EngineConfig,
        bridge: AudioBridge,
        events: mpsc::UnboundedSender<EngineEvent>,
    ) -> Self {
        let resolver = VisemeResolver::new(config.viseme_match_threshold);
        let clips = ClipController::new(config.crossfade_duration());
        let expression = ExpressionBlender::new(config.expression_smoothing);
        let scheduler =
            LipSyncScheduler::new(config.per_char_duration(), config.fallback_duration());

        Self {
            config,
            resolver,
            resolved: None,
            clips,
            expression,
            scheduler,
            bridge,
            blend: BlendState::new(),
            clock: Duration::ZERO,
            active_message: None,
            pending_clip: None,
            events,
        }
    }

    /// Accept a new dialogue message.
    ///
    /// At most one message is active: any previous message is superseded
    /// — its deadline cancelled, its completion never reported.
    pub fn handle_message(&mut self, message: DialogueMessage) {
        info!(id = %message.id, chars = message.text.chars().count(), "dialogue message accepted");

        let estimate = self
            .scheduler
            .begin(message.id.clone(), &message.text, self.clock);
        debug!(id = %message.id, estimate_ms = estimate.as_millis() as u64, "estimate deadline armed");

        self.expression.set_expression(
            message
                .expression_key
                .as_deref()
                .unwrap_or(DEFAULT_EXPRESSION),
        );
        self.pending_clip = message.animation_key.clone();

        // Mouth controls the previous message drove head back to rest;
        // the new track re-stages them from the next tick on.
        self.release_mouth();

        let _ = self.events.send(EngineEvent::PlaybackStarted {
            message_id: message.id.clone(),
        });
        self.active_message = Some(message);
    }

    /// Run one render tick.
    ///
    /// Degrades gracefully while assets are still streaming: on a scene
    /// with no morphs, or an all-null viseme map, mouth animation is
    /// silently absent rather than an error.
    pub fn update(&mut self, scene: &mut dyn AvatarScene, delta: Duration) {
        self.clock += delta;
        self.ensure_resolved(&*scene);

        // Audio completion path.
        for event in self.bridge.drain() {
            if let Some(id) = self.scheduler.audio_event(&event) {
                self.finish(id);
            }
        }

        // Estimate (timer) completion path; a no-op if audio won above.
        if let Some(id) = self.scheduler.poll_deadline(self.clock) {
            self.finish(id);
        }

        if let Some(key) = self.pending_clip.take() {
            self.clips.request(scene, &key);
        }
        self.clips.advance(scene, delta);

        if let Some(resolved) = &self.resolved {
            self.expression
                .stage(&resolved.inventory, &*scene, &mut self.blend);

            if self.scheduler.is_animating() && !resolved.map.is_silent() {
                if let Some(track) = self.active_message.as_ref().and_then(|m| m.lipsync.as_ref())
                {
                    let elapsed = self
                        .scheduler
                        .elapsed(self.clock)
                        .unwrap_or(Duration::ZERO)
                        .as_secs_f32();
                    let bound = resolved.map.target(track.code_at(elapsed));

                    for name in resolved.inventory.names() {
                        if !is_mouth_related(name) {
                            continue;
                        }
                        let (target, rate) = if bound == Some(name.as_str()) {
                            (1.0, self.config.viseme_smoothing)
                        } else {
                            (0.0, self.config.mouth_release_smoothing)
                        };
                        for location in resolved.inventory.locations(name) {
                            let seed = scene.influence(location.mesh, location.index);
                            self.blend
                                .stage(location.mesh, location.index, seed, target, rate);
                        }
                    }
                }
            }
        }

        // The one place live influences are written.
        self.blend.advance(scene);
    }

    /// Tear the engine down.
    ///
    /// Cancels any pending deadline, resets the expression to neutral
    /// and releases driven mouth controls. No completion is reported for
    /// a message cut off by shutdown.
    pub fn shutdown(&mut self) {
        info!("engine shutdown, cancelling pending playback");
        self.scheduler.clear();
        self.expression.set_expression(DEFAULT_EXPRESSION);
        self.release_mouth();
        self.active_message = None;
        self.pending_clip = None;
    }

    /// Accumulated engine clock.
    #[must_use]
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Whether a message is currently being presented.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.scheduler.is_animating()
    }

    /// Id of the active message, if one is being presented.
    #[must_use]
    pub fn active_message_id(&self) -> Option<&MessageId> {
        self.scheduler.active_id()
    }

    /// The resolved viseme map, once the scene has been seen.
    #[must_use]
    pub fn viseme_map(&self) -> Option<&VisemeMap> {
        self.resolved.as_ref().map(|r| &r.map)
    }

    /// The discovered morph inventory, once the scene has been seen.
    #[must_use]
    pub fn morph_inventory(&self) -> Option<&MorphInventory> {
        self.resolved.as_ref().map(|r| &r.inventory)
    }

    /// Scheduling state of the active message, for diagnostics.
    #[must_use]
    pub fn playback_state(&self) -> Option<&PlaybackState> {
        self.scheduler.state()
    }

    /// Name of the active expression preset.
    #[must_use]
    pub fn active_expression(&self) -> &str {
        self.expression.active()
    }

    /// Clip currently playing or fading in.
    #[must_use]
    pub fn active_clip(&self) -> Option<&str> {
        self.clips.active_clip()
    }

    fn ensure_resolved(&mut self, scene: &dyn AvatarScene) {
        let asset_id = scene.asset_id();
        if self
            .resolved
            .as_ref()
            .is_some_and(|resolved| resolved.asset_id == asset_id)
        {
            return;
        }

        let inventory = discover(scene);
        let map = self.resolver.resolve(asset_id, &inventory).clone();
        info!(
            asset = asset_id,
            morphs = inventory.len(),
            strategy = ?map.strategy(),
            silent = map.is_silent(),
            "viseme map resolved"
        );

        // A new asset invalidates every staged channel.
        self.blend.clear();
        self.resolved = Some(ResolvedAsset {
            asset_id: asset_id.to_string(),
            inventory,
            map,
        });
    }

    fn finish(&mut self, message_id: MessageId) {
        info!(id = %message_id, "presentation finished");
        self.expression.set_expression(DEFAULT_EXPRESSION);
        self.release_mouth();
        self.active_message = None;
        let _ = self
            .events
            .send(EngineEvent::PlaybackCompleted { message_id });
    }

    /// Stage every mouth control this engine previously drove back to 0.
    ///
    /// Only existing channels are touched: controls nobody drove keep
    /// their loader defaults.
    fn release_mouth(&mut self) {
        let Some(resolved) = &self.resolved else {
            return;
        };
        for name in resolved.inventory.names() {
            if !is_mouth_related(name) {
                continue;
            }
            for location in resolved.inventory.locations(name) {
                self.blend.retarget(
                    location.mesh,
                    location.index,
                    0.0,
                    self.config.mouth_release_smoothing,
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioEventBus;
    use crate::scene::FixtureScene;
    use crate::viseme::MapStrategy;

    const TICK: Duration = Duration::from_millis(16);

    fn engine() -> (FaceEngine, AudioEventBus, mpsc::UnboundedReceiver<EngineEvent>) {
        let (bus, bridge) = AudioEventBus::channel();
        let (tx, rx) = mpsc::unbounded_channel();
        (FaceEngine::new(EngineConfig::default(), bridge, tx), bus, rx)
    }

    fn arkit_scene() -> FixtureScene {
        FixtureScene::new("patient-a")
            .with_mesh(
                "Head",
                &["viseme_aa", "viseme_kk", "viseme_ee", "viseme_oh", "eyeSquintLeft"],
            )
            .with_clips(&["idle", "talk"])
    }

    #[test]
    fn test_map_resolves_on_first_tick() {
        let (mut engine, _bus, _rx) = engine();
        let mut scene = arkit_scene();

        assert!(engine.viseme_map().is_none());
        engine.update(&mut scene, TICK);

        let map = engine.viseme_map().expect("map resolved");
        assert_eq!(map.strategy(), MapStrategy::ArKit);
    }

    #[test]
    fn test_asset_swap_invalidates_resolution() {
        let (mut engine, _bus, _rx) = engine();
        let mut first = arkit_scene();
        engine.update(&mut first, TICK);
        assert_eq!(engine.viseme_map().unwrap().strategy(), MapStrategy::ArKit);

        let mut second = FixtureScene::new("patient-b").with_mesh("Head", &["mouthOpen"]);
        engine.update(&mut second, TICK);
        assert_eq!(engine.viseme_map().unwrap().strategy(), MapStrategy::Custom);
    }

    #[test]
    fn test_expression_key_defaults_to_neutral() {
        let (mut engine, _bus, _rx) = engine();

        engine.handle_message(DialogueMessage {
            id: MessageId::new(),
            text: "hi".to_string(),
            ..DialogueMessage::default()
        });

        assert_eq!(engine.active_expression(), DEFAULT_EXPRESSION);
        assert!(engine.is_animating());
    }

    #[test]
    fn test_shutdown_cancels_pending_playback() {
        let (mut engine, _bus, mut rx) = engine();
        let mut scene = arkit_scene();

        engine.handle_message(DialogueMessage {
            id: MessageId::new(),
            text: "hello".to_string(),
            expression_key: Some("smile".to_string()),
            ..DialogueMessage::default()
        });
        engine.update(&mut scene, TICK);
        engine.shutdown();

        assert!(!engine.is_animating());
        assert_eq!(engine.active_expression(), DEFAULT_EXPRESSION);

        // Ticking far past the old deadline reports nothing.
        engine.update(&mut scene, Duration::from_secs(10));
        let mut completions = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, EngineEvent::PlaybackCompleted { .. }) {
                completions += 1;
            }
        }
        assert_eq!(completions, 0);
    }
}
