//! Body Animation Crossfade
//!
//! A small state machine over the asset's named clips: Idle until the
//! first request, then always Playing exactly one clip. Switching clips
//! fades the old one out and the new one in over a fixed duration on the
//! shared mixer; the avatar is never left without a pose, because unknown
//! keys fall back to an arbitrary available clip.

use std::time::Duration;

use tracing::{debug, warn};

use crate::scene::AvatarScene;

/// An in-flight crossfade between two clips.
#[derive(Clone, Debug)]
struct Crossfade {
    from: Option<String>,
    to: String,
    elapsed: Duration,
}

/// Crossfades named body-animation clips.
#[derive(Debug)]
pub struct ClipController {
    active: Option<String>,
    fade: Option<Crossfade>,
    fade_duration: Duration,
}

impl ClipController {
    /// Create a controller with the given crossfade duration.
    #[must_use]
    pub fn new(fade_duration: Duration) -> Self {
        Self {
            active: None,
            fade: None,
            fade_duration,
        }
    }

    /// The clip currently playing or fading in, if any.
    #[must_use]
    pub fn active_clip(&self) -> Option<&str> {
        self.fade
            .as_ref()
            .map(|fade| fade.to.as_str())
            .or_else(|| self.active.as_deref())
    }

    /// Whether a crossfade is in flight.
    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Request a clip by key.
    ///
    /// Unknown keys fall back to the first available clip (logged at
    /// warn, never fatal). Requesting the clip that is already active or
    /// fading in is a no-op. With no clips at all the request is dropped.
    pub fn request(&mut self, scene: &mut dyn AvatarScene, key: &str) {
        let resolved = if scene.has_clip(key) {
            key.to_string()
        } else {
            let Some(fallback) = scene.clip_names().into_iter().next() else {
                debug!(key, "no animation clips available, request dropped");
                return;
            };
            warn!(key, %fallback, "unknown animation clip, falling back");
            fallback
        };

        if self.active_clip() == Some(resolved.as_str()) {
            return;
        }

        // Interrupting a fade snaps its outgoing clip off before the new
        // handoff starts from whatever was winning.
        let from = if let Some(fade) = self.fade.take() {
            if let Some(old_from) = &fade.from {
                scene.set_clip_weight(old_from, 0.0);
            }
            Some(fade.to)
        } else {
            self.active.take()
        };

        scene.reset_clip(&resolved);
        scene.set_clip_weight(&resolved, 0.0);
        debug!(clip = %resolved, from = ?from, "starting clip crossfade");
        self.fade = Some(Crossfade {
            from,
            to: resolved,
            elapsed: Duration::ZERO,
        });
    }

    /// Advance an in-flight crossfade by one tick.
    pub fn advance(&mut self, scene: &mut dyn AvatarScene, delta: Duration) {
        let Some(fade) = &mut self.fade else {
            return;
        };

        fade.elapsed += delta;
        let progress = if self.fade_duration.is_zero() {
            1.0
        } else {
            (fade.elapsed.as_secs_f32() / self.fade_duration.as_secs_f32()).min(1.0)
        };

        if let Some(from) = &fade.from {
            scene.set_clip_weight(from, 1.0 - progress);
        }
        scene.set_clip_weight(&fade.to, progress);

        if progress >= 1.0 {
            if let Some(finished) = self.fade.take() {
                self.active = Some(finished.to);
            }
        }
    }
}
