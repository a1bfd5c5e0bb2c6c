//! Shared Blend State
//!
//! The one owner of live morph-influence writes. Components stage desired
//! target weights into per-slot channels; [`BlendState::advance`] then
//! steps every channel toward its target and writes the result into the
//! scene, once per render tick.
//!
//! Channels step by `(target - current) * rate` and clamp into [0, 1],
//! so weights approach their target monotonically and never overshoot.

use std::collections::HashMap;

use crate::scene::AvatarScene;

/// One staged morph channel.
#[derive(Clone, Copy, Debug)]
struct MorphChannel {
    current: f32,
    target: f32,
    rate: f32,
}

/// Staged target weights for every morph slot any component has driven.
///
/// Keyed by (mesh index, morph index). Slots never staged are never
/// written, leaving loader defaults untouched.
#[derive(Debug, Default)]
pub struct BlendState {
    channels: HashMap<(usize, usize), MorphChannel>,
}

impl BlendState {
    /// Create an empty blend state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a target weight for one slot.
    ///
    /// `seed` becomes the channel's starting weight the first time the
    /// slot is staged; existing channels only have their target and rate
    /// replaced.
    pub fn stage(&mut self, mesh: usize, index: usize, seed: f32, target: f32, rate: f32) {
        let target = target.clamp(0.0, 1.0);
        let channel = self
            .channels
            .entry((mesh, index))
            .or_insert_with(|| MorphChannel {
                current: seed.clamp(0.0, 1.0),
                target,
                rate,
            });
        channel.target = target;
        channel.rate = rate;
    }

    /// Re-target a slot only if it was previously staged.
    ///
    /// Used to release controls a component drove earlier without
    /// claiming slots that belong to nobody. Returns whether a channel
    /// existed.
    pub fn retarget(&mut self, mesh: usize, index: usize, target: f32, rate: f32) -> bool {
        match self.channels.get_mut(&(mesh, index)) {
            Some(channel) => {
                channel.target = target.clamp(0.0, 1.0);
                channel.rate = rate;
                true
            }
            None => false,
        }
    }

    /// Step every channel toward its target and write the scene.
    ///
    /// This is the sole caller of [`AvatarScene::set_influence`] in the
    /// engine.
    pub fn advance(&mut self, scene: &mut dyn AvatarScene) {
        for ((mesh, index), channel) in &mut self.channels {
            let step = (channel.target - channel.current) * channel.rate;
            channel.current = (channel.current + step).clamp(0.0, 1.0);
            scene.set_influence(*mesh, *index, channel.current);
        }
    }

    /// Current blended weight of a slot, if it has been staged.
    #[must_use]
    pub fn current(&self, mesh: usize, index: usize) -> Option<f32> {
        self.channels.get(&(mesh, index)).map(|c| c.current)
    }

    /// Staged target of a slot, if it has been staged.
    #[must_use]
    pub fn target(&self, mesh: usize, index: usize) -> Option<f32> {
        self.channels.get(&(mesh, index)).map(|c| c.target)
    }

    /// Number of staged channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// True when nothing has been staged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Drop every channel (used when the asset changes).
    pub fn clear(&mut self) {
        self.channels.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::FixtureScene;

    #[test]
    fn test_convergence_within_thirty_ticks() {
        let mut scene = FixtureScene::new("asset").with_mesh("Head", &["jawOpen"]);
        let mut blend = BlendState::new();

        blend.stage(0, 0, 0.0, 1.0, 0.15);
        for _ in 0..30 {
            blend.advance(&mut scene);
        }

        let current = blend.current(0, 0).expect("channel staged");
        assert!((current - 1.0).abs() < 0.01, "still {current} after 30 ticks");
        assert_eq!(scene.influence_by_name(0, "jawOpen"), Some(current));
    }

    #[test]
    fn test_monotonic_approach_without_overshoot() {
        let mut scene = FixtureScene::new("asset").with_mesh("Head", &["jawOpen"]);
        let mut blend = BlendState::new();

        blend.stage(0, 0, 0.0, 0.7, 0.2);
        let mut previous = 0.0;
        for _ in 0..200 {
            blend.advance(&mut scene);
            let current = blend.current(0, 0).unwrap();
            assert!(current >= previous, "weight moved backwards");
            assert!(current <= 0.7 + f32::EPSILON, "weight overshot its target");
            previous = current;
        }
    }

    #[test]
    fn test_restaging_keeps_current_weight() {
        let mut scene = FixtureScene::new("asset").with_mesh("Head", &["jawOpen"]);
        let mut blend = BlendState::new();

        blend.stage(0, 0, 0.0, 1.0, 0.5);
        blend.advance(&mut scene);
        let mid = blend.current(0, 0).unwrap();
        assert!(mid > 0.0);

        // A new target must not reset progress to the seed.
        blend.stage(0, 0, 0.0, 0.0, 0.5);
        assert_eq!(blend.current(0, 0), Some(mid));
        assert_eq!(blend.target(0, 0), Some(0.0));
    }

    #[test]
    fn test_retarget_only_touches_existing_channels() {
        let mut blend = BlendState::new();

        assert!(!blend.retarget(0, 0, 0.0, 0.1));
        assert!(blend.is_empty());

        blend.stage(0, 0, 0.4, 1.0, 0.1);
        assert!(blend.retarget(0, 0, 0.0, 0.1));
        assert_eq!(blend.target(0, 0), Some(0.0));
        assert_eq!(blend.len(), 1);
    }

    #[test]
    fn test_targets_clamped_to_unit_interval() {
        let mut scene = FixtureScene::new("asset").with_mesh("Head", &["jawOpen"]);
        let mut blend = BlendState::new();

        blend.stage(0, 0, 0.0, 3.5, 1.0);
        blend.advance(&mut scene);

        assert_eq!(blend.current(0, 0), Some(1.0));
    }
}
