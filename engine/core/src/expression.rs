//! Facial Expression Presets and Blending
//!
//! Expressions are fixed, named tables of non-mouth morph weights (the
//! mouth belongs to the lip-sync path). Each tick the blender stages the
//! active preset's weights; morphs outside the preset are left untouched,
//! so whichever component last drove a control stays responsible for
//! resetting it.

use crate::blend::BlendState;
use crate::registry::MorphInventory;
use crate::scene::AvatarScene;
use crate::viseme::is_mouth_related;

/// The neutral expression: an empty preset.
pub const DEFAULT_EXPRESSION: &str = "default";

/// Names of every built-in preset.
pub const PRESET_NAMES: [&str; 6] = [
    DEFAULT_EXPRESSION,
    "smile",
    "sad",
    "painful",
    "distressed",
    "thinking",
];

/// Target weights for a named preset. Unknown names yield the empty
/// preset, same as `"default"`.
#[must_use]
pub fn preset(name: &str) -> &'static [(&'static str, f32)] {
    match name {
        "smile" => &[
            ("mouthSmile", 0.7),
            ("mouthSmileLeft", 0.7),
            ("mouthSmileRight", 0.7),
            ("eyeSquintLeft", 0.3),
            ("eyeSquintRight", 0.3),
        ],
        "sad" => &[
            ("mouthFrown", 0.7),
            ("mouthFrownLeft", 0.7),
            ("mouthFrownRight", 0.7),
            ("eyeLookDownLeft", 0.5),
            ("eyeLookDownRight", 0.5),
        ],
        "painful" => &[
            ("browInnerUp", 0.6),
            ("eyeSquintLeft", 0.6),
            ("eyeSquintRight", 0.6),
            ("mouthStretchLeft", 0.5),
            ("mouthStretchRight", 0.5),
        ],
        "distressed" => &[
            ("eyeWideLeft", 0.7),
            ("eyeWideRight", 0.7),
            ("mouthOpen", 0.5),
            ("jawOpen", 0.4),
        ],
        "thinking" => &[
            ("browInnerUp", 0.4),
            ("eyeLookUpLeft", 0.3),
            ("eyeLookUpRight", 0.3),
            ("mouthClose", 0.4),
        ],
        _ => &[],
    }
}

/// Blends the active expression preset toward its target weights.
#[derive(Debug)]
pub struct ExpressionBlender {
    active: String,
    smoothing: f32,
    /// Morphs the previous preset drove that the new one does not;
    /// released (staged back to 0) on the next tick.
    pending_release: Vec<&'static str>,
}

impl ExpressionBlender {
    /// Create a blender with the given per-tick smoothing factor.
    #[must_use]
    pub fn new(smoothing: f32) -> Self {
        Self {
            active: DEFAULT_EXPRESSION.to_string(),
            smoothing,
            pending_release: Vec::new(),
        }
    }

    /// Switch the active preset.
    ///
    /// Morphs the outgoing preset drove and the incoming one does not
    /// cover are this component's to reset; they head back to 0.
    pub fn set_expression(&mut self, name: &str) {
        if self.active == name {
            return;
        }
        let incoming = preset(name);
        for &(morph, _) in preset(&self.active) {
            if !incoming.iter().any(|&(m, _)| m == morph) {
                self.pending_release.push(morph);
            }
        }
        self.active = name.to_string();
    }

    /// Name of the active preset.
    #[must_use]
    pub fn active(&self) -> &str {
        &self.active
    }

    /// Stage the active preset's weights for this tick.
    ///
    /// Mouth/jaw/viseme-classified morphs are skipped: those controls are
    /// owned by the lip-sync path. Preset entries the asset does not have
    /// are ignored.
    pub fn stage(&mut self, inventory: &MorphInventory, scene: &dyn AvatarScene, blend: &mut BlendState) {
        for morph in self.pending_release.drain(..) {
            for location in inventory.locations(morph) {
                blend.retarget(location.mesh, location.index, 0.0, self.smoothing);
            }
        }

        for &(morph, weight) in preset(&self.active) {
            if is_mouth_related(morph) {
                continue;
            }
            for location in inventory.locations(morph) {
                let seed = scene.influence(location.mesh, location.index);
                blend.stage(location.mesh, location.index, seed, weight, self.smoothing);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::discover;
    use crate::scene::FixtureScene;

    fn head_scene() -> FixtureScene {
        FixtureScene::new("asset").with_mesh(
            "Head",
            &["eyeSquintLeft", "eyeSquintRight", "mouthSmile", "browInnerUp"],
        )
    }

    #[test]
    fn test_stage_skips_mouth_classified_morphs() {
        let mut scene = head_scene();
        let inventory = discover(&scene);
        let mut blend = BlendState::new();
        let mut blender = ExpressionBlender::new(0.1);

        blender.set_expression("smile");
        blender.stage(&inventory, &scene, &mut blend);
        blend.advance(&mut scene);

        // Eye squints move; mouthSmile stays with the lip-sync path.
        assert!(scene.influence_by_name(0, "eyeSquintLeft").unwrap() > 0.0);
        assert_eq!(scene.influence_by_name(0, "mouthSmile"), Some(0.0));
    }

    #[test]
    fn test_morphs_outside_preset_are_untouched() {
        let mut scene = head_scene();
        let inventory = discover(&scene);
        let mut blend = BlendState::new();
        let mut blender = ExpressionBlender::new(0.1);

        blender.set_expression("smile");
        blender.stage(&inventory, &scene, &mut blend);
        blend.advance(&mut scene);

        // browInnerUp is not part of "smile": no channel, no write.
        assert_eq!(blend.current(0, 3), None);
    }

    #[test]
    fn test_leaving_a_preset_releases_its_morphs() {
        let mut scene = head_scene();
        let inventory = discover(&scene);
        let mut blend = BlendState::new();
        let mut blender = ExpressionBlender::new(0.5);

        blender.set_expression("smile");
        for _ in 0..30 {
            blender.stage(&inventory, &scene, &mut blend);
            blend.advance(&mut scene);
        }
        assert!(scene.influence_by_name(0, "eyeSquintLeft").unwrap() > 0.29);

        blender.set_expression(DEFAULT_EXPRESSION);
        for _ in 0..30 {
            blender.stage(&inventory, &scene, &mut blend);
            blend.advance(&mut scene);
        }
        assert!(scene.influence_by_name(0, "eyeSquintLeft").unwrap() < 0.01);
    }

    #[test]
    fn test_default_and_unknown_presets_are_empty() {
        assert!(preset(DEFAULT_EXPRESSION).is_empty());
        assert!(preset("no-such-preset").is_empty());
        assert_eq!(preset("smile").len(), 5);
    }

    #[test]
    fn test_preset_entries_absent_from_asset_are_ignored() {
        let mut scene = FixtureScene::new("asset").with_mesh("Head", &["eyeSquintLeft"]);
        let inventory = discover(&scene);
        let mut blend = BlendState::new();
        let mut blender = ExpressionBlender::new(0.1);

        blender.set_expression("distressed");
        blender.stage(&inventory, &scene, &mut blend);
        blend.advance(&mut scene);

        assert!(blend.is_empty());
        assert_eq!(scene.influence_writes(), 0);
    }
}
