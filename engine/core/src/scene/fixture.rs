//! In-Process Scene Fixture
//!
//! A channel-free stand-in for a real scene graph, used by the headless
//! demo and the integration tests. It records enough bookkeeping (write
//! counts, clip resets) for tests to assert on engine behavior without a
//! rendering backend.

use std::collections::HashMap;

use super::AvatarScene;

/// One morph-capable mesh in the fixture.
#[derive(Clone, Debug)]
struct FixtureMesh {
    name: String,
    morphs: Vec<String>,
    influences: Vec<f32>,
}

/// A scripted avatar scene backed by plain vectors.
#[derive(Clone, Debug)]
pub struct FixtureScene {
    asset_id: String,
    meshes: Vec<FixtureMesh>,
    clips: Vec<String>,
    clip_weights: HashMap<String, f32>,
    clip_resets: HashMap<String, usize>,
    influence_writes: usize,
}

impl FixtureScene {
    /// Create an empty scene for the given asset identity.
    #[must_use]
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            meshes: Vec::new(),
            clips: Vec::new(),
            clip_weights: HashMap::new(),
            clip_resets: HashMap::new(),
            influence_writes: 0,
        }
    }

    /// Add a mesh with the given morph dictionary, all influences at 0.
    #[must_use]
    pub fn with_mesh(mut self, name: impl Into<String>, morphs: &[&str]) -> Self {
        let morphs: Vec<String> = morphs.iter().map(|m| (*m).to_string()).collect();
        let influences = vec![0.0; morphs.len()];
        self.meshes.push(FixtureMesh {
            name: name.into(),
            morphs,
            influences,
        });
        self
    }

    /// Add named animation clips, all weights at 0.
    #[must_use]
    pub fn with_clips(mut self, clips: &[&str]) -> Self {
        for clip in clips {
            self.clips.push((*clip).to_string());
            self.clip_weights.insert((*clip).to_string(), 0.0);
        }
        self
    }

    /// Name of a mesh (fixtures keep one for readable test failures).
    #[must_use]
    pub fn mesh_name(&self, mesh: usize) -> &str {
        &self.meshes[mesh].name
    }

    /// Current influence of a morph looked up by name, if the mesh has it.
    #[must_use]
    pub fn influence_by_name(&self, mesh: usize, name: &str) -> Option<f32> {
        let mesh = self.meshes.get(mesh)?;
        let index = mesh.morphs.iter().position(|m| m == name)?;
        mesh.influences.get(index).copied()
    }

    /// Current mixer weight of a clip (0 for unknown clips).
    #[must_use]
    pub fn clip_weight(&self, name: &str) -> f32 {
        self.clip_weights.get(name).copied().unwrap_or(0.0)
    }

    /// How many times a clip was reset/restarted.
    #[must_use]
    pub fn reset_count(&self, name: &str) -> usize {
        self.clip_resets.get(name).copied().unwrap_or(0)
    }

    /// Total number of influence writes performed against this scene.
    #[must_use]
    pub fn influence_writes(&self) -> usize {
        self.influence_writes
    }
}

impl AvatarScene for FixtureScene {
    fn asset_id(&self) -> &str {
        &self.asset_id
    }

    fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    fn morph_names(&self, mesh: usize) -> Vec<String> {
        self.meshes.get(mesh).map(|m| m.morphs.clone()).unwrap_or_default()
    }

    fn influence(&self, mesh: usize, index: usize) -> f32 {
        self.meshes
            .get(mesh)
            .and_then(|m| m.influences.get(index))
            .copied()
            .unwrap_or(0.0)
    }

    fn set_influence(&mut self, mesh: usize, index: usize, value: f32) {
        if let Some(slot) = self.meshes.get_mut(mesh).and_then(|m| m.influences.get_mut(index)) {
            *slot = value;
            self.influence_writes += 1;
        }
    }

    fn clip_names(&self) -> Vec<String> {
        self.clips.clone()
    }

    fn reset_clip(&mut self, name: &str) {
        *self.clip_resets.entry(name.to_string()).or_insert(0) += 1;
    }

    fn set_clip_weight(&mut self, name: &str, weight: f32) {
        if self.clips.iter().any(|c| c == name) {
            self.clip_weights.insert(name.to_string(), weight);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_records_influence_writes() {
        let mut scene = FixtureScene::new("fixture").with_mesh("Head", &["jawOpen", "mouthSmile"]);

        assert_eq!(scene.influence_writes(), 0);
        scene.set_influence(0, 0, 0.5);
        scene.set_influence(0, 1, 0.25);

        assert_eq!(scene.influence_writes(), 2);
        assert_eq!(scene.influence_by_name(0, "jawOpen"), Some(0.5));
        assert_eq!(scene.influence_by_name(0, "mouthSmile"), Some(0.25));
    }

    #[test]
    fn test_out_of_range_writes_are_ignored() {
        let mut scene = FixtureScene::new("fixture").with_mesh("Head", &["jawOpen"]);

        scene.set_influence(3, 0, 1.0);
        scene.set_influence(0, 9, 1.0);

        assert_eq!(scene.influence_writes(), 0);
    }

    #[test]
    fn test_clip_bookkeeping() {
        let mut scene = FixtureScene::new("fixture").with_clips(&["idle", "talk"]);

        assert!(scene.has_clip("idle"));
        assert!(!scene.has_clip("dance"));

        scene.reset_clip("talk");
        scene.set_clip_weight("talk", 1.0);

        assert_eq!(scene.reset_count("talk"), 1);
        assert!((scene.clip_weight("talk") - 1.0).abs() < f32::EPSILON);
    }
}
