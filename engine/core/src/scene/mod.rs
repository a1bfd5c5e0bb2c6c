//! Avatar Scene Abstraction
//!
//! The engine never loads or parses 3D assets itself. The hosting
//! application owns the scene graph, and hands the engine a view of it
//! through the [`AvatarScene`] trait: morph-target dictionaries, mutable
//! influence weights, and a set of named, independently weighted animation
//! clips sharing one mixer.
//!
//! # Single-Writer Discipline
//!
//! Only [`crate::blend::BlendState::advance`] calls [`AvatarScene::set_influence`]
//! during normal operation. Every other component stages desired target
//! weights; the blend state applies them once per tick. This keeps the
//! live influence array race-free by construction.

pub mod fixture;

pub use fixture::FixtureScene;

/// A view of the hosting application's loaded avatar asset.
///
/// Meshes are addressed by a stable index in `0..mesh_count()`. Morph
/// targets are addressed by their index within a mesh's dictionary, which
/// matches the position of the name in [`AvatarScene::morph_names`].
///
/// An asset with zero morph-capable meshes is valid; the engine degrades
/// to a face without mouth motion rather than reporting an error.
pub trait AvatarScene {
    /// Identity of the loaded asset. Viseme-map resolution is cached per
    /// asset id and never recomputed while the id stays the same.
    fn asset_id(&self) -> &str;

    /// Number of renderable meshes that expose a morph dictionary.
    fn mesh_count(&self) -> usize;

    /// Morph-target names of one mesh, in dictionary (index) order.
    fn morph_names(&self, mesh: usize) -> Vec<String>;

    /// Current influence weight of one morph target.
    fn influence(&self, mesh: usize, index: usize) -> f32;

    /// Write an influence weight. See the module docs for who may call this.
    fn set_influence(&mut self, mesh: usize, index: usize, value: f32);

    /// Names of the independently playable animation clips.
    fn clip_names(&self) -> Vec<String>;

    /// Whether a clip with this exact name exists.
    fn has_clip(&self, name: &str) -> bool {
        self.clip_names().iter().any(|clip| clip == name)
    }

    /// Restart a clip from its first frame at time scale 1.0.
    fn reset_clip(&mut self, name: &str);

    /// Set a clip's blend weight on the shared mixer.
    fn set_clip_weight(&mut self, name: &str, weight: f32);
}
