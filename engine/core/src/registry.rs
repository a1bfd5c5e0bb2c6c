//! Morph-Target Discovery
//!
//! Walks every morph-capable mesh of a loaded asset once and builds a
//! [`MorphInventory`]: the union of all morph-target names plus, for each
//! name, the exact (mesh, index) slots it occupies. Later staging and
//! writing never re-traverses the scene.

use std::collections::HashMap;

use crate::scene::AvatarScene;

/// One concrete slot a morph-target name occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MorphLocation {
    /// Mesh index within the scene.
    pub mesh: usize,
    /// Morph index within that mesh's dictionary.
    pub index: usize,
}

/// Every morph-target name discovered on an asset, with its locations.
///
/// Names keep scene-traversal order, so "the first mouth-related name
/// found" is well defined for custom viseme-map synthesis.
#[derive(Clone, Debug, Default)]
pub struct MorphInventory {
    names: Vec<String>,
    locations: HashMap<String, Vec<MorphLocation>>,
}

impl MorphInventory {
    /// All discovered names, in traversal order, each listed once.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Whether a name exists anywhere on the asset.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    /// Every (mesh, index) slot carrying this name.
    #[must_use]
    pub fn locations(&self, name: &str) -> &[MorphLocation] {
        self.locations.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the asset exposes no morph targets at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Discover every named morph target across the scene.
///
/// Runs once per asset; an asset with zero morphs yields an empty
/// inventory, not an error.
#[must_use]
pub fn discover(scene: &dyn AvatarScene) -> MorphInventory {
    let mut inventory = MorphInventory::default();

    for mesh in 0..scene.mesh_count() {
        for (index, name) in scene.morph_names(mesh).into_iter().enumerate() {
            let slots = inventory.locations.entry(name.clone()).or_default();
            if slots.is_empty() {
                inventory.names.push(name);
            }
            slots.push(MorphLocation { mesh, index });
        }
    }

    inventory
}
