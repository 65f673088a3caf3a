/// Material — transparency and pass structure, as seen by the render queue.
///
/// The material collaborator owns shading; this core only reads the fields
/// that drive queue routing and render-key maintenance: `is_transparent`,
/// the active technique's pass list, and a technique generation counter
/// that replaces the technique-changed callback. Renderables compare the
/// generation at the frame boundary and regenerate their keys when it moved.

use rustc_hash::FxHashMap;
use crate::engine_err;
use crate::error::Result;
use crate::utils::IdAllocator;

/// Identifier of a material within one SceneManager's registry.
pub type MaterialId = u32;

/// A single render pass of a technique.
#[derive(Debug, Clone)]
pub struct PassDef {
    pub name: String,
}

impl PassDef {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }
}

/// The active pass list of a material.
#[derive(Debug, Clone, Default)]
pub struct Technique {
    pub passes: Vec<PassDef>,
}

impl Technique {
    /// Technique with a single unnamed pass.
    pub fn single_pass() -> Self {
        Self { passes: vec![PassDef::new("main")] }
    }

    /// Technique with `count` numbered passes (test/tooling convenience).
    pub fn with_pass_count(count: usize) -> Self {
        Self {
            passes: (0..count).map(|i| PassDef::new(&format!("pass{}", i))).collect(),
        }
    }

    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }
}

/// Creation parameters for a material.
#[derive(Debug, Clone)]
pub struct MaterialDesc {
    pub name: String,
    pub transparent: bool,
    pub technique: Technique,
}

/// A registered material.
#[derive(Debug, Clone)]
pub struct Material {
    id: MaterialId,
    name: String,
    transparent: bool,
    technique: Technique,
    technique_generation: u32,
}

impl Material {
    pub fn id(&self) -> MaterialId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent
    }

    /// Transparency participates in render keys, so flipping it counts as
    /// a technique change.
    pub fn set_transparent(&mut self, transparent: bool) {
        if self.transparent != transparent {
            self.transparent = transparent;
            self.technique_generation = self.technique_generation.wrapping_add(1);
        }
    }

    pub fn technique(&self) -> &Technique {
        &self.technique
    }

    pub fn pass_count(&self) -> usize {
        self.technique.pass_count()
    }

    /// Replace the active technique. Renderables observing this material
    /// pick the change up at the next queue population.
    pub fn set_technique(&mut self, technique: Technique) {
        self.technique = technique;
        self.technique_generation = self.technique_generation.wrapping_add(1);
    }

    /// Bumped by `set_technique`/`set_transparent`; compared by renderables
    /// to decide whether their key lists are stale.
    pub fn technique_generation(&self) -> u32 {
        self.technique_generation
    }
}

/// Owns all materials of one SceneManager, keyed by id.
pub struct MaterialRegistry {
    materials: FxHashMap<MaterialId, Material>,
}

impl MaterialRegistry {
    pub(crate) fn new() -> Self {
        Self { materials: FxHashMap::default() }
    }

    /// Register a material, minting its id from the manager's allocator.
    pub fn create(&mut self, ids: &mut IdAllocator, desc: MaterialDesc) -> MaterialId {
        let id = ids.alloc();
        self.materials.insert(id, Material {
            id,
            name: desc.name,
            transparent: desc.transparent,
            technique: desc.technique,
            technique_generation: 0,
        });
        id
    }

    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(&id)
    }

    pub fn get_mut(&mut self, id: MaterialId) -> Option<&mut Material> {
        self.materials.get_mut(&id)
    }

    /// Remove a material and recycle its id.
    pub fn remove(&mut self, ids: &mut IdAllocator, id: MaterialId) -> Result<()> {
        if self.materials.remove(&id).is_none() {
            return Err(engine_err!("nova3d::MaterialRegistry", NotFound,
                "material id {} is not registered", id));
        }
        ids.free(id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
#[path = "material_tests.rs"]
mod tests;
