//! Renderable resource descriptions
//!
//! Materials and meshes are lightweight descriptions at this layer: content
//! loading, GPU buffers, and reference counting belong to external
//! collaborators. The core only needs transparency, pass structure,
//! geometry ranges, and local bounds.

mod material;
mod mesh;

pub use material::{Material, MaterialDesc, MaterialId, MaterialRegistry, PassDef, Technique};
pub use mesh::{Mesh, MeshDesc, SubMesh, SubMeshDesc};
