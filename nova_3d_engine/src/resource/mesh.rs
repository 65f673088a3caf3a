/// Mesh — geometry ranges and local bounds for renderable entities.
///
/// Buffer allocation lives with the renderer collaborator; a mesh here is
/// offsets/counts into externally owned buffers, one default material per
/// sub-mesh, and the local-space bounding box used for culling.

use std::sync::Arc;
use glam::Vec3;
use crate::engine_err;
use crate::error::Result;
use crate::math::Aabb;
use crate::renderer::PrimitiveTopology;
use super::MaterialId;

/// Creation parameters for one sub-mesh.
#[derive(Debug, Clone)]
pub struct SubMeshDesc {
    pub name: String,
    pub topology: PrimitiveTopology,
    pub vertex_offset: u32,
    pub vertex_count: u32,
    /// Zero index_count means non-indexed
    pub index_offset: u32,
    pub index_count: u32,
    /// Default material; sub-entities fall back to it when assigned `None`
    pub material: MaterialId,
}

/// Creation parameters for a mesh.
#[derive(Debug, Clone)]
pub struct MeshDesc {
    pub name: String,
    /// Local-space bounds enclosing all sub-meshes
    pub bounds: Aabb,
    pub sub_meshes: Vec<SubMeshDesc>,
}

/// One drawable range of a mesh.
#[derive(Debug, Clone)]
pub struct SubMesh {
    name: String,
    topology: PrimitiveTopology,
    vertex_offset: u32,
    vertex_count: u32,
    index_offset: u32,
    index_count: u32,
    material: MaterialId,
}

impl SubMesh {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topology(&self) -> PrimitiveTopology {
        self.topology
    }

    pub fn vertex_offset(&self) -> u32 {
        self.vertex_offset
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_offset(&self) -> u32 {
        self.index_offset
    }

    /// Zero for non-indexed geometry
    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Default material id
    pub fn material(&self) -> MaterialId {
        self.material
    }
}

/// Immutable mesh description, shared between entities via `Arc`.
#[derive(Debug)]
pub struct Mesh {
    name: String,
    bounds: Aabb,
    sub_meshes: Vec<SubMesh>,
}

impl Mesh {
    /// Validate a description and build the mesh.
    pub fn from_desc(desc: MeshDesc) -> Result<Arc<Self>> {
        if desc.sub_meshes.is_empty() {
            return Err(engine_err!("nova3d::Mesh", InvalidResource,
                "mesh '{}' has no sub-meshes", desc.name));
        }

        let sub_meshes = desc.sub_meshes.into_iter().map(|sm| SubMesh {
            name: sm.name,
            topology: sm.topology,
            vertex_offset: sm.vertex_offset,
            vertex_count: sm.vertex_count,
            index_offset: sm.index_offset,
            index_count: sm.index_count,
            material: sm.material,
        }).collect();

        Ok(Arc::new(Self {
            name: desc.name,
            bounds: desc.bounds,
            sub_meshes,
        }))
    }

    /// Unit-cube mesh description helper centered at the origin.
    pub fn unit_box_desc(name: &str, material: MaterialId) -> MeshDesc {
        MeshDesc {
            name: name.to_string(),
            bounds: Aabb::new(Vec3::splat(-0.5), Vec3::splat(0.5)),
            sub_meshes: vec![SubMeshDesc {
                name: "box".to_string(),
                topology: PrimitiveTopology::TriangleList,
                vertex_offset: 0,
                vertex_count: 24,
                index_offset: 0,
                index_count: 36,
                material,
            }],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local-space bounds
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn sub_mesh_count(&self) -> usize {
        self.sub_meshes.len()
    }

    pub fn sub_mesh(&self, index: usize) -> Option<&SubMesh> {
        self.sub_meshes.get(index)
    }

    pub fn sub_mesh_by_name(&self, name: &str) -> Option<&SubMesh> {
        self.sub_meshes.iter().find(|sm| sm.name == name)
    }

    /// Index of the named sub-mesh, or a not-found error.
    pub fn sub_mesh_index(&self, name: &str) -> Result<usize> {
        self.sub_meshes.iter().position(|sm| sm.name == name)
            .ok_or_else(|| engine_err!("nova3d::Mesh", NotFound,
                "mesh '{}' has no sub-mesh named '{}'", self.name, name))
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
