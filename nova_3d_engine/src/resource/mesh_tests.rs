/// Tests for Mesh

use super::*;
use crate::renderer::PrimitiveTopology;

// ============================================================================
// Tests: Construction
// ============================================================================

#[test]
fn test_from_desc_unit_box() {
    let mesh = Mesh::from_desc(Mesh::unit_box_desc("box", 0)).unwrap();
    assert_eq!(mesh.name(), "box");
    assert_eq!(mesh.sub_mesh_count(), 1);
    assert_eq!(mesh.bounds().min, Vec3::splat(-0.5));
    assert_eq!(mesh.bounds().max, Vec3::splat(0.5));

    let sm = mesh.sub_mesh(0).unwrap();
    assert_eq!(sm.topology(), PrimitiveTopology::TriangleList);
    assert_eq!(sm.vertex_count(), 24);
    assert_eq!(sm.index_count(), 36);
    assert_eq!(sm.material(), 0);
}

#[test]
fn test_from_desc_without_sub_meshes_fails() {
    let desc = MeshDesc {
        name: "empty".to_string(),
        bounds: Aabb::EMPTY,
        sub_meshes: Vec::new(),
    };
    let err = Mesh::from_desc(desc).unwrap_err();
    assert!(matches!(err, crate::error::Error::InvalidResource(_)));
}

#[test]
fn test_multi_sub_mesh() {
    let desc = MeshDesc {
        name: "rock".to_string(),
        bounds: Aabb::new(Vec3::splat(-1.0), Vec3::splat(1.0)),
        sub_meshes: vec![
            SubMeshDesc {
                name: "body".to_string(),
                topology: PrimitiveTopology::TriangleList,
                vertex_offset: 0,
                vertex_count: 100,
                index_offset: 0,
                index_count: 150,
                material: 1,
            },
            SubMeshDesc {
                name: "moss".to_string(),
                topology: PrimitiveTopology::TriangleList,
                vertex_offset: 100,
                vertex_count: 40,
                index_offset: 150,
                index_count: 60,
                material: 2,
            },
        ],
    };
    let mesh = Mesh::from_desc(desc).unwrap();
    assert_eq!(mesh.sub_mesh_count(), 2);
    assert_eq!(mesh.sub_mesh(1).unwrap().material(), 2);
}

// ============================================================================
// Tests: Lookup
// ============================================================================

#[test]
fn test_sub_mesh_out_of_range() {
    let mesh = Mesh::from_desc(Mesh::unit_box_desc("box", 0)).unwrap();
    assert!(mesh.sub_mesh(1).is_none());
}

#[test]
fn test_sub_mesh_by_name() {
    let mesh = Mesh::from_desc(Mesh::unit_box_desc("box", 0)).unwrap();
    assert!(mesh.sub_mesh_by_name("box").is_some());
    assert!(mesh.sub_mesh_by_name("lid").is_none());
}

#[test]
fn test_sub_mesh_index() {
    let mesh = Mesh::from_desc(Mesh::unit_box_desc("box", 0)).unwrap();
    assert_eq!(mesh.sub_mesh_index("box").unwrap(), 0);

    let err = mesh.sub_mesh_index("lid").unwrap_err();
    assert!(matches!(err, crate::error::Error::NotFound(_)));
}
