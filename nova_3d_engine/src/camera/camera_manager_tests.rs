/// Tests for CameraManager

use super::*;
use crate::error::Error;
use glam::Vec3;

// ============================================================================
// Tests: Creation
// ============================================================================

#[test]
fn test_create_camera() {
    let mut cameras = CameraManager::new();
    assert!(cameras.is_empty());

    let camera = cameras.create_camera("main").unwrap();
    assert_eq!(camera.name(), "main");
    assert_eq!(cameras.len(), 1);
}

#[test]
fn test_create_duplicate_name_fails() {
    let mut cameras = CameraManager::new();
    cameras.create_camera("main").unwrap();

    let err = cameras.create_camera("main").unwrap_err();
    assert!(matches!(err, Error::InvalidResource(_)));
    assert_eq!(cameras.len(), 1);
}

// ============================================================================
// Tests: Lookup
// ============================================================================

#[test]
fn test_camera_lookup() {
    let mut cameras = CameraManager::new();
    cameras.create_camera("main").unwrap();

    assert!(cameras.camera("main").is_ok());
    let err = cameras.camera("other").unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn test_camera_mut_persists_changes() {
    let mut cameras = CameraManager::new();
    cameras.create_camera("main").unwrap();

    cameras.camera_mut("main").unwrap().set_position(Vec3::X);
    assert_eq!(cameras.camera("main").unwrap().position(), Vec3::X);
}

// ============================================================================
// Tests: Removal
// ============================================================================

#[test]
fn test_remove_camera() {
    let mut cameras = CameraManager::new();
    cameras.create_camera("main").unwrap();

    let removed = cameras.remove_camera("main").unwrap();
    assert_eq!(removed.name(), "main");
    assert!(cameras.is_empty());

    assert!(cameras.remove_camera("main").is_err());
}
