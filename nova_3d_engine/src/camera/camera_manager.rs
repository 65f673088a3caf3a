/// Camera registry of one SceneManager, keyed by unique name.

use rustc_hash::FxHashMap;
use crate::{engine_bail, engine_err};
use crate::error::Result;
use super::camera::Camera;

pub struct CameraManager {
    cameras: FxHashMap<String, Camera>,
}

impl CameraManager {
    pub(crate) fn new() -> Self {
        Self { cameras: FxHashMap::default() }
    }

    /// Create a camera under a unique name.
    pub fn create_camera(&mut self, name: &str) -> Result<&mut Camera> {
        if self.cameras.contains_key(name) {
            engine_bail!("nova3d::CameraManager", InvalidResource,
                "a camera named '{}' already exists", name);
        }
        Ok(self
            .cameras
            .entry(name.to_string())
            .or_insert_with(|| Camera::new(name)))
    }

    pub fn camera(&self, name: &str) -> Result<&Camera> {
        self.cameras.get(name).ok_or_else(|| {
            engine_err!("nova3d::CameraManager", NotFound, "no camera named '{}'", name)
        })
    }

    pub fn camera_mut(&mut self, name: &str) -> Result<&mut Camera> {
        self.cameras.get_mut(name).ok_or_else(|| {
            engine_err!("nova3d::CameraManager", NotFound, "no camera named '{}'", name)
        })
    }

    pub fn remove_camera(&mut self, name: &str) -> Result<Camera> {
        self.cameras.remove(name).ok_or_else(|| {
            engine_err!("nova3d::CameraManager", NotFound, "no camera named '{}'", name)
        })
    }

    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Camera> {
        self.cameras.values_mut()
    }
}

#[cfg(test)]
#[path = "camera_manager_tests.rs"]
mod tests;
