//! Cameras, projections, and frustum culling

mod camera;
mod camera_manager;
mod frustum;

pub use camera::{Camera, ProjectionType};
pub use camera_manager::CameraManager;
pub use frustum::{
    Frustum, FrustumTest, PLANE_BOTTOM, PLANE_FAR, PLANE_LEFT, PLANE_NEAR, PLANE_RIGHT, PLANE_TOP,
};
