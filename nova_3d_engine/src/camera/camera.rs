/// Camera — viewpoint with lazy view/projection/frustum derivation.
///
/// A camera owns its own Transform (it is not a scene node) and may follow
/// a node: the manager hands it the node's world matrix and transform
/// generation after the tree update, and the camera re-derives its view
/// only when either its own transform or that parent generation moved.
/// Derived state resolves in a fixed order: view, then projection, then
/// frustum planes.

use glam::{Mat4, Quat, Vec3};
use crate::renderer::Viewport;
use crate::scene::NodeKey;
use crate::transform::{DirectionMode, Transform, TransformSpace};
use super::frustum::Frustum;

/// Projection kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    Perspective,
    Orthographic,
}

/// A named viewpoint into the scene.
#[derive(Debug)]
pub struct Camera {
    name: String,

    transform: Transform,
    seen_transform_generation: u64,

    attached_node: Option<NodeKey>,
    parent_matrix: Mat4,
    seen_parent_generation: u64,

    projection_type: ProjectionType,
    /// Vertical field of view, radians (perspective)
    fov_y: f32,
    near: f32,
    far: f32,
    aspect: f32,
    auto_aspect: bool,
    /// View volume extents (orthographic)
    ortho_width: f32,
    ortho_height: f32,
    auto_ortho_size: bool,

    /// Yaw about a fixed axis instead of the local Y; keeps the horizon
    /// level for free-look cameras
    fixed_yaw: bool,
    fixed_yaw_axis: Vec3,

    view: Mat4,
    view_dirty: bool,
    projection: Mat4,
    projection_dirty: bool,
    frustum: Frustum,
    frustum_dirty: bool,
}

impl Camera {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::new(),
            seen_transform_generation: 0,
            attached_node: None,
            parent_matrix: Mat4::IDENTITY,
            seen_parent_generation: u64::MAX,
            projection_type: ProjectionType::Perspective,
            fov_y: std::f32::consts::FRAC_PI_3,
            near: 0.1,
            far: 1000.0,
            aspect: 4.0 / 3.0,
            auto_aspect: true,
            ortho_width: 10.0,
            ortho_height: 7.5,
            auto_ortho_size: true,
            fixed_yaw: true,
            fixed_yaw_axis: Vec3::Y,
            view: Mat4::IDENTITY,
            view_dirty: true,
            projection: Mat4::IDENTITY,
            projection_dirty: true,
            frustum: Frustum::from_clip_matrix(&Mat4::IDENTITY),
            frustum_dirty: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ===== PROJECTION PARAMETERS =====

    pub fn projection_type(&self) -> ProjectionType {
        self.projection_type
    }

    pub fn set_projection_type(&mut self, projection_type: ProjectionType) {
        self.projection_type = projection_type;
        self.projection_dirty = true;
    }

    pub fn fov_y(&self) -> f32 {
        self.fov_y
    }

    pub fn set_fov_y(&mut self, fov_y: f32) {
        self.fov_y = fov_y;
        self.projection_dirty = true;
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_clip_distances(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        self.projection_dirty = true;
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect
    }

    /// Pin the aspect ratio, disabling viewport tracking.
    pub fn set_aspect_ratio(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.auto_aspect = false;
        self.projection_dirty = true;
    }

    pub fn auto_aspect(&self) -> bool {
        self.auto_aspect
    }

    pub fn set_auto_aspect(&mut self, auto_aspect: bool) {
        self.auto_aspect = auto_aspect;
    }

    pub fn ortho_size(&self) -> (f32, f32) {
        (self.ortho_width, self.ortho_height)
    }

    /// Pin the orthographic extents, disabling viewport tracking.
    pub fn set_ortho_size(&mut self, width: f32, height: f32) {
        self.ortho_width = width;
        self.ortho_height = height;
        self.auto_ortho_size = false;
        self.projection_dirty = true;
    }

    pub fn auto_ortho_size(&self) -> bool {
        self.auto_ortho_size
    }

    pub fn set_auto_ortho_size(&mut self, auto_ortho_size: bool) {
        self.auto_ortho_size = auto_ortho_size;
    }

    /// Adopt the viewport's aspect ratio and orthographic extents, where
    /// tracking is enabled.
    pub fn notify_viewport(&mut self, viewport: &Viewport) {
        if self.auto_aspect {
            let aspect = viewport.aspect_ratio();
            if aspect != self.aspect {
                self.aspect = aspect;
                self.projection_dirty = true;
            }
        }
        if self.auto_ortho_size
            && (viewport.width != self.ortho_width || viewport.height != self.ortho_height)
        {
            self.ortho_width = viewport.width;
            self.ortho_height = viewport.height;
            self.projection_dirty = true;
        }
    }

    // ===== PLACEMENT =====

    pub fn position(&self) -> Vec3 {
        self.transform.local_position()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.set_position(position);
    }

    pub fn rotation(&self) -> Quat {
        self.transform.local_rotation()
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.transform.set_rotation(rotation);
    }

    /// Move relative to the camera's own orientation (or its parent frame).
    /// Without an attached node, parent and world space coincide.
    pub fn translate(&mut self, delta: Vec3, space: TransformSpace) {
        self.transform.translate(delta, space, None);
    }

    /// Yaw about the fixed axis when fixed-yaw is on, the local Y otherwise.
    pub fn yaw(&mut self, angle: f32) {
        if self.fixed_yaw {
            self.transform.rotate(
                Quat::from_axis_angle(self.fixed_yaw_axis, angle),
                TransformSpace::Parent,
            );
        } else {
            self.transform.yaw(angle, TransformSpace::Local);
        }
    }

    pub fn pitch(&mut self, angle: f32) {
        self.transform.pitch(angle, TransformSpace::Local);
    }

    pub fn roll(&mut self, angle: f32) {
        self.transform.roll(angle, TransformSpace::Local);
    }

    pub fn set_fixed_yaw(&mut self, enabled: bool, axis: Vec3) {
        self.fixed_yaw = enabled;
        self.fixed_yaw_axis = axis;
    }

    fn direction_mode(&self) -> DirectionMode {
        if self.fixed_yaw {
            DirectionMode::FixedYaw(self.fixed_yaw_axis)
        } else {
            DirectionMode::MinimalArc
        }
    }

    /// Face along `dir` (camera-relative world, ignoring any attached node).
    pub fn set_direction(&mut self, dir: Vec3) {
        self.resolve_transform();
        let mode = self.direction_mode();
        self.transform.set_direction(dir, mode, None);
    }

    pub fn look_at(&mut self, point: Vec3) {
        self.resolve_transform();
        let mode = self.direction_mode();
        self.transform.look_at(point, mode, None);
    }

    /// Unit vector the camera faces (-Z of its orientation).
    pub fn direction(&mut self) -> Vec3 {
        self.resolve_transform();
        self.transform.world_rotation() * Vec3::NEG_Z
    }

    // ===== NODE FOLLOWING =====

    pub fn attached_node(&self) -> Option<NodeKey> {
        self.attached_node
    }

    /// Follow `node` (None detaches). The camera's own transform becomes
    /// relative to the node.
    pub fn attach_to_node(&mut self, node: Option<NodeKey>) {
        self.attached_node = node;
        self.seen_parent_generation = u64::MAX;
        if node.is_none() {
            self.parent_matrix = Mat4::IDENTITY;
        }
        self.view_dirty = true;
    }

    /// Called by the manager after the tree update with the followed node's
    /// world matrix and transform generation.
    pub(crate) fn notify_parent_transform(&mut self, world: &Mat4, generation: u64) {
        if generation != self.seen_parent_generation {
            self.parent_matrix = *world;
            self.seen_parent_generation = generation;
            self.view_dirty = true;
        }
    }

    // ===== DERIVED STATE =====

    /// The camera transform has no in-tree parent; world == local.
    fn resolve_transform(&mut self) {
        if self.transform.is_dirty() {
            self.transform.update_with_parent(None);
        }
        self.transform.update_matrix();
    }

    fn update_view(&mut self) {
        self.resolve_transform();
        if self.view_dirty || self.transform.generation() != self.seen_transform_generation {
            self.view = (self.parent_matrix * self.transform.world_matrix()).inverse();
            self.seen_transform_generation = self.transform.generation();
            self.view_dirty = false;
            self.frustum_dirty = true;
        }
    }

    fn update_projection(&mut self) {
        if self.projection_dirty {
            self.projection = match self.projection_type {
                ProjectionType::Perspective => {
                    Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
                }
                ProjectionType::Orthographic => Mat4::orthographic_rh(
                    -self.ortho_width / 2.0,
                    self.ortho_width / 2.0,
                    -self.ortho_height / 2.0,
                    self.ortho_height / 2.0,
                    self.near,
                    self.far,
                ),
            };
            self.projection_dirty = false;
            self.frustum_dirty = true;
        }
    }

    pub fn view_matrix(&mut self) -> Mat4 {
        self.update_view();
        self.view
    }

    pub fn projection_matrix(&mut self) -> Mat4 {
        self.update_projection();
        self.projection
    }

    /// Current frustum planes, re-extracting only what went stale.
    /// Resolution order: view, projection, planes.
    pub fn frustum(&mut self) -> &Frustum {
        self.update_view();
        self.update_projection();
        if self.frustum_dirty {
            self.frustum = Frustum::from_matrices(&self.projection, &self.view);
            self.frustum_dirty = false;
        }
        &self.frustum
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
