/// Transform — hierarchical position/rotation/scale with cached world state.
///
/// A Transform holds local TRS plus derived world TRS and matrices. It does
/// not own its parent: the SceneTree stores transforms in a flat arena and
/// resolves parents for it, handing an already-updated parent snapshot into
/// the operations that need one. Two dirty flags track staleness:
/// `transform_dirty` (world TRS stale relative to the parent) and
/// `matrix_dirty` (world matrix stale relative to world TRS). A generation
/// counter replaces change callbacks: it bumps whenever world state may have
/// changed, and dependents (child nodes, cameras) compare generations at
/// well-defined points instead of receiving re-entrant notifications.

use glam::{Mat3, Mat4, Quat, Vec3};

/// Local forward axis (cameras and entities face -Z).
const FORWARD: Vec3 = Vec3::NEG_Z;

/// Squared-length threshold below which two directions count as anti-parallel.
const ANTI_PARALLEL_EPSILON: f32 = 1e-6;

/// Reference frame for a relative transform operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformSpace {
    /// Delta expressed in the object's own current local-rotated frame
    Local,
    /// Delta applied directly in the parent's frame, without re-orientation
    Parent,
    /// Delta expressed in world space; converted through the parent chain
    World,
}

/// Algorithm used by [`Transform::set_direction`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DirectionMode {
    /// Build an orthonormal basis against a fixed up axis. Avoids roll
    /// drift; the default for cameras.
    FixedYaw(Vec3),
    /// Minimal arc rotation from the current forward direction, with a
    /// 180°-about-up fallback when the directions are nearly anti-parallel.
    MinimalArc,
}

/// Position/rotation/scale node with lazy world recomputation.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    local_position: Vec3,
    local_rotation: Quat,
    local_scale: Vec3,

    world_position: Vec3,
    world_rotation: Quat,
    world_scale: Vec3,

    world_matrix: Mat4,
    inverse_world_matrix: Mat4,

    /// World TRS stale relative to the parent chain
    transform_dirty: bool,
    /// World matrix stale relative to world TRS
    matrix_dirty: bool,

    /// Bumped whenever world state may have changed
    generation: u64,
}

impl Transform {
    /// Identity transform, clean (world == local).
    pub fn new() -> Self {
        Self {
            local_position: Vec3::ZERO,
            local_rotation: Quat::IDENTITY,
            local_scale: Vec3::ONE,
            world_position: Vec3::ZERO,
            world_rotation: Quat::IDENTITY,
            world_scale: Vec3::ONE,
            world_matrix: Mat4::IDENTITY,
            inverse_world_matrix: Mat4::IDENTITY,
            transform_dirty: false,
            matrix_dirty: false,
            generation: 0,
        }
    }

    // ===== LOCAL ACCESSORS =====

    pub fn local_position(&self) -> Vec3 {
        self.local_position
    }

    pub fn local_rotation(&self) -> Quat {
        self.local_rotation
    }

    pub fn local_scale(&self) -> Vec3 {
        self.local_scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.local_position = position;
        self.require_update();
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.local_rotation = rotation.normalize();
        self.require_update();
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.local_scale = scale;
        self.require_update();
    }

    // ===== WORLD ACCESSORS =====
    //
    // These read the cached world state. They are valid after the owning
    // tree has resolved this transform (SceneTree::update or ::resolve);
    // repeated reads without an intervening mutation are bit-identical.

    pub fn world_position(&self) -> Vec3 {
        self.world_position
    }

    pub fn world_rotation(&self) -> Quat {
        self.world_rotation
    }

    pub fn world_scale(&self) -> Vec3 {
        self.world_scale
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    pub fn inverse_world_matrix(&self) -> Mat4 {
        self.inverse_world_matrix
    }

    // ===== DIRTY STATE =====

    /// Whether the cached world TRS is stale relative to the parent.
    pub fn is_dirty(&self) -> bool {
        self.transform_dirty
    }

    /// Current change generation. Dependents compare this against the value
    /// they last observed to detect staleness.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Mark both cached levels stale and bump the generation.
    ///
    /// Does not push invalidation anywhere: children and cameras detect the
    /// generation change the next time they are resolved.
    pub fn require_update(&mut self) {
        self.transform_dirty = true;
        self.matrix_dirty = true;
        self.generation = self.generation.wrapping_add(1);
    }

    // ===== RELATIVE OPERATIONS =====

    /// Move by `delta` expressed in `space`.
    ///
    /// `parent` must be the already-resolved parent transform (None at the
    /// root); it is only consulted for `TransformSpace::World`.
    pub fn translate(&mut self, delta: Vec3, space: TransformSpace, parent: Option<&Transform>) {
        match space {
            TransformSpace::Local => {
                self.local_position += self.local_rotation * delta;
            }
            TransformSpace::Parent => {
                self.local_position += delta;
            }
            TransformSpace::World => match parent {
                Some(p) => {
                    self.local_position +=
                        (p.world_rotation.inverse() * delta) / p.world_scale;
                }
                None => self.local_position += delta,
            },
        }
        self.require_update();
    }

    /// Rotate by quaternion `delta` expressed in `space`.
    ///
    /// For `TransformSpace::World` the cached world rotation must be
    /// current; the owning tree resolves the ancestor chain first.
    pub fn rotate(&mut self, delta: Quat, space: TransformSpace) {
        let delta = delta.normalize();
        match space {
            TransformSpace::Local => {
                self.local_rotation = self.local_rotation * delta;
            }
            TransformSpace::Parent => {
                self.local_rotation = delta * self.local_rotation;
            }
            TransformSpace::World => {
                let world = self.world_rotation;
                self.local_rotation = self.local_rotation * world.inverse() * delta * world;
            }
        }
        self.require_update();
    }

    /// Rotate about `axis` by `angle` radians in `space`.
    pub fn rotate_axis_angle(&mut self, axis: Vec3, angle: f32, space: TransformSpace) {
        self.rotate(Quat::from_axis_angle(axis.normalize(), angle), space);
    }

    /// Rotate about the Y axis.
    pub fn yaw(&mut self, angle: f32, space: TransformSpace) {
        self.rotate(Quat::from_rotation_y(angle), space);
    }

    /// Rotate about the X axis.
    pub fn pitch(&mut self, angle: f32, space: TransformSpace) {
        self.rotate(Quat::from_rotation_x(angle), space);
    }

    /// Rotate about the Z axis.
    pub fn roll(&mut self, angle: f32, space: TransformSpace) {
        self.rotate(Quat::from_rotation_z(angle), space);
    }

    /// Multiply the local scale componentwise.
    pub fn scale_by(&mut self, factor: Vec3) {
        self.local_scale *= factor;
        self.require_update();
    }

    /// Uniformly multiply the local scale.
    pub fn scale_uniform(&mut self, factor: f32) {
        self.scale_by(Vec3::splat(factor));
    }

    // ===== DIRECTION =====

    /// Point the local forward axis (-Z) along `dir`.
    ///
    /// `FixedYaw` builds an orthonormal basis via cross products against
    /// the fixed up axis — no roll accumulation. `MinimalArc` applies the
    /// smallest rotation taking the current forward direction onto `dir`;
    /// when the two are nearly anti-parallel the arc is ill-defined and a
    /// 180° rotation about the current up axis is used instead. The latter
    /// requires the cached world rotation to be current.
    pub fn set_direction(
        &mut self,
        dir: Vec3,
        mode: DirectionMode,
        parent: Option<&Transform>,
    ) {
        if dir.length_squared() == 0.0 {
            return;
        }
        let target = dir.normalize();

        let world_target = match mode {
            DirectionMode::FixedYaw(up) => {
                let z_axis = -target;
                let mut x_axis = up.cross(z_axis);
                if x_axis.length_squared() < ANTI_PARALLEL_EPSILON {
                    // dir is parallel to the fixed up axis: keep the current
                    // right axis as the hinge
                    x_axis = self.world_rotation * Vec3::X;
                }
                let x_axis = x_axis.normalize();
                let y_axis = z_axis.cross(x_axis);
                Quat::from_mat3(&Mat3::from_cols(x_axis, y_axis, z_axis))
            }
            DirectionMode::MinimalArc => {
                let current = self.world_rotation * FORWARD;
                let arc = if (current + target).length_squared() < ANTI_PARALLEL_EPSILON {
                    Quat::from_axis_angle(self.world_rotation * Vec3::Y, std::f32::consts::PI)
                } else {
                    let axis = current.cross(target);
                    if axis.length_squared() < ANTI_PARALLEL_EPSILON {
                        Quat::IDENTITY
                    } else {
                        let angle = current.dot(target).clamp(-1.0, 1.0).acos();
                        Quat::from_axis_angle(axis.normalize(), angle)
                    }
                };
                arc * self.world_rotation
            }
        };

        self.local_rotation = match parent {
            Some(p) => (p.world_rotation.inverse() * world_target).normalize(),
            None => world_target.normalize(),
        };
        self.require_update();
    }

    /// Point the local forward axis at a world-space `point`.
    ///
    /// Requires the cached world position to be current.
    pub fn look_at(&mut self, point: Vec3, mode: DirectionMode, parent: Option<&Transform>) {
        self.set_direction(point - self.world_position, mode, parent);
    }

    /// Replace the local TRS by decomposing `matrix`.
    pub fn set_from_matrix(&mut self, matrix: &Mat4) {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        self.local_position = translation;
        self.local_rotation = rotation;
        self.local_scale = scale;
        self.require_update();
    }

    // ===== RESOLUTION =====

    /// Recompute world TRS from the parent's (already-resolved) world state.
    ///
    /// world_rotation = parent.world_rotation ∘ local_rotation
    /// world_scale    = parent.world_scale ∘ local_scale   (componentwise)
    /// world_position = parent.world_position
    ///                + parent.world_rotation ∘ (parent.world_scale ∘ local_position)
    ///
    /// Without a parent, world == local. Clears `transform_dirty`, leaves
    /// `matrix_dirty` set, and bumps the generation so dependents notice.
    pub fn update_with_parent(&mut self, parent: Option<&Transform>) {
        match parent {
            Some(p) => {
                self.world_rotation = p.world_rotation * self.local_rotation;
                self.world_scale = p.world_scale * self.local_scale;
                self.world_position =
                    p.world_position + p.world_rotation * (p.world_scale * self.local_position);
            }
            None => {
                self.world_position = self.local_position;
                self.world_rotation = self.local_rotation;
                self.world_scale = self.local_scale;
            }
        }
        self.transform_dirty = false;
        self.matrix_dirty = true;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Compose the world matrix (and its inverse) from world TRS.
    ///
    /// No-op unless `matrix_dirty`; does not bump the generation (the
    /// matrix is derived state, not a new world pose).
    pub fn update_matrix(&mut self) {
        if self.matrix_dirty {
            self.world_matrix = Mat4::from_scale_rotation_translation(
                self.world_scale,
                self.world_rotation,
                self.world_position,
            );
            self.inverse_world_matrix = self.world_matrix.inverse();
            self.matrix_dirty = false;
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
