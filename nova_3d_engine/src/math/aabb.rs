/// Axis-Aligned Bounding Box
///
/// Used for bounds aggregation over the scene tree and for frustum culling.
/// An `Aabb` starts `EMPTY` (inverted extents); merging anything into an
/// empty box yields the other box, so `EMPTY` is the identity of `merge`.

use glam::{Mat4, Vec3};

/// Axis-aligned bounding box with inclusive min/max corners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner (x, y, z)
    pub min: Vec3,
    /// Maximum corner (x, y, z)
    pub max: Vec3,
}

impl Aabb {
    /// The empty box: identity element of [`Aabb::merge`].
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Create a box from explicit corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create a box from a center point and half-extents.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Whether this box contains no volume at all (inverted extents).
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow this box to enclose `other`.
    pub fn merge(&mut self, other: &Aabb) {
        if other.is_empty() {
            return;
        }
        if self.is_empty() {
            *self = *other;
        } else {
            self.min = self.min.min(other.min);
            self.max = self.max.max(other.max);
        }
    }

    /// The smallest box enclosing both `self` and `other`.
    pub fn merged(&self, other: &Aabb) -> Aabb {
        let mut out = *self;
        out.merge(other);
        out
    }

    /// Transform this box by a matrix, returning the enclosing box.
    ///
    /// Uses the Arvo method: each matrix axis is projected onto the box
    /// extents, which is exact (tight) without visiting all 8 corners.
    /// An empty box stays empty.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }

        let translation = matrix.w_axis.truncate();
        let mut out = Aabb::new(translation, translation);

        for i in 0..3 {
            let axis = matrix.col(i).truncate();
            let lo = axis * self.min[i];
            let hi = axis * self.max[i];
            out.min += lo.min(hi);
            out.max += lo.max(hi);
        }

        out
    }

    /// Whether `other` lies entirely within `self`.
    pub fn contains(&self, other: &Aabb) -> bool {
        self.min.x <= other.min.x && self.max.x >= other.max.x
            && self.min.y <= other.min.y && self.max.y >= other.max.y
            && self.min.z <= other.min.z && self.max.z >= other.max.z
    }

    /// Whether the two boxes overlap or touch.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x
            && self.min.y <= other.max.y && self.max.y >= other.min.y
            && self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Center point.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-extents from the center.
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
#[path = "aabb_tests.rs"]
mod tests;
