/// Frustum — six clipping planes for visibility culling.
///
/// Each plane is a Vec4 (A, B, C, D) where (A, B, C) is the inward-pointing
/// unit normal and D the signed distance: a point P is inside the half-space
/// when `dot((A,B,C), P) + D >= 0`. Works for both perspective and
/// orthographic projections.

use glam::{Mat4, Vec3, Vec4};
use crate::math::Aabb;

/// Result of a 3-way frustum/AABB classification.
///
/// Used by the scene tree's visibility walk:
/// - `Outside` → prune the entire subtree
/// - `Inside` → collect attached objects without further testing
/// - `Partial` → test individual objects and recurse into children
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrustumTest {
    /// Bounds entirely outside the frustum
    Outside,
    /// Bounds entirely inside the frustum
    Inside,
    /// Bounds straddling at least one plane
    Partial,
}

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Six half-space planes bounding a camera's visible volume.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Extract frustum planes from projection and view matrices.
    ///
    /// Resolution order mandated by the camera: view first, projection
    /// second, then the product is decomposed here.
    pub fn from_matrices(projection: &Mat4, view: &Mat4) -> Self {
        Self::from_clip_matrix(&(*projection * *view))
    }

    /// Extract frustum planes from a combined clip (projection × view) matrix.
    ///
    /// Gribb & Hartmann method: each plane is a sum/difference of the
    /// fourth row with one of the first three rows. The clip matrix is
    /// expected to map depth to [0, 1] (glam's `perspective_rh` and
    /// `orthographic_rh`), so the near plane is the third row alone.
    pub fn from_clip_matrix(clip: &Mat4) -> Self {
        let r0 = clip.row(0);
        let r1 = clip.row(1);
        let r2 = clip.row(2);
        let r3 = clip.row(3);

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near
            r3 - r2, // far
        ];

        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// The six planes: left, right, bottom, top, near, far.
    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    /// Test whether a world-space AABB is (potentially) visible.
    ///
    /// Positive-vertex test: for each plane, take the corner most aligned
    /// with the plane normal; if that corner is outside, the whole box is.
    /// Conservative — may return false positives, never false negatives.
    /// An empty box is never visible.
    pub fn intersects_aabb(&self, aabb: &Aabb) -> bool {
        if aabb.is_empty() {
            return false;
        }

        for plane in &self.planes {
            let normal = plane.truncate();
            let p_vertex = Vec3::select(normal.cmpge(Vec3::ZERO), aabb.max, aabb.min);
            if normal.dot(p_vertex) + plane.w < 0.0 {
                return false;
            }
        }

        true
    }

    /// Classify a world-space AABB against the frustum (3-way).
    ///
    /// Tests the positive vertex (early `Outside`) and the negative vertex
    /// (detects straddling) against each plane. An empty box is `Outside`.
    pub fn classify_aabb(&self, aabb: &Aabb) -> FrustumTest {
        if aabb.is_empty() {
            return FrustumTest::Outside;
        }

        let mut all_inside = true;

        for plane in &self.planes {
            let normal = plane.truncate();
            let front = normal.cmpge(Vec3::ZERO);

            let p_vertex = Vec3::select(front, aabb.max, aabb.min);
            if normal.dot(p_vertex) + plane.w < 0.0 {
                return FrustumTest::Outside;
            }

            let n_vertex = Vec3::select(front, aabb.min, aabb.max);
            if normal.dot(n_vertex) + plane.w < 0.0 {
                all_inside = false;
            }
        }

        if all_inside {
            FrustumTest::Inside
        } else {
            FrustumTest::Partial
        }
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
