//! Math helpers built on glam

mod aabb;

pub use aabb::Aabb;
