//! Hierarchical transform component

mod transform;

pub use transform::{Transform, TransformSpace, DirectionMode};
