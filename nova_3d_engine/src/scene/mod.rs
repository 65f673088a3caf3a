//! Scene graph: nodes, movable leaves, and frame orchestration

mod node;
mod entity;
mod tree;
mod scene_manager;

pub use node::{Movable, NodeKey, SceneNode};
pub use entity::{
    DebugVolume, DebugVolumeKey, Entity, EntityFlags, EntityKey, RenderKey, SubEntity,
};
pub use tree::SceneTree;
pub use scene_manager::SceneManager;
