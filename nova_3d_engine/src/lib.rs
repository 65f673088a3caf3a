/*!
# Nova 3D Engine

Scene-graph and render-queue core for the Nova 3D rendering engine.

This crate owns the CPU side of a frame: a hierarchical scene tree with
lazily resolved transforms, cameras with cached view/projection/frustum
state, frustum culling, and a sorted render queue with geometry-instance
batching. It issues no GPU work itself; a backend implements the
[`renderer::Renderer`] trait and consumes the queue.

## Architecture

- **Transform**: local/world TRS with dirty flags and change generations
- **SceneTree**: flat node arena, parent-before-child resolution
- **Entity / DebugVolume**: renderable leaves attached to nodes
- **Camera**: viewpoint with lazy view, projection, and frustum planes
- **RenderQueue**: grouped, sorted draw records, rebuilt every frame
- **InstanceBatchManager**: folds same-geometry records into one draw

A frame is three single-threaded phases: tree update, queue population,
queue consumption.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod camera;
pub mod math;
pub mod queue;
pub mod renderer;
pub mod resource;
pub mod scene;
pub mod transform;
pub mod utils;

// Main nova3d namespace module
pub mod nova3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine singleton
    pub use crate::engine::Engine;

    // Renderer consumer trait
    pub use crate::renderer::Renderer;

    // Scene entry point
    pub use crate::scene::SceneManager;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }

    // Math sub-module
    pub mod math {
        pub use crate::math::*;
    }

    // Render queue sub-module
    pub mod queue {
        pub use crate::queue::*;
    }

    // Render sub-module with all rendering types
    pub mod render {
        pub use crate::renderer::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Transform sub-module
    pub mod transform {
        pub use crate::transform::*;
    }
}

// Re-export math library at crate root
pub use glam;
