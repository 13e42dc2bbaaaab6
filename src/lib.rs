//! ngin-tools
//!
//! Scene utilities built around a small scene-graph abstraction. The centre
//! piece is the mesh combiner, which fuses renderers sharing a material into a
//! single mesh (per LOD level, if any). Next to it live a few helpers that come
//! up when preparing scenes: local-to-local transform matrices, min/max float
//! ranges and a define-symbol toggle for project settings.
//!
//! High-level modules
//! - `data_structures`: meshes, materials, LOD groups, instances and the scene graph
//! - `extensions`: extension traits over `cgmath` types
//! - `resources`: helpers to load meshes from files
//! - `tools`: the mesh combiner and the define-symbol tool
//! - `types`: small value types such as `MinMaxFloat`
//!

pub mod data_structures;
pub mod extensions;
pub mod resources;
pub mod tools;
pub mod types;

// Re-exports commonly used types for convenience in downstream code.
pub use cgmath::*;
pub use data_structures::scene_graph::{NodeId, Scene, SceneGraph};
pub use tools::combine_mesh::{CombineError, CombineMesh, CombineMeshSettings};

/// Installs `env_logger` (configured through `RUST_LOG`). Safe to call more than once.
pub fn init_logging() {
    if let Err(e) = env_logger::try_init() {
        log::debug!("Logger already initialised: {}", e);
    }
}
