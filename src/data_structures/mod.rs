//! Engine data structures: meshes, materials, LOD groups, scene graphs, and instances.
//!
//! - `instance` holds per-node transformation data
//! - `material` contains materials shared by identity between renderables
//! - `mesh` contains CPU meshes and the merge primitive
//! - `lod` groups alternate renderer sets per level of detail
//! - `scene_graph` enables hierarchical scene organization

pub mod instance;
pub mod lod;
pub mod material;
pub mod mesh;
pub mod scene_graph;
