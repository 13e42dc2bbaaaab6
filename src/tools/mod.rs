//! Scene and project tools.
//!
//! - `combine_mesh` merges renderers sharing a material into a single mesh
//! - `define_symbols` toggles compiler define symbols per build target group

pub mod combine_mesh;
pub mod define_symbols;
