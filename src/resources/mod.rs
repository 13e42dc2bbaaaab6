use std::{
    io::{BufReader, Cursor},
    path::Path,
};

use anyhow::Context;

use crate::data_structures::mesh::Mesh;

/**
 * This module contains all logic for loading meshes from external files.
 */
pub mod mesh;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    }
}

/// Parses Wavefront OBJ text into one mesh per object. Referenced `.mtl` files are ignored.
pub fn parse_mesh_obj(source: &str, file_name: &str) -> anyhow::Result<Vec<Mesh>> {
    let mut reader = BufReader::new(Cursor::new(source));
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &load_options(), |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })
    .with_context(|| format!("failed to parse {}", file_name))?;
    if models.is_empty() {
        log::warn!("{} does not contain any objects", file_name);
    }
    Ok(mesh::load_meshes(&models))
}

pub fn load_mesh_obj(path: impl AsRef<Path>) -> anyhow::Result<Vec<Mesh>> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_mesh_obj(&source, &path.display().to_string())
}
