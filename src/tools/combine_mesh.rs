//! Per-material mesh combining.
//!
//! Renderers below a root node are grouped by their primary material and every
//! group is fused into one mesh. The first renderer of a group survives and
//! receives the merged mesh, the nodes of all other renderers are destroyed.
//! If the root carries a [`LodGroup`](crate::data_structures::lod::LodGroup)
//! every LOD level is combined on its own so levels never bleed into each other.
//!
//! This is destructive and cannot be undone.

use std::rc::Rc;

use cgmath::SquareMatrix;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    data_structures::{
        material::{MaterialRef, same_material},
        mesh::{CombineInstance, MergeError, Mesh},
        scene_graph::{NodeId, SceneGraph},
    },
    extensions::transform::TransformExt,
};

#[derive(Debug, Error)]
pub enum CombineError {
    #[error("world matrix of survivor {0:?} is not invertible")]
    SingularReferenceFrame(NodeId),
    #[error("survivor {survivor:?} lies below {member:?}, which would be destroyed")]
    SurvivorInsideMember { survivor: NodeId, member: NodeId },
    #[error("node {0:?} vanished from the scene while combining")]
    MissingNode(NodeId),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineMeshSettings {
    /// Collapse everything into a single sub-mesh instead of one sub-mesh per source.
    pub merge_sub_meshes: bool,
    /// Move every source into the survivor's local space before merging.
    pub use_matrices: bool,
    /// Leave renderers with more than one material slot alone.
    pub skip_multi_materials: bool,
}

impl CombineMeshSettings {
    pub fn new(merge_sub_meshes: bool, use_matrices: bool, skip_multi_materials: bool) -> Self {
        Self {
            merge_sub_meshes,
            use_matrices,
            skip_multi_materials,
        }
    }
}

impl Default for CombineMeshSettings {
    fn default() -> Self {
        Self::new(true, true, false)
    }
}

/// Component form of the combiner, attached to the root of the hierarchy it combines.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombineMesh {
    /// Combine as soon as [`CombineMesh::on_start`] runs.
    pub auto: bool,
    pub settings: CombineMeshSettings,
    /// Log what the combiner finds and skips.
    pub debug: bool,
}

impl CombineMesh {
    /// Reads the component from RON, e.g. `(auto: true, settings: (use_matrices: false))`.
    pub fn from_ron(source: &str) -> anyhow::Result<Self> {
        Ok(ron::from_str(source)?)
    }

    pub fn to_ron(&self) -> anyhow::Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Start hook: combines `root` when `auto` is set. Returns whether anything ran.
    pub fn on_start(&self, scene: &mut dyn SceneGraph, root: NodeId) -> Result<bool, CombineError> {
        if !self.auto {
            return Ok(false);
        }
        combine_all(scene, root, &self.settings, self.debug)?;
        Ok(true)
    }
}

/**
 * Combines all meshes below `root` by unique primary material, once per LOD level if `root`
 * has a LOD group and once for the whole subtree otherwise.
 *
 * Missing renderers and renderers without a primary material are ignored, as are multi
 * material renderers when `settings.skip_multi_materials` is set.
 */
pub fn combine_all(
    scene: &mut dyn SceneGraph,
    root: NodeId,
    settings: &CombineMeshSettings,
    debug: bool,
) -> Result<(), CombineError> {
    let groups: Vec<Vec<Option<NodeId>>> = match scene.lod_group(root) {
        Some(lod_group) => {
            if debug {
                info!(
                    "Found {} LODs, adding renderers for separate combining",
                    lod_group.lod_count()
                );
            }
            lod_group
                .levels
                .iter()
                .map(|level| level.renderers.clone())
                .collect()
        }
        None => {
            if debug {
                info!("No LOD group found, adding all renderers");
            }
            vec![scene.renderers_in_children(root).into_iter().map(Some).collect()]
        }
    };

    for group in groups {
        let mut renderers: Vec<NodeId> = group
            .into_iter()
            .flatten()
            .filter(|&r| scene.contains(r))
            .filter(|&r| scene.primary_material(r).is_some())
            .collect();
        if settings.skip_multi_materials {
            let size = renderers.len();
            renderers.retain(|&r| scene.materials(r).len() == 1);
            if debug {
                info!(
                    "Excluding {} renderers with multiple materials",
                    size - renderers.len()
                );
            }
        }
        combine_group(scene, &renderers, settings, debug)?;
    }
    Ok(())
}

/// Combines the meshes of `renderers`, one merge per distinct primary material.
pub fn combine_group(
    scene: &mut dyn SceneGraph,
    renderers: &[NodeId],
    settings: &CombineMeshSettings,
    debug: bool,
) -> Result<(), CombineError> {
    if renderers.is_empty() {
        if debug {
            info!("No renderers found");
        }
        return Ok(());
    }
    if debug {
        info!("Found {} renderers", renderers.len());
    }

    let partitions = partition_by_material(&*scene, renderers);
    if debug {
        info!("Found {} unique materials", partitions.len());
    }

    for partition in partitions {
        let mesh_owners: Vec<NodeId> = partition
            .into_iter()
            .filter(|&r| scene.mesh(r).is_some())
            .collect();
        combine(scene, &mesh_owners, settings, debug)?;
    }
    Ok(())
}

/**
 * Groups renderers by primary material identity.
 *
 * Groups come out in the order their material is first seen and keep the input order of
 * their members.
 */
pub fn partition_by_material(scene: &dyn SceneGraph, renderers: &[NodeId]) -> Vec<Vec<NodeId>> {
    let mut partitions: Vec<(Option<MaterialRef>, Vec<NodeId>)> = Vec::new();
    for &renderer in renderers {
        let material = scene.primary_material(renderer);
        match partitions
            .iter_mut()
            .find(|(m, _)| same_material(m.as_ref(), material.as_ref()))
        {
            Some((_, members)) => members.push(renderer),
            None => partitions.push((material, vec![renderer])),
        }
    }
    partitions.into_iter().map(|(_, members)| members).collect()
}

/**
 * Fuses the meshes of `mesh_owners` into the first of them.
 *
 * The survivor's world matrix is the reference frame: every other mesh is moved by
 * `inverse(reference) * world(member)` so the merged geometry stays where it was drawn.
 * The other owners' nodes are destroyed once all source meshes are captured.
 *
 * Destroying a node takes its whole subtree with it, including renderers of other
 * materials nested below a member. Those are lost rather than combined, so nested
 * mixed-material hierarchies should be flattened first. A member that is an ancestor of
 * the survivor is rejected before anything is destroyed.
 */
pub fn combine(
    scene: &mut dyn SceneGraph,
    mesh_owners: &[NodeId],
    settings: &CombineMeshSettings,
    debug: bool,
) -> Result<(), CombineError> {
    let owners: Vec<(NodeId, Rc<Mesh>)> = mesh_owners
        .iter()
        .filter_map(|&node| scene.mesh(node).map(|mesh| (node, mesh)))
        .collect();
    let Some(&(survivor, _)) = owners.first() else {
        if debug {
            info!("No meshes found");
        }
        return Ok(());
    };

    if let Some(&(member, _)) = owners[1..]
        .iter()
        .find(|&&(member, _)| scene.is_ancestor(member, survivor))
    {
        return Err(CombineError::SurvivorInsideMember { survivor, member });
    }

    let reference = scene
        .world_matrix(survivor)
        .ok_or(CombineError::MissingNode(survivor))?;

    let mut transforms = Vec::with_capacity(owners.len());
    transforms.push(cgmath::Matrix4::identity());
    for &(node, _) in &owners[1..] {
        let transform = if settings.use_matrices {
            let world = scene
                .world_matrix(node)
                .ok_or(CombineError::MissingNode(node))?;
            world
                .local_to_local(&reference)
                .ok_or(CombineError::SingularReferenceFrame(survivor))?
        } else {
            cgmath::Matrix4::identity()
        };
        transforms.push(transform);
    }

    let instances: Vec<CombineInstance> = owners
        .iter()
        .zip(transforms)
        .map(|((_, mesh), transform)| CombineInstance {
            mesh: mesh.as_ref(),
            transform,
        })
        .collect();

    for &(node, _) in &owners[1..] {
        scene.destroy(node);
    }

    let mut merged = Mesh::combine_meshes(
        &instances,
        settings.merge_sub_meshes,
        settings.use_matrices,
    )?;
    merged.name = format!("{} (combined)", owners[0].1.name);
    if debug {
        info!(
            "Combined {} meshes into {:?}: {} vertices, {} sub-meshes",
            instances.len(),
            survivor,
            merged.vertices.len(),
            merged.sub_mesh_count()
        );
    }
    if !scene.set_mesh(survivor, Rc::new(merged)) {
        return Err(CombineError::MissingNode(survivor));
    }
    Ok(())
}
