//! Scene graph and hierarchical scene organization.
//!
//! [`SceneGraph`] is the set of operations the tools in this crate need from a
//! host scene: enumerate renderables, read transforms and materials, swap
//! meshes and destroy nodes. [`Scene`] is a small arena-backed implementation
//! used by tests and by hosts that don't bring their own graph.

use std::rc::Rc;

use anyhow::{anyhow, bail};
use log::warn;

use crate::{
    data_structures::{
        instance::Instance,
        lod::LodGroup,
        material::MaterialRef,
        mesh::Mesh,
    },
    extensions::transform::TransformExt,
};

/// Handle of a node inside a scene. Handles are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// The drawable part of a node: material slots and a (shared) mesh.
#[derive(Clone, Debug, Default)]
pub struct Renderable {
    pub materials: Vec<Option<MaterialRef>>,
    pub mesh: Option<Rc<Mesh>>,
}

impl Renderable {
    pub fn new(material: MaterialRef, mesh: Rc<Mesh>) -> Self {
        Self {
            materials: vec![Some(material)],
            mesh: Some(mesh),
        }
    }

    pub fn with_materials(materials: Vec<MaterialRef>, mesh: Rc<Mesh>) -> Self {
        Self {
            materials: materials.into_iter().map(Some).collect(),
            mesh: Some(mesh),
        }
    }
}

pub trait SceneGraph {
    fn contains(&self, node: NodeId) -> bool;

    /// All nodes carrying a renderable in the subtree of `root` (inclusive), depth-first.
    fn renderers_in_children(&self, root: NodeId) -> Vec<NodeId>;

    fn lod_group(&self, node: NodeId) -> Option<&LodGroup>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Local-to-world matrix, `None` if the node does not exist.
    fn world_matrix(&self, node: NodeId) -> Option<cgmath::Matrix4<f32>>;

    /// Material slots of the node's renderable; empty if it has none.
    fn materials(&self, node: NodeId) -> &[Option<MaterialRef>];

    fn mesh(&self, node: NodeId) -> Option<Rc<Mesh>>;

    /// Replaces the mesh of the node's renderable. Returns `false` if there is nothing to assign to.
    fn set_mesh(&mut self, node: NodeId, mesh: Rc<Mesh>) -> bool;

    /// Removes the node and all of its descendants.
    fn destroy(&mut self, node: NodeId);

    /// Material in slot 0.
    fn primary_material(&self, node: NodeId) -> Option<MaterialRef> {
        self.materials(node).first().cloned().flatten()
    }

    /// Matrix re-expressing `node`'s local space in `target`'s local space.
    fn local_to_local_matrix(&self, node: NodeId, target: NodeId) -> Option<cgmath::Matrix4<f32>> {
        let source = self.world_matrix(node)?;
        let target = self.world_matrix(target)?;
        source.local_to_local(&target)
    }

    /// Whether `ancestor` lies strictly above `node`, i.e. destroying it also destroys `node`.
    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parent(parent);
        }
        false
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub local: Instance,
    pub renderable: Option<Renderable>,
    pub lod_group: Option<LodGroup>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Default)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
    root_nodes: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node below `parent` (or as a root). Fails if the parent does not exist.
    pub fn add_node(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        local: Instance,
    ) -> anyhow::Result<NodeId> {
        let id = NodeId(self.nodes.len());
        match parent {
            Some(parent_id) => {
                let parent = self
                    .node_mut(parent_id)
                    .ok_or_else(|| anyhow!("parent {:?} of `{}` does not exist", parent_id, name))?;
                parent.children.push(id);
            }
            None => self.root_nodes.push(id),
        }
        self.nodes.push(Some(Node {
            name: name.to_string(),
            local,
            renderable: None,
            lod_group: None,
            parent,
            children: Vec::new(),
        }));
        Ok(id)
    }

    /// Convenience for a node that draws `mesh` with `material`.
    pub fn add_renderer(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        local: Instance,
        renderable: Renderable,
    ) -> anyhow::Result<NodeId> {
        let id = self.add_node(parent, name, local)?;
        self.set_renderable(id, renderable)?;
        Ok(id)
    }

    pub fn set_renderable(&mut self, node: NodeId, renderable: Renderable) -> anyhow::Result<()> {
        let Some(n) = self.node_mut(node) else {
            bail!("node {:?} does not exist", node);
        };
        n.renderable = Some(renderable);
        Ok(())
    }

    pub fn set_lod_group(&mut self, node: NodeId, lod_group: LodGroup) -> anyhow::Result<()> {
        let Some(n) = self.node_mut(node) else {
            bail!("node {:?} does not exist", node);
        };
        n.lod_group = Some(lod_group);
        Ok(())
    }

    pub fn node(&self, node: NodeId) -> Option<&Node> {
        self.nodes.get(node.0).and_then(Option::as_ref)
    }

    pub fn node_mut(&mut self, node: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(node.0).and_then(Option::as_mut)
    }

    pub fn root_nodes(&self) -> &[NodeId] {
        &self.root_nodes
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn collect_renderers(&self, node: NodeId, out: &mut Vec<NodeId>) {
        let Some(n) = self.node(node) else { return };
        if n.renderable.is_some() {
            out.push(node);
        }
        for &child in &n.children {
            self.collect_renderers(child, out);
        }
    }

    fn remove_subtree(&mut self, node: NodeId) {
        let Some(removed) = self.nodes.get_mut(node.0).and_then(Option::take) else {
            return;
        };
        for child in removed.children {
            self.remove_subtree(child);
        }
    }
}

impl SceneGraph for Scene {
    fn contains(&self, node: NodeId) -> bool {
        self.node(node).is_some()
    }

    fn renderers_in_children(&self, root: NodeId) -> Vec<NodeId> {
        let mut renderers = Vec::new();
        self.collect_renderers(root, &mut renderers);
        renderers
    }

    fn lod_group(&self, node: NodeId) -> Option<&LodGroup> {
        self.node(node)?.lod_group.as_ref()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node)?.parent
    }

    fn world_matrix(&self, node: NodeId) -> Option<cgmath::Matrix4<f32>> {
        let mut current = self.node(node)?;
        let mut world = current.local.to_matrix();
        while let Some(parent) = current.parent {
            current = self.node(parent)?;
            world = current.local.to_matrix() * world;
        }
        Some(world)
    }

    fn materials(&self, node: NodeId) -> &[Option<MaterialRef>] {
        self.node(node)
            .and_then(|n| n.renderable.as_ref())
            .map(|r| r.materials.as_slice())
            .unwrap_or(&[])
    }

    fn mesh(&self, node: NodeId) -> Option<Rc<Mesh>> {
        self.node(node)?.renderable.as_ref()?.mesh.clone()
    }

    fn set_mesh(&mut self, node: NodeId, mesh: Rc<Mesh>) -> bool {
        match self.node_mut(node).and_then(|n| n.renderable.as_mut()) {
            Some(renderable) => {
                renderable.mesh = Some(mesh);
                true
            }
            None => {
                warn!("Tried to assign mesh `{}` to {:?}, which has no renderable.", mesh.name, node);
                false
            }
        }
    }

    fn destroy(&mut self, node: NodeId) {
        let Some(parent) = self.node(node).map(|n| n.parent) else {
            return;
        };
        match parent {
            Some(parent) => {
                if let Some(p) = self.node_mut(parent) {
                    p.children.retain(|&c| c != node);
                }
            }
            None => self.root_nodes.retain(|&r| r != node),
        }
        self.remove_subtree(node);
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.len())
            .field("root_nodes", &self.root_nodes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use cgmath::{Vector3, Vector4};

    use super::*;
    use crate::data_structures::{material::Material, mesh::Mesh};

    fn renderable() -> Renderable {
        Renderable::new(Material::new("m"), Rc::new(Mesh::default()))
    }

    #[test]
    fn add_node_rejects_unknown_parent() {
        let mut scene = Scene::new();
        assert!(scene.add_node(Some(NodeId(3)), "orphan", Instance::new()).is_err());
        assert!(scene.is_empty());
    }

    #[test]
    fn renderers_are_listed_depth_first_including_root() {
        let mut scene = Scene::new();
        let root = scene.add_renderer(None, "root", Instance::new(), renderable()).unwrap();
        let a = scene.add_node(Some(root), "a", Instance::new()).unwrap();
        let a1 = scene.add_renderer(Some(a), "a1", Instance::new(), renderable()).unwrap();
        let b = scene.add_renderer(Some(root), "b", Instance::new(), renderable()).unwrap();

        assert_eq!(scene.renderers_in_children(root), vec![root, a1, b]);
        assert_eq!(scene.renderers_in_children(a), vec![a1]);
    }

    #[test]
    fn world_matrix_chains_parents() {
        let mut scene = Scene::new();
        let root = scene
            .add_node(None, "root", Instance::from(Vector3::new(1.0, 0.0, 0.0)))
            .unwrap();
        let child = scene
            .add_node(Some(root), "child", Instance::from(Vector3::new(0.0, 2.0, 0.0)))
            .unwrap();
        let origin = scene.world_matrix(child).unwrap() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin, Vector4::new(1.0, 2.0, 0.0, 1.0));
        assert!(scene.world_matrix(NodeId(42)).is_none());
    }

    #[test]
    fn destroy_removes_whole_subtree() {
        let mut scene = Scene::new();
        let root = scene.add_node(None, "root", Instance::new()).unwrap();
        let a = scene.add_node(Some(root), "a", Instance::new()).unwrap();
        let a1 = scene.add_node(Some(a), "a1", Instance::new()).unwrap();
        let b = scene.add_node(Some(root), "b", Instance::new()).unwrap();

        scene.destroy(a);

        assert!(!scene.contains(a));
        assert!(!scene.contains(a1));
        assert!(scene.contains(b));
        assert_eq!(scene.node(root).unwrap().children(), &[b]);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn ancestry_follows_parent_links() {
        let mut scene = Scene::new();
        let root = scene.add_node(None, "root", Instance::new()).unwrap();
        let a = scene.add_node(Some(root), "a", Instance::new()).unwrap();
        let a1 = scene.add_node(Some(a), "a1", Instance::new()).unwrap();
        let b = scene.add_node(Some(root), "b", Instance::new()).unwrap();

        assert!(scene.is_ancestor(root, a1));
        assert!(scene.is_ancestor(a, a1));
        assert!(!scene.is_ancestor(a1, a));
        assert!(!scene.is_ancestor(b, a1));
        assert!(!scene.is_ancestor(a, a));
        assert_eq!(scene.parent(root), None);
    }

    #[test]
    fn set_mesh_needs_a_renderable() {
        let mut scene = Scene::new();
        let empty = scene.add_node(None, "empty", Instance::new()).unwrap();
        assert!(!scene.set_mesh(empty, Rc::new(Mesh::default())));
        assert!(scene.materials(empty).is_empty());
        assert!(scene.primary_material(empty).is_none());
    }
}
