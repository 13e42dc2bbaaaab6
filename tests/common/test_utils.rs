#![allow(dead_code)]

use std::rc::Rc;

use ngin_tools::{
    NodeId, Vector3,
    data_structures::{
        instance::Instance,
        material::MaterialRef,
        mesh::{Mesh, ModelVertex},
        scene_graph::{Renderable, Scene},
    },
};

pub fn init() {
    ngin_tools::init_logging();
}

/// Unit cube centred on the origin, one sub-mesh.
pub fn cube(name: &str) -> Rc<Mesh> {
    let mut vertices = Vec::with_capacity(8);
    for i in 0..8 {
        let x = if i & 1 == 0 { -0.5 } else { 0.5 };
        let y = if i & 2 == 0 { -0.5 } else { 0.5 };
        let z = if i & 4 == 0 { -0.5 } else { 0.5 };
        vertices.push(ModelVertex::new([x, y, z], [x * 2.0, y * 2.0, z * 2.0], [0.0, 0.0]));
    }
    #[rustfmt::skip]
    let indices = vec![
        0, 2, 1, 1, 2, 3, // -z
        4, 5, 6, 5, 7, 6, // +z
        0, 1, 4, 1, 5, 4, // -y
        2, 6, 3, 3, 6, 7, // +y
        0, 4, 2, 2, 4, 6, // -x
        1, 3, 5, 3, 7, 5, // +x
    ];
    Rc::new(Mesh::new(name, vertices, indices))
}

/// Cube whose two halves are separate sub-meshes, for renderers with two material slots.
pub fn split_cube(name: &str) -> Rc<Mesh> {
    let mut mesh = (*cube(name)).clone();
    let second = mesh.sub_meshes[0].indices.split_off(18);
    mesh.sub_meshes.push(ngin_tools::data_structures::mesh::SubMesh { indices: second });
    Rc::new(mesh)
}

pub fn at(x: f32, y: f32, z: f32) -> Instance {
    Instance::from(Vector3::new(x, y, z))
}

pub fn add_cube(
    scene: &mut Scene,
    parent: Option<NodeId>,
    name: &str,
    local: Instance,
    material: &MaterialRef,
) -> NodeId {
    scene
        .add_renderer(parent, name, local, Renderable::new(material.clone(), cube(name)))
        .expect("parent exists")
}

pub fn assert_close(actual: Vector3<f32>, expected: Vector3<f32>) {
    let diff = actual - expected;
    assert!(
        diff.x.abs() < 1e-5 && diff.y.abs() < 1e-5 && diff.z.abs() < 1e-5,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}
