//! Materials shared between renderables.
//!
//! Renderables hold `MaterialRef`s. Two renderables use "the same" material
//! only when they point at the same allocation; two materials with equal
//! fields are still distinct.

use std::rc::Rc;

/// Shared handle to a material.
pub type MaterialRef = Rc<Material>;

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
}

impl Material {
    pub fn new(name: &str) -> MaterialRef {
        Rc::new(Self {
            name: name.to_string(),
            base_color: [1.0, 1.0, 1.0, 1.0],
        })
    }
}

/// Identity comparison for optional material slots. Two empty slots are equal.
pub fn same_material(a: Option<&MaterialRef>, b: Option<&MaterialRef>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}
