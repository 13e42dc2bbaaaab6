use crate::data_structures::scene_graph::NodeId;

/// One level of detail: the renderers drawn while this level is active.
///
/// Entries may be `None` when a renderer slot was left empty.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LodLevel {
    /// Screen height fraction below which the next level takes over.
    pub screen_relative_height: f32,
    pub renderers: Vec<Option<NodeId>>,
}

/// Ordered LOD levels, highest fidelity first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LodGroup {
    pub levels: Vec<LodLevel>,
}

impl LodGroup {
    pub fn new(levels: Vec<LodLevel>) -> Self {
        Self { levels }
    }

    pub fn lod_count(&self) -> usize {
        self.levels.len()
    }

    pub fn push_level(&mut self, screen_relative_height: f32, renderers: Vec<NodeId>) {
        self.levels.push(LodLevel {
            screen_relative_height,
            renderers: renderers.into_iter().map(Some).collect(),
        });
    }
}
