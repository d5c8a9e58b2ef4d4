use glam::DAffine3;

use crate::scene::transform::Transform;

/// A named node inside a loaded model.
///
/// Nodes are the targets clip tracks bind to (bones, sub-meshes). They are
/// stored flat in [`Model`](crate::scene::Model) and linked by parent index.
///
/// # Hierarchy
///
/// - `parent`: index of the parent node, `None` for nodes attached directly to
///   the model root
/// - `children`: indices of child nodes
#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,

    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,

    pub transform: Transform,
}

impl Node {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[usize] {
        &self.children
    }

    /// World matrix, refreshed by [`Model::update_world_matrices`](crate::scene::Model::update_world_matrices).
    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &DAffine3 {
        &self.transform.world_matrix
    }
}
