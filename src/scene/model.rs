use glam::DAffine3;
use uuid::Uuid;

use crate::scene::node::Node;
use crate::scene::transform::Transform;

/// How a model's authored scale relates to world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    /// Scale is applied as-is in world units.
    #[default]
    Scene,
    /// Scale is in meters; the effective scale is multiplied by the
    /// units-per-meter factor at the model's current latitude.
    Meters,
}

/// A fully constructed scene-graph node handed over by a model loader.
///
/// The root [`Transform`] places the whole model in world space; the named
/// [`Node`]s below it are what animation clips drive. Every model carries a
/// stable identity so that enrolling the same model twice is detectable.
#[derive(Debug, Clone)]
pub struct Model {
    id: Uuid,
    pub name: String,
    pub units: Units,
    pub transform: Transform,
    nodes: Vec<Node>,
}

impl Model {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            units: Units::Scene,
            transform: Transform::new(),
            nodes: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Appends a node and returns its index.
    ///
    /// `parent` must refer to an already added node; anything else attaches
    /// the node directly to the model root.
    pub fn add_node(&mut self, mut node: Node, parent: Option<usize>) -> usize {
        let index = self.nodes.len();

        node.parent = match parent {
            Some(p) if p < index => Some(p),
            Some(p) => {
                log::warn!(
                    "Model '{}': parent index {p} for node '{}' does not exist yet, attaching to root",
                    self.name,
                    node.name
                );
                None
            }
            None => None,
        };

        if let Some(p) = node.parent {
            self.nodes[p].children.push(index);
        }

        self.nodes.push(node);
        index
    }

    #[inline]
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    #[must_use]
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    #[inline]
    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    /// Finds the first node with the given name.
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.name == name)
    }

    /// Refreshes local and world matrices for the root and every node.
    ///
    /// Parents always precede their children in storage, so a single forward
    /// pass sees each parent's world matrix before its children need it.
    pub fn update_world_matrices(&mut self) {
        let root_changed = self.transform.update_local_matrix();
        if root_changed {
            self.transform.world_matrix = self.transform.local_matrix;
        }

        let root_world = self.transform.world_matrix;
        let mut changed = vec![false; self.nodes.len()];

        for i in 0..self.nodes.len() {
            let local_changed = self.nodes[i].transform.update_local_matrix();

            let (parent_world, parent_changed): (DAffine3, bool) = match self.nodes[i].parent {
                Some(p) => (self.nodes[p].transform.world_matrix, changed[p]),
                None => (root_world, root_changed),
            };

            if local_changed || parent_changed {
                let node = &mut self.nodes[i];
                node.transform.world_matrix = parent_world * node.transform.local_matrix;
                changed[i] = true;
            }
        }
    }
}
