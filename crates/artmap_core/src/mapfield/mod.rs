//! The map field: weighted associations between classes of different
//! networks.
//!
//! Every map node groups at most one edge per (network, class) pair. Edges
//! are indexed twice so both directions are cheap:
//!
//! ```text
//! class_edges[network][class] -> [(node, w), ...]
//! node_edges[node][network]   -> [(class, w), ...]
//! ```
//!
//! Weights only ever grow (Hebbian accumulation) and nodes are never
//! removed, so a [`MapNodeId`] stays valid for the lifetime of the field.

pub mod popularity;

pub use popularity::{NodeSupport, Popularity, PopularityResolver};

use crate::config::{MapFieldConfig, Verbosity};
use crate::error::{ArtError, Result};
use crate::{ClassId, MapNodeId, NetworkId};

/// Edge as seen from a class: the node it supports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeEdge {
    pub node: MapNodeId,
    pub weight: f32,
}

/// Edge as seen from a node: the class supporting it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassEdge {
    pub class: ClassId,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapField {
    pub(crate) class_edges: Vec<Vec<Vec<NodeEdge>>>,
    pub(crate) node_edges: Vec<Vec<Vec<ClassEdge>>>,
    pub(crate) learning_fraction: f32,
    pub(crate) vigilance: f32,
    /// Live inputs of the last round
    pub(crate) input_class_count: usize,
    pub(crate) force_vigilance: bool,
    pub(crate) verbosity: Verbosity,
}

impl Default for MapField {
    fn default() -> Self {
        Self::from_config(&MapFieldConfig::default())
    }
}

impl MapField {
    pub fn new(learning_fraction: f32) -> Self {
        Self::from_config(&MapFieldConfig {
            learning_fraction,
            ..MapFieldConfig::default()
        })
    }

    pub fn from_config(config: &MapFieldConfig) -> Self {
        Self {
            class_edges: Vec::new(),
            node_edges: Vec::new(),
            learning_fraction: config.learning_fraction,
            vigilance: config.vigilance,
            input_class_count: 0,
            force_vigilance: config.force_vigilance,
            verbosity: config.verbosity,
        }
    }

    pub fn config(&self) -> MapFieldConfig {
        MapFieldConfig {
            learning_fraction: self.learning_fraction,
            vigilance: self.vigilance,
            force_vigilance: self.force_vigilance,
            verbosity: self.verbosity,
        }
    }

    pub fn node_count(&self) -> usize {
        self.node_edges.len()
    }

    /// Networks with at least one class row.
    pub fn network_count(&self) -> usize {
        self.class_edges.len()
    }

    pub fn class_count(&self, network: NetworkId) -> usize {
        self.class_edges.get(network).map_or(0, Vec::len)
    }

    /// Allocate an empty map node.
    pub fn create_node(&mut self) -> MapNodeId {
        self.node_edges.push(Vec::new());
        self.node_edges.len() - 1
    }

    /// Make sure the class has a row, possibly empty.
    pub fn ensure_class(&mut self, network: NetworkId, class: ClassId) {
        if self.class_edges.len() <= network {
            self.class_edges.resize_with(network + 1, Vec::new);
        }
        let rows = &mut self.class_edges[network];
        if rows.len() <= class {
            rows.resize_with(class + 1, Vec::new);
        }
    }

    pub fn has_class(&self, network: NetworkId, class: ClassId) -> bool {
        class < self.class_count(network)
    }

    /// Edges leaving a class; empty for classes never seen.
    pub fn class_edges(&self, network: NetworkId, class: ClassId) -> &[NodeEdge] {
        self.class_edges
            .get(network)
            .and_then(|rows| rows.get(class))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Edges arriving at a node from one network.
    pub fn node_edges(&self, node: MapNodeId, network: NetworkId) -> Result<&[ClassEdge]> {
        let per_network = self.node(node)?;
        Ok(per_network.get(network).map(Vec::as_slice).unwrap_or(&[]))
    }

    fn node(&self, node: MapNodeId) -> Result<&Vec<Vec<ClassEdge>>> {
        self.node_edges.get(node).ok_or(ArtError::MapNodeNotFound {
            id: node,
            count: self.node_edges.len(),
        })
    }

    /// Whether the class has no association at all.
    pub fn is_unlinked(&self, network: NetworkId, class: ClassId) -> bool {
        self.class_edges(network, class).is_empty()
    }

    /// Add `amount` to the edge between a class and a node, creating the edge
    /// at zero first if needed. Both index directions are updated.
    pub fn reinforce(
        &mut self,
        network: NetworkId,
        class: ClassId,
        node: MapNodeId,
        amount: f32,
    ) -> Result<()> {
        let count = self.node_edges.len();
        let per_network = self
            .node_edges
            .get_mut(node)
            .ok_or(ArtError::MapNodeNotFound { id: node, count })?;
        if per_network.len() <= network {
            per_network.resize_with(network + 1, Vec::new);
        }
        let edges = &mut per_network[network];
        match edges.iter().position(|e| e.class == class) {
            Some(i) => edges[i].weight += amount,
            None => edges.push(ClassEdge {
                class,
                weight: amount,
            }),
        }

        self.ensure_class(network, class);
        let row = &mut self.class_edges[network][class];
        match row.iter().position(|e| e.node == node) {
            Some(i) => row[i].weight += amount,
            None => row.push(NodeEdge {
                node,
                weight: amount,
            }),
        }
        Ok(())
    }

    /// Allocate a node linked to every given class at the learning fraction.
    pub fn create_node_from(&mut self, classes: &[(NetworkId, ClassId)]) -> Result<MapNodeId> {
        let node = self.create_node();
        let amount = self.learning_fraction;
        for &(network, class) in classes {
            self.reinforce(network, class, node, amount)?;
        }
        Ok(node)
    }

    /// Link (or strengthen) every given class to an existing node.
    pub fn strengthen(&mut self, classes: &[(NetworkId, ClassId)], node: MapNodeId) -> Result<()> {
        let amount = self.learning_fraction;
        for &(network, class) in classes {
            self.reinforce(network, class, node, amount)?;
        }
        Ok(())
    }

    /// Weight of a single edge, 0 when absent.
    pub fn edge_weight(&self, network: NetworkId, class: ClassId, node: MapNodeId) -> f32 {
        self.class_edges(network, class)
            .iter()
            .find(|e| e.node == node)
            .map_or(0.0, |e| e.weight)
    }

    /// Activation of every node by one class, ascending node id.
    pub fn activation(&self, network: NetworkId, class: ClassId) -> Vec<NodeEdge> {
        let mut edges = self.class_edges(network, class).to_vec();
        edges.sort_by_key(|e| e.node);
        edges
    }

    /// Node holding the heaviest edge of a class. Ties go to the lowest id.
    pub fn strongest_node(&self, network: NetworkId, class: ClassId) -> Option<MapNodeId> {
        strongest(
            self.class_edges(network, class)
                .iter()
                .map(|e| (e.node, e.weight)),
        )
    }

    /// Class of `network` holding the heaviest edge into a node. Ties go to
    /// the lowest class id.
    pub fn strongest_class(&self, network: NetworkId, node: MapNodeId) -> Result<Option<ClassId>> {
        let edges = self.node_edges(node, network)?;
        Ok(strongest(edges.iter().map(|e| (e.class, e.weight))))
    }

    /// Whether any class of `network` is linked to the node.
    pub fn node_has_network(&self, node: MapNodeId, network: NetworkId) -> bool {
        self.node_edges(node, network)
            .map(|edges| !edges.is_empty())
            .unwrap_or(false)
    }

    /// Both index directions describe the same edge set, once each.
    pub fn is_consistent(&self) -> bool {
        let mut forward = 0usize;
        for (network, rows) in self.class_edges.iter().enumerate() {
            for (class, edges) in rows.iter().enumerate() {
                for (i, edge) in edges.iter().enumerate() {
                    if edges[..i].iter().any(|e| e.node == edge.node) {
                        return false;
                    }
                    let Ok(back) = self.node_edges(edge.node, network) else {
                        return false;
                    };
                    let matching: Vec<_> = back.iter().filter(|e| e.class == class).collect();
                    if matching.len() != 1 || matching[0].weight != edge.weight {
                        return false;
                    }
                    forward += 1;
                }
            }
        }

        let backward: usize = self
            .node_edges
            .iter()
            .flat_map(|per_network| per_network.iter())
            .map(Vec::len)
            .sum();
        forward == backward
    }

    pub fn learning_fraction(&self) -> f32 {
        self.learning_fraction
    }

    pub fn set_learning_fraction(&mut self, learning_fraction: f32) {
        self.learning_fraction = learning_fraction;
    }

    pub fn vigilance(&self) -> f32 {
        self.vigilance
    }

    pub fn set_vigilance(&mut self, vigilance: f32) {
        self.vigilance = vigilance;
    }

    pub fn input_class_count(&self) -> usize {
        self.input_class_count
    }

    pub fn force_vigilance(&self) -> bool {
        self.force_vigilance
    }

    pub fn set_force_vigilance(&mut self, force_vigilance: bool) {
        self.force_vigilance = force_vigilance;
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }
}

fn strongest(edges: impl Iterator<Item = (usize, f32)>) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (id, weight) in edges {
        best = match best {
            Some((best_id, best_w))
                if best_w > weight || (best_w == weight && best_id < id) =>
            {
                Some((best_id, best_w))
            }
            _ => Some((id, weight)),
        };
    }
    best.map(|(id, _)| id)
}
