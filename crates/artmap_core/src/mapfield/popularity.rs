//! Aggregation of per-network activations into a single winning map node.

use std::collections::BTreeMap;

use crate::mapfield::MapField;
use crate::{ClassId, MapNodeId, NetworkId};

/// Support a map node received in one round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeSupport {
    pub node: MapNodeId,
    /// Networks whose class activates the node with positive weight
    pub count: usize,
    pub total_weight: f32,
}

impl NodeSupport {
    /// Higher count wins, then higher weight. Equal support keeps `self`.
    fn beats(&self, other: &NodeSupport) -> bool {
        self.count > other.count
            || (self.count == other.count && self.total_weight > other.total_weight)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Popularity {
    /// Every activated node, ascending id
    pub nodes: Vec<NodeSupport>,
    pub winner: Option<NodeSupport>,
    /// Per contribution, the node its class favours most
    pub strongest: Vec<Option<MapNodeId>>,
    /// Per contribution, whether its class is unlinked (and not exempt)
    pub newcomers: Vec<bool>,
}

impl Popularity {
    pub fn newcomer_count(&self) -> usize {
        self.newcomers.iter().filter(|&&n| n).count()
    }

    pub fn winner_support(&self) -> usize {
        self.winner.map_or(0, |w| w.count)
    }
}

pub struct PopularityResolver;

impl PopularityResolver {
    /// Tally the activation of every node by the given (network, class)
    /// contributions.
    ///
    /// The winner has the most supporting networks, then the largest total
    /// weight, then the lowest node id. An unlinked class is flagged as a
    /// newcomer unless its network is the only supervisor of the round.
    pub fn resolve(
        map: &MapField,
        contributions: &[(NetworkId, ClassId)],
        supervisors: &[NetworkId],
    ) -> Popularity {
        let mut tally: BTreeMap<MapNodeId, NodeSupport> = BTreeMap::new();
        let mut strongest = Vec::with_capacity(contributions.len());
        let mut newcomers = Vec::with_capacity(contributions.len());

        for &(network, class) in contributions {
            let edges = map.class_edges(network, class);
            for edge in edges {
                let entry = tally.entry(edge.node).or_insert(NodeSupport {
                    node: edge.node,
                    count: 0,
                    total_weight: 0.0,
                });
                if edge.weight > 0.0 {
                    entry.count += 1;
                }
                entry.total_weight += edge.weight;
            }

            strongest.push(map.strongest_node(network, class));
            let lone_supervisor = supervisors.len() == 1 && supervisors[0] == network;
            newcomers.push(edges.is_empty() && !lone_supervisor);
        }

        let nodes: Vec<NodeSupport> = tally.into_values().collect();
        let mut winner: Option<NodeSupport> = None;
        for support in nodes.iter().filter(|s| s.count > 0) {
            if winner.map_or(true, |w| support.beats(&w)) {
                winner = Some(*support);
            }
        }

        Popularity {
            nodes,
            winner,
            strongest,
            newcomers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with_nodes(n: usize) -> MapField {
        let mut map = MapField::new(1.0);
        for _ in 0..n {
            map.create_node();
        }
        map
    }

    #[test]
    fn test_most_supporters_wins() {
        let mut map = map_with_nodes(2);
        map.reinforce(0, 0, 0, 5.0).unwrap();
        map.reinforce(0, 0, 1, 1.0).unwrap();
        map.reinforce(1, 0, 1, 1.0).unwrap();

        let p = PopularityResolver::resolve(&map, &[(0, 0), (1, 0)], &[]);
        let w = p.winner.unwrap();
        assert_eq!(w.node, 1);
        assert_eq!(w.count, 2);
        assert_eq!(p.strongest, vec![Some(0), Some(1)]);
    }

    #[test]
    fn test_equal_support_prefers_heavier_node() {
        let mut map = map_with_nodes(2);
        map.reinforce(0, 0, 0, 1.0).unwrap();
        map.reinforce(1, 0, 1, 2.0).unwrap();

        let p = PopularityResolver::resolve(&map, &[(0, 0), (1, 0)], &[]);
        assert_eq!(p.winner.unwrap().node, 1);
        assert_eq!(p.winner_support(), 1);
    }

    #[test]
    fn test_full_tie_prefers_lowest_node() {
        let mut map = map_with_nodes(3);
        map.reinforce(0, 0, 2, 1.0).unwrap();
        map.reinforce(1, 0, 1, 1.0).unwrap();

        let p = PopularityResolver::resolve(&map, &[(0, 0), (1, 0)], &[]);
        assert_eq!(p.winner.unwrap().node, 1);
        let ids: Vec<_> = p.nodes.iter().map(|s| s.node).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_unlinked_classes_are_newcomers() {
        let mut map = map_with_nodes(1);
        map.reinforce(0, 0, 0, 1.0).unwrap();

        let p = PopularityResolver::resolve(&map, &[(0, 0), (1, 3)], &[]);
        assert_eq!(p.newcomers, vec![false, true]);
        assert_eq!(p.newcomer_count(), 1);
        assert_eq!(p.strongest, vec![Some(0), None]);
    }

    #[test]
    fn test_lone_supervisor_is_never_new() {
        let map = map_with_nodes(0);

        let alone = PopularityResolver::resolve(&map, &[(0, 0), (1, 0)], &[1]);
        assert_eq!(alone.newcomers, vec![true, false]);

        let shared = PopularityResolver::resolve(&map, &[(0, 0), (1, 0)], &[0, 1]);
        assert_eq!(shared.newcomer_count(), 2);
        assert!(shared.winner.is_none());
    }
}
