//! Multi-network classification through the map field (ARTMAP).
//!
//! Each round takes a view with one slot per network. Slots carrying an
//! input are classified by their network; the resulting classes vote for map
//! nodes, a [`Resolution`] is chosen from the vote and applied to the map
//! field, and finally empty slots are filled by projecting the winning node
//! back into their network.
//!
//! Networks with reliability 1.0 act as supervisors: when they agree on a
//! node, the other networks are match-tracked until their class points at
//! that node too (or a fresh class is created for it).

use std::collections::BTreeMap;

use log::{debug, trace};

use crate::config::{MapFieldConfig, Verbosity};
use crate::error::{ArtError, Result};
use crate::mapfield::{MapField, Popularity, PopularityResolver};
use crate::network::{Network, Selection};
use crate::{ClassId, MapNodeId, NetworkId};

/// What the supervisors of a round agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Consensus {
    NoSupervisors,
    /// Every supervisor's class favours this node (`None` = all unlinked)
    Agree(Option<MapNodeId>),
    Disagree,
}

/// Facts about one round that drive the resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSummary {
    /// Networks that produced a class
    pub inputs: usize,
    /// Popularity winner and its supporter count
    pub winner: Option<(MapNodeId, usize)>,
    pub newcomers: usize,
    /// No newcomer network is linked to the winner yet
    pub attachable: bool,
    pub consensus: Consensus,
}

/// How the map field changes after a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Single input: nothing to associate
    Observe,
    /// Every input already supports the node
    Strengthen(MapNodeId),
    /// Newcomers join the node the others agree on
    Attach(MapNodeId),
    CreateNode,
    /// Match-track the others toward the supervisors' node
    Supervise(Option<MapNodeId>),
}

/// Pure decision table, evaluated top to bottom.
pub fn decide(round: &RoundSummary) -> Resolution {
    if round.inputs <= 1 {
        return Resolution::Observe;
    }
    if let Some((node, support)) = round.winner {
        if support == round.inputs {
            return Resolution::Strengthen(node);
        }
    }
    if round.newcomers == round.inputs {
        return Resolution::CreateNode;
    }
    if let Some((node, support)) = round.winner {
        if round.newcomers > 0 && round.newcomers == round.inputs - support {
            return if round.attachable {
                Resolution::Attach(node)
            } else {
                Resolution::CreateNode
            };
        }
    }
    if round.newcomers > 0 {
        return Resolution::CreateNode;
    }
    match round.consensus {
        Consensus::Agree(target) => Resolution::Supervise(target),
        Consensus::Disagree | Consensus::NoSupervisors => Resolution::CreateNode,
    }
}

/// Vote of one class across a batch of views.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScore {
    pub class: ClassId,
    pub popularity: usize,
    pub weight: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiViewOutcome {
    /// Views in which some map node was activated
    pub found: usize,
    /// Winning class per slot absent from the first view
    pub classes: Vec<Option<ClassId>>,
    /// Aggregated popularity of each winning class
    pub support: Vec<usize>,
    /// Every class that received votes, ascending id
    pub scores: Vec<Vec<ClassScore>>,
}

/// Binds an ordered set of networks to a map field for the duration of a
/// borrow.
pub struct AssociationManager<'a> {
    networks: &'a mut [Network],
    map: MapField,
}

impl<'a> AssociationManager<'a> {
    pub fn new(networks: &'a mut [Network], learning_fraction: f32) -> Self {
        Self {
            networks,
            map: MapField::new(learning_fraction),
        }
    }

    pub fn with_config(networks: &'a mut [Network], config: &MapFieldConfig) -> Self {
        Self {
            networks,
            map: MapField::from_config(config),
        }
    }

    /// Reattach a previously trained (e.g. loaded) map field.
    pub fn with_map_field(networks: &'a mut [Network], map: MapField) -> Result<Self> {
        let referenced = map
            .node_edges
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
            .max(map.network_count());
        if referenced > networks.len() {
            return Err(ArtError::NetworkNotFound {
                id: referenced - 1,
                count: networks.len(),
            });
        }
        Ok(Self { networks, map })
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    pub fn network(&self, id: NetworkId) -> Result<&Network> {
        let count = self.networks.len();
        self.networks
            .get(id)
            .ok_or(ArtError::NetworkNotFound { id, count })
    }

    pub fn network_mut(&mut self, id: NetworkId) -> Result<&mut Network> {
        let count = self.networks.len();
        self.networks
            .get_mut(id)
            .ok_or(ArtError::NetworkNotFound { id, count })
    }

    pub fn map_field(&self) -> &MapField {
        &self.map
    }

    pub fn map_field_mut(&mut self) -> &mut MapField {
        &mut self.map
    }

    pub fn into_map_field(self) -> MapField {
        self.map
    }

    fn validate(&self, view: &[Option<&[f32]>]) -> Result<()> {
        if view.len() != self.networks.len() {
            return Err(ArtError::ViewLength {
                expected: self.networks.len(),
                got: view.len(),
            });
        }
        let distributed = view
            .iter()
            .zip(self.networks.iter())
            .any(|(input, network)| input.is_some() && !network.winner_take_all());
        if distributed {
            return Err(ArtError::Unsupported("distributed (non winner-take-all) output"));
        }
        Ok(())
    }

    /// Classify one view. Slots with input report their final class, empty
    /// slots the class predicted through the map field (if any).
    pub fn classify(&mut self, view: &[Option<&[f32]>]) -> Result<Vec<Option<ClassId>>> {
        self.validate(view)?;

        let mut classes: Vec<Option<ClassId>> = vec![None; view.len()];
        let with_input: Vec<NetworkId> = (0..view.len()).filter(|&s| view[s].is_some()).collect();
        if with_input.is_empty() {
            self.map.input_class_count = 0;
            return Ok(classes);
        }

        let supervisors: Vec<NetworkId> = with_input
            .iter()
            .copied()
            .filter(|&s| self.networks[s].is_supervisor())
            .collect();

        // Without a supervisor nobody can grade a plural round.
        let unsupervised =
            supervisors.is_empty() && (with_input.len() > 1 || self.map.force_vigilance);
        let mut suspended = Vec::new();

        for &slot in &with_input {
            let network = &mut self.networks[slot];
            if unsupervised && network.is_match_tracking() {
                network.set_match_track(false);
                suspended.push(slot);
            }
            if let Some(input) = view[slot] {
                classes[slot] = network.classify(input)?.class();
            }
        }

        let mut live: Vec<(NetworkId, ClassId)> = with_input
            .iter()
            .filter_map(|&s| classes[s].map(|c| (s, c)))
            .collect();
        for &(network, class) in &live {
            self.map.ensure_class(network, class);
        }
        self.map.input_class_count = live.len();
        let supervisors: Vec<NetworkId> = supervisors
            .into_iter()
            .filter(|s| classes[*s].is_some())
            .collect();

        let popularity = PopularityResolver::resolve(&self.map, &live, &supervisors);
        let round = self.summarize(&live, &supervisors, &popularity);
        let resolution = decide(&round);

        if self.map.verbosity >= Verbosity::Decisions {
            debug!(
                "round: inputs={} supervisors={:?} newcomers={} winner={:?} -> {:?}",
                round.inputs, supervisors, round.newcomers, round.winner, resolution
            );
        }
        if self.map.verbosity >= Verbosity::Full {
            trace!("popularity: {:?}", popularity.nodes);
        }

        let nodes_before = self.map.node_count();
        let projection = self.apply(resolution, &mut live, &supervisors, &popularity)?;

        for &slot in &with_input {
            classes[slot] = None;
        }
        for &(network, class) in &live {
            classes[network] = Some(class);
        }

        for &slot in &with_input {
            self.networks[slot].commit();
        }
        for slot in suspended {
            self.networks[slot].set_match_track(true);
        }

        if self.map.node_count() == nodes_before {
            if let Some(node) = projection {
                for slot in (0..view.len()).filter(|&s| view[s].is_none()) {
                    classes[slot] = self.map.strongest_class(slot, node)?;
                }
            }
        }

        if self.map.verbosity >= Verbosity::Full {
            debug!("{}", self.describe());
        }
        Ok(classes)
    }

    fn summarize(
        &self,
        live: &[(NetworkId, ClassId)],
        supervisors: &[NetworkId],
        popularity: &Popularity,
    ) -> RoundSummary {
        let winner = popularity.winner.map(|w| (w.node, w.count));

        let attachable = match winner {
            Some((node, _)) => live
                .iter()
                .zip(&popularity.newcomers)
                .filter(|(_, &new)| new)
                .all(|(&(network, _), _)| !self.map.node_has_network(node, network)),
            None => false,
        };

        let consensus = if supervisors.is_empty() {
            Consensus::NoSupervisors
        } else {
            let favoured: Vec<Option<MapNodeId>> = live
                .iter()
                .zip(&popularity.strongest)
                .filter(|((network, _), _)| supervisors.contains(network))
                .map(|(_, node)| *node)
                .collect();
            match favoured.split_first() {
                Some((first, rest)) if rest.iter().all(|n| n == first) => {
                    Consensus::Agree(*first)
                }
                _ => Consensus::Disagree,
            }
        };

        RoundSummary {
            inputs: live.len(),
            winner,
            newcomers: popularity.newcomer_count(),
            attachable,
            consensus,
        }
    }

    /// Apply a resolution to the map field. Returns the node to project
    /// empty slots from.
    fn apply(
        &mut self,
        resolution: Resolution,
        live: &mut Vec<(NetworkId, ClassId)>,
        supervisors: &[NetworkId],
        popularity: &Popularity,
    ) -> Result<Option<MapNodeId>> {
        match resolution {
            Resolution::Observe => Ok(popularity.winner.map(|w| w.node)),
            Resolution::Strengthen(node) | Resolution::Attach(node) => {
                self.map.strengthen(live, node)?;
                Ok(Some(node))
            }
            Resolution::CreateNode => {
                let node = self.map.create_node_from(live)?;
                Ok(Some(node))
            }
            Resolution::Supervise(target) => {
                self.track_toward(target, live, supervisors)?;
                match target {
                    Some(node) => {
                        self.map.strengthen(live, node)?;
                        Ok(Some(node))
                    }
                    None => {
                        let node = self.map.create_node_from(live)?;
                        Ok(Some(node))
                    }
                }
            }
        }
    }

    /// Match-track every non-supervisor until its class favours `target`
    /// (or is unlinked). Networks that find no match at all leave the round.
    fn track_toward(
        &mut self,
        target: Option<MapNodeId>,
        live: &mut Vec<(NetworkId, ClassId)>,
        supervisors: &[NetworkId],
    ) -> Result<()> {
        let mut kept = Vec::with_capacity(live.len());

        for &(network, class) in live.iter() {
            if supervisors.contains(&network) {
                kept.push((network, class));
                continue;
            }

            let mut class = Some(class);
            let mut node = class.and_then(|c| self.map.strongest_node(network, c));
            while node != target {
                let Some(current) = class else { break };
                if node.is_none() {
                    break;
                }
                let selection = self.networks[network].match_track(true)?;
                if self.map.verbosity >= Verbosity::Decisions {
                    debug!(
                        "network {network}: class {current} favours {node:?}, not {target:?}; retried -> {selection:?}"
                    );
                }
                class = selection.class();
                node = match selection {
                    Selection::Accepted(c) => self.map.strongest_node(network, c),
                    Selection::Created(c) => {
                        self.map.ensure_class(network, c);
                        None
                    }
                    Selection::NoMatch => None,
                };
            }

            if let Some(class) = class {
                kept.push((network, class));
            }
        }

        *live = kept;
        Ok(())
    }

    /// Classify a batch of views of the same object and vote on the classes
    /// of the slots missing from the first view.
    ///
    /// Networks learn as in a normal round but the map field is only read.
    pub fn classify_views(&mut self, views: &[&[Option<&[f32]>]]) -> Result<MultiViewOutcome> {
        for view in views {
            self.validate(view)?;
        }

        let slots = self.networks.len();
        let mut found = 0;
        let mut totals: BTreeMap<MapNodeId, (usize, f32)> = BTreeMap::new();

        for view in views {
            let mut live = Vec::new();
            for (slot, input) in view.iter().enumerate() {
                let Some(input) = input else { continue };
                let network = &mut self.networks[slot];
                let selection = network.classify(input)?;
                network.commit();
                if let Some(class) = selection.class() {
                    self.map.ensure_class(slot, class);
                    live.push((slot, class));
                }
            }

            let popularity = PopularityResolver::resolve(&self.map, &live, &[]);
            if popularity.winner.is_some() {
                found += 1;
            }
            for support in popularity.nodes.iter().filter(|s| s.count > 0) {
                let entry = totals.entry(support.node).or_insert((0, 0.0));
                entry.0 += support.count;
                entry.1 += support.total_weight;
            }
        }

        let mut outcome = MultiViewOutcome {
            found,
            classes: vec![None; slots],
            support: vec![0; slots],
            scores: vec![Vec::new(); slots],
        };
        let Some(first) = views.first() else {
            return Ok(outcome);
        };

        for slot in (0..slots).filter(|&s| first[s].is_none()) {
            let mut table: BTreeMap<ClassId, ClassScore> = BTreeMap::new();
            for (&node, &(count, weight)) in &totals {
                if let Some(class) = self.map.strongest_class(slot, node)? {
                    let score = table.entry(class).or_insert(ClassScore {
                        class,
                        popularity: 0,
                        weight: 0.0,
                    });
                    score.popularity += count;
                    score.weight += weight;
                }
            }

            let mut best: Option<ClassScore> = None;
            for score in table.values() {
                let better = best.map_or(true, |b| {
                    score.popularity > b.popularity
                        || (score.popularity == b.popularity && score.weight > b.weight)
                });
                if better {
                    best = Some(*score);
                }
            }
            if let Some(best) = best {
                outcome.classes[slot] = Some(best.class);
                outcome.support[slot] = best.popularity;
            }
            outcome.scores[slot] = table.into_values().collect();
        }

        Ok(outcome)
    }

    /// Human-readable dump of every map node and the classes linked to it.
    pub fn describe(&self) -> String {
        let mut out = String::from("ARTMAP\n");
        for node in 0..self.map.node_count() {
            out.push_str(&format!("map node {node}\n"));
            for (network_id, network) in self.networks.iter().enumerate() {
                let edges = match self.map.node_edges(node, network_id) {
                    Ok(edges) if !edges.is_empty() => edges,
                    _ => continue,
                };
                out.push_str(&format!("  network {network_id}\n"));
                for edge in edges {
                    let pattern = network
                        .prototype(edge.class)
                        .map(|p| {
                            let shown = if p.len() > 1 { &p[..p.len() / 2] } else { p };
                            shown
                                .iter()
                                .map(|v| format!("{v:.2}"))
                                .collect::<Vec<_>>()
                                .join(" ")
                        })
                        .unwrap_or_default();
                    out.push_str(&format!(
                        "    class {} pattern [{}] weight {:.2}\n",
                        edge.class, pattern, edge.weight
                    ));
                }
            }
        }
        out
    }
}
