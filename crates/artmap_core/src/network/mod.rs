//! A single ART network.
//!
//! F1 holds the (complement-coded) input, F2 the committed prototypes. A
//! classification is a two-phase affair:
//!
//! 1. [`Network::classify`] ranks every prototype and selects a provisional
//!    winner (or creates a new prototype when nothing resonates).
//! 2. [`Network::commit`] moves the accepted prototype toward the input.
//!
//! In between, an association layer may reject the provisional winner with
//! [`Network::match_track`], which escalates vigilance past the rejected
//! resonance and continues the search. A network that does not match-track
//! commits inside `classify`.

pub mod learning;
pub mod prototype;
pub mod resonance;
pub mod selector;

pub use learning::{VigilanceHistory, WeightUpdater};
pub use prototype::{Prototype, PrototypeStore};
pub use resonance::{ActivationRecord, ResonanceEngine};
pub use selector::{Ranking, Selection, WinnerSelector};

use crate::config::{ActivationMode, NetworkConfig};
use crate::error::{ArtError, Result};
use crate::PrototypeId;

#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) vigilance: f32,
    pub(crate) alpha: f32,
    pub(crate) input_size: f32,
    pub(crate) tracking_value: f32,
    pub(crate) learning_fraction: f32,
    pub(crate) reliability: f32,
    pub(crate) compression_count: u32,
    pub(crate) match_track: bool,
    pub(crate) complement_coding: bool,
    pub(crate) winner_take_all: bool,
    pub(crate) test_match: bool,
    pub(crate) activation_mode: ActivationMode,
    /// Short-term memory: the current input representation
    pub(crate) f1: Vec<f32>,
    /// Long-term memory
    pub(crate) store: PrototypeStore,
    pub(crate) history: VigilanceHistory,
    ranking: Ranking,
}

impl Default for Network {
    fn default() -> Self {
        Self::from_config(&NetworkConfig::default())
    }
}

impl Network {
    /// `match_track` marks a slave network in an association (or stand-alone
    /// use with best-match semantics); otherwise the network commits at once
    /// and acts as a supervisor.
    pub fn new(match_track: bool, complement_coding: bool, winner_take_all: bool) -> Self {
        Self::from_config(&NetworkConfig {
            match_track,
            complement_coding,
            winner_take_all,
            ..NetworkConfig::default()
        })
    }

    pub fn from_config(config: &NetworkConfig) -> Self {
        Self {
            vigilance: config.vigilance,
            alpha: config.alpha,
            input_size: 0.0,
            tracking_value: config.tracking_value,
            learning_fraction: config.learning_fraction,
            reliability: config.effective_reliability(),
            compression_count: 0,
            match_track: config.match_track,
            complement_coding: config.complement_coding,
            winner_take_all: config.winner_take_all,
            test_match: config.test_match,
            activation_mode: config.activation,
            f1: Vec::new(),
            store: PrototypeStore::new(),
            history: VigilanceHistory::with_capacity(config.vigilance_history),
            ranking: Ranking::default(),
        }
    }

    /// Current tunables as a config (reliability always pinned).
    pub fn config(&self) -> NetworkConfig {
        NetworkConfig {
            match_track: self.match_track,
            complement_coding: self.complement_coding,
            winner_take_all: self.winner_take_all,
            vigilance: self.vigilance,
            alpha: self.alpha,
            tracking_value: self.tracking_value,
            learning_fraction: self.learning_fraction,
            reliability: Some(self.reliability),
            vigilance_history: self.history.capacity(),
            activation: self.activation_mode,
            test_match: self.test_match,
        }
    }

    pub(crate) fn restore(
        config: &NetworkConfig,
        input_size: f32,
        compression_count: u32,
        f1: Vec<f32>,
        prototypes: Vec<Prototype>,
        history: VigilanceHistory,
    ) -> Self {
        let mut network = Self::from_config(config);
        network.input_size = input_size;
        network.compression_count = compression_count;
        network.f1 = f1;
        network.store = PrototypeStore::from_prototypes(prototypes);
        network.history = history;
        network
    }

    /// Classify one input and return the provisional (or committed) winner.
    pub fn classify(&mut self, input: &[f32]) -> Result<Selection> {
        self.ensure_wta()?;

        resonance::input_representation(input, self.complement_coding, &mut self.f1);
        self.input_size = input.len() as f32;

        let engine = ResonanceEngine {
            mode: self.activation_mode,
            alpha: self.alpha,
            complement_coding: self.complement_coding,
        };
        engine.evaluate(
            &self.f1,
            &mut self.input_size,
            &self.store,
            self.ranking.buffer(),
        );
        self.ranking.rank();

        let selection = self.select(false);
        if !self.match_track {
            self.commit();
        }
        Ok(selection)
    }

    /// Continue the search of the last `classify`.
    ///
    /// With `escalate`, the current winner was rejected: vigilance is raised
    /// to its resonance plus the tracking value and the next candidate is
    /// tried. Each escalation removes one candidate, so repeated calls end in
    /// a newly created prototype after at most one call per candidate.
    pub fn match_track(&mut self, escalate: bool) -> Result<Selection> {
        self.ensure_wta()?;
        Ok(self.select(escalate))
    }

    /// Apply the learning rule to the accepted winner and drain the ranking.
    pub fn commit(&mut self) {
        if !self.test_match {
            if let Some(&winner) = self.ranking.top() {
                let updater = WeightUpdater {
                    learning_fraction: self.learning_fraction,
                    complement_coding: self.complement_coding,
                };
                if let Ok(prototype) = self.store.get_mut(winner.id) {
                    updater.apply(prototype, &self.f1);
                }
                if self.history.is_enabled() && self.match_track {
                    self.history.push(winner.resonance - self.alpha * 10.0);
                }
                self.compression_count += 1;
            }
        }
        self.ranking.clear();
    }

    fn ensure_wta(&self) -> Result<()> {
        if self.winner_take_all {
            Ok(())
        } else {
            Err(ArtError::Unsupported("distributed (non winner-take-all) output"))
        }
    }

    fn select(&mut self, escalate: bool) -> Selection {
        let vigilance = if self.match_track {
            0.0
        } else {
            self.effective_vigilance()
        };
        let selector = WinnerSelector {
            vigilance,
            tracking_value: self.tracking_value,
        };

        match selector.search(&mut self.ranking, escalate) {
            Some(winner) => Selection::Accepted(winner.id),
            None if self.test_match => Selection::NoMatch,
            None => Selection::Created(self.store.push(self.f1.clone())),
        }
    }

    /// Stored vigilance, or the running average when a history is kept.
    pub fn effective_vigilance(&self) -> f32 {
        if self.history.is_enabled() {
            self.history.average(self.vigilance)
        } else {
            self.vigilance
        }
    }

    pub fn prototype(&self, id: PrototypeId) -> Result<&[f32]> {
        self.store.get(id)
    }

    pub fn prototypes(&self) -> &PrototypeStore {
        &self.store
    }

    pub fn prototype_count(&self) -> usize {
        self.store.len()
    }

    /// The last input as presented to F1.
    pub fn input_representation(&self) -> &[f32] {
        &self.f1
    }

    pub fn input_size(&self) -> f32 {
        self.input_size
    }

    /// Number of committed weight updates.
    pub fn compression_count(&self) -> u32 {
        self.compression_count
    }

    /// Candidates left from the last search.
    pub fn pending_candidates(&self) -> usize {
        self.ranking.len()
    }

    pub fn vigilance(&self) -> f32 {
        self.vigilance
    }

    pub fn set_vigilance(&mut self, vigilance: f32) {
        self.vigilance = vigilance;
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Larger alpha makes every node less active.
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha;
    }

    pub fn tracking_value(&self) -> f32 {
        self.tracking_value
    }

    pub fn set_tracking_value(&mut self, tracking_value: f32) {
        self.tracking_value = tracking_value;
    }

    pub fn learning_fraction(&self) -> f32 {
        self.learning_fraction
    }

    pub fn set_learning_fraction(&mut self, learning_fraction: f32) {
        self.learning_fraction = learning_fraction;
    }

    pub fn reliability(&self) -> f32 {
        self.reliability
    }

    pub fn set_reliability(&mut self, reliability: f32) {
        self.reliability = reliability;
    }

    pub fn is_supervisor(&self) -> bool {
        self.reliability == 1.0
    }

    pub fn is_match_tracking(&self) -> bool {
        self.match_track
    }

    pub fn set_match_track(&mut self, match_track: bool) {
        self.match_track = match_track;
    }

    pub fn complement_coding(&self) -> bool {
        self.complement_coding
    }

    pub fn winner_take_all(&self) -> bool {
        self.winner_take_all
    }

    pub fn set_winner_take_all(&mut self, winner_take_all: bool) {
        self.winner_take_all = winner_take_all;
    }

    pub fn test_match(&self) -> bool {
        self.test_match
    }

    /// In test mode nothing is created or learned.
    pub fn set_test_match(&mut self, test_match: bool) {
        self.test_match = test_match;
    }

    pub fn activation_mode(&self) -> ActivationMode {
        self.activation_mode
    }

    pub fn set_activation_mode(&mut self, mode: ActivationMode) {
        self.activation_mode = mode;
    }

    pub fn vigilance_history(&self) -> &VigilanceHistory {
        &self.history
    }

    pub fn set_vigilance_history_size(&mut self, size: usize) {
        self.history.set_capacity(size);
    }

    pub fn add_to_vigilance_history(&mut self, value: f32) {
        self.history.push(value);
    }

    pub fn average_vigilance(&self) -> f32 {
        self.history.average(self.vigilance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn random_input(rng: &mut ChaCha8Rng, len: usize) -> Vec<f32> {
        (0..len).map(|_| rng.gen::<f32>()).collect()
    }

    fn fuzzy_resonance(f1: &[f32], w: &[f32], m: f32) -> f32 {
        f1.iter().zip(w).map(|(a, b)| a.min(*b).abs()).sum::<f32>() / m
    }

    #[test]
    fn test_first_input_creates_then_resonates() {
        let mut net = Network::new(false, true, true);
        assert_eq!(net.classify(&[0.2, 0.7]).unwrap(), Selection::Created(0));
        assert_eq!(net.prototype(0).unwrap().len(), 4);

        assert_eq!(net.classify(&[0.2, 0.7]).unwrap(), Selection::Accepted(0));
        assert_eq!(net.prototype_count(), 1);
        assert_eq!(net.compression_count(), 1);
        assert_eq!(net.pending_candidates(), 0);
    }

    #[test]
    fn test_distant_input_gets_own_prototype() {
        let mut net = Network::new(false, true, true);
        net.set_vigilance(0.9);
        net.classify(&[0.1, 0.1]).unwrap();
        assert_eq!(net.classify(&[0.9, 0.9]).unwrap(), Selection::Created(1));
    }

    #[test]
    fn test_test_match_is_idempotent() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut net = Network::new(false, true, true);
        net.set_vigilance(0.85);
        for _ in 0..50 {
            net.classify(&random_input(&mut rng, 3)).unwrap();
        }

        net.set_test_match(true);
        let before = net.prototypes().clone();
        let count = net.compression_count();

        for _ in 0..20 {
            let probe = random_input(&mut rng, 3);
            let first = net.classify(&probe).unwrap();
            let second = net.classify(&probe).unwrap();
            assert_eq!(first, second);
            assert!(!matches!(first, Selection::Created(_)));
        }
        assert_eq!(net.prototypes(), &before);
        assert_eq!(net.compression_count(), count);
    }

    #[test]
    fn test_test_match_reports_no_match() {
        let mut net = Network::new(false, true, true);
        net.set_test_match(true);
        assert_eq!(net.classify(&[0.5, 0.5]).unwrap(), Selection::NoMatch);
        assert_eq!(net.prototype_count(), 0);
    }

    #[test]
    fn test_accepted_prototypes_meet_vigilance() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut net = Network::new(false, true, true);
        net.set_vigilance(0.8);

        for _ in 0..300 {
            let input = random_input(&mut rng, 2);
            let snapshot = net.prototypes().clone();
            if let Selection::Accepted(id) = net.classify(&input).unwrap() {
                let r = fuzzy_resonance(
                    net.input_representation(),
                    snapshot.get(id).unwrap(),
                    input.len() as f32,
                );
                assert!(r >= 0.8 - 1e-6, "accepted resonance {r} below vigilance");
            }
        }
    }

    #[test]
    fn test_prototype_count_never_decreases() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut net = Network::new(true, true, true);
        let mut last = 0;
        for i in 0..200 {
            net.classify(&random_input(&mut rng, 2)).unwrap();
            if i % 3 == 0 {
                net.match_track(true).unwrap();
            }
            net.commit();
            assert!(net.prototype_count() >= last);
            last = net.prototype_count();
        }
    }

    #[test]
    fn test_match_track_terminates_in_creation() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut net = Network::new(false, true, true);
        net.set_vigilance(0.95);
        for _ in 0..40 {
            net.classify(&random_input(&mut rng, 2)).unwrap();
        }
        let p = net.prototype_count();
        assert!(p > 1);

        net.set_match_track(true);
        let first = net.classify(&[0.5, 0.5]).unwrap();
        assert!(matches!(first, Selection::Accepted(_)));

        let mut steps = 0;
        let created = loop {
            steps += 1;
            match net.match_track(true).unwrap() {
                Selection::Accepted(_) => assert!(steps <= p),
                Selection::Created(id) => break id,
                Selection::NoMatch => panic!("not in test mode"),
            }
        };
        assert!(steps <= p);
        assert_eq!(created, p);
    }

    #[test]
    fn test_commit_learns_and_records_history() {
        let mut net = Network::new(true, true, true);
        net.set_vigilance_history_size(4);
        net.classify(&[0.6, 0.6]).unwrap();
        net.commit();
        // a freshly created prototype leaves nothing to learn
        assert_eq!(net.compression_count(), 0);

        assert_eq!(net.classify(&[0.4, 0.8]).unwrap(), Selection::Accepted(0));
        net.commit();
        assert_eq!(net.compression_count(), 1);
        let proto = net.prototype(0).unwrap();
        assert!((proto[0] - 0.4).abs() < 1e-6);
        assert!((proto[1] - 0.6).abs() < 1e-6);

        // resonance of [0.4, 0.8 | 0.6, 0.2] against [0.6, 0.6 | 0.4, 0.4]
        let expected = (0.4 + 0.6 + 0.4 + 0.2) / 2.0 - 0.01 * 10.0;
        let recorded = net.vigilance_history().values()[0];
        assert!((recorded - expected).abs() < 1e-5);
    }

    #[test]
    fn test_distributed_output_is_unsupported() {
        let mut net = Network::new(false, true, false);
        assert!(matches!(
            net.classify(&[0.3]),
            Err(ArtError::Unsupported(_))
        ));
        assert!(matches!(net.match_track(true), Err(ArtError::Unsupported(_))));
        assert_eq!(net.prototype_count(), 0);
    }

    #[test]
    fn test_config_round_trip() {
        let cfg = NetworkConfig {
            match_track: true,
            vigilance: 0.7,
            vigilance_history: 8,
            activation: ActivationMode::Fuzzy,
            ..NetworkConfig::default()
        };
        let net = Network::from_config(&cfg);
        assert_eq!(net.reliability(), 0.9);
        assert!(!net.is_supervisor());

        let back = net.config();
        assert_eq!(back.vigilance, 0.7);
        assert_eq!(back.vigilance_history, 8);
        assert_eq!(back.activation, ActivationMode::Fuzzy);
        assert_eq!(back.reliability, Some(0.9));
    }
}
