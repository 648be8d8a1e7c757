use serde::{Deserialize, Serialize};

#[cfg(feature = "cli")]
use clap::{Args, ValueEnum};

/// How the activation `T` of a prototype is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum ActivationMode {
    /// `T = |A ^ W| + (1 - alpha)(M - |W|)`, kept only when `T > alpha * M`
    #[default]
    Default,
    /// `T = |A ^ W| / (alpha + |W|)`, always kept
    Fuzzy,
}

/// Amount of per-round detail the association layer emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(ValueEnum))]
pub enum Verbosity {
    /// Nothing per round
    #[default]
    Quiet,
    /// The chosen resolution and match-track retries
    Decisions,
    /// Decisions plus the popularity table and a map dump
    Full,
}

/// Tunables of a single ART network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Args))]
#[serde(default)]
pub struct NetworkConfig {
    /// Participate in match tracking (slave network) instead of committing at once
    #[cfg_attr(feature = "cli", arg(long))]
    pub match_track: bool,

    /// Complement-code inputs as (x, 1 - x) pairs
    #[cfg_attr(feature = "cli", arg(long, default_value_t = true, action = clap::ArgAction::Set))]
    pub complement_coding: bool,

    /// Winner-take-all output (distributed output is not supported)
    #[cfg_attr(feature = "cli", arg(long, default_value_t = true, action = clap::ArgAction::Set))]
    pub winner_take_all: bool,

    /// Minimum resonance for a prototype to be accepted
    #[cfg_attr(feature = "cli", arg(long, default_value = "0.65"))]
    pub vigilance: f32,

    /// Signal rule parameter
    #[cfg_attr(feature = "cli", arg(long, default_value = "0.01"))]
    pub alpha: f32,

    /// Added to the failed resonance when escalating vigilance (negative = MT-)
    #[cfg_attr(feature = "cli", arg(long, default_value = "-0.001", allow_hyphen_values = true))]
    pub tracking_value: f32,

    /// Learning fraction, 1.0 = fast learning
    #[cfg_attr(feature = "cli", arg(long, default_value = "1.0"))]
    pub learning_fraction: f32,

    /// Reliability in [0, 1]; 1.0 marks a supervisor. Derived from `match_track` when unset
    #[cfg_attr(feature = "cli", arg(long))]
    pub reliability: Option<f32>,

    /// Capacity of the vigilance history (0 disables the running average)
    #[cfg_attr(feature = "cli", arg(long, default_value_t = 0))]
    pub vigilance_history: usize,

    /// Activation computation
    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value_t = ActivationMode::Default))]
    pub activation: ActivationMode,

    /// Only look for a match: never create prototypes or update weights
    #[cfg_attr(feature = "cli", arg(long))]
    pub test_match: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            match_track: false,
            complement_coding: true,
            winner_take_all: true,
            vigilance: 0.65,
            alpha: 0.01,
            tracking_value: -0.001,
            learning_fraction: 1.0,
            reliability: None,
            vigilance_history: 0,
            activation: ActivationMode::Default,
            test_match: false,
        }
    }
}

impl NetworkConfig {
    /// Match-tracking networks cannot supervise, so they default below 1.0.
    pub fn effective_reliability(&self) -> f32 {
        match self.reliability {
            Some(r) => r,
            None if self.match_track => 0.9,
            None => 1.0,
        }
    }
}

/// Tunables of the map field between networks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Args))]
#[serde(default)]
pub struct MapFieldConfig {
    /// Hebbian increment applied to association edges
    #[cfg_attr(feature = "cli", arg(long = "map-learning-fraction", default_value = "0.5"))]
    pub learning_fraction: f32,

    /// Map field vigilance (persisted, not used by the WTA resolution)
    #[cfg_attr(feature = "cli", arg(long = "map-vigilance", default_value = "0.0"))]
    pub vigilance: f32,

    /// Disable match tracking even for a lone unsupervised input
    #[cfg_attr(feature = "cli", arg(long = "force-vigilance"))]
    pub force_vigilance: bool,

    /// Per-round logging detail
    #[cfg_attr(feature = "cli", arg(long, value_enum, default_value_t = Verbosity::Quiet))]
    pub verbosity: Verbosity,
}

impl Default for MapFieldConfig {
    fn default() -> Self {
        Self {
            learning_fraction: 0.5,
            vigilance: 0.0,
            force_vigilance: false,
            verbosity: Verbosity::Quiet,
        }
    }
}
