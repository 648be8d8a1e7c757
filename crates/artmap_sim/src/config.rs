use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use artmap_core::{MapFieldConfig, NetworkConfig};
use serde::{Deserialize, Serialize};

use crate::scenario::TestCase;

/// Full harness configuration, loadable from TOML. Missing sections and
/// fields fall back to the circle experiment defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub scenario: ScenarioConfig,
    /// Network fed with `[x, y, 1 - x, 1 - y]`
    pub input: NetworkConfig,
    /// Network fed with the label
    pub supervisor: NetworkConfig,
    pub map: MapFieldConfig,
    pub output: OutputConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            scenario: ScenarioConfig::default(),
            input: NetworkConfig {
                match_track: true,
                vigilance: 0.80,
                reliability: Some(0.8),
                ..NetworkConfig::default()
            },
            supervisor: NetworkConfig {
                match_track: false,
                vigilance: 0.99,
                reliability: Some(1.0),
                ..NetworkConfig::default()
            },
            map: MapFieldConfig {
                learning_fraction: 1.0,
                ..MapFieldConfig::default()
            },
            output: OutputConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub case: TestCase,
    pub samples: usize,
    /// Leading share of the samples used for training
    pub train_fraction: f32,
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            case: TestCase::Circle,
            samples: 100_000,
            train_fraction: 0.9,
            seed: 0x5eed,
        }
    }
}

impl ScenarioConfig {
    pub fn train_samples(&self) -> usize {
        (self.samples as f64 * f64::from(self.train_fraction.clamp(0.0, 1.0))).round() as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// CSV of (x, y, predicted, truth) for every evaluated sample
    pub csv: Option<PathBuf>,
    /// Directory receiving the trained networks and map field
    pub save_dir: Option<PathBuf>,
}

impl SimConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_toml()?)
            .with_context(|| format!("writing config {}", path.display()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serializing config")
    }
}
