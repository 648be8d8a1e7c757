//! Train-then-evaluate run of a two-network ARTMAP on one test case.
//!
//! Slot 0 holds the input network, slot 1 the supervisor. Training views fill
//! both slots; evaluation views leave the supervisor empty and read the
//! predicted label from element 0 of the predicted supervisor prototype.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use artmap_core::{AssociationManager, MapField, Network, Persist};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::SimConfig;
use crate::scenario::SampleGenerator;

const PROGRESS_EVERY: usize = 10_000;

/// One evaluated sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub x: f32,
    pub y: f32,
    /// `None` when the map field had no association to offer
    pub predicted: Option<f32>,
    pub truth: f32,
}

impl Prediction {
    pub fn is_correct(&self) -> bool {
        self.predicted == Some(self.truth)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    pub trained: usize,
    pub evaluated: usize,
    pub input_prototypes: usize,
    pub supervisor_prototypes: usize,
    pub map_nodes: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub withheld: usize,
}

impl Report {
    /// Share of correct answers among the samples that got a prediction.
    pub fn accuracy(&self) -> f64 {
        let predicted = self.correct + self.incorrect;
        if predicted == 0 {
            0.0
        } else {
            self.correct as f64 / predicted as f64
        }
    }
}

/// Everything a finished run produced.
pub struct Outcome {
    pub report: Report,
    pub predictions: Vec<Prediction>,
    pub networks: [Network; 2],
    pub map: MapField,
}

impl Outcome {
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        for prediction in &self.predictions {
            writer.serialize(prediction)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Store `input.art`, `supervisor.art` and `map.artmap` in `dir`.
    pub fn save_models(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        self.networks[0].save(dir.join("input.art"))?;
        self.networks[1].save(dir.join("supervisor.art"))?;
        self.map.save(dir.join("map.artmap"))?;
        Ok(())
    }
}

pub struct Experiment {
    config: SimConfig,
}

impl Experiment {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn run(&self) -> Result<Outcome> {
        let scenario = &self.config.scenario;
        let train = scenario.train_samples();
        let mut networks = [
            Network::from_config(&self.config.input),
            Network::from_config(&self.config.supervisor),
        ];
        let mut predictions = Vec::with_capacity(scenario.samples - train);

        let map = {
            let mut artmap = AssociationManager::with_config(&mut networks, &self.config.map);
            let mut samples = SampleGenerator::new(scenario.case, scenario.seed);

            info!(case = ?scenario.case, samples = scenario.samples, train, "training");
            for (i, sample) in samples.by_ref().take(train).enumerate() {
                artmap
                    .classify(&[Some(&sample.input[..]), Some(&sample.label[..])])
                    .with_context(|| format!("training sample {i}"))?;
                if (i + 1) % PROGRESS_EVERY == 0 {
                    debug!(
                        done = i + 1,
                        input_prototypes = artmap.network(0)?.prototype_count(),
                        map_nodes = artmap.map_field().node_count(),
                        "training progress"
                    );
                }
            }

            info!(samples = scenario.samples - train, "evaluating");
            for sample in samples.take(scenario.samples - train) {
                let classes = artmap
                    .classify(&[Some(&sample.input[..]), None])
                    .context("evaluating sample")?;
                let predicted = match classes[1] {
                    Some(class) => {
                        let prototype = artmap.network(1)?.prototype(class)?;
                        prototype.first().map(|&v| if v >= 0.5 { 1.0 } else { 0.0 })
                    }
                    None => None,
                };
                predictions.push(Prediction {
                    x: sample.x,
                    y: sample.y,
                    predicted,
                    truth: sample.label[0],
                });
            }

            artmap.into_map_field()
        };

        let mut report = Report {
            trained: train,
            evaluated: predictions.len(),
            input_prototypes: networks[0].prototype_count(),
            supervisor_prototypes: networks[1].prototype_count(),
            map_nodes: map.node_count(),
            ..Report::default()
        };
        for p in &predictions {
            match p.predicted {
                None => report.withheld += 1,
                Some(_) if p.is_correct() => report.correct += 1,
                Some(_) => report.incorrect += 1,
            }
        }

        Ok(Outcome {
            report,
            predictions,
            networks,
            map,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::TestCase;

    fn small(case: TestCase, samples: usize) -> SimConfig {
        let mut cfg = SimConfig::default();
        cfg.scenario.case = case;
        cfg.scenario.samples = samples;
        cfg
    }

    #[test]
    fn test_report_counts_add_up() {
        let outcome = Experiment::new(small(TestCase::Halves, 2_000)).run().unwrap();
        let r = &outcome.report;

        assert_eq!(r.trained, 1_800);
        assert_eq!(r.evaluated, 200);
        assert_eq!(r.correct + r.incorrect + r.withheld, 200);
        // the supervisor only ever sees two labels
        assert_eq!(r.supervisor_prototypes, 2);
        assert!(r.map_nodes > 0);
    }

    #[test]
    fn test_accuracy_of_empty_report() {
        assert_eq!(Report::default().accuracy(), 0.0);
    }
}
