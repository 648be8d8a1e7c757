//! Synthetic labelled samples in the unit square.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Region whose points carry label 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TestCase {
    /// Disc inscribed in the square: `(2x - 1)^2 + (2y - 1)^2 < 1`
    #[default]
    Circle,
    /// Left half: `x < 0.5`
    Halves,
}

impl TestCase {
    pub fn label(self, x: f32, y: f32) -> f32 {
        let inside = match self {
            TestCase::Circle => (2.0 * x - 1.0).powi(2) + (2.0 * y - 1.0).powi(2) < 1.0,
            TestCase::Halves => x < 0.5,
        };
        if inside {
            1.0
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    /// `[x, y, 1 - x, 1 - y]`
    pub input: [f32; 4],
    /// Single-element label vector for the supervisor
    pub label: [f32; 1],
}

/// Endless, reproducible stream of samples for one test case.
pub struct SampleGenerator {
    case: TestCase,
    rng: ChaCha8Rng,
}

impl SampleGenerator {
    pub fn new(case: TestCase, seed: u64) -> Self {
        Self {
            case,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Iterator for SampleGenerator {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let x: f32 = self.rng.gen();
        let y: f32 = self.rng.gen();
        Some(Sample {
            x,
            y,
            input: [x, y, 1.0 - x, 1.0 - y],
            label: [self.case.label(x, y)],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_labels() {
        assert_eq!(TestCase::Circle.label(0.5, 0.5), 1.0);
        assert_eq!(TestCase::Circle.label(0.02, 0.02), 0.0);
        assert_eq!(TestCase::Halves.label(0.49, 0.9), 1.0);
        assert_eq!(TestCase::Halves.label(0.5, 0.9), 0.0);
    }

    #[test]
    fn test_circle_covers_about_pi_over_four() {
        let n = 20_000;
        let inside: f32 = SampleGenerator::new(TestCase::Circle, 1)
            .take(n)
            .map(|s| s.label[0])
            .sum();
        let ratio = inside / n as f32;
        assert!((ratio - 0.785).abs() < 0.02, "ratio {ratio}");
    }

    #[test]
    fn test_samples_are_reproducible() {
        let a: Vec<_> = SampleGenerator::new(TestCase::Halves, 3).take(5).collect();
        let b: Vec<_> = SampleGenerator::new(TestCase::Halves, 3).take(5).collect();
        assert_eq!(a, b);
        assert!((a[0].input[2] - (1.0 - a[0].x)).abs() < 1e-6);
    }
}
