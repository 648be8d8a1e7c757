//! Scenario harness for `artmap_core`.
//!
//! Generates labelled points in the unit square, trains an input network
//! under a label supervisor and measures how well the map field predicts the
//! label of unseen points.

pub mod config;
pub mod experiment;
pub mod scenario;

pub use config::SimConfig;
pub use experiment::{Experiment, Outcome, Prediction, Report};
pub use scenario::{Sample, SampleGenerator, TestCase};
