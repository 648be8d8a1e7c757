use artmap_core::{MapField, Network, Persist};
use artmap_sim::{Experiment, SimConfig, TestCase};

fn config(case: TestCase, samples: usize) -> SimConfig {
    let mut cfg = SimConfig::default();
    cfg.scenario.case = case;
    cfg.scenario.samples = samples;
    cfg
}

#[test]
fn test_circle_accuracy_above_seventy_percent() {
    println!("\n=== Circle region, supervised ARTMAP ===\n");

    let outcome = Experiment::new(SimConfig::default())
        .run()
        .expect("experiment failed");
    let r = &outcome.report;
    assert_eq!(r.trained, 90_000);
    assert_eq!(r.evaluated, 10_000);

    println!(
        "prototypes: input {} / supervisor {}, map nodes {}",
        r.input_prototypes, r.supervisor_prototypes, r.map_nodes
    );
    println!(
        "correct {} / incorrect {} / withheld {} -> accuracy {:.2}%",
        r.correct,
        r.incorrect,
        r.withheld,
        r.accuracy() * 100.0
    );

    assert!(r.correct + r.incorrect > 0, "no prediction was made");
    assert!(
        r.accuracy() > 0.7,
        "accuracy {:.3} not above 0.7",
        r.accuracy()
    );
}

#[test]
fn test_halves_accuracy() {
    let outcome = Experiment::new(config(TestCase::Halves, 10_000)).run().unwrap();
    assert!(
        outcome.report.accuracy() > 0.7,
        "accuracy {:.3}",
        outcome.report.accuracy()
    );
}

#[test]
fn test_outputs_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(TestCase::Circle, 1_000);
    cfg.output.csv = Some(dir.path().join("predictions.csv"));

    let outcome = Experiment::new(cfg.clone()).run().unwrap();
    outcome.write_csv(cfg.output.csv.as_ref().unwrap()).unwrap();
    outcome.save_models(&dir.path().join("models")).unwrap();

    let csv = std::fs::read_to_string(dir.path().join("predictions.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("x,y,predicted,truth"));
    assert_eq!(lines.count(), outcome.predictions.len());

    let input = Network::load(dir.path().join("models/input.art")).unwrap();
    assert_eq!(input.prototype_count(), outcome.report.input_prototypes);
    let map = MapField::load(dir.path().join("models/map.artmap")).unwrap();
    assert_eq!(map.node_count(), outcome.report.map_nodes);
}
