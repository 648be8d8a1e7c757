//! Classification Throughput Benchmarks
//!
//! Measures single-network classify() cost as the prototype store grows, and
//! a full supervised ARTMAP round with two networks.

use artmap_core::{AssociationManager, Network};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Random points in the unit square, reproducible across runs
fn generate_points(n: usize, dim: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..dim).map(|_| rng.gen::<f32>()).collect())
        .collect()
}

/// Train a network until it holds roughly `target` prototypes
fn trained_network(target: usize, vigilance: f32) -> Network {
    let mut net = Network::new(false, true, true);
    net.set_vigilance(vigilance);
    for point in generate_points(target * 20, 2, 1) {
        let _ = net.classify(&point);
        if net.prototype_count() >= target {
            break;
        }
    }
    net
}

fn bench_network_classify(c: &mut Criterion) {
    let mut group = c.benchmark_group("network_classify");
    group.measurement_time(Duration::from_secs(5));

    let probes = generate_points(256, 2, 7);

    for target in [16usize, 64, 256].iter() {
        let mut net = trained_network(*target, 0.97);
        net.set_test_match(true);

        group.bench_with_input(
            BenchmarkId::new("test_match", net.prototype_count()),
            &probes,
            |b, probes| {
                let mut i = 0;
                b.iter(|| {
                    i = (i + 1) % probes.len();
                    net.classify(black_box(&probes[i]))
                });
            },
        );
    }

    group.finish();
}

fn bench_supervised_round(c: &mut Criterion) {
    let mut group = c.benchmark_group("artmap_round");
    group.measurement_time(Duration::from_secs(5));

    let points = generate_points(2000, 2, 11);
    let mut input = Network::new(true, true, true);
    input.set_vigilance(0.8);
    input.set_reliability(0.8);
    let mut supervisor = Network::new(false, true, true);
    supervisor.set_vigilance(0.99);
    let mut networks = [input, supervisor];
    let mut artmap = AssociationManager::new(&mut networks, 1.0);

    group.bench_function("train_circle", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % points.len();
            let p = &points[i];
            let inside = (2.0 * p[0] - 1.0).powi(2) + (2.0 * p[1] - 1.0).powi(2) < 1.0;
            let label = [if inside { 1.0 } else { 0.0 }];
            artmap.classify(black_box(&[Some(&p[..]), Some(&label[..])]))
        });
    });

    group.finish();
}

criterion_group!(benches, bench_network_classify, bench_supervised_round);
criterion_main!(benches);
