use artmap_core::{AssociationManager, MapField, Network, Persist};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn train(artmap: &mut AssociationManager<'_>, rng: &mut ChaCha8Rng, rounds: usize) {
    for _ in 0..rounds {
        let x = [rng.gen::<f32>(), rng.gen::<f32>()];
        let label = [if x[0] < 0.5 { 0.0 } else { 1.0 }];
        artmap.classify(&[Some(&x[..]), Some(&label[..])]).unwrap();
    }
}

fn fresh_networks() -> [Network; 2] {
    let mut input = Network::new(true, true, true);
    input.set_vigilance(0.8);
    let mut label = Network::new(false, true, true);
    label.set_vigilance(0.99);
    [input, label]
}

#[test]
fn test_network_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.art");

    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut net = Network::new(false, true, true);
    net.set_vigilance(0.9);
    for _ in 0..200 {
        net.classify(&[rng.gen::<f32>(), rng.gen::<f32>(), rng.gen::<f32>()])
            .unwrap();
    }
    assert!(net.prototype_count() > 1);

    net.save(&path).unwrap();
    let loaded = Network::load(&path).unwrap();

    assert_eq!(loaded.prototype_count(), net.prototype_count());
    for (id, weights) in net.prototypes().iter() {
        let restored = loaded.prototype(id).unwrap();
        let same_bits = weights
            .iter()
            .zip(restored)
            .all(|(a, b)| a.to_bits() == b.to_bits());
        assert!(same_bits, "prototype {id} changed on reload");
    }
    assert_eq!(loaded.vigilance(), 0.9);
    assert_eq!(loaded.alpha(), net.alpha());
    assert_eq!(loaded.tracking_value(), net.tracking_value());
    assert_eq!(loaded.reliability(), net.reliability());
    assert_eq!(loaded.compression_count(), net.compression_count());
}

#[test]
fn test_reloaded_artmap_predicts_like_the_original() {
    let dir = tempfile::tempdir().unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(21);

    let mut networks = fresh_networks();
    let mut artmap = AssociationManager::new(&mut networks, 1.0);
    train(&mut artmap, &mut rng, 500);
    let map = artmap.into_map_field();

    map.save(dir.path().join("map.artmap")).unwrap();
    for (i, net) in networks.iter().enumerate() {
        net.save(dir.path().join(format!("net{i}.art"))).unwrap();
    }

    let mut reloaded = [
        Network::load(dir.path().join("net0.art")).unwrap(),
        Network::load(dir.path().join("net1.art")).unwrap(),
    ];
    let reloaded_map = MapField::load(dir.path().join("map.artmap")).unwrap();
    assert_eq!(reloaded_map, map);

    let probes: Vec<[f32; 2]> = (0..50).map(|_| [rng.gen(), rng.gen()]).collect();

    let mut a = AssociationManager::with_map_field(&mut networks, map).unwrap();
    let mut b = AssociationManager::with_map_field(&mut reloaded, reloaded_map).unwrap();
    for p in &probes {
        let left = a.classify(&[Some(&p[..]), None]).unwrap();
        let right = b.classify(&[Some(&p[..]), None]).unwrap();
        assert_eq!(left, right);
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = Network::load(dir.path().join("absent.art"));
    assert!(matches!(result, Err(artmap_core::ArtError::Io(_))));
}
