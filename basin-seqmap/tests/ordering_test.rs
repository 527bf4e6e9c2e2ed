use basin_seqmap::SequencedMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Reference model: a Vec of (key, value) kept in insertion order.
fn model_put(model: &mut Vec<(u32, u32)>, key: u32, value: u32) {
    match model.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => model.push((key, value)),
    }
}

fn model_delete(model: &mut Vec<(u32, u32)>, key: u32) -> bool {
    match model.iter().position(|(k, _)| *k == key) {
        Some(pos) => {
            model.remove(pos);
            true
        }
        None => false,
    }
}

fn snapshot(map: &SequencedMap<u32, u32>) -> Vec<(u32, u32)> {
    map.iter().map(|(k, v)| (*k, *v)).collect()
}

#[test]
fn test_random_ops_match_model() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut map = SequencedMap::new().with_compact_threshold(8);
    let mut model = Vec::new();

    for step in 0..5_000u32 {
        let key = rng.gen_range(0..64);
        if rng.gen_bool(0.6) {
            model_put(&mut model, key, step);
            map.insert(key, step);
        } else {
            assert_eq!(map.remove(&key).is_some(), model_delete(&mut model, key));
        }
        assert_eq!(map.len(), model.len());
    }

    assert_eq!(snapshot(&map), model);
}

#[test]
fn test_forced_compaction_preserves_order_and_content() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..50 {
        // Threshold high enough that compaction only happens when forced.
        let mut map = SequencedMap::new();
        for _ in 0..200 {
            let key = rng.gen_range(0..100);
            if rng.gen_bool(0.7) {
                map.insert(key, rng.gen());
            } else {
                map.remove(&key);
            }
        }

        let before = snapshot(&map);
        map.compact();
        let after = snapshot(&map);

        assert_eq!(before, after);
        assert_eq!(map.deleted_count(), 0);
        assert_eq!(map.slot_count(), map.len());
        for (k, v) in &before {
            assert_eq!(map.get(k), Some(v));
        }
    }
}

#[test]
fn test_compaction_is_amortized() {
    let mut map = SequencedMap::new();
    for i in 0..10_000u32 {
        map.insert(i, i);
    }
    for i in 0..9_000u32 {
        map.remove(&i);
    }

    // Compaction fired at least once: the array shrank well below 10k,
    // and what is left is bounded by the half-empty rule.
    assert!(map.slot_count() < 10_000);
    assert!(map.deleted_count() * 2 <= map.slot_count() || map.deleted_count() <= 1024);

    let keys: Vec<_> = map.keys().copied().collect();
    assert_eq!(keys, (9_000..10_000).collect::<Vec<_>>());
}

#[test]
fn test_single_shard_scenario() {
    let mut map = SequencedMap::new();
    map.insert("a", 1);
    map.insert("b", 2);
    map.remove("a");
    map.insert("a", 3);

    let pairs: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(pairs, vec![("b", 2), ("a", 3)]);
}
