use basin::{Heap, MapBuilder, SequencedMap, ShardedMap, Stream, StreamError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;

#[test]
fn test_sequenced_map_streaming_keeps_order() {
    let mut map = SequencedMap::new();
    map.insert("first", 1);
    map.insert("second", 2);
    map.insert("third", 3);

    let results = Stream::new(map.iter())
        .filter_pairs(|_, v| **v > 1)
        .map(|(k, v)| (*k, *v))
        .collect()
        .unwrap();
    assert_eq!(results, vec![("second", 2), ("third", 3)]);
}

#[test]
fn test_sharded_map_streaming_keeps_global_order() {
    let map = ShardedMap::new();
    map.put("A", 10);
    map.put("B", 20);
    map.put("C", 30);
    map.put("D", 40);

    let results = map
        .to_stream()
        .filter_pairs(|_, v| *v > 10 && *v < 40)
        .collect()
        .unwrap();
    assert_eq!(results, vec![("B", 20), ("C", 30)]);
}

#[test]
fn test_global_order_into_sequenced_map() {
    let map = ShardedMap::with_shard_count(8).unwrap();
    for i in 0..20u32 {
        map.put(i % 5, i);
    }

    // Replaying the merge into an ordered store preserves write order.
    let replay: SequencedMap<u32, u32> = map.to_stream().collect_into().unwrap();
    let keys: Vec<_> = replay.keys().copied().collect();
    assert_eq!(keys, vec![0, 1, 2, 3, 4]);
    assert_eq!(replay.get(&4), Some(&19));
}

#[test]
fn test_heap_top_k_from_map() {
    let map = ShardedMap::with_shard_count(4).unwrap();
    for (name, score) in [("ann", 7), ("bo", 3), ("cy", 9), ("di", 5), ("ed", 1)] {
        map.put(name, score);
    }

    // Min-heap of size 3 keeps the three largest scores.
    let mut top: Heap<i32, &str> = Heap::new();
    for (name, score) in map.iter_in_global_order() {
        if top.len() < 3 {
            top.insert(score, name);
        } else if top.peek().is_some_and(|(min, _)| score > *min) {
            top.replace(score, name);
        }
    }
    let mut winners: Vec<_> = top.drain().map(|(_, name)| name).collect();
    winners.reverse();
    assert_eq!(winners, vec!["cy", "ann", "di"]);
}

#[test]
fn test_stream_failure_over_map() {
    let map = ShardedMap::with_shard_count(2).unwrap();
    for i in 0..10i64 {
        map.put(i, i - 5);
    }

    let err = map
        .to_stream()
        .try_map(|(k, v)| u32::try_from(v).map(|v| (k, v)))
        .count()
        .unwrap_err();
    assert!(matches!(err, StreamError::Failed(_)));
}

#[test]
#[cfg_attr(miri, ignore)]
fn test_concurrent_writers_then_ordered_average() {
    let map = Arc::new(ShardedMap::new());

    let handles: Vec<_> = (0..4u64)
        .map(|t| {
            let m = Arc::clone(&map);
            thread::spawn(move || {
                for i in 0..250 {
                    m.put(t * 250 + i, (t * 250 + i) as f64);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let avg = map.to_stream().values().average().unwrap();
    assert!((avg - 499.5).abs() < 1e-9);
    assert_eq!(map.to_stream().count().unwrap(), 1000);
}

#[test]
fn test_random_puts_and_deletes_match_ordered_model() {
    let mut rng = StdRng::seed_from_u64(0xba51);
    let map: ShardedMap<u32, u32> = MapBuilder::new()
        .shard_count(8)
        .compact_threshold(4)
        .build()
        .unwrap();
    // A write moves its key to the end of global order; the model mirrors
    // that by removing before inserting.
    let mut model: SequencedMap<u32, u32> = SequencedMap::new().with_compact_threshold(4);

    for step in 0..5_000u32 {
        let key = rng.gen_range(0..64);
        if rng.gen_bool(0.3) {
            assert_eq!(map.delete(&key), model.remove(&key).is_some());
        } else {
            let expected = model.remove(&key);
            model.insert(key, step);
            assert_eq!(map.put(key, step), expected);
        }

        if step % 500 == 0 {
            let actual: Vec<(u32, u32)> = map.iter_in_global_order().collect();
            let expected: Vec<(u32, u32)> = model.iter().map(|(k, v)| (*k, *v)).collect();
            assert_eq!(actual, expected, "diverged at step {step}");
        }
    }

    assert_eq!(map.len(), model.len());
    let actual: Vec<u32> = map.keys_in_global_order().collect();
    let expected: Vec<u32> = model.keys().copied().collect();
    assert_eq!(actual, expected);
}
