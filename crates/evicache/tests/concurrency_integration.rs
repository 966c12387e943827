//! Concurrency tests
//!
//! Random operation mixes from many threads and tasks against one shared
//! keyspace. After every run the cache must hold at most `capacity` entries,
//! report each key once, and serve every key it reports.

use std::collections::HashSet;
use std::thread;

use evicache::{Cache, CacheOptions, EvictionPolicy, NullSink};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const KEYSPACE: u32 = 64;
const CAPACITY: usize = 16;
const OPS_PER_WORKER: usize = 2_000;

fn apply_random_op(cache: &Cache<u32, u64>, rng: &mut StdRng) {
    let key = rng.gen_range(0..KEYSPACE);
    match rng.gen_range(0..4) {
        0 => {
            // CacheFull is an expected outcome under NoEviction
            let _ = cache.put(key, u64::from(key));
        }
        1 => {
            let _ = cache.try_get(&key);
        }
        2 => {
            cache.remove(&key);
        }
        _ => {
            let _ = cache.add_or_update(key, u64::from(key) + 1);
        }
    }
}

fn assert_consistent(cache: &Cache<u32, u64>) {
    let keys = cache.keys();
    assert!(cache.count() <= cache.capacity(), "count {} over capacity", cache.count());
    assert!(keys.len() <= cache.capacity());

    let unique: HashSet<u32> = keys.iter().copied().collect();
    assert_eq!(unique.len(), keys.len(), "duplicate keys reported: {keys:?}");

    for key in &keys {
        let value = cache.try_get(key).expect("reported key must be retrievable");
        assert!(value == u64::from(*key) || value == u64::from(*key) + 1);
    }
}

/// Verifies the capacity invariant and key uniqueness under thread contention.
///
/// # Test Steps
/// 1. Spawn 8 threads per policy issuing random put/get/remove/add_or_update
/// 2. Join them
/// 3. Verify count, key uniqueness and retrievability
#[test]
fn test_random_mix_from_threads() {
    for policy in
        [EvictionPolicy::Lru, EvictionPolicy::Lfu, EvictionPolicy::Fifo, EvictionPolicy::NoEviction]
    {
        let options = CacheOptions::builder().capacity(CAPACITY).eviction_policy(policy).build();
        let cache: Cache<u32, u64> =
            Cache::builder(options).diagnostics(NullSink).build().unwrap();

        let handles: Vec<_> = (0..8u64)
            .map(|seed| {
                let cache = cache.clone();
                thread::spawn(move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    for _ in 0..OPS_PER_WORKER {
                        apply_random_op(&cache, &mut rng);
                        assert!(cache.count() <= CAPACITY);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_consistent(&cache);
    }
}

/// Verifies the same invariants when async tasks and blocking threads mix.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_random_mix_from_tasks_and_threads() {
    let cache: Cache<u32, u64> = Cache::builder(CacheOptions::lru(CAPACITY))
        .diagnostics(NullSink)
        .build()
        .unwrap();

    let tasks: Vec<_> = (0..4u64)
        .map(|seed| {
            let cache = cache.clone();
            tokio::spawn(async move {
                let mut rng = StdRng::seed_from_u64(100 + seed);
                for _ in 0..OPS_PER_WORKER / 4 {
                    let key = rng.gen_range(0..KEYSPACE);
                    match rng.gen_range(0..4) {
                        0 => cache.put_async(key, u64::from(key)).await.unwrap(),
                        1 => {
                            let _ = cache.try_get_async(&key).await;
                        }
                        2 => {
                            cache.remove_async(&key).await;
                        }
                        _ => {
                            cache.add_or_update_async(key, u64::from(key) + 1).await.unwrap();
                        }
                    }
                }
            })
        })
        .collect();

    let threads: Vec<_> = (0..4u64)
        .map(|seed| {
            let cache = cache.clone();
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(200 + seed);
                for _ in 0..OPS_PER_WORKER / 4 {
                    apply_random_op(&cache, &mut rng);
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }
    for handle in threads {
        handle.join().unwrap();
    }

    assert_consistent(&cache);
    let stats = cache.stats();
    assert!(stats.size <= CAPACITY);
    assert!(stats.inserts >= stats.evictions);
}
