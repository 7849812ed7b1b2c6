//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check accounting and eviction invariants over random
//! operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{estimate_size, CacheConfig, CacheManager, CacheStore, Lookup, SetOptions};

// == Strategies ==
/// Generates valid cache keys (non-empty)
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,16}".prop_map(|s| s)
}

fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,256}".prop_map(|s| s)
}

fn tag_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("dataset:A".to_string()),
        Just("dataset:B".to_string()),
        Just("user:U".to_string()),
    ]
}

/// A single cache operation
#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String, tags: Vec<String> },
    Get { key: String },
    Remove { key: String },
    RemoveByTag { tag: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        3 => (
            valid_key_strategy(),
            valid_value_strategy(),
            prop::collection::vec(tag_strategy(), 0..3)
        )
            .prop_map(|(key, value, tags)| CacheOp::Set { key, value, tags }),
        2 => valid_key_strategy().prop_map(|key| CacheOp::Get { key }),
        1 => valid_key_strategy().prop_map(|key| CacheOp::Remove { key }),
        1 => tag_strategy().prop_map(|tag| CacheOp::RemoveByTag { tag }),
    ]
}

fn apply(store: &mut CacheStore<String>, op: CacheOp) -> Option<bool> {
    match op {
        CacheOp::Set { key, value, tags } => {
            store.set(key, value, SetOptions::new().with_tags(tags)).unwrap();
            None
        }
        CacheOp::Get { key } => Some(store.get(&key).is_hit()),
        CacheOp::Remove { key } => {
            store.remove(&key);
            None
        }
        CacheOp::RemoveByTag { tag } => {
            store.remove_by_tags(&[tag]);
            None
        }
    }
}

async fn run_concurrent(
    operations: Vec<CacheOp>,
    written: HashMap<String, Vec<String>>,
) -> Result<(), String> {
    let cache: Arc<CacheManager<String>> =
        Arc::new(CacheManager::new("concurrent", CacheConfig::default()));

    let mut handles = vec![];
    for op in operations {
        let cache = Arc::clone(&cache);
        let written = written.clone();
        handles.push(tokio::spawn(async move {
            match op {
                CacheOp::Set { key, value, tags } => cache
                    .set(key, value, SetOptions::new().with_tags(tags))
                    .await
                    .map_err(|e| e.to_string()),
                CacheOp::Get { key } => match cache.get(&key).await {
                    Lookup::Hit(value) => {
                        let known = written.get(&key).map(|vs| vs.contains(&value));
                        if known == Some(true) {
                            Ok(())
                        } else {
                            Err(format!("Unexpected value for '{}'", key))
                        }
                    }
                    Lookup::Miss | Lookup::Expired => Ok(()),
                },
                CacheOp::Remove { key } => {
                    cache.remove(&key).await;
                    Ok(())
                }
                CacheOp::RemoveByTag { tag } => {
                    cache.remove_by_tags(&[tag]).await;
                    Ok(())
                }
            }
        }));
    }

    for handle in handles {
        handle.await.map_err(|e| e.to_string())??;
    }

    let metrics = cache.metrics().await;
    if metrics.total_entries != cache.len().await {
        return Err("entry count drifted".to_string());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Hits and misses match the observed outcome of every `get`.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store: CacheStore<String> = CacheStore::new("prop", CacheConfig::default());
        let mut expected_hits = 0u64;
        let mut expected_misses = 0u64;

        for op in ops {
            match apply(&mut store, op) {
                Some(true) => expected_hits += 1,
                Some(false) => expected_misses += 1,
                None => {}
            }
        }

        let metrics = store.metrics();
        prop_assert_eq!(metrics.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(metrics.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(metrics.total_entries, store.len(), "Total entries mismatch");
        prop_assert_eq!(metrics.evictions, 0, "Nothing should be evicted under default ceiling");
    }

    // Memory usage always equals the sum of recorded entry sizes, and stays
    // under the ceiling unless a single entry is alone in the store.
    #[test]
    fn prop_memory_accounting_and_ceiling(
        ops in prop::collection::vec(cache_op_strategy(), 1..80),
        ceiling in 64usize..1024
    ) {
        let config = CacheConfig::default().with_max_memory_bytes(ceiling);
        let mut store: CacheStore<String> = CacheStore::new("prop", config);
        let mut keys: Vec<String> = Vec::new();

        for op in ops {
            if let CacheOp::Set { key, .. } = &op {
                keys.push(key.clone());
            }
            apply(&mut store, op);

            let recorded: usize = keys
                .iter()
                .collect::<std::collections::HashSet<_>>()
                .into_iter()
                .filter_map(|k| store.entry_size(k))
                .sum();
            let metrics = store.metrics();

            prop_assert_eq!(metrics.total_memory_used, recorded);
            prop_assert_eq!(metrics.total_entries, store.len());
            prop_assert!(
                metrics.total_memory_used <= ceiling || store.len() == 1,
                "Usage {} over ceiling {} with {} entries",
                metrics.total_memory_used,
                ceiling,
                store.len()
            );
        }
    }

    // Stored values read back unchanged.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in valid_value_strategy()) {
        let mut store: CacheStore<String> = CacheStore::new("prop", CacheConfig::default());

        store.set(key.clone(), value.clone(), SetOptions::new()).unwrap();

        prop_assert_eq!(store.get(&key), Lookup::Hit(value));
    }

    // Overwriting accounts only for the latest value.
    #[test]
    fn prop_overwrite_semantics(
        key in valid_key_strategy(),
        value1 in valid_value_strategy(),
        value2 in valid_value_strategy()
    ) {
        let mut store: CacheStore<String> = CacheStore::new("prop", CacheConfig::default());

        store.set(key.clone(), value1, SetOptions::new()).unwrap();
        store.set(key.clone(), value2.clone(), SetOptions::new()).unwrap();

        prop_assert_eq!(store.metrics().total_memory_used, estimate_size(&value2));
        prop_assert_eq!(store.len(), 1);
        prop_assert_eq!(store.get(&key), Lookup::Hit(value2));
    }

    // With room for exactly `n` equal entries, writing one more evicts the
    // first write even when it was read most recently.
    #[test]
    fn prop_write_order_eviction(
        initial_keys in prop::collection::hash_set(valid_key_strategy(), 2..8),
        new_key in valid_key_strategy()
    ) {
        let unique_keys: Vec<String> = initial_keys.into_iter().collect();
        prop_assume!(!unique_keys.contains(&new_key));

        let value = "v".repeat(32);
        let size = estimate_size(&value);
        let config = CacheConfig::default().with_max_memory_bytes(size * unique_keys.len());
        let mut store: CacheStore<String> = CacheStore::new("prop", config);

        for key in &unique_keys {
            store.set(key.clone(), value.clone(), SetOptions::new()).unwrap();
        }
        let oldest_key = unique_keys[0].clone();
        prop_assert!(store.get(&oldest_key).is_hit());

        store.set(new_key.clone(), value, SetOptions::new()).unwrap();

        prop_assert_eq!(store.metrics().evictions, 1);
        prop_assert!(!store.has(&oldest_key), "Oldest write '{}' should be evicted", oldest_key);
        prop_assert!(store.has(&new_key));
        for key in unique_keys.iter().skip(1) {
            prop_assert!(store.has(key), "Key '{}' should still exist", key);
        }
    }

    // `remove_by_tags` removes exactly the entries carrying the tag.
    #[test]
    fn prop_remove_by_tags_exact(
        entries in prop::collection::hash_map(
            valid_key_strategy(),
            prop::collection::vec(tag_strategy(), 0..3),
            1..30
        ),
        tag in tag_strategy()
    ) {
        let mut store: CacheStore<String> = CacheStore::new("prop", CacheConfig::default());
        for (key, tags) in &entries {
            store.set(key.clone(), "v".to_string(), SetOptions::new().with_tags(tags.clone())).unwrap();
        }

        let expected = entries.values().filter(|tags| tags.contains(&tag)).count();
        let removed = store.remove_by_tags(&[tag.clone()]);

        prop_assert_eq!(removed, expected);
        for (key, tags) in &entries {
            prop_assert_eq!(store.has(key), !tags.contains(&tag));
        }
    }
}

// Concurrent access through the shared manager handle
proptest! {
    #![proptest_config(ProptestConfig::with_cases(25))]

    // Readers observe either a complete written value or nothing, and the
    // accounting is consistent once all tasks finish.
    #[test]
    fn prop_concurrent_operation_correctness(
        operations in prop::collection::vec(cache_op_strategy(), 10..50)
    ) {
        let written: HashMap<String, Vec<String>> = operations
            .iter()
            .filter_map(|op| match op {
                CacheOp::Set { key, value, .. } => Some((key.clone(), value.clone())),
                _ => None,
            })
            .fold(HashMap::new(), |mut acc, (k, v)| {
                acc.entry(k).or_default().push(v);
                acc
            });

        let result = tokio_test::block_on(run_concurrent(operations, written));

        prop_assert!(result.is_ok(), "Concurrent operation failed: {:?}", result);
    }
}

// Fewer cases for the time-sensitive TTL property
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // After the TTL elapses, a read misses and removes the entry.
    #[test]
    fn prop_ttl_expiration_behavior(key in valid_key_strategy(), value in valid_value_strategy()) {
        let mut store: CacheStore<String> = CacheStore::new("prop", CacheConfig::default());

        store
            .set(key.clone(), value.clone(), SetOptions::new().with_ttl(Duration::from_millis(30)))
            .unwrap();
        prop_assert_eq!(store.get(&key), Lookup::Hit(value));

        std::thread::sleep(Duration::from_millis(40));

        prop_assert_eq!(store.get(&key), Lookup::Expired);
        prop_assert!(store.is_empty());
    }
}
