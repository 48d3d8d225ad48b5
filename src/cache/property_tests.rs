//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check map semantics and memory accounting over random
//! operation sequences.

use proptest::prelude::*;
use std::collections::HashMap;

use crate::cache::{AccountedCache, Admission, BoundedCache, EstimateSize};

// == Test Configuration ==
const TEST_CEILING: u64 = 2_000;

#[derive(Debug, Clone, PartialEq)]
struct Payload(String);

impl EstimateSize for Payload {
    fn estimated_size(&self) -> u64 {
        100 + self.0.len() as u64 * 2
    }
}

// == Strategies ==
fn key_strategy() -> impl Strategy<Value = u32> {
    0u32..32
}

fn payload_strategy() -> impl Strategy<Value = Payload> {
    "[a-z ]{0,400}".prop_map(Payload)
}

#[derive(Debug, Clone)]
enum CacheOp {
    Put { key: u32, value: Payload },
    Get { key: u32 },
    Evict { key: u32 },
    Clear,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), payload_strategy()).prop_map(|(key, value)| CacheOp::Put { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Evict { key }),
        1 => Just(CacheOp::Clear),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // A plain map model predicts every read of the bounded cache.
    #[test]
    fn prop_bounded_cache_matches_map_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let cache = BoundedCache::new();
        let mut model: HashMap<u32, Payload> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    prop_assert_eq!(cache.put(key, value.clone()), model.insert(key, value));
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(&key).cloned());
                }
                CacheOp::Evict { key } => {
                    prop_assert_eq!(cache.evict(&key), model.remove(&key));
                }
                CacheOp::Clear => {
                    prop_assert_eq!(cache.clear(), model.len());
                    model.clear();
                }
            }
            prop_assert_eq!(cache.len(), model.len());
        }
    }

    // The running total always equals the summed size of what is cached, and
    // never exceeds the ceiling.
    #[test]
    fn prop_accounting_matches_contents(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let cache = AccountedCache::new("payloads", TEST_CEILING);
        let mut model: HashMap<u32, Payload> = HashMap::new();

        for op in ops {
            match op {
                CacheOp::Put { key, value } => {
                    match cache.admit(key, value.clone()) {
                        Admission::Admitted => { model.insert(key, value); }
                        Admission::Rejected => { model.remove(&key); }
                        Admission::Stale => prop_assert!(false, "write-path admit is never stale"),
                    }
                }
                CacheOp::Get { key } => {
                    prop_assert_eq!(cache.get(&key), model.get(&key).cloned());
                }
                CacheOp::Evict { key } => {
                    cache.evict(&key);
                    model.remove(&key);
                }
                CacheOp::Clear => {
                    cache.clear();
                    model.clear();
                }
            }

            let expected: u64 = model.values().map(EstimateSize::estimated_size).sum();
            prop_assert_eq!(cache.memory_used(), expected);
            prop_assert!(cache.memory_used() <= TEST_CEILING);
        }
    }

    // A value larger than the ceiling is never cached.
    #[test]
    fn prop_oversized_value_never_cached(key in key_strategy(), len in 951usize..2000) {
        let cache = AccountedCache::new("payloads", TEST_CEILING);
        let value = Payload("x".repeat(len));

        prop_assert_eq!(cache.admit(key, value), Admission::Rejected);
        prop_assert!(cache.get(&key).is_none());
        prop_assert_eq!(cache.memory_used(), 0);
    }
}

// == Property Test for Error Response Format ==
proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    // Every error the HTTP layer can produce renders a JSON body with an
    // "error" string field.
    #[test]
    fn prop_error_response_format(message in "[a-zA-Z0-9 _-]{1,100}") {
        use crate::error::TrackerError;
        use crate::repository::StoreError;
        use axum::body::to_bytes;
        use axum::response::IntoResponse;

        let error_variants = vec![
            TrackerError::NotFound(message.clone()),
            TrackerError::InvalidRequest(message.clone()),
            TrackerError::Store(StoreError::Backend(message.clone())),
        ];

        for error in error_variants {
            let expected = error.to_string();
            let response = error.into_response();

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            prop_assert!(content_type.contains("application/json"));

            let bytes = tokio_test::block_on(to_bytes(response.into_body(), usize::MAX)).unwrap();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            prop_assert_eq!(json["error"].as_str(), Some(expected.as_str()));
        }
    }
}
