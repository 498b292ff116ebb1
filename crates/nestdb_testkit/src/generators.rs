//! Property-based test generators using proptest.
//!
//! Documents are generated with integer numbers only so that a JSON
//! round trip reproduces them exactly.

use nestdb_core::{Resource, Snapshot, Value};
use proptest::prelude::*;

/// Strategy for object keys.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,7}").expect("Invalid regex")
}

/// Strategy for namespace names, including ones that need percent-encoding.
pub fn namespace_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_][a-zA-Z0-9_ .-]{0,15}").expect("Invalid regex")
}

/// Strategy for scalar values.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,16}".prop_map(Value::from),
    ]
}

/// Strategy for arbitrary values nested up to `depth` levels.
pub fn value_strategy(depth: u32) -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(depth, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map(key_strategy(), inner, 0..6).prop_map(Value::from),
        ]
    })
}

/// Strategy for documents (objects at the top level).
pub fn resource_strategy() -> impl Strategy<Value = Resource> {
    prop::collection::btree_map(key_strategy(), value_strategy(3), 0..8)
}

/// Strategy for documents built only from nested objects and scalars.
///
/// Keys are drawn from a small alphabet so that two generated documents
/// share keys often enough to exercise recursive merging.
pub fn overlapping_resource_strategy() -> impl Strategy<Value = Resource> {
    let key = prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(String::from);
    let leaf = prop_oneof![
        any::<i64>().prop_map(Value::from),
        "[a-z]{0,4}".prop_map(Value::from),
    ];
    let value = leaf.prop_recursive(3, 32, 4, move |inner| {
        prop::collection::btree_map(
            prop::sample::select(vec!["a", "b", "c", "d"]).prop_map(String::from),
            inner,
            0..4,
        )
        .prop_map(Value::from)
    });
    prop::collection::btree_map(key, value, 0..4)
}

/// Strategy for whole store snapshots.
pub fn snapshot_strategy() -> impl Strategy<Value = Snapshot> {
    prop::collection::hash_map(namespace_strategy(), resource_strategy(), 0..6)
}

/// Test configuration for property tests.
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a config for quick tests.
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Creates a config for thorough tests.
    pub fn thorough() -> Self {
        Self {
            cases: 1000,
            max_shrink_iters: 10000,
        }
    }

    /// Converts to a proptest config.
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #![proptest_config(PropTestConfig::quick().to_proptest_config())]

        #[test]
        fn namespace_is_valid(name in namespace_strategy()) {
            prop_assert!(!name.is_empty());
            prop_assert!(!name.contains('/'));
        }

        #[test]
        fn documents_serialize_as_objects(doc in resource_strategy()) {
            let json = serde_json::to_string(&doc).unwrap();
            prop_assert!(json.starts_with('{'), "serialized document should start with '{{'");
        }

        #[test]
        fn overlapping_documents_have_no_arrays(doc in overlapping_resource_strategy()) {
            fn no_arrays(value: &Value) -> bool {
                match value {
                    Value::Array(_) => false,
                    Value::Object(map) => map.values().all(no_arrays),
                    _ => true,
                }
            }
            prop_assert!(doc.values().all(no_arrays));
        }
    }
}
