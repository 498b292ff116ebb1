//! Recursive structural merge of documents.
//!
//! Nested documents are combined key by key. Every other collision is
//! resolved in favour of the incoming value:
//!
//! | base        | incoming    | result                 |
//! |-------------|-------------|------------------------|
//! | absent      | any         | incoming               |
//! | object      | object      | recursive merge        |
//! | object      | non-object  | incoming (overwrite)   |
//! | non-object  | any         | incoming (overwrite)   |
//!
//! Arrays are scalars for the purpose of merging: they are replaced whole,
//! never concatenated or merged element-wise.

use crate::value::{Resource, Value};
use std::collections::btree_map::Entry;

/// Merges `incoming` into `base` in place.
///
/// An empty `incoming` leaves `base` untouched.
///
/// # Example
///
/// ```rust
/// use nestdb_core::{merge, Resource, Value};
///
/// let mut base: Resource = serde_json::from_str(r#"{"n":{"x":1}}"#).unwrap();
/// let incoming: Resource = serde_json::from_str(r#"{"n":{"y":2}}"#).unwrap();
/// merge(&mut base, incoming);
///
/// let n = base["n"].as_object().unwrap();
/// assert_eq!(n["x"], Value::from(1i64));
/// assert_eq!(n["y"], Value::from(2i64));
/// ```
pub fn merge(base: &mut Resource, incoming: Resource) {
    for (key, incoming_value) in incoming {
        match base.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(incoming_value);
            }
            Entry::Occupied(mut slot) => merge_value(slot.get_mut(), incoming_value),
        }
    }
}

/// By-value form of [`merge`]: returns `base` combined with `incoming`.
#[must_use]
pub fn merged(mut base: Resource, incoming: Resource) -> Resource {
    merge(&mut base, incoming);
    base
}

fn merge_value(existing: &mut Value, incoming: Value) {
    match (existing, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => merge(existing, incoming),
        (existing, incoming) => *existing = incoming,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(json: serde_json::Value) -> Resource {
        Value::from(json).into_resource().unwrap()
    }

    #[test]
    fn adds_missing_keys() {
        let result = merged(doc(json!({"foo": "bar"})), doc(json!({"baz": "bax"})));
        assert_eq!(result, doc(json!({"foo": "bar", "baz": "bax"})));
    }

    #[test]
    fn scalar_collision_takes_incoming() {
        let result = merged(doc(json!({"a": 1})), doc(json!({"a": 2})));
        assert_eq!(result, doc(json!({"a": 2})));
    }

    #[test]
    fn nested_objects_recurse() {
        let result = merged(doc(json!({"n": {"x": 1}})), doc(json!({"n": {"y": 2}})));
        assert_eq!(result, doc(json!({"n": {"x": 1, "y": 2}})));
    }

    #[test]
    fn deep_nesting_recurses_at_every_level() {
        let base = doc(json!({"a": {"b": {"c": 1, "keep": true}}}));
        let incoming = doc(json!({"a": {"b": {"c": 2, "d": [1]}}}));
        assert_eq!(
            merged(base, incoming),
            doc(json!({"a": {"b": {"c": 2, "keep": true, "d": [1]}}}))
        );
    }

    #[test]
    fn object_replaced_by_scalar() {
        let result = merged(doc(json!({"n": {"x": 1}})), doc(json!({"n": 5})));
        assert_eq!(result, doc(json!({"n": 5})));
    }

    #[test]
    fn scalar_replaced_by_object() {
        let result = merged(doc(json!({"n": 5})), doc(json!({"n": {"x": 1}})));
        assert_eq!(result, doc(json!({"n": {"x": 1}})));
    }

    #[test]
    fn arrays_are_replaced_not_concatenated() {
        let result = merged(doc(json!({"l": [1, 2, 3]})), doc(json!({"l": [4]})));
        assert_eq!(result, doc(json!({"l": [4]})));
    }

    #[test]
    fn null_overwrites() {
        let result = merged(doc(json!({"a": {"b": 1}})), doc(json!({"a": null})));
        assert_eq!(result, doc(json!({"a": null})));
    }

    #[test]
    fn empty_incoming_is_noop() {
        let base = doc(json!({"a": 1, "n": {"x": [1, 2]}}));
        assert_eq!(merged(base.clone(), Resource::new()), base);
    }

    #[test]
    fn merge_into_empty_is_incoming() {
        let incoming = doc(json!({"a": 1, "n": {"x": 2}}));
        assert_eq!(merged(Resource::new(), incoming.clone()), incoming);
    }

    #[test]
    fn merging_twice_is_idempotent() {
        let a = doc(json!({"a": 1, "n": {"x": 1, "l": [1]}, "s": "keep"}));
        let b = doc(json!({"a": 2, "n": {"y": {"z": true}, "l": [2, 3]}, "t": null}));
        let once = merged(a, b.clone());
        let twice = merged(once.clone(), b);
        assert_eq!(once, twice);
    }

    #[test]
    fn sibling_and_nested_keys_combine() {
        let a = doc(json!({"foo": "bar", "nested": {"foo": "bar"}}));
        let b = doc(json!({"baz": "bax", "nested": {"baz": "bax"}}));
        assert_eq!(
            merged(a, b),
            doc(json!({
                "foo": "bar",
                "baz": "bax",
                "nested": {"foo": "bar", "baz": "bax"}
            }))
        );
    }
}
