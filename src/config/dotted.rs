//! Dotted-key mapping utilities
//!
//! Flat key/value overrides use `.` in keys to denote nesting
//! (`cache.mode = "on"`). These helpers expand such keys into nested
//! objects and merge the results with base-wins precedence, so that
//! caller-supplied values override defaults when the override side is
//! passed as the first operand.

use serde_json::{Map, Value};

/// Expand a single dotted key into a nested object terminating in `value`.
///
/// `"a.b.c"` becomes `{"a": {"b": {"c": value}}}`; a key without a dot
/// becomes a single-level `{key: value}`.
pub fn dotted_to_nested(key: &str, value: Value) -> Value {
    key.rsplit('.').fold(value, |inner, segment| {
        let mut map = Map::new();
        map.insert(segment.to_string(), inner);
        Value::Object(map)
    })
}

/// Expand every dotted key in a flat mapping into nested structure.
///
/// Each key is expanded via [`dotted_to_nested`] and the single-entry
/// results are deep-merged into one accumulator. Keys without a dot pass
/// through unchanged. Merge order does not matter: colliding paths only
/// occur for genuinely nested siblings (`foo.lol` and `foo.lal`), never
/// for the same leaf twice.
pub fn expand_dotted_keys(flat: Map<String, Value>) -> Value {
    let mut expanded = Value::Object(Map::new());
    for (key, value) in flat {
        expanded = deep_merge(expanded, dotted_to_nested(&key, value));
    }
    expanded
}

/// Deep merge two values with base-wins precedence.
///
/// Merge semantics:
/// - Both objects: deep-merge by key (recursive)
/// - Key only in `b`: carried through unchanged
/// - Any conflict that is not object/object: `a` wins
///
/// This is base/caller priority, NOT last-write-wins: pass overrides as
/// `a` and defaults as `b`.
pub fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (key, b_value) in b_map {
                let merged = if let Some(a_value) = a_map.remove(&key) {
                    deep_merge(a_value, b_value)
                } else {
                    b_value
                };
                a_map.insert(key, merged);
            }
            Value::Object(a_map)
        }

        // Scalars, arrays, mixed kinds: a wins
        (a, _) => a,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flat(entries: &[(&str, &str)]) -> Map<String, Value> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect()
    }

    #[test]
    fn test_dotted_to_nested_no_dot() {
        let result = dotted_to_nested("foo", json!("bar"));
        assert_eq!(result, json!({"foo": "bar"}));
    }

    #[test]
    fn test_dotted_to_nested_one_level() {
        let result = dotted_to_nested("foo.faa", json!("bar"));
        assert_eq!(result, json!({"foo": {"faa": "bar"}}));
    }

    #[test]
    fn test_dotted_to_nested_two_levels() {
        let result = dotted_to_nested("foo.faa.bri", json!("bar"));
        assert_eq!(result, json!({"foo": {"faa": {"bri": "bar"}}}));
    }

    #[test]
    fn test_deep_merge_disjoint_keys() {
        let result = deep_merge(json!({"foo": "bor"}), json!({"faa": "bar"}));
        assert_eq!(result, json!({"faa": "bar", "foo": "bor"}));
    }

    #[test]
    fn test_deep_merge_scalar_conflict_base_wins() {
        let result = deep_merge(json!({"foo": "bor"}), json!({"foo": "bar"}));
        assert_eq!(result, json!({"foo": "bor"}));
    }

    #[test]
    fn test_deep_merge_nested_siblings() {
        let result = deep_merge(
            json!({"foo": {"lol": "bor"}}),
            json!({"foo": {"lal": "bar"}}),
        );
        assert_eq!(result, json!({"foo": {"lol": "bor", "lal": "bar"}}));
    }

    #[test]
    fn test_deep_merge_carries_unrelated_keys() {
        let result = deep_merge(
            json!({"aa": "bb", "foo": {"lol": "bor"}}),
            json!({"foo": {"lal": "bar"}}),
        );
        assert_eq!(
            result,
            json!({"aa": "bb", "foo": {"lol": "bor", "lal": "bar"}})
        );
    }

    #[test]
    fn test_deep_merge_empty_operand() {
        let a = json!({"foo": "bor"});
        assert_eq!(deep_merge(a.clone(), json!({})), a);
        assert_eq!(deep_merge(json!({}), a.clone()), a);
    }

    #[test]
    fn test_deep_merge_idempotent() {
        let a = json!({"foo": {"lol": "bor"}});
        let b = json!({"foo": {"lal": "bar"}, "aa": "bb"});
        let merged = deep_merge(a.clone(), b);
        assert_eq!(deep_merge(a, merged.clone()), merged);
    }

    #[test]
    fn test_expand_no_dots_passes_through() {
        let result = expand_dotted_keys(flat(&[("foo", "bor"), ("faa", "bar")]));
        assert_eq!(result, json!({"faa": "bar", "foo": "bor"}));
    }

    #[test]
    fn test_expand_single_key() {
        let result = expand_dotted_keys(flat(&[("foo", "bor")]));
        assert_eq!(result, json!({"foo": "bor"}));
    }

    #[test]
    fn test_expand_colliding_prefixes() {
        let result = expand_dotted_keys(flat(&[("foo.lol", "bor"), ("foo.lal", "bar")]));
        assert_eq!(result, json!({"foo": {"lol": "bor", "lal": "bar"}}));
    }

    #[test]
    fn test_expand_mixed_dotted_and_plain() {
        let result = expand_dotted_keys(flat(&[
            ("aa", "bb"),
            ("foo.lol", "bor"),
            ("foo.lal", "bar"),
        ]));
        assert_eq!(result, json!({"aa": "bb", "foo": {"lol": "bor", "lal": "bar"}}));
    }

    #[test]
    fn test_expand_empty_mapping() {
        let result = expand_dotted_keys(Map::new());
        assert_eq!(result, json!({}));
    }
}
