use serde_json::Value;

/// How deep the fallback scan descends before giving up on a branch.
const MAX_SCAN_DEPTH: usize = 16;

/// Keys that hold a tweet ID, in any response shape we have seen.
const ID_KEYS: [&str; 3] = ["id", "rest_id", "tweet_id"];

/// Well-known locations checked before any scanning happens.
const PRIORITY_PATHS: [&[&str]; 2] = [
    &["data", "create_tweet", "tweet_results", "result", "rest_id"],
    &["data", "id"],
];

/// Resolves the ID of a freshly created tweet from a raw API response.
///
/// Known response shapes are checked first; when none of them match, a
/// depth-bounded scan walks the document in declaration order and returns
/// the first ID-shaped value it finds. String and integer values both
/// count, anything else does not.
pub fn find_tweet_id(response: &Value) -> Option<String> {
    for path in PRIORITY_PATHS {
        let mut node = response;
        let mut matched = true;
        for key in path {
            match node.get(key) {
                Some(next) => node = next,
                None => {
                    matched = false;
                    break;
                }
            }
        }
        if matched {
            if let Some(id) = id_value(node) {
                return Some(id);
            }
        }
    }

    scan(response, 0)
}

fn scan(node: &Value, depth: usize) -> Option<String> {
    if depth > MAX_SCAN_DEPTH {
        return None;
    }

    match node {
        Value::Object(map) => {
            // Single in-order pass: an id-named key is taken where it
            // appears, and other entries are descended into before the
            // next key is considered.
            for (key, value) in map {
                if ID_KEYS.contains(&key.as_str()) {
                    if let Some(id) = id_value(value) {
                        return Some(id);
                    }
                }
                if let Some(id) = scan(value, depth + 1) {
                    return Some(id);
                }
            }
            None
        }
        Value::Array(items) => items.iter().find_map(|v| scan(v, depth + 1)),
        _ => None,
    }
}

fn id_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => n.as_i64().map(|i| i.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_graphql_create_tweet_shape() {
        let response = json!({
            "data": {
                "create_tweet": {
                    "tweet_results": {
                        "result": { "rest_id": "1234567890" }
                    }
                }
            }
        });
        assert_eq!(find_tweet_id(&response).as_deref(), Some("1234567890"));
    }

    #[test]
    fn test_flat_data_id_shape() {
        let response = json!({ "data": { "id": "42" } });
        assert_eq!(find_tweet_id(&response).as_deref(), Some("42"));
    }

    #[test]
    fn test_priority_path_beats_deeper_scan_match() {
        // A scan would reach "tweet_id" first in enumeration order at the
        // top level, but the known path wins.
        let response = json!({
            "tweet_id": "999",
            "data": { "id": "42" }
        });
        assert_eq!(find_tweet_id(&response).as_deref(), Some("42"));
    }

    #[test]
    fn test_scan_finds_nested_rest_id() {
        let response = json!({
            "result": {
                "wrapper": {
                    "tweet": { "rest_id": "777" }
                }
            }
        });
        assert_eq!(find_tweet_id(&response).as_deref(), Some("777"));
    }

    #[test]
    fn test_scan_descends_in_enumeration_order() {
        // A nested id under an earlier key wins over a shallower id that
        // only appears later in the object.
        let response = json!({
            "a": { "id": "1" },
            "id": "2"
        });
        assert_eq!(find_tweet_id(&response).as_deref(), Some("1"));
    }

    #[test]
    fn test_scan_accepts_integer_ids() {
        let response = json!({ "nested": { "id": 314159 } });
        assert_eq!(find_tweet_id(&response).as_deref(), Some("314159"));
    }

    #[test]
    fn test_scan_ignores_non_scalar_id_values() {
        let response = json!({ "id": { "inner": true }, "other": { "rest_id": "5" } });
        assert_eq!(find_tweet_id(&response).as_deref(), Some("5"));
    }

    #[test]
    fn test_scan_walks_arrays() {
        let response = json!({ "items": [{ "noise": 1 }, { "tweet_id": "88" }] });
        assert_eq!(find_tweet_id(&response).as_deref(), Some("88"));
    }

    #[test]
    fn test_empty_object_yields_none() {
        assert_eq!(find_tweet_id(&json!({})), None);
        assert_eq!(find_tweet_id(&json!(null)), None);
    }

    #[test]
    fn test_scan_respects_depth_bound() {
        let mut response = json!({ "id": "deep" });
        for _ in 0..(MAX_SCAN_DEPTH + 2) {
            response = json!({ "wrap": response });
        }
        assert_eq!(find_tweet_id(&response), None);
    }
}
