//! Response parser: isolate and decode the JSON object in a model reply.
//!
//! Replies routinely wrap the requested object in prose ("Here you go:
//! {...}. Let me know if..."), so the parser scans for the first
//! brace-delimited region with a non-greedy match and decodes only that.
//!
//! Known limitation: the scan is a heuristic, not a JSON-aware reader. A
//! literal `}` inside a string value truncates the candidate at that brace
//! and the decode then fails, so the whole reply is treated as unparseable.
//! This matches the documented contract; see the `nested_brace_*` test.

use crate::output::FieldMap;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static RE_JSON_OBJECT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{[\s\S]*?\}").unwrap());

/// Return the first `{...}` region of `reply`, if any.
pub fn first_json_object(reply: &str) -> Option<&str> {
    RE_JSON_OBJECT.find(reply).map(|m| m.as_str())
}

/// Decode the first JSON object in `reply` into a [`FieldMap`].
///
/// Returns `None` when no brace-delimited region exists or the region does
/// not decode as a JSON object. Any decodable object is accepted; key names
/// are not validated here.
pub fn parse_fields(reply: &str) -> Option<FieldMap> {
    let candidate = match first_json_object(reply) {
        Some(c) => c,
        None => {
            warn!("Model reply contained no brace-delimited region");
            return None;
        }
    };

    match serde_json::from_str::<FieldMap>(candidate) {
        Ok(map) => Some(map),
        Err(e) => {
            warn!("Could not decode candidate JSON object: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_surrounded_by_prose() {
        let reply = r#"Here you go: {"Full Name":"John Doe","Phone":"555-1234"} Hope this helps!"#;
        let fields = parse_fields(reply).unwrap();
        assert_eq!(fields["Full Name"], json!("John Doe"));
        assert_eq!(fields["Phone"], json!("555-1234"));
    }

    #[test]
    fn bare_object_parses_identically() {
        let object = r#"{"Email":null,"DOB":"1990-01-01"}"#;
        let via_parser = parse_fields(object).unwrap();
        let direct: FieldMap = serde_json::from_str(object).unwrap();
        assert_eq!(via_parser, direct);
    }

    #[test]
    fn no_braces_is_absent() {
        assert!(parse_fields("Sorry, I could not find any fields.").is_none());
    }

    #[test]
    fn malformed_region_is_absent() {
        assert!(parse_fields("result: {not valid json}").is_none());
    }

    #[test]
    fn empty_object_is_an_empty_map() {
        let fields = parse_fields("{}").unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn first_of_two_objects_wins() {
        let reply = r#"{"a":1} and later {"b":2}"#;
        let fields = parse_fields(reply).unwrap();
        assert_eq!(fields["a"], json!(1));
        assert!(!fields.contains_key("b"));
    }

    // Pins the documented limitation: a `}` inside a string value truncates
    // the candidate region and the decode fails.
    #[test]
    fn nested_brace_in_string_value_is_absent() {
        let reply = r#"{"note":"ends with } inside","Phone":"555"}"#;
        assert_eq!(first_json_object(reply), Some(r#"{"note":"ends with }"#));
        assert!(parse_fields(reply).is_none());
    }
}
