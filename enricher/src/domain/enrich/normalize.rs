//! Key normalization for lookup responses
//!
//! Lookup backends hand back a generic tree of mappings and scalars. The
//! stage works on [`AttributeSet`]s whose keys are text at every level, so
//! any backend value goes through [`normalize_attributes`] before it is
//! cached or reconciled.

use serde::Serialize;
use serde_json::Value;

use super::error::LookupError;
use crate::data::types::AttributeSet;
use crate::utils::json::json_type;

/// Convert any serializable tree into an [`AttributeSet`].
///
/// `serde_json::to_value` renders non-text map keys (integers, booleans,
/// chars, unit enum variants) as text at every level, including mappings
/// nested in lists. The root must be a mapping; anything else is a
/// malformed response.
pub fn normalize_attributes<T>(tree: &T) -> Result<AttributeSet, LookupError>
where
    T: Serialize + ?Sized,
{
    let value =
        serde_json::to_value(tree).map_err(|e| LookupError::Malformed(e.to_string()))?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(LookupError::Malformed(format!(
            "expected a mapping of attributes, got {}",
            json_type(&other)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_object_passes_through_in_order() {
        let raw = json!({ "ip": "8.8.8.8", "city": "Mountain View", "country": "US" });
        let attributes = normalize_attributes(&raw).unwrap();

        let keys: Vec<&str> = attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["ip", "city", "country"]);
        assert_eq!(attributes["city"], "Mountain View");
    }

    #[test]
    fn test_numeric_keys_become_text_recursively() {
        let mut inner: BTreeMap<u32, &str> = BTreeMap::new();
        inner.insert(15169, "Google LLC");

        let mut outer: BTreeMap<&str, BTreeMap<u32, &str>> = BTreeMap::new();
        outer.insert("asn", inner);

        let attributes = normalize_attributes(&outer).unwrap();
        assert_eq!(attributes["asn"]["15169"], "Google LLC");
    }

    #[test]
    fn test_nested_objects_inside_arrays() {
        let raw = json!({ "ranges": [{ "cidr": "8.8.8.0/24" }] });
        let attributes = normalize_attributes(&raw).unwrap();
        assert_eq!(attributes["ranges"][0]["cidr"], "8.8.8.0/24");
    }

    #[test]
    fn test_numeric_keys_inside_lists_become_text() {
        let mut port: BTreeMap<u16, &str> = BTreeMap::new();
        port.insert(53, "dns");

        let mut outer: BTreeMap<&str, Vec<BTreeMap<u16, &str>>> = BTreeMap::new();
        outer.insert("services", vec![port]);

        let attributes = normalize_attributes(&outer).unwrap();
        assert_eq!(attributes["services"][0]["53"], "dns");
    }

    #[test]
    fn test_non_mapping_root_is_malformed() {
        let err = normalize_attributes(&json!(["8.8.8.8"])).unwrap_err();
        match err {
            LookupError::Malformed(msg) => assert!(msg.contains("an array")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let raw = json!({ "asn": { "asn": "AS15169", "route": "8.8.8.0/24" } });
        let once = normalize_attributes(&raw).unwrap();
        let twice = normalize_attributes(&once).unwrap();
        assert_eq!(once, twice);
    }
}
