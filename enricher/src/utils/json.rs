//! JSON utility functions

use serde_json::Value as JsonValue;

/// Human-readable name of a JSON value's type, for diagnostics.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use geoenrich::utils::json::json_type;
///
/// assert_eq!(json_type(&json!(42)), "a number");
/// assert_eq!(json_type(&json!({"k": "v"})), "an object");
/// ```
pub fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
