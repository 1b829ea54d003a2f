//! Parameter extraction for action handlers.
//!
//! Each helper names the offending field in its [`ActionError::Validation`].

use crate::context::ContextData;
use crate::error::ActionError;
use crate::remote::EntityKind;
use serde_json::{Map, Value};

/// Free-form parameter bag carried by a request
pub type Params = Map<String, Value>;

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrong_type(field: &str, expected: &str, value: &Value) -> ActionError {
    ActionError::validation(
        field,
        format!(
            "parameter {} must be {}, got {}",
            field,
            expected,
            type_name(value)
        ),
    )
}

fn missing(field: &str) -> ActionError {
    ActionError::validation(field, format!("missing required parameter: {}", field))
}

/// Required, non-empty string
pub fn required_str<'a>(
    params: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a str, ActionError> {
    match params.get(field) {
        None | Some(Value::Null) => Err(missing(field)),
        Some(Value::String(s)) if s.is_empty() => Err(missing(field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(other) => Err(wrong_type(field, "a string", other)),
    }
}

/// Optional string; absent and `null` both read as `None`
pub fn optional_str<'a>(
    params: &'a Map<String, Value>,
    field: &str,
) -> Result<Option<&'a str>, ActionError> {
    match params.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(other) => Err(wrong_type(field, "a string", other)),
    }
}

/// Required object
pub fn required_object<'a>(
    params: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Map<String, Value>, ActionError> {
    match params.get(field) {
        None | Some(Value::Null) => Err(missing(field)),
        Some(Value::Object(object)) => Ok(object),
        Some(other) => Err(wrong_type(field, "an object", other)),
    }
}

/// Required, non-empty array
pub fn required_array<'a>(
    params: &'a Map<String, Value>,
    field: &str,
) -> Result<&'a Vec<Value>, ActionError> {
    match params.get(field) {
        None | Some(Value::Null) => Err(missing(field)),
        Some(Value::Array(items)) if items.is_empty() => Err(ActionError::validation(
            field,
            format!("parameter {} must not be empty", field),
        )),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(wrong_type(field, "an array", other)),
    }
}

/// Entity kind from `field`, else from the resolved context key `context_key`,
/// else `default`
pub fn kind_or_default(
    params: &Map<String, Value>,
    field: &str,
    context: &ContextData,
    context_key: &str,
    default: EntityKind,
) -> Result<EntityKind, ActionError> {
    if let Some(raw) = optional_str(params, field)? {
        return raw
            .parse()
            .map_err(|message: String| ActionError::validation(field, message));
    }
    match context.get(context_key) {
        Some(Value::String(raw)) => raw
            .parse()
            .map_err(|message: String| ActionError::validation(context_key, message)),
        _ => Ok(default),
    }
}
