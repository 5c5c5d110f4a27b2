//! Request body parsing and field validation.

use lambda_http::Body;
use serde_json::{Map, Value};

use shared::{Error, Result};

/// Parsed JSON object body.
pub type Fields = Map<String, Value>;

/// Parse a request body into a JSON object.
pub fn parse_fields(body: &Body) -> Result<Fields> {
    match shared::http::body_json(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        _ => Err(Error::Validation("Invalid request body format.".to_string())),
    }
}

/// Names from `required` absent from `fields`, in the order checked.
pub fn missing_fields<'a>(required: &[&'a str], fields: &Fields) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|name| !fields.contains_key(*name))
        .collect()
}

/// Fail with the list of missing fields, if any.
pub fn require_fields(required: &[&str], fields: &Fields) -> Result<()> {
    let missing = missing_fields(required, fields);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "Missing required parameters: {}",
            missing.join(", ")
        )))
    }
}

fn invalid() -> Error {
    Error::Validation("Invalid field values.".to_string())
}

/// A present field holding a 32-bit integer.
pub fn int_field(fields: &Fields, name: &str) -> Result<i32> {
    fields
        .get(name)
        .and_then(Value::as_i64)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(invalid)
}

/// An optional integer field; `null` counts as absent.
pub fn optional_int_field(fields: &Fields, name: &str) -> Result<Option<i32>> {
    match fields.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => int_field(fields, name).map(Some),
    }
}

pub fn bool_field(fields: &Fields, name: &str) -> Result<bool> {
    fields.get(name).and_then(Value::as_bool).ok_or_else(invalid)
}

pub fn str_field(fields: &Fields, name: &str) -> Result<String> {
    fields
        .get(name)
        .and_then(Value::as_str)
        .map(String::from)
        .ok_or_else(invalid)
}
