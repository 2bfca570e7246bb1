use serde_json::{Number, Value};

use crate::{ErrorKind, ScriptError};

/// Field name to value mapping for one side of the record (current or default).
pub type ValuesMap = serde_json::Map<String, Value>;

/// Renders a resolved field value the way it is spliced into script text.
///
/// Objects and arrays become compact JSON, strings are inserted raw and
/// numbers use the shortest decimal form without a trailing `.0`.
pub fn value_to_script_text(value: &Value) -> Result<String, ScriptError> {
    match value {
        Value::Null => Ok("null".to_string()),
        Value::Bool(value) => Ok(value.to_string()),
        Value::Number(value) => Ok(number_to_script_text(value)),
        Value::String(value) => Ok(value.clone()),
        Value::Array(_) | Value::Object(_) => serde_json::to_string(value).map_err(|error| {
            ScriptError::new(
                ErrorKind::Substitution,
                format!("value could not be serialized: {}", error),
            )
        }),
    }
}

pub fn number_to_script_text(value: &Number) -> String {
    if value.is_i64() || value.is_u64() {
        return value.to_string();
    }
    match value.as_f64() {
        Some(float) if float == 0.0 => "0".to_string(),
        Some(float) if float.is_finite() && float.fract() == 0.0 && float.abs() < 1e21 => {
            format!("{:.0}", float)
        }
        Some(float) => float.to_string(),
        None => value.to_string(),
    }
}

/// Name of the value's type as a script author would see it; absent values are `undefined`.
pub fn script_type_name(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) | Some(Value::Object(_)) => "object",
        Some(Value::Array(_)) => "array",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
    }
}
