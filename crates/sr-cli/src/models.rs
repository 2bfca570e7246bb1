use serde::Serialize;
use serde_json::Value;
use sr_api::RunScriptOptions;
use sr_core::{script_type_name, ValuesMap};

pub(crate) const MISSING_WRAPPERS_MESSAGE: &str =
    "Missing required objects: codeSnippet, newValues, and defaultValues are all required.";

/// `{success: true, result}`
#[derive(Debug, Serialize)]
pub(crate) struct SuccessBody {
    pub(crate) success: bool,
    pub(crate) result: Value,
}

/// 400 body. `received` names the offending JavaScript type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct ClientErrorBody {
    pub(crate) error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) received: Option<String>,
}

impl ClientErrorBody {
    pub(crate) fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            received: None,
        }
    }

    fn with_received(error: impl Into<String>, received: Option<&Value>) -> Self {
        Self {
            error: error.into(),
            received: Some(script_type_name(received).to_string()),
        }
    }
}

/// 500 body.
#[derive(Debug, Serialize)]
pub(crate) struct ServerErrorBody {
    pub(crate) success: bool,
    pub(crate) error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) details: Option<String>,
}

/// Reads the `debugMode.value` flag; anything but `true` is off.
pub(crate) fn debug_flag(body: &Value) -> bool {
    body.get("debugMode")
        .and_then(|wrapper| wrapper.get("value"))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Checks the `{codeSnippet, newValues, defaultValues}` wrappers and unwraps
/// their `value` fields.
pub(crate) fn parse_request(body: &Value) -> Result<RunScriptOptions, ClientErrorBody> {
    let wrapper = move |name: &str| body.get(name).filter(|value| !value.is_null());
    let (Some(code_snippet), Some(new_values), Some(default_values)) = (
        wrapper("codeSnippet"),
        wrapper("newValues"),
        wrapper("defaultValues"),
    ) else {
        return Err(ClientErrorBody::new(MISSING_WRAPPERS_MESSAGE));
    };

    let code = code_snippet.get("value");
    let Some(Value::String(code)) = code else {
        return Err(ClientErrorBody::with_received(
            "codeSnippet.value must be a string",
            code,
        ));
    };
    let current_values = values_object(new_values.get("value"), "newValues")?;
    let default_values = values_object(default_values.get("value"), "defaultValues")?;

    Ok(RunScriptOptions {
        code: code.clone(),
        current_values,
        default_values,
        debug: debug_flag(body),
    })
}

fn values_object(value: Option<&Value>, wrapper: &str) -> Result<ValuesMap, ClientErrorBody> {
    match value {
        Some(Value::Object(map)) => Ok(map.clone()),
        other => Err(ClientErrorBody::with_received(
            format!("{wrapper}.value must be an object"),
            other,
        )),
    }
}
