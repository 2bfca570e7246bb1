use serde::Deserialize;
use serde_json::Value;
use sr_core::{ErrorKind, ScriptError};

pub(crate) const NO_RESULT_MESSAGE: &str = "Code execution returned no result";

/// How the wrapped async function settled, as recorded by the harness.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub(crate) enum Outcome {
    Pending,
    Fulfilled {
        json: String,
    },
    Undefined,
    Unserializable {
        message: String,
    },
    Rejected {
        message: String,
        #[serde(default)]
        name: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct ConsoleLine {
    pub(crate) level: String,
    pub(crate) line: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub(crate) struct SandboxReport {
    pub(crate) outcome: Outcome,
    #[serde(default)]
    pub(crate) logs: Vec<ConsoleLine>,
}

impl SandboxReport {
    pub(crate) fn parse(text: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(text).map_err(|error| {
            ScriptError::new(
                ErrorKind::Runtime,
                format!("sandbox report is malformed: {}", error),
            )
        })
    }

    pub(crate) fn forward_console(&self) {
        for entry in &self.logs {
            match entry.level.as_str() {
                "error" => tracing::error!(target: "script_console", "{}", entry.line),
                "warn" => tracing::warn!(target: "script_console", "{}", entry.line),
                "debug" => tracing::debug!(target: "script_console", "{}", entry.line),
                _ => tracing::info!(target: "script_console", "{}", entry.line),
            }
        }
    }

    pub(crate) fn into_value(self) -> Result<Value, ScriptError> {
        match self.outcome {
            Outcome::Fulfilled { json } => serde_json::from_str(&json).map_err(|error| {
                ScriptError::new(
                    ErrorKind::Runtime,
                    format!("script result is not valid JSON: {}", error),
                )
            }),
            Outcome::Undefined => Err(ScriptError::new(ErrorKind::Runtime, NO_RESULT_MESSAGE)),
            Outcome::Pending => Err(ScriptError::new(
                ErrorKind::Runtime,
                "Script did not settle: the returned promise is still pending after all queued jobs ran",
            )),
            Outcome::Unserializable { message } => Err(ScriptError::new(
                ErrorKind::Runtime,
                format!("Script result cannot be converted to JSON: {}", message),
            )),
            Outcome::Rejected { message, name } => Err(match name {
                Some(name) => ScriptError::with_detail(ErrorKind::Runtime, message, name),
                None => ScriptError::new(ErrorKind::Runtime, message),
            }),
        }
    }
}
