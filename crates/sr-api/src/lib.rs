use serde_json::Value;
use sr_core::{ErrorKind, ScriptError, ValuesMap, RUNTIME_PREFIX};
use sr_runtime::{Sandbox, SandboxOptions};
use sr_source::{check_structure, format_script, replace_placeholders};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct RunScriptOptions {
    pub code: String,
    pub current_values: ValuesMap,
    pub default_values: ValuesMap,
    pub debug: bool,
}

#[derive(Debug, Clone)]
pub struct ScriptRunnerOptions {
    pub sandbox: SandboxOptions,
    /// Re-indent the substituted script before validation.
    pub reformat: bool,
}

impl Default for ScriptRunnerOptions {
    fn default() -> Self {
        Self {
            sandbox: SandboxOptions::default(),
            reformat: true,
        }
    }
}

/// Substitution, optional reformatting, validation and sandboxed execution.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    sandbox: Sandbox,
    reformat: bool,
}

impl Default for ScriptRunner {
    fn default() -> Self {
        Self::new(ScriptRunnerOptions::default())
    }
}

impl ScriptRunner {
    pub fn new(options: ScriptRunnerOptions) -> Self {
        Self {
            sandbox: Sandbox::new(options.sandbox),
            reformat: options.reformat,
        }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    /// Runs the whole pipeline for one request.
    ///
    /// Substitution failures keep their own kind and are not stage-prefixed;
    /// everything raised from validation onwards is.
    pub async fn run(&self, options: &RunScriptOptions) -> Result<Value, ScriptError> {
        let debug = options.debug;
        let processed = replace_placeholders(
            &options.code,
            &options.current_values,
            &options.default_values,
        )
        .map_err(|error| ScriptError {
            message: format!("Failed to process placeholders: {}", error.message),
            ..error
        })?;
        if debug {
            info!("/run-script Code after placeholder substitution:\n{}", processed);
        }

        let prepared = if self.reformat {
            reformat_or_original(&processed, debug)
        } else {
            processed
        };

        let value = self.prepare_and_run(&prepared, debug).await?;
        if value.is_null() {
            warn!("Code execution returned null, if this is not expected, check the code");
        }
        Ok(value)
    }

    /// Structural checks followed by sandboxed execution.
    pub async fn prepare_and_run(&self, code: &str, debug: bool) -> Result<Value, ScriptError> {
        self.validate_and_execute(code, debug)
            .await
            .map_err(|error| {
                if debug {
                    warn!(kind = %error.kind, "/run-script Error executing backend code: {}", error.message);
                }
                error.with_stage_prefix()
            })
    }

    async fn validate_and_execute(&self, code: &str, debug: bool) -> Result<Value, ScriptError> {
        let code = check_structure(code)?;
        if debug {
            info!("/run-script Executing backend code:\n{}", code);
        }

        self.sandbox.run(code, debug).await.map_err(|error| {
            if error.kind != ErrorKind::Runtime {
                return error;
            }
            if debug {
                warn!("/run-script Runtime error: {}\nCode that caused error:\n{}", error.message, code);
            }
            error.with_context(RUNTIME_PREFIX)
        })
    }
}

/// Best-effort reformatting; on failure the input is returned unchanged.
pub fn reformat_or_original(code: &str, debug: bool) -> String {
    match format_script(code) {
        Ok(formatted) => {
            if debug {
                info!("Code formatted successfully\n{}", formatted);
            }
            formatted
        }
        Err(error) => {
            if debug {
                warn!("Formatting failed: {}. Using unformatted code instead", error.message);
            }
            code.to_string()
        }
    }
}
