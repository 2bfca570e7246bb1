use std::sync::Arc;
use std::time::Duration;

use boa_engine::{Context, JsError, JsString, JsValue, Source};
use serde_json::Value;
use sr_core::{ErrorKind, ScriptError};
use sr_source::assert_safe;
use tracing::info;

use crate::harness::{
    harness_source, prune_globals_source, wrap_script, FINISH_METHOD, LOCK_CONSTRUCTORS_SOURCE,
    START_METHOD,
};
use crate::report::SandboxReport;

/// Standard value builtins left visible to scripts. Everything else on the
/// global object (`eval`, `Function`, `globalThis`, `Reflect`, ...) is removed,
/// and `constructor` on function prototypes throws.
pub const DEFAULT_ALLOWED_GLOBALS: [&str; 33] = [
    "Array",
    "Boolean",
    "Date",
    "Error",
    "EvalError",
    "Infinity",
    "JSON",
    "Map",
    "Math",
    "NaN",
    "Number",
    "Object",
    "Promise",
    "RangeError",
    "ReferenceError",
    "RegExp",
    "Set",
    "String",
    "Symbol",
    "SyntaxError",
    "TypeError",
    "URIError",
    "WeakMap",
    "WeakSet",
    "decodeURI",
    "decodeURIComponent",
    "encodeURI",
    "encodeURIComponent",
    "isFinite",
    "isNaN",
    "parseFloat",
    "parseInt",
    "undefined",
];

#[derive(Debug, Clone)]
pub struct SandboxOptions {
    /// Wall-clock budget for one script, measured from submission to the worker.
    pub deadline: Duration,
    pub loop_iteration_limit: u64,
    pub recursion_limit: usize,
    pub allowed_globals: Vec<String>,
}

impl Default for SandboxOptions {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(5),
            loop_iteration_limit: 1_000_000,
            recursion_limit: 512,
            allowed_globals: DEFAULT_ALLOWED_GLOBALS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Runs untrusted script bodies in a fresh interpreter context per call.
#[derive(Debug, Clone, Default)]
pub struct Sandbox {
    options: Arc<SandboxOptions>,
}

impl Sandbox {
    pub fn new(options: SandboxOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    pub fn options(&self) -> &SandboxOptions {
        &self.options
    }

    /// Executes `script` as the body of an async function and returns the value
    /// it settles with.
    ///
    /// The only binding handed to the script is a `console` facade that records
    /// nothing unless `debug` is set.
    pub async fn run(&self, script: &str, debug: bool) -> Result<Value, ScriptError> {
        assert_safe(script)?;

        let options = Arc::clone(&self.options);
        let source = script.to_string();
        let worker =
            tokio::task::spawn_blocking(move || execute_blocking(&source, debug, &options));

        let report = match tokio::time::timeout(self.options.deadline, worker).await {
            Ok(Ok(report)) => report?,
            Ok(Err(join_error)) => {
                return Err(ScriptError::new(
                    ErrorKind::Runtime,
                    format!("sandbox worker failed: {}", join_error),
                ))
            }
            Err(_) => {
                return Err(ScriptError::new(
                    ErrorKind::Runtime,
                    format!(
                        "Script did not finish within {} ms",
                        self.options.deadline.as_millis()
                    ),
                ))
            }
        };

        report.forward_console();
        let value = report.into_value()?;
        if debug {
            info!(result = %value, "/run-script Execution result");
        }
        Ok(value)
    }
}

fn execute_blocking(
    script: &str,
    debug: bool,
    options: &SandboxOptions,
) -> Result<SandboxReport, ScriptError> {
    let mut context = Context::default();
    context
        .runtime_limits_mut()
        .set_loop_iteration_limit(options.loop_iteration_limit);
    context
        .runtime_limits_mut()
        .set_recursion_limit(options.recursion_limit);

    let harness = setup(&mut context, &harness_source(debug))?;
    setup(&mut context, LOCK_CONSTRUCTORS_SOURCE)?;
    setup(&mut context, &prune_globals_source(&options.allowed_globals))?;

    let body = eval_source(&mut context, &wrap_script(script))?;
    call_method(&harness, START_METHOD, &[body], &mut context)?;
    context.run_jobs();

    let report = call_method(&harness, FINISH_METHOD, &[], &mut context)?;
    let text = report
        .as_string()
        .map(|text| text.to_std_string_escaped())
        .ok_or_else(|| ScriptError::new(ErrorKind::Runtime, "sandbox report is not a string"))?;
    SandboxReport::parse(&text)
}

fn setup(context: &mut Context, source: &str) -> Result<JsValue, ScriptError> {
    eval_source(context, source).map_err(|error| ScriptError {
        message: format!("sandbox setup failed: {}", error.message),
        ..error
    })
}

fn call_method(
    target: &JsValue,
    name: &str,
    args: &[JsValue],
    context: &mut Context,
) -> Result<JsValue, ScriptError> {
    let method = target
        .as_object()
        .ok_or_else(|| ScriptError::new(ErrorKind::Runtime, "sandbox harness is not an object"))?
        .get(JsString::from(name), context)
        .map_err(runtime_error)?;
    let method = method.as_callable().ok_or_else(|| {
        ScriptError::new(
            ErrorKind::Runtime,
            format!("sandbox harness has no `{}` method", name),
        )
    })?;
    method
        .call(&JsValue::undefined(), args, context)
        .map_err(runtime_error)
}

fn runtime_error(error: JsError) -> ScriptError {
    ScriptError::new(ErrorKind::Runtime, error.to_string())
}

fn eval_source(context: &mut Context, source: &str) -> Result<JsValue, ScriptError> {
    context
        .eval(Source::from_bytes(source))
        .map_err(runtime_error)
}
