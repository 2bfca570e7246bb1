use std::ffi::OsString;
use std::fs;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use serde_json::Value;
use sr_api::{RunScriptOptions, ScriptRunner};
use sr_core::ValuesMap;
use tracing::{info, Level};

mod cli_args;
mod config;
mod endpoint;
mod error_map;
mod models;
mod telemetry;

pub(crate) use cli_args::{Cli, Environment, Mode, RunArgs, RuntimeArgs, ServeArgs};
pub(crate) use endpoint::{router, AppState};
#[cfg(test)]
pub(crate) use endpoint::run_script;
pub(crate) use error_map::{emit_error, emit_result};
pub(crate) use models::{
    debug_flag, parse_request, ClientErrorBody, ServerErrorBody, SuccessBody,
};
pub(crate) use telemetry::init_tracing;

pub fn run_cli_from_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(error) => {
            let _ = error.print();
            return error.exit_code();
        }
    };
    match run(cli) {
        Ok(code) => code,
        Err(error) => emit_error(error),
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    match cli.command {
        Mode::Serve(args) => {
            init_tracing(cli.log_json, Level::INFO);
            runtime.block_on(serve(args))?;
            Ok(0)
        }
        Mode::Run(args) => {
            let level = if args.debug { Level::INFO } else { Level::WARN };
            init_tracing(cli.log_json, level);
            let result = runtime.block_on(run_script_file(args))?;
            Ok(emit_result(&result))
        }
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let state = AppState {
        runner: Arc::new(ScriptRunner::new(args.runtime.runner_options())),
        environment: args.environment,
    };
    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    info!(
        bind = %args.bind,
        environment = ?args.environment,
        "serving POST /run-script"
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server stopped unexpectedly")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}

async fn run_script_file(args: RunArgs) -> anyhow::Result<Value> {
    let code = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read script {}", args.script))?;
    let options = RunScriptOptions {
        code,
        current_values: read_values_file(args.values.as_deref())?,
        default_values: read_values_file(args.defaults.as_deref())?,
        debug: args.debug,
    };
    let runner = ScriptRunner::new(args.runtime.runner_options());
    Ok(runner.run(&options).await?)
}

fn read_values_file(path: Option<&str>) -> anyhow::Result<ValuesMap> {
    let Some(path) = path else {
        return Ok(ValuesMap::new());
    };
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read values {}", path))?;
    match serde_json::from_str::<Value>(&raw)
        .with_context(|| format!("invalid JSON in {}", path))?
    {
        Value::Object(map) => Ok(map),
        _ => bail!("{} must contain a JSON object", path),
    }
}
