use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(name = "sr-cli")]
#[command(about = "Form field script runner")]
pub(crate) struct Cli {
    /// Emit newline-delimited JSON log lines.
    #[arg(long = "log-json", env = "SCRIPT_RUNNER_LOG_JSON", global = true)]
    pub(crate) log_json: bool,
    #[command(subcommand)]
    pub(crate) command: Mode,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Mode {
    /// Serve `POST /run-script` over HTTP.
    Serve(ServeArgs),
    /// Run one script through the pipeline and print the result.
    Run(RunArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum Environment {
    Development,
    Production,
}

impl Environment {
    /// Whether 500 responses may carry error details.
    pub(crate) fn exposes_details(self) -> bool {
        matches!(self, Environment::Development)
    }
}

#[derive(Debug, Clone, Args)]
pub(crate) struct RuntimeArgs {
    #[arg(long = "timeout-ms", env = "SCRIPT_RUNNER_TIMEOUT_MS", default_value_t = 5000)]
    pub(crate) timeout_ms: u64,
    #[arg(long = "loop-limit", env = "SCRIPT_RUNNER_LOOP_LIMIT", default_value_t = 1_000_000)]
    pub(crate) loop_limit: u64,
    #[arg(
        long = "recursion-limit",
        env = "SCRIPT_RUNNER_RECURSION_LIMIT",
        default_value_t = 512
    )]
    pub(crate) recursion_limit: usize,
    #[arg(long = "skip-format", env = "SCRIPT_RUNNER_SKIP_FORMAT")]
    pub(crate) skip_format: bool,
}

#[derive(Debug, Args)]
pub(crate) struct ServeArgs {
    #[arg(long = "bind", env = "SCRIPT_RUNNER_BIND", default_value = "127.0.0.1:8055")]
    pub(crate) bind: String,
    #[arg(
        long = "environment",
        env = "SCRIPT_RUNNER_ENV",
        value_enum,
        default_value_t = Environment::Development
    )]
    pub(crate) environment: Environment,
    #[command(flatten)]
    pub(crate) runtime: RuntimeArgs,
}

#[derive(Debug, Args)]
pub(crate) struct RunArgs {
    #[arg(long = "script")]
    pub(crate) script: String,
    /// JSON object file with the current field values.
    #[arg(long = "values")]
    pub(crate) values: Option<String>,
    /// JSON object file with the default field values.
    #[arg(long = "defaults")]
    pub(crate) defaults: Option<String>,
    #[arg(long = "debug")]
    pub(crate) debug: bool,
    #[command(flatten)]
    pub(crate) runtime: RuntimeArgs,
}
