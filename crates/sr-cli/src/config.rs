use std::time::Duration;

use sr_api::ScriptRunnerOptions;
use sr_runtime::SandboxOptions;

use crate::RuntimeArgs;

impl RuntimeArgs {
    pub(crate) fn runner_options(&self) -> ScriptRunnerOptions {
        ScriptRunnerOptions {
            sandbox: SandboxOptions {
                deadline: Duration::from_millis(self.timeout_ms),
                loop_iteration_limit: self.loop_limit,
                recursion_limit: self.recursion_limit,
                ..SandboxOptions::default()
            },
            reformat: !self.skip_format,
        }
    }
}
