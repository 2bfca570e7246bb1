use sr_core::ScriptError;

const CLI_ERROR_CODE: &str = "CLI_ERROR";

/// Prints the failure block and returns the process exit code.
pub(crate) fn emit_error(error: anyhow::Error) -> i32 {
    let (code, message) = match error.downcast_ref::<ScriptError>() {
        Some(script_error) => (script_error.kind.code(), script_error.message.clone()),
        None => (CLI_ERROR_CODE, format!("{error:#}")),
    };
    println!("RESULT:ERROR");
    println!("ERROR_CODE:{}", code);
    println!(
        "ERROR_MSG_JSON:{}",
        serde_json::to_string(&message).unwrap_or_else(|_| "\"Unknown error\"".to_string())
    );
    1
}

pub(crate) fn emit_result(result: &serde_json::Value) -> i32 {
    println!("RESULT:OK");
    println!(
        "RESULT_JSON:{}",
        serde_json::to_string(result).unwrap_or_else(|_| "null".to_string())
    );
    0
}
