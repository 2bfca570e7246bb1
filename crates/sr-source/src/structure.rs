use sr_core::{ErrorKind, ScriptError};

/// Shallow shape checks run before any execution attempt.
///
/// Returns the trimmed script on success.
pub fn check_structure(code: &str) -> Result<&str, ScriptError> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ScriptError::new(
            ErrorKind::Structural,
            "Code string cannot be empty",
        ));
    }

    if !has_function_shape(code) {
        return Err(ScriptError::new(
            ErrorKind::Structural,
            "Code string must contain a valid function definition",
        ));
    }

    let (open, close) = bracket_counts(code);
    if open != close {
        return Err(ScriptError::with_detail(
            ErrorKind::Structural,
            "Code contains mismatched parentheses or braces",
            format!("{} opening vs {} closing", open, close),
        ));
    }

    Ok(code)
}

pub fn has_function_shape(code: &str) -> bool {
    code.contains("=>") || code.contains("function")
}

/// Counts raw `{`/`(` and `}`/`)` characters, string and comment content included.
pub fn bracket_counts(code: &str) -> (usize, usize) {
    code.chars().fold((0, 0), |(open, close), ch| match ch {
        '{' | '(' => (open + 1, close),
        '}' | ')' => (open, close + 1),
        _ => (open, close),
    })
}
