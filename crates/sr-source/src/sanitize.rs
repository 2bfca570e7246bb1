use sr_core::{ErrorKind, ScriptError};

/// Substrings that block execution wherever they appear in the script text.
pub const DENIED_PATTERNS: [&str; 8] = [
    "process.",
    "require(",
    "import(",
    "eval(",
    " Function(",
    "__dirname",
    "__filename",
    "global.",
];

pub fn find_denied_pattern(code: &str) -> Option<&'static str> {
    DENIED_PATTERNS
        .iter()
        .copied()
        .find(|pattern| code.contains(pattern))
}

pub fn is_safe(code: &str) -> bool {
    find_denied_pattern(code).is_none()
}

pub fn assert_safe(code: &str) -> Result<(), ScriptError> {
    match find_denied_pattern(code) {
        None => Ok(()),
        Some(pattern) => Err(ScriptError::with_detail(
            ErrorKind::UnsafeCode,
            format!(
                "Potentially unsafe code pattern detected, ensure the code does not contain any of the following patterns: {}",
                DENIED_PATTERNS.join(", ")
            ),
            format!("matched pattern \"{}\"", pattern),
        )),
    }
}
