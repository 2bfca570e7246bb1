use std::fmt;

use thiserror::Error;

/// Marker prepended once to every failure leaving the validation stage.
pub const STAGE_PREFIX: &str = "/run-script Error: ";

/// Context attached to failures raised while the script itself was running.
pub const RUNTIME_PREFIX: &str = "Runtime error executing code: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Request payload is missing a wrapper or carries the wrong primitive type.
    Shape,
    /// A resolved placeholder value could not be rendered as script text.
    Substitution,
    /// The script contains a deny-listed pattern.
    UnsafeCode,
    /// Empty script, no function shape, or unbalanced braces.
    Structural,
    /// The script ran and threw, rejected, timed out or produced no usable value.
    Runtime,
    /// Reformatting failed. Never reported to callers.
    Formatting,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::Shape => "SHAPE_ERROR",
            Self::Substitution => "SUBSTITUTION_ERROR",
            Self::UnsafeCode => "UNSAFE_CODE_ERROR",
            Self::Structural => "STRUCTURAL_ERROR",
            Self::Runtime => "RUNTIME_ERROR",
            Self::Formatting => "FORMATTING_ERROR",
        }
    }

    /// Whether the failure is the caller's fault and should map to a client error.
    pub fn is_client_error(self) -> bool {
        matches!(self, Self::Shape | Self::Substitution)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ScriptError {
    pub kind: ErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl ScriptError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(
        kind: ErrorKind,
        message: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: Some(detail.into()),
        }
    }

    pub fn has_stage_prefix(&self) -> bool {
        self.message.contains(STAGE_PREFIX)
    }

    /// Prefixes the message with [`STAGE_PREFIX`] unless it already carries it
    /// anywhere, so errors re-raised through several layers are marked once.
    pub fn with_stage_prefix(mut self) -> Self {
        if !self.has_stage_prefix() {
            self.message = format!("{}{}", STAGE_PREFIX, self.message);
        }
        self
    }

    pub fn with_context(mut self, context: &str) -> Self {
        if !self.message.starts_with(context) {
            self.message = format!("{}{}", context, self.message);
        }
        self
    }
}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn display_includes_kind_code_and_message() {
        let error = ScriptError::new(ErrorKind::Structural, "Code string cannot be empty");
        assert_eq!(
            error.to_string(),
            "STRUCTURAL_ERROR: Code string cannot be empty"
        );
    }

    #[test]
    fn stage_prefix_is_applied_once() {
        let error = ScriptError::new(ErrorKind::Runtime, "boom")
            .with_stage_prefix()
            .with_stage_prefix()
            .with_stage_prefix();
        assert_eq!(error.message, "/run-script Error: boom");
        assert_eq!(error.message.matches("/run-script").count(), 1);
    }

    #[test]
    fn embedded_stage_prefix_counts_as_prefixed() {
        let error = ScriptError::new(
            ErrorKind::Runtime,
            "Runtime error executing code: /run-script Error: inner",
        )
        .with_stage_prefix();
        assert_eq!(
            error.message,
            "Runtime error executing code: /run-script Error: inner"
        );
    }

    #[test]
    fn context_is_not_duplicated() {
        let error = ScriptError::new(ErrorKind::Runtime, "boom")
            .with_context(RUNTIME_PREFIX)
            .with_context(RUNTIME_PREFIX);
        assert_eq!(error.message, "Runtime error executing code: boom");
    }

    #[test]
    fn client_error_kinds() {
        assert!(ErrorKind::Shape.is_client_error());
        assert!(ErrorKind::Substitution.is_client_error());
        assert!(!ErrorKind::UnsafeCode.is_client_error());
        assert!(!ErrorKind::Runtime.is_client_error());
    }

    #[test]
    fn detail_is_kept() {
        let error = ScriptError::with_detail(ErrorKind::Runtime, "boom", "at line 1");
        assert_eq!(error.detail.as_deref(), Some("at line 1"));
    }
}
