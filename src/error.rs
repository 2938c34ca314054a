//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the cinerank application.
///
/// - 0: Success (the run completed and printed its results, even if none)
/// - 1: General error (storage failure, schedule unavailable, bad config)
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the run completed and printed its results.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Interrupted: enrichment was interrupted by user (Ctrl+C).
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "CR000",
            Self::GeneralError => "CR001",
            Self::Interrupted => "CR130",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "CR001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Whether the operation was interrupted
    pub interrupted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            interrupted: exit_code == ExitCode::Interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::Interrupted.as_i32(), 130);
    }

    #[test]
    fn test_code_prefixes() {
        assert_eq!(ExitCode::Success.code_prefix(), "CR000");
        assert_eq!(ExitCode::GeneralError.code_prefix(), "CR001");
        assert_eq!(ExitCode::Interrupted.code_prefix(), "CR130");
    }

    #[test]
    fn test_structured_error_includes_context() {
        let err = anyhow::anyhow!("disk full").context("Failed to cache listings");
        let structured = StructuredError::new(&err, ExitCode::GeneralError);

        assert_eq!(structured.code, "CR001");
        assert_eq!(structured.exit_code, 1);
        assert_eq!(structured.message, "Failed to cache listings: disk full");
        assert!(!structured.interrupted);

        let json = serde_json::to_string(&structured).unwrap();
        assert!(json.contains("\"code\":\"CR001\""));
    }
}
