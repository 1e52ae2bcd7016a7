use std::path::PathBuf;

use smtwrap_api::ApiError;
use thiserror::Error;

use crate::config::SolverKind;

/// Errors from solver interaction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolverError {
    /// Solver binary not found at the specified path.
    #[error("{0} binary not found at: {path}", path = .1.display())]
    NotFound(SolverKind, PathBuf),
    /// Process failed to start, crashed, or reported an error.
    #[error("Solver process error: {0}")]
    ProcessError(String),
    /// Failed to parse solver output.
    #[error("Failed to parse solver output: {0}")]
    ParseError(String),
    /// Wall-clock limit exceeded; the process was killed.
    #[error("Solver timeout exceeded")]
    Timeout,
    /// A shutdown request stopped the check.
    #[error("Solver interrupted: {0}")]
    Interrupted(String),
    /// Invalid configuration value.
    #[error("Invalid solver configuration: {0}")]
    Config(String),
}

impl From<SolverError> for ApiError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::Interrupted(reason) => ApiError::Interrupted(reason),
            other => ApiError::Backend(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_not_found() {
        let err = SolverError::NotFound(SolverKind::Z3, PathBuf::from("/no/z3"));
        assert_eq!(err.to_string(), "Z3 binary not found at: /no/z3");
    }

    #[test]
    fn display_process_error() {
        let err = SolverError::ProcessError("crashed".to_string());
        assert_eq!(err.to_string(), "Solver process error: crashed");
    }

    #[test]
    fn display_parse_error() {
        let err = SolverError::ParseError("bad output".to_string());
        assert_eq!(err.to_string(), "Failed to parse solver output: bad output");
    }

    #[test]
    fn display_timeout() {
        let err = SolverError::Timeout;
        assert_eq!(err.to_string(), "Solver timeout exceeded");
    }

    #[test]
    fn error_equality() {
        assert_eq!(SolverError::Timeout, SolverError::Timeout);
        assert_ne!(SolverError::Timeout, SolverError::ProcessError("x".into()));
    }

    #[test]
    fn interruption_keeps_its_kind_across_layers() {
        let api: ApiError = SolverError::Interrupted("user".into()).into();
        assert_eq!(api, ApiError::Interrupted("user".into()));

        let api: ApiError = SolverError::Timeout.into();
        assert_eq!(api, ApiError::Backend("Solver timeout exceeded".into()));
    }
}
