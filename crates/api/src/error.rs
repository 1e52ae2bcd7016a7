//! Error types shared by every layer of the formula API.

use thiserror::Error;

/// Result type alias for formula API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by managers, models and provers.
///
/// Programmer errors (wrong session, array through the scalar evaluation path,
/// impossible sort parameters) are not represented here: they panic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The connected backend has no native primitive for this operation.
    #[error("operation `{operation}` is not supported by backend `{backend}`")]
    Unsupported {
        operation: &'static str,
        backend: &'static str,
    },

    /// A blocking backend call was asked to stop.
    #[error("solving interrupted: {0}")]
    Interrupted(String),

    /// Variable name rejected by the shared naming rules.
    #[error("invalid variable name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// A dynamically sorted formula did not have the requested sort.
    #[error("expected a formula of sort {expected}, got {actual}")]
    SortMismatch { expected: String, actual: String },

    /// Numeric text that does not denote a number.
    #[error("invalid number: '{0}'")]
    InvalidNumber(String),

    /// Failure reported by the backend itself.
    #[error("backend error: {0}")]
    Backend(String),

    /// Malformed sort text or impossible sort parameters.
    #[error(transparent)]
    InvalidSort(#[from] SortError),
}

impl ApiError {
    /// Shorthand for [`ApiError::Unsupported`].
    pub fn unsupported(operation: &'static str, backend: &'static str) -> Self {
        ApiError::Unsupported { operation, backend }
    }

    /// Returns `true` for [`ApiError::Interrupted`].
    pub fn is_interrupted(&self) -> bool {
        matches!(self, ApiError::Interrupted(_))
    }
}

/// Errors from parsing or constructing a [`FormulaType`](crate::FormulaType).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SortError {
    /// Text that matches no canonical sort pattern.
    #[error("unknown sort: '{0}'")]
    Unknown(String),

    /// Bitvector sorts need at least one bit.
    #[error("bitvector sort must have a positive size")]
    ZeroBitvectorSize,

    /// Floating-point sorts need positive exponent and mantissa sizes whose
    /// bit encoding fits in a `u32` width.
    #[error(
        "floating-point sort needs positive sizes with a 32-bit total width, \
         got exp={exponent}, mant={mantissa}"
    )]
    InvalidFloatingPoint { exponent: u32, mantissa: u32 },
}
