use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCode {
    Validation,
    Conflict,
    NotFound,
    InvalidState,
    PermissionDenied,
}

/// Operation errors surfaced to callers. None of these are retriable; the
/// caller either fixes the request or gives up.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum Error {
    #[error("validation: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Validation(_) => ErrorCode::Validation,
            Error::Conflict(_) => ErrorCode::Conflict,
            Error::NotFound(_) => ErrorCode::NotFound,
            Error::InvalidState(_) => ErrorCode::InvalidState,
            Error::PermissionDenied(_) => ErrorCode::PermissionDenied,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Error::Validation(m)
            | Error::Conflict(m)
            | Error::NotFound(m)
            | Error::InvalidState(m)
            | Error::PermissionDenied(m) => m,
        }
    }

    /// Rebuild from a wire `{code, message}` pair (HTTP client side).
    pub fn from_parts(code: ErrorCode, message: String) -> Self {
        match code {
            ErrorCode::Validation => Error::Validation(message),
            ErrorCode::Conflict => Error::Conflict(message),
            ErrorCode::NotFound => Error::NotFound(message),
            ErrorCode::InvalidState => Error::InvalidState(message),
            ErrorCode::PermissionDenied => Error::PermissionDenied(message),
        }
    }
}
