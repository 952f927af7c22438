use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::KnobKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidInput,
    NotFound,
    TypeMismatch,
    ArityMismatch,
    HostOperationFailed,
    Internal,
}

/// Failure reported by a host graph implementation. Opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum KnobError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("cannot coerce {raw:?} for {kind}")]
    TypeMismatch { kind: KnobKind, raw: String },
    #[error("array doesn't match: expected array length of {expected}, {actual} provided")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("host operation failed: {0}")]
    HostOperationFailed(#[from] HostError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl KnobError {
    pub fn code(&self) -> ErrorCode {
        match self {
            KnobError::InvalidInput(_) => ErrorCode::InvalidInput,
            KnobError::NotFound(_) => ErrorCode::NotFound,
            KnobError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            KnobError::ArityMismatch { .. } => ErrorCode::ArityMismatch,
            KnobError::HostOperationFailed(_) => ErrorCode::HostOperationFailed,
            KnobError::Io(_) => ErrorCode::Internal,
        }
    }

    pub fn type_mismatch(kind: &KnobKind, raw: &str) -> Self {
        KnobError::TypeMismatch {
            kind: kind.clone(),
            raw: raw.to_string(),
        }
    }

    pub fn host(message: impl Into<String>) -> Self {
        KnobError::HostOperationFailed(HostError::new(message))
    }
}

pub type KnobResult<T> = Result<T, KnobError>;

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
