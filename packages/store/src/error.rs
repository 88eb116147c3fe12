//! Store errors.
//!
//! [`StoreErrorCode`] mirrors the canonical status codes of the hosted
//! document store (`permission-denied`, `not-found`, ...). The UI only ever
//! distinguishes [`StoreErrorCode::PermissionDenied`] from everything else.

use std::fmt;

use thiserror::Error;

/// Canonical error codes reported by the document store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreErrorCode {
    Cancelled,
    Unknown,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    AlreadyExists,
    PermissionDenied,
    ResourceExhausted,
    FailedPrecondition,
    Aborted,
    OutOfRange,
    Unimplemented,
    Internal,
    Unavailable,
    DataLoss,
    Unauthenticated,
}

impl StoreErrorCode {
    /// Kebab-case code, e.g. `permission-denied`.
    pub fn as_str(self) -> &'static str {
        match self {
            StoreErrorCode::Cancelled => "cancelled",
            StoreErrorCode::Unknown => "unknown",
            StoreErrorCode::InvalidArgument => "invalid-argument",
            StoreErrorCode::DeadlineExceeded => "deadline-exceeded",
            StoreErrorCode::NotFound => "not-found",
            StoreErrorCode::AlreadyExists => "already-exists",
            StoreErrorCode::PermissionDenied => "permission-denied",
            StoreErrorCode::ResourceExhausted => "resource-exhausted",
            StoreErrorCode::FailedPrecondition => "failed-precondition",
            StoreErrorCode::Aborted => "aborted",
            StoreErrorCode::OutOfRange => "out-of-range",
            StoreErrorCode::Unimplemented => "unimplemented",
            StoreErrorCode::Internal => "internal",
            StoreErrorCode::Unavailable => "unavailable",
            StoreErrorCode::DataLoss => "data-loss",
            StoreErrorCode::Unauthenticated => "unauthenticated",
        }
    }

    /// Map an RPC status name (`PERMISSION_DENIED`) to a code.
    pub fn from_status(status: &str) -> Self {
        match status {
            "CANCELLED" => StoreErrorCode::Cancelled,
            "INVALID_ARGUMENT" => StoreErrorCode::InvalidArgument,
            "DEADLINE_EXCEEDED" => StoreErrorCode::DeadlineExceeded,
            "NOT_FOUND" => StoreErrorCode::NotFound,
            "ALREADY_EXISTS" => StoreErrorCode::AlreadyExists,
            "PERMISSION_DENIED" => StoreErrorCode::PermissionDenied,
            "RESOURCE_EXHAUSTED" => StoreErrorCode::ResourceExhausted,
            "FAILED_PRECONDITION" => StoreErrorCode::FailedPrecondition,
            "ABORTED" => StoreErrorCode::Aborted,
            "OUT_OF_RANGE" => StoreErrorCode::OutOfRange,
            "UNIMPLEMENTED" => StoreErrorCode::Unimplemented,
            "INTERNAL" => StoreErrorCode::Internal,
            "UNAVAILABLE" => StoreErrorCode::Unavailable,
            "DATA_LOSS" => StoreErrorCode::DataLoss,
            "UNAUTHENTICATED" => StoreErrorCode::Unauthenticated,
            _ => StoreErrorCode::Unknown,
        }
    }

    /// Fallback mapping from an HTTP status when the body carries no RPC status.
    pub fn from_http(status: u16) -> Self {
        match status {
            400 => StoreErrorCode::InvalidArgument,
            401 => StoreErrorCode::Unauthenticated,
            403 => StoreErrorCode::PermissionDenied,
            404 => StoreErrorCode::NotFound,
            409 => StoreErrorCode::Aborted,
            429 => StoreErrorCode::ResourceExhausted,
            499 => StoreErrorCode::Cancelled,
            501 => StoreErrorCode::Unimplemented,
            503 => StoreErrorCode::Unavailable,
            504 => StoreErrorCode::DeadlineExceeded,
            500..=599 => StoreErrorCode::Internal,
            _ => StoreErrorCode::Unknown,
        }
    }
}

impl fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error reported by a [`crate::DocumentStore`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct StoreError {
    pub code: StoreErrorCode,
    pub message: String,
}

impl StoreError {
    pub fn new(code: StoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn permission_denied() -> Self {
        Self::new(
            StoreErrorCode::PermissionDenied,
            "Missing or insufficient permissions.",
        )
    }

    pub fn not_found(path: impl fmt::Display) -> Self {
        Self::new(StoreErrorCode::NotFound, format!("No document to update: {path}"))
    }

    pub fn is_permission_denied(&self) -> bool {
        self.code == StoreErrorCode::PermissionDenied
    }
}
