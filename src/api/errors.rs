use thiserror::Error;

use crate::types::Action;

/// Fatal run errors. Everything else is recorded in the report and the run
/// continues.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("insufficient privilege: {0}")]
    InsufficientPrivilege(String),
    #[error("required step `{action} {name}` failed: {reason}")]
    EntryFailed {
        name: String,
        action: Action,
        reason: String,
    },
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),
}

impl ApiError {
    #[must_use]
    pub const fn id(&self) -> ErrorId {
        match self {
            ApiError::InsufficientPrivilege(_) => ErrorId::E_PRIVILEGE,
            ApiError::EntryFailed { .. } => ErrorId::E_ENTRY,
            ApiError::InvalidManifest(_) => ErrorId::E_GENERIC,
        }
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        exit_code_for(self.id())
    }
}

impl From<crate::types::errors::Error> for ApiError {
    fn from(e: crate::types::errors::Error) -> Self {
        ApiError::InvalidManifest(e.msg)
    }
}

// Stable identifiers emitted in facts.
// We intentionally keep SCREAMING_SNAKE_CASE to match emitted IDs.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorId {
    E_PRIVILEGE,
    E_ENTRY,
    E_CONFIG,
    E_CLEANUP,
    E_GENERIC,
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_PRIVILEGE => "E_PRIVILEGE",
        ErrorId::E_ENTRY => "E_ENTRY",
        ErrorId::E_CONFIG => "E_CONFIG",
        ErrorId::E_CLEANUP => "E_CLEANUP",
        ErrorId::E_GENERIC => "E_GENERIC",
    }
}

/// Process exit code for a fatal error with `id`.
///
/// `E_CONFIG` and `E_CLEANUP` only tag best-effort failures in facts; they
/// never end a run and share the generic code.
#[must_use]
pub const fn exit_code_for(id: ErrorId) -> i32 {
    match id {
        ErrorId::E_PRIVILEGE => 10,
        ErrorId::E_ENTRY => 20,
        ErrorId::E_CONFIG | ErrorId::E_CLEANUP | ErrorId::E_GENERIC => 1,
    }
}
