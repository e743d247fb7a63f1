// ── Core error types ──
//
// User-facing errors from scholar-core. Consumers never see HTTP status
// codes here: every gateway failure is collapsed into `OperationFailed`
// tagged with the entity kind and operation that raised it.

use strum::Display;
use thiserror::Error;

use crate::model::{EntityId, EntityKind};
use crate::validate::FieldErrors;

/// The manager operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Operation {
    List,
    Create,
    Update,
    Remove,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Input errors ─────────────────────────────────────────────────
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    // ── Remote errors ────────────────────────────────────────────────
    #[error("Could not {operation} {kind}: {message}")]
    OperationFailed {
        kind: EntityKind,
        operation: Operation,
        message: String,
    },

    // ── State errors ─────────────────────────────────────────────────
    #[error("No {kind} with id {id}")]
    NotFound { kind: EntityKind, id: EntityId },

    #[error("Another {kind} operation is still in progress")]
    Busy { kind: EntityKind },

    // ── Session errors ───────────────────────────────────────────────
    #[error("Not logged in")]
    Unauthenticated,

    #[error("Invalid email or password")]
    AuthenticationFailed,

    #[error("Session error: {message}")]
    Session { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether re-invoking the same operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::OperationFailed { .. } | Self::Busy { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Field errors carried by a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<FieldErrors> for CoreError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}
