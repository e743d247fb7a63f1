//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help
//! text, and each error into a process exit code. Rejected input (usage)
//! and an unreachable backend (connection) never share a code.

use miette::Diagnostic;
use thiserror::Error;

use scholar_config::ConfigError;
use scholar_core::{CoreError, EntityKind, FieldErrors};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Backend ──────────────────────────────────────────────────────
    #[error("Could not {operation} {kind}: {message}")]
    #[diagnostic(
        code(scholar::operation_failed),
        help(
            "Check that the backend is running and reachable, then retry.\n\
             Active settings: scholar config show"
        )
    )]
    OperationFailed {
        kind: EntityKind,
        operation: String,
        message: String,
    },

    #[error("Another {kind} operation is still in progress")]
    #[diagnostic(
        code(scholar::busy),
        help("Wait for the pending operation to finish and try again.")
    )]
    Busy { kind: EntityKind },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Not logged in")]
    #[diagnostic(
        code(scholar::not_logged_in),
        help(
            "Run: scholar login --email <EMAIL>\n\
             New operators can register with: scholar signup"
        )
    )]
    NotLoggedIn,

    #[error("Invalid email or password")]
    #[diagnostic(code(scholar::auth_failed))]
    AuthFailed,

    #[error("Session storage failed: {message}")]
    #[diagnostic(
        code(scholar::session),
        help("Check permissions on the data directory (--data-dir).")
    )]
    Session { message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(scholar::not_found),
        help("Run: scholar {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Input rejected: {details}")]
    #[diagnostic(code(scholar::rejected), help("Correct the listed fields and try again."))]
    Rejected { details: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(scholar::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(scholar::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: scholar config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(scholar::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(scholar::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::OperationFailed { .. } => exit_code::CONNECTION,
            Self::NotLoggedIn | Self::AuthFailed => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Busy { .. } => exit_code::CONFLICT,
            Self::Rejected { .. }
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Session { .. }
            | Self::ProfileNotFound { .. }
            | Self::Config(_)
            | Self::Io(_) => exit_code::GENERAL,
        }
    }

    pub(crate) fn not_found(kind: EntityKind, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: kind.to_string(),
            identifier: identifier.into(),
            list_command: format!("{kind}s list"),
        }
    }
}

impl From<FieldErrors> for CliError {
    fn from(errors: FieldErrors) -> Self {
        Self::Rejected {
            details: errors.to_string(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(errors) => errors.into(),

            CoreError::OperationFailed {
                kind,
                operation,
                message,
            } => Self::OperationFailed {
                kind,
                operation: operation.to_string(),
                message,
            },

            CoreError::NotFound { kind, id } => Self::not_found(kind, id.to_string()),

            CoreError::Busy { kind } => Self::Busy { kind },

            CoreError::Unauthenticated => Self::NotLoggedIn,

            CoreError::AuthenticationFailed => Self::AuthFailed,

            CoreError::Session { message } => Self::Session { message },

            CoreError::Config { message } => Self::Validation {
                field: "configuration".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_core::{EntityId, Operation};

    #[test]
    fn rejected_input_and_unreachable_backend_exit_differently() {
        let rejected: CliError = CoreError::from(FieldErrors::single("price", "Price is required")).into();
        let unreachable: CliError = CoreError::OperationFailed {
            kind: EntityKind::Course,
            operation: Operation::Create,
            message: "connection refused".into(),
        }
        .into();

        assert_eq!(rejected.exit_code(), exit_code::USAGE);
        assert_eq!(unreachable.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn not_found_points_at_the_list_command() {
        let err: CliError = CoreError::NotFound {
            kind: EntityKind::Student,
            id: EntityId::from("st-9"),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        match err {
            CliError::NotFound { list_command, identifier, .. } => {
                assert_eq!(list_command, "students list");
                assert_eq!(identifier, "st-9");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn session_errors_map_to_auth_codes() {
        assert_eq!(CliError::from(CoreError::Unauthenticated).exit_code(), exit_code::AUTH);
        assert_eq!(CliError::from(CoreError::AuthenticationFailed).exit_code(), exit_code::AUTH);
        assert_eq!(
            CliError::from(CoreError::Busy { kind: EntityKind::Course }).exit_code(),
            exit_code::CONFLICT
        );
    }
}
