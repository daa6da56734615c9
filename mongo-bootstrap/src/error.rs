//! Error taxonomy for the bootstrap statement
//!
//! Driver failures are classified, never recovered from. Anything that is not
//! one of the three operator-facing cases is carried through as `Driver`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Rejected locally; nothing was sent to the server.
    #[error("invalid user descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("user {user:?} already exists in database {database:?}")]
    AlreadyExists { user: String, database: String },

    #[error("cannot reach MongoDB: {0}")]
    ConnectionError(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),
}

impl BootstrapError {
    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidDescriptor(_) => "invalid_descriptor",
            Self::AlreadyExists { .. } => "already_exists",
            Self::ConnectionError(_) => "connection_error",
            Self::PermissionDenied(_) => "permission_denied",
            Self::Driver(_) => "driver",
        }
    }
}
