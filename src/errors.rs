// errors.rs
use astra::Response;
use rusqlite::ErrorCode;
use thiserror::Error;

use crate::domain::target::Target;

/// Errors originating from either the server logic
/// (routing, validation, workflow rules) or downstream layers (DB).
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Not Found")]
    NotFound,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("{target} has already been reported by this user")]
    DuplicateReport { target: Target },

    #[error("Invalid provider: {0}")]
    InvalidProviderAssignment(String),

    #[error("need {need_id} already has a field named '{key}'")]
    FieldKeyConflict { need_id: i64, key: String },

    #[error("{0} does not exist")]
    TargetNotFound(Target),

    #[error("cannot move {entity} from '{from}' to '{to}'")]
    InvalidTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Database Error: {0}")]
    DbError(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Internal Server Error")]
    InternalError,
}

// Type alias commonly used by route handlers.
pub type ResultResp = Result<Response, ServerError>;

impl ServerError {
    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::NotFound | ServerError::TargetNotFound(_) => 404,
            ServerError::BadRequest(_)
            | ServerError::InvalidProviderAssignment(_)
            | ServerError::InvalidTransition { .. } => 400,
            ServerError::Unauthorized(_) => 401,
            ServerError::Forbidden(_) => 403,
            ServerError::DuplicateReport { .. } | ServerError::FieldKeyConflict { .. } => 409,
            ServerError::DbError(_) | ServerError::Config(_) | ServerError::InternalError => 500,
        }
    }
}

impl From<rusqlite::Error> for ServerError {
    fn from(e: rusqlite::Error) -> Self {
        ServerError::DbError(e.to_string())
    }
}

/// True when the error is a UNIQUE / CHECK constraint failure.
pub fn is_constraint_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(inner, _) if inner.code == ErrorCode::ConstraintViolation
    )
}
