use sea_orm::error::DbErr;
use serde::Serialize;
use thiserror::Error;

/// Errors produced by the service layer.
///
/// Every rejected mutation maps to one of these; the caller sees the prior
/// state unchanged and a human-readable reason.
#[derive(Error, Debug, Serialize)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(
        #[from]
        #[serde(skip)]
        DbErr,
    ),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),
}

impl ServiceError {
    /// Field-scoped validation failure.
    pub fn validation(field: &str, message: impl AsRef<str>) -> Self {
        ServiceError::ValidationError(format!("{}: {}", field, message.as_ref()))
    }
}
