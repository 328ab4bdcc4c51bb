use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error payload returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Unprocessable Entity")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// ISO 8601 timestamp when the error occurred
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Already settled: {0}")]
    AlreadySettled(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Lock timeout: {0}")]
    LockTimeout(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Event error: {0}")]
    EventError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Classifies a raw driver error into the taxonomy callers can act on.
    ///
    /// Lock-wait and busy failures become the retryable `LockTimeout`;
    /// unique/foreign-key violations become `ConstraintViolation`. Anything
    /// else stays an opaque `DatabaseError`.
    pub fn classify_db_err(err: DbErr) -> Self {
        let text = err.to_string();
        let lowered = text.to_ascii_lowercase();
        if lowered.contains("lock timeout")
            || lowered.contains("lock wait")
            || lowered.contains("database is locked")
            || lowered.contains("table is locked")
            || lowered.contains("could not obtain lock")
        {
            return ServiceError::LockTimeout(text);
        }
        if lowered.contains("unique constraint")
            || lowered.contains("foreign key constraint")
            || lowered.contains("check constraint")
            || lowered.contains("duplicate key")
        {
            return ServiceError::ConstraintViolation(text);
        }
        ServiceError::DatabaseError(err)
    }

    /// Unwraps sea-orm's transaction error wrapper back into a ServiceError.
    pub fn from_txn_err(err: sea_orm::TransactionError<ServiceError>) -> Self {
        match err {
            sea_orm::TransactionError::Connection(db_err) => Self::classify_db_err(db_err),
            sea_orm::TransactionError::Transaction(service_err) => service_err,
        }
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::InvalidTransition(_) | Self::ConstraintViolation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InsufficientStock(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::AlreadySettled(_) | Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::LockTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::DatabaseError(_) | Self::EventError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the message suitable for HTTP responses. Internal failures
    /// and constraint details stay generic so schema internals never leak.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                "Internal server error".to_string()
            }
            Self::EventError(_) => "Internal server error".to_string(),
            Self::ConstraintViolation(_) => {
                "Request violates a data constraint".to_string()
            }
            Self::LockTimeout(_) => {
                "Resource busy, please retry the operation".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Retryable errors committed nothing; callers may re-issue the whole
    /// unit from scratch.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockTimeout(_))
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };
        (status, Json(err)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::InvalidTransition("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::InsufficientStock("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::AlreadySettled("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::LockTimeout("x".into()).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ServiceError::ConstraintViolation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn response_message_hides_internal_details() {
        let err = ServiceError::DatabaseError(DbErr::Custom("secret table missing".into()));
        assert_eq!(err.response_message(), "Internal server error");

        let err = ServiceError::ConstraintViolation(
            "UNIQUE constraint failed: orders.reference_number".into(),
        );
        assert_eq!(err.response_message(), "Request violates a data constraint");

        // User-facing kinds keep their message
        let err = ServiceError::InsufficientStock("requested 5, available 2".into());
        assert_eq!(
            err.response_message(),
            "Insufficient stock: requested 5, available 2"
        );
    }

    #[test]
    fn classify_lock_and_constraint_errors() {
        let err = ServiceError::classify_db_err(DbErr::Custom("database is locked".into()));
        assert!(matches!(err, ServiceError::LockTimeout(_)));
        assert!(err.is_retryable());

        let err = ServiceError::classify_db_err(DbErr::Custom(
            "UNIQUE constraint failed: products.sku".into(),
        ));
        assert!(matches!(err, ServiceError::ConstraintViolation(_)));
        assert!(!err.is_retryable());

        let err = ServiceError::classify_db_err(DbErr::Custom("connection reset".into()));
        assert!(matches!(err, ServiceError::DatabaseError(_)));
    }
}
