use http::StatusCode;
use rust_decimal::Decimal;
use sea_orm::error::DbErr;
use sea_orm::TransactionError;
use serde::Serialize;

/// Central error type for every service operation in this crate.
///
/// The outer transport layer maps variants to status codes through
/// [`ServiceError::status_code`]; nothing else in the crate should reason
/// about HTTP semantics.
#[derive(Debug, thiserror::Error, Serialize)]
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

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error(
        "Insufficient stock for {item_name}: {available} {unit} available, {requested} {unit} requested"
    )]
    InsufficientStock {
        item_name: String,
        unit: String,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<TransactionError<ServiceError>> for ServiceError {
    fn from(err: TransactionError<ServiceError>) -> Self {
        match err {
            TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
            TransactionError::Transaction(service_err) => service_err,
        }
    }
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::InsufficientStock { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    /// Returns the error message suitable for client display.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::InternalError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// True when the caller is expected to retry the whole operation,
    /// i.e. the underlying store detected a lost-update race.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::InternalError("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let insufficient = ServiceError::InsufficientStock {
            item_name: "Fabric".into(),
            unit: "yard".into(),
            available: dec!(20),
            requested: dec!(25),
        };
        assert_eq!(insufficient.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn insufficient_stock_reports_available_and_requested() {
        let err = ServiceError::InsufficientStock {
            item_name: "Fabric".into(),
            unit: "yard".into(),
            available: dec!(20),
            requested: dec!(25),
        };
        let message = err.to_string();
        assert!(message.contains("Fabric"));
        assert!(message.contains("20 yard available"));
        assert!(message.contains("25 yard requested"));
    }

    #[test]
    fn response_message_hides_internal_details() {
        assert_eq!(
            ServiceError::InternalError("lock poisoned".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::NotFound("Inventory item not found".into()).response_message(),
            "Not found: Inventory item not found"
        );
    }

    #[test]
    fn only_conflict_is_retryable() {
        assert!(ServiceError::Conflict("merge race".into()).is_retryable());
        assert!(!ServiceError::NotFound("x".into()).is_retryable());
        assert!(!ServiceError::ValidationError("x".into()).is_retryable());
    }
}
