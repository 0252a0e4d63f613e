//! # API Error Type
//!
//! Unified error type for commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Till                                   │
//! │                                                                         │
//! │  Command Function  Result<T, ApiError>                                  │
//! │         │                                                               │
//! │         ├── CoreError::RegisterClosed ───────► REGISTER_CLOSED          │
//! │         ├── CoreError::InsufficientPayment ──► INSUFFICIENT_PAYMENT     │
//! │         ├── CoreError::InvalidTender ────────► PAYMENT_ERROR            │
//! │         ├── DbError::Corrupt ────────────────► PERSISTENCE_CORRUPT      │
//! │         └── DbError::QueryFailed(..) ────────► DATABASE_ERROR (logged)  │
//! │                                                                         │
//! │  UI receives { code, message } and switches on `code`.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use till_core::CoreError;
use till_db::DbError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "INSUFFICIENT_PAYMENT",
///   "message": "Insufficient payment: due 7,080, tendered 5,000, short by 2,080"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product, held cart or sale not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// No register session is open
    RegisterClosed,

    /// A register session is already open
    SessionAlreadyOpen,

    /// Product has no stock at all
    OutOfStock,

    /// Requested quantity exceeds stock
    InsufficientStock,

    /// Tendered amount below total
    InsufficientPayment,

    /// Tender rejected (negative amount)
    PaymentError,

    /// Cart operation failed (empty, too large, inactive product)
    CartError,

    /// Opening float or counted cash rejected
    InvalidCashAmount,

    /// Stored data could not be read
    PersistenceCorrupt,

    /// Storage operation failed
    DatabaseError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts storage errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Corrupt { .. } => ApiError::new(ErrorCode::PersistenceCorrupt, err.to_string()),
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) | DbError::Serialization(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Storage operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Storage operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::RegisterClosed => ErrorCode::RegisterClosed,
            CoreError::SessionAlreadyOpen { .. } => ErrorCode::SessionAlreadyOpen,
            CoreError::ProductNotFound(_)
            | CoreError::LineNotFound(_)
            | CoreError::HeldCartNotFound(_) => ErrorCode::NotFound,
            CoreError::OutOfStock { .. } => ErrorCode::OutOfStock,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::InsufficientPayment { .. } => ErrorCode::InsufficientPayment,
            CoreError::InvalidTender { .. } => ErrorCode::PaymentError,
            CoreError::InactiveProduct(_) | CoreError::EmptyCart | CoreError::CartTooLarge { .. } => {
                ErrorCode::CartError
            }
            CoreError::InvalidOpeningFloat(_) | CoreError::InvalidCountedCash { .. } => {
                ErrorCode::InvalidCashAmount
            }
            CoreError::QuantityTooLarge { .. } | CoreError::Validation(_) => {
                ErrorCode::ValidationError
            }
        };
        ApiError::new(code, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::{Money, SnapshotKind};

    #[test]
    fn test_core_error_codes() {
        assert_eq!(ApiError::from(CoreError::RegisterClosed).code, ErrorCode::RegisterClosed);

        let err = ApiError::from(CoreError::InsufficientPayment {
            due: Money::from_units(7_080),
            tendered: Money::from_units(5_000),
            shortfall: Money::from_units(2_080),
        });
        assert_eq!(err.code, ErrorCode::InsufficientPayment);
        assert!(err.message.contains("2,080"));
        assert_eq!(
            serde_json::to_value(&err).unwrap()["code"],
            "INSUFFICIENT_PAYMENT"
        );

        let err = ApiError::from(CoreError::InvalidTender { reason: "negative".into() });
        assert_eq!(err.code, ErrorCode::PaymentError);
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::from(DbError::corrupt(SnapshotKind::Business, "eof"));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "PERSISTENCE_CORRUPT");
        assert!(json["message"].as_str().unwrap().contains("business"));
    }
}
