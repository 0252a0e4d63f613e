//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  till-db errors (separate crate)                                       │
//! │  └── DbError          - Storage failures, corrupt snapshots            │
//! │                                                                         │
//! │  App errors                                                            │
//! │  └── ApiError         - What the operator sees (serialized)            │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Operator               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is recoverable: it blocks the requested action and leaves
//! state untouched.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the cart, payment and register logic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A cart or payment mutation was attempted with no open register session.
    #[error("Register is closed: open a session first")]
    RegisterClosed,

    /// A register session is already open.
    #[error("Register session {session_id} is already open")]
    SessionAlreadyOpen { session_id: String },

    /// Product id is not in the catalog.
    ///
    /// ## When This Occurs
    /// - Stale reference from a cart or held cart
    /// - Product removed from the catalog after it was added to the cart
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Product exists but is deactivated.
    #[error("Product {0} is inactive")]
    InactiveProduct(String),

    /// Product has zero units on hand.
    #[error("{name} is out of stock")]
    OutOfStock { product_id: String, name: String },

    /// Requested quantity exceeds on-hand stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Set quantity 5
    ///      │
    ///      ▼
    /// Live stock: 3
    ///      │
    ///      ▼
    /// InsufficientStock { available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 in stock"
    /// ```
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// The product has no line in the active cart.
    #[error("Product {0} is not in the cart")]
    LineNotFound(String),

    /// No held cart with this id.
    #[error("Held cart not found: {0}")]
    HeldCartNotFound(String),

    /// Checkout attempted on an empty cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// Cart has exceeded maximum allowed lines.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the per-line maximum.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Tendered amount does not cover the total. Nothing was mutated.
    #[error("Insufficient payment: due {due}, tendered {tendered}, short by {shortfall}")]
    InsufficientPayment {
        due: Money,
        tendered: Money,
        shortfall: Money,
    },

    /// A tender amount is negative.
    #[error("Invalid tender: {reason}")]
    InvalidTender { reason: String },

    /// Opening float is negative.
    #[error("Invalid opening float: {0}")]
    InvalidOpeningFloat(Money),

    /// Counted cash missing or negative at close.
    #[error("Invalid counted cash: {reason}")]
    InvalidCountedCash { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "P".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for P: available 3, requested 5"
        );

        let err = CoreError::InsufficientPayment {
            due: Money::from_units(7_080),
            tendered: Money::from_units(5_000),
            shortfall: Money::from_units(2_080),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment: due 7,080, tendered 5,000, short by 2,080"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
