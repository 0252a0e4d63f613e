//! # Validation Module
//!
//! Input checks run before any state is touched.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: App command                                                  │
//! │  ├── Deserialization of operator input                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Quantities, tenders, float / counted cash, names                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Component invariants                                         │
//! │  ├── Live stock ceilings (StockLedger)                                 │
//! │  └── Session state machine (RegisterManager)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{TenderAllocation, TenderMethod};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_TENDER_AMOUNT};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest accepted held-cart name.
pub const MAX_HOLD_NAME_LEN: usize = 60;

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a requested line quantity against the per-line maximum.
///
/// Zero and negative quantities are handled by the cart (line removal),
/// so only the upper bound is checked here.
pub fn validate_quantity(qty: i64) -> CoreResult<()> {
    if qty > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: qty,
            max: MAX_ITEM_QUANTITY,
        });
    }
    Ok(())
}

/// Validates the number of distinct lines before inserting a new one.
pub fn validate_cart_size(current_lines: usize) -> CoreResult<()> {
    if current_lines >= MAX_CART_ITEMS {
        return Err(CoreError::CartTooLarge { max: MAX_CART_ITEMS });
    }
    Ok(())
}

/// Validates an opening float.
///
/// ## Example
/// ```rust
/// use till_core::money::Money;
/// use till_core::validation::validate_opening_float;
///
/// assert!(validate_opening_float(Money::from_units(50_000)).is_ok());
/// assert!(validate_opening_float(Money::zero()).is_ok());
/// assert!(validate_opening_float(Money::from_units(-1)).is_err());
/// ```
pub fn validate_opening_float(amount: Money) -> CoreResult<()> {
    if amount.is_negative() {
        return Err(CoreError::InvalidOpeningFloat(amount));
    }
    Ok(())
}

/// Validates the cash counted at close. `None` means the operator left the
/// field blank.
pub fn validate_counted_cash(counted: Option<Money>) -> CoreResult<Money> {
    match counted {
        None => Err(CoreError::InvalidCountedCash {
            reason: "counted cash is required".to_string(),
        }),
        Some(amount) if amount.is_negative() => Err(CoreError::InvalidCountedCash {
            reason: format!("{} is negative", amount),
        }),
        Some(amount) => Ok(amount),
    }
}

/// Validates a tender allocation: every amount between zero and
/// [`MAX_TENDER_AMOUNT`].
pub fn validate_tender(tender: &TenderAllocation) -> CoreResult<()> {
    for method in TenderMethod::ALL {
        let amount = tender.get(method);
        if amount.is_negative() {
            return Err(CoreError::InvalidTender {
                reason: format!("{:?} amount {} is negative", method, amount),
            });
        }
        if amount.units() > MAX_TENDER_AMOUNT {
            return Err(CoreError::InvalidTender {
                reason: format!(
                    "{:?} amount {} exceeds {}",
                    method,
                    amount,
                    Money::from_units(MAX_TENDER_AMOUNT)
                ),
            });
        }
    }
    Ok(())
}

/// Validates a restock quantity.
pub fn validate_restock_quantity(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "restock quantity".to_string(),
        });
    }
    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }
    Ok(())
}

// =============================================================================
// String Validators
// =============================================================================

/// Validates a held-cart name and returns it trimmed.
pub fn validate_hold_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "hold name".to_string(),
        });
    }

    if name.chars().count() > MAX_HOLD_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "hold name".to_string(),
            max: MAX_HOLD_NAME_LEN,
        });
    }

    Ok(name.to_string())
}

/// Validates an operator id.
pub fn validate_operator(operator_id: &str) -> ValidationResult<()> {
    if operator_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "operator".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());
        assert!(matches!(
            validate_quantity(1000),
            Err(CoreError::QuantityTooLarge { requested: 1000, .. })
        ));
    }

    #[test]
    fn test_validate_counted_cash() {
        assert_eq!(
            validate_counted_cash(Some(Money::from_units(57_080))).unwrap(),
            Money::from_units(57_080)
        );
        assert!(matches!(
            validate_counted_cash(None),
            Err(CoreError::InvalidCountedCash { .. })
        ));
        assert!(matches!(
            validate_counted_cash(Some(Money::from_units(-5))),
            Err(CoreError::InvalidCountedCash { .. })
        ));
    }

    #[test]
    fn test_validate_tender() {
        assert!(validate_tender(&TenderAllocation::cash(Money::from_units(10))).is_ok());
        let bad = TenderAllocation::default().with(TenderMethod::Card, Money::from_units(-1));
        assert!(matches!(
            validate_tender(&bad),
            Err(CoreError::InvalidTender { .. })
        ));

        let huge = TenderAllocation::cash(Money::from_units(MAX_TENDER_AMOUNT + 1));
        assert!(matches!(
            validate_tender(&huge),
            Err(CoreError::InvalidTender { .. })
        ));
        assert!(validate_tender(&TenderAllocation::cash(Money::from_units(MAX_TENDER_AMOUNT))).is_ok());
    }

    #[test]
    fn test_validate_hold_name() {
        assert_eq!(validate_hold_name("  Table 4 ").unwrap(), "Table 4");
        assert!(validate_hold_name("   ").is_err());
        assert!(validate_hold_name(&"x".repeat(61)).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1800).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }
}
