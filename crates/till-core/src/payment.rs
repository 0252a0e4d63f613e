//! # Payment Processor
//!
//! Prices a cart and settles a multi-tender payment against it.
//!
//! ## Settlement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart lines ──► subtotal = Σ qty × price                                │
//! │                  tax      = subtotal × rate   (rounded once, half up)   │
//! │                  total    = subtotal + tax                              │
//! │                                                                         │
//! │  Tender ──────► tendered = cash + card + mobileMoney                    │
//! │                                                                         │
//! │  tendered <  total ──► InsufficientPayment { shortfall }  (no change)  │
//! │  tendered >= total ──► Settlement { change = tendered − total }        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use crate::cart::CartLine;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{TaxRate, TenderAllocation};
use crate::validation::validate_tender;

/// Priced cart figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub tax_rate: TaxRate,
}

/// Outcome of a sufficient payment, ready for finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub totals: SaleTotals,
    pub tender: TenderAllocation,
    pub amount_tendered: Money,
    pub change_due: Money,
}

/// Applies the store's single flat tax rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentProcessor {
    tax_rate: TaxRate,
}

impl PaymentProcessor {
    pub fn new(tax_rate: TaxRate) -> Self {
        PaymentProcessor { tax_rate }
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Prices the given lines.
    pub fn quote(&self, lines: &[CartLine]) -> SaleTotals {
        let subtotal: Money = lines.iter().map(CartLine::line_total).sum();
        let tax = subtotal.calculate_tax(self.tax_rate);
        SaleTotals {
            subtotal,
            tax,
            total: subtotal + tax,
            tax_rate: self.tax_rate,
        }
    }

    /// Settles `tender` against the priced lines.
    ///
    /// ## Errors
    /// - `InvalidTender` - a negative or oversized amount in the allocation
    /// - `InsufficientPayment` - tendered total below the amount due
    pub fn settle(&self, lines: &[CartLine], tender: TenderAllocation) -> CoreResult<Settlement> {
        validate_tender(&tender)?;

        let totals = self.quote(lines);
        let tendered = tender.checked_total().ok_or_else(|| CoreError::InvalidTender {
            reason: "tendered total is too large".to_string(),
        })?;

        if tendered < totals.total {
            return Err(CoreError::InsufficientPayment {
                due: totals.total,
                tendered,
                shortfall: totals.total - tendered,
            });
        }

        Ok(Settlement {
            totals,
            tender,
            amount_tendered: tendered,
            change_due: tendered - totals.total,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TenderMethod;

    fn lines() -> Vec<CartLine> {
        vec![
            CartLine {
                product_id: "P".to_string(),
                name: "Bread".to_string(),
                unit_price: Money::from_units(2_500),
                quantity: 2,
            },
            CartLine {
                product_id: "Q".to_string(),
                name: "Milk".to_string(),
                unit_price: Money::from_units(500),
                quantity: 2,
            },
        ]
    }

    fn processor() -> PaymentProcessor {
        PaymentProcessor::new(TaxRate::from_percent(18))
    }

    #[test]
    fn test_quote() {
        let totals = processor().quote(&lines());
        assert_eq!(totals.subtotal.units(), 6_000);
        assert_eq!(totals.tax.units(), 1_080);
        assert_eq!(totals.total.units(), 7_080);
    }

    #[test]
    fn test_exact_cash() {
        let s = processor()
            .settle(&lines(), TenderAllocation::cash(Money::from_units(7_080)))
            .unwrap();
        assert_eq!(s.change_due, Money::zero());
        assert_eq!(s.amount_tendered.units(), 7_080);
    }

    #[test]
    fn test_split_tender_with_change() {
        let tender = TenderAllocation::cash(Money::from_units(5_000))
            .with(TenderMethod::MobileMoney, Money::from_units(3_000));
        let s = processor().settle(&lines(), tender).unwrap();
        assert_eq!(s.change_due.units(), 920);
        assert_eq!(s.totals.total + s.change_due, s.amount_tendered);
    }

    #[test]
    fn test_insufficient_payment_reports_shortfall() {
        let err = processor()
            .settle(&lines(), TenderAllocation::cash(Money::from_units(5_000)))
            .unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientPayment {
                due: Money::from_units(7_080),
                tendered: Money::from_units(5_000),
                shortfall: Money::from_units(2_080),
            }
        );
    }

    #[test]
    fn test_negative_tender_rejected() {
        let tender = TenderAllocation::cash(Money::from_units(10_000))
            .with(TenderMethod::Card, Money::from_units(-100));
        assert!(matches!(
            processor().settle(&lines(), tender),
            Err(CoreError::InvalidTender { .. })
        ));
    }

    #[test]
    fn test_zero_rate() {
        let totals = PaymentProcessor::new(TaxRate::zero()).quote(&lines());
        assert_eq!(totals.tax, Money::zero());
        assert_eq!(totals.total, totals.subtotal);
    }
}
