//! # Money Module
//!
//! Provides the `Money` type for monetary values.
//!
//! ## Whole Currency Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Till trades in currencies without a usable minor unit (e.g. TZS, UGX). │
//! │                                                                         │
//! │    price 2,500 × 2  = 5,000                                             │
//! │    subtotal 6,000 @ 18% = 1,080 tax                                     │
//! │                                                                         │
//! │  Every amount is an integer count of whole units. The only rounding    │
//! │  step in the system is the sale-level tax (round half up).             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::Money;
//!
//! let price = Money::from_units(2_500);
//! let line = price * 2;
//! assert_eq!(line.units(), 5_000);
//! assert_eq!(line.to_string(), "5,000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole currency units.
///
/// ## Design Decisions
/// - **i64 (signed)**: variances and drawer deltas can be negative
/// - **Newtype**: serializes as a bare number, so snapshots stay readable
/// - **Saturating operators**: `+`, `-` and `*` clamp at the i64 bounds
///   instead of panicking; use the `checked_*` methods where an overflow
///   must be reported
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole units.
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    /// Returns the value in whole units.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Calculates tax on this amount, rounding half up to a whole unit.
    ///
    /// ## Implementation
    /// Integer math in `i128`: `(amount * bps + 5000) / 10000`.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_units(6_000);
    /// let tax = subtotal.calculate_tax(TaxRate::from_percent(18));
    /// assert_eq!(tax.units(), 1_080);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_units(tax as i64)
    }

    /// Multiplies a unit price by a quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// `self + other`, or `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(units) => Some(Money(units)),
            None => None,
        }
    }

    /// `self * qty`, or `None` on overflow.
    #[inline]
    pub const fn checked_mul(self, qty: i64) -> Option<Money> {
        match self.0.checked_mul(qty) {
            Some(units) => Some(Money(units)),
            None => None,
        }
    }

    /// Returns `self - other`, floored at zero.
    ///
    /// Used for shortfall and change figures, which are never negative.
    #[inline]
    pub fn saturating_sub_zero(self, other: Money) -> Money {
        Money(self.0.saturating_sub(other.0).max(0))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain grouped digits ("57,080"). Currency symbols are a config concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            write!(f, "-{}", grouped)
        } else {
            write!(f, "{}", grouped)
        }
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_units(0).to_string(), "0");
        assert_eq!(Money::from_units(999).to_string(), "999");
        assert_eq!(Money::from_units(7_080).to_string(), "7,080");
        assert_eq!(Money::from_units(1_234_567).to_string(), "1,234,567");
        assert_eq!(Money::from_units(-2_080).to_string(), "-2,080");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(1000);
        let b = Money::from_units(500);

        assert_eq!((a + b).units(), 1500);
        assert_eq!((a - b).units(), 500);
        assert_eq!((a * 3).units(), 3000);
        assert_eq!(b.saturating_sub_zero(a), Money::zero());
    }

    #[test]
    fn test_overflow_saturates_or_reports() {
        let max = Money::from_units(i64::MAX);
        let one = Money::from_units(1);

        assert_eq!(max + one, max);
        assert_eq!(max * 2, max);
        assert_eq!(Money::from_units(i64::MIN) - one, Money::from_units(i64::MIN));
        assert_eq!(max.checked_add(one), None);
        assert_eq!(max.checked_mul(2), None);
        assert_eq!(one.checked_add(one), Some(Money::from_units(2)));
    }

    #[test]
    fn test_tax_exact() {
        let tax = Money::from_units(6_000).calculate_tax(TaxRate::from_percent(18));
        assert_eq!(tax.units(), 1_080);
    }

    #[test]
    fn test_tax_rounds_half_up() {
        // 25 × 18% = 4.5 → 5
        let tax = Money::from_units(25).calculate_tax(TaxRate::from_percent(18));
        assert_eq!(tax.units(), 5);
        // 22 × 18% = 3.96 → 4
        let tax = Money::from_units(22).calculate_tax(TaxRate::from_percent(18));
        assert_eq!(tax.units(), 4);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300].iter().map(|u| Money::from_units(*u)).sum();
        assert_eq!(total.units(), 600);
    }

    #[test]
    fn test_serializes_as_bare_number() {
        let json = serde_json::to_string(&Money::from_units(57_080)).unwrap();
        assert_eq!(json, "57080");
    }
}
