//! # Domain Types
//!
//! Catalog and sale record types shared by every component.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │TenderAllocation │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  sequenceNumber │   │  cash           │       │
//! │  │  price / cost   │   │  lines          │   │  card           │       │
//! │  │  stock          │   │  subtotal/tax   │   │  mobileMoney    │       │
//! │  │  minStock       │   │  total / change │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                              │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │    TaxRate      │   │  TenderMethod   │                              │
//! │  │  bps (u32)      │   │  Cash           │                              │
//! │  │  1800 = 18%     │   │  Card           │                              │
//! │  └─────────────────┘   │  MobileMoney    │                              │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cart types live in [`crate::cart`], drawer types in [`crate::register`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Flat tax rate in basis points (1 bps = 0.01%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a rate from a whole percentage (`18` means 18%).
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        TaxRate(percent * 100)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A product as supplied by the catalog.
///
/// The catalog owns every field except `stock`, which only the
/// [`StockLedger`](crate::stock::StockLedger) mutates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Unit selling price.
    pub price: Money,

    /// Unit cost (margin reporting).
    #[serde(default)]
    pub cost: Money,

    /// On-hand quantity. Never negative.
    #[serde(default)]
    pub stock: i64,

    /// Threshold at or below which the product is reported as low stock.
    #[serde(default)]
    pub min_stock: i64,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub category_id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Creates an active product with no cost and no low-stock threshold.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Money, stock: i64) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            price,
            cost: Money::zero(),
            stock,
            min_stock: 0,
            is_active: true,
            category_id: None,
        }
    }

    /// True when on-hand stock is at or below the threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

/// A catalog category. Carried through snapshots untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
}

// =============================================================================
// Tenders
// =============================================================================

/// A payment method accepted at the till.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum TenderMethod {
    Cash,
    Card,
    MobileMoney,
}

impl TenderMethod {
    pub const ALL: [TenderMethod; 3] =
        [TenderMethod::Cash, TenderMethod::Card, TenderMethod::MobileMoney];
}

/// Amount tendered per payment method.
///
/// ## Invariant
/// Every amount is non-negative; checked by
/// [`validate_tender`](crate::validation::validate_tender) before settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct TenderAllocation {
    #[serde(default)]
    pub cash: Money,
    #[serde(default)]
    pub card: Money,
    #[serde(default)]
    pub mobile_money: Money,
}

impl TenderAllocation {
    /// All-cash tender.
    pub fn cash(amount: Money) -> Self {
        TenderAllocation {
            cash: amount,
            ..Default::default()
        }
    }

    /// Returns a copy with `method` set to `amount`.
    pub fn with(mut self, method: TenderMethod, amount: Money) -> Self {
        *self.slot_mut(method) = amount;
        self
    }

    pub fn get(&self, method: TenderMethod) -> Money {
        match method {
            TenderMethod::Cash => self.cash,
            TenderMethod::Card => self.card,
            TenderMethod::MobileMoney => self.mobile_money,
        }
    }

    fn slot_mut(&mut self, method: TenderMethod) -> &mut Money {
        match method {
            TenderMethod::Cash => &mut self.cash,
            TenderMethod::Card => &mut self.card,
            TenderMethod::MobileMoney => &mut self.mobile_money,
        }
    }

    /// Sum of all tenders, saturating at the i64 bound.
    pub fn total(&self) -> Money {
        self.cash + self.card + self.mobile_money
    }

    /// Sum of all tenders, or `None` if it does not fit in `Money`.
    pub fn checked_total(&self) -> Option<Money> {
        self.cash
            .checked_add(self.card)
            .and_then(|sum| sum.checked_add(self.mobile_money))
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A line of a finalized sale (product data frozen at sale time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl SaleLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A finalized sale. Immutable once created.
///
/// Only [`Terminal::checkout`](crate::terminal::Terminal::checkout) builds
/// these. Receipts and reports read this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,

    /// Monotonic across sessions, starting at 1.
    pub sequence_number: u64,

    #[ts(as = "String")]
    pub timestamp: DateTime<Utc>,

    pub lines: Vec<SaleLine>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub tender: TenderAllocation,
    pub amount_tendered: Money,
    pub change_due: Money,
    pub operator_id: String,

    /// Register session the sale was rung up in.
    pub session_id: String,
}

impl Sale {
    /// Cash that stayed in the drawer: cash tendered minus change handed back.
    ///
    /// Change always leaves the drawer as cash, so an over-tendered card
    /// payment makes this negative.
    pub fn cash_collected(&self) -> Money {
        self.tender.cash - self.change_due
    }

    /// Total number of units sold.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
