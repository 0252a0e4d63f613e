//! # Cart Manager
//!
//! The in-progress sale and the carts set aside on hold.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Method                  Cart Change           │
//! │  ───────────────          ──────                  ───────────           │
//! │                                                                         │
//! │  Tap product ────────────► add_item() ──────────► qty + 1 / new line   │
//! │                                                                         │
//! │  Edit quantity ──────────► set_quantity() ──────► qty = n / remove     │
//! │                                                                         │
//! │  Clear ──────────────────► clear() ─────────────► lines.clear()        │
//! │                                                                         │
//! │  Hold ───────────────────► hold(name) ──────────► active → held        │
//! │                                                                         │
//! │  Resume ─────────────────► resume(id) ──────────► held → active        │
//! │                                                                         │
//! │  Every stock check reads StockLedger live, never a cached figure.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Register-open checks belong to [`Terminal`](crate::terminal::Terminal);
//! this module only enforces line and stock rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::stock::StockLedger;
use crate::types::{Product, SaleLine};
use crate::validation::{validate_cart_size, validate_hold_name, validate_quantity};

// =============================================================================
// Cart Line
// =============================================================================

/// A line in the active cart.
///
/// The name and price are frozen when the line is created, so the cart
/// shows a consistent figure even if the catalog changes mid-sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product_id: String,
    pub name: String,
    pub unit_price: Money,
    pub quantity: i64,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: 1,
        }
    }

    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

impl From<&CartLine> for SaleLine {
    fn from(line: &CartLine) -> Self {
        SaleLine {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

// =============================================================================
// Held Cart
// =============================================================================

/// A cart set aside before payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldCart {
    pub id: String,
    pub name: String,
    pub lines: Vec<CartLine>,
    pub held_at: DateTime<Utc>,
}

impl HeldCart {
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

// =============================================================================
// Cart Manager
// =============================================================================

/// Owns the active cart lines and the held-cart collection.
///
/// ## Invariants
/// - Lines are unique by `product_id`
/// - Every line has `1 <= quantity <= MAX_ITEM_QUANTITY`
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, Default)]
pub struct CartManager {
    lines: Vec<CartLine>,
    held: Vec<HeldCart>,
}

impl CartManager {
    pub fn new() -> Self {
        CartManager::default()
    }

    /// Rebuilds the manager from persisted lines and held carts.
    ///
    /// Lines with a non-positive quantity are dropped and repeated products
    /// are merged into one line, in the active cart and in every held cart.
    pub fn restore(lines: Vec<CartLine>, held: Vec<HeldCart>) -> Self {
        CartManager {
            lines: merge_lines(lines),
            held: held
                .into_iter()
                .map(|mut h| {
                    h.lines = merge_lines(h.lines);
                    h
                })
                .collect(),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn held(&self) -> &[HeldCart] {
        &self.held
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ quantity × price.
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - Product already in the cart: quantity + 1 if live stock allows,
    ///   else `InsufficientStock`
    /// - Product not in the cart: new line with quantity 1, `OutOfStock`
    ///   when nothing is on hand
    pub fn add_item(&mut self, stock: &StockLedger, product_id: &str) -> CoreResult<&CartLine> {
        if let Some(index) = self.position(product_id) {
            let requested = self.lines[index].quantity + 1;
            validate_quantity(requested)?;
            let on_hand = sellable_on_hand(stock, product_id)?;
            if requested > on_hand {
                return Err(CoreError::InsufficientStock {
                    product_id: product_id.to_string(),
                    available: on_hand,
                    requested,
                });
            }
            self.lines[index].quantity = requested;
            return Ok(&self.lines[index]);
        }

        validate_cart_size(self.lines.len())?;
        let product = stock.available(product_id, 1)?;
        self.lines.push(CartLine::from_product(product));
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Sets a line's quantity.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: removes the line (succeeds even if absent)
    /// - product missing from the catalog: `ProductNotFound`
    /// - product deactivated: `InactiveProduct`
    /// - product not in the cart: `LineNotFound`
    /// - `quantity` above live stock: `InsufficientStock`
    ///
    /// On error the cart is unchanged.
    pub fn set_quantity(
        &mut self,
        stock: &StockLedger,
        product_id: &str,
        quantity: i64,
    ) -> CoreResult<()> {
        if quantity <= 0 {
            self.lines.retain(|l| l.product_id != product_id);
            return Ok(());
        }

        let on_hand = sellable_on_hand(stock, product_id)?;
        let index = self
            .position(product_id)
            .ok_or_else(|| CoreError::LineNotFound(product_id.to_string()))?;
        validate_quantity(quantity)?;

        if quantity > on_hand {
            return Err(CoreError::InsufficientStock {
                product_id: product_id.to_string(),
                available: on_hand,
                requested: quantity,
            });
        }

        self.lines[index].quantity = quantity;
        Ok(())
    }

    /// Empties the active cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Moves the active cart into the held collection under `name`.
    pub fn hold(&mut self, name: &str) -> CoreResult<&HeldCart> {
        let name = validate_hold_name(name)?;
        if self.lines.is_empty() {
            return Err(CoreError::EmptyCart);
        }

        self.held.push(HeldCart {
            id: Uuid::new_v4().to_string(),
            name,
            lines: std::mem::take(&mut self.lines),
            held_at: Utc::now(),
        });
        Ok(&self.held[self.held.len() - 1])
    }

    /// Makes a held cart the active cart and removes it from the collection.
    ///
    /// Stock is not re-checked here; checkout verifies every line against
    /// live stock before committing. Any lines in the active cart are
    /// replaced.
    pub fn resume(&mut self, held_cart_id: &str) -> CoreResult<()> {
        let index = self
            .held
            .iter()
            .position(|h| h.id == held_cart_id)
            .ok_or_else(|| CoreError::HeldCartNotFound(held_cart_id.to_string()))?;
        let held = self.held.remove(index);
        self.lines = held.lines;
        Ok(())
    }

    /// Discards a held cart.
    pub fn delete_held(&mut self, held_cart_id: &str) -> CoreResult<HeldCart> {
        let index = self
            .held
            .iter()
            .position(|h| h.id == held_cart_id)
            .ok_or_else(|| CoreError::HeldCartNotFound(held_cart_id.to_string()))?;
        Ok(self.held.remove(index))
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }
}

/// Live stock of a product that may still be sold.
fn sellable_on_hand(stock: &StockLedger, product_id: &str) -> CoreResult<i64> {
    let product = stock
        .product(product_id)
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
    if !product.is_active {
        return Err(CoreError::InactiveProduct(product_id.to_string()));
    }
    Ok(product.stock)
}

/// Drops empty lines and folds repeats of a product into its first line.
fn merge_lines(lines: Vec<CartLine>) -> Vec<CartLine> {
    let mut merged: Vec<CartLine> = Vec::with_capacity(lines.len());
    for line in lines.into_iter().filter(|l| l.quantity > 0) {
        match merged.iter_mut().find(|m| m.product_id == line.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(line),
        }
    }
    merged
}

// =============================================================================
// Unit Tests
// =============================================================================
