//! # Stock Ledger
//!
//! The authoritative on-hand quantity per product.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Who touches stock?                                │
//! │                                                                         │
//! │  Catalog (external) ──► upsert_product()  price/name/flags only        │
//! │                                                                         │
//! │  Cart Manager ────────► available()       READ the live value          │
//! │                                                                         │
//! │  Terminal::checkout ──► commit_sale()     decrement (crate-private)    │
//! │                                                                         │
//! │  Back office ─────────► restock()         increment                    │
//! │                                                                         │
//! │  Invariant: stock >= 0 for every product, always.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{Product, SaleLine};
use crate::validation::validate_restock_quantity;
use crate::MAX_ITEM_QUANTITY;

/// Product catalog keyed by id, with stock as the only mutable field.
#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    products: BTreeMap<String, Product>,
}

impl StockLedger {
    pub fn new() -> Self {
        StockLedger::default()
    }

    /// Builds the ledger from a catalog snapshot.
    ///
    /// Negative stock figures from a damaged snapshot are clamped to zero so
    /// the non-negative invariant holds from the first operation.
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let products = products
            .into_iter()
            .map(|mut p| {
                p.stock = p.stock.max(0);
                (p.id.clone(), p)
            })
            .collect();
        StockLedger { products }
    }

    /// Looks a product up by id.
    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    /// Live on-hand quantity.
    pub fn on_hand(&self, product_id: &str) -> Option<i64> {
        self.products.get(product_id).map(|p| p.stock)
    }

    /// All products ordered by id.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Inserts or updates catalog data for a product.
    ///
    /// For an existing product the ledger keeps its own stock figure; the
    /// supplied `stock` is only used for products the ledger has not seen.
    pub fn upsert_product(&mut self, mut product: Product) {
        match self.products.get(&product.id) {
            Some(existing) => product.stock = existing.stock,
            None => product.stock = product.stock.max(0),
        }
        self.products.insert(product.id.clone(), product);
    }

    /// Checks that `requested` units of a product can be sold right now.
    ///
    /// ## Errors
    /// - `ProductNotFound` - id not in the catalog
    /// - `InactiveProduct` - product deactivated
    /// - `OutOfStock` - zero on hand
    /// - `InsufficientStock` - fewer than `requested` on hand
    pub fn available(&self, product_id: &str, requested: i64) -> CoreResult<&Product> {
        let product = self
            .products
            .get(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if !product.is_active {
            return Err(CoreError::InactiveProduct(product_id.to_string()));
        }

        if product.stock == 0 {
            return Err(CoreError::OutOfStock {
                product_id: product.id.clone(),
                name: product.name.clone(),
            });
        }

        if requested > product.stock {
            return Err(CoreError::InsufficientStock {
                product_id: product.id.clone(),
                available: product.stock,
                requested,
            });
        }

        Ok(product)
    }

    /// Adds received units to a product's stock. Returns the new level.
    pub fn restock(&mut self, product_id: &str, quantity: i64) -> CoreResult<i64> {
        validate_restock_quantity(quantity)?;
        let product = self
            .products
            .get_mut(product_id)
            .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
        let current = product.stock;
        product.stock = current
            .checked_add(quantity)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: "restock quantity".to_string(),
                min: 0,
                max: i64::MAX - current,
            })?;
        Ok(product.stock)
    }

    /// Active products at or below their minimum-stock threshold.
    pub fn low_stock(&self) -> Vec<&Product> {
        self.products
            .values()
            .filter(|p| p.is_active && p.is_low_stock())
            .collect()
    }

    /// Decrements stock for every line of a sale, all or nothing.
    ///
    /// Quantities are summed per product and checked against live stock
    /// before the first decrement, so a failure leaves the ledger untouched.
    pub(crate) fn commit_sale(&mut self, lines: &[SaleLine]) -> CoreResult<()> {
        let mut requested: BTreeMap<&str, i64> = BTreeMap::new();
        for line in lines {
            if line.quantity <= 0 {
                return Err(ValidationError::OutOfRange {
                    field: format!("quantity of {}", line.product_id),
                    min: 1,
                    max: MAX_ITEM_QUANTITY,
                }
                .into());
            }
            let total = requested.entry(line.product_id.as_str()).or_insert(0);
            *total = total.saturating_add(line.quantity);
        }

        for (&product_id, &quantity) in &requested {
            let product = self
                .products
                .get(product_id)
                .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;
            if quantity > product.stock {
                return Err(CoreError::InsufficientStock {
                    product_id: product_id.to_string(),
                    available: product.stock,
                    requested: quantity,
                });
            }
        }

        for (product_id, quantity) in requested {
            if let Some(product) = self.products.get_mut(product_id) {
                product.stock -= quantity;
            }
        }

        Ok(())
    }

    /// Catalog snapshot for persistence.
    pub fn to_products(&self) -> Vec<Product> {
        self.products.values().cloned().collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
