//! # Product Commands
//!
//! Catalog lookup, restocking and catalog edits.
//!
//! ## Search Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Product Search Flow                                  │
//! │                                                                         │
//! │  User types "bread"                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  search_products { query: 'bread', limit: 20 }                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌───────────────────────────────────────────┐                         │
//! │  │  Catalog scope set?                       │                         │
//! │  │  YES: only products in that category      │                         │
//! │  │  NO:  whole catalog                       │                         │
//! │  └───────────────────────────────────────────┘                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Exact id match first, then case-insensitive name match                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Return Vec<ProductDto> to frontend                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{DbState, TerminalState, Touched};
use till_core::{Money, Product, Terminal};

const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 100;

/// Product as sent to the frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub min_stock: i64,
    pub is_active: bool,
    pub category_id: Option<String>,
    /// Drives the low-stock badge in the product grid.
    pub is_low_stock: bool,
}

impl From<&Product> for ProductDto {
    fn from(p: &Product) -> Self {
        ProductDto {
            id: p.id.clone(),
            name: p.name.clone(),
            price: p.price,
            stock: p.stock,
            min_stock: p.min_stock,
            is_active: p.is_active,
            category_id: p.category_id.clone(),
            is_low_stock: p.is_low_stock(),
        }
    }
}

/// Catalog edit submitted by the back office.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub id: String,
    pub name: String,
    pub price: i64,
    #[serde(default)]
    pub cost: i64,
    /// Opening stock; ignored for products already in the catalog.
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub category_id: Option<String>,
}

fn default_active() -> bool {
    true
}

impl ProductRequest {
    fn into_product(self) -> Result<Product, ApiError> {
        let id = self.id.trim();
        let name = self.name.trim();
        if id.is_empty() {
            return Err(ApiError::validation("Product id is required"));
        }
        if name.is_empty() {
            return Err(ApiError::validation("Product name is required"));
        }
        if self.price < 0 || self.cost < 0 {
            return Err(ApiError::validation("Price and cost must not be negative"));
        }
        if self.stock < 0 || self.min_stock < 0 {
            return Err(ApiError::validation("Stock figures must not be negative"));
        }

        Ok(Product {
            id: id.to_string(),
            name: name.to_string(),
            price: Money::from_units(self.price),
            cost: Money::from_units(self.cost),
            stock: self.stock,
            min_stock: self.min_stock,
            is_active: self.is_active,
            category_id: self.category_id.filter(|c| !c.trim().is_empty()),
        })
    }
}

/// Products visible under the current catalog scope.
fn in_scope(terminal: &Terminal) -> impl Iterator<Item = &Product> {
    let scope = terminal.preferences().active_catalog_scope_id.as_deref();
    terminal
        .stock()
        .products()
        .filter(move |p| scope.is_none() || p.category_id.as_deref() == scope)
}

/// Lists every product in the current catalog scope, ordered by id.
pub fn list_products(terminal: &TerminalState) -> Vec<ProductDto> {
    debug!("list_products command");
    terminal.with_terminal(|t| in_scope(t).map(ProductDto::from).collect())
}

/// Searches the catalog.
///
/// ## Arguments
/// * `query` - Product id or part of a name; blank lists the scope
/// * `limit` - Maximum results (default: 20, max: 100)
///
/// ## Returns
/// An exact id match first, then name matches in id order. Inactive
/// products are left out.
pub fn search_products(
    terminal: &TerminalState,
    query: String,
    limit: Option<usize>,
) -> Vec<ProductDto> {
    let start = Instant::now();
    let query = query.trim().to_lowercase();
    let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT).min(MAX_SEARCH_LIMIT);

    debug!(query = %query, limit, "search_products command");

    let results: Vec<ProductDto> = terminal.with_terminal(|t| {
        let mut matches: Vec<&Product> = in_scope(t)
            .filter(|p| p.is_active)
            .filter(|p| query.is_empty() || p.id == query || p.name.to_lowercase().contains(&query))
            .collect();
        // Stable sort keeps id order among the rest.
        matches.sort_by_key(|p| p.id != query);
        matches.into_iter().take(limit).map(ProductDto::from).collect()
    });

    info!(
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        count = results.len(),
        query = %query,
        "search_products complete"
    );
    results
}

/// Gets a single product by id.
pub fn get_product(terminal: &TerminalState, id: String) -> Result<ProductDto, ApiError> {
    debug!(id = %id, "get_product command");
    terminal.with_terminal(|t| {
        t.stock()
            .product(&id)
            .map(ProductDto::from)
            .ok_or_else(|| ApiError::not_found("Product", &id))
    })
}

/// Active products at or below their minimum stock.
pub fn get_low_stock(terminal: &TerminalState) -> Vec<ProductDto> {
    debug!("get_low_stock command");
    terminal.with_terminal(|t| t.low_stock().into_iter().map(ProductDto::from).collect())
}

/// Receives stock for a product.
///
/// ## Errors
/// `NOT_FOUND`, `VALIDATION_ERROR` (quantity not positive)
pub async fn restock_product(
    terminal: &TerminalState,
    db: &DbState,
    id: String,
    quantity: i64,
) -> Result<ProductDto, ApiError> {
    debug!(id = %id, quantity, "restock_product command");

    let product = terminal.with_terminal_mut(|t| {
        let on_hand = t.restock(&id, quantity)?;
        let product = t
            .stock()
            .product(&id)
            .map(ProductDto::from)
            .ok_or_else(|| ApiError::not_found("Product", &id))?;
        debug!(id = %id, on_hand, "Stock received");
        Ok::<_, ApiError>(product)
    })?;

    info!(id = %product.id, quantity, on_hand = product.stock, "Product restocked");
    if product.is_low_stock {
        warn!(id = %product.id, on_hand = product.stock, min_stock = product.min_stock, "Still at or below minimum stock");
    }

    db.persist(terminal, Touched::Business).await;
    Ok(product)
}

/// Creates a product or updates catalog fields of an existing one.
///
/// Stock of an existing product is left alone; use `restock_product`.
pub async fn upsert_product(
    terminal: &TerminalState,
    db: &DbState,
    request: ProductRequest,
) -> Result<ProductDto, ApiError> {
    debug!(id = %request.id, "upsert_product command");

    let product = request.into_product()?;
    let id = product.id.clone();

    let saved = terminal.with_terminal_mut(|t| {
        t.upsert_product(product);
        t.stock()
            .product(&id)
            .map(ProductDto::from)
            .ok_or_else(|| ApiError::internal("Product missing after upsert"))
    })?;

    info!(id = %saved.id, name = %saved.name, price = %saved.price, "Product saved");
    db.persist(terminal, Touched::Business).await;
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::{Category, TaxRate};

    fn terminal() -> TerminalState {
        let mut bread = Product::new("bread", "White Bread", Money::from_units(2_500), 10);
        bread.category_id = Some("bakery".into());
        let mut buns = Product::new("buns", "Bread Buns", Money::from_units(800), 2);
        buns.category_id = Some("bakery".into());
        buns.min_stock = 5;
        let mut milk = Product::new("milk", "Milk 500ml", Money::from_units(500), 40);
        milk.category_id = Some("dairy".into());
        let mut old = Product::new("rye", "Rye Bread", Money::from_units(3_000), 4);
        old.is_active = false;

        let mut t = Terminal::new(TaxRate::from_percent(18), vec![bread, buns, milk, old]);
        t.set_categories(vec![
            Category { id: "bakery".into(), name: "Bakery".into() },
            Category { id: "dairy".into(), name: "Dairy".into() },
        ]);
        TerminalState::new(t)
    }

    #[test]
    fn test_search_matches_name_case_insensitively() {
        let results = search_products(&terminal(), "BREAD".into(), None);
        let ids: Vec<_> = results.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["bread", "buns"]);
    }

    #[test]
    fn test_search_puts_exact_id_first() {
        let results = search_products(&terminal(), "buns".into(), None);
        assert_eq!(results[0].id, "buns");
    }

    #[test]
    fn test_search_respects_limit_and_scope() {
        let state = terminal();
        assert_eq!(search_products(&state, "".into(), Some(1)).len(), 1);

        state.with_terminal_mut(|t| t.set_catalog_scope(Some("dairy".into())));
        let ids: Vec<_> = list_products(&state).into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["milk"]);
    }

    #[test]
    fn test_low_stock_flag() {
        let state = terminal();
        let low: Vec<_> = get_low_stock(&state).into_iter().map(|p| p.id).collect();
        assert_eq!(low, vec!["buns"]);
        assert!(get_product(&state, "buns".into()).unwrap().is_low_stock);
    }

    #[test]
    fn test_get_unknown_product() {
        let err = get_product(&terminal(), "nope".into()).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);
    }

    #[test]
    fn test_product_request_validation() {
        let request = ProductRequest {
            id: "tea".into(),
            name: "  ".into(),
            price: 1_000,
            cost: 0,
            stock: 0,
            min_stock: 0,
            is_active: true,
            category_id: None,
        };
        assert!(request.into_product().is_err());
    }
}
