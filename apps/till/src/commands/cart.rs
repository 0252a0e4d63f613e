//! # Cart Commands
//!
//! Commands for cart manipulation and held carts.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│  Tender  │────►│   Sale   │       │
//! │  │  Cart    │     │          │     │          │     │ (ledger) │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                     │      ▲          checkout (sale.rs)               │
//! │              hold_cart    resume_held_cart                              │
//! │                     ▼      │                                            │
//! │                   ┌──────────┐                                          │
//! │                   │   Held   │ ── delete_held_cart                      │
//! │                   └──────────┘                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Adding, changing and resuming need an open register; everything else
//! works any time.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{DbState, TerminalState, Touched};
use till_core::{CartLine, HeldCart, Money, SaleTotals, Terminal};

/// Cart response including lines and live totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: SaleTotals,
    pub line_count: usize,
    pub total_quantity: i64,
}

impl From<&Terminal> for CartResponse {
    fn from(terminal: &Terminal) -> Self {
        CartResponse {
            lines: terminal.cart().lines().to_vec(),
            totals: terminal.quote(),
            line_count: terminal.cart().lines().len(),
            total_quantity: terminal.cart().total_quantity(),
        }
    }
}

/// A held cart as listed in the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeldCartSummary {
    pub id: String,
    pub name: String,
    pub held_at: String,
    pub line_count: usize,
    pub subtotal: Money,
}

impl From<&HeldCart> for HeldCartSummary {
    fn from(held: &HeldCart) -> Self {
        HeldCartSummary {
            id: held.id.clone(),
            name: held.name.clone(),
            held_at: held.held_at.to_rfc3339(),
            line_count: held.lines.len(),
            subtotal: held.subtotal(),
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(terminal: &TerminalState) -> CartResponse {
    debug!("get_cart command");
    terminal.with_terminal(|t| CartResponse::from(t))
}

/// Adds one unit of a product to the cart.
///
/// ## Behavior
/// - Product already in cart: quantity increases by one
/// - Product not in cart: new line at the current catalog price
///
/// ## Errors
/// `REGISTER_CLOSED`, `NOT_FOUND`, `OUT_OF_STOCK`, `INSUFFICIENT_STOCK`,
/// `CART_ERROR` (inactive product, cart full)
pub async fn add_to_cart(
    terminal: &TerminalState,
    db: &DbState,
    product_id: String,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, "add_to_cart command");

    let response = terminal.with_terminal_mut(|t| {
        t.add_item(&product_id)?;
        Ok::<_, ApiError>(CartResponse::from(&*t))
    })?;

    db.persist(terminal, Touched::Preferences).await;
    Ok(response)
}

/// Sets the quantity of a cart line.
///
/// ## Behavior
/// - Quantity 0 or less: removes the line
/// - Quantity above live stock: rejected, cart unchanged
pub async fn update_cart_item(
    terminal: &TerminalState,
    db: &DbState,
    product_id: String,
    quantity: i64,
) -> Result<CartResponse, ApiError> {
    debug!(product_id = %product_id, quantity = %quantity, "update_cart_item command");

    let response = terminal.with_terminal_mut(|t| {
        t.set_quantity(&product_id, quantity)?;
        Ok::<_, ApiError>(CartResponse::from(&*t))
    })?;

    db.persist(terminal, Touched::Preferences).await;
    Ok(response)
}

/// Removes a line from the cart.
pub async fn remove_from_cart(
    terminal: &TerminalState,
    db: &DbState,
    product_id: String,
) -> Result<CartResponse, ApiError> {
    update_cart_item(terminal, db, product_id, 0).await
}

/// Clears all lines from the cart.
pub async fn clear_cart(terminal: &TerminalState, db: &DbState) -> CartResponse {
    debug!("clear_cart command");

    let response = terminal.with_terminal_mut(|t| {
        t.clear_cart();
        CartResponse::from(&*t)
    });

    db.persist(terminal, Touched::Preferences).await;
    response
}

/// Parks the active cart under a name and empties it.
pub async fn hold_cart(
    terminal: &TerminalState,
    db: &DbState,
    name: String,
) -> Result<HeldCartSummary, ApiError> {
    debug!(name = %name, "hold_cart command");

    let held = terminal.with_terminal_mut(|t| {
        let held = t.hold_cart(&name)?;
        Ok::<_, ApiError>(HeldCartSummary::from(held))
    })?;

    info!(held_cart_id = %held.id, name = %held.name, lines = held.line_count, "Cart held");
    db.persist(terminal, Touched::Preferences).await;
    Ok(held)
}

/// Lists held carts, oldest first.
pub fn list_held_carts(terminal: &TerminalState) -> Vec<HeldCartSummary> {
    debug!("list_held_carts command");
    terminal.with_terminal(|t| t.held_carts().iter().map(HeldCartSummary::from).collect())
}

/// Makes a held cart the active cart, replacing any active lines.
///
/// Stock is re-checked at checkout, not here.
pub async fn resume_held_cart(
    terminal: &TerminalState,
    db: &DbState,
    held_cart_id: String,
) -> Result<CartResponse, ApiError> {
    debug!(held_cart_id = %held_cart_id, "resume_held_cart command");

    let response = terminal.with_terminal_mut(|t| {
        t.resume_cart(&held_cart_id)?;
        Ok::<_, ApiError>(CartResponse::from(&*t))
    })?;

    info!(held_cart_id = %held_cart_id, "Held cart resumed");
    db.persist(terminal, Touched::Preferences).await;
    Ok(response)
}

/// Discards a held cart.
pub async fn delete_held_cart(
    terminal: &TerminalState,
    db: &DbState,
    held_cart_id: String,
) -> Result<(), ApiError> {
    debug!(held_cart_id = %held_cart_id, "delete_held_cart command");

    terminal.with_terminal_mut(|t| t.delete_held_cart(&held_cart_id))?;

    info!(held_cart_id = %held_cart_id, "Held cart deleted");
    db.persist(terminal, Touched::Preferences).await;
    Ok(())
}
