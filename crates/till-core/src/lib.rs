//! # till-core: Register, Cart and Sale Logic for an Offline Till
//!
//! Everything a single-terminal shop counter needs to ring up sales: the
//! catalog's live stock, the active and held carts, payment settlement, the
//! cash-drawer session and the append-only sale ledger.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                           Till Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    till-app (commands)                          │   │
//! │  │   open_register, add_to_cart, checkout, close_register, ...     │   │
//! │  └──────────────┬──────────────────────────────────┬───────────────┘   │
//! │                 │                                  │ after mutations    │
//! │  ┌──────────────▼──────────────────────────┐  ┌────▼───────────────┐   │
//! │  │        ★ till-core (THIS CRATE) ★       │  │      till-db       │   │
//! │  │                                         │  │  snapshot store    │   │
//! │  │  Terminal                               │  │  (SQLite / memory) │   │
//! │  │   ├── StockLedger     stock.rs          │  └────────────────────┘   │
//! │  │   ├── CartManager     cart.rs           │                           │
//! │  │   ├── PaymentProcessor payment.rs       │                           │
//! │  │   ├── RegisterManager register.rs       │                           │
//! │  │   └── SaleLedger      ledger.rs         │                           │
//! │  │                                         │                           │
//! │  │  NO I/O • NO DATABASE • NO LOGGING      │                           │
//! │  └─────────────────────────────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Whole-unit integer money and tax rounding
//! - [`types`] - Catalog, tender and sale records
//! - [`error`] - Domain error types
//! - [`validation`] - Input rules shared by the components
//! - [`stock`] - Per-product stock with all-or-nothing sale commits
//! - [`cart`] - Active cart and held carts
//! - [`payment`] - Pricing and multi-tender settlement
//! - [`ledger`] - Append-only sale history
//! - [`register`] - Drawer sessions and reconciliation
//! - [`snapshot`] - Persisted document shapes
//! - [`terminal`] - The service object tying it together
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::{Money, Product, TaxRate, TenderAllocation, Terminal};
//!
//! let mut till = Terminal::new(
//!     TaxRate::from_percent(18),
//!     vec![Product::new("bread", "Bread", Money::from_units(2_500), 10)],
//! );
//!
//! till.open_register("amina", Money::from_units(50_000)).unwrap();
//! till.add_item("bread").unwrap();
//!
//! let sale = till.checkout(TenderAllocation::cash(Money::from_units(3_000))).unwrap();
//! assert_eq!(sale.total.units(), 2_950);
//! assert_eq!(sale.change_due.units(), 50);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod ledger;
pub mod money;
pub mod payment;
pub mod register;
pub mod snapshot;
pub mod stock;
pub mod terminal;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{CartLine, CartManager, HeldCart};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{SaleLedger, SalesSummary};
pub use money::Money;
pub use payment::{PaymentProcessor, SaleTotals, Settlement};
pub use register::{
    Reconciliation, RegisterManager, RegisterSession, SessionExpiryPolicy, SessionRecovery,
    SessionState,
};
pub use snapshot::{BusinessSnapshot, PreferencesSnapshot, SnapshotKind};
pub use stock::StockLedger;
pub use terminal::{Preferences, Terminal};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line.
///
/// Catches keying slips such as 1000 for 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest amount accepted for a single tender method, in whole units.
pub const MAX_TENDER_AMOUNT: i64 = 1_000_000_000_000;
