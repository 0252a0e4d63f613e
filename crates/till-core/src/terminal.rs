//! # Terminal
//!
//! The injectable service object that ties the components together and
//! runs the finalize-sale protocol.
//!
//! ## Finalize-Sale Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout(tender)                                                       │
//! │                                                                         │
//! │  Preconditions (nothing mutated if any fails):                          │
//! │    register open ──► cart non-empty ──► payment sufficient              │
//! │                                                                         │
//! │  1. sequence = prior sale count + 1                                     │
//! │  2. stock.commit_sale(lines)     all lines checked, then decremented    │
//! │  3. register.record_sale(sale)   balance += total                       │
//! │  4. cart.clear()                                                        │
//! │  5. sales.append(sale)           append-only ledger                     │
//! │                                                                         │
//! │  Step 2 is the only fallible mutation and it is all-or-nothing, so      │
//! │  the protocol either completes or leaves every component untouched.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operations take `&mut self` and run to completion synchronously; callers
//! that share a terminal serialise access themselves.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::cart::{CartLine, CartManager, HeldCart};
use crate::error::{CoreError, CoreResult};
use crate::ledger::{SaleLedger, SalesSummary};
use crate::money::Money;
use crate::payment::{PaymentProcessor, SaleTotals};
use crate::register::{
    session_summary, RegisterManager, RegisterSession, SessionExpiryPolicy, SessionRecovery,
};
use crate::snapshot::{BusinessSnapshot, PreferencesSnapshot};
use crate::stock::StockLedger;
use crate::types::{Category, Product, Sale, SaleLine, TaxRate, TenderAllocation};
use crate::validation::validate_tax_rate_bps;

/// UI preferences carried alongside the active session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Preferences {
    pub dark_mode: bool,
    pub active_catalog_scope_id: Option<String>,
}

/// One till: catalog stock, active cart, drawer session and sale history.
#[derive(Debug, Clone)]
pub struct Terminal {
    stock: StockLedger,
    cart: CartManager,
    payments: PaymentProcessor,
    register: RegisterManager,
    sales: SaleLedger,
    categories: Vec<Category>,
    preferences: Preferences,
}

impl Terminal {
    /// Creates a terminal over a catalog with no sales history.
    pub fn new(tax_rate: TaxRate, products: Vec<Product>) -> Self {
        Terminal {
            stock: StockLedger::from_products(products),
            cart: CartManager::new(),
            payments: PaymentProcessor::new(tax_rate),
            register: RegisterManager::new(),
            sales: SaleLedger::new(),
            categories: Vec::new(),
            preferences: Preferences::default(),
        }
    }

    /// Rebuilds a terminal from persisted snapshots.
    ///
    /// An open session older than `policy` allows is not resumed; the
    /// returned [`SessionRecovery`] says which case applied.
    pub fn restore(
        tax_rate: TaxRate,
        business: BusinessSnapshot,
        preferences: PreferencesSnapshot,
        policy: &SessionExpiryPolicy,
        now: DateTime<Utc>,
    ) -> (Self, SessionRecovery) {
        let (register, recovery) = RegisterManager::restore(
            preferences.active_register_session,
            business.register_sessions,
            policy,
            now,
        );

        let terminal = Terminal {
            stock: StockLedger::from_products(business.products),
            cart: CartManager::restore(preferences.active_cart, preferences.held_carts),
            payments: PaymentProcessor::new(tax_rate),
            register,
            sales: SaleLedger::from_sales(business.sales),
            categories: business.categories,
            preferences: Preferences {
                dark_mode: preferences.dark_mode,
                active_catalog_scope_id: preferences.active_catalog_scope_id,
            },
        };
        (terminal, recovery)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn stock(&self) -> &StockLedger {
        &self.stock
    }

    pub fn cart(&self) -> &CartManager {
        &self.cart
    }

    pub fn register(&self) -> &RegisterManager {
        &self.register
    }

    pub fn sales(&self) -> &SaleLedger {
        &self.sales
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.payments.tax_rate()
    }

    /// Changes the flat tax rate used for subsequent quotes and sales.
    pub fn set_tax_rate(&mut self, tax_rate: TaxRate) -> CoreResult<()> {
        validate_tax_rate_bps(tax_rate.bps())?;
        self.payments = PaymentProcessor::new(tax_rate);
        Ok(())
    }

    // =========================================================================
    // Register
    // =========================================================================

    pub fn open_register(
        &mut self,
        operator_id: &str,
        opening_float: Money,
    ) -> CoreResult<&RegisterSession> {
        self.register.open(operator_id, opening_float)
    }

    /// Closes the drawer. `counted_cash` is `None` when no count was entered.
    pub fn close_register(&mut self, counted_cash: Option<Money>) -> CoreResult<&RegisterSession> {
        self.register.close(counted_cash, &self.sales)
    }

    pub fn current_session(&self) -> Option<&RegisterSession> {
        self.register.current()
    }

    /// Closed sessions, oldest first.
    pub fn session_history(&self) -> &[RegisterSession] {
        self.register.history()
    }

    /// Running totals of the open session.
    pub fn session_summary(&self) -> CoreResult<SalesSummary> {
        let session = self.register.require_open()?;
        Ok(session_summary(session, &self.sales))
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn add_item(&mut self, product_id: &str) -> CoreResult<&CartLine> {
        self.register.require_open()?;
        self.cart.add_item(&self.stock, product_id)
    }

    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        self.register.require_open()?;
        self.cart.set_quantity(&self.stock, product_id, quantity)
    }

    pub fn clear_cart(&mut self) {
        self.cart.clear();
    }

    pub fn hold_cart(&mut self, name: &str) -> CoreResult<&HeldCart> {
        self.cart.hold(name)
    }

    pub fn resume_cart(&mut self, held_cart_id: &str) -> CoreResult<()> {
        self.register.require_open()?;
        self.cart.resume(held_cart_id)
    }

    pub fn held_carts(&self) -> &[HeldCart] {
        self.cart.held()
    }

    pub fn delete_held_cart(&mut self, held_cart_id: &str) -> CoreResult<HeldCart> {
        self.cart.delete_held(held_cart_id)
    }

    /// Live totals of the active cart.
    pub fn quote(&self) -> SaleTotals {
        self.payments.quote(self.cart.lines())
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Settles the active cart and records the sale.
    ///
    /// ## Errors
    /// - `RegisterClosed` - no open session
    /// - `EmptyCart` - nothing to sell
    /// - `InvalidTender` / `InsufficientPayment` - payment rejected
    /// - `ProductNotFound` / `InsufficientStock` - a line no longer fits live
    ///   stock (e.g. a resumed held cart)
    ///
    /// On any error no component has changed.
    pub fn checkout(&mut self, tender: TenderAllocation) -> CoreResult<&Sale> {
        let session = self.register.require_open()?;
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        let settlement = self.payments.settle(self.cart.lines(), tender)?;

        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sequence_number: self.sales.next_sequence(),
            timestamp: Utc::now(),
            lines: self.cart.lines().iter().map(SaleLine::from).collect(),
            subtotal: settlement.totals.subtotal,
            tax: settlement.totals.tax,
            total: settlement.totals.total,
            tender: settlement.tender,
            amount_tendered: settlement.amount_tendered,
            change_due: settlement.change_due,
            operator_id: session.opened_by.clone(),
            session_id: session.id.clone(),
        };

        self.stock.commit_sale(&sale.lines)?;
        self.register.record_sale(&sale)?;
        self.cart.clear();
        Ok(self.sales.append(sale))
    }

    // =========================================================================
    // Catalog & Stock
    // =========================================================================

    /// Receives stock for a product. Returns the new on-hand level.
    pub fn restock(&mut self, product_id: &str, quantity: i64) -> CoreResult<i64> {
        self.stock.restock(product_id, quantity)
    }

    /// Applies a catalog edit; stock stays under ledger control.
    pub fn upsert_product(&mut self, product: Product) {
        self.stock.upsert_product(product);
    }

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    pub fn low_stock(&self) -> Vec<&Product> {
        self.stock.low_stock()
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    pub fn set_dark_mode(&mut self, enabled: bool) {
        self.preferences.dark_mode = enabled;
    }

    pub fn set_catalog_scope(&mut self, scope_id: Option<String>) {
        self.preferences.active_catalog_scope_id = scope_id;
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    pub fn business_snapshot(&self) -> BusinessSnapshot {
        BusinessSnapshot {
            products: self.stock.to_products(),
            sales: self.sales.to_sales(),
            categories: self.categories.clone(),
            register_sessions: self.register.history().to_vec(),
        }
    }

    pub fn preferences_snapshot(&self) -> PreferencesSnapshot {
        PreferencesSnapshot {
            dark_mode: self.preferences.dark_mode,
            active_catalog_scope_id: self.preferences.active_catalog_scope_id.clone(),
            active_register_session: self.register.current().cloned(),
            active_cart: self.cart.lines().to_vec(),
            held_carts: self.cart.held().to_vec(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TenderMethod;

    fn terminal() -> Terminal {
        Terminal::new(
            TaxRate::from_percent(18),
            vec![
                Product::new("P", "Bread", Money::from_units(2_500), 10),
                Product::new("Q", "Milk", Money::from_units(500), 100),
            ],
        )
    }

    #[test]
    fn test_cart_mutations_require_open_register() {
        let mut t = terminal();
        assert_eq!(t.add_item("P").unwrap_err(), CoreError::RegisterClosed);
        assert_eq!(t.set_quantity("P", 1).unwrap_err(), CoreError::RegisterClosed);
        assert_eq!(
            t.checkout(TenderAllocation::cash(Money::from_units(1))).unwrap_err(),
            CoreError::RegisterClosed
        );
        assert!(t.cart().is_empty());
    }

    #[test]
    fn test_checkout_empty_cart() {
        let mut t = terminal();
        t.open_register("amina", Money::zero()).unwrap();
        assert_eq!(
            t.checkout(TenderAllocation::cash(Money::from_units(100))).unwrap_err(),
            CoreError::EmptyCart
        );
    }

    #[test]
    fn test_checkout_records_operator_and_session() {
        let mut t = terminal();
        let session_id = t.open_register("amina", Money::zero()).unwrap().id.clone();
        t.add_item("Q").unwrap();

        let sale = t
            .checkout(TenderAllocation::default().with(TenderMethod::Card, Money::from_units(590)))
            .unwrap()
            .clone();

        assert_eq!(sale.sequence_number, 1);
        assert_eq!(sale.operator_id, "amina");
        assert_eq!(sale.session_id, session_id);
        assert_eq!(t.register().current().unwrap().sale_numbers, vec![1]);
        assert!(t.cart().is_empty());
    }

    #[test]
    fn test_resumed_cart_over_stock_is_rejected_at_checkout() {
        let mut t = terminal();
        t.open_register("amina", Money::zero()).unwrap();
        t.add_item("P").unwrap();
        t.set_quantity("P", 10).unwrap();
        let held = t.hold_cart("Order 12").unwrap().id.clone();

        // Another customer buys most of the bread while the cart is on hold.
        t.add_item("P").unwrap();
        t.set_quantity("P", 8).unwrap();
        t.checkout(TenderAllocation::cash(Money::from_units(23_600))).unwrap();
        assert_eq!(t.stock().on_hand("P"), Some(2));

        t.resume_cart(&held).unwrap();
        assert_eq!(t.cart().line("P").unwrap().quantity, 10);

        let err = t
            .checkout(TenderAllocation::cash(Money::from_units(1_000_000)))
            .unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { available: 2, .. }));
        assert_eq!(t.stock().on_hand("P"), Some(2));
        assert_eq!(t.sales().len(), 1);
        assert_eq!(t.cart().line("P").unwrap().quantity, 10);
    }

    #[test]
    fn test_set_tax_rate() {
        let mut t = terminal();
        t.set_tax_rate(TaxRate::from_percent(10)).unwrap();
        assert_eq!(t.tax_rate().bps(), 1000);
        assert!(t.set_tax_rate(TaxRate::from_bps(20_000)).is_err());
    }

    #[test]
    fn test_snapshots_restore_equivalent_terminal() {
        let mut t = terminal();
        t.open_register("amina", Money::from_units(1_000)).unwrap();
        t.add_item("Q").unwrap();
        t.checkout(TenderAllocation::cash(Money::from_units(590))).unwrap();
        t.add_item("P").unwrap();
        t.set_dark_mode(true);

        let (restored, recovery) = Terminal::restore(
            t.tax_rate(),
            t.business_snapshot(),
            t.preferences_snapshot(),
            &SessionExpiryPolicy::default(),
            Utc::now(),
        );

        assert!(recovery.resumed.is_some());
        assert_eq!(restored.business_snapshot(), t.business_snapshot());
        assert_eq!(restored.preferences_snapshot(), t.preferences_snapshot());
        assert_eq!(restored.sales().next_sequence(), 2);
    }
}
