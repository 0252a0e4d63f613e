//! # Sale Commands
//!
//! Checkout and receipt retrieval.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState, TerminalState, Touched};
use till_core::{Money, Sale, TenderAllocation, TenderMethod};

/// Tender amounts as entered at the payment screen. Missing methods are 0.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TenderRequest {
    pub cash: i64,
    pub card: i64,
    pub mobile_money: i64,
}

impl From<TenderRequest> for TenderAllocation {
    fn from(req: TenderRequest) -> Self {
        TenderAllocation::cash(Money::from_units(req.cash))
            .with(TenderMethod::Card, Money::from_units(req.card))
            .with(TenderMethod::MobileMoney, Money::from_units(req.mobile_money))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub sale_id: String,
    pub sequence_number: u64,
    pub store_name: String,
    pub store_address: Vec<String>,
    pub timestamp: String,
    pub operator_id: String,
    pub items: Vec<ReceiptItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub tax_rate_percent: f64,
    pub total: Money,
    pub payments: Vec<ReceiptPayment>,
    pub amount_tendered: Money,
    pub change_due: Money,
    pub total_display: String,
    pub change_display: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_total: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptPayment {
    pub method: TenderMethod,
    pub amount: Money,
}

impl ReceiptResponse {
    /// Builds a receipt from a finalized sale.
    pub fn from_sale(sale: &Sale, config: &ConfigState) -> Self {
        let tax_rate_percent = if sale.subtotal.is_zero() {
            0.0
        } else {
            config.tax_rate().percentage()
        };

        ReceiptResponse {
            sale_id: sale.id.clone(),
            sequence_number: sale.sequence_number,
            store_name: config.store_name.clone(),
            store_address: config.store_address.clone(),
            timestamp: sale.timestamp.to_rfc3339(),
            operator_id: sale.operator_id.clone(),
            items: sale
                .lines
                .iter()
                .map(|l| ReceiptItem {
                    name: l.name.clone(),
                    quantity: l.quantity,
                    unit_price: l.unit_price,
                    line_total: l.line_total(),
                })
                .collect(),
            subtotal: sale.subtotal,
            tax: sale.tax,
            tax_rate_percent,
            total: sale.total,
            payments: TenderMethod::ALL
                .iter()
                .map(|&method| ReceiptPayment {
                    method,
                    amount: sale.tender.get(method),
                })
                .filter(|p| p.amount.is_positive())
                .collect(),
            amount_tendered: sale.amount_tendered,
            change_due: sale.change_due,
            total_display: config.format_currency(sale.total),
            change_display: config.format_currency(sale.change_due),
        }
    }
}

/// Settles the active cart and records the sale.
///
/// ## Errors
/// - `REGISTER_CLOSED` - no open session
/// - `CART_ERROR` - empty cart
/// - `INSUFFICIENT_PAYMENT` - tender below total; nothing changed
/// - `PAYMENT_ERROR` - negative tender amount
/// - `INSUFFICIENT_STOCK` / `NOT_FOUND` - a resumed line no longer fits stock
pub async fn checkout(
    terminal: &TerminalState,
    db: &DbState,
    config: &ConfigState,
    tender: TenderRequest,
) -> Result<ReceiptResponse, ApiError> {
    debug!(?tender, "checkout command");

    let receipt = terminal.with_terminal_mut(|t| {
        let sale = t.checkout(tender.into())?;
        Ok::<_, ApiError>(ReceiptResponse::from_sale(sale, config))
    })?;

    info!(
        sale_id = %receipt.sale_id,
        sequence_number = receipt.sequence_number,
        total = %receipt.total,
        change = %receipt.change_due,
        items = receipt.items.len(),
        "Sale finalized"
    );

    db.persist(terminal, Touched::Both).await;
    Ok(receipt)
}

/// Reprints a receipt by sequence number.
pub fn get_receipt(
    terminal: &TerminalState,
    config: &ConfigState,
    sequence_number: u64,
) -> Result<ReceiptResponse, ApiError> {
    debug!(sequence_number, "get_receipt command");

    terminal.with_terminal(|t| {
        t.sales()
            .get(sequence_number)
            .map(|sale| ReceiptResponse::from_sale(sale, config))
            .ok_or_else(|| ApiError::not_found("Sale", &sequence_number.to_string()))
    })
}

/// Receipts for the open session, oldest first.
pub fn list_session_sales(
    terminal: &TerminalState,
    config: &ConfigState,
) -> Result<Vec<ReceiptResponse>, ApiError> {
    debug!("list_session_sales command");

    terminal.with_terminal(|t| {
        let session = t.register().require_open()?;
        let receipts: Vec<ReceiptResponse> = t
            .sales()
            .for_session(&session.id)
            .map(|sale| ReceiptResponse::from_sale(sale, config))
            .collect();
        Ok::<_, ApiError>(receipts)
    })
}
