//! # Sale Ledger
//!
//! Append-only record of finalized sales.
//!
//! Sales are never edited or removed; returns would be separate
//! compensating records. Sequence numbers run across register sessions.

use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::Sale;

/// Ordered, append-only list of sales.
#[derive(Debug, Clone, Default)]
pub struct SaleLedger {
    sales: Vec<Sale>,
}

impl SaleLedger {
    pub fn new() -> Self {
        SaleLedger::default()
    }

    /// Rebuilds the ledger from persisted sales, ordered by sequence number.
    pub fn from_sales(mut sales: Vec<Sale>) -> Self {
        sales.sort_by_key(|s| s.sequence_number);
        SaleLedger { sales }
    }

    /// Sequence number for the next sale: prior sale count + 1.
    ///
    /// If a restored history has gaps the number continues after the highest
    /// recorded one, so numbers never repeat.
    pub fn next_sequence(&self) -> u64 {
        let by_count = self.sales.len() as u64 + 1;
        let by_last = self.sales.last().map_or(1, |s| s.sequence_number + 1);
        by_count.max(by_last)
    }

    pub(crate) fn append(&mut self, sale: Sale) -> &Sale {
        self.sales.push(sale);
        &self.sales[self.sales.len() - 1]
    }

    pub fn get(&self, sequence_number: u64) -> Option<&Sale> {
        self.sales
            .binary_search_by_key(&sequence_number, |s| s.sequence_number)
            .ok()
            .map(|i| &self.sales[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sale> {
        self.sales.iter()
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    pub fn last(&self) -> Option<&Sale> {
        self.sales.last()
    }

    /// Sales rung up in a given register session.
    pub fn for_session<'a>(&'a self, session_id: &'a str) -> impl Iterator<Item = &'a Sale> + 'a {
        self.sales.iter().filter(move |s| s.session_id == session_id)
    }

    pub fn to_sales(&self) -> Vec<Sale> {
        self.sales.clone()
    }
}

/// Tender and revenue totals over a set of sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesSummary {
    pub sale_count: u64,
    pub cash: Money,
    pub card: Money,
    pub mobile_money: Money,
    /// Cash left in the drawer after change.
    pub cash_collected: Money,
    pub change_given: Money,
    pub tax: Money,
    pub total_sales: Money,
}

impl SalesSummary {
    pub fn from_sales<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> Self {
        sales.into_iter().fold(SalesSummary::default(), |mut acc, sale| {
            acc.sale_count += 1;
            acc.cash += sale.tender.cash;
            acc.card += sale.tender.card;
            acc.mobile_money += sale.tender.mobile_money;
            acc.cash_collected += sale.cash_collected();
            acc.change_given += sale.change_due;
            acc.tax += sale.tax;
            acc.total_sales += sale.total;
            acc
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
