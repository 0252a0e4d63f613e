//! # Register Commands
//!
//! Opening, closing and inspecting the cash-drawer session.
//!
//! ## Shift Workflow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Start of shift                                                         │
//! │    open_register { operatorId, openingFloat: 50000 }                    │
//! │                                                                         │
//! │  During shift                                                           │
//! │    get_session_status → balance, running tender totals                 │
//! │                                                                         │
//! │  End of shift                                                           │
//! │    count the drawer                                                     │
//! │    close_register { countedCash: 57080 }                                │
//! │      → expected 57,080 · counted 57,080 · variance 0                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState, TerminalState, Touched};
use till_core::{Money, Reconciliation, RegisterSession, SalesSummary, SessionState};

/// A register session as shown in the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub id: String,
    pub state: SessionState,
    pub opened_by: String,
    pub opened_at: String,
    pub closed_at: Option<String>,
    pub opening_float: Money,
    pub balance: Money,
    pub sale_count: usize,
    pub reconciliation: Option<Reconciliation>,
}

impl From<&RegisterSession> for SessionResponse {
    fn from(session: &RegisterSession) -> Self {
        SessionResponse {
            id: session.id.clone(),
            state: session.state,
            opened_by: session.opened_by.clone(),
            opened_at: session.opened_at.to_rfc3339(),
            closed_at: session.closed_at.map(|t| t.to_rfc3339()),
            opening_float: session.opening_float,
            balance: session.balance,
            sale_count: session.sale_numbers.len(),
            reconciliation: session.reconciliation.clone(),
        }
    }
}

/// Whether the register is open, and its running figures if so.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub is_open: bool,
    pub session: Option<SessionResponse>,
    pub summary: Option<SalesSummary>,
}

/// Close-of-day result with display strings for the Z-report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseRegisterResponse {
    pub session: SessionResponse,
    pub reconciliation: Reconciliation,
    pub expected_cash_display: String,
    pub counted_cash_display: String,
    pub variance_display: String,
}

/// Opens the register with an opening float.
///
/// ## Errors
/// `SESSION_ALREADY_OPEN`, `INVALID_CASH_AMOUNT` (negative float),
/// `VALIDATION_ERROR` (blank operator)
pub async fn open_register(
    terminal: &TerminalState,
    db: &DbState,
    operator_id: String,
    opening_float: i64,
) -> Result<SessionResponse, ApiError> {
    debug!(operator_id = %operator_id, opening_float, "open_register command");

    let session = terminal.with_terminal_mut(|t| {
        let session = t.open_register(&operator_id, Money::from_units(opening_float))?;
        Ok::<_, ApiError>(SessionResponse::from(session))
    })?;

    info!(
        session_id = %session.id,
        operator_id = %session.opened_by,
        opening_float = %session.opening_float,
        "Register opened"
    );
    db.persist(terminal, Touched::Preferences).await;
    Ok(session)
}

/// Closes the register against a counted drawer amount.
///
/// ## Arguments
/// * `counted_cash` - Physically counted cash; `None` is rejected
///
/// ## Errors
/// `REGISTER_CLOSED`, `INVALID_CASH_AMOUNT` (missing or negative count)
pub async fn close_register(
    terminal: &TerminalState,
    db: &DbState,
    config: &ConfigState,
    counted_cash: Option<i64>,
) -> Result<CloseRegisterResponse, ApiError> {
    debug!(?counted_cash, "close_register command");

    let session = terminal.with_terminal_mut(|t| {
        let session = t.close_register(counted_cash.map(Money::from_units))?;
        Ok::<_, ApiError>(SessionResponse::from(session))
    })?;

    let reconciliation = session
        .reconciliation
        .clone()
        .ok_or_else(|| ApiError::internal("Closed session has no reconciliation"))?;

    if reconciliation.variance.is_zero() {
        info!(session_id = %session.id, expected = %reconciliation.expected_cash, "Register closed, drawer balanced");
    } else {
        warn!(
            session_id = %session.id,
            expected = %reconciliation.expected_cash,
            counted = %reconciliation.counted_cash,
            variance = %reconciliation.variance,
            "Register closed with variance"
        );
    }

    db.persist(terminal, Touched::Both).await;

    Ok(CloseRegisterResponse {
        expected_cash_display: config.format_currency(reconciliation.expected_cash),
        counted_cash_display: config.format_currency(reconciliation.counted_cash),
        variance_display: config.format_currency(reconciliation.variance),
        session,
        reconciliation,
    })
}

/// Current session state and running totals.
pub fn get_session_status(terminal: &TerminalState) -> SessionStatusResponse {
    debug!("get_session_status command");

    terminal.with_terminal(|t| SessionStatusResponse {
        is_open: t.current_session().is_some(),
        session: t.current_session().map(SessionResponse::from),
        summary: t.session_summary().ok(),
    })
}

/// Closed sessions, newest first.
pub fn get_session_history(terminal: &TerminalState) -> Vec<SessionResponse> {
    debug!("get_session_history command");

    terminal.with_terminal(|t| {
        t.session_history()
            .iter()
            .rev()
            .map(SessionResponse::from)
            .collect()
    })
}
