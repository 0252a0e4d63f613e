//! # Register Session Manager
//!
//! Owns the cash-drawer lifecycle and its running balance.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            open(float >= 0)                                             │
//! │   ┌────────┐ ─────────────────────► ┌────────┐                          │
//! │   │ Closed │                        │  Open  │ ◄──┐ record_sale()       │
//! │   └────────┘ ◄───────────────────── └────────┘ ───┘ balance += total    │
//! │            close(counted >= 0)                                          │
//! │            → Reconciliation                                             │
//! │                                                                         │
//! │  open() while Open      → SessionAlreadyOpen                            │
//! │  close() while Closed   → RegisterClosed                                │
//! │  restored Open session older than the expiry policy → not reopened     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Figures
//! `balance` is the notional takings figure: opening float plus the full
//! total of every sale, whatever the tender. The physical drawer check at
//! close uses cash only: opening float plus the cash tendered across the
//! session's sales. Change handed back is reported next to it, not netted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::ledger::{SaleLedger, SalesSummary};
use crate::money::Money;
use crate::types::Sale;
use crate::validation::{validate_counted_cash, validate_opening_float, validate_operator};

// =============================================================================
// Session Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Open,
    Closed,
}

/// Closing-time comparison of expected and counted drawer cash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub opening_float: Money,
    /// Cash tendered across the session's sales.
    pub cash_sales: Money,
    pub card_sales: Money,
    pub mobile_money_sales: Money,
    pub total_sales: Money,
    pub sale_count: u64,
    /// Change handed back across the session's sales. Not part of `expected_cash`.
    #[serde(default)]
    pub change_given: Money,
    /// `opening_float + cash_sales`
    pub expected_cash: Money,
    pub counted_cash: Money,
    /// `counted_cash - expected_cash`; negative means the drawer is short.
    pub variance: Money,
}

/// One accounting period of the cash drawer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSession {
    pub id: String,
    pub state: SessionState,
    pub opening_float: Money,
    /// Opening float plus every sale total.
    pub balance: Money,
    pub opened_at: DateTime<Utc>,
    pub opened_by: String,
    /// Sequence numbers of the sales made while open.
    #[serde(default)]
    pub sale_numbers: Vec<u64>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reconciliation: Option<Reconciliation>,
}

impl RegisterSession {
    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Time elapsed since the drawer was opened.
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.opened_at
    }
}

// =============================================================================
// Expiry Policy
// =============================================================================

/// Decides whether a recovered open session may be resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionExpiryPolicy {
    pub max_session_age_before_forced_reopen: Duration,
}

impl SessionExpiryPolicy {
    pub fn new(max_session_age_before_forced_reopen: Duration) -> Self {
        SessionExpiryPolicy {
            max_session_age_before_forced_reopen,
        }
    }

    /// True when the session is older than the allowed age.
    pub fn is_stale(&self, session: &RegisterSession, now: DateTime<Utc>) -> bool {
        session.age(now) > self.max_session_age_before_forced_reopen
    }
}

impl Default for SessionExpiryPolicy {
    /// 24 hours.
    fn default() -> Self {
        SessionExpiryPolicy::new(Duration::hours(24))
    }
}

// =============================================================================
// Register Manager
// =============================================================================

/// Holds the (at most one) open session and the closed-session history.
#[derive(Debug, Clone, Default)]
pub struct RegisterManager {
    current: Option<RegisterSession>,
    history: Vec<RegisterSession>,
}

/// What [`RegisterManager::restore`] did with the persisted sessions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionRecovery {
    /// Id of the open session that was resumed.
    pub resumed: Option<String>,
    /// Id of the open session that was too old to resume.
    pub expired: Option<String>,
}

impl RegisterManager {
    pub fn new() -> Self {
        RegisterManager::default()
    }

    /// Rebuilds the manager from persisted state.
    ///
    /// A recovered open session older than the policy allows is moved to
    /// history as closed without a reconciliation, forcing a fresh `open`.
    /// History entries are always treated as closed.
    pub fn restore(
        active: Option<RegisterSession>,
        history: Vec<RegisterSession>,
        policy: &SessionExpiryPolicy,
        now: DateTime<Utc>,
    ) -> (Self, SessionRecovery) {
        let mut history: Vec<RegisterSession> = history
            .into_iter()
            .map(|mut s| {
                s.state = SessionState::Closed;
                s
            })
            .collect();
        let mut recovery = SessionRecovery::default();

        let current = match active {
            Some(session) if session.is_open() && !policy.is_stale(&session, now) => {
                history.retain(|h| h.id != session.id);
                recovery.resumed = Some(session.id.clone());
                Some(session)
            }
            Some(mut session) => {
                if session.is_open() {
                    recovery.expired = Some(session.id.clone());
                    session.state = SessionState::Closed;
                }
                if !history.iter().any(|h| h.id == session.id) {
                    history.push(session);
                }
                None
            }
            None => None,
        };

        (RegisterManager { current, history }, recovery)
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// The open session, if any.
    pub fn current(&self) -> Option<&RegisterSession> {
        self.current.as_ref()
    }

    /// The open session, or `RegisterClosed`.
    pub fn require_open(&self) -> CoreResult<&RegisterSession> {
        self.current.as_ref().ok_or(CoreError::RegisterClosed)
    }

    /// Closed sessions, oldest first.
    pub fn history(&self) -> &[RegisterSession] {
        &self.history
    }

    /// Looks a session up by id in the open slot and history.
    pub fn session(&self, session_id: &str) -> Option<&RegisterSession> {
        self.current
            .iter()
            .chain(self.history.iter())
            .find(|s| s.id == session_id)
    }

    /// Opens the drawer with `opening_float`.
    ///
    /// ## Errors
    /// - `SessionAlreadyOpen` - a session is open
    /// - `InvalidOpeningFloat` - negative float
    pub fn open(&mut self, operator_id: &str, opening_float: Money) -> CoreResult<&RegisterSession> {
        if let Some(open) = &self.current {
            return Err(CoreError::SessionAlreadyOpen {
                session_id: open.id.clone(),
            });
        }
        validate_operator(operator_id)?;
        validate_opening_float(opening_float)?;

        let session = self.current.insert(RegisterSession {
            id: Uuid::new_v4().to_string(),
            state: SessionState::Open,
            opening_float,
            balance: opening_float,
            opened_at: Utc::now(),
            opened_by: operator_id.to_string(),
            sale_numbers: Vec::new(),
            closed_at: None,
            reconciliation: None,
        });
        Ok(session)
    }

    /// Credits a finalized sale to the open session.
    pub(crate) fn record_sale(&mut self, sale: &Sale) -> CoreResult<()> {
        let session = self.current.as_mut().ok_or(CoreError::RegisterClosed)?;
        session.balance += sale.total;
        session.sale_numbers.push(sale.sequence_number);
        Ok(())
    }

    /// Closes the drawer against a cash count.
    ///
    /// ## Errors
    /// - `RegisterClosed` - nothing open
    /// - `InvalidCountedCash` - count missing or negative
    ///
    /// ## Returns
    /// The closed session (now in history) with its reconciliation.
    pub fn close(
        &mut self,
        counted_cash: Option<Money>,
        sales: &SaleLedger,
    ) -> CoreResult<&RegisterSession> {
        let open = self.current.as_ref().ok_or(CoreError::RegisterClosed)?;
        let counted_cash = validate_counted_cash(counted_cash)?;

        let reconciliation = reconcile(open, sales, counted_cash);

        let mut session = self.current.take().ok_or(CoreError::RegisterClosed)?;
        session.state = SessionState::Closed;
        session.closed_at = Some(Utc::now());
        session.reconciliation = Some(reconciliation);
        self.history.push(session);

        Ok(&self.history[self.history.len() - 1])
    }
}

/// Running tender totals of a session's sales.
pub fn session_summary(session: &RegisterSession, sales: &SaleLedger) -> SalesSummary {
    SalesSummary::from_sales(sales.for_session(&session.id))
}

fn reconcile(session: &RegisterSession, sales: &SaleLedger, counted_cash: Money) -> Reconciliation {
    let summary = session_summary(session, sales);
    let expected_cash = session.opening_float + summary.cash;

    Reconciliation {
        opening_float: session.opening_float,
        cash_sales: summary.cash,
        card_sales: summary.card,
        mobile_money_sales: summary.mobile_money,
        total_sales: summary.total_sales,
        sale_count: summary.sale_count,
        change_given: summary.change_given,
        expected_cash,
        counted_cash,
        variance: counted_cash - expected_cash,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn open_session(age: Duration) -> RegisterSession {
        RegisterSession {
            id: "s-1".to_string(),
            state: SessionState::Open,
            opening_float: Money::from_units(100),
            balance: Money::from_units(100),
            opened_at: Utc::now() - age,
            opened_by: "amina".to_string(),
            sale_numbers: Vec::new(),
            closed_at: None,
            reconciliation: None,
        }
    }

    #[test]
    fn test_open_then_double_open_fails() {
        let mut register = RegisterManager::new();
        let id = register.open("amina", Money::from_units(50_000)).unwrap().id.clone();

        let err = register.open("amina", Money::zero()).unwrap_err();
        assert_eq!(err, CoreError::SessionAlreadyOpen { session_id: id });
    }

    #[test]
    fn test_open_rejects_negative_float() {
        let mut register = RegisterManager::new();
        assert!(matches!(
            register.open("amina", Money::from_units(-1)),
            Err(CoreError::InvalidOpeningFloat(_))
        ));
        assert!(!register.is_open());
    }

    #[test]
    fn test_close_without_sales() {
        let mut register = RegisterManager::new();
        register.open("amina", Money::from_units(20_000)).unwrap();

        let closed = register.close(Some(Money::from_units(19_500)), &SaleLedger::new()).unwrap();
        let rec = closed.reconciliation.as_ref().unwrap();
        assert_eq!(closed.state, SessionState::Closed);
        assert_eq!(rec.expected_cash.units(), 20_000);
        assert_eq!(rec.variance.units(), -500);
        assert!(!register.is_open());
        assert_eq!(register.history().len(), 1);
    }

    #[test]
    fn test_close_requires_count_and_open_session() {
        let mut register = RegisterManager::new();
        assert_eq!(
            register.close(Some(Money::zero()), &SaleLedger::new()).unwrap_err(),
            CoreError::RegisterClosed
        );

        register.open("amina", Money::zero()).unwrap();
        assert!(matches!(
            register.close(None, &SaleLedger::new()),
            Err(CoreError::InvalidCountedCash { .. })
        ));
        assert!(register.is_open());
    }

    #[test]
    fn test_restore_resumes_fresh_session() {
        let (register, recovery) = RegisterManager::restore(
            Some(open_session(Duration::hours(3))),
            Vec::new(),
            &SessionExpiryPolicy::default(),
            Utc::now(),
        );
        assert!(register.is_open());
        assert_eq!(recovery.resumed.as_deref(), Some("s-1"));
    }

    #[test]
    fn test_restore_expires_stale_session() {
        let (register, recovery) = RegisterManager::restore(
            Some(open_session(Duration::hours(25))),
            Vec::new(),
            &SessionExpiryPolicy::default(),
            Utc::now(),
        );
        assert!(!register.is_open());
        assert_eq!(recovery.expired.as_deref(), Some("s-1"));
        assert_eq!(register.history()[0].state, SessionState::Closed);
        assert!(register.history()[0].reconciliation.is_none());
    }

    #[test]
    fn test_policy_is_configurable() {
        let policy = SessionExpiryPolicy::new(Duration::hours(8));
        let now = Utc::now();
        assert!(policy.is_stale(&open_session(Duration::hours(9)), now));
        assert!(!policy.is_stale(&open_session(Duration::hours(7)), now));
    }
}
