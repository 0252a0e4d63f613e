//! # Persistence State
//!
//! Wraps the `PersistenceGateway` for use in commands.
//!
//! ## When Documents Are Saved
//! ```text
//! ┌──────────────────────────────┬──────────────┬──────────────┐
//! │ Command                      │ business     │ preferences  │
//! ├──────────────────────────────┼──────────────┼──────────────┤
//! │ open_register                │              │      ✓       │
//! │ cart / held-cart commands    │              │      ✓       │
//! │ checkout, close_register     │      ✓       │      ✓       │
//! │ restock, upsert_product      │      ✓       │              │
//! │ dark mode, catalog scope     │              │      ✓       │
//! └──────────────────────────────┴──────────────┴──────────────┘
//! ```
//!
//! ## Failed Saves
//! A save runs after the in-memory mutation has committed. If it fails the
//! error is logged and the command still succeeds: reporting failure for a
//! sale that did happen would invite a second checkout. The next save
//! writes the full document again.
//!
//! ## Save Ordering
//! Saves are serialised: each one snapshots and writes while holding
//! `save_lock`, so the document on disk is always the newest state any
//! finished save saw. Without it a slow write of an older snapshot could
//! land after a newer one.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::error;

use crate::state::TerminalState;
use till_db::PersistenceGateway;

/// Which documents a command touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Touched {
    Business,
    Preferences,
    Both,
}

/// Wrapper around the gateway for state management.
#[derive(Clone)]
pub struct DbState {
    gateway: PersistenceGateway,
    save_lock: Arc<Mutex<()>>,
}

impl DbState {
    pub fn new(gateway: PersistenceGateway) -> Self {
        DbState {
            gateway,
            save_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// Saves the touched documents from the current terminal state.
    ///
    /// The save lock is taken before the terminal lock and held until both
    /// writes finish.
    pub async fn persist(&self, terminal: &TerminalState, touched: Touched) {
        let _guard = self.save_lock.lock().await;

        let (business, preferences) = terminal.with_terminal(|t| {
            let business = matches!(touched, Touched::Business | Touched::Both)
                .then(|| t.business_snapshot());
            let preferences = matches!(touched, Touched::Preferences | Touched::Both)
                .then(|| t.preferences_snapshot());
            (business, preferences)
        });

        if let Some(business) = business {
            if let Err(e) = self.gateway.save_business(&business).await {
                error!(error = %e, "Failed to save business snapshot");
            }
        }
        if let Some(preferences) = preferences {
            if let Err(e) = self.gateway.save_preferences(&preferences).await {
                error!(error = %e, "Failed to save preferences snapshot");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use till_core::{BusinessSnapshot, Money, Product, SnapshotKind, TaxRate, Terminal};
    use till_db::{DbResult, MemorySnapshotStore, SnapshotStore};
    use tokio::sync::{oneshot, Mutex as AsyncMutex};

    /// Holds the first business save until released.
    struct GatedStore {
        inner: MemorySnapshotStore,
        entered: AsyncMutex<Option<oneshot::Sender<()>>>,
        release: AsyncMutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl SnapshotStore for GatedStore {
        async fn save(&self, kind: SnapshotKind, payload: String) -> DbResult<()> {
            if let Some(entered) = self.entered.lock().await.take() {
                let _ = entered.send(());
                if let Some(release) = self.release.lock().await.take() {
                    let _ = release.await;
                }
            }
            self.inner.save(kind, payload).await
        }

        async fn load(&self, kind: SnapshotKind) -> DbResult<Option<String>> {
            self.inner.load(kind).await
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_slow_save_does_not_overwrite_newer_state() {
        let (entered_tx, entered_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let store = Arc::new(GatedStore {
            inner: MemorySnapshotStore::new(),
            entered: AsyncMutex::new(Some(entered_tx)),
            release: AsyncMutex::new(Some(release_rx)),
        });

        let terminal = TerminalState::new(Terminal::new(
            TaxRate::from_percent(18),
            vec![Product::new("bread", "Bread", Money::from_units(2_500), 10)],
        ));
        let db = DbState::new(PersistenceGateway::new(store.clone()));

        terminal.with_terminal_mut(|t| t.restock("bread", 5)).unwrap();
        let first = tokio::spawn({
            let (terminal, db) = (terminal.clone(), db.clone());
            async move { db.persist(&terminal, Touched::Business).await }
        });
        entered_rx.await.unwrap();

        terminal.with_terminal_mut(|t| t.restock("bread", 5)).unwrap();
        let second = tokio::spawn({
            let (terminal, db) = (terminal.clone(), db.clone());
            async move { db.persist(&terminal, Touched::Business).await }
        });
        tokio::task::yield_now().await;

        release_tx.send(()).unwrap();
        first.await.unwrap();
        second.await.unwrap();

        let payload = store.load(SnapshotKind::Business).await.unwrap().unwrap();
        let saved: BusinessSnapshot = serde_json::from_str(&payload).unwrap();
        assert_eq!(saved.products[0].stock, 20);
    }
}
