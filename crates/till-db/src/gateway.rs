//! # Persistence Gateway
//!
//! Typed encode/decode on top of a [`SnapshotStore`].
//!
//! ## Restore Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load(kind)                                                             │
//! │    ├── Ok(None)          → default document                             │
//! │    ├── Ok(Some(valid))   → decoded document                             │
//! │    ├── Ok(Some(garbage)) → default document + Corrupt warning           │
//! │    └── Err(io)           → propagated (storage itself is unusable)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A corrupt document is never fatal: the till starts with defaults and the
//! next save overwrites the bad payload.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::store::SnapshotStore;
use till_core::{BusinessSnapshot, PreferencesSnapshot, SnapshotKind};

/// Result of a startup restore.
#[derive(Debug, Default)]
pub struct Restored {
    pub business: BusinessSnapshot,
    pub preferences: PreferencesSnapshot,
    /// Documents that were present but unreadable.
    pub warnings: Vec<DbError>,
}

/// Saves and restores the two snapshot documents.
#[derive(Clone)]
pub struct PersistenceGateway {
    store: Arc<dyn SnapshotStore>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        PersistenceGateway { store }
    }

    pub fn store(&self) -> &Arc<dyn SnapshotStore> {
        &self.store
    }

    /// Loads both documents, substituting defaults for absent or corrupt ones.
    pub async fn restore(&self) -> DbResult<Restored> {
        let mut warnings = Vec::new();

        let business = self
            .load_or_default::<BusinessSnapshot>(SnapshotKind::Business, &mut warnings)
            .await?;
        let preferences = self
            .load_or_default::<PreferencesSnapshot>(SnapshotKind::Preferences, &mut warnings)
            .await?;

        info!(
            products = business.products.len(),
            sales = business.sales.len(),
            warnings = warnings.len(),
            "Snapshots restored"
        );

        Ok(Restored {
            business,
            preferences,
            warnings,
        })
    }

    pub async fn save_business(&self, snapshot: &BusinessSnapshot) -> DbResult<()> {
        self.save(SnapshotKind::Business, snapshot).await
    }

    pub async fn save_preferences(&self, snapshot: &PreferencesSnapshot) -> DbResult<()> {
        self.save(SnapshotKind::Preferences, snapshot).await
    }

    async fn save<T: Serialize>(&self, kind: SnapshotKind, snapshot: &T) -> DbResult<()> {
        let payload =
            serde_json::to_string(snapshot).map_err(|e| DbError::Serialization(e.to_string()))?;
        self.store.save(kind, payload).await?;
        debug!(kind = %kind, "Snapshot saved");
        Ok(())
    }

    async fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        kind: SnapshotKind,
        warnings: &mut Vec<DbError>,
    ) -> DbResult<T> {
        let Some(payload) = self.store.load(kind).await? else {
            debug!(kind = %kind, "No stored snapshot, using defaults");
            return Ok(T::default());
        };

        match serde_json::from_str(&payload) {
            Ok(document) => Ok(document),
            Err(e) => {
                warn!(kind = %kind, error = %e, "Stored snapshot is corrupt, using defaults");
                warnings.push(DbError::corrupt(kind, e.to_string()));
                Ok(T::default())
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemorySnapshotStore;
    use till_core::{Money, Product};

    #[tokio::test]
    async fn test_restore_empty_store_gives_defaults() {
        let gateway = PersistenceGateway::new(Arc::new(MemorySnapshotStore::new()));

        let restored = gateway.restore().await.unwrap();
        assert_eq!(restored.business, BusinessSnapshot::default());
        assert_eq!(restored.preferences, PreferencesSnapshot::default());
        assert!(restored.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let gateway = PersistenceGateway::new(Arc::new(MemorySnapshotStore::new()));

        let business = BusinessSnapshot {
            products: vec![Product::new("p1", "Soap", Money::from_units(500), 12)],
            ..Default::default()
        };
        let preferences = PreferencesSnapshot {
            dark_mode: true,
            active_catalog_scope_id: Some("household".to_string()),
            ..Default::default()
        };

        gateway.save_business(&business).await.unwrap();
        gateway.save_preferences(&preferences).await.unwrap();

        let restored = gateway.restore().await.unwrap();
        assert_eq!(restored.business, business);
        assert_eq!(restored.preferences, preferences);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_a_warning() {
        let store = MemorySnapshotStore::with_payload(SnapshotKind::Business, "{\"products\": [");
        let gateway = PersistenceGateway::new(Arc::new(store));

        let restored = gateway.restore().await.unwrap();
        assert_eq!(restored.business, BusinessSnapshot::default());
        assert_eq!(restored.warnings.len(), 1);
        assert!(matches!(
            restored.warnings[0],
            DbError::Corrupt {
                kind: SnapshotKind::Business,
                ..
            }
        ));
    }
}
