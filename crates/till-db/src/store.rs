//! # Snapshot Stores
//!
//! The storage seam under the gateway: save and load one opaque JSON
//! document per [`SnapshotKind`].
//!
//! ```text
//! PersistenceGateway
//!        │  Arc<dyn SnapshotStore>
//!        ├──► SqliteSnapshotStore   (production, file-backed)
//!        └──► MemorySnapshotStore   (tests, ephemeral)
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::DbResult;
use crate::pool::Database;
use till_core::SnapshotKind;

/// Key-value storage for snapshot documents.
///
/// `save` replaces the whole document; `load` returns `None` when nothing
/// was ever saved for that kind.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, kind: SnapshotKind, payload: String) -> DbResult<()>;

    async fn load(&self, kind: SnapshotKind) -> DbResult<Option<String>>;
}

// =============================================================================
// In-Memory Store
// =============================================================================

/// Process-local store for tests.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    documents: RwLock<HashMap<SnapshotKind, String>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        MemorySnapshotStore::default()
    }

    /// Pre-loads a raw payload, e.g. a deliberately malformed one.
    pub fn with_payload(kind: SnapshotKind, payload: impl Into<String>) -> Self {
        let mut documents = HashMap::new();
        documents.insert(kind, payload.into());
        MemorySnapshotStore {
            documents: RwLock::new(documents),
        }
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn save(&self, kind: SnapshotKind, payload: String) -> DbResult<()> {
        self.documents.write().await.insert(kind, payload);
        Ok(())
    }

    async fn load(&self, kind: SnapshotKind) -> DbResult<Option<String>> {
        Ok(self.documents.read().await.get(&kind).cloned())
    }
}

// =============================================================================
// SQLite Store
// =============================================================================

/// Store backed by the `snapshots` table.
#[derive(Debug, Clone)]
pub struct SqliteSnapshotStore {
    db: Database,
}

impl SqliteSnapshotStore {
    pub fn new(db: Database) -> Self {
        SqliteSnapshotStore { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl SnapshotStore for SqliteSnapshotStore {
    async fn save(&self, kind: SnapshotKind, payload: String) -> DbResult<()> {
        self.db.snapshots().upsert(kind, &payload).await
    }

    async fn load(&self, kind: SnapshotKind) -> DbResult<Option<String>> {
        let stored = self.db.snapshots().get(kind).await?;
        Ok(stored.map(|s| s.payload))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
