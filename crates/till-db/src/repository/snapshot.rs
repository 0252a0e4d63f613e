//! # Snapshot Repository
//!
//! Raw row access for the `snapshots` table.
//!
//! ```text
//! snapshots
//! ┌──────────────┬──────────────────────────┬──────────────────────────┐
//! │ kind (PK)    │ payload (JSON text)      │ saved_at                 │
//! ├──────────────┼──────────────────────────┼──────────────────────────┤
//! │ business     │ {"products":[...], ...}  │ 2026-10-18T09:12:44Z     │
//! │ preferences  │ {"darkMode":false, ...}  │ 2026-10-18T09:12:44Z     │
//! └──────────────┴──────────────────────────┴──────────────────────────┘
//! ```
//!
//! Payloads are opaque here; decoding lives in the gateway.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use till_core::SnapshotKind;

/// One stored document.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct StoredSnapshot {
    pub payload: String,
    pub saved_at: DateTime<Utc>,
}

/// Repository for snapshot rows.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: SqlitePool,
}

impl SnapshotRepository {
    /// Creates a new SnapshotRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SnapshotRepository { pool }
    }

    /// Replaces the stored payload for `kind` in a single statement.
    pub async fn upsert(&self, kind: SnapshotKind, payload: &str) -> DbResult<()> {
        debug!(kind = %kind, bytes = payload.len(), "Writing snapshot");

        sqlx::query(
            r#"
            INSERT INTO snapshots (kind, payload, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(kind) DO UPDATE SET
                payload = excluded.payload,
                saved_at = excluded.saved_at
            "#,
        )
        .bind(kind.key())
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Loads the stored payload for `kind`, if any.
    pub async fn get(&self, kind: SnapshotKind) -> DbResult<Option<StoredSnapshot>> {
        let row = sqlx::query_as::<_, StoredSnapshot>(
            "SELECT payload, saved_at FROM snapshots WHERE kind = ?1",
        )
        .bind(kind.key())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Removes the stored payload for `kind`. Returns true if a row existed.
    pub async fn delete(&self, kind: SnapshotKind) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM snapshots WHERE kind = ?1")
            .bind(kind.key())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use till_core::SnapshotKind;

    #[tokio::test]
    async fn test_upsert_replaces_payload() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.snapshots();

        assert!(repo.get(SnapshotKind::Business).await.unwrap().is_none());

        repo.upsert(SnapshotKind::Business, r#"{"products":[]}"#).await.unwrap();
        repo.upsert(SnapshotKind::Business, r#"{"sales":[]}"#).await.unwrap();

        let stored = repo.get(SnapshotKind::Business).await.unwrap().unwrap();
        assert_eq!(stored.payload, r#"{"sales":[]}"#);
        assert!(repo.get(SnapshotKind::Preferences).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.snapshots();

        repo.upsert(SnapshotKind::Preferences, "{}").await.unwrap();
        assert!(repo.delete(SnapshotKind::Preferences).await.unwrap());
        assert!(!repo.delete(SnapshotKind::Preferences).await.unwrap());
    }
}
