//! # till-db: Persistence Gateway for Till
//!
//! Saves and restores the till's two snapshot documents. SQLite in
//! production, an in-memory map in tests.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Data Flow                                 │
//! │                                                                         │
//! │  App command (checkout, close_register, ...)                           │
//! │       │  after the Terminal mutation commits                            │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     till-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   PersistenceGateway ──► dyn SnapshotStore                      │   │
//! │  │   (JSON encode/decode)     ├── SqliteSnapshotStore ──► Database │   │
//! │  │                            └── MemorySnapshotStore              │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │   SQLite: snapshots(kind, payload, saved_at)                    │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - SQL access
//! - [`store`] - The `SnapshotStore` seam and its implementations
//! - [`gateway`] - Typed save/restore
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use till_db::{Database, DbConfig, PersistenceGateway, SqliteSnapshotStore};
//!
//! let db = Database::new(DbConfig::new("till.db")).await?;
//! let gateway = PersistenceGateway::new(Arc::new(SqliteSnapshotStore::new(db)));
//!
//! let restored = gateway.restore().await?;
//! gateway.save_business(&restored.business).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod gateway;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use gateway::{PersistenceGateway, Restored};
pub use pool::{Database, DbConfig};
pub use repository::snapshot::{SnapshotRepository, StoredSnapshot};
pub use store::{MemorySnapshotStore, SnapshotStore, SqliteSnapshotStore};
