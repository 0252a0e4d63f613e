//! # Till Application Library
//!
//! Application shell around `till-core`: configuration, logging, shared
//! state and the commands the front end invokes.
//!
//! ## Module Organization
//! ```text
//! till_app/
//! ├── lib.rs          ◄─── You are here (App boot, tracing setup)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── config.rs   ◄─── Configuration state
//! │   ├── db.rs       ◄─── Persistence gateway wrapper
//! │   └── terminal.rs ◄─── Shared Terminal behind a mutex
//! ├── commands/       ◄─── Cart, sale, register, product, preferences
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! ## State Management (Multiple State Types)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐    │
//! │  │    DbState       │ │  TerminalState   │ │    ConfigState       │    │
//! │  │                  │ │                  │ │                      │    │
//! │  │  • Gateway       │ │  • Stock, cart   │ │  • Store name        │    │
//! │  │  • Snapshot      │ │  • Register      │ │  • Tax rate          │    │
//! │  │    store         │ │  • Sale ledger   │ │  • Currency          │    │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘    │
//! │                                                                         │
//! │  Each command only requests the state it needs.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use error::ApiError;
use state::{ConfigState, DbState, TerminalState};
use till_core::{SessionRecovery, Terminal};
use till_db::{
    Database, DbConfig, MemorySnapshotStore, PersistenceGateway, SnapshotStore,
    SqliteSnapshotStore,
};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=till=trace` - Show trace for till crates only
/// - Default: `info,till=debug,sqlx=warn`
///
/// Calling it twice is harmless; the second call is ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,till=debug,sqlx=warn"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// What happened while restoring persisted state.
#[derive(Debug, Clone, Default)]
pub struct BootReport {
    /// One entry per snapshot that was unreadable and replaced by defaults.
    pub warnings: Vec<String>,
    pub recovery: SessionRecovery,
}

/// The running till: configuration plus shared state.
#[derive(Clone)]
pub struct App {
    pub config: ConfigState,
    pub terminal: TerminalState,
    pub db: DbState,
}

impl App {
    /// Opens the configured snapshot store and restores the terminal.
    ///
    /// ## Startup Sequence
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────────┐
    /// │  1. database_path set?                                                  │
    /// │     YES: SQLite file (parent dir created, WAL, migrations)              │
    /// │     NO:  in-memory store, nothing survives exit                         │
    /// │                                                                         │
    /// │  2. Load business + preferences snapshots                               │
    /// │     • absent  → defaults                                                │
    /// │     • corrupt → defaults + warning                                      │
    /// │                                                                         │
    /// │  3. Rebuild Terminal; stale open session is not resumed                 │
    /// └─────────────────────────────────────────────────────────────────────────┘
    /// ```
    pub async fn open(config: ConfigState) -> Result<(App, BootReport), ApiError> {
        let store: Arc<dyn SnapshotStore> = match &config.database_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        ApiError::internal(format!(
                            "Could not create data directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
                info!(db_path = %path.display(), "Opening snapshot database");
                let db = Database::new(DbConfig::new(path.clone())).await?;
                Arc::new(SqliteSnapshotStore::new(db))
            }
            None => {
                warn!("No database path configured, state will not survive a restart");
                Arc::new(MemorySnapshotStore::new())
            }
        };

        App::boot(config, store).await
    }

    /// Restores the terminal from `store`.
    ///
    /// ## Errors
    /// Only a failing store read; unreadable payloads become warnings.
    pub async fn boot(
        config: ConfigState,
        store: Arc<dyn SnapshotStore>,
    ) -> Result<(App, BootReport), ApiError> {
        let gateway = PersistenceGateway::new(store);
        let restored = gateway.restore().await?;

        let warnings: Vec<String> = restored.warnings.iter().map(|w| w.to_string()).collect();
        for warning in &warnings {
            warn!(warning = %warning, "Snapshot replaced by defaults");
        }

        let (terminal, recovery) = Terminal::restore(
            config.tax_rate(),
            restored.business,
            restored.preferences,
            &config.expiry_policy(),
            Utc::now(),
        );

        if let Some(session_id) = &recovery.expired {
            warn!(
                session_id = %session_id,
                max_age_hours = config.max_session_age_hours,
                "Open register session too old to resume, closed without reconciliation"
            );
        }
        if let Some(session_id) = &recovery.resumed {
            info!(session_id = %session_id, "Register session resumed");
        }

        info!(
            products = terminal.stock().len(),
            sales = terminal.sales().len(),
            held_carts = terminal.held_carts().len(),
            "Terminal restored"
        );

        let app = App {
            config,
            terminal: TerminalState::new(terminal),
            db: DbState::new(gateway),
        };
        Ok((app, BootReport { warnings, recovery }))
    }
}
