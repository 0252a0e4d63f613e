//! # Till Entry Point
//!
//! Boots the till from the configured snapshot store and reports its state.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Read configuration from the environment
//! 3. Open the snapshot store and restore the terminal
//! 4. Report register status and low-stock products
//!
//! ## Environment
//! - `TILL_DB_PATH` - SQLite file, or `:memory:` for a throwaway session
//! - `TILL_STORE_NAME`, `TILL_CURRENCY_SYMBOL`, `TILL_TAX_RATE`
//! - `TILL_MAX_SESSION_AGE_HOURS`
//! - `RUST_LOG` - log filter

use tracing::{info, warn};

use till_app::commands::{product, register};
use till_app::state::ConfigState;
use till_app::{init_tracing, App};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = ConfigState::from_env();
    info!(
        store = %config.store_name,
        tax_rate_bps = config.tax_rate_bps,
        db_path = ?config.database_path,
        "Starting till"
    );

    let (app, report) = App::open(config).await?;
    if !report.warnings.is_empty() {
        warn!(count = report.warnings.len(), "Started with unreadable snapshots replaced by defaults");
    }

    let status = register::get_session_status(&app.terminal);
    match (&status.session, &status.summary) {
        (Some(session), Some(summary)) => info!(
            session_id = %session.id,
            operator_id = %session.opened_by,
            balance = %app.config.format_currency(session.balance),
            sales = summary.sale_count,
            "Register open"
        ),
        _ => info!("Register closed"),
    }

    for p in product::get_low_stock(&app.terminal) {
        warn!(id = %p.id, name = %p.name, on_hand = p.stock, min_stock = p.min_stock, "Low stock");
    }

    Ok(())
}
