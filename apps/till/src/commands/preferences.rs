//! # Preference Commands
//!
//! UI preferences that survive a restart: dark mode and the catalog scope
//! (category filter) of the product grid.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::{DbState, TerminalState, Touched};
use till_core::Category;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    pub dark_mode: bool,
    pub active_catalog_scope_id: Option<String>,
}

pub fn get_preferences(terminal: &TerminalState) -> PreferencesResponse {
    debug!("get_preferences command");
    terminal.with_terminal(|t| PreferencesResponse {
        dark_mode: t.preferences().dark_mode,
        active_catalog_scope_id: t.preferences().active_catalog_scope_id.clone(),
    })
}

pub async fn set_dark_mode(
    terminal: &TerminalState,
    db: &DbState,
    enabled: bool,
) -> PreferencesResponse {
    debug!(enabled, "set_dark_mode command");
    terminal.with_terminal_mut(|t| t.set_dark_mode(enabled));
    db.persist(terminal, Touched::Preferences).await;
    get_preferences(terminal)
}

/// Restricts the product grid to one category; `None` shows everything.
///
/// ## Errors
/// `NOT_FOUND` - category id not in the catalog
pub async fn set_catalog_scope(
    terminal: &TerminalState,
    db: &DbState,
    category_id: Option<String>,
) -> Result<PreferencesResponse, ApiError> {
    debug!(?category_id, "set_catalog_scope command");

    terminal.with_terminal_mut(|t| {
        if let Some(id) = &category_id {
            if !t.categories().iter().any(|c| &c.id == id) {
                return Err(ApiError::not_found("Category", id));
            }
        }
        t.set_catalog_scope(category_id.clone());
        Ok(())
    })?;

    info!(?category_id, "Catalog scope changed");
    db.persist(terminal, Touched::Preferences).await;
    Ok(get_preferences(terminal))
}

pub fn list_categories(terminal: &TerminalState) -> Vec<Category> {
    debug!("list_categories command");
    terminal.with_terminal(|t| t.categories().to_vec())
}
