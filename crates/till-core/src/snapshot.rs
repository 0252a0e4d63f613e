//! # Snapshot Types
//!
//! The two persisted documents the storage layer saves and loads.
//!
//! ```text
//! Business    { products, sales, categories, registerSessions }
//! Preferences { darkMode, activeCatalogScopeId, activeRegisterSession,
//!               activeCart, heldCarts }
//! ```
//!
//! Both deserialize with defaults for missing fields, so an older or partial
//! document still loads.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::cart::{CartLine, HeldCart};
use crate::register::RegisterSession;
use crate::types::{Category, Product, Sale};

/// Which document a payload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotKind {
    /// Durable business records.
    Business,
    /// Volatile session state and UI preferences.
    Preferences,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 2] = [SnapshotKind::Business, SnapshotKind::Preferences];

    /// Stable storage key.
    pub const fn key(&self) -> &'static str {
        match self {
            SnapshotKind::Business => "business",
            SnapshotKind::Preferences => "preferences",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Durable business records.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessSnapshot {
    pub products: Vec<Product>,
    pub sales: Vec<Sale>,
    pub categories: Vec<Category>,
    /// Closed sessions.
    pub register_sessions: Vec<RegisterSession>,
}

/// Session state and UI preferences.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesSnapshot {
    pub dark_mode: bool,
    pub active_catalog_scope_id: Option<String>,
    pub active_register_session: Option<RegisterSession>,
    pub active_cart: Vec<CartLine>,
    pub held_carts: Vec<HeldCart>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_documents_load_with_defaults() {
        let prefs: PreferencesSnapshot = serde_json::from_str(r#"{"darkMode":true}"#).unwrap();
        assert!(prefs.dark_mode);
        assert!(prefs.active_register_session.is_none());
        assert!(prefs.held_carts.is_empty());

        let business: BusinessSnapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(business, BusinessSnapshot::default());
    }

    #[test]
    fn test_business_keys_are_camel_case() {
        let json = serde_json::to_value(BusinessSnapshot::default()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert!(keys.contains(&"registerSessions"));
        assert!(keys.contains(&"products"));
    }
}
