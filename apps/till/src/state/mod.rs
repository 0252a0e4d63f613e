//! # State Module
//!
//! Application state, one type per concern.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────┐          │
//! │  │   DbState    │  │  TerminalState   │  │   ConfigState    │          │
//! │  │              │  │                  │  │                  │          │
//! │  │  Persistence │  │  Arc<Mutex<      │  │  store_name      │          │
//! │  │  Gateway     │  │    Terminal      │  │  tax_rate        │          │
//! │  │              │  │  >>              │  │  currency        │          │
//! │  └──────────────┘  └──────────────────┘  └──────────────────┘          │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: store implementations are Send + Sync                      │
//! │  • TerminalState: Arc<Mutex<T>> for exclusive access                   │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands take only the state they need.

mod config;
mod db;
mod terminal;

pub use config::ConfigState;
pub use db::{DbState, Touched};
pub use terminal::TerminalState;
