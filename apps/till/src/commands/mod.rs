//! # Commands Module
//!
//! Every operation the till front end can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs          ◄─── You are here (exports)
//! ├── product.rs      ◄─── Catalog lookup, restock, catalog edits
//! ├── cart.rs         ◄─── Cart manipulation, held carts
//! ├── sale.rs         ◄─── Checkout and receipts
//! ├── register.rs     ◄─── Open/close drawer, session status
//! ├── preferences.rs  ◄─── Dark mode, catalog scope
//! └── config.rs       ◄─── Configuration retrieval
//! ```
//!
//! ## How Commands Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  front end ──► command(state..., args) ──► Result<Dto, ApiError>        │
//! │                   │                                                     │
//! │                   ├─ lock TerminalState, run the core operation         │
//! │                   ├─ build the response DTO, release the lock           │
//! │                   └─ DbState::persist(touched documents)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs the terminal
//! fn get_cart(terminal: &TerminalState)
//!
//! // Mutates, then saves
//! async fn add_to_cart(terminal: &TerminalState, db: &DbState, ...)
//!
//! // Formats money for display
//! async fn checkout(terminal: &TerminalState, db: &DbState, config: &ConfigState, ...)
//! ```

pub mod cart;
pub mod config;
pub mod preferences;
pub mod product;
pub mod register;
pub mod sale;
