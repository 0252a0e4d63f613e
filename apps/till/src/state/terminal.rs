//! # Terminal State
//!
//! Shares the single `Terminal` between commands.
//!
//! ## Thread Safety
//! The terminal is wrapped in `Arc<Mutex<T>>` because:
//! 1. Every command reads or mutates it
//! 2. Core operations are not reentrant; one runs at a time
//! 3. Commands can run concurrently
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  command ──► with_terminal_mut(|t| t.checkout(..))   lock held          │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │              snapshots taken        lock held                          │
//! │                       │                                                 │
//! │                       ▼                                                 │
//! │              gateway.save(..).await  lock released                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard};

use till_core::Terminal;

/// Shared terminal state.
#[derive(Debug, Clone)]
pub struct TerminalState {
    terminal: Arc<Mutex<Terminal>>,
}

impl TerminalState {
    pub fn new(terminal: Terminal) -> Self {
        TerminalState {
            terminal: Arc::new(Mutex::new(terminal)),
        }
    }

    /// Executes a function with read access to the terminal.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = terminal_state.with_terminal(|t| t.quote());
    /// ```
    pub fn with_terminal<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Terminal) -> R,
    {
        let terminal = self.lock();
        f(&terminal)
    }

    /// Executes a function with write access to the terminal.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// terminal_state.with_terminal_mut(|t| t.add_item(&product_id).map(|_| ()))?;
    /// ```
    pub fn with_terminal_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Terminal) -> R,
    {
        let mut terminal = self.lock();
        f(&mut terminal)
    }

    /// Core operations leave the terminal consistent even when they fail, so
    /// a panic in another command does not invalidate it.
    fn lock(&self) -> MutexGuard<'_, Terminal> {
        self.terminal
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
