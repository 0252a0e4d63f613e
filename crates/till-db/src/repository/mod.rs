//! # Repository Module
//!
//! SQL lives here and nowhere else.
//!
//! ## Available Repositories
//!
//! - [`snapshot::SnapshotRepository`] - Snapshot document rows

pub mod snapshot;
