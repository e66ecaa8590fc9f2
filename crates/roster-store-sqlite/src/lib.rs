//! SQLite backend for the Roster store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime.

mod encode;
mod error;
mod filter;
mod schema;
mod store;

pub use store::SqliteStore;
