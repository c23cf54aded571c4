//! SQLite backends for the Roster contact layer.
//!
//! [`SqliteProvider`] gives a SQLite file the semantics of the shared contact
//! provider: raw records grouped into aggregates, typed data rows, and atomic
//! batches with back-references. [`SqliteLocalStore`] is the app-private
//! store for contacts outside any account.
//!
//! Both wrap [`tokio_rusqlite`] so database access runs on a dedicated thread
//! without blocking the async runtime.

mod columns;
mod encode;
mod local;
mod provider;
mod schema;

pub mod error;

pub use error::{Error, Result};
pub use local::SqliteLocalStore;
pub use provider::SqliteProvider;

#[cfg(test)]
mod tests;
