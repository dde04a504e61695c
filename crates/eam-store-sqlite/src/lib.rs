//! SQLite backend for asset capture.
//!
//! One [`SqliteStore`] serves both sides: key-value slots holding the offline
//! queue and the saved draft on a capture client, and the asset and image
//! tables of the ingestion service. Wraps [`tokio_rusqlite`] so all database
//! access runs on a dedicated thread without blocking the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
