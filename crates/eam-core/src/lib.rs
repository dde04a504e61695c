//! Core types and trait definitions for asset data capture.
//!
//! This crate is free of HTTP, database and platform dependencies. The form
//! orchestrator, the capture widgets, the storage backends and the ingestion
//! API all build on it.

// Native `async fn` in traits; see `store` and `sink`.
#![allow(async_fn_in_trait)]

pub mod capture;
pub mod error;
pub mod memory;
pub mod message;
pub mod payload;
pub mod record;
pub mod reference;
pub mod sink;
pub mod store;
pub mod user;
pub mod validate;

pub use error::{Error, Result};
