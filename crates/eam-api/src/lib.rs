//! JSON ingestion API for captured assets.
//!
//! Exposes an axum [`Router`] backed by any
//! [`eam_core::store::AssetRepository`]. TLS and authentication are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", eam_api::api_router(store.clone()))
//! ```

pub mod assets;
pub mod error;

use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, routing::get};
use eam_core::store::AssetRepository;

pub use error::ApiError;

/// Request body cap. Four images at the 5 MiB upload limit, base64-encoded,
/// plus the record itself.
pub const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Build a fully-materialised API router for `repo`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<R>(repo: Arc<R>) -> Router<()>
where
  R: AssetRepository + 'static,
{
  Router::new()
    .route("/assets", get(assets::list::<R>).post(assets::create::<R>))
    .route("/assets/{asset_id}", get(assets::get_one::<R>))
    .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
    .with_state(repo)
}
