//! Ingestion server for captured assets.
//!
//! Serves the [`eam_api`] router under `/api`, wrapped in request tracing and
//! a permissive CORS policy so browser and terminal clients on other origins
//! can post to it.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use eam_core::store::AssetRepository;
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and `EAM_*`
/// environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 5000 }

fn default_store_path() -> PathBuf { PathBuf::from("assets.db") }

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router for `repo`.
pub fn router<R>(repo: Arc<R>) -> Router
where
  R: AssetRepository + 'static,
{
  Router::new()
    .nest("/api", eam_api::api_router(repo))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
  };
  use eam_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.expect("in-memory store");
    router(Arc::new(store))
  }

  #[tokio::test]
  async fn assets_are_mounted_under_api() {
    let app = app().await;
    let body = serde_json::json!({ "assetIdentification": { "assetId": "AST-1" } });
    let req = Request::post("/api/assets")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();

    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
      .oneshot(Request::get("/api/assets/AST-1").body(Body::empty()).unwrap())
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["payload"]["assetIdentification"]["assetId"], "AST-1");
  }

  #[tokio::test]
  async fn cross_origin_requests_are_allowed() {
    let app = app().await;
    let req = Request::get("/api/assets")
      .header(header::ORIGIN, "http://capture.example")
      .body(Body::empty())
      .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
  }

  #[test]
  fn config_defaults() {
    let cfg: ServerConfig = config::Config::builder()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.address(), "127.0.0.1:5000");
    assert_eq!(cfg.store_path, PathBuf::from("assets.db"));
  }
}
