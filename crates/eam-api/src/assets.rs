//! Handlers for `/assets` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/assets` | Body: a submission payload; returns 201 |
//! | `GET`  | `/assets` | Optional `?category=`, `limit`, `offset`; most recent first |
//! | `GET`  | `/assets/{asset_id}` | Latest submission for that asset; 404 if none |

use std::sync::Arc;

use axum::{
  Json,
  body::Bytes,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use eam_core::{
  payload::SubmissionPayload,
  store::{AssetQuery, AssetRepository, AssetSummary, StoredAsset},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::{ApiError, INVALID_PAYLOAD};

/// Body of the 201 returned for a stored submission.
pub const SAVED: &str = "Asset saved successfully";

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /assets`
///
/// The body is read raw so that a missing content type, an empty body and
/// malformed JSON all produce the same 400.
pub async fn create<R>(
  State(repo): State<Arc<R>>,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  R: AssetRepository,
{
  let value: Value = serde_json::from_slice(&body)
    .map_err(|_| ApiError::BadRequest(INVALID_PAYLOAD.to_owned()))?;
  if value.as_object().is_none_or(|o| o.is_empty()) {
    return Err(ApiError::BadRequest(INVALID_PAYLOAD.to_owned()));
  }

  let payload: SubmissionPayload = serde_json::from_value(value)
    .map_err(|e| ApiError::BadRequest(format!("{INVALID_PAYLOAD}: {e}")))?;

  let stored = repo.insert(payload).await.map_err(|e| {
    tracing::error!(error = %e, "failed to save asset");
    ApiError::Save(Box::new(e))
  })?;

  tracing::info!(
    asset_id = %stored.payload.asset_identification.asset_id,
    record_id = %stored.record_id,
    "asset received"
  );
  Ok((StatusCode::CREATED, Json(json!({ "message": SAVED }))))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub category: Option<String>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

/// `GET /assets[?category=<key>][&limit=..][&offset=..]`
pub async fn list<R>(
  State(repo): State<Arc<R>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<AssetSummary>>, ApiError>
where
  R: AssetRepository,
{
  let query = AssetQuery {
    category: params.category.filter(|c| !c.is_empty()),
    limit:    params.limit,
    offset:   params.offset,
  };
  let assets = repo
    .list(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(assets))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /assets/{asset_id}`
pub async fn get_one<R>(
  State(repo): State<Arc<R>>,
  Path(asset_id): Path<String>,
) -> Result<Json<StoredAsset>, ApiError>
where
  R: AssetRepository,
{
  let asset = repo
    .get(&asset_id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("asset {asset_id} not found")))?;
  Ok(Json(asset))
}

#[cfg(test)]
mod tests {
  use std::io;

  use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
  };
  use eam_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;
  use crate::{api_router, error::SAVE_FAILED};

  async fn app() -> Router {
    let store = SqliteStore::open_in_memory().await.expect("in-memory store");
    api_router(Arc::new(store))
  }

  async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp: Response<Body> = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, body)
  }

  fn post(body: impl Into<Body>) -> Request<Body> {
    Request::post("/assets")
      .header("content-type", "application/json")
      .body(body.into())
      .unwrap()
  }

  fn get(uri: &str) -> Request<Body> { Request::get(uri).body(Body::empty()).unwrap() }

  fn payload_json(asset_id: &str, category: &str) -> String {
    json!({
      "assetIdentification": {
        "assetId": asset_id,
        "barcode": "8901234567890",
        "assetType": "IT",
        "parentAssetId": null,
        "serialNumber": "SN-1"
      },
      "classification": { "category": category, "subCategory": "sub001" },
      "coreDetails": { "assetName": "Laptop", "purchaseDate": "2024-01-15", "assetValue": 1200.5 },
      "specificDetails": { "cpu": "i7", "ram": "16GB" },
      "metadata": {
        "gpsCoordinates": { "latitude": 12.97, "longitude": 77.59, "accuracy": 10.0 },
        "timestamp": "2024-01-15T10:00:00Z",
        "capturedBy": "Jane",
        "capturedAtLocation": "HQ"
      },
      "images": [
        { "imageIndex": 1, "imageData": "data:image/jpeg;base64,AAAA", "capturedAt": "2024-01-15T09:59:00Z" }
      ]
    })
    .to_string()
  }

  #[tokio::test]
  async fn create_returns_201_and_is_readable() {
    let app = app().await;

    let (status, body) = send(&app, post(payload_json("AST-1", "cat001"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "message": SAVED }));

    let (status, body) = send(&app, get("/assets/AST-1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["payload"]["assetIdentification"]["barcode"], "8901234567890");
    assert_eq!(body["payload"]["images"][0]["imageIndex"], 1);
  }

  #[tokio::test]
  async fn empty_or_invalid_bodies_are_rejected() {
    let app = app().await;
    for body in ["", "not json", "{}", "null", "[]"] {
      let (status, resp) = send(&app, post(body)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "body {body:?}");
      assert_eq!(resp["error"], INVALID_PAYLOAD, "body {body:?}");
    }
  }

  #[tokio::test]
  async fn missing_content_type_still_parses() {
    let app = app().await;
    let req = Request::post("/assets").body(Body::from(payload_json("AST-2", "cat001"))).unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
  }

  #[tokio::test]
  async fn unknown_asset_is_404() {
    let app = app().await;
    let (status, body) = send(&app, get("/assets/AST-404")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("AST-404"));
  }

  #[tokio::test]
  async fn list_filters_by_category() {
    let app = app().await;
    send(&app, post(payload_json("AST-1", "cat001"))).await;
    send(&app, post(payload_json("AST-2", "cat003"))).await;
    send(&app, post(payload_json("AST-3", "cat001"))).await;

    let (status, body) = send(&app, get("/assets?category=cat001")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
      .as_array()
      .unwrap()
      .iter()
      .map(|a| a["asset_id"].as_str().unwrap())
      .collect();
    assert_eq!(ids, vec!["AST-3", "AST-1"]);

    let (_, body) = send(&app, get("/assets?limit=1")).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["image_count"], 1);
  }

  // ─── Failing repository ────────────────────────────────────────────────────

  struct Broken;

  impl AssetRepository for Broken {
    type Error = io::Error;

    async fn insert(&self, _payload: SubmissionPayload) -> Result<StoredAsset, io::Error> {
      Err(io::Error::other("disk full"))
    }

    async fn get(&self, _asset_id: &str) -> Result<Option<StoredAsset>, io::Error> { Ok(None) }

    async fn list(&self, _query: &AssetQuery) -> Result<Vec<AssetSummary>, io::Error> {
      Err(io::Error::other("disk full"))
    }
  }

  #[tokio::test]
  async fn storage_failure_is_500_with_details() {
    let app = api_router(Arc::new(Broken));

    let (status, body) = send(&app, post(payload_json("AST-1", "cat001"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], SAVE_FAILED);
    assert_eq!(body["details"], "disk full");

    let (status, _) = send(&app, get("/assets")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
  }
}
