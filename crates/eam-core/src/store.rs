//! Storage traits and record types.
//!
//! Two sides use storage:
//!
//! - the capture client keeps an append-only offline queue and a saved draft
//!   in named local slots ([`OfflineQueue`], [`DraftStore`]);
//! - the ingestion service persists received payloads ([`AssetRepository`]).
//!
//! Backends (e.g. `eam-store-sqlite`) implement these; higher layers depend on
//! the traits only.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{payload::SubmissionPayload, record::DraftAssetRecord};

/// Local slot holding the offline queue.
pub const OFFLINE_QUEUE_SLOT: &str = "offlineAssetQueue";

/// Local slot holding the saved draft.
pub const DRAFT_SLOT: &str = "assetDataDraft";

// ─── Client side ─────────────────────────────────────────────────────────────

/// A payload held back while offline. Serialises as the payload with an extra
/// `queuedAt` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedPayload {
  #[serde(flatten)]
  pub payload:   SubmissionPayload,
  pub queued_at: DateTime<Utc>,
}

/// Ordered, append-only list of payloads that were captured offline.
///
/// Nothing here drains the queue; entries are only ever added and read.
pub trait OfflineQueue: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Append `entry` after all existing entries. Returns the new queue length.
  fn append(
    &self,
    entry: QueuedPayload,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// All queued entries, oldest first.
  fn queued(&self) -> impl Future<Output = Result<Vec<QueuedPayload>, Self::Error>> + Send + '_;
}

/// A single saved draft slot.
pub trait DraftStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Replace the saved draft with `record`.
  fn save_draft<'a>(
    &'a self,
    record: &'a DraftAssetRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn load_draft(
    &self,
  ) -> impl Future<Output = Result<Option<DraftAssetRecord>, Self::Error>> + Send + '_;

  /// Remove the saved draft, if any.
  fn clear_draft(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── Ingestion side ──────────────────────────────────────────────────────────

/// A payload as persisted by the ingestion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAsset {
  pub record_id:   Uuid,
  pub received_at: DateTime<Utc>,
  pub payload:     SubmissionPayload,
}

/// Listing view of a stored asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
  pub record_id:   Uuid,
  pub asset_id:    String,
  pub barcode:     String,
  pub asset_name:  String,
  pub category:    String,
  pub image_count: u32,
  pub received_at: DateTime<Utc>,
}

/// Parameters for [`AssetRepository::list`].
#[derive(Debug, Clone, Default)]
pub struct AssetQuery {
  /// Restrict to one category key.
  pub category: Option<String>,
  pub limit:    Option<usize>,
  pub offset:   Option<usize>,
}

pub trait AssetRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist `payload` with its images. The `received_at` timestamp is set by
  /// the repository.
  fn insert(
    &self,
    payload: SubmissionPayload,
  ) -> impl Future<Output = Result<StoredAsset, Self::Error>> + Send + '_;

  /// The most recently received asset with this asset ID.
  fn get<'a>(
    &'a self,
    asset_id: &'a str,
  ) -> impl Future<Output = Result<Option<StoredAsset>, Self::Error>> + Send + 'a;

  /// Summaries, most recent first.
  fn list<'a>(
    &'a self,
    query: &'a AssetQuery,
  ) -> impl Future<Output = Result<Vec<AssetSummary>, Self::Error>> + Send + 'a;
}
