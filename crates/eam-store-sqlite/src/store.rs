//! [`SqliteStore`], the SQLite implementation of the storage traits.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use eam_core::{
  payload::SubmissionPayload,
  record::DraftAssetRecord,
  store::{
    AssetQuery, AssetRepository, AssetSummary, DRAFT_SLOT, DraftStore, OFFLINE_QUEUE_SLOT,
    OfflineQueue, QueuedPayload, StoredAsset,
  },
};

use crate::{
  Error, Result,
  encode::{
    RawStored, RawSummary, asset_columns, encode_dt, encode_uuid, image_rows, insert_sql,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Asset storage backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Slots ─────────────────────────────────────────────────────────────────

  async fn read_slot(&self, key: &'static str) -> Result<Option<String>> {
    let value: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row("SELECT value FROM kv WHERE key = ?1", rusqlite::params![key], |row| {
            row.get(0)
          })
          .optional()?)
      })
      .await?;
    Ok(value)
  }

  async fn write_slot(&self, key: &'static str, value: String) -> Result<()> {
    let at_str = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
          rusqlite::params![key, value, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn delete_slot(&self, key: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Offline queue ───────────────────────────────────────────────────────────

impl OfflineQueue for SqliteStore {
  type Error = Error;

  async fn append(&self, entry: QueuedPayload) -> Result<usize> {
    let json = serde_json::to_string(&entry)?;
    let at_str = encode_dt(Utc::now());

    // Appended in place with JSON1; the slot is never rewritten wholesale.
    let len: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO kv (key, value, updated_at) VALUES (?1, json_array(json(?2)), ?3)
           ON CONFLICT(key) DO UPDATE
             SET value = json_insert(kv.value, '$[#]', json(?2)), updated_at = ?3",
          rusqlite::params![OFFLINE_QUEUE_SLOT, json, at_str],
        )?;
        let len = tx.query_row(
          "SELECT json_array_length(value) FROM kv WHERE key = ?1",
          rusqlite::params![OFFLINE_QUEUE_SLOT],
          |row| row.get(0),
        )?;
        tx.commit()?;
        Ok(len)
      })
      .await?;

    tracing::debug!(queue_len = len, "payload appended to offline queue");
    Ok(usize::try_from(len).unwrap_or_default())
  }

  async fn queued(&self) -> Result<Vec<QueuedPayload>> {
    match self.read_slot(OFFLINE_QUEUE_SLOT).await? {
      None => Ok(Vec::new()),
      Some(raw) => serde_json::from_str(&raw)
        .map_err(|e| Error::CorruptSlot(OFFLINE_QUEUE_SLOT, e.to_string())),
    }
  }
}

// ─── Draft ───────────────────────────────────────────────────────────────────

impl DraftStore for SqliteStore {
  type Error = Error;

  async fn save_draft(&self, record: &DraftAssetRecord) -> Result<()> {
    let json = serde_json::to_string(record)?;
    self.write_slot(DRAFT_SLOT, json).await
  }

  async fn load_draft(&self) -> Result<Option<DraftAssetRecord>> {
    self
      .read_slot(DRAFT_SLOT)
      .await?
      .map(|raw| {
        serde_json::from_str(&raw).map_err(|e| Error::CorruptSlot(DRAFT_SLOT, e.to_string()))
      })
      .transpose()
  }

  async fn clear_draft(&self) -> Result<()> { self.delete_slot(DRAFT_SLOT).await }
}

// ─── Asset repository ────────────────────────────────────────────────────────

const SUMMARY_COLUMNS: &str = "a.record_id, a.asset_id, a.barcode, a.asset_name, a.category,
  (SELECT COUNT(*) FROM asset_images i WHERE i.record_id = a.record_id), a.received_at";

fn raw_summary(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSummary> {
  Ok(RawSummary {
    record_id:   row.get(0)?,
    asset_id:    row.get(1)?,
    barcode:     row.get(2)?,
    asset_name:  row.get(3)?,
    category:    row.get(4)?,
    image_count: row.get(5)?,
    received_at: row.get(6)?,
  })
}

impl AssetRepository for SqliteStore {
  type Error = Error;

  async fn insert(&self, payload: SubmissionPayload) -> Result<StoredAsset> {
    let stored = StoredAsset {
      record_id:   Uuid::new_v4(),
      received_at: Utc::now(),
      payload,
    };

    let (sql, params) =
      insert_sql("assets", asset_columns(stored.record_id, stored.received_at, &stored.payload)?);
    let images = image_rows(&stored.payload);
    let record_id = encode_uuid(stored.record_id);
    let asset_id = stored.payload.asset_identification.asset_id.clone();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(&sql, rusqlite::params_from_iter(params))?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO asset_images (record_id, asset_id, image_index, image_data, captured_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (index, data, captured_at) in images {
            stmt.execute(rusqlite::params![record_id, asset_id, index, data, captured_at])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    tracing::info!(
      record_id = %stored.record_id,
      asset_id = %stored.payload.asset_identification.asset_id,
      images = stored.payload.images.len(),
      "asset stored"
    );
    Ok(stored)
  }

  async fn get(&self, asset_id: &str) -> Result<Option<StoredAsset>> {
    let asset_id = asset_id.to_owned();

    let raw: Option<RawStored> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT record_id, received_at, payload_json FROM assets
             WHERE asset_id = ?1
             ORDER BY received_at DESC, rowid DESC
             LIMIT 1",
            rusqlite::params![asset_id],
            |row| {
              Ok(RawStored {
                record_id:    row.get(0)?,
                received_at:  row.get(1)?,
                payload_json: row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawStored::decode).transpose()
  }

  async fn list(&self, query: &AssetQuery) -> Result<Vec<AssetSummary>> {
    let category = query.category.clone();
    // SQLite treats a negative LIMIT as unbounded.
    let limit = query.limit.map_or(-1, |n| i64::try_from(n).unwrap_or(i64::MAX));
    let offset = query.offset.map_or(0, |n| i64::try_from(n).unwrap_or(i64::MAX));

    let raws: Vec<RawSummary> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(category) = category {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM assets a
             WHERE a.category = ?1
             ORDER BY a.received_at DESC, a.rowid DESC
             LIMIT ?2 OFFSET ?3"
          ))?;
          stmt
            .query_map(rusqlite::params![category, limit, offset], raw_summary)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt = conn.prepare(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM assets a
             ORDER BY a.received_at DESC, a.rowid DESC
             LIMIT ?1 OFFSET ?2"
          ))?;
          stmt
            .query_map(rusqlite::params![limit, offset], raw_summary)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSummary::decode).collect()
  }
}
