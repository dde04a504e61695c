//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and calendar dates as
//! `YYYY-MM-DD`. UUIDs are stored as hyphenated lowercase strings. The full
//! payload is also kept as JSON next to the flattened columns.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use eam_core::{
  payload::{SpecificDetails, SubmissionPayload},
  store::{AssetSummary, StoredAsset},
};
use rusqlite::types::Value;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

/// Fixed-width so that text order matches time order.
pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Accepts an ISO date, an RFC 3339 timestamp or a naive ISO datetime and
/// keeps only the date. Anything else, including the empty string, is `None`.
pub fn parse_lenient_date(s: &str) -> Option<NaiveDate> {
  let s = s.trim();
  if s.is_empty() {
    return None;
  }
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .ok()
    .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
    .or_else(|| {
      ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
    })
}

fn text(s: &str) -> Value { Value::Text(s.to_owned()) }

fn date(s: &str) -> Value {
  parse_lenient_date(s).map_or(Value::Null, |d| Value::Text(d.format("%Y-%m-%d").to_string()))
}

fn real(v: Option<f64>) -> Value { v.map_or(Value::Null, Value::Real) }

// ─── Asset rows ──────────────────────────────────────────────────────────────

/// Column/value pairs for one `assets` row.
pub fn asset_columns(
  record_id: Uuid,
  received_at: DateTime<Utc>,
  payload: &SubmissionPayload,
) -> Result<Vec<(&'static str, Value)>> {
  let id = &payload.asset_identification;
  let class = &payload.classification;
  let core = &payload.core_details;
  let assign = &payload.assignment;
  let status = &payload.status;
  let meta = &payload.metadata;
  let gps = meta.gps_coordinates;

  let mut cols = vec![
    ("record_id", Value::Text(encode_uuid(record_id))),
    ("asset_id", text(&id.asset_id)),
    ("barcode", text(&id.barcode)),
    ("asset_type", Value::Text(id.asset_type.to_string())),
    ("parent_asset_id", id.parent_asset_id.as_deref().map_or(Value::Null, text)),
    ("serial_number", text(&id.serial_number)),
    ("account_head", text(&class.account_head)),
    ("category", text(&class.category)),
    ("sub_category", text(&class.sub_category)),
    ("asset_group", text(&class.asset_group)),
    ("asset_model", text(&class.asset_model)),
    ("manufacturer", text(&class.manufacturer)),
    ("asset_name", text(&core.asset_name)),
    ("purchase_date", date(&core.purchase_date)),
    ("capitalization_date", date(&core.capitalization_date)),
    ("vendor", text(&core.vendor)),
    ("invoice_number", text(&core.invoice_number)),
    ("asset_value", real(core.asset_value)),
    ("warranty_start", date(&core.warranty_start)),
    ("warranty_end", date(&core.warranty_end)),
    ("amc_applicable", Value::Integer(i64::from(core.amc_applicable))),
  ];

  match &payload.specific_details {
    SpecificDetails::It(it) => cols.extend([
      ("cpu", text(&it.cpu)),
      ("ram", text(&it.ram)),
      ("storage", text(&it.storage)),
      ("os", text(&it.os)),
      ("ip_address", text(&it.ip_address)),
      ("mac_address", text(&it.mac_address)),
      ("hostname", text(&it.hostname)),
      ("software_license", text(&it.software_license)),
    ]),
    SpecificDetails::NonIt(non_it) => cols.extend([
      ("dimensions", text(&non_it.dimensions)),
      ("capacity", text(&non_it.capacity)),
      ("material_type", text(&non_it.material_type)),
      ("power_rating", text(&non_it.power_rating)),
      ("installation_date", date(&non_it.installation_date)),
    ]),
  }

  cols.extend([
    ("department", text(&assign.department)),
    ("cost_center", text(&assign.cost_center)),
    ("location", text(&assign.location)),
    ("sub_location", text(&assign.sub_location)),
    ("assigned_to", text(&assign.assigned_to)),
    ("custodian", text(&assign.custodian)),
    ("asset_status", Value::Text(status.asset_status.to_string())),
    ("verification_status", Value::Text(status.verification_status.to_string())),
    ("verification_cycle", text(&status.verification_cycle)),
    ("remarks", text(&status.remarks)),
    ("latitude", real(gps.map(|g| g.latitude))),
    ("longitude", real(gps.map(|g| g.longitude))),
    ("accuracy", real(gps.map(|g| g.accuracy))),
    ("captured_by", text(&meta.captured_by)),
    ("captured_at_location", text(&meta.captured_at_location)),
    ("captured_at", Value::Text(encode_dt(meta.timestamp))),
    ("received_at", Value::Text(encode_dt(received_at))),
    ("payload_json", Value::Text(serde_json::to_string(payload)?)),
  ]);

  Ok(cols)
}

/// `INSERT` statement and parameters for [`asset_columns`].
pub fn insert_sql(table: &str, cols: Vec<(&'static str, Value)>) -> (String, Vec<Value>) {
  let names: Vec<&str> = cols.iter().map(|(n, _)| *n).collect();
  let placeholders: Vec<String> = (1..=cols.len()).map(|i| format!("?{i}")).collect();
  let sql = format!(
    "INSERT INTO {table} ({}) VALUES ({})",
    names.join(", "),
    placeholders.join(", ")
  );
  (sql, cols.into_iter().map(|(_, v)| v).collect())
}

/// One `asset_images` row: `(image_index, image_data, captured_at)`.
pub fn image_rows(payload: &SubmissionPayload) -> Vec<(i64, String, String)> {
  payload
    .images
    .iter()
    .map(|img| (i64::from(img.image_index), img.image_data.clone(), encode_dt(img.captured_at)))
    .collect()
}

// ─── Raw reads ───────────────────────────────────────────────────────────────

pub struct RawStored {
  pub record_id:    String,
  pub received_at:  String,
  pub payload_json: String,
}

impl RawStored {
  pub fn decode(self) -> Result<StoredAsset> {
    Ok(StoredAsset {
      record_id:   decode_uuid(&self.record_id)?,
      received_at: decode_dt(&self.received_at)?,
      payload:     serde_json::from_str(&self.payload_json)?,
    })
  }
}

pub struct RawSummary {
  pub record_id:   String,
  pub asset_id:    String,
  pub barcode:     Option<String>,
  pub asset_name:  Option<String>,
  pub category:    Option<String>,
  pub image_count: i64,
  pub received_at: String,
}

impl RawSummary {
  pub fn decode(self) -> Result<AssetSummary> {
    Ok(AssetSummary {
      record_id:   decode_uuid(&self.record_id)?,
      asset_id:    self.asset_id,
      barcode:     self.barcode.unwrap_or_default(),
      asset_name:  self.asset_name.unwrap_or_default(),
      category:    self.category.unwrap_or_default(),
      image_count: u32::try_from(self.image_count).unwrap_or(u32::MAX),
      received_at: decode_dt(&self.received_at)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lenient_dates() {
    let d = |s| parse_lenient_date(s).map(|d| d.to_string());
    assert_eq!(d("2024-03-15").as_deref(), Some("2024-03-15"));
    assert_eq!(d("2024-03-15T10:20:30Z").as_deref(), Some("2024-03-15"));
    assert_eq!(d("2024-03-15T10:20:30.123").as_deref(), Some("2024-03-15"));
    assert_eq!(d("2024-03-15 10:20:30").as_deref(), Some("2024-03-15"));
    assert_eq!(d(""), None);
    assert_eq!(d("15/03/2024"), None);
    assert_eq!(d("2024-02-30"), None);
  }

  #[test]
  fn insert_sql_numbers_placeholders() {
    let (sql, params) = insert_sql("t", vec![("a", Value::Null), ("b", Value::Integer(1))]);
    assert_eq!(sql, "INSERT INTO t (a, b) VALUES (?1, ?2)");
    assert_eq!(params.len(), 2);
  }
}
