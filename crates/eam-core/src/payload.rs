//! The Submission Payload, the wire contract with the ingestion endpoint.
//!
//! A payload is a read-only projection of the draft record plus its images,
//! location fix and user context, grouped into sections:
//!
//! ```json
//! {
//!   "assetIdentification": { "assetId": "AST-…", "barcode": "…", … },
//!   "classification":      { … },
//!   "coreDetails":         { "assetValue": 1250.0, … },
//!   "specificDetails":     { "cpu": "…", … } | { "dimensions": "…", … },
//!   "assignment":          { … },
//!   "status":              { … },
//!   "metadata":            { "gpsCoordinates": { … } | null, "timestamp": "…", … },
//!   "images":              [ { "imageIndex": 1, "imageData": "data:…", "capturedAt": "…" } ]
//! }
//! ```
//!
//! Every section defaults when absent so that the ingestion side can accept
//! partial documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
  capture::{CapturedImage, CapturedLocation},
  record::{
    AssetType, Assignment, Classification, DraftAssetRecord, ItSpecifics, NonItSpecifics,
    StatusDetails,
  },
  user::UserContext,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionPayload {
  pub asset_identification: PayloadIdentification,
  pub classification:       Classification,
  pub core_details:         PayloadCoreDetails,
  pub specific_details:     SpecificDetails,
  pub assignment:           Assignment,
  pub status:               StatusDetails,
  pub metadata:             PayloadMetadata,
  pub images:               Vec<PayloadImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayloadIdentification {
  pub asset_id:        String,
  pub barcode:         String,
  pub asset_type:      AssetType,
  pub parent_asset_id: Option<String>,
  pub serial_number:   String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayloadCoreDetails {
  pub asset_name:          String,
  pub purchase_date:       String,
  pub capitalization_date: String,
  pub vendor:              String,
  pub invoice_number:      String,
  /// `null` when the typed value has no numeric prefix.
  pub asset_value:         Option<f64>,
  pub warranty_start:      String,
  pub warranty_end:        String,
  pub amc_applicable:      bool,
}

/// The type-specific section. Exactly one variant is emitted, chosen by the
/// record's asset type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SpecificDetails {
  It(ItSpecifics),
  NonIt(NonItSpecifics),
}

impl Default for SpecificDetails {
  fn default() -> Self { SpecificDetails::It(ItSpecifics::default()) }
}

impl SpecificDetails {
  pub fn asset_type(&self) -> AssetType {
    match self {
      SpecificDetails::It(_) => AssetType::It,
      SpecificDetails::NonIt(_) => AssetType::NonIt,
    }
  }
}

/// Every key either variant may carry; used to pick the variant on read.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSpecificDetails {
  cpu:               Option<String>,
  ram:               Option<String>,
  storage:           Option<String>,
  os:                Option<String>,
  ip_address:        Option<String>,
  mac_address:       Option<String>,
  hostname:          Option<String>,
  software_license:  Option<String>,
  dimensions:        Option<String>,
  capacity:          Option<String>,
  material_type:     Option<String>,
  power_rating:      Option<String>,
  installation_date: Option<String>,
}

impl<'de> Deserialize<'de> for SpecificDetails {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = RawSpecificDetails::deserialize(deserializer)?;
    let non_it = raw.dimensions.is_some()
      || raw.capacity.is_some()
      || raw.material_type.is_some()
      || raw.power_rating.is_some()
      || raw.installation_date.is_some();
    let it = raw.cpu.is_some()
      || raw.ram.is_some()
      || raw.storage.is_some()
      || raw.os.is_some()
      || raw.ip_address.is_some()
      || raw.mac_address.is_some()
      || raw.hostname.is_some()
      || raw.software_license.is_some();

    if non_it && !it {
      Ok(SpecificDetails::NonIt(NonItSpecifics {
        dimensions:        raw.dimensions.unwrap_or_default(),
        capacity:          raw.capacity.unwrap_or_default(),
        material_type:     raw.material_type.unwrap_or_default(),
        power_rating:      raw.power_rating.unwrap_or_default(),
        installation_date: raw.installation_date.unwrap_or_default(),
      }))
    } else {
      Ok(SpecificDetails::It(ItSpecifics {
        cpu:              raw.cpu.unwrap_or_default(),
        ram:              raw.ram.unwrap_or_default(),
        storage:          raw.storage.unwrap_or_default(),
        os:               raw.os.unwrap_or_default(),
        ip_address:       raw.ip_address.unwrap_or_default(),
        mac_address:      raw.mac_address.unwrap_or_default(),
        hostname:         raw.hostname.unwrap_or_default(),
        software_license: raw.software_license.unwrap_or_default(),
      }))
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
  pub latitude:  f64,
  pub longitude: f64,
  pub accuracy:  f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayloadMetadata {
  pub gps_coordinates:      Option<GpsCoordinates>,
  /// When the payload was assembled.
  pub timestamp:            DateTime<Utc>,
  pub captured_by:          String,
  pub captured_at_location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PayloadImage {
  /// 1-based position in the record's image list.
  pub image_index: u32,
  pub image_data:  String,
  pub captured_at: DateTime<Utc>,
}

impl SubmissionPayload {
  /// Project a draft and its attachments into a payload stamped `at`.
  pub fn assemble(
    record: &DraftAssetRecord,
    images: &[CapturedImage],
    location: Option<&CapturedLocation>,
    user: &UserContext,
    at: DateTime<Utc>,
  ) -> Self {
    let id = &record.identification;
    let core = &record.core;

    Self {
      asset_identification: PayloadIdentification {
        asset_id:        id.asset_id.to_string(),
        barcode:         id.barcode.clone(),
        asset_type:      id.asset_type,
        parent_asset_id: (!id.parent_asset_id.is_empty()).then(|| id.parent_asset_id.clone()),
        serial_number:   id.serial_number.clone(),
      },
      classification:       record.classification.clone(),
      core_details:         PayloadCoreDetails {
        asset_name:          core.asset_name.clone(),
        purchase_date:       core.purchase_date.clone(),
        capitalization_date: core.capitalization_date.clone(),
        vendor:              core.vendor.clone(),
        invoice_number:      core.invoice_number.clone(),
        asset_value:         parse_float_prefix(&core.asset_value),
        warranty_start:      core.warranty_start.clone(),
        warranty_end:        core.warranty_end.clone(),
        amc_applicable:      core.amc_applicable,
      },
      specific_details:     match id.asset_type {
        AssetType::It => SpecificDetails::It(record.it.clone()),
        AssetType::NonIt => SpecificDetails::NonIt(record.non_it.clone()),
      },
      assignment:           record.assignment.clone(),
      status:               record.status.clone(),
      metadata:             PayloadMetadata {
        gps_coordinates:      location.map(|loc| GpsCoordinates {
          latitude:  loc.latitude,
          longitude: loc.longitude,
          accuracy:  loc.accuracy,
        }),
        timestamp:            at,
        captured_by:          user.user_name.clone(),
        captured_at_location: user.location_name.clone(),
      },
      images:               images
        .iter()
        .zip(1u32..)
        .map(|(img, index)| PayloadImage {
          image_index: index,
          image_data:  img.data.clone(),
          captured_at: img.timestamp,
        })
        .collect(),
    }
  }
}

/// Parse the longest numeric prefix of `input`, the way a lenient form
/// number parser does: `"1250.50 INR"` is `1250.5`, `"abc"` is `None`.
pub fn parse_float_prefix(input: &str) -> Option<f64> {
  let s = input.trim_start();
  let end = s
    .char_indices()
    .find(|(_, c)| !(c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E')))
    .map_or(s.len(), |(i, _)| i);
  let candidate = &s[..end];
  (1..=candidate.len())
    .rev()
    .find_map(|len| candidate[..len].parse::<f64>().ok())
    .filter(|v| v.is_finite())
}
