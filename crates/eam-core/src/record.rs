//! The Draft Asset Record, the single aggregate edited by the capture form.
//!
//! Every editable input is addressed by a [`Field`]. Writes go through
//! [`DraftAssetRecord::set`], which only checks that the value has the right
//! shape for the field; required-field rules live in [`crate::validate`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::{Error, Result};

// ─── Asset ID ────────────────────────────────────────────────────────────────

/// Record identifier of the form `AST-<epoch millis>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
  pub const PREFIX: &'static str = "AST";

  pub fn generate() -> Self { Self::at(Utc::now()) }

  pub fn at(instant: DateTime<Utc>) -> Self {
    Self::from_millis(instant.timestamp_millis())
  }

  /// A fresh identifier that is guaranteed to differ from `previous`, even if
  /// both fall within the same millisecond.
  pub fn generate_after(previous: &AssetId) -> Self {
    let now = Utc::now().timestamp_millis();
    match previous.millis() {
      Some(prev) if prev >= now => Self::from_millis(prev + 1),
      _ => Self::from_millis(now),
    }
  }

  fn from_millis(millis: i64) -> Self { Self(format!("{}-{millis}", Self::PREFIX)) }

  /// The embedded timestamp, if the identifier is well-formed.
  pub fn millis(&self) -> Option<i64> {
    self.0.strip_prefix(Self::PREFIX)?.strip_prefix('-')?.parse().ok()
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AssetId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

// ─── Enumerations ────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
  EnumString, EnumIter, IntoStaticStr,
)]
pub enum AssetType {
  #[default]
  #[serde(rename = "IT")]
  #[strum(serialize = "IT")]
  It,
  #[serde(rename = "Non-IT")]
  #[strum(serialize = "Non-IT")]
  NonIt,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
  EnumString, EnumIter, IntoStaticStr,
)]
pub enum AssetStatus {
  #[default]
  #[serde(rename = "In Use")]
  #[strum(serialize = "In Use")]
  InUse,
  #[serde(rename = "In Store")]
  #[strum(serialize = "In Store")]
  InStore,
  #[serde(rename = "Under Repair")]
  #[strum(serialize = "Under Repair")]
  UnderRepair,
  Scrapped,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display,
  EnumString, EnumIter, IntoStaticStr,
)]
pub enum VerificationStatus {
  #[default]
  Pending,
  Verified,
}

// ─── Sections ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
  pub asset_id:        AssetId,
  pub barcode:         String,
  pub asset_type:      AssetType,
  pub parent_asset_id: String,
  pub serial_number:   String,
}

/// Reference-data keys. `sub_category` belongs to `category`, and
/// `asset_group` belongs to `sub_category`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Classification {
  pub account_head: String,
  pub category:     String,
  pub sub_category: String,
  pub asset_group:  String,
  pub asset_model:  String,
  pub manufacturer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CoreDetails {
  pub asset_name:          String,
  pub purchase_date:       String,
  pub capitalization_date: String,
  pub vendor:              String,
  pub invoice_number:      String,
  /// Kept as typed; coerced to a number only when the payload is assembled.
  pub asset_value:         String,
  pub warranty_start:      String,
  pub warranty_end:        String,
  pub amc_applicable:      bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItSpecifics {
  pub cpu:              String,
  pub ram:              String,
  pub storage:          String,
  pub os:               String,
  pub ip_address:       String,
  pub mac_address:      String,
  pub hostname:         String,
  pub software_license: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NonItSpecifics {
  pub dimensions:        String,
  pub capacity:          String,
  pub material_type:     String,
  pub power_rating:      String,
  pub installation_date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Assignment {
  pub department:   String,
  pub cost_center:  String,
  pub location:     String,
  pub sub_location: String,
  pub assigned_to:  String,
  pub custodian:    String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusDetails {
  pub asset_status:        AssetStatus,
  pub verification_status: VerificationStatus,
  pub verification_cycle:  String,
  pub remarks:             String,
}

// ─── Field addressing ────────────────────────────────────────────────────────

/// Names every editable input of the record. The string form is the camelCase
/// key used on the wire (`"serialNumber"`, `"amcApplicable"`, ...).
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Field {
  AssetId,
  Barcode,
  AssetType,
  ParentAssetId,
  SerialNumber,
  AccountHead,
  Category,
  SubCategory,
  AssetGroup,
  AssetModel,
  Manufacturer,
  AssetName,
  PurchaseDate,
  CapitalizationDate,
  Vendor,
  InvoiceNumber,
  AssetValue,
  WarrantyStart,
  WarrantyEnd,
  AmcApplicable,
  Cpu,
  Ram,
  Storage,
  Os,
  IpAddress,
  MacAddress,
  Hostname,
  SoftwareLicense,
  Dimensions,
  Capacity,
  MaterialType,
  PowerRating,
  InstallationDate,
  Department,
  CostCenter,
  Location,
  SubLocation,
  AssignedTo,
  Custodian,
  AssetStatus,
  VerificationStatus,
  VerificationCycle,
  Remarks,
}

/// The shape of value a [`Field`] holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
  ReadOnly,
  Text,
  Flag,
  AssetType,
  AssetStatus,
  VerificationStatus,
}

impl Field {
  pub fn kind(self) -> FieldKind {
    match self {
      Field::AssetId => FieldKind::ReadOnly,
      Field::AmcApplicable => FieldKind::Flag,
      Field::AssetType => FieldKind::AssetType,
      Field::AssetStatus => FieldKind::AssetStatus,
      Field::VerificationStatus => FieldKind::VerificationStatus,
      _ => FieldKind::Text,
    }
  }

  /// Human-readable label for form rendering.
  pub fn label(self) -> &'static str {
    match self {
      Field::AssetId => "Asset ID",
      Field::Barcode => "Barcode / QR Code",
      Field::AssetType => "Asset Type",
      Field::ParentAssetId => "Parent Asset ID",
      Field::SerialNumber => "Serial Number",
      Field::AccountHead => "Account Head",
      Field::Category => "Category",
      Field::SubCategory => "Sub-category",
      Field::AssetGroup => "Asset Group",
      Field::AssetModel => "Asset Model",
      Field::Manufacturer => "Manufacturer / Make",
      Field::AssetName => "Asset Name / Description",
      Field::PurchaseDate => "Purchase Date",
      Field::CapitalizationDate => "Capitalization Date",
      Field::Vendor => "Vendor / Supplier",
      Field::InvoiceNumber => "Invoice Number",
      Field::AssetValue => "Asset Value",
      Field::WarrantyStart => "Warranty Start",
      Field::WarrantyEnd => "Warranty End",
      Field::AmcApplicable => "AMC Applicable",
      Field::Cpu => "CPU / Processor",
      Field::Ram => "RAM",
      Field::Storage => "Storage (HDD/SSD)",
      Field::Os => "Operating System",
      Field::IpAddress => "IP Address",
      Field::MacAddress => "MAC Address",
      Field::Hostname => "Hostname",
      Field::SoftwareLicense => "Software License Key",
      Field::Dimensions => "Physical Dimensions",
      Field::Capacity => "Capacity / Rating",
      Field::MaterialType => "Material Type",
      Field::PowerRating => "Power Rating",
      Field::InstallationDate => "Installation Date",
      Field::Department => "Department",
      Field::CostCenter => "Cost Center",
      Field::Location => "Location",
      Field::SubLocation => "Sub-location",
      Field::AssignedTo => "Assigned To",
      Field::Custodian => "Custodian Name",
      Field::AssetStatus => "Asset Status",
      Field::VerificationStatus => "Verification Status",
      Field::VerificationCycle => "Verification Cycle",
      Field::Remarks => "Remarks / Notes",
    }
  }

  /// Whether the field only applies to one asset type.
  pub fn applies_to(self) -> Option<AssetType> {
    match self {
      Field::Cpu
      | Field::Ram
      | Field::Storage
      | Field::Os
      | Field::IpAddress
      | Field::MacAddress
      | Field::Hostname
      | Field::SoftwareLicense => Some(AssetType::It),
      Field::Dimensions
      | Field::Capacity
      | Field::MaterialType
      | Field::PowerRating
      | Field::InstallationDate => Some(AssetType::NonIt),
      _ => None,
    }
  }
}

/// A value written into a [`Field`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
  Text(String),
  Flag(bool),
  AssetType(AssetType),
  AssetStatus(AssetStatus),
  VerificationStatus(VerificationStatus),
}

impl FieldValue {
  fn kind_name(&self) -> &'static str {
    match self {
      FieldValue::Text(_) => "text",
      FieldValue::Flag(_) => "flag",
      FieldValue::AssetType(_) => "asset type",
      FieldValue::AssetStatus(_) => "asset status",
      FieldValue::VerificationStatus(_) => "verification status",
    }
  }

  /// Display form, as the value would appear in an input.
  pub fn display(&self) -> String {
    match self {
      FieldValue::Text(s) => s.clone(),
      FieldValue::Flag(b) => if *b { "Yes".into() } else { "No".into() },
      FieldValue::AssetType(t) => t.to_string(),
      FieldValue::AssetStatus(s) => s.to_string(),
      FieldValue::VerificationStatus(s) => s.to_string(),
    }
  }
}

impl From<&str> for FieldValue {
  fn from(s: &str) -> Self { FieldValue::Text(s.to_owned()) }
}

impl From<String> for FieldValue {
  fn from(s: String) -> Self { FieldValue::Text(s) }
}

impl From<bool> for FieldValue {
  fn from(b: bool) -> Self { FieldValue::Flag(b) }
}

impl From<AssetType> for FieldValue {
  fn from(t: AssetType) -> Self { FieldValue::AssetType(t) }
}

impl From<AssetStatus> for FieldValue {
  fn from(s: AssetStatus) -> Self { FieldValue::AssetStatus(s) }
}

impl From<VerificationStatus> for FieldValue {
  fn from(s: VerificationStatus) -> Self { FieldValue::VerificationStatus(s) }
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// The in-progress asset being edited. Serialises flat, one key per field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftAssetRecord {
  #[serde(flatten)]
  pub identification: Identification,
  #[serde(flatten)]
  pub classification: Classification,
  #[serde(flatten)]
  pub core:           CoreDetails,
  #[serde(flatten)]
  pub it:             ItSpecifics,
  #[serde(flatten)]
  pub non_it:         NonItSpecifics,
  #[serde(flatten)]
  pub assignment:     Assignment,
  #[serde(flatten)]
  pub status:         StatusDetails,
}

impl Default for DraftAssetRecord {
  fn default() -> Self { Self::new() }
}

impl DraftAssetRecord {
  /// A blank record with a freshly generated asset ID.
  pub fn new() -> Self { Self::with_id(AssetId::generate()) }

  pub fn with_id(asset_id: AssetId) -> Self {
    Self {
      identification: Identification {
        asset_id,
        barcode: String::new(),
        asset_type: AssetType::default(),
        parent_asset_id: String::new(),
        serial_number: String::new(),
      },
      classification: Classification::default(),
      core:           CoreDetails::default(),
      it:             ItSpecifics::default(),
      non_it:         NonItSpecifics::default(),
      assignment:     Assignment::default(),
      status:         StatusDetails::default(),
    }
  }

  pub fn asset_id(&self) -> &AssetId { &self.identification.asset_id }

  pub fn asset_type(&self) -> AssetType { self.identification.asset_type }

  /// Write `value` into `field`. Only the value's shape is checked.
  pub fn set(&mut self, field: Field, value: FieldValue) -> Result<()> {
    match (field.kind(), value) {
      (FieldKind::ReadOnly, _) => Err(Error::ReadOnlyField(field)),
      (FieldKind::Text, FieldValue::Text(s)) => {
        if let Some(slot) = self.text_slot_mut(field) {
          *slot = s;
        }
        Ok(())
      }
      (FieldKind::Flag, FieldValue::Flag(b)) => {
        self.core.amc_applicable = b;
        Ok(())
      }
      (FieldKind::AssetType, FieldValue::AssetType(t)) => {
        self.identification.asset_type = t;
        Ok(())
      }
      (FieldKind::AssetStatus, FieldValue::AssetStatus(s)) => {
        self.status.asset_status = s;
        Ok(())
      }
      (FieldKind::VerificationStatus, FieldValue::VerificationStatus(s)) => {
        self.status.verification_status = s;
        Ok(())
      }
      (_, other) => Err(Error::FieldKind { field, given: other.kind_name() }),
    }
  }

  /// Parse `raw` according to the field's kind and write it.
  pub fn set_raw(&mut self, field: Field, raw: &str) -> Result<()> {
    let invalid = || Error::InvalidValue { field, value: raw.to_owned() };
    let value = match field.kind() {
      FieldKind::ReadOnly => return Err(Error::ReadOnlyField(field)),
      FieldKind::Text => FieldValue::Text(raw.to_owned()),
      FieldKind::Flag => FieldValue::Flag(parse_flag(raw).ok_or_else(invalid)?),
      FieldKind::AssetType => FieldValue::AssetType(raw.parse().map_err(|_| invalid())?),
      FieldKind::AssetStatus => {
        FieldValue::AssetStatus(raw.parse().map_err(|_| invalid())?)
      }
      FieldKind::VerificationStatus => {
        FieldValue::VerificationStatus(raw.parse().map_err(|_| invalid())?)
      }
    };
    self.set(field, value)
  }

  /// Read the current value of `field`.
  pub fn get(&self, field: Field) -> FieldValue {
    match field {
      Field::AssetId => FieldValue::Text(self.identification.asset_id.to_string()),
      Field::AmcApplicable => FieldValue::Flag(self.core.amc_applicable),
      Field::AssetType => FieldValue::AssetType(self.identification.asset_type),
      Field::AssetStatus => FieldValue::AssetStatus(self.status.asset_status),
      Field::VerificationStatus => {
        FieldValue::VerificationStatus(self.status.verification_status)
      }
      _ => FieldValue::Text(self.text(field).unwrap_or_default().to_owned()),
    }
  }

  /// The text content of a text field; `None` for non-text fields.
  pub fn text(&self, field: Field) -> Option<&str> {
    let s = match field {
      Field::Barcode => &self.identification.barcode,
      Field::ParentAssetId => &self.identification.parent_asset_id,
      Field::SerialNumber => &self.identification.serial_number,
      Field::AccountHead => &self.classification.account_head,
      Field::Category => &self.classification.category,
      Field::SubCategory => &self.classification.sub_category,
      Field::AssetGroup => &self.classification.asset_group,
      Field::AssetModel => &self.classification.asset_model,
      Field::Manufacturer => &self.classification.manufacturer,
      Field::AssetName => &self.core.asset_name,
      Field::PurchaseDate => &self.core.purchase_date,
      Field::CapitalizationDate => &self.core.capitalization_date,
      Field::Vendor => &self.core.vendor,
      Field::InvoiceNumber => &self.core.invoice_number,
      Field::AssetValue => &self.core.asset_value,
      Field::WarrantyStart => &self.core.warranty_start,
      Field::WarrantyEnd => &self.core.warranty_end,
      Field::Cpu => &self.it.cpu,
      Field::Ram => &self.it.ram,
      Field::Storage => &self.it.storage,
      Field::Os => &self.it.os,
      Field::IpAddress => &self.it.ip_address,
      Field::MacAddress => &self.it.mac_address,
      Field::Hostname => &self.it.hostname,
      Field::SoftwareLicense => &self.it.software_license,
      Field::Dimensions => &self.non_it.dimensions,
      Field::Capacity => &self.non_it.capacity,
      Field::MaterialType => &self.non_it.material_type,
      Field::PowerRating => &self.non_it.power_rating,
      Field::InstallationDate => &self.non_it.installation_date,
      Field::Department => &self.assignment.department,
      Field::CostCenter => &self.assignment.cost_center,
      Field::Location => &self.assignment.location,
      Field::SubLocation => &self.assignment.sub_location,
      Field::AssignedTo => &self.assignment.assigned_to,
      Field::Custodian => &self.assignment.custodian,
      Field::VerificationCycle => &self.status.verification_cycle,
      Field::Remarks => &self.status.remarks,
      Field::AssetId
      | Field::AssetType
      | Field::AmcApplicable
      | Field::AssetStatus
      | Field::VerificationStatus => return None,
    };
    Some(s.as_str())
  }

  fn text_slot_mut(&mut self, field: Field) -> Option<&mut String> {
    let s = match field {
      Field::Barcode => &mut self.identification.barcode,
      Field::ParentAssetId => &mut self.identification.parent_asset_id,
      Field::SerialNumber => &mut self.identification.serial_number,
      Field::AccountHead => &mut self.classification.account_head,
      Field::Category => &mut self.classification.category,
      Field::SubCategory => &mut self.classification.sub_category,
      Field::AssetGroup => &mut self.classification.asset_group,
      Field::AssetModel => &mut self.classification.asset_model,
      Field::Manufacturer => &mut self.classification.manufacturer,
      Field::AssetName => &mut self.core.asset_name,
      Field::PurchaseDate => &mut self.core.purchase_date,
      Field::CapitalizationDate => &mut self.core.capitalization_date,
      Field::Vendor => &mut self.core.vendor,
      Field::InvoiceNumber => &mut self.core.invoice_number,
      Field::AssetValue => &mut self.core.asset_value,
      Field::WarrantyStart => &mut self.core.warranty_start,
      Field::WarrantyEnd => &mut self.core.warranty_end,
      Field::Cpu => &mut self.it.cpu,
      Field::Ram => &mut self.it.ram,
      Field::Storage => &mut self.it.storage,
      Field::Os => &mut self.it.os,
      Field::IpAddress => &mut self.it.ip_address,
      Field::MacAddress => &mut self.it.mac_address,
      Field::Hostname => &mut self.it.hostname,
      Field::SoftwareLicense => &mut self.it.software_license,
      Field::Dimensions => &mut self.non_it.dimensions,
      Field::Capacity => &mut self.non_it.capacity,
      Field::MaterialType => &mut self.non_it.material_type,
      Field::PowerRating => &mut self.non_it.power_rating,
      Field::InstallationDate => &mut self.non_it.installation_date,
      Field::Department => &mut self.assignment.department,
      Field::CostCenter => &mut self.assignment.cost_center,
      Field::Location => &mut self.assignment.location,
      Field::SubLocation => &mut self.assignment.sub_location,
      Field::AssignedTo => &mut self.assignment.assigned_to,
      Field::Custodian => &mut self.assignment.custodian,
      Field::VerificationCycle => &mut self.status.verification_cycle,
      Field::Remarks => &mut self.status.remarks,
      Field::AssetId
      | Field::AssetType
      | Field::AmcApplicable
      | Field::AssetStatus
      | Field::VerificationStatus => return None,
    };
    Some(s)
  }

  /// Start the next record of a batch: a new asset ID and cleared barcode,
  /// name and serial number. Everything else carries over.
  pub fn reset_identification(&mut self) {
    self.identification.asset_id = AssetId::generate_after(&self.identification.asset_id);
    self.identification.barcode.clear();
    self.identification.serial_number.clear();
    self.core.asset_name.clear();
  }
}

fn parse_flag(raw: &str) -> Option<bool> {
  match raw.trim().to_ascii_lowercase().as_str() {
    "true" | "yes" | "y" | "on" | "1" => Some(true),
    "false" | "no" | "n" | "off" | "0" | "" => Some(false),
    _ => None,
  }
}
