//! Required-field validation for the draft record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::record::{DraftAssetRecord, Field};

/// Fields that must be non-empty before a record can be submitted, with the
/// message shown next to each.
pub const REQUIRED_FIELDS: [(Field, &str); 4] = [
  (Field::Barcode, "Barcode is required"),
  (Field::AssetName, "Asset name is required"),
  (Field::SerialNumber, "Serial number is required"),
  (Field::Category, "Category is required"),
];

/// Field-scoped validation messages, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<Field, String>);

impl ValidationErrors {
  pub fn new() -> Self { Self::default() }

  pub fn insert(&mut self, field: Field, message: impl Into<String>) {
    self.0.insert(field, message.into());
  }

  /// Drop the message for `field`. Returns whether one was present.
  pub fn clear_field(&mut self, field: Field) -> bool { self.0.remove(&field).is_some() }

  pub fn get(&self, field: Field) -> Option<&str> { self.0.get(&field).map(String::as_str) }

  pub fn contains(&self, field: Field) -> bool { self.0.contains_key(&field) }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn fields(&self) -> impl Iterator<Item = Field> + '_ { self.0.keys().copied() }

  pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
    self.0.iter().map(|(f, m)| (*f, m.as_str()))
  }
}

/// Compute the full error set for `record`.
pub fn validate(record: &DraftAssetRecord) -> ValidationErrors {
  let mut errors = ValidationErrors::new();
  for (field, message) in REQUIRED_FIELDS {
    if record.text(field).is_none_or(str::is_empty) {
      errors.insert(field, message);
    }
  }
  errors
}
