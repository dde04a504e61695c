//! Error types for `eam-core`.

use thiserror::Error;

use crate::{capture::ImageId, record::Field};

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown field: {0:?}")]
  UnknownField(String),

  #[error("field {0} is read-only")]
  ReadOnlyField(Field),

  #[error("field {field} does not accept a {given} value")]
  FieldKind { field: Field, given: &'static str },

  #[error("invalid value {value:?} for field {field}")]
  InvalidValue { field: Field, value: String },

  #[error("maximum {0} images allowed")]
  ImageLimit(usize),

  #[error("image not found: {0}")]
  ImageNotFound(ImageId),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
