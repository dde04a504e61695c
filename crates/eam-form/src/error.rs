//! Error types for `eam-form`.

use eam_core::{sink::SinkError, validate::ValidationErrors};
use thiserror::Error;

/// Failure of a local store backend, type-erased.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Record(#[from] eam_core::Error),

  #[error("local store error: {0}")]
  Store(#[source] StoreError),
}

#[derive(Debug, Error)]
pub enum SubmitError {
  #[error("{} required field(s) missing", .0.len())]
  Validation(ValidationErrors),

  #[error(transparent)]
  Sink(#[from] SinkError),

  #[error("offline queue error: {0}")]
  Queue(#[source] StoreError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
