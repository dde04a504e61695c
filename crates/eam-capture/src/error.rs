//! Error types for the capture widgets.
//!
//! Each error carries a `user_message()` with the text shown next to the
//! widget. None of them are fatal: every failure leaves the widget usable via
//! its fallback path.

use thiserror::Error;

use crate::image::MAX_UPLOAD_BYTES;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CameraError {
  #[error("camera permission denied")]
  PermissionDenied,

  #[error("no camera available")]
  NotFound,

  #[error("camera session is not open")]
  NotOpen,

  #[error("camera error: {0}")]
  Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("barcode detection failed: {0}")]
pub struct DetectError(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
  #[error("manual entry is empty")]
  EmptyInput,

  #[error("scanner is not in manual entry")]
  NotInManualEntry,
}

#[derive(Debug, Error)]
pub enum UploadError {
  #[error("not an image: {0:?}")]
  NotAnImage(String),

  #[error("file is {0} bytes, limit is {MAX_UPLOAD_BYTES}")]
  TooLarge(u64),

  #[error("failed to read file: {0}")]
  Read(#[from] std::io::Error),
}

impl UploadError {
  pub fn user_message(&self) -> &'static str {
    match self {
      UploadError::NotAnImage(_) => "Please select a valid image file",
      UploadError::TooLarge(_) => "Image size must be less than 5MB",
      UploadError::Read(_) => "Unable to read the selected file",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
  #[error("location permission denied")]
  PermissionDenied,

  #[error("position unavailable")]
  PositionUnavailable,

  #[error("location request timed out")]
  Timeout,

  #[error("geolocation is not supported")]
  Unsupported,

  #[error("location error: {0}")]
  Unknown(String),
}

impl PositionError {
  pub fn user_message(&self) -> &'static str {
    match self {
      PositionError::PermissionDenied => {
        "Location permission denied. Please enable location access in your device settings."
      }
      PositionError::PositionUnavailable => {
        "Location information unavailable. Please ensure GPS is enabled."
      }
      PositionError::Timeout => "Location request timed out. Please try again.",
      PositionError::Unsupported => "Geolocation is not supported on this device",
      PositionError::Unknown(_) => "An unknown error occurred while fetching location.",
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
  /// A fix is already held and the role may not replace it.
  #[error("location is read-only for role {0:?}")]
  ReadOnly(String),

  #[error(transparent)]
  Position(#[from] PositionError),
}
