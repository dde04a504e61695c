//! Platform adapters for a terminal host.
//!
//! A terminal has no camera and no barcode decoder, so those widgets run on
//! [`eam_capture::Unsupported`] and fall back to typed input and file upload.
//! Geolocation comes from a fix written in the config file, if any.

use eam_capture::{
  error::PositionError,
  location::{Geolocator, PermissionState, Position, PositionOptions},
};
use serde::Deserialize;

/// A position configured ahead of time, e.g. the surveyed coordinates of the
/// site being audited.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FixedPosition {
  pub latitude:  f64,
  pub longitude: f64,
  #[serde(default = "default_accuracy")]
  pub accuracy:  f64,
}

fn default_accuracy() -> f64 { 10.0 }

/// Answers every request with the configured fix. Without one, reports
/// geolocation as unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedGeolocator {
  fix: Option<FixedPosition>,
}

impl FixedGeolocator {
  pub fn new(fix: Option<FixedPosition>) -> Self { Self { fix } }
}

impl Geolocator for FixedGeolocator {
  fn is_supported(&self) -> bool { self.fix.is_some() }

  fn permission_state(&self) -> PermissionState {
    if self.fix.is_some() { PermissionState::Granted } else { PermissionState::Prompt }
  }

  async fn current_position(&self, _options: PositionOptions) -> Result<Position, PositionError> {
    let fix = self.fix.ok_or(PositionError::Unsupported)?;
    Ok(Position { latitude: fix.latitude, longitude: fix.longitude, accuracy: fix.accuracy })
  }
}
