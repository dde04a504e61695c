//! Platform capability probe.
//!
//! The host is probed once; each widget turns the result into a
//! [`WidgetMode`] at construction and branches on that, instead of checking
//! for platform APIs throughout its logic.

use crate::{
  barcode::{BarcodeDetector, DetectedBarcode},
  error::{CameraError, DetectError, PositionError},
  location::{Geolocator, Position, PositionOptions},
  media::{Camera, Frame, NoStream, VideoConstraints},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
  pub camera:            bool,
  pub barcode_detection: bool,
  pub geolocation:       bool,
}

/// How a widget operates given the platform it runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetMode {
  LiveCapture,
  /// Live capture is impossible; `reason` is shown to the user.
  ManualFallback { reason: &'static str },
}

pub const DETECTION_UNSUPPORTED: &str = "Barcode detection not supported. Please enter manually.";
pub const CAMERA_UNSUPPORTED: &str = "Camera not available. Please use file upload.";
pub const GEOLOCATION_UNSUPPORTED: &str = "Geolocation is not supported on this device";

impl Capabilities {
  pub fn probe<C: Camera, D: BarcodeDetector, G: Geolocator>(
    camera: &C,
    detector: &D,
    geolocator: &G,
  ) -> Self {
    let caps = Self {
      camera:            camera.is_available(),
      barcode_detection: detector.is_supported(),
      geolocation:       geolocator.is_supported(),
    };
    tracing::debug!(?caps, "probed platform capabilities");
    caps
  }

  /// Scanning needs a detector; without one there is no point opening the
  /// camera. A camera that is present but refuses to open is handled when the
  /// scanner starts.
  pub fn scanner_mode(&self) -> WidgetMode {
    if !self.barcode_detection {
      WidgetMode::ManualFallback { reason: DETECTION_UNSUPPORTED }
    } else if !self.camera {
      WidgetMode::ManualFallback { reason: crate::barcode::CAMERA_DENIED }
    } else {
      WidgetMode::LiveCapture
    }
  }

  pub fn image_mode(&self) -> WidgetMode {
    if self.camera {
      WidgetMode::LiveCapture
    } else {
      WidgetMode::ManualFallback { reason: CAMERA_UNSUPPORTED }
    }
  }

  pub fn location_mode(&self) -> WidgetMode {
    if self.geolocation {
      WidgetMode::LiveCapture
    } else {
      WidgetMode::ManualFallback { reason: GEOLOCATION_UNSUPPORTED }
    }
  }
}

/// Stand-in for any platform API the host lacks. Reports itself unavailable
/// and fails every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

impl Camera for Unsupported {
  type Stream = NoStream;

  fn is_available(&self) -> bool { false }

  async fn open(&self, _constraints: VideoConstraints) -> Result<NoStream, CameraError> {
    Err(CameraError::NotFound)
  }
}

impl BarcodeDetector for Unsupported {
  fn is_supported(&self) -> bool { false }

  async fn detect(&self, _frame: &Frame) -> Result<Vec<DetectedBarcode>, DetectError> {
    Err(DetectError("barcode detection unsupported".into()))
  }
}

impl Geolocator for Unsupported {
  fn is_supported(&self) -> bool { false }

  async fn current_position(&self, _options: PositionOptions) -> Result<Position, PositionError> {
    Err(PositionError::Unsupported)
  }
}
