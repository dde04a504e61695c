//! Barcode capture widget.
//!
//! ```text
//! Initializing ──start──▶ Scanning ──decode──▶ Resolved
//!      │                     │
//!      └──(no detector,      └──switch_to_manual──▶ ManualEntry ──submit──▶ Resolved
//!          camera refused)────────────────────────▶ ManualEntry
//! ```
//!
//! Any state can be closed. The camera stream lives in a [`StreamGuard`]
//! held only while `Scanning`, so leaving that state by any route (decode,
//! manual switch, close, cancellation, drop) releases the camera.

use std::{future::Future, time::Duration};

use eam_core::message::{FormMessage, Reporter};
use strum::{Display, EnumIter, IntoStaticStr};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::{
  error::{DetectError, ScanError},
  media::{Camera, Frame, MediaStream, StreamGuard, VideoConstraints},
  probe::{Capabilities, WidgetMode},
};

/// Delay between two sampled frames while scanning.
pub const SCAN_INTERVAL: Duration = Duration::from_millis(500);

pub const CAMERA_DENIED: &str =
  "Camera access denied. Please check permissions or enter barcode manually.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Symbology {
  QrCode,
  Ean13,
  Ean8,
  Code128,
  Code39,
  Code93,
  Codabar,
  UpcA,
  UpcE,
}

/// Every symbology the scanner asks the detector for.
pub const SUPPORTED_SYMBOLOGIES: [Symbology; 9] = [
  Symbology::QrCode,
  Symbology::Ean13,
  Symbology::Ean8,
  Symbology::Code128,
  Symbology::Code39,
  Symbology::Code93,
  Symbology::Codabar,
  Symbology::UpcA,
  Symbology::UpcE,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedBarcode {
  pub raw_value: String,
  pub format:    Symbology,
}

pub trait BarcodeDetector: Send + Sync {
  fn is_supported(&self) -> bool { true }

  /// Decode every barcode of a [`SUPPORTED_SYMBOLOGIES`] format visible in
  /// `frame`. An empty result means nothing was found.
  fn detect<'a>(
    &'a self,
    frame: &'a Frame,
  ) -> impl Future<Output = Result<Vec<DetectedBarcode>, DetectError>> + Send + 'a;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScannerState {
  Initializing,
  Scanning,
  /// Waiting for typed input. `notice` explains an automatic fallback.
  ManualEntry { notice: Option<&'static str> },
  Resolved(String),
  Closed,
}

pub struct BarcodeScanner<C: Camera, D: BarcodeDetector> {
  camera:        C,
  detector:      D,
  mode:          WidgetMode,
  reporter:      Reporter,
  state:         ScannerState,
  stream:        Option<StreamGuard<C::Stream>>,
  scan_interval: Duration,
}

impl<C: Camera, D: BarcodeDetector> BarcodeScanner<C, D> {
  pub fn new(camera: C, detector: D, caps: &Capabilities, reporter: Reporter) -> Self {
    Self {
      camera,
      detector,
      mode: caps.scanner_mode(),
      reporter,
      state: ScannerState::Initializing,
      stream: None,
      scan_interval: SCAN_INTERVAL,
    }
  }

  pub fn with_scan_interval(mut self, interval: Duration) -> Self {
    self.scan_interval = interval;
    self
  }

  pub fn state(&self) -> &ScannerState { &self.state }

  pub fn mode(&self) -> &WidgetMode { &self.mode }

  /// Whether a camera stream is currently held.
  pub fn has_stream(&self) -> bool { self.stream.is_some() }

  /// Acquire the camera. Ends in `Scanning`, or in `ManualEntry` when live
  /// capture is impossible or the camera refuses to open.
  pub async fn start(&mut self) {
    if let WidgetMode::ManualFallback { reason } = self.mode {
      tracing::warn!(reason, "barcode scanner falling back to manual entry");
      self.state = ScannerState::ManualEntry { notice: Some(reason) };
      return;
    }

    match self.camera.open(VideoConstraints::SCANNER).await {
      Ok(stream) => {
        self.stream = Some(StreamGuard::new(stream));
        self.state = ScannerState::Scanning;
        tracing::debug!("barcode scanner scanning");
      }
      Err(e) => {
        tracing::warn!(error = %e, "camera unavailable for scanning");
        self.state = ScannerState::ManualEntry { notice: Some(CAMERA_DENIED) };
      }
    }
  }

  /// Sample frames every scan interval until one decodes or `cancel`
  /// completes. Returns the decoded value, or `None` if cancelled or not
  /// scanning. There is no timeout besides `cancel`.
  pub async fn scan(&mut self, cancel: impl Future<Output = ()>) -> Option<String> {
    let stream = self.stream.as_mut()?;

    let detected = tokio::select! {
      _ = cancel => None,
      found = next_barcode(&mut **stream, &self.detector, self.scan_interval) => Some(found),
    };

    match detected {
      Some(barcode) => {
        tracing::debug!(format = %barcode.format, "barcode decoded");
        self.resolve(barcode.raw_value.clone());
        Some(barcode.raw_value)
      }
      None => {
        self.close();
        None
      }
    }
  }

  /// [`start`](Self::start) followed by [`scan`](Self::scan) when the camera
  /// opened.
  pub async fn run(&mut self, cancel: impl Future<Output = ()>) -> Option<String> {
    self.start().await;
    if self.state == ScannerState::Scanning { self.scan(cancel).await } else { None }
  }

  /// Stop scanning and wait for typed input.
  pub fn switch_to_manual(&mut self) {
    self.stream = None;
    self.state = ScannerState::ManualEntry { notice: None };
  }

  /// Leave manual entry and try the camera again. Only offered when a
  /// detector exists.
  pub async fn use_camera(&mut self) -> bool {
    if !self.detector.is_supported() {
      return false;
    }
    self.state = ScannerState::Initializing;
    self.mode = WidgetMode::LiveCapture;
    self.start().await;
    self.state == ScannerState::Scanning
  }

  /// Accept typed input. Surrounding whitespace is dropped; the value itself
  /// is not validated.
  pub fn submit_manual(&mut self, input: &str) -> Result<String, ScanError> {
    if !matches!(self.state, ScannerState::ManualEntry { .. }) {
      return Err(ScanError::NotInManualEntry);
    }
    let value = input.trim();
    if value.is_empty() {
      return Err(ScanError::EmptyInput);
    }
    self.resolve(value.to_owned());
    Ok(value.to_owned())
  }

  /// Release everything. Safe in any state.
  pub fn close(&mut self) {
    self.stream = None;
    if !matches!(self.state, ScannerState::Resolved(_)) {
      self.state = ScannerState::Closed;
    }
  }

  fn resolve(&mut self, value: String) {
    self.stream = None;
    self.reporter.report(FormMessage::BarcodeScanned(value.clone()));
    self.state = ScannerState::Resolved(value);
  }
}

async fn next_barcode<S: MediaStream, D: BarcodeDetector>(
  stream: &mut S,
  detector: &D,
  period: Duration,
) -> DetectedBarcode {
  let mut ticker = time::interval_at(Instant::now() + period, period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

  loop {
    ticker.tick().await;
    let Some(frame) = stream.frame() else { continue };
    match detector.detect(&frame).await {
      Ok(found) => {
        if let Some(first) = found.into_iter().next() {
          return first;
        }
      }
      Err(e) => tracing::warn!(error = %e, "barcode detection error"),
    }
  }
}
