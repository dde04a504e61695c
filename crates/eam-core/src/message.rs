//! Upward reports from the capture widgets to the form.
//!
//! Widgets never touch the draft directly. They hand a [`FormMessage`] to the
//! [`Reporter`] they were built with, and the form applies it.

use std::{fmt, sync::Arc};

use crate::capture::{CapturedLocation, ImageId};

#[derive(Debug, Clone, PartialEq)]
pub enum FormMessage {
  /// A decoded or manually entered barcode.
  BarcodeScanned(String),
  /// A new image, as a `data:` URL.
  ImageAdded(String),
  ImageRemoved(ImageId),
  LocationCaptured(CapturedLocation),
}

/// Callback handle a widget reports through. Cheap to clone.
#[derive(Clone)]
pub struct Reporter(Arc<dyn Fn(FormMessage) + Send + Sync>);

impl Reporter {
  pub fn new(f: impl Fn(FormMessage) + Send + Sync + 'static) -> Self { Self(Arc::new(f)) }

  /// A reporter that drops everything.
  pub fn discard() -> Self { Self::new(|_| {}) }

  pub fn report(&self, message: FormMessage) { (self.0)(message) }
}

impl fmt::Debug for Reporter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str("Reporter") }
}
