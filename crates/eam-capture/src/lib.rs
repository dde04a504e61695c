//! Capture widgets for the asset form.
//!
//! - [`barcode::BarcodeScanner`] decodes a barcode from the camera, or takes
//!   it typed in.
//! - [`image::ImageCapture`] fills image slots from the camera or from files.
//! - [`location::LocationTracker`] acquires a single GPS fix.
//!
//! The host platform is reached only through the [`media::Camera`],
//! [`barcode::BarcodeDetector`] and [`location::Geolocator`] traits, probed
//! once into [`probe::Capabilities`]. Widgets report results through an
//! [`eam_core::message::Reporter`] and never touch the draft themselves.

#![allow(async_fn_in_trait)]

pub mod barcode;
pub mod error;
pub mod image;
pub mod location;
pub mod media;
pub mod probe;

#[cfg(test)]
mod testing;

pub use barcode::BarcodeScanner;
pub use image::ImageCapture;
pub use location::LocationTracker;
pub use probe::{Capabilities, Unsupported, WidgetMode};
