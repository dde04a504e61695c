//! Camera access.
//!
//! A [`Camera`] opens a [`MediaStream`]; the widgets never hold a bare stream,
//! only a [`StreamGuard`], which stops the stream when dropped. Closing a
//! widget, resolving a scan, an error return and a cancelled future all
//! release the camera the same way: by dropping the guard.

use std::{
  future::Future,
  ops::{Deref, DerefMut},
};

use crate::error::CameraError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
  /// The rear camera on a handheld device.
  Environment,
  User,
}

/// Requested stream shape. Width and height are ideals, not minimums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
  pub facing: FacingMode,
  pub width:  u32,
  pub height: u32,
}

impl VideoConstraints {
  pub const PHOTO: Self = Self { facing: FacingMode::Environment, width: 1920, height: 1080 };
  pub const SCANNER: Self = Self { facing: FacingMode::Environment, width: 1280, height: 720 };
}

/// One RGBA video frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
  pub width:  u32,
  pub height: u32,
  pub pixels: Vec<u8>,
}

pub trait Camera: Send + Sync {
  type Stream: MediaStream;

  /// Whether the platform exposes a camera API at all. A `true` here does not
  /// mean [`Camera::open`] will succeed.
  fn is_available(&self) -> bool { true }

  fn open(
    &self,
    constraints: VideoConstraints,
  ) -> impl Future<Output = Result<Self::Stream, CameraError>> + Send + '_;
}

pub trait MediaStream: Send {
  /// The current frame, or `None` while the stream has not buffered enough
  /// data to produce one.
  fn frame(&mut self) -> Option<Frame>;

  /// Encode the current frame as JPEG at `quality` (0.0 to 1.0).
  fn snapshot_jpeg(
    &mut self,
    quality: f32,
  ) -> impl Future<Output = Result<Vec<u8>, CameraError>> + Send + '_;

  /// Stop every track of the stream. Must be idempotent.
  fn stop(&mut self);
}

// ─── Guard ───────────────────────────────────────────────────────────────────

/// Owns an open stream and stops it on drop.
#[derive(Debug)]
pub struct StreamGuard<S: MediaStream> {
  stream: S,
}

impl<S: MediaStream> StreamGuard<S> {
  pub fn new(stream: S) -> Self { Self { stream } }
}

impl<S: MediaStream> Deref for StreamGuard<S> {
  type Target = S;

  fn deref(&self) -> &S { &self.stream }
}

impl<S: MediaStream> DerefMut for StreamGuard<S> {
  fn deref_mut(&mut self) -> &mut S { &mut self.stream }
}

impl<S: MediaStream> Drop for StreamGuard<S> {
  fn drop(&mut self) {
    self.stream.stop();
    tracing::debug!("camera stream released");
  }
}

// ─── No camera ───────────────────────────────────────────────────────────────

/// Stream type of platforms without a camera. Cannot be constructed.
#[derive(Debug)]
pub enum NoStream {}

impl MediaStream for NoStream {
  fn frame(&mut self) -> Option<Frame> { match *self {} }

  async fn snapshot_jpeg(&mut self, _quality: f32) -> Result<Vec<u8>, CameraError> {
    match *self {}
  }

  fn stop(&mut self) { match *self {} }
}
