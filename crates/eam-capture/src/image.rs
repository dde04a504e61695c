//! Image capture widget.
//!
//! Four labelled slots, each filled from a live camera snapshot or from an
//! uploaded file. Labels are guidance only: any slot takes any picture. The
//! widget reports new and removed images upward; enforcing the image cap is
//! the form's job.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use eam_core::{
  capture::{ImageId, MAX_IMAGES},
  message::{FormMessage, Reporter},
};

use crate::{
  error::{CameraError, UploadError},
  media::{Camera, MediaStream, StreamGuard, VideoConstraints},
  probe::{Capabilities, WidgetMode},
};

/// JPEG quality used for camera snapshots.
pub const JPEG_QUALITY: f32 = 0.8;

/// Largest file accepted by [`ImageCapture::upload`].
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

pub const CAMERA_UNAVAILABLE: &str =
  "Unable to access camera. Please check permissions or use file upload.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSlot {
  pub label: &'static str,
  pub icon:  &'static str,
}

pub const IMAGE_SLOTS: [ImageSlot; MAX_IMAGES] = [
  ImageSlot { label: "Front View", icon: "🎯" },
  ImageSlot { label: "Serial Plate", icon: "🏷️" },
  ImageSlot { label: "Location Context", icon: "📍" },
  ImageSlot { label: "Additional/Damage", icon: "🔍" },
];

/// Label for the slot at `index` (0-based).
pub fn slot_label(index: usize) -> String {
  IMAGE_SLOTS
    .get(index)
    .map_or_else(|| format!("Image {}", index + 1), |s| s.label.to_owned())
}

pub fn slot_icon(index: usize) -> &'static str { IMAGE_SLOTS.get(index).map_or("📷", |s| s.icon) }

/// Encode `bytes` as a base64 `data:` URL.
pub fn data_url(mime_type: &str, bytes: &[u8]) -> String {
  format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// A user-selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
  pub name:      String,
  /// Declared type, e.g. `image/png`.
  pub mime_type: String,
  pub bytes:     Vec<u8>,
}

impl UploadedFile {
  /// Read a file from disk, declaring its type from the extension.
  pub async fn read(path: &Path) -> Result<Self, UploadError> {
    let bytes = tokio::fs::read(path).await?;
    Ok(Self {
      name: path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
      mime_type: mime_from_extension(path).to_owned(),
      bytes,
    })
  }
}

pub fn mime_from_extension(path: &Path) -> &'static str {
  let ext = path.extension().map(|e| e.to_string_lossy().to_ascii_lowercase());
  match ext.as_deref() {
    Some("jpg" | "jpeg") => "image/jpeg",
    Some("png") => "image/png",
    Some("gif") => "image/gif",
    Some("webp") => "image/webp",
    Some("bmp") => "image/bmp",
    Some("heic") => "image/heic",
    _ => "application/octet-stream",
  }
}

struct CameraSession<S: MediaStream> {
  slot:   usize,
  stream: StreamGuard<S>,
}

pub struct ImageCapture<C: Camera> {
  camera:   C,
  mode:     WidgetMode,
  reporter: Reporter,
  session:  Option<CameraSession<C::Stream>>,
}

impl<C: Camera> ImageCapture<C> {
  pub fn new(camera: C, caps: &Capabilities, reporter: Reporter) -> Self {
    Self { camera, mode: caps.image_mode(), reporter, session: None }
  }

  pub fn mode(&self) -> &WidgetMode { &self.mode }

  pub fn is_camera_open(&self) -> bool { self.session.is_some() }

  /// Slot the open camera session was started for.
  pub fn active_slot(&self) -> Option<usize> { self.session.as_ref().map(|s| s.slot) }

  /// Open the camera for `slot`. Any previous session is released first.
  pub async fn open_camera(&mut self, slot: usize) -> Result<(), CameraError> {
    self.session = None;
    if let WidgetMode::ManualFallback { .. } = self.mode {
      return Err(CameraError::NotFound);
    }

    match self.camera.open(VideoConstraints::PHOTO).await {
      Ok(stream) => {
        tracing::debug!(slot, "image camera opened");
        self.session = Some(CameraSession { slot, stream: StreamGuard::new(stream) });
        Ok(())
      }
      Err(e) => {
        tracing::warn!(error = %e, slot, "image camera unavailable");
        Err(e)
      }
    }
  }

  /// Snapshot the open camera, report the image and release the camera.
  /// The session is released even when encoding fails.
  pub async fn capture(&mut self) -> Result<String, CameraError> {
    let mut session = self.session.take().ok_or(CameraError::NotOpen)?;
    let jpeg = session.stream.snapshot_jpeg(JPEG_QUALITY).await?;
    drop(session);

    let url = data_url("image/jpeg", &jpeg);
    self.reporter.report(FormMessage::ImageAdded(url.clone()));
    Ok(url)
  }

  pub fn close_camera(&mut self) { self.session = None; }

  /// Accept an uploaded file. Non-image types and files over
  /// [`MAX_UPLOAD_BYTES`] are rejected without reporting anything.
  pub fn upload(&self, file: UploadedFile) -> Result<String, UploadError> {
    if !file.mime_type.starts_with("image/") {
      return Err(UploadError::NotAnImage(file.mime_type));
    }
    let size = file.bytes.len() as u64;
    if size > MAX_UPLOAD_BYTES {
      return Err(UploadError::TooLarge(size));
    }

    tracing::debug!(name = %file.name, size, "image uploaded");
    let url = data_url(&file.mime_type, &file.bytes);
    self.reporter.report(FormMessage::ImageAdded(url.clone()));
    Ok(url)
  }

  pub fn remove(&self, id: ImageId) { self.reporter.report(FormMessage::ImageRemoved(id)); }
}
