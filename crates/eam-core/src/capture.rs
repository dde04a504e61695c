//! Capture artifacts attached to a draft: images and a GPS fix.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The most images a single record may carry.
pub const MAX_IMAGES: usize = 4;

/// Identifies a captured image. Allocated in creation order.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ImageId(u64);

impl ImageId {
  pub fn get(self) -> u64 { self.0 }
}

impl fmt::Display for ImageId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// An encoded image, held as a `data:` URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedImage {
  pub id:        ImageId,
  pub data:      String,
  pub timestamp: DateTime<Utc>,
}

/// A single position fix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapturedLocation {
  pub latitude:  f64,
  pub longitude: f64,
  /// Radius of the 95% confidence circle, in meters.
  pub accuracy:  f64,
  pub timestamp: DateTime<Utc>,
}

/// The ordered image collection of a draft. Never holds more than
/// [`MAX_IMAGES`] entries.
#[derive(Debug, Clone, Default)]
pub struct ImageSet {
  images:  Vec<CapturedImage>,
  next_id: u64,
}

impl ImageSet {
  pub fn new() -> Self { Self::default() }

  /// Append an image. Fails without changing the set when it is full.
  pub fn add(&mut self, data: String, timestamp: DateTime<Utc>) -> Result<ImageId> {
    if self.images.len() >= MAX_IMAGES {
      return Err(Error::ImageLimit(MAX_IMAGES));
    }
    self.next_id += 1;
    let id = ImageId(self.next_id);
    self.images.push(CapturedImage { id, data, timestamp });
    Ok(id)
  }

  pub fn remove(&mut self, id: ImageId) -> Result<CapturedImage> {
    let pos = self
      .images
      .iter()
      .position(|img| img.id == id)
      .ok_or(Error::ImageNotFound(id))?;
    Ok(self.images.remove(pos))
  }

  /// Drop every image. Ids keep increasing across clears.
  pub fn clear(&mut self) { self.images.clear(); }

  pub fn len(&self) -> usize { self.images.len() }

  pub fn is_empty(&self) -> bool { self.images.is_empty() }

  pub fn is_full(&self) -> bool { self.images.len() >= MAX_IMAGES }

  pub fn get(&self, index: usize) -> Option<&CapturedImage> { self.images.get(index) }

  pub fn iter(&self) -> impl Iterator<Item = &CapturedImage> { self.images.iter() }

  pub fn as_slice(&self) -> &[CapturedImage] { &self.images }
}
