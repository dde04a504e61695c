//! Fakes for the platform traits, shared by the widget tests.

use std::sync::{
  Arc, Mutex,
  atomic::{AtomicUsize, Ordering},
};

use crate::{
  barcode::{BarcodeDetector, DetectedBarcode, Symbology},
  error::{CameraError, DetectError, PositionError},
  location::{Geolocator, Position, PositionOptions},
  media::{Camera, Frame, MediaStream, VideoConstraints},
};

#[derive(Clone)]
pub struct FakeCamera {
  open_result: Result<(), CameraError>,
  warmup:      usize,
  jpeg:        Vec<u8>,
  opens:       Arc<AtomicUsize>,
  stops:       Arc<AtomicUsize>,
  last:        Arc<Mutex<Option<VideoConstraints>>>,
}

impl FakeCamera {
  pub fn ready() -> Self {
    Self {
      open_result: Ok(()),
      warmup:      0,
      jpeg:        vec![0xFF, 0xD8, 0xFF, 0xD9],
      opens:       Arc::default(),
      stops:       Arc::default(),
      last:        Arc::default(),
    }
  }

  /// A camera whose streams yield no frame for the first `frames` polls.
  pub fn warming_up(frames: usize) -> Self { Self { warmup: frames, ..Self::ready() } }

  pub fn failing(err: CameraError) -> Self { Self { open_result: Err(err), ..Self::ready() } }

  pub fn opens(&self) -> usize { self.opens.load(Ordering::SeqCst) }

  pub fn stops(&self) -> usize { self.stops.load(Ordering::SeqCst) }

  pub fn last_constraints(&self) -> Option<VideoConstraints> { *self.last.lock().unwrap() }
}

impl Camera for FakeCamera {
  type Stream = FakeStream;

  async fn open(&self, constraints: VideoConstraints) -> Result<FakeStream, CameraError> {
    *self.last.lock().unwrap() = Some(constraints);
    self.open_result.clone()?;
    self.opens.fetch_add(1, Ordering::SeqCst);
    Ok(FakeStream {
      warmup:  self.warmup,
      jpeg:    self.jpeg.clone(),
      stops:   self.stops.clone(),
      stopped: false,
    })
  }
}

pub struct FakeStream {
  warmup:  usize,
  jpeg:    Vec<u8>,
  stops:   Arc<AtomicUsize>,
  stopped: bool,
}

impl MediaStream for FakeStream {
  fn frame(&mut self) -> Option<Frame> {
    if self.warmup > 0 {
      self.warmup -= 1;
      return None;
    }
    Some(Frame { width: 2, height: 1, pixels: vec![0; 8] })
  }

  async fn snapshot_jpeg(&mut self, _quality: f32) -> Result<Vec<u8>, CameraError> {
    Ok(self.jpeg.clone())
  }

  fn stop(&mut self) {
    if !self.stopped {
      self.stopped = true;
      self.stops.fetch_add(1, Ordering::SeqCst);
    }
  }
}

#[derive(Clone)]
pub struct FakeDetector {
  value:       Option<String>,
  empty_calls: usize,
  error_calls: usize,
  calls:       Arc<AtomicUsize>,
}

impl FakeDetector {
  /// Finds `value` on the call after `empty` fruitless ones.
  pub fn finds_after(empty: usize, value: &str) -> Self {
    Self {
      value:       Some(value.into()),
      empty_calls: empty,
      error_calls: 0,
      calls:       Arc::default(),
    }
  }

  pub fn never() -> Self {
    Self { value: None, empty_calls: 0, error_calls: 0, calls: Arc::default() }
  }

  /// The first `n` calls fail outright.
  pub fn failing_first(self, n: usize) -> Self { Self { error_calls: n, ..self } }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl BarcodeDetector for FakeDetector {
  async fn detect(&self, _frame: &Frame) -> Result<Vec<DetectedBarcode>, DetectError> {
    let call = self.calls.fetch_add(1, Ordering::SeqCst);
    if call < self.error_calls {
      return Err(DetectError("decoder busy".into()));
    }
    match &self.value {
      Some(value) if call >= self.empty_calls => {
        Ok(vec![DetectedBarcode { raw_value: value.clone(), format: Symbology::Ean13 }])
      }
      _ => Ok(Vec::new()),
    }
  }
}

#[derive(Clone)]
pub struct FakeGeolocator {
  result: Result<Position, PositionError>,
  delay:  Option<std::time::Duration>,
  calls:  Arc<AtomicUsize>,
}

impl FakeGeolocator {
  pub fn at(latitude: f64, longitude: f64, accuracy: f64) -> Self {
    Self {
      result: Ok(Position { latitude, longitude, accuracy }),
      delay:  None,
      calls:  Arc::default(),
    }
  }

  pub fn failing(err: PositionError) -> Self {
    Self { result: Err(err), delay: None, calls: Arc::default() }
  }

  /// Answers only after `delay`.
  pub fn slow(self, delay: std::time::Duration) -> Self { Self { delay: Some(delay), ..self } }

  pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

impl Geolocator for FakeGeolocator {
  async fn current_position(&self, _options: PositionOptions) -> Result<Position, PositionError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if let Some(delay) = self.delay {
      tokio::time::sleep(delay).await;
    }
    self.result.clone()
  }
}
