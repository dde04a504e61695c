//! Location capture widget.

use std::{future::Future, time::Duration};

use chrono::Utc;
use eam_core::{
  capture::CapturedLocation,
  message::{FormMessage, Reporter},
  user::UserContext,
};
use strum::{Display, IntoStaticStr};

use crate::{
  error::{LocationError, PositionError},
  probe::{Capabilities, WidgetMode},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
  pub high_accuracy: bool,
  pub timeout:       Duration,
  /// Oldest cached fix the platform may return.
  pub maximum_age:   Duration,
}

impl PositionOptions {
  /// A fresh, high-accuracy fix within 10 seconds.
  pub const FRESH_HIGH_ACCURACY: Self = Self {
    high_accuracy: true,
    timeout:       Duration::from_secs(10),
    maximum_age:   Duration::ZERO,
  };
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
  pub latitude:  f64,
  pub longitude: f64,
  pub accuracy:  f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum PermissionState {
  Granted,
  Denied,
  Prompt,
}

pub trait Geolocator: Send + Sync {
  fn is_supported(&self) -> bool { true }

  /// Last known permission state, if the platform can tell.
  fn permission_state(&self) -> PermissionState { PermissionState::Prompt }

  fn current_position(
    &self,
    options: PositionOptions,
  ) -> impl Future<Output = Result<Position, PositionError>> + Send + '_;
}

// ─── Display helpers ─────────────────────────────────────────────────────────

/// Display bucket for a fix's accuracy radius. Has no bearing on whether the
/// fix is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum AccuracyLevel {
  Excellent,
  Good,
  Fair,
  Poor,
}

impl AccuracyLevel {
  pub fn of(accuracy_m: f64) -> Self {
    if accuracy_m < 10.0 {
      AccuracyLevel::Excellent
    } else if accuracy_m < 50.0 {
      AccuracyLevel::Good
    } else if accuracy_m < 100.0 {
      AccuracyLevel::Fair
    } else {
      AccuracyLevel::Poor
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
  Latitude,
  Longitude,
}

/// `12.345678° N` style. Non-finite values render as `N/A`.
pub fn format_coordinate(value: f64, axis: Axis) -> String {
  if !value.is_finite() {
    return "N/A".into();
  }
  let hemisphere = match (axis, value >= 0.0) {
    (Axis::Latitude, true) => 'N',
    (Axis::Latitude, false) => 'S',
    (Axis::Longitude, true) => 'E',
    (Axis::Longitude, false) => 'W',
  };
  format!("{:.6}° {hemisphere}", value.abs())
}

pub fn maps_url(location: &CapturedLocation) -> String {
  format!("https://www.google.com/maps?q={},{}", location.latitude, location.longitude)
}

// ─── Widget ──────────────────────────────────────────────────────────────────

pub struct LocationTracker<G: Geolocator> {
  geolocator: G,
  mode:       WidgetMode,
  reporter:   Reporter,
  role:       String,
  elevated:   bool,
  permission: PermissionState,
  error:      Option<&'static str>,
  options:    PositionOptions,
}

impl<G: Geolocator> LocationTracker<G> {
  pub fn new(geolocator: G, caps: &Capabilities, user: &UserContext, reporter: Reporter) -> Self {
    let permission = geolocator.permission_state();
    Self {
      geolocator,
      mode: caps.location_mode(),
      reporter,
      role: user.role.clone(),
      elevated: user.is_elevated(),
      permission,
      error: None,
      options: PositionOptions::FRESH_HIGH_ACCURACY,
    }
  }

  pub fn with_options(mut self, options: PositionOptions) -> Self {
    self.options = options;
    self
  }

  pub fn mode(&self) -> &WidgetMode { &self.mode }

  pub fn permission(&self) -> PermissionState { self.permission }

  /// Message from the last failed capture, cleared by the next attempt.
  pub fn error(&self) -> Option<&'static str> { self.error }

  /// Whether the user may trigger a capture given the fix already held.
  /// Once a fix is held only elevated roles may replace it.
  pub fn can_refresh(&self, current: Option<&CapturedLocation>) -> bool {
    current.is_none() || self.elevated
  }

  /// Capture a fix automatically if none is held yet.
  pub async fn mount(&mut self, current: Option<&CapturedLocation>) -> Option<CapturedLocation> {
    if current.is_some() {
      return None;
    }
    self.capture().await.ok()
  }

  /// User-triggered capture, subject to [`can_refresh`](Self::can_refresh).
  pub async fn refresh(
    &mut self,
    current: Option<&CapturedLocation>,
  ) -> Result<CapturedLocation, LocationError> {
    if !self.can_refresh(current) {
      return Err(LocationError::ReadOnly(self.role.clone()));
    }
    Ok(self.capture().await?)
  }

  /// Request one fix and report it. The platform timeout is also enforced
  /// here in case the platform ignores it.
  pub async fn capture(&mut self) -> Result<CapturedLocation, PositionError> {
    self.error = None;
    let result = match self.mode {
      WidgetMode::ManualFallback { .. } => Err(PositionError::Unsupported),
      WidgetMode::LiveCapture => {
        let request = self.geolocator.current_position(self.options);
        match tokio::time::timeout(self.options.timeout, request).await {
          Ok(result) => result,
          Err(_) => Err(PositionError::Timeout),
        }
      }
    };

    match result {
      Ok(position) => {
        let location = CapturedLocation {
          latitude:  position.latitude,
          longitude: position.longitude,
          accuracy:  position.accuracy,
          timestamp: Utc::now(),
        };
        tracing::debug!(
          accuracy = position.accuracy,
          level = %AccuracyLevel::of(position.accuracy),
          "location fix acquired"
        );
        self.permission = PermissionState::Granted;
        self.reporter.report(FormMessage::LocationCaptured(location));
        Ok(location)
      }
      Err(e) => {
        tracing::warn!(error = %e, "location capture failed");
        if e == PositionError::PermissionDenied {
          self.permission = PermissionState::Denied;
        }
        self.error = Some(e.user_message());
        Err(e)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;
  use crate::{probe::Unsupported, testing::FakeGeolocator};

  fn live() -> Capabilities {
    Capabilities { camera: false, barcode_detection: false, geolocation: true }
  }

  fn user(role: &str) -> UserContext {
    UserContext {
      user_name:     "John Smith".into(),
      role:          role.into(),
      location_name: "Warehouse A - North Wing".into(),
    }
  }

  fn recorder() -> (Reporter, Arc<Mutex<Vec<FormMessage>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    (Reporter::new(move |m| sink.lock().unwrap().push(m)), seen)
  }

  fn held() -> CapturedLocation {
    CapturedLocation { latitude: 1.0, longitude: 2.0, accuracy: 5.0, timestamp: Utc::now() }
  }

  #[test]
  fn accuracy_buckets() {
    assert_eq!(AccuracyLevel::of(3.0), AccuracyLevel::Excellent);
    assert_eq!(AccuracyLevel::of(10.0), AccuracyLevel::Good);
    assert_eq!(AccuracyLevel::of(49.9), AccuracyLevel::Good);
    assert_eq!(AccuracyLevel::of(99.0), AccuracyLevel::Fair);
    assert_eq!(AccuracyLevel::of(100.0), AccuracyLevel::Poor);
  }

  #[test]
  fn coordinates_format_with_hemisphere() {
    assert_eq!(format_coordinate(12.3456789, Axis::Latitude), "12.345679° N");
    assert_eq!(format_coordinate(-33.5, Axis::Latitude), "33.500000° S");
    assert_eq!(format_coordinate(-0.25, Axis::Longitude), "0.250000° W");
    assert_eq!(format_coordinate(f64::NAN, Axis::Longitude), "N/A");
  }

  #[test]
  fn maps_link() {
    let loc =
      CapturedLocation { latitude: 19.07, longitude: 72.87, accuracy: 1.0, timestamp: Utc::now() };
    assert_eq!(maps_url(&loc), "https://www.google.com/maps?q=19.07,72.87");
  }

  #[tokio::test]
  async fn mount_captures_only_when_nothing_is_held() {
    let geo = FakeGeolocator::at(19.07, 72.87, 12.0);
    let (reporter, seen) = recorder();
    let mut tracker =
      LocationTracker::new(geo.clone(), &live(), &user("Field Technician"), reporter);

    assert!(tracker.mount(Some(&held())).await.is_none());
    assert_eq!(geo.calls(), 0);

    let fix = tracker.mount(None).await.unwrap();
    assert_eq!(fix.latitude, 19.07);
    assert_eq!(geo.calls(), 1);
    assert!(matches!(
      seen.lock().unwrap().as_slice(),
      [FormMessage::LocationCaptured(l)] if l.accuracy == 12.0
    ));
  }

  #[tokio::test]
  async fn poor_accuracy_is_still_accepted() {
    let geo = FakeGeolocator::at(0.0, 0.0, 2500.0);
    let mut tracker = LocationTracker::new(geo, &live(), &user("Admin"), Reporter::discard());
    let fix = tracker.capture().await.unwrap();
    assert_eq!(AccuracyLevel::of(fix.accuracy), AccuracyLevel::Poor);
  }

  #[tokio::test]
  async fn permission_denied_updates_permission_state() {
    let geo = FakeGeolocator::failing(PositionError::PermissionDenied);
    let (reporter, seen) = recorder();
    let mut tracker = LocationTracker::new(geo, &live(), &user("Admin"), reporter);

    let err = tracker.capture().await.unwrap_err();

    assert_eq!(err, PositionError::PermissionDenied);
    assert_eq!(tracker.permission(), PermissionState::Denied);
    assert_eq!(tracker.error(), Some(PositionError::PermissionDenied.user_message()));
    assert!(seen.lock().unwrap().is_empty());
  }

  #[tokio::test]
  async fn each_failure_kind_has_its_own_message() {
    let kinds = [
      PositionError::PermissionDenied,
      PositionError::PositionUnavailable,
      PositionError::Timeout,
      PositionError::Unknown("boom".into()),
    ];
    let messages: std::collections::BTreeSet<&str> =
      kinds.iter().map(PositionError::user_message).collect();
    assert_eq!(messages.len(), kinds.len());

    let mut tracker = LocationTracker::new(
      FakeGeolocator::failing(PositionError::PositionUnavailable),
      &live(),
      &user("Admin"),
      Reporter::discard(),
    );
    tracker.capture().await.unwrap_err();
    assert_eq!(
      tracker.error(),
      Some("Location information unavailable. Please ensure GPS is enabled.")
    );
    assert_eq!(tracker.permission(), PermissionState::Prompt);
  }

  #[tokio::test]
  async fn slow_platform_times_out() {
    let geo = FakeGeolocator::at(1.0, 1.0, 1.0).slow(Duration::from_millis(200));
    let options = PositionOptions {
      timeout: Duration::from_millis(20),
      ..PositionOptions::FRESH_HIGH_ACCURACY
    };
    let mut tracker =
      LocationTracker::new(geo, &live(), &user("Admin"), Reporter::discard()).with_options(options);

    assert_eq!(tracker.capture().await, Err(PositionError::Timeout));
    assert_eq!(tracker.error(), Some("Location request timed out. Please try again."));
  }

  #[tokio::test]
  async fn refresh_is_gated_by_role_once_a_fix_is_held() {
    let geo = FakeGeolocator::at(1.0, 1.0, 1.0);
    let mut tech =
      LocationTracker::new(geo.clone(), &live(), &user("Field Technician"), Reporter::discard());
    let current = held();

    assert!(!tech.can_refresh(Some(&current)));
    let err = tech.refresh(Some(&current)).await.unwrap_err();
    assert!(matches!(err, LocationError::ReadOnly(_)));
    assert_eq!(geo.calls(), 0);

    assert!(tech.refresh(None).await.is_ok());

    let mut admin =
      LocationTracker::new(geo.clone(), &live(), &user("Super Admin"), Reporter::discard());
    assert!(admin.refresh(Some(&current)).await.is_ok());
    assert_eq!(geo.calls(), 2);
  }

  #[tokio::test]
  async fn unsupported_platform_reports_fallback_message() {
    let caps = Capabilities::probe(&Unsupported, &Unsupported, &Unsupported);
    let mut tracker = LocationTracker::new(Unsupported, &caps, &user("Admin"), Reporter::discard());
    assert_eq!(tracker.capture().await, Err(PositionError::Unsupported));
    assert_eq!(tracker.error(), Some("Geolocation is not supported on this device"));
  }
}
