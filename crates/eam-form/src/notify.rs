//! Transient user notifications.
//!
//! One notification is shown at a time; raising a new one replaces the old.
//! Each expires [`NOTIFICATION_TTL`] after it was raised.

use std::time::{Duration, Instant};

use strum::{Display, IntoStaticStr};

pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
  Success,
  Error,
  Warning,
  Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub kind:      NotificationKind,
  pub message:   String,
  pub raised_at: Instant,
}

impl Notification {
  pub fn is_expired(&self, now: Instant) -> bool {
    now.saturating_duration_since(self.raised_at) >= NOTIFICATION_TTL
  }
}

#[derive(Debug, Default)]
pub struct Notifier {
  current: Option<Notification>,
}

impl Notifier {
  pub fn raise(&mut self, kind: NotificationKind, message: impl Into<String>) {
    let message = message.into();
    tracing::debug!(%kind, %message, "notification");
    self.current = Some(Notification { kind, message, raised_at: Instant::now() });
  }

  /// The notification to show at `now`, if one is still live.
  pub fn active(&self, now: Instant) -> Option<&Notification> {
    self.current.as_ref().filter(|n| !n.is_expired(now))
  }

  /// The last notification raised, expired or not.
  pub fn latest(&self) -> Option<&Notification> { self.current.as_ref() }

  pub fn dismiss(&mut self) { self.current = None; }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn notification_expires_after_ttl() {
    let mut notifier = Notifier::default();
    notifier.raise(NotificationKind::Success, "Image captured");
    let raised = notifier.latest().unwrap().raised_at;

    assert!(notifier.active(raised + Duration::from_millis(2999)).is_some());
    assert!(notifier.active(raised + NOTIFICATION_TTL).is_none());
    assert!(notifier.latest().is_some());
  }

  #[test]
  fn newer_notification_replaces_older() {
    let mut notifier = Notifier::default();
    notifier.raise(NotificationKind::Success, "Image captured");
    notifier.raise(NotificationKind::Error, "Maximum 4 images allowed");
    let n = notifier.active(Instant::now()).unwrap();
    assert_eq!(n.kind, NotificationKind::Error);
    assert_eq!(n.message, "Maximum 4 images allowed");

    notifier.dismiss();
    assert!(notifier.latest().is_none());
  }
}
