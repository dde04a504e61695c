//! Live online/offline state.
//!
//! The host pushes changes into a [`ConnectivityMonitor`]; the form holds a
//! [`Connectivity`] and reads the latest value at submission time. Nothing
//! polls.

use tokio::sync::watch;

/// A connected monitor/reader pair starting at `online`.
pub fn channel(online: bool) -> (ConnectivityMonitor, Connectivity) {
  let (tx, rx) = watch::channel(online);
  (ConnectivityMonitor(tx), Connectivity(rx))
}

/// Write side, owned by whatever observes the network.
#[derive(Debug)]
pub struct ConnectivityMonitor(watch::Sender<bool>);

impl ConnectivityMonitor {
  pub fn set_online(&self, online: bool) {
    let changed = self.0.send_if_modified(|current| {
      let changed = *current != online;
      *current = online;
      changed
    });
    if changed {
      tracing::info!(online, "connectivity changed");
    }
  }

  pub fn subscribe(&self) -> Connectivity { Connectivity(self.0.subscribe()) }
}

/// Read side. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Connectivity(watch::Receiver<bool>);

impl Connectivity {
  /// A reader stuck at `online`, for hosts without change notifications.
  pub fn fixed(online: bool) -> Self { channel(online).1 }

  pub fn is_online(&self) -> bool { *self.0.borrow() }

  /// Wait for the next change. `None` once the monitor is gone.
  pub async fn changed(&mut self) -> Option<bool> {
    self.0.changed().await.ok()?;
    Some(*self.0.borrow_and_update())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn readers_see_latest_state() {
    let (monitor, mut reader) = channel(true);
    assert!(reader.is_online());

    monitor.set_online(false);
    assert_eq!(reader.changed().await, Some(false));
    assert!(!reader.is_online());
    assert!(!monitor.subscribe().is_online());
  }

  #[tokio::test]
  async fn fixed_reader_never_changes() {
    let mut reader = Connectivity::fixed(false);
    assert!(!reader.is_online());
    assert_eq!(reader.changed().await, None);
  }
}
