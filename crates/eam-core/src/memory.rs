//! Process-local [`OfflineQueue`] and [`DraftStore`].
//!
//! Nothing survives a restart. Used when no durable store is configured, and
//! by tests.

use std::{convert::Infallible, sync::Mutex};

use crate::{
  record::DraftAssetRecord,
  store::{DraftStore, OfflineQueue, QueuedPayload},
};

#[derive(Debug, Default)]
pub struct MemoryStore {
  queue: Mutex<Vec<QueuedPayload>>,
  draft: Mutex<Option<DraftAssetRecord>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }
}

// A poisoned lock only means another caller panicked mid-push; the Vec
// itself is still consistent.
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
  m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl OfflineQueue for MemoryStore {
  type Error = Infallible;

  async fn append(&self, entry: QueuedPayload) -> Result<usize, Infallible> {
    let mut queue = lock(&self.queue);
    queue.push(entry);
    Ok(queue.len())
  }

  async fn queued(&self) -> Result<Vec<QueuedPayload>, Infallible> {
    Ok(lock(&self.queue).clone())
  }
}

impl DraftStore for MemoryStore {
  type Error = Infallible;

  async fn save_draft(&self, record: &DraftAssetRecord) -> Result<(), Infallible> {
    *lock(&self.draft) = Some(record.clone());
    Ok(())
  }

  async fn load_draft(&self) -> Result<Option<DraftAssetRecord>, Infallible> {
    Ok(lock(&self.draft).clone())
  }

  async fn clear_draft(&self) -> Result<(), Infallible> {
    *lock(&self.draft) = None;
    Ok(())
  }
}
