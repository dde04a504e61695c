//! The form orchestrator.
//!
//! [`AssetForm`] owns the draft record, its images and location fix, and the
//! validation error set. Every change goes through a command method here:
//! field edits from the presentation layer, [`FormMessage`]s reported by the
//! capture widgets, and [`AssetForm::submit`].

use chrono::Utc;
use eam_core::{
  capture::{CapturedLocation, ImageSet, MAX_IMAGES},
  message::FormMessage,
  payload::SubmissionPayload,
  record::{AssetId, DraftAssetRecord, Field, FieldValue},
  reference::{AssetGroup, ReferenceData, SubCategory},
  sink::AssetSink,
  store::{DraftStore, OfflineQueue, QueuedPayload},
  user::UserContext,
  validate::{ValidationErrors, validate},
};
use strum::{Display, EnumString};

use crate::{
  Error, Result,
  connectivity::Connectivity,
  error::SubmitError,
  notify::{NotificationKind, Notifier},
};

pub const MSG_BARCODE_SCANNED: &str = "Barcode scanned successfully";
pub const MSG_IMAGE_CAPTURED: &str = "Image captured";
pub const MSG_IMAGE_LIMIT: &str = "Maximum 4 images allowed";
pub const MSG_LOCATION_CAPTURED: &str = "Location captured";
pub const MSG_FIX_ERRORS: &str = "Please fix validation errors";
pub const MSG_QUEUED: &str = "Saved offline. Will sync when online.";
pub const MSG_SAVED_NEXT: &str = "Asset saved! Ready for next.";
pub const MSG_SUBMITTED: &str = "Asset submitted for verification";
pub const MSG_SUBMIT_FAILED: &str = "Error submitting asset. Please try again.";
pub const MSG_DRAFT_SAVED: &str = "Draft saved locally";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum SubmitMode {
  Submit,
  /// Submit, then start the next record of a batch.
  SaveNext,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
  /// Accepted by the ingestion endpoint.
  Sent { asset_id: AssetId, message: Option<String> },
  /// Held in the offline queue, which now has `queue_len` entries.
  Queued { asset_id: AssetId, queue_len: usize },
}

pub struct AssetForm<S, L> {
  record:        DraftAssetRecord,
  images:        ImageSet,
  location:      Option<CapturedLocation>,
  errors:        ValidationErrors,
  reference:     ReferenceData,
  user:          UserContext,
  connectivity:  Connectivity,
  notifications: Notifier,
  sink:          S,
  local:         L,
}

impl<S, L> AssetForm<S, L>
where
  S: AssetSink,
  L: OfflineQueue + DraftStore,
{
  pub fn new(
    user: UserContext,
    reference: ReferenceData,
    connectivity: Connectivity,
    sink: S,
    local: L,
  ) -> Self {
    Self {
      record: DraftAssetRecord::new(),
      images: ImageSet::new(),
      location: None,
      errors: ValidationErrors::new(),
      reference,
      user,
      connectivity,
      notifications: Notifier::default(),
      sink,
      local,
    }
  }

  // ─── Accessors ──────────────────────────────────────────────────────────

  pub fn record(&self) -> &DraftAssetRecord { &self.record }

  pub fn images(&self) -> &ImageSet { &self.images }

  pub fn location(&self) -> Option<&CapturedLocation> { self.location.as_ref() }

  pub fn errors(&self) -> &ValidationErrors { &self.errors }

  pub fn reference(&self) -> &ReferenceData { &self.reference }

  pub fn user(&self) -> &UserContext { &self.user }

  pub fn is_online(&self) -> bool { self.connectivity.is_online() }

  pub fn notifications(&self) -> &Notifier { &self.notifications }

  pub fn notifications_mut(&mut self) -> &mut Notifier { &mut self.notifications }

  pub fn local_store(&self) -> &L { &self.local }

  // ─── Field edits ────────────────────────────────────────────────────────

  /// Write a field and drop its validation error. Only the value's shape is
  /// checked. A category or sub-category change also clears dependent
  /// selections that no longer belong to it.
  pub fn update_field(&mut self, field: Field, value: FieldValue) -> Result<()> {
    self.record.set(field, value)?;
    self.after_write(field);
    Ok(())
  }

  /// [`update_field`](Self::update_field) addressed by wire name with a raw
  /// string value, as typed into an input.
  pub fn update_field_raw(&mut self, name: &str, raw: &str) -> Result<()> {
    let field: Field =
      name.parse().map_err(|_| Error::Record(eam_core::Error::UnknownField(name.to_owned())))?;
    self.record.set_raw(field, raw)?;
    self.after_write(field);
    Ok(())
  }

  fn after_write(&mut self, field: Field) {
    self.errors.clear_field(field);
    match field {
      Field::Category => self.prune_sub_category(),
      Field::SubCategory => self.prune_asset_group(),
      _ => {}
    }
  }

  fn prune_sub_category(&mut self) {
    let class = &self.record.classification;
    if !class.sub_category.is_empty()
      && !self.reference.sub_category_belongs(&class.sub_category, &class.category)
    {
      tracing::debug!(sub_category = %class.sub_category, "clearing stale sub-category");
      self.record.classification.sub_category.clear();
    }
    self.prune_asset_group();
  }

  fn prune_asset_group(&mut self) {
    let class = &self.record.classification;
    if !class.asset_group.is_empty()
      && !self.reference.asset_group_belongs(&class.asset_group, &class.sub_category)
    {
      tracing::debug!(asset_group = %class.asset_group, "clearing stale asset group");
      self.record.classification.asset_group.clear();
    }
  }

  /// Sub-categories selectable under the current category.
  pub fn sub_category_options(&self) -> Vec<&SubCategory> {
    self.reference.sub_categories_for(&self.record.classification.category)
  }

  /// Asset groups selectable under the current sub-category.
  pub fn asset_group_options(&self) -> Vec<&AssetGroup> {
    self.reference.asset_groups_for(&self.record.classification.sub_category)
  }

  // ─── Widget reports ─────────────────────────────────────────────────────

  /// Apply a report from one of the capture widgets.
  pub fn apply(&mut self, message: FormMessage) {
    match message {
      FormMessage::BarcodeScanned(value) => {
        self.record.identification.barcode = value;
        self.errors.clear_field(Field::Barcode);
        self.notifications.raise(NotificationKind::Success, MSG_BARCODE_SCANNED);
      }
      FormMessage::ImageAdded(data) => match self.images.add(data, Utc::now()) {
        Ok(id) => {
          tracing::debug!(%id, count = self.images.len(), "image added");
          self.notifications.raise(NotificationKind::Success, MSG_IMAGE_CAPTURED);
        }
        Err(_) => {
          tracing::warn!(max = MAX_IMAGES, "image rejected, collection full");
          self.notifications.raise(NotificationKind::Error, MSG_IMAGE_LIMIT);
        }
      },
      FormMessage::ImageRemoved(id) => {
        if let Err(e) = self.images.remove(id) {
          tracing::warn!(error = %e, "image removal ignored");
        }
      }
      FormMessage::LocationCaptured(location) => {
        self.location = Some(location);
        self.notifications.raise(NotificationKind::Success, MSG_LOCATION_CAPTURED);
      }
    }
  }

  // ─── Validation & submission ────────────────────────────────────────────

  /// Recompute the error set. Returns whether the record is valid.
  pub fn validate(&mut self) -> bool {
    self.errors = validate(&self.record);
    self.errors.is_empty()
  }

  /// The payload the current state would submit, stamped now.
  pub fn payload(&self) -> SubmissionPayload {
    SubmissionPayload::assemble(
      &self.record,
      self.images.as_slice(),
      self.location.as_ref(),
      &self.user,
      Utc::now(),
    )
  }

  /// Validate, then queue the payload when offline or send it once when
  /// online. Only a successful send changes the form: the saved draft is
  /// cleared, and in [`SubmitMode::SaveNext`] the identification fields,
  /// images and location are reset for the next record.
  pub async fn submit(&mut self, mode: SubmitMode) -> Result<SubmitOutcome, SubmitError> {
    if !self.validate() {
      self.notifications.raise(NotificationKind::Error, MSG_FIX_ERRORS);
      return Err(SubmitError::Validation(self.errors.clone()));
    }

    let payload = self.payload();
    let asset_id = self.record.asset_id().clone();

    if !self.connectivity.is_online() {
      let entry = QueuedPayload { payload, queued_at: Utc::now() };
      return match self.local.append(entry).await {
        Ok(queue_len) => {
          tracing::info!(%asset_id, queue_len, "asset queued offline");
          self.notifications.raise(NotificationKind::Warning, MSG_QUEUED);
          Ok(SubmitOutcome::Queued { asset_id, queue_len })
        }
        Err(e) => {
          tracing::error!(%asset_id, error = %e, "failed to queue asset");
          self.notifications.raise(NotificationKind::Error, MSG_SUBMIT_FAILED);
          Err(SubmitError::Queue(Box::new(e)))
        }
      };
    }

    let response = match self.sink.submit(&payload).await {
      Ok(response) => response,
      Err(e) => {
        tracing::error!(%asset_id, error = %e, "asset submission failed");
        self.notifications.raise(NotificationKind::Error, MSG_SUBMIT_FAILED);
        return Err(e.into());
      }
    };
    tracing::info!(%asset_id, status = response.status, %mode, "asset submitted");

    if let Err(e) = self.local.clear_draft().await {
      tracing::warn!(error = %e, "failed to clear saved draft");
    }

    let message = match mode {
      SubmitMode::Submit => MSG_SUBMITTED,
      SubmitMode::SaveNext => {
        self.record.reset_identification();
        self.images.clear();
        self.location = None;
        MSG_SAVED_NEXT
      }
    };
    self.notifications.raise(NotificationKind::Success, message);

    Ok(SubmitOutcome::Sent { asset_id, message: response.message })
  }

  // ─── Draft ──────────────────────────────────────────────────────────────

  pub async fn save_draft(&mut self) -> Result<()> {
    self.local.save_draft(&self.record).await.map_err(|e| Error::Store(Box::new(e)))?;
    self.notifications.raise(NotificationKind::Success, MSG_DRAFT_SAVED);
    Ok(())
  }

  /// Replace the record with the saved draft, if there is one. Images and
  /// location are not part of a draft and are left alone.
  pub async fn restore_draft(&mut self) -> Result<bool> {
    let draft = self.local.load_draft().await.map_err(|e| Error::Store(Box::new(e)))?;
    match draft {
      Some(record) => {
        tracing::debug!(asset_id = %record.asset_id(), "draft restored");
        self.record = record;
        self.errors = ValidationErrors::new();
        Ok(true)
      }
      None => Ok(false),
    }
  }
}
