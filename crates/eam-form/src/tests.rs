use std::{
  sync::{Arc, Mutex},
  time::Instant,
};

use eam_core::{
  capture::CapturedLocation,
  memory::MemoryStore,
  message::FormMessage,
  payload::SubmissionPayload,
  record::{AssetType, Field},
  reference::ReferenceData,
  sink::{AssetSink, SinkError, SinkResponse},
  store::{DraftStore, OfflineQueue},
  user::UserContext,
};

use crate::{
  AssetForm, SubmitError, SubmitMode, SubmitOutcome,
  connectivity::{self, Connectivity, ConnectivityMonitor},
  form::*,
  notify::NotificationKind,
};

// ─── Fixtures ────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
struct FakeSink {
  sent: Arc<Mutex<Vec<SubmissionPayload>>>,
  fail: bool,
}

impl FakeSink {
  fn failing() -> Self { Self { fail: true, ..Self::default() } }

  fn sent(&self) -> Vec<SubmissionPayload> { self.sent.lock().unwrap().clone() }
}

impl AssetSink for FakeSink {
  async fn submit(&self, payload: &SubmissionPayload) -> Result<SinkResponse, SinkError> {
    self.sent.lock().unwrap().push(payload.clone());
    if self.fail {
      Err(SinkError::Status { status: 500, message: "Failed to save asset".into() })
    } else {
      Ok(SinkResponse { status: 201, message: Some("Asset saved successfully".into()) })
    }
  }
}

fn user() -> UserContext {
  UserContext {
    user_name:     "John Smith".into(),
    role:          "Field Technician".into(),
    location_name: "Warehouse A - North Wing".into(),
  }
}

fn form_with(sink: FakeSink, online: bool) -> (AssetForm<FakeSink, MemoryStore>, ConnectivityMonitor) {
  let (monitor, reader) = connectivity::channel(online);
  let form = AssetForm::new(user(), ReferenceData::builtin(), reader, sink, MemoryStore::new());
  (form, monitor)
}

fn fill_required(form: &mut AssetForm<FakeSink, MemoryStore>) {
  form.update_field(Field::Barcode, "8901234567890".into()).unwrap();
  form.update_field(Field::AssetName, "Dell Latitude 7420".into()).unwrap();
  form.update_field(Field::SerialNumber, "SN-42".into()).unwrap();
  form.update_field(Field::Category, "cat001".into()).unwrap();
}

fn location() -> CapturedLocation {
  CapturedLocation { latitude: 19.07, longitude: 72.87, accuracy: 8.0, timestamp: chrono::Utc::now() }
}

fn last_message(form: &AssetForm<FakeSink, MemoryStore>) -> (NotificationKind, String) {
  let n = form.notifications().latest().unwrap();
  (n.kind, n.message.clone())
}

// ─── Field edits ─────────────────────────────────────────────────────────────

#[test]
fn update_clears_only_that_fields_error() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  assert!(!form.validate());
  assert_eq!(form.errors().len(), 4);

  form.update_field(Field::Barcode, "X".into()).unwrap();

  assert!(!form.errors().contains(Field::Barcode));
  assert!(form.errors().contains(Field::AssetName));
  assert_eq!(form.errors().len(), 3);
}

#[test]
fn update_field_raw_resolves_wire_names() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  form.update_field_raw("assetType", "Non-IT").unwrap();
  form.update_field_raw("amcApplicable", "true").unwrap();
  assert_eq!(form.record().asset_type(), AssetType::NonIt);
  assert!(form.record().core.amc_applicable);

  assert!(form.update_field_raw("noSuchField", "x").is_err());
  assert!(form.update_field_raw("assetId", "AST-1").is_err());
}

#[test]
fn cascading_options_follow_selection() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  assert!(form.sub_category_options().is_empty());
  assert!(form.asset_group_options().is_empty());

  let category = form.reference().category_id("Computer & Peripherals").unwrap().to_owned();
  form.update_field(Field::Category, category.into()).unwrap();
  let names: Vec<&str> = form.sub_category_options().iter().map(|s| s.name.as_str()).collect();
  for expected in ["Laptops", "Desktop Computers", "Monitors", "Printers", "Scanners"] {
    assert!(names.contains(&expected), "{expected}");
  }
  assert!(!names.contains(&"Office Chairs"));

  form.update_field(Field::SubCategory, "sub001".into()).unwrap();
  assert!(form.asset_group_options().iter().all(|g| g.sub_category_id == "sub001"));
  assert_eq!(form.asset_group_options().len(), 3);
}

#[test]
fn unknown_category_has_no_sub_categories() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  form.update_field(Field::Category, "cat999".into()).unwrap();
  assert!(form.sub_category_options().is_empty());
}

#[test]
fn changing_category_clears_stale_dependents() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  form.update_field(Field::Category, "cat001".into()).unwrap();
  form.update_field(Field::SubCategory, "sub001".into()).unwrap();
  form.update_field(Field::AssetGroup, "grp001".into()).unwrap();

  form.update_field(Field::Category, "cat003".into()).unwrap();

  let class = &form.record().classification;
  assert_eq!(class.category, "cat003");
  assert_eq!(class.sub_category, "");
  assert_eq!(class.asset_group, "");
}

#[test]
fn compatible_dependents_survive_category_rewrite() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  form.update_field(Field::Category, "cat001".into()).unwrap();
  form.update_field(Field::SubCategory, "sub004".into()).unwrap();
  form.update_field(Field::AssetGroup, "grp009".into()).unwrap();

  form.update_field(Field::Category, "cat001".into()).unwrap();
  assert_eq!(form.record().classification.asset_group, "grp009");

  form.update_field(Field::SubCategory, "sub003".into()).unwrap();
  assert_eq!(form.record().classification.sub_category, "sub003");
  assert_eq!(form.record().classification.asset_group, "");
}

// ─── Widget reports ──────────────────────────────────────────────────────────

#[test]
fn scanned_barcode_fills_field_and_clears_error() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  form.validate();
  form.apply(FormMessage::BarcodeScanned("QR-77".into()));

  assert_eq!(form.record().text(Field::Barcode), Some("QR-77"));
  assert!(!form.errors().contains(Field::Barcode));
  assert_eq!(last_message(&form), (NotificationKind::Success, MSG_BARCODE_SCANNED.into()));
}

#[test]
fn fifth_image_is_rejected_with_notification() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  for i in 0..4 {
    form.apply(FormMessage::ImageAdded(format!("data:image/jpeg;base64,{i}")));
  }
  assert_eq!(last_message(&form).1, MSG_IMAGE_CAPTURED);
  let before: Vec<String> = form.images().iter().map(|i| i.data.clone()).collect();

  form.apply(FormMessage::ImageAdded("data:image/jpeg;base64,extra".into()));

  let after: Vec<String> = form.images().iter().map(|i| i.data.clone()).collect();
  assert_eq!(after, before);
  assert_eq!(form.images().len(), 4);
  assert_eq!(last_message(&form), (NotificationKind::Error, MSG_IMAGE_LIMIT.into()));
}

#[test]
fn removing_an_image_drops_only_that_one() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  form.apply(FormMessage::ImageAdded("data:a".into()));
  form.apply(FormMessage::ImageAdded("data:b".into()));
  let first = form.images().get(0).unwrap().id;

  form.apply(FormMessage::ImageRemoved(first));

  assert_eq!(form.images().len(), 1);
  assert_eq!(form.images().get(0).unwrap().data, "data:b");

  form.apply(FormMessage::ImageRemoved(first));
  assert_eq!(form.images().len(), 1);
}

#[test]
fn new_location_overwrites_previous() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  form.apply(FormMessage::LocationCaptured(location()));
  let mut second = location();
  second.accuracy = 120.0;
  form.apply(FormMessage::LocationCaptured(second));

  assert_eq!(form.location().unwrap().accuracy, 120.0);
  assert_eq!(last_message(&form).1, MSG_LOCATION_CAPTURED);
}

// ─── Submission ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn each_missing_required_field_blocks_submission() {
  for missing in [Field::Barcode, Field::AssetName, Field::SerialNumber, Field::Category] {
    let sink = FakeSink::default();
    let (mut form, _m) = form_with(sink.clone(), true);
    fill_required(&mut form);
    form.update_field(missing, "".into()).unwrap();

    let err = form.submit(SubmitMode::Submit).await.unwrap_err();

    match err {
      SubmitError::Validation(errors) => {
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec![missing]);
      }
      other => panic!("unexpected {other:?}"),
    }
    assert!(sink.sent().is_empty());
    assert!(form.local_store().queued().await.unwrap().is_empty());
    assert_eq!(last_message(&form), (NotificationKind::Error, MSG_FIX_ERRORS.into()));
  }
}

#[tokio::test]
async fn offline_submission_appends_to_queue_without_network() {
  let sink = FakeSink::default();
  let (mut form, monitor) = form_with(sink.clone(), true);
  monitor.set_online(false);
  fill_required(&mut form);
  form.apply(FormMessage::ImageAdded("data:a".into()));

  let first = form.submit(SubmitMode::SaveNext).await.unwrap();
  assert!(matches!(first, SubmitOutcome::Queued { queue_len: 1, .. }));

  form.update_field(Field::Barcode, "second".into()).unwrap();
  let second = form.submit(SubmitMode::Submit).await.unwrap();
  assert!(matches!(second, SubmitOutcome::Queued { queue_len: 2, .. }));

  assert!(sink.sent().is_empty());
  let queued = form.local_store().queued().await.unwrap();
  let barcodes: Vec<&str> =
    queued.iter().map(|q| q.payload.asset_identification.barcode.as_str()).collect();
  assert_eq!(barcodes, vec!["8901234567890", "second"]);

  // Queuing never resets the form.
  assert_eq!(form.images().len(), 1);
  assert_eq!(form.record().text(Field::AssetName), Some("Dell Latitude 7420"));
  assert_eq!(last_message(&form), (NotificationKind::Warning, MSG_QUEUED.into()));
}

#[tokio::test]
async fn queued_entries_carry_queued_at() {
  let (mut form, _m) = form_with(FakeSink::default(), false);
  fill_required(&mut form);
  form.submit(SubmitMode::Submit).await.unwrap();

  let queued = form.local_store().queued().await.unwrap();
  let json = serde_json::to_value(&queued[0]).unwrap();
  assert!(json["queuedAt"].is_string());
  assert_eq!(json["assetIdentification"]["serialNumber"], "SN-42");
}

#[tokio::test]
async fn online_failure_leaves_state_untouched() {
  let sink = FakeSink::failing();
  let (mut form, _m) = form_with(sink.clone(), true);
  fill_required(&mut form);
  form.apply(FormMessage::ImageAdded("data:a".into()));
  form.apply(FormMessage::LocationCaptured(location()));
  form.save_draft().await.unwrap();
  let record_before = form.record().clone();

  let err = form.submit(SubmitMode::SaveNext).await.unwrap_err();

  assert!(matches!(err, SubmitError::Sink(SinkError::Status { status: 500, .. })));
  assert_eq!(sink.sent().len(), 1);
  assert_eq!(form.record(), &record_before);
  assert_eq!(form.images().len(), 1);
  assert!(form.location().is_some());
  assert!(form.local_store().load_draft().await.unwrap().is_some());
  assert_eq!(last_message(&form), (NotificationKind::Error, MSG_SUBMIT_FAILED.into()));
}

#[tokio::test]
async fn save_next_resets_identification_only() {
  let sink = FakeSink::default();
  let (mut form, _m) = form_with(sink.clone(), true);
  fill_required(&mut form);
  form.update_field(Field::Department, "dept001".into()).unwrap();
  form.update_field(Field::Location, "loc002".into()).unwrap();
  form.apply(FormMessage::ImageAdded("data:a".into()));
  form.apply(FormMessage::LocationCaptured(location()));
  form.save_draft().await.unwrap();
  let old_id = form.record().asset_id().clone();

  let outcome = form.submit(SubmitMode::SaveNext).await.unwrap();

  assert_eq!(
    outcome,
    SubmitOutcome::Sent { asset_id: old_id.clone(), message: Some("Asset saved successfully".into()) }
  );
  let record = form.record();
  assert_ne!(record.asset_id(), &old_id);
  assert!(record.asset_id().as_str().starts_with("AST-"));
  assert_eq!(record.text(Field::Barcode), Some(""));
  assert_eq!(record.text(Field::AssetName), Some(""));
  assert_eq!(record.text(Field::SerialNumber), Some(""));
  assert_eq!(record.text(Field::Category), Some("cat001"));
  assert_eq!(record.text(Field::Department), Some("dept001"));
  assert_eq!(record.text(Field::Location), Some("loc002"));
  assert!(form.images().is_empty());
  assert!(form.location().is_none());
  assert!(form.local_store().load_draft().await.unwrap().is_none());
  assert_eq!(last_message(&form), (NotificationKind::Success, MSG_SAVED_NEXT.into()));

  let sent = sink.sent();
  assert_eq!(sent.len(), 1);
  assert_eq!(sent[0].asset_identification.asset_id, old_id.as_str());
  assert_eq!(sent[0].images.len(), 1);
  assert!(sent[0].metadata.gps_coordinates.is_some());
}

#[tokio::test]
async fn plain_submit_keeps_the_record() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  fill_required(&mut form);
  form.apply(FormMessage::ImageAdded("data:a".into()));
  let before = form.record().clone();

  form.submit(SubmitMode::Submit).await.unwrap();

  assert_eq!(form.record(), &before);
  assert_eq!(form.images().len(), 1);
  assert_eq!(last_message(&form), (NotificationKind::Success, MSG_SUBMITTED.into()));
}

#[tokio::test]
async fn connectivity_is_read_at_submission_time() {
  let sink = FakeSink::default();
  let (mut form, monitor) = form_with(sink.clone(), false);
  fill_required(&mut form);

  monitor.set_online(true);
  form.submit(SubmitMode::Submit).await.unwrap();

  assert_eq!(sink.sent().len(), 1);
  assert!(form.local_store().queued().await.unwrap().is_empty());
}

#[tokio::test]
async fn fixed_connectivity_reader_works_without_monitor() {
  let form = AssetForm::new(
    user(),
    ReferenceData::builtin(),
    Connectivity::fixed(false),
    FakeSink::default(),
    MemoryStore::new(),
  );
  assert!(!form.is_online());
}

// ─── Drafts & notifications ──────────────────────────────────────────────────

#[tokio::test]
async fn draft_round_trip() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  fill_required(&mut form);
  form.save_draft().await.unwrap();
  assert_eq!(last_message(&form).1, MSG_DRAFT_SAVED);
  let saved = form.record().clone();

  let (mut fresh, _m2) = form_with(FakeSink::default(), true);
  assert!(!fresh.restore_draft().await.unwrap());

  fresh.local_store().save_draft(&saved).await.unwrap();
  assert!(fresh.restore_draft().await.unwrap());
  assert_eq!(fresh.record(), &saved);
}

#[test]
fn notifications_expire() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  form.apply(FormMessage::BarcodeScanned("X".into()));
  let raised = form.notifications().latest().unwrap().raised_at;
  assert!(form.notifications().active(raised).is_some());
  assert!(form.notifications().active(raised + std::time::Duration::from_secs(3)).is_none());

  form.notifications_mut().dismiss();
  assert!(form.notifications().active(Instant::now()).is_none());
}

#[tokio::test]
async fn payload_carries_user_context() {
  let (mut form, _m) = form_with(FakeSink::default(), true);
  fill_required(&mut form);
  let payload = form.payload();
  assert_eq!(payload.metadata.captured_by, "John Smith");
  assert_eq!(payload.metadata.captured_at_location, "Warehouse A - North Wing");
  assert!(payload.metadata.gps_coordinates.is_none());
}
