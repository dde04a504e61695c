//! Application state machine and event dispatcher.

use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use eam_capture::{
  BarcodeScanner, ImageCapture, LocationTracker, Unsupported,
  error::{LocationError, ScanError},
  image::UploadedFile,
};
use eam_core::{
  message::FormMessage,
  record::{AssetStatus, AssetType, Field, FieldKind, FieldValue, VerificationStatus},
  reference::{OPERATING_SYSTEMS, OptionItem, VERIFICATION_CYCLES},
  sink::AssetSink,
  store::{DraftStore, OfflineQueue},
};
use eam_form::{AssetForm, SubmitError, SubmitMode, SubmitOutcome, connectivity::ConnectivityMonitor};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use strum::IntoEnumIterator;
use tokio::sync::mpsc;

use crate::platform::FixedGeolocator;

// ─── Screen ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
  /// Moving between fields.
  Form,
  /// Typing into a free-text field.
  Edit(Field),
  /// Choosing from a field's option list.
  Pick(Field),
  /// Typing a barcode by hand.
  Scan,
  /// Typing the path of an image file.
  Upload,
}

/// One entry of a picker: the stored value and what the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
  pub value: String,
  pub label: String,
}

impl Choice {
  fn same(s: &str) -> Self { Self { value: s.to_owned(), label: s.to_owned() } }
}

impl From<&OptionItem> for Choice {
  fn from(item: &OptionItem) -> Self { Self { value: item.id.clone(), label: item.name.clone() } }
}

/// The capture widgets a terminal can drive.
pub struct Widgets {
  pub scanner: BarcodeScanner<Unsupported, Unsupported>,
  pub images:  ImageCapture<Unsupported>,
  pub locator: LocationTracker<FixedGeolocator>,
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub struct App<S, L> {
  /// Current screen / keyboard focus.
  pub screen: Screen,

  pub form: AssetForm<S, L>,

  pub widgets: Widgets,

  /// Drives the form's connectivity flag (`o` toggles it).
  monitor: ConnectivityMonitor,

  /// Reports from the widgets, applied to the form after every key.
  inbox: mpsc::UnboundedReceiver<FormMessage>,

  /// Cursor position within [`App::visible_fields`].
  pub cursor: usize,

  /// Text being typed on the `Edit`, `Pick`, `Scan` and `Upload` screens.
  pub input: String,

  /// Cursor within the filtered picker list.
  pub picker_cursor: usize,

  /// Selected image, for removal.
  pub image_cursor: usize,

  /// Entries waiting in the offline queue.
  pub queue_len: usize,

  /// One-line status message shown in the status bar.
  pub status_msg: String,
}

impl<S, L> App<S, L>
where
  S: AssetSink,
  L: OfflineQueue + DraftStore,
{
  pub fn new(
    form: AssetForm<S, L>,
    widgets: Widgets,
    monitor: ConnectivityMonitor,
    inbox: mpsc::UnboundedReceiver<FormMessage>,
  ) -> Self {
    Self {
      screen: Screen::Form,
      form,
      widgets,
      monitor,
      inbox,
      cursor: 0,
      input: String::new(),
      picker_cursor: 0,
      image_cursor: 0,
      queue_len: 0,
      status_msg: String::new(),
    }
  }

  // ── Startup ───────────────────────────────────────────────────────────────

  /// Restore a saved draft, count the offline queue and take the initial
  /// location fix.
  pub async fn mount(&mut self) {
    match self.form.restore_draft().await {
      Ok(true) => self.status_msg = "Restored saved draft".into(),
      Ok(false) => {}
      Err(e) => self.status_msg = format!("Error: {e}"),
    }

    match self.form.local_store().queued().await {
      Ok(queued) => self.queue_len = queued.len(),
      Err(e) => tracing::warn!(error = %e, "could not read offline queue"),
    }

    let current = self.form.location().copied();
    self.widgets.locator.mount(current.as_ref()).await;
    self.pump();
  }

  /// Apply every pending widget report to the form.
  pub fn pump(&mut self) {
    while let Ok(message) = self.inbox.try_recv() {
      self.form.apply(message);
    }
  }

  // ── Fields ────────────────────────────────────────────────────────────────

  /// Fields shown for the current asset type, in form order.
  pub fn visible_fields(&self) -> Vec<Field> {
    let asset_type = self.form.record().asset_type();
    Field::iter()
      .filter(|f| f.applies_to().is_none_or(|t| t == asset_type))
      .collect()
  }

  pub fn cursor_field(&self) -> Option<Field> { self.visible_fields().get(self.cursor).copied() }

  /// The option list behind `field`, or `None` for free-text fields.
  pub fn choices(&self, field: Field) -> Option<Vec<Choice>> {
    let reference = self.form.reference();
    let items = |list: &[OptionItem]| -> Vec<Choice> { list.iter().map(Choice::from).collect() };
    let choices: Vec<Choice> = match field {
      Field::AssetType => AssetType::iter().map(|t| Choice::same(&t.to_string())).collect(),
      Field::AssetStatus => AssetStatus::iter().map(|s| Choice::same(&s.to_string())).collect(),
      Field::VerificationStatus => {
        VerificationStatus::iter().map(|s| Choice::same(&s.to_string())).collect()
      }
      Field::AccountHead => items(&reference.account_heads),
      Field::Category => items(&reference.categories),
      Field::SubCategory => self
        .form
        .sub_category_options()
        .into_iter()
        .map(|s| Choice { value: s.id.clone(), label: s.name.clone() })
        .collect(),
      Field::AssetGroup => self
        .form
        .asset_group_options()
        .into_iter()
        .map(|g| Choice { value: g.id.clone(), label: g.name.clone() })
        .collect(),
      Field::AssetModel => items(&reference.asset_models),
      Field::Manufacturer => items(&reference.manufacturers),
      Field::Department => items(&reference.departments),
      Field::CostCenter => items(&reference.cost_centers),
      Field::Location => items(&reference.locations),
      Field::Os => OPERATING_SYSTEMS.iter().map(|s| Choice::same(s)).collect(),
      Field::VerificationCycle => VERIFICATION_CYCLES.iter().map(|s| Choice::same(s)).collect(),
      _ => return None,
    };
    Some(choices)
  }

  /// Choices of `field` matching the typed filter, best match first.
  pub fn filtered_choices(&self, field: Field) -> Vec<Choice> {
    let all = self.choices(field).unwrap_or_default();
    if self.input.is_empty() {
      return all;
    }
    let matcher = SkimMatcherV2::default();
    let mut scored: Vec<(i64, Choice)> = all
      .into_iter()
      .filter_map(|c| matcher.fuzzy_match(&c.label, &self.input).map(|score| (score, c)))
      .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, c)| c).collect()
  }

  /// The value of `field` as shown in the form: option labels instead of
  /// keys, `Yes`/`No` for flags.
  pub fn display_value(&self, field: Field) -> String {
    let value = self.form.record().get(field);
    if let FieldValue::Flag(on) = value {
      return if on { "Yes".into() } else { "No".into() };
    }
    let raw = value.display();
    self
      .choices(field)
      .and_then(|cs| cs.into_iter().find(|c| c.value == raw))
      .map_or(raw, |c| c.label)
  }

  // ── Key handling ──────────────────────────────────────────────────────────

  /// Process a key event. Returns `true` to continue, `false` to quit.
  pub async fn handle_key(&mut self, key: KeyEvent) -> anyhow::Result<bool> {
    // Global: Ctrl-C quits from anywhere.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
      return Ok(false);
    }

    let cont = match self.screen {
      Screen::Form => self.handle_form_key(key).await,
      Screen::Edit(field) => {
        self.handle_edit_key(field, key);
        true
      }
      Screen::Pick(field) => {
        self.handle_pick_key(field, key);
        true
      }
      Screen::Scan => {
        self.handle_scan_key(key).await;
        true
      }
      Screen::Upload => {
        self.handle_upload_key(key).await;
        true
      }
    };

    self.pump();
    let len = self.visible_fields().len();
    self.cursor = self.cursor.min(len.saturating_sub(1));
    self.image_cursor = self.image_cursor.min(self.form.images().len().saturating_sub(1));
    Ok(cont)
  }

  async fn handle_form_key(&mut self, key: KeyEvent) -> bool {
    match key.code {
      KeyCode::Char('q') => return false,

      // Navigation
      KeyCode::Down | KeyCode::Char('j') => {
        if self.cursor + 1 < self.visible_fields().len() {
          self.cursor += 1;
        }
      }
      KeyCode::Up | KeyCode::Char('k') => self.cursor = self.cursor.saturating_sub(1),
      KeyCode::Home => self.cursor = 0,
      KeyCode::End => self.cursor = self.visible_fields().len().saturating_sub(1),

      KeyCode::Enter => {
        if let Some(field) = self.cursor_field() {
          self.open_field(field);
        }
      }

      // Capture widgets
      KeyCode::Char('b') => {
        self.widgets.scanner.start().await;
        self.input.clear();
        self.screen = Screen::Scan;
      }
      KeyCode::Char('i') => {
        self.input.clear();
        self.screen = Screen::Upload;
      }
      KeyCode::Char('x') => {
        if let Some(id) = self.form.images().get(self.image_cursor).map(|img| img.id) {
          self.widgets.images.remove(id);
        }
      }
      KeyCode::Char(']') => {
        if self.image_cursor + 1 < self.form.images().len() {
          self.image_cursor += 1;
        }
      }
      KeyCode::Char('[') => self.image_cursor = self.image_cursor.saturating_sub(1),
      KeyCode::Char('g') => self.refresh_location().await,

      // Submission
      KeyCode::Char('s') => self.submit(SubmitMode::Submit).await,
      KeyCode::Char('n') => self.submit(SubmitMode::SaveNext).await,
      KeyCode::Char('w') => {
        if let Err(e) = self.form.save_draft().await {
          self.status_msg = format!("Error: {e}");
        }
      }
      KeyCode::Char('r') => match self.form.restore_draft().await {
        Ok(true) => self.status_msg = "Restored saved draft".into(),
        Ok(false) => self.status_msg = "No saved draft".into(),
        Err(e) => self.status_msg = format!("Error: {e}"),
      },
      KeyCode::Char('o') => {
        let online = !self.form.is_online();
        self.monitor.set_online(online);
        self.status_msg = if online { "Online".into() } else { "Offline".into() };
      }

      KeyCode::Esc => {
        self.form.notifications_mut().dismiss();
        self.status_msg.clear();
      }

      _ => {}
    }
    true
  }

  /// Enter on a field: toggle a flag, open a picker, or start editing.
  fn open_field(&mut self, field: Field) {
    match field.kind() {
      FieldKind::ReadOnly => self.status_msg = format!("{} is generated", field.label()),
      FieldKind::Flag => {
        let on = matches!(self.form.record().get(field), FieldValue::Flag(true));
        if let Err(e) = self.form.update_field(field, (!on).into()) {
          self.status_msg = format!("Error: {e}");
        }
      }
      _ if self.choices(field).is_some() => {
        self.input.clear();
        self.picker_cursor = 0;
        self.screen = Screen::Pick(field);
      }
      _ => {
        self.input = self.form.record().text(field).unwrap_or_default().to_owned();
        self.screen = Screen::Edit(field);
      }
    }
  }

  fn handle_edit_key(&mut self, field: Field, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => self.screen = Screen::Form,
      KeyCode::Enter => {
        let value = std::mem::take(&mut self.input);
        self.write_field(field, &value);
        self.screen = Screen::Form;
      }
      KeyCode::Backspace => {
        self.input.pop();
      }
      KeyCode::Char(c) => self.input.push(c),
      _ => {}
    }
  }

  fn handle_pick_key(&mut self, field: Field, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.input.clear();
        self.screen = Screen::Form;
      }
      KeyCode::Enter => {
        if let Some(choice) = self.filtered_choices(field).into_iter().nth(self.picker_cursor) {
          self.write_field(field, &choice.value);
        }
        self.input.clear();
        self.screen = Screen::Form;
      }
      // Clear an optional selection.
      KeyCode::Delete => {
        self.write_field(field, "");
        self.input.clear();
        self.screen = Screen::Form;
      }
      KeyCode::Down => {
        if self.picker_cursor + 1 < self.filtered_choices(field).len() {
          self.picker_cursor += 1;
        }
      }
      KeyCode::Up => self.picker_cursor = self.picker_cursor.saturating_sub(1),
      KeyCode::Backspace => {
        self.input.pop();
        self.picker_cursor = 0;
      }
      KeyCode::Char(c) => {
        self.input.push(c);
        self.picker_cursor = 0;
      }
      _ => {}
    }
  }

  async fn handle_scan_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.widgets.scanner.close();
        self.input.clear();
        self.screen = Screen::Form;
      }
      KeyCode::Tab => {
        if !self.widgets.scanner.use_camera().await {
          self.status_msg = "No barcode detector on this terminal".into();
        }
      }
      KeyCode::Enter => match self.widgets.scanner.submit_manual(&self.input) {
        Ok(_) => {
          self.input.clear();
          self.screen = Screen::Form;
        }
        Err(ScanError::EmptyInput) => self.status_msg = "Enter a barcode or press Esc".into(),
        Err(e) => self.status_msg = format!("Error: {e}"),
      },
      KeyCode::Backspace => {
        self.input.pop();
      }
      KeyCode::Char(c) => self.input.push(c),
      _ => {}
    }
  }

  async fn handle_upload_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.input.clear();
        self.screen = Screen::Form;
      }
      KeyCode::Enter => {
        let path = std::mem::take(&mut self.input);
        let result = match UploadedFile::read(Path::new(path.trim())).await {
          Ok(file) => self.widgets.images.upload(file),
          Err(e) => Err(e),
        };
        if let Err(e) = result {
          tracing::warn!(error = %e, path = %path.trim(), "image upload rejected");
          self.status_msg = e.user_message().into();
        }
        self.screen = Screen::Form;
      }
      KeyCode::Backspace => {
        self.input.pop();
      }
      KeyCode::Char(c) => self.input.push(c),
      _ => {}
    }
  }

  // ── Actions ───────────────────────────────────────────────────────────────

  fn write_field(&mut self, field: Field, raw: &str) {
    let name: &'static str = field.into();
    if let Err(e) = self.form.update_field_raw(name, raw) {
      self.status_msg = format!("Error: {e}");
    }
  }

  async fn refresh_location(&mut self) {
    let current = self.form.location().copied();
    match self.widgets.locator.refresh(current.as_ref()).await {
      Ok(_) => {}
      Err(LocationError::ReadOnly(role)) => {
        self.status_msg = format!("Location already captured; {role} cannot refresh it");
      }
      Err(LocationError::Position(e)) => self.status_msg = e.user_message().into(),
    }
  }

  async fn submit(&mut self, mode: SubmitMode) {
    match self.form.submit(mode).await {
      Ok(SubmitOutcome::Sent { asset_id, .. }) => {
        self.status_msg = format!("{asset_id} sent");
        if mode == SubmitMode::SaveNext {
          self.cursor = 0;
          self.image_cursor = 0;
        }
      }
      Ok(SubmitOutcome::Queued { asset_id, queue_len }) => {
        self.queue_len = queue_len;
        self.status_msg = format!("{asset_id} queued, {queue_len} waiting");
      }
      Err(SubmitError::Validation(errors)) => {
        let fields = self.visible_fields();
        if let Some(pos) = errors.fields().filter_map(|f| fields.iter().position(|v| *v == f)).min()
        {
          self.cursor = pos;
        }
        self.status_msg = format!("{} field(s) need attention", errors.len());
      }
      Err(e) => self.status_msg = format!("Error: {e}"),
    }
  }
}

#[cfg(test)]
mod tests {
  use eam_capture::Capabilities;
  use eam_core::{
    memory::MemoryStore,
    message::Reporter,
    payload::SubmissionPayload,
    reference::ReferenceData,
    sink::{SinkError, SinkResponse},
    user::UserContext,
  };
  use eam_form::connectivity;

  use super::*;
  use crate::platform::FixedPosition;

  struct NullSink;

  impl AssetSink for NullSink {
    async fn submit(&self, _payload: &SubmissionPayload) -> Result<SinkResponse, SinkError> {
      Ok(SinkResponse { status: 201, message: Some("Asset saved successfully".into()) })
    }
  }

  fn app(online: bool) -> App<NullSink, MemoryStore> {
    let user = UserContext {
      user_name:     "John Smith".into(),
      role:          "Auditor".into(),
      location_name: "Warehouse A - North Wing".into(),
    };
    let (monitor, connectivity) = connectivity::channel(online);
    let (tx, inbox) = mpsc::unbounded_channel();
    let reporter = Reporter::new(move |m| {
      let _ = tx.send(m);
    });
    let geo = FixedGeolocator::new(Some(FixedPosition {
      latitude:  12.9716,
      longitude: 77.5946,
      accuracy:  8.0,
    }));
    let caps = Capabilities::probe(&Unsupported, &Unsupported, &geo);
    let widgets = Widgets {
      scanner: BarcodeScanner::new(Unsupported, Unsupported, &caps, reporter.clone()),
      images:  ImageCapture::new(Unsupported, &caps, reporter.clone()),
      locator: LocationTracker::new(geo, &caps, &user, reporter),
    };
    let form = AssetForm::new(
      user,
      ReferenceData::builtin(),
      connectivity,
      NullSink,
      MemoryStore::new(),
    );
    App::new(form, widgets, monitor, inbox)
  }

  fn key(code: KeyCode) -> KeyEvent { KeyEvent::new(code, KeyModifiers::NONE) }

  async fn type_str<S, L>(app: &mut App<S, L>, s: &str)
  where
    S: AssetSink,
    L: OfflineQueue + DraftStore,
  {
    for c in s.chars() {
      app.handle_key(key(KeyCode::Char(c))).await.unwrap();
    }
  }

  fn focus<S, L>(app: &mut App<S, L>, field: Field)
  where
    S: AssetSink,
    L: OfflineQueue + DraftStore,
  {
    app.cursor = app.visible_fields().iter().position(|f| *f == field).unwrap();
  }

  #[tokio::test]
  async fn mount_takes_the_configured_fix() {
    let mut app = app(true);
    app.mount().await;
    let loc = app.form.location().copied().unwrap();
    assert_eq!((loc.latitude, loc.longitude), (12.9716, 77.5946));
  }

  #[tokio::test]
  async fn type_specific_fields_follow_asset_type() {
    let mut app = app(true);
    assert!(app.visible_fields().contains(&Field::Cpu));
    assert!(!app.visible_fields().contains(&Field::Dimensions));

    app.form.update_field(Field::AssetType, AssetType::NonIt.into()).unwrap();
    assert!(!app.visible_fields().contains(&Field::Cpu));
    assert!(app.visible_fields().contains(&Field::Dimensions));
  }

  #[tokio::test]
  async fn editing_a_text_field() {
    let mut app = app(true);
    focus(&mut app, Field::SerialNumber);
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.screen, Screen::Edit(Field::SerialNumber));

    type_str(&mut app, "SN-42").await;
    app.handle_key(key(KeyCode::Enter)).await.unwrap();

    assert_eq!(app.screen, Screen::Form);
    assert_eq!(app.form.record().text(Field::SerialNumber), Some("SN-42"));
  }

  #[tokio::test]
  async fn picker_filters_and_stores_the_key() {
    let mut app = app(true);
    focus(&mut app, Field::Category);
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.screen, Screen::Pick(Field::Category));

    type_str(&mut app, "furn").await;
    assert_eq!(app.filtered_choices(Field::Category)[0].label, "Furniture");
    app.handle_key(key(KeyCode::Enter)).await.unwrap();

    assert_eq!(app.form.record().text(Field::Category), Some("cat003"));
    assert_eq!(app.display_value(Field::Category), "Furniture");
  }

  #[tokio::test]
  async fn sub_category_choices_follow_category() {
    let mut app = app(true);
    assert_eq!(app.choices(Field::SubCategory).unwrap(), vec![]);

    app.form.update_field_raw("category", "cat003").unwrap();
    let subs: Vec<String> =
      app.choices(Field::SubCategory).unwrap().into_iter().map(|c| c.value).collect();
    assert_eq!(subs, vec!["sub010", "sub011", "sub012", "sub013"]);
  }

  #[tokio::test]
  async fn flag_toggles_on_enter() {
    let mut app = app(true);
    focus(&mut app, Field::AmcApplicable);
    assert_eq!(app.display_value(Field::AmcApplicable), "No");
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.display_value(Field::AmcApplicable), "Yes");
  }

  #[tokio::test]
  async fn manual_barcode_reaches_the_form() {
    let mut app = app(true);
    app.handle_key(key(KeyCode::Char('b'))).await.unwrap();
    assert_eq!(app.screen, Screen::Scan);

    type_str(&mut app, "  8901234567890 ").await;
    app.handle_key(key(KeyCode::Enter)).await.unwrap();

    assert_eq!(app.screen, Screen::Form);
    assert_eq!(app.form.record().text(Field::Barcode), Some("8901234567890"));
  }

  #[tokio::test]
  async fn empty_barcode_keeps_the_prompt_open() {
    let mut app = app(true);
    app.handle_key(key(KeyCode::Char('b'))).await.unwrap();
    app.handle_key(key(KeyCode::Enter)).await.unwrap();
    assert_eq!(app.screen, Screen::Scan);
    assert_eq!(app.form.record().text(Field::Barcode).unwrap_or_default(), "");
  }

  #[tokio::test]
  async fn invalid_submit_moves_cursor_to_first_error() {
    let mut app = app(true);
    app.cursor = 10;
    app.handle_key(key(KeyCode::Char('s'))).await.unwrap();
    assert_eq!(app.cursor_field(), Some(Field::Barcode));
    assert!(!app.form.errors().is_empty());
  }

  #[tokio::test]
  async fn offline_toggle_queues_submissions() {
    let mut app = app(true);
    for (name, value) in [
      ("barcode", "8901234567890"),
      ("serialNumber", "SN-1"),
      ("category", "cat001"),
      ("subCategory", "sub001"),
      ("assetGroup", "grp001"),
      ("assetName", "Laptop"),
      ("department", "dept001"),
      ("location", "loc001"),
    ] {
      app.form.update_field_raw(name, value).unwrap();
    }

    app.handle_key(key(KeyCode::Char('o'))).await.unwrap();
    assert!(!app.form.is_online());

    app.handle_key(key(KeyCode::Char('s'))).await.unwrap();
    assert_eq!(app.queue_len, 1);
    assert_eq!(app.form.local_store().queued().await.unwrap().len(), 1);
  }
}
