//! Field list pane.

use eam_core::{
  record::{AssetType, Field},
  validate::REQUIRED_FIELDS,
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::App;

/// Form section a field is listed under.
fn section(field: Field, asset_type: AssetType) -> &'static str {
  match field {
    Field::AssetId
    | Field::Barcode
    | Field::AssetType
    | Field::ParentAssetId
    | Field::SerialNumber => "Asset Identification",
    Field::AccountHead
    | Field::Category
    | Field::SubCategory
    | Field::AssetGroup
    | Field::AssetModel
    | Field::Manufacturer => "Classification",
    Field::Department
    | Field::CostCenter
    | Field::Location
    | Field::SubLocation
    | Field::AssignedTo
    | Field::Custodian => "Assignment",
    Field::AssetStatus
    | Field::VerificationStatus
    | Field::VerificationCycle
    | Field::Remarks => "Status & Verification",
    f if f.applies_to().is_some() => match asset_type {
      AssetType::It => "IT Asset Details",
      AssetType::NonIt => "Non-IT Asset Details",
    },
    _ => "Core Details",
  }
}

/// Render the field list into `area`.
pub fn draw<S, L>(f: &mut Frame, area: Rect, app: &App<S, L>)
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  let record = app.form.record();
  let errors = app.form.errors();
  let asset_type = record.asset_type();

  let block = Block::default()
    .title(format!(" {} ", record.asset_id()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let mut items: Vec<ListItem> = Vec::new();
  let mut selected = None;
  let mut last_section = "";

  for (i, field) in app.visible_fields().into_iter().enumerate() {
    let heading = section(field, asset_type);
    if heading != last_section {
      if !last_section.is_empty() {
        items.push(ListItem::new(""));
      }
      items.push(ListItem::new(Line::from(Span::styled(
        heading,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
      ))));
      last_section = heading;
    }

    if i == app.cursor {
      selected = Some(items.len());
    }

    let required = REQUIRED_FIELDS.iter().any(|(f, _)| *f == field);
    let label = if required { format!("{} *", field.label()) } else { field.label().to_owned() };

    let mut spans = vec![
      Span::styled(format!("  {label:<28}"), Style::default().fg(Color::Gray)),
      Span::raw(app.display_value(field)),
    ];
    if let Some(message) = errors.get(field) {
      spans.push(Span::styled(format!("  {message}"), Style::default().fg(Color::Red)));
    }
    items.push(ListItem::new(Line::from(spans)));
  }

  let mut state = ListState::default();
  state.select(selected);

  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol(""),
    area,
    &mut state,
  );
}
