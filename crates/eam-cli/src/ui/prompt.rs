//! Popup overlay for the input screens.

use eam_capture::{WidgetMode, barcode::ScannerState, image::slot_label};
use eam_core::capture::MAX_IMAGES;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};

use crate::app::{App, Screen};

/// `percent_x` wide, `height` rows tall, centred in `area`.
fn centered(area: Rect, percent_x: u16, height: u16) -> Rect {
  let height = height.min(area.height);
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(area.height.saturating_sub(height) / 2),
      Constraint::Length(height),
      Constraint::Min(0),
    ])
    .split(area);
  Layout::default()
    .direction(Direction::Horizontal)
    .constraints([
      Constraint::Percentage((100 - percent_x) / 2),
      Constraint::Percentage(percent_x),
      Constraint::Min(0),
    ])
    .split(rows[1])[1]
}

fn popup(title: String) -> Block<'static> {
  Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan))
}

fn input_line(input: &str) -> Line<'_> {
  Line::from(vec![
    Span::styled("> ", Style::default().fg(Color::Cyan)),
    Span::raw(input),
    Span::styled("█", Style::default().fg(Color::Gray)),
  ])
}

fn dim(text: impl Into<String>) -> Line<'static> {
  Line::from(Span::styled(text.into(), Style::default().fg(Color::DarkGray)))
}

pub fn draw<S, L>(f: &mut Frame, area: Rect, app: &App<S, L>)
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  match app.screen {
    Screen::Form => {}
    Screen::Edit(field) => {
      let rect = centered(area, 60, 4);
      let lines = vec![input_line(&app.input), dim(format!("was: {}", app.display_value(field)))];
      f.render_widget(Clear, rect);
      f.render_widget(Paragraph::new(lines).block(popup(field.label().to_owned())), rect);
    }
    Screen::Pick(field) => draw_picker(f, area, app, field),
    Screen::Scan => draw_scan(f, area, app),
    Screen::Upload => {
      let rect = centered(area, 60, 5);
      let images = app.form.images();
      let next = if images.is_full() {
        format!("All {MAX_IMAGES} images captured; remove one first")
      } else {
        format!("next slot: {}", slot_label(images.len()))
      };
      let mut lines = vec![input_line(&app.input), dim(next)];
      if let WidgetMode::ManualFallback { reason } = app.widgets.images.mode() {
        lines.push(dim(*reason));
      }
      f.render_widget(Clear, rect);
      f.render_widget(Paragraph::new(lines).block(popup("Upload image".into())), rect);
    }
  }
}

fn draw_picker<S, L>(f: &mut Frame, area: Rect, app: &App<S, L>, field: eam_core::record::Field)
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  let choices = app.filtered_choices(field);
  let height = (choices.len() as u16).clamp(1, 12) + 4;
  let rect = centered(area, 50, height);
  f.render_widget(Clear, rect);

  let block = popup(field.label().to_owned());
  let inner = block.inner(rect);
  f.render_widget(block, rect);

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
    .split(inner);

  f.render_widget(Paragraph::new(input_line(&app.input)), rows[0]);

  if choices.is_empty() {
    let empty = if app.choices(field).is_some_and(|all| all.is_empty()) {
      "No options yet; choose the parent field first"
    } else {
      "No matches"
    };
    f.render_widget(Paragraph::new(dim(empty)), rows[2]);
    return;
  }

  let items: Vec<ListItem> = choices
    .iter()
    .map(|c| {
      let mut spans = vec![Span::raw(c.label.clone())];
      if c.label != c.value {
        spans.push(Span::styled(format!("  {}", c.value), Style::default().fg(Color::DarkGray)));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut state = ListState::default();
  state.select(Some(app.picker_cursor.min(choices.len() - 1)));

  f.render_stateful_widget(
    List::new(items)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("▶ "),
    rows[2],
    &mut state,
  );
}

fn draw_scan<S, L>(f: &mut Frame, area: Rect, app: &App<S, L>)
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  let scanner = &app.widgets.scanner;
  let rect = centered(area, 60, 6);

  let mut lines = vec![input_line(&app.input)];
  match scanner.state() {
    ScannerState::Initializing => lines.push(dim("Starting camera...")),
    ScannerState::Scanning => lines.push(dim("Point the camera at a barcode")),
    ScannerState::ManualEntry { notice: Some(notice) } => lines.push(Line::from(Span::styled(
      *notice,
      Style::default().fg(Color::Yellow),
    ))),
    ScannerState::ManualEntry { notice: None } => lines.push(dim("Type the barcode and press Enter")),
    ScannerState::Resolved(code) => lines.push(dim(format!("Scanned {code}"))),
    ScannerState::Closed => {}
  }
  if let WidgetMode::ManualFallback { reason } = scanner.mode() {
    lines.push(dim(*reason));
  }

  f.render_widget(Clear, rect);
  f.render_widget(
    Paragraph::new(lines).block(popup("Barcode".into())).wrap(Wrap { trim: true }),
    rect,
  );
}
