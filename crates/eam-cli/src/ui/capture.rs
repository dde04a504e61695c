//! Capture pane: images, location and connection state.

use chrono::Local;
use eam_capture::{
  WidgetMode,
  image::{slot_icon, slot_label},
  location::{AccuracyLevel, Axis, format_coordinate, maps_url},
};
use eam_core::capture::MAX_IMAGES;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw<S, L>(f: &mut Frame, area: Rect, app: &App<S, L>)
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(MAX_IMAGES as u16 + 3), // images
      Constraint::Min(7),                         // location
      Constraint::Length(4),                      // sync
    ])
    .split(area);

  draw_images(f, rows[0], app);
  draw_location(f, rows[1], app);
  draw_sync(f, rows[2], app);
}

fn pane(title: &str) -> Block<'_> {
  Block::default()
    .title(format!(" {title} "))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray))
}

fn dim() -> Style { Style::default().fg(Color::DarkGray) }

// ─── Images ───────────────────────────────────────────────────────────────────

fn draw_images<S, L>(f: &mut Frame, area: Rect, app: &App<S, L>)
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  let images = app.form.images();
  let mut lines: Vec<Line> = Vec::new();

  for slot in 0..MAX_IMAGES {
    let head = format!("{} {:<14}", slot_icon(slot), slot_label(slot));
    let line = match images.get(slot) {
      Some(img) => {
        let style = if slot == app.image_cursor {
          Style::default().fg(Color::Black).bg(Color::Green)
        } else {
          Style::default().fg(Color::Green)
        };
        let kb = img.data.len().div_ceil(1024);
        Line::from(vec![
          Span::styled(head, style),
          Span::styled(
            format!(" {}  {kb} KB", img.timestamp.with_timezone(&Local).format("%H:%M:%S")),
            style,
          ),
        ])
      }
      None => Line::from(vec![Span::raw(head), Span::styled(" empty", dim())]),
    };
    lines.push(line);
  }

  if let WidgetMode::ManualFallback { reason } = app.widgets.images.mode() {
    lines.push(Line::from(Span::styled(*reason, dim())));
  }

  let title = format!("Images {}/{MAX_IMAGES}", images.len());
  f.render_widget(Paragraph::new(lines).block(pane(&title)), area);
}

// ─── Location ─────────────────────────────────────────────────────────────────

fn draw_location<S, L>(f: &mut Frame, area: Rect, app: &App<S, L>)
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  let locator = &app.widgets.locator;
  let mut lines: Vec<Line> = Vec::new();

  match app.form.location() {
    Some(loc) => {
      let level = AccuracyLevel::of(loc.accuracy);
      lines.push(Line::from(format!(
        "{}  {}",
        format_coordinate(loc.latitude, Axis::Latitude),
        format_coordinate(loc.longitude, Axis::Longitude),
      )));
      lines.push(Line::from(vec![
        Span::raw(format!("±{:.0} m  ", loc.accuracy)),
        Span::styled(
          level.to_string(),
          Style::default().fg(match level {
            AccuracyLevel::Excellent | AccuracyLevel::Good => Color::Green,
            AccuracyLevel::Fair => Color::Yellow,
            AccuracyLevel::Poor => Color::Red,
          }),
        ),
      ]));
      lines.push(Line::from(Span::styled(
        format!("at {}", loc.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")),
        dim(),
      )));
      lines.push(Line::from(Span::styled(maps_url(loc), Style::default().fg(Color::Blue))));
    }
    None => lines.push(Line::from(Span::styled("No location captured", dim()))),
  }

  if let Some(error) = locator.error() {
    lines.push(Line::from(Span::styled(error, Style::default().fg(Color::Red))));
  } else if let WidgetMode::ManualFallback { reason } = locator.mode() {
    lines.push(Line::from(Span::styled(*reason, dim())));
  }

  let refresh_hint = if locator.can_refresh(app.form.location()) {
    "[g] capture"
  } else {
    "read-only for this role"
  };
  lines.push(Line::from(Span::styled(
    format!("permission: {}  {refresh_hint}", locator.permission()),
    dim(),
  )));

  f.render_widget(
    Paragraph::new(lines).block(pane("Location")).wrap(Wrap { trim: true }),
    area,
  );
}

// ─── Sync ─────────────────────────────────────────────────────────────────────

fn draw_sync<S, L>(f: &mut Frame, area: Rect, app: &App<S, L>)
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  let (label, color) = if app.form.is_online() {
    ("● online", Color::Green)
  } else {
    ("● offline", Color::Yellow)
  };
  let lines = vec![
    Line::from(Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD))),
    Line::from(Span::styled(format!("{} queued for sync", app.queue_len), dim())),
  ];
  f.render_widget(Paragraph::new(lines).block(pane("Connection")), area);
}
