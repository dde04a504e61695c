//! TUI rendering. Lays out the panes and the status bar.

pub mod capture;
pub mod fields;
pub mod prompt;

use std::time::Instant;

use eam_form::notify::NotificationKind;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, Screen};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S, L>(f: &mut Frame, app: &App<S, L>)
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  draw_body(f, rows[1], app);
  draw_status(f, rows[2], app);

  if app.screen != Screen::Form {
    prompt::draw(f, rows[1], app);
  }
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<S, L>(f: &mut Frame, area: Rect, app: &App<S, L>)
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  let user = app.form.user();

  let left = Span::styled(
    " eam  [s] submit  [n] save & next  [q] quit",
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let (net, net_color) = if app.form.is_online() {
    ("ONLINE".to_string(), Color::Green)
  } else {
    (format!("OFFLINE ({})", app.queue_len), Color::Yellow)
  };
  let who = Span::styled(
    format!("{} · {} · {}  ", user.user_name, user.role, user.location_name),
    Style::default().fg(Color::Gray),
  );
  let right = Span::styled(
    format!("{net} "),
    Style::default().fg(net_color).add_modifier(Modifier::BOLD),
  );

  let used = [&left, &who, &right]
    .iter()
    .map(|s| s.content.chars().count() as u16)
    .sum::<u16>();
  let pad = area.width.saturating_sub(used);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), who, right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<S, L>(f: &mut Frame, area: Rect, app: &App<S, L>)
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
    .split(area);

  fields::draw(f, cols[0], app);
  capture::draw(f, cols[1], app);
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S, L>(f: &mut Frame, area: Rect, app: &App<S, L>)
where
  S: eam_core::sink::AssetSink,
  L: eam_core::store::OfflineQueue + eam_core::store::DraftStore,
{
  let (mode_label, hints) = match app.screen {
    Screen::Form => (
      "FORM",
      "↑↓/jk move  Enter edit  b barcode  i image  x/[ ] images  g gps  w/r draft  o online",
    ),
    Screen::Edit(_) => ("EDIT", "Type value  Enter save  Esc cancel"),
    Screen::Pick(_) => ("PICK", "Type to filter  ↑↓ choose  Enter select  Del clear  Esc cancel"),
    Screen::Scan => ("SCAN", "Type barcode  Enter accept  Tab camera  Esc close"),
    Screen::Upload => ("IMAGE", "Type file path  Enter upload  Esc cancel"),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );

  // A live notification wins over the local status line.
  let message = match app.form.notifications().active(Instant::now()) {
    Some(n) => {
      let color = match n.kind {
        NotificationKind::Success => Color::Green,
        NotificationKind::Error => Color::Red,
        NotificationKind::Warning => Color::Yellow,
        NotificationKind::Info => Color::Cyan,
      };
      Span::styled(format!("  {}", n.message), Style::default().fg(color))
    }
    None if !app.status_msg.is_empty() => {
      Span::styled(format!("  {}", app.status_msg), Style::default().fg(Color::White))
    }
    None => Span::styled(format!("  {hints}"), Style::default().fg(Color::DarkGray)),
  };

  f.render_widget(Paragraph::new(Line::from(vec![mode_span, message])), area);
}
