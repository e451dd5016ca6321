//! TUI rendering, orchestrating all panes.

pub mod detail;
pub mod graph;
pub mod people;

use chrono::Local;
use plotlines_core::store::PlotStore;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph},
};

use crate::app::{App, EPISODES, Pane};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw<S: PlotStore>(f: &mut Frame, app: &App<S>) {
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
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header<S: PlotStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    format!(
      " plotlines  episode {}/{}  [{} · {} pairs]",
      app.episode,
      EPISODES.end(),
      app.options.visibility,
      app.options.pair_scope,
    ),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::DarkGray));

  // Simple left-right header: pad the middle.
  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Body ─────────────────────────────────────────────────────────────────────

fn draw_body<S: PlotStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  // Graph on the left, detail above people cards on the right.
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
    .split(area);

  let side = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
    .split(cols[1]);

  graph::draw(f, cols[0], app);
  detail::draw(f, side[0], app);
  people::draw(f, side[1], app);
}

/// Border style for a pane, brighter when it has keyboard focus.
fn pane_border(focused: bool) -> Style {
  if focused {
    Style::default().fg(Color::Cyan)
  } else {
    Style::default().fg(Color::DarkGray)
  }
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status<S: PlotStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let (mode_label, hints) = match app.pane {
    Pane::People if app.filter_active => ("SEARCH", "Type to filter  Esc cancel  Enter done"),
    Pane::People => (
      "PEOPLE",
      "↑↓/jk move  / search  Enter show  a toggle active  x remove  c graph  q quit",
    ),
    Pane::Graph => (
      "GRAPH",
      "Tab select  Enter details  Esc close  ←→ episode  v visibility  s pairs  c people  r reload",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray));

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}
