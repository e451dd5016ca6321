//! People cards: everyone in the cast, with their episode range.

use plotlines_core::{person::Presence, store::PlotStore};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::app::{App, Pane};

/// Render the people list into `area`.
pub fn draw<S: PlotStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let filtered = app.filtered_people();
  let total = app.aggregator.snapshot().people.len();
  let focused = app.pane == Pane::People;

  // Title with count.
  let title = if app.filter_active || !app.filter.is_empty() {
    format!(" People ({}/{}) ", filtered.len(), total)
  } else {
    format!(" People ({total}) ")
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(super::pane_border(focused));

  let items: Vec<ListItem> = filtered
    .iter()
    .map(|person| {
      // Same state the graph shows for this episode.
      let (dot, name_style) = match person.presence(app.episode, app.options.visibility) {
        Presence::Active => {
          (Span::styled("● ", Style::default().fg(Color::Green)), Style::default())
        }
        Presence::Departed => (
          Span::styled("○ ", Style::default().fg(Color::DarkGray)),
          Style::default().fg(Color::DarkGray),
        ),
        Presence::NotArrived => (
          Span::styled("· ", Style::default().fg(Color::DarkGray)),
          Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
      };

      let range = match (person.arrived, person.deactivated) {
        (None, None) => String::new(),
        (Some(a), None) => format!("  from ep {a}"),
        (None, Some(d)) => format!("  out at ep {d}"),
        (Some(a), Some(d)) => format!("  ep {a}–{d}"),
      };

      ListItem::new(Line::from(vec![
        dot,
        Span::styled(person.name.clone(), name_style),
        Span::styled(range, Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let mut inner_area = block.inner(area);
  f.render_widget(block, area);

  // Filter bar at the bottom of the inner area.
  if (app.filter_active || !app.filter.is_empty()) && inner_area.height > 2 {
    let filter_area = Rect {
      x:      inner_area.x,
      y:      inner_area.y + inner_area.height - 1,
      width:  inner_area.width,
      height: 1,
    };
    inner_area.height = inner_area.height.saturating_sub(1);

    let filter_text = if app.filter_active {
      format!("/{}_", app.filter)
    } else {
      format!("/{}", app.filter)
    };
    f.render_widget(
      Paragraph::new(filter_text).style(Style::default().fg(Color::Yellow)),
      filter_area,
    );
  }

  // Scrollable list with cursor tracking; only highlighted while focused.
  let mut state = ListState::default();
  state.select((focused && !filtered.is_empty()).then_some(app.list_cursor));

  f.render_stateful_widget(
    List::new(items).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    inner_area,
    &mut state,
  );
}
