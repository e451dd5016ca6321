//! Graph pane: draws the laid-out elements on a braille canvas.

use plotlines_core::{bridge::TapTarget, projection::EdgeKind, store::PlotStore};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  symbols::Marker,
  text::Span,
  widgets::{
    Block, Borders, Paragraph,
    canvas::{Canvas, Circle, Line as Segment},
  },
};

use crate::{
  app::{App, Pane},
  layout::PlacedNode,
};

const NODE_RADIUS: f64 = 4.0;

/// Default fill for people without a pair color.
const NODE_COLOR: Color = Color::Rgb(0x00, 0x74, 0xD9);

pub fn draw<S: PlotStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let layout = app.bridge.renderer();
  let selected = app.selected();

  let block = Block::default()
    .title(format!(" Episode {} ", app.episode))
    .borders(Borders::ALL)
    .border_style(super::pane_border(app.pane == Pane::Graph));

  if layout.nodes().is_empty() {
    let empty = Paragraph::new("Nobody is on screen this episode.")
      .style(Style::default().fg(Color::DarkGray))
      .block(block);
    f.render_widget(empty, area);
    return;
  }

  let (x_bounds, y_bounds) = layout.bounds();
  let canvas = Canvas::default()
    .block(block)
    .marker(Marker::Braille)
    .x_bounds(x_bounds)
    .y_bounds(y_bounds)
    .paint(|ctx| {
      for edge in layout.edges() {
        let (Some((x1, y1)), Some((x2, y2))) =
          (layout.position(&edge.source), layout.position(&edge.target))
        else {
          continue;
        };
        let is_selected = selected.as_ref() == Some(&TapTarget::Edge(edge.id.clone()));
        let color = match (is_selected, edge.kind) {
          (true, _) => Color::Yellow,
          (false, EdgeKind::Friend) => Color::Green,
          (false, EdgeKind::Enemy) => Color::Red,
        };
        ctx.draw(&Segment::new(x1, y1, x2, y2, color));
        if !edge.emoji.is_empty() {
          ctx.print((x1 + x2) / 2.0, (y1 + y2) / 2.0, edge.emoji.clone());
        }
      }

      ctx.layer();

      for node in layout.nodes() {
        let Some((x, y)) = layout.position(&node.id) else {
          continue;
        };
        let is_selected = selected.as_ref() == Some(&TapTarget::Node(node.id.clone()));
        ctx.draw(&Circle { x, y, radius: NODE_RADIUS, color: node_color(node) });
        ctx.print(x + NODE_RADIUS, y, label(node, is_selected));
      }
    });

  f.render_widget(canvas, area);
}

fn node_color(node: &PlacedNode) -> Color {
  if node.inactive {
    return Color::DarkGray;
  }
  node
    .border_color
    .as_deref()
    .and_then(|hex| hex.parse().ok())
    .unwrap_or(NODE_COLOR)
}

fn label(node: &PlacedNode, selected: bool) -> Span<'static> {
  let style = match (selected, node.inactive) {
    (true, _) => Style::default()
      .fg(Color::Black)
      .bg(Color::Yellow)
      .add_modifier(Modifier::BOLD),
    (false, true) => Style::default()
      .fg(Color::DarkGray)
      .add_modifier(Modifier::CROSSED_OUT),
    (false, false) => Style::default().fg(Color::White),
  };
  Span::styled(format!(" {}", node.label), style)
}
