//! Detail pane: the person or relation last tapped in the graph.

use plotlines_core::{
  bridge::{DetailView, EdgeDetail, NodeDetail},
  projection::EdgeKind,
  store::PlotStore,
};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::App;

pub fn draw<S: PlotStore>(f: &mut Frame, area: Rect, app: &App<S>) {
  let (title, lines) = match app.detail() {
    DetailView::Hidden => (
      " Detail ".to_owned(),
      vec![Line::from(Span::styled(
        "Select someone with Tab and press Enter.",
        Style::default().fg(Color::DarkGray),
      ))],
    ),
    DetailView::ShowingNode(node) => (format!(" {} ", node.label), node_lines(node)),
    DetailView::ShowingEdge(edge) => {
      let title = match edge.kind {
        EdgeKind::Friend => " Friends ",
        EdgeKind::Enemy => " Enemies ",
      };
      (title.to_owned(), edge_lines(edge))
    }
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
    area,
  );
}

fn field(label: &'static str, value: String) -> Line<'static> {
  Line::from(vec![
    Span::styled(
      format!("{label:<9}"),
      Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    ),
    Span::raw(value),
  ])
}

fn node_lines(node: &NodeDetail) -> Vec<Line<'static>> {
  let mut lines = Vec::new();
  if let Some(url) = &node.picture_url {
    lines.push(field("Picture", url.clone()));
  }
  lines.push(Line::from(""));
  lines.push(Line::from(
    node.bio.clone().unwrap_or_else(|| "No bio".to_owned()),
  ));
  lines
}

fn edge_lines(edge: &EdgeDetail) -> Vec<Line<'static>> {
  let color = match edge.kind {
    EdgeKind::Friend => Color::Green,
    EdgeKind::Enemy => Color::Red,
  };
  let mut lines = vec![
    Line::from(Span::styled(
      format!("{} ↔ {}", edge.source_label, edge.target_label),
      Style::default().fg(color).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
  ];
  if !edge.emoji.is_empty() {
    lines.push(field("Emoji", edge.emoji.clone()));
  }
  if let Some(url) = &edge.image_url {
    lines.push(field("Image", url.clone()));
  }
  let context = if edge.context.is_empty() {
    "No context".to_owned()
  } else {
    edge.context.clone()
  };
  lines.push(field("Context", context));
  lines
}
