//! Terminal-side [`GraphRenderer`]: a force-directed layout over the
//! projected elements, sampled by the graph pane every frame.

use std::{collections::HashMap, f64::consts::PI};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};
use plotlines_core::{
  bridge::{GraphRenderer, LayoutOptions},
  projection::{EdgeKind, GraphElements},
};

/// Radius of the circle new nodes are seeded on.
const SEED_RADIUS: f64 = 100.0;

/// Ticks an animated layout runs for before it is considered settled.
const ANIMATION_TICKS: u32 = 240;

/// Step used when a layout is settled in one go.
const STEP: f32 = 1.0 / 60.0;

#[derive(Debug, Clone)]
pub struct PlacedNode {
  pub id:           String,
  pub label:        String,
  pub border_color: Option<String>,
  pub inactive:     bool,
  idx:              DefaultNodeIdx,
}

#[derive(Debug, Clone)]
pub struct PlacedEdge {
  pub id:     String,
  pub kind:   EdgeKind,
  pub source: String,
  pub target: String,
  pub emoji:  String,
}

pub struct ForceLayout {
  graph:     ForceGraph<String, ()>,
  nodes:     Vec<PlacedNode>,
  edges:     Vec<PlacedEdge>,
  positions: HashMap<String, (f64, f64)>,
  remaining: u32,
  fit:       bool,
}

impl Default for ForceLayout {
  fn default() -> Self {
    Self {
      graph:     new_graph(),
      nodes:     Vec::new(),
      edges:     Vec::new(),
      positions: HashMap::new(),
      remaining: 0,
      fit:       true,
    }
  }
}

fn new_graph() -> ForceGraph<String, ()> {
  ForceGraph::new(SimulationParameters {
    force_charge:   150.0,
    force_spring:   0.05,
    force_max:      100.0,
    node_speed:     3000.0,
    damping_factor: 0.9,
  })
}

impl ForceLayout {
  pub fn nodes(&self) -> &[PlacedNode] { &self.nodes }

  pub fn edges(&self) -> &[PlacedEdge] { &self.edges }

  pub fn position(&self, id: &str) -> Option<(f64, f64)> { self.positions.get(id).copied() }

  pub fn is_animating(&self) -> bool { self.remaining > 0 }

  /// Advance an animated layout by `dt` seconds. Returns `true` while the
  /// layout is still moving.
  pub fn tick(&mut self, dt: f32) -> bool {
    if self.remaining == 0 {
      return false;
    }
    self.graph.update(dt);
    self.remaining -= 1;
    self.sample();
    self.remaining > 0
  }

  /// World-space viewport as `([x_min, x_max], [y_min, y_max])`.
  ///
  /// With `fit` the viewport hugs the laid-out nodes; otherwise it is the
  /// seed circle.
  pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
    let default = (
      [-SEED_RADIUS * 1.5, SEED_RADIUS * 1.5],
      [-SEED_RADIUS * 1.5, SEED_RADIUS * 1.5],
    );
    if !self.fit || self.positions.is_empty() {
      return default;
    }

    let (mut x0, mut x1, mut y0, mut y1) = (f64::MAX, f64::MIN, f64::MAX, f64::MIN);
    for &(x, y) in self.positions.values() {
      x0 = x0.min(x);
      x1 = x1.max(x);
      y0 = y0.min(y);
      y1 = y1.max(y);
    }
    // Leave room for labels and keep a single node from collapsing the view.
    let pad_x = ((x1 - x0) * 0.15).max(20.0);
    let pad_y = ((y1 - y0) * 0.15).max(20.0);
    ([x0 - pad_x, x1 + pad_x], [y0 - pad_y, y1 + pad_y])
  }

  fn sample(&mut self) {
    let mut by_idx = HashMap::new();
    self.graph.visit_nodes(|node| {
      by_idx.insert(node.index(), (node.x() as f64, node.y() as f64));
    });
    self.positions = self
      .nodes
      .iter()
      .filter_map(|n| by_idx.get(&n.idx).map(|&p| (n.id.clone(), p)))
      .collect();
  }
}

impl GraphRenderer for ForceLayout {
  fn replace_elements(&mut self, elements: &GraphElements) {
    self.graph = new_graph();
    self.nodes.clear();
    self.edges.clear();

    let count = elements.nodes().count().max(1) as f64;
    let mut index = HashMap::new();
    for (i, (node, inactive)) in elements.nodes().enumerate() {
      let angle = i as f64 * 2.0 * PI / count;
      let idx = self.graph.add_node(NodeData {
        x:         (SEED_RADIUS * angle.cos()) as f32,
        y:         (SEED_RADIUS * angle.sin()) as f32,
        mass:      10.0,
        is_anchor: false,
        user_data: node.id.clone(),
      });
      index.insert(node.id.clone(), idx);
      self.nodes.push(PlacedNode {
        id: node.id.clone(),
        label: node.label.clone(),
        border_color: node.border_color.clone(),
        inactive,
        idx,
      });
    }

    for edge in elements.edges() {
      let (Some(&a), Some(&b)) = (index.get(&edge.source), index.get(&edge.target)) else {
        tracing::debug!(edge = %edge.id, "edge endpoint not laid out, skipping");
        continue;
      };
      self.graph.add_edge(a, b, EdgeData::default());
      self.edges.push(PlacedEdge {
        id:     edge.id.clone(),
        kind:   edge.kind,
        source: edge.source.clone(),
        target: edge.target.clone(),
        emoji:  edge.emoji.clone(),
      });
    }

    self.remaining = 0;
    self.sample();
  }

  fn run_layout(&mut self, layout: &LayoutOptions) {
    self.fit = layout.fit;
    if layout.animate {
      self.remaining = ANIMATION_TICKS;
      return;
    }
    for _ in 0..ANIMATION_TICKS {
      self.graph.update(STEP);
    }
    self.remaining = 0;
    self.sample();
  }
}
