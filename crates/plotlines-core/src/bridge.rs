//! The seam between projected elements, the renderer, and the detail view.
//!
//! [`Bridge`] owns a [`GraphRenderer`]. Every time a new element set is
//! presented it clears the renderer, adds the whole set, and re-runs the
//! layout; there is no incremental diffing. Taps on rendered elements move the
//! [`DetailView`] state machine:
//!
//! ```text
//! Hidden ──tap node──▶ ShowingNode ◀─tap node─┐
//!   ▲                    │  ▲                 │
//!   │                tap edge tap node        │
//!   └──close──────── ShowingEdge ─────────────┘
//! ```
//!
//! Selection never flows back into the data layer.

use serde::{Deserialize, Serialize};

use crate::projection::{EdgeKind, GraphElements};

// ─── Renderer seam ───────────────────────────────────────────────────────────

/// Layout request passed to [`GraphRenderer::run_layout`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutOptions {
  pub name:    String,
  pub animate: bool,
  pub fit:     bool,
}

impl Default for LayoutOptions {
  fn default() -> Self {
    Self { name: "cose".to_owned(), animate: true, fit: true }
  }
}

/// A force-directed rendering engine.
pub trait GraphRenderer {
  /// Drop every element currently shown and show `elements` instead.
  fn replace_elements(&mut self, elements: &GraphElements);

  fn run_layout(&mut self, layout: &LayoutOptions);
}

// ─── Detail view ─────────────────────────────────────────────────────────────

/// What the user tapped, by element id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapTarget {
  Node(String),
  Edge(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDetail {
  pub id:          String,
  pub label:       String,
  pub picture_url: Option<String>,
  pub bio:         Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeDetail {
  pub id:           String,
  pub kind:         EdgeKind,
  pub source:       String,
  pub target:       String,
  /// Node labels of the endpoints, falling back to the raw id when an
  /// endpoint is not on screen.
  pub source_label: String,
  pub target_label: String,
  pub emoji:        String,
  pub context:      String,
  pub image_url:    Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum DetailView {
  #[default]
  Hidden,
  ShowingNode(NodeDetail),
  ShowingEdge(EdgeDetail),
}

impl DetailView {
  pub fn is_hidden(&self) -> bool { matches!(self, Self::Hidden) }
}

// ─── Bridge ──────────────────────────────────────────────────────────────────

pub struct Bridge<R> {
  renderer:  R,
  layout:    LayoutOptions,
  elements:  GraphElements,
  presented: bool,
  detail:    DetailView,
}

impl<R: GraphRenderer> Bridge<R> {
  pub fn new(renderer: R) -> Self {
    Self {
      renderer,
      layout: LayoutOptions::default(),
      elements: GraphElements::default(),
      presented: false,
      detail: DetailView::Hidden,
    }
  }

  /// Hand a freshly projected element set to the renderer.
  ///
  /// Returns `false` without touching the renderer if `elements` is the set
  /// already on screen.
  pub fn present(&mut self, elements: GraphElements) -> bool {
    if self.presented && elements == self.elements {
      return false;
    }
    self.renderer.replace_elements(&elements);
    self.renderer.run_layout(&self.layout);
    self.elements = elements;
    self.presented = true;
    true
  }

  /// Route a tap to the detail view. Taps on ids that are not on screen are
  /// ignored.
  pub fn tap(&mut self, target: &TapTarget) -> &DetailView {
    let next = match target {
      TapTarget::Node(id) => self.node_detail(id).map(DetailView::ShowingNode),
      TapTarget::Edge(id) => self.edge_detail(id).map(DetailView::ShowingEdge),
    };
    if let Some(view) = next {
      self.detail = view;
    }
    &self.detail
  }

  pub fn close(&mut self) { self.detail = DetailView::Hidden; }

  pub fn detail(&self) -> &DetailView { &self.detail }

  pub fn elements(&self) -> &GraphElements { &self.elements }

  pub fn renderer(&self) -> &R { &self.renderer }

  pub fn renderer_mut(&mut self) -> &mut R { &mut self.renderer }

  fn node_detail(&self, id: &str) -> Option<NodeDetail> {
    let node = self.elements.node(id)?;
    Some(NodeDetail {
      id:          node.id.clone(),
      label:       node.label.clone(),
      picture_url: node.picture_url.clone(),
      bio:         node.bio.clone(),
    })
  }

  fn edge_detail(&self, id: &str) -> Option<EdgeDetail> {
    let edge = self.elements.edge(id)?;
    let label = |node_id: &str| {
      self
        .elements
        .node(node_id)
        .map_or_else(|| node_id.to_owned(), |n| n.label.clone())
    };
    Some(EdgeDetail {
      id:           edge.id.clone(),
      kind:         edge.kind,
      source:       edge.source.clone(),
      target:       edge.target.clone(),
      source_label: label(&edge.source),
      target_label: label(&edge.target),
      emoji:        edge.emoji.clone(),
      context:      edge.context.clone(),
      image_url:    edge.image_url.clone(),
    })
  }
}
