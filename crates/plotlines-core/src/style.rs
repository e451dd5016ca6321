//! The renderer stylesheet for projected elements.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One selector and its style properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
  pub selector: String,
  pub style:    Value,
}

impl StyleRule {
  fn new(selector: &str, style: Value) -> Self {
    Self { selector: selector.to_owned(), style }
  }
}

/// Rules for default nodes, inactive nodes, default edges, friend and enemy
/// edges, and nodes without a picture, in cascade order.
pub fn stylesheet() -> Vec<StyleRule> {
  vec![
    StyleRule::new("node", json!({
      "background-image": "data(pictureURL)",
      "background-fit": "cover",
      "background-clip": "node",
      "background-color": "#0074D9",
      "label": "",
      "border-width": 2,
      "border-color": "data(borderColor)",
      "border-style": "data(borderStyle)",
      "width": 50,
      "height": 50,
    })),
    StyleRule::new("node.inactive", json!({
      "filter": "grayscale(100%)",
      "opacity": 0.5,
      "border-width": 2,
      "border-color": "#000",
      "border-style": "solid",
      "background-color": "#ccc",
    })),
    StyleRule::new("edge", json!({
      "width": 2,
      "line-color": "#aaa",
      "label": "data(emoji)",
      "font-size": 14,
      "text-rotation": "none",
      "text-justification": "center",
    })),
    StyleRule::new("edge[type=\"friend\"]", json!({
      "line-color": "green",
      "color": "green",
    })),
    StyleRule::new("edge[type=\"enemy\"]", json!({
      "line-color": "red",
      "color": "red",
    })),
    StyleRule::new("node[!pictureURL]", json!({
      "label": "data(label)",
      "font-size": 10,
      "background-color": "#0074D9",
    })),
  ]
}
