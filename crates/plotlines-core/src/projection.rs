//! Graph projection: snapshot + selected episode → renderable elements.
//!
//! [`project`] is a pure function. It computes who is on screen, which pair
//! each person belongs to this episode, and which relations to draw, and
//! returns elements in the shape the renderer consumes:
//! `{ "data": { ... }, "classes": "..." }`, nodes first, then friend edges,
//! then enemy edges.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::{
  person::{Episode, Person, PersonId, Presence, VisibilityModel},
  relation::{EnemyEdge, FriendEdge, PairEdge},
  snapshot::Snapshot,
};

/// Border colors handed out to pairs, in order, wrapping around.
pub const PALETTE: [&str; 8] = [
  "#f032e6", "#f58231", "#46f0f0", "#ffe119",
  "#6a3d9a", "#ff9f80", "#008080", "#808000",
];

/// Class attached to people who have left the show.
pub const INACTIVE_CLASS: &str = "inactive";

// ─── Options ─────────────────────────────────────────────────────────────────

/// Which pairs take part in color assignment.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PairScope {
  /// Only pairs recorded for the selected episode.
  #[default]
  Episode,
  /// Every pair, whatever its episode.
  All,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionOptions {
  #[serde(default)]
  pub visibility: VisibilityModel,
  #[serde(default)]
  pub pair_scope: PairScope,
}

// ─── Elements ────────────────────────────────────────────────────────────────

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EdgeKind {
  Friend,
  Enemy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
  pub id:           String,
  pub label:        String,
  #[serde(rename = "pictureURL", default, skip_serializing_if = "Option::is_none")]
  pub picture_url:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub bio:          Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub border_color: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub border_style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
  pub id:        String,
  pub source:    String,
  pub target:    String,
  #[serde(rename = "type")]
  pub kind:      EdgeKind,
  pub emoji:     String,
  pub context:   String,
  #[serde(rename = "imageURL", default, skip_serializing_if = "Option::is_none")]
  pub image_url: Option<String>,
}

/// Payload of an element. Edges are tried first when deserialising since a
/// node has no `source`/`target`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementData {
  Edge(EdgeData),
  Node(NodeData),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
  pub data:    ElementData,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub classes: Option<String>,
}

impl Element {
  pub fn id(&self) -> &str {
    match &self.data {
      ElementData::Edge(e) => &e.id,
      ElementData::Node(n) => &n.id,
    }
  }

  pub fn is_inactive(&self) -> bool {
    self
      .classes
      .as_deref()
      .is_some_and(|c| c.split_whitespace().any(|c| c == INACTIVE_CLASS))
  }
}

/// The ordered element list produced by [`project`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GraphElements(pub Vec<Element>);

impl GraphElements {
  pub fn len(&self) -> usize { self.0.len() }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> std::slice::Iter<'_, Element> { self.0.iter() }

  /// Nodes with their inactive flag.
  pub fn nodes(&self) -> impl Iterator<Item = (&NodeData, bool)> + '_ {
    self.0.iter().filter_map(|el| match &el.data {
      ElementData::Node(n) => Some((n, el.is_inactive())),
      ElementData::Edge(_) => None,
    })
  }

  pub fn edges(&self) -> impl Iterator<Item = &EdgeData> + '_ {
    self.0.iter().filter_map(|el| match &el.data {
      ElementData::Edge(e) => Some(e),
      ElementData::Node(_) => None,
    })
  }

  pub fn node(&self, id: &str) -> Option<&NodeData> {
    self.nodes().map(|(n, _)| n).find(|n| n.id == id)
  }

  pub fn edge(&self, id: &str) -> Option<&EdgeData> {
    self.edges().find(|e| e.id == id)
  }
}

impl IntoIterator for GraphElements {
  type Item = Element;
  type IntoIter = std::vec::IntoIter<Element>;

  fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

// ─── Projection ──────────────────────────────────────────────────────────────

/// Assign `PALETTE[i % len]` to both endpoints of the i-th pair in scope.
pub fn pair_colors(
  pairs: &[PairEdge],
  episode: Episode,
  scope: PairScope,
) -> HashMap<PersonId, &'static str> {
  let mut colors = HashMap::new();
  let in_scope = pairs
    .iter()
    .filter(|p| scope == PairScope::All || p.episode == episode);
  for (i, pair) in in_scope.enumerate() {
    let color = PALETTE[i % PALETTE.len()];
    colors.insert(pair.person_a, color);
    colors.insert(pair.person_b, color);
  }
  colors
}

/// Project `snapshot` as of `episode`.
///
/// - People who have not arrived yet are left out; people who have left are
///   kept with the `inactive` class.
/// - Friend edges are drawn only in their own episode, and only when both
///   people are on screen.
/// - Enemy edges are drawn in every episode. They are only dropped when an
///   endpoint is missing from the people collection altogether.
pub fn project(
  snapshot: &Snapshot,
  episode: Episode,
  options: ProjectionOptions,
) -> GraphElements {
  let colors = pair_colors(&snapshot.pairs, episode, options.pair_scope);
  let known: HashSet<PersonId> = snapshot.people.iter().map(|p| p.id).collect();

  let mut on_screen = HashSet::new();
  let mut elements = Vec::new();

  for person in &snapshot.people {
    let presence = person.presence(episode, options.visibility);
    if presence == Presence::NotArrived {
      continue;
    }
    on_screen.insert(person.id);
    elements.push(node_element(
      person,
      colors.get(&person.id).copied(),
      presence == Presence::Departed,
    ));
  }

  let friends = snapshot
    .friends
    .iter()
    .filter(|f| f.episode == episode)
    .filter(|f| on_screen.contains(&f.person_a) && on_screen.contains(&f.person_b));
  elements.extend(friends.enumerate().map(|(i, f)| friend_element(i, f)));

  let enemies = snapshot
    .enemies
    .iter()
    .filter(|e| known.contains(&e.person_a) && known.contains(&e.person_b));
  elements.extend(enemies.enumerate().map(|(i, e)| enemy_element(i, e)));

  GraphElements(elements)
}

fn node_element(person: &Person, color: Option<&str>, inactive: bool) -> Element {
  Element {
    data:    ElementData::Node(NodeData {
      id:           person.id.to_string(),
      label:        person.name.clone(),
      picture_url:  person.picture_url.clone(),
      bio:          person.bio.clone(),
      border_color: color.map(str::to_owned),
      border_style: color.map(|_| "solid".to_owned()),
    }),
    classes: inactive.then(|| INACTIVE_CLASS.to_owned()),
  }
}

fn friend_element(index: usize, edge: &FriendEdge) -> Element {
  Element {
    data:    ElementData::Edge(EdgeData {
      id:        format!("fr{index}"),
      source:    edge.person_a.to_string(),
      target:    edge.person_b.to_string(),
      kind:      EdgeKind::Friend,
      emoji:     edge.emoji.clone().unwrap_or_default(),
      context:   edge.context.clone().unwrap_or_default(),
      image_url: edge.image_url.clone(),
    }),
    classes: None,
  }
}

fn enemy_element(index: usize, edge: &EnemyEdge) -> Element {
  Element {
    data:    ElementData::Edge(EdgeData {
      id:        format!("en{index}"),
      source:    edge.person_a.to_string(),
      target:    edge.person_b.to_string(),
      kind:      EdgeKind::Enemy,
      emoji:     edge.emoji.clone().unwrap_or_default(),
      context:   edge.context.clone().unwrap_or_default(),
      image_url: None,
    }),
    classes: None,
  }
}
