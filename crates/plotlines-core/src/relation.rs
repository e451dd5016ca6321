//! Friend, enemy, and pair relations between two people.
//!
//! Rows keep the column names of their tables on the wire (`friend_1`,
//! `enemy_2`, `pair_1`, ...). Enemy and pair relations are symmetric: `(A, B)`
//! and `(B, A)` name the same relation.

use serde::{Deserialize, Serialize};

use crate::{
  error::ValidationError,
  person::{Episode, PersonId},
};

// ─── Endpoints ───────────────────────────────────────────────────────────────

/// Any row that links two people.
pub trait Endpoints {
  fn endpoints(&self) -> (PersonId, PersonId);

  fn touches(&self, id: PersonId) -> bool {
    let (a, b) = self.endpoints();
    a == id || b == id
  }

  /// Order-insensitive comparison of endpoints.
  fn links(&self, a: PersonId, b: PersonId) -> bool {
    let ends = self.endpoints();
    ends == (a, b) || ends == (b, a)
  }
}

/// Reject relations from a person to themselves.
pub fn check_distinct(a: PersonId, b: PersonId) -> Result<(), ValidationError> {
  if a == b {
    return Err(ValidationError::SelfRelation(a));
  }
  Ok(())
}

// ─── Friends ─────────────────────────────────────────────────────────────────

/// A friendship event in a particular episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendEdge {
  #[serde(rename = "friend_1")]
  pub person_a:  PersonId,
  #[serde(rename = "friend_2")]
  pub person_b:  PersonId,
  #[serde(default)]
  pub emoji:     Option<String>,
  #[serde(default)]
  pub context:   Option<String>,
  pub episode:   Episode,
  #[serde(rename = "imageURL", default)]
  pub image_url: Option<String>,
}

/// Uniqueness key of a friend edge. Direction matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FriendKey {
  #[serde(rename = "friend_1")]
  pub person_a: PersonId,
  #[serde(rename = "friend_2")]
  pub person_b: PersonId,
  pub episode:  Episode,
}

impl FriendEdge {
  pub fn new(person_a: PersonId, person_b: PersonId, episode: Episode) -> Self {
    Self {
      person_a,
      person_b,
      emoji: None,
      context: None,
      episode,
      image_url: None,
    }
  }

  pub fn key(&self) -> FriendKey {
    FriendKey {
      person_a: self.person_a,
      person_b: self.person_b,
      episode:  self.episode,
    }
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    check_distinct(self.person_a, self.person_b)
  }
}

impl Endpoints for FriendEdge {
  fn endpoints(&self) -> (PersonId, PersonId) { (self.person_a, self.person_b) }
}

// ─── Enemies ─────────────────────────────────────────────────────────────────

/// A standing rivalry. Not scoped to an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnemyEdge {
  #[serde(rename = "enemy_1")]
  pub person_a: PersonId,
  #[serde(rename = "enemy_2")]
  pub person_b: PersonId,
  #[serde(default)]
  pub emoji:    Option<String>,
  #[serde(default)]
  pub context:  Option<String>,
}

/// Identifies an enemy relation regardless of stored order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyKey {
  #[serde(rename = "enemy_1")]
  pub person_a: PersonId,
  #[serde(rename = "enemy_2")]
  pub person_b: PersonId,
}

impl EnemyEdge {
  pub fn new(person_a: PersonId, person_b: PersonId) -> Self {
    Self { person_a, person_b, emoji: None, context: None }
  }

  pub fn key(&self) -> EnemyKey {
    EnemyKey { person_a: self.person_a, person_b: self.person_b }
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    check_distinct(self.person_a, self.person_b)
  }
}

impl Endpoints for EnemyEdge {
  fn endpoints(&self) -> (PersonId, PersonId) { (self.person_a, self.person_b) }
}

impl EnemyKey {
  pub fn matches(&self, edge: &EnemyEdge) -> bool {
    edge.links(self.person_a, self.person_b)
  }
}

// ─── Pairs ───────────────────────────────────────────────────────────────────

/// An exclusive pairing for one episode. A person is in at most one pair per
/// episode; see [`check_pair_available`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PairEdge {
  #[serde(rename = "pair_1")]
  pub person_a: PersonId,
  #[serde(rename = "pair_2")]
  pub person_b: PersonId,
  pub episode:  Episode,
}

/// Identifies a pair regardless of stored order.
pub type PairKey = PairEdge;

impl PairEdge {
  pub fn new(person_a: PersonId, person_b: PersonId, episode: Episode) -> Self {
    Self { person_a, person_b, episode }
  }

  /// Symmetric match against another pair in the same episode.
  pub fn matches(&self, other: &PairEdge) -> bool {
    self.episode == other.episode && other.links(self.person_a, self.person_b)
  }

  pub fn validate(&self) -> Result<(), ValidationError> {
    check_distinct(self.person_a, self.person_b)
  }
}

impl Endpoints for PairEdge {
  fn endpoints(&self) -> (PersonId, PersonId) { (self.person_a, self.person_b) }
}

/// Check that neither endpoint of `candidate` is already paired in its
/// episode. Storage does not enforce this.
pub fn check_pair_available(
  existing: &[PairEdge],
  candidate: &PairEdge,
) -> Result<(), ValidationError> {
  for pair in existing.iter().filter(|p| p.episode == candidate.episode) {
    for person in [candidate.person_a, candidate.person_b] {
      if pair.touches(person) {
        return Err(ValidationError::AlreadyPaired {
          person,
          episode: candidate.episode,
        });
      }
    }
  }
  Ok(())
}
