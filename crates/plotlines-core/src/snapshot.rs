//! The in-memory copy of the four store tables.
//!
//! A snapshot is a cache, never the source of truth: it is rebuilt wholesale
//! on load and merged into only after the store has confirmed a write.

use serde::{Deserialize, Serialize};

use crate::{
  person::{Person, PersonId},
  relation::{EnemyEdge, EnemyKey, Endpoints, FriendEdge, FriendKey, PairEdge, PairKey},
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
  pub people:  Vec<Person>,
  pub friends: Vec<FriendEdge>,
  pub enemies: Vec<EnemyEdge>,
  pub pairs:   Vec<PairEdge>,
}

impl Snapshot {
  pub fn person(&self, id: PersonId) -> Option<&Person> {
    self.people.iter().find(|p| p.id == id)
  }

  pub fn contains_person(&self, id: PersonId) -> bool { self.person(id).is_some() }

  /// Insert or replace by id.
  pub fn upsert_person(&mut self, person: Person) {
    match self.people.iter_mut().find(|p| p.id == person.id) {
      Some(slot) => *slot = person,
      None => self.people.push(person),
    }
  }

  /// Remove a person together with every relation that references them.
  /// Returns `true` if the person was present.
  pub fn remove_person(&mut self, id: PersonId) -> bool {
    let before = self.people.len();
    self.people.retain(|p| p.id != id);
    self.friends.retain(|f| !f.touches(id));
    self.enemies.retain(|e| !e.touches(id));
    self.pairs.retain(|p| !p.touches(id));
    self.people.len() != before
  }

  /// Insert or replace by `(friend_1, friend_2, episode)`.
  pub fn upsert_friend(&mut self, edge: FriendEdge) {
    let key = edge.key();
    match self.friends.iter_mut().find(|f| f.key() == key) {
      Some(slot) => *slot = edge,
      None => self.friends.push(edge),
    }
  }

  pub fn remove_friend(&mut self, key: &FriendKey) -> bool {
    let before = self.friends.len();
    self.friends.retain(|f| f.key() != *key);
    self.friends.len() != before
  }

  pub fn push_enemy(&mut self, edge: EnemyEdge) { self.enemies.push(edge); }

  pub fn remove_enemy(&mut self, key: &EnemyKey) -> bool {
    let before = self.enemies.len();
    self.enemies.retain(|e| !key.matches(e));
    self.enemies.len() != before
  }

  /// Insert unless the same pair (in either order) is already recorded for
  /// the episode.
  pub fn upsert_pair(&mut self, pair: PairEdge) {
    if !self.pairs.iter().any(|p| p.matches(&pair)) {
      self.pairs.push(pair);
    }
  }

  pub fn remove_pair(&mut self, key: &PairKey) -> bool {
    let before = self.pairs.len();
    self.pairs.retain(|p| !key.matches(p));
    self.pairs.len() != before
  }
}
