//! The `PlotStore` trait: the relational store behind the dashboard.
//!
//! The trait is implemented by storage backends (e.g. `plotlines-store-sqlite`)
//! and by remote clients (the CLI talks to the server over HTTP). Higher layers
//! depend on this abstraction, not on any concrete backend.
//!
//! Stores only persist rows. Application rules (no self-relations, one pair
//! per person per episode) are checked by callers before writing.

use std::future::Future;

use crate::{
  person::{NewPerson, Person, PersonId, PersonPatch},
  relation::{EnemyEdge, EnemyKey, FriendEdge, FriendKey, PairEdge, PairKey},
};

/// Abstraction over the four tables `people`, `friends`, `enemies`, `pairs`.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait PlotStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  /// All people, ordered by name.
  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  /// Retrieve a person by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Insert a person and return the stored row with its assigned id.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Apply `patch` and return the updated row, or `None` if `id` is unknown.
  fn update_person(
    &self,
    id: PersonId,
    patch: PersonPatch,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Delete a person and every relation that references them. Returns
  /// `false` if the person did not exist.
  fn remove_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Friends ───────────────────────────────────────────────────────────

  fn list_friends(
    &self,
  ) -> impl Future<Output = Result<Vec<FriendEdge>, Self::Error>> + Send + '_;

  fn add_friend(
    &self,
    edge: FriendEdge,
  ) -> impl Future<Output = Result<FriendEdge, Self::Error>> + Send + '_;

  /// Delete by exact `(friend_1, friend_2, episode)`.
  fn remove_friend(
    &self,
    key: FriendKey,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Enemies ───────────────────────────────────────────────────────────

  fn list_enemies(
    &self,
  ) -> impl Future<Output = Result<Vec<EnemyEdge>, Self::Error>> + Send + '_;

  fn add_enemy(
    &self,
    edge: EnemyEdge,
  ) -> impl Future<Output = Result<EnemyEdge, Self::Error>> + Send + '_;

  /// Delete regardless of which endpoint was stored first.
  fn remove_enemy(
    &self,
    key: EnemyKey,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Pairs ─────────────────────────────────────────────────────────────

  fn list_pairs(
    &self,
  ) -> impl Future<Output = Result<Vec<PairEdge>, Self::Error>> + Send + '_;

  fn add_pair(
    &self,
    pair: PairEdge,
  ) -> impl Future<Output = Result<PairEdge, Self::Error>> + Send + '_;

  /// Delete regardless of which endpoint was stored first.
  fn remove_pair(
    &self,
    key: PairKey,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
