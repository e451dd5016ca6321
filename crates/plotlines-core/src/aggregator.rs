//! The Data Aggregator: keeps a [`Snapshot`] in step with a [`PlotStore`].
//!
//! The store handle is injected; the aggregator never constructs one. Writes
//! follow a strict order:
//!
//! 1. validate locally, with no store call on failure;
//! 2. await the store write;
//! 3. merge into the snapshot only once the store has confirmed.
//!
//! A failed write leaves the snapshot untouched, so the visible rows and the
//! store never diverge under normal operation.

use std::sync::Arc;

use strum::Display;
use tracing::{debug, error, info, warn};

use crate::{
  error::{Error, Result, ValidationError},
  person::{Episode, NewPerson, Person, PersonId, PersonPatch},
  projection::{GraphElements, ProjectionOptions, project},
  relation::{
    EnemyEdge, EnemyKey, FriendEdge, FriendKey, PairEdge, PairKey, check_pair_available,
  },
  snapshot::Snapshot,
  store::PlotStore,
};

/// One of the four tables mirrored by the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Collection {
  People,
  Friends,
  Enemies,
  Pairs,
}

/// Outcome of [`Aggregator::load`]. Collections that failed to load kept
/// their previous rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
  pub failed: Vec<Collection>,
}

impl LoadReport {
  pub fn is_complete(&self) -> bool { self.failed.is_empty() }
}

pub struct Aggregator<S> {
  store:    Arc<S>,
  snapshot: Snapshot,
}

impl<S: PlotStore> Aggregator<S> {
  pub fn new(store: Arc<S>) -> Self {
    Self { store, snapshot: Snapshot::default() }
  }

  pub fn snapshot(&self) -> &Snapshot { &self.snapshot }

  /// Project the current snapshot. See [`project`].
  pub fn project(&self, episode: Episode, options: ProjectionOptions) -> GraphElements {
    project(&self.snapshot, episode, options)
  }

  // ── Loading ───────────────────────────────────────────────────────────────

  /// Fetch all four collections concurrently and replace each one that
  /// loaded. Nothing is written until every fetch has finished.
  pub async fn load(&mut self) -> LoadReport {
    let store = Arc::clone(&self.store);
    let (people, friends, enemies, pairs) = tokio::join!(
      store.list_people(),
      store.list_friends(),
      store.list_enemies(),
      store.list_pairs(),
    );

    let mut report = LoadReport::default();
    settle(&mut self.snapshot.people, people, Collection::People, &mut report);
    settle(&mut self.snapshot.friends, friends, Collection::Friends, &mut report);
    settle(&mut self.snapshot.enemies, enemies, Collection::Enemies, &mut report);
    settle(&mut self.snapshot.pairs, pairs, Collection::Pairs, &mut report);

    info!(
      people = self.snapshot.people.len(),
      friends = self.snapshot.friends.len(),
      enemies = self.snapshot.enemies.len(),
      pairs = self.snapshot.pairs.len(),
      failed = report.failed.len(),
      "snapshot loaded"
    );
    report
  }

  // ── People ────────────────────────────────────────────────────────────────

  pub async fn add_person(&mut self, input: NewPerson) -> Result<Person> {
    check("add person", input.validate())?;
    let person = self
      .store
      .add_person(input)
      .await
      .map_err(store_failed("add person"))?;
    self.snapshot.upsert_person(person.clone());
    Ok(person)
  }

  pub async fn update_person(&mut self, id: PersonId, patch: PersonPatch) -> Result<Person> {
    check("update person", patch.validate())?;
    let person = self
      .store
      .update_person(id, patch)
      .await
      .map_err(store_failed("update person"))?
      .ok_or(Error::PersonNotFound(id))?;
    self.snapshot.upsert_person(person.clone());
    Ok(person)
  }

  /// Mark a person as in or out of the show from `episode` on.
  pub async fn set_active(
    &mut self,
    id: PersonId,
    active: bool,
    episode: Episode,
  ) -> Result<Person> {
    self.update_person(id, PersonPatch::activity(active, episode)).await
  }

  /// Delete a person, then purge every local relation that references them.
  pub async fn remove_person(&mut self, id: PersonId) -> Result<bool> {
    let removed = self
      .store
      .remove_person(id)
      .await
      .map_err(store_failed("remove person"))?;
    self.snapshot.remove_person(id);
    Ok(removed)
  }

  // ── Friends ───────────────────────────────────────────────────────────────

  pub async fn add_friend(&mut self, edge: FriendEdge) -> Result<FriendEdge> {
    check("add friend", edge.validate())?;
    self.require_people("add friend", edge.person_a, edge.person_b)?;
    let edge = self
      .store
      .add_friend(edge)
      .await
      .map_err(store_failed("add friend"))?;
    self.snapshot.upsert_friend(edge.clone());
    Ok(edge)
  }

  pub async fn remove_friend(&mut self, key: FriendKey) -> Result<bool> {
    let removed = self
      .store
      .remove_friend(key)
      .await
      .map_err(store_failed("remove friend"))?;
    self.snapshot.remove_friend(&key);
    Ok(removed)
  }

  // ── Enemies ───────────────────────────────────────────────────────────────

  pub async fn add_enemy(&mut self, edge: EnemyEdge) -> Result<EnemyEdge> {
    check("add enemy", edge.validate())?;
    self.require_people("add enemy", edge.person_a, edge.person_b)?;
    let edge = self
      .store
      .add_enemy(edge)
      .await
      .map_err(store_failed("add enemy"))?;
    self.snapshot.push_enemy(edge.clone());
    Ok(edge)
  }

  pub async fn remove_enemy(&mut self, key: EnemyKey) -> Result<bool> {
    let removed = self
      .store
      .remove_enemy(key)
      .await
      .map_err(store_failed("remove enemy"))?;
    self.snapshot.remove_enemy(&key);
    Ok(removed)
  }

  // ── Pairs ─────────────────────────────────────────────────────────────────

  /// Record a pair. Either person already being paired in the same episode
  /// is a validation failure.
  pub async fn add_pair(&mut self, pair: PairEdge) -> Result<PairEdge> {
    check("add pair", pair.validate())?;
    self.require_people("add pair", pair.person_a, pair.person_b)?;
    check("add pair", check_pair_available(&self.snapshot.pairs, &pair))?;
    let pair = self
      .store
      .add_pair(pair)
      .await
      .map_err(store_failed("add pair"))?;
    self.snapshot.upsert_pair(pair);
    Ok(pair)
  }

  pub async fn remove_pair(&mut self, key: PairKey) -> Result<bool> {
    let removed = self
      .store
      .remove_pair(key)
      .await
      .map_err(store_failed("remove pair"))?;
    self.snapshot.remove_pair(&key);
    Ok(removed)
  }

  fn require_people(&self, action: &'static str, a: PersonId, b: PersonId) -> Result<()> {
    for id in [a, b] {
      if !self.snapshot.contains_person(id) {
        return check(action, Err(ValidationError::UnknownPerson(id)));
      }
    }
    Ok(())
  }
}

fn settle<T, E: std::error::Error>(
  slot: &mut Vec<T>,
  fetched: Result<Vec<T>, E>,
  collection: Collection,
  report: &mut LoadReport,
) {
  match fetched {
    Ok(rows) => {
      debug!(%collection, rows = rows.len(), "fetched");
      *slot = rows;
    }
    Err(err) => {
      warn!(%collection, error = %err, "fetch failed, keeping previous rows");
      report.failed.push(collection);
    }
  }
}

fn check(action: &'static str, outcome: Result<(), ValidationError>) -> Result<()> {
  outcome.map_err(|err| {
    debug!(action, error = %err, "rejected before store call");
    Error::Validation(err)
  })
}

fn store_failed<E>(action: &'static str) -> impl FnOnce(E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  move |err| {
    error!(action, error = %err, "store write failed, local state unchanged");
    Error::Store(Box::new(err))
  }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::HashSet,
    sync::{
      Mutex,
      atomic::{AtomicI64, AtomicUsize, Ordering},
    },
  };

  use super::*;
  use crate::relation::Endpoints as _;

  #[derive(Debug, thiserror::Error)]
  #[error("fake store refused {0}")]
  struct Refused(&'static str);

  /// In-memory store with per-operation failure injection.
  #[derive(Default)]
  struct FakeStore {
    rows:    Mutex<Snapshot>,
    next_id: AtomicI64,
    calls:   AtomicUsize,
    failing: Mutex<HashSet<&'static str>>,
  }

  impl FakeStore {
    fn seeded(rows: Snapshot) -> Self {
      let next = rows.people.iter().map(|p| p.id).max().unwrap_or(0);
      Self {
        rows: Mutex::new(rows),
        next_id: AtomicI64::new(next),
        ..Self::default()
      }
    }

    fn fail(&self, op: &'static str) { self.failing.lock().unwrap().insert(op); }

    fn enter(&self, op: &'static str) -> Result<(), Refused> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if self.failing.lock().unwrap().contains(op) {
        return Err(Refused(op));
      }
      Ok(())
    }

    fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
  }

  impl PlotStore for FakeStore {
    type Error = Refused;

    async fn list_people(&self) -> Result<Vec<Person>, Refused> {
      self.enter("list_people")?;
      Ok(self.rows.lock().unwrap().people.clone())
    }

    async fn get_person(&self, id: PersonId) -> Result<Option<Person>, Refused> {
      self.enter("get_person")?;
      Ok(self.rows.lock().unwrap().person(id).cloned())
    }

    async fn add_person(&self, input: NewPerson) -> Result<Person, Refused> {
      self.enter("add_person")?;
      let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
      let person = input.into_person(id);
      self.rows.lock().unwrap().upsert_person(person.clone());
      Ok(person)
    }

    async fn update_person(
      &self,
      id: PersonId,
      patch: PersonPatch,
    ) -> Result<Option<Person>, Refused> {
      self.enter("update_person")?;
      let mut rows = self.rows.lock().unwrap();
      Ok(rows.people.iter_mut().find(|p| p.id == id).map(|p| {
        patch.apply(p);
        p.clone()
      }))
    }

    async fn remove_person(&self, id: PersonId) -> Result<bool, Refused> {
      self.enter("remove_person")?;
      Ok(self.rows.lock().unwrap().remove_person(id))
    }

    async fn list_friends(&self) -> Result<Vec<FriendEdge>, Refused> {
      self.enter("list_friends")?;
      Ok(self.rows.lock().unwrap().friends.clone())
    }

    async fn add_friend(&self, edge: FriendEdge) -> Result<FriendEdge, Refused> {
      self.enter("add_friend")?;
      self.rows.lock().unwrap().upsert_friend(edge.clone());
      Ok(edge)
    }

    async fn remove_friend(&self, key: FriendKey) -> Result<bool, Refused> {
      self.enter("remove_friend")?;
      Ok(self.rows.lock().unwrap().remove_friend(&key))
    }

    async fn list_enemies(&self) -> Result<Vec<EnemyEdge>, Refused> {
      self.enter("list_enemies")?;
      Ok(self.rows.lock().unwrap().enemies.clone())
    }

    async fn add_enemy(&self, edge: EnemyEdge) -> Result<EnemyEdge, Refused> {
      self.enter("add_enemy")?;
      self.rows.lock().unwrap().push_enemy(edge.clone());
      Ok(edge)
    }

    async fn remove_enemy(&self, key: EnemyKey) -> Result<bool, Refused> {
      self.enter("remove_enemy")?;
      Ok(self.rows.lock().unwrap().remove_enemy(&key))
    }

    async fn list_pairs(&self) -> Result<Vec<PairEdge>, Refused> {
      self.enter("list_pairs")?;
      Ok(self.rows.lock().unwrap().pairs.clone())
    }

    async fn add_pair(&self, pair: PairEdge) -> Result<PairEdge, Refused> {
      self.enter("add_pair")?;
      self.rows.lock().unwrap().pairs.push(pair);
      Ok(pair)
    }

    async fn remove_pair(&self, key: PairKey) -> Result<bool, Refused> {
      self.enter("remove_pair")?;
      Ok(self.rows.lock().unwrap().remove_pair(&key))
    }
  }

  fn seed() -> Snapshot {
    Snapshot {
      people:  vec![
        NewPerson::named("Alexander").into_person(1),
        NewPerson::named("Benedicte").into_person(2),
        NewPerson::named("Celine").into_person(3),
      ],
      friends: vec![FriendEdge::new(1, 2, 1), FriendEdge::new(2, 3, 2)],
      enemies: vec![EnemyEdge::new(1, 3)],
      pairs:   vec![PairEdge::new(1, 2, 1)],
    }
  }

  async fn loaded(store: FakeStore) -> (Arc<FakeStore>, Aggregator<FakeStore>) {
    let store = Arc::new(store);
    let mut agg = Aggregator::new(Arc::clone(&store));
    assert!(agg.load().await.is_complete());
    (store, agg)
  }

  #[tokio::test]
  async fn load_fills_every_collection() {
    let (_, agg) = loaded(FakeStore::seeded(seed())).await;
    assert_eq!(*agg.snapshot(), seed());
  }

  #[tokio::test]
  async fn failed_fetch_keeps_previous_rows_for_that_collection_only() {
    let (store, mut agg) = loaded(FakeStore::seeded(seed())).await;

    store.rows.lock().unwrap().friends.clear();
    store.rows.lock().unwrap().enemies.clear();
    store.fail("list_friends");

    let report = agg.load().await;
    assert_eq!(report.failed, [Collection::Friends]);
    assert_eq!(agg.snapshot().friends, seed().friends);
    assert!(agg.snapshot().enemies.is_empty());
  }

  #[tokio::test]
  async fn first_load_failure_leaves_collection_empty() {
    let store = FakeStore::seeded(seed());
    store.fail("list_people");
    let mut agg = Aggregator::new(Arc::new(store));

    let report = agg.load().await;
    assert!(!report.is_complete());
    assert!(agg.snapshot().people.is_empty());
    assert_eq!(agg.snapshot().pairs, seed().pairs);
  }

  #[tokio::test]
  async fn self_relations_never_reach_the_store() {
    let (store, mut agg) = loaded(FakeStore::seeded(seed())).await;
    let before = store.calls();

    let err = agg.add_friend(FriendEdge::new(2, 2, 1)).await.unwrap_err();
    assert!(err.is_validation());
    assert!(agg.add_enemy(EnemyEdge::new(3, 3)).await.unwrap_err().is_validation());
    assert!(agg.add_pair(PairEdge::new(1, 1, 4)).await.unwrap_err().is_validation());
    assert!(agg.add_person(NewPerson::named("")).await.unwrap_err().is_validation());

    assert_eq!(store.calls(), before);
    assert_eq!(*agg.snapshot(), seed());
  }

  #[tokio::test]
  async fn pairing_someone_twice_in_an_episode_is_rejected_locally() {
    let (store, mut agg) = loaded(FakeStore::seeded(seed())).await;
    let before = store.calls();

    let err = agg.add_pair(PairEdge::new(3, 2, 1)).await.unwrap_err();
    assert!(matches!(
      err,
      Error::Validation(ValidationError::AlreadyPaired { person: 2, episode: 1 })
    ));
    assert_eq!(store.calls(), before);

    agg.add_pair(PairEdge::new(3, 2, 2)).await.unwrap();
    assert_eq!(agg.snapshot().pairs.len(), 2);
  }

  #[tokio::test]
  async fn relations_to_unknown_people_are_rejected() {
    let (_, mut agg) = loaded(FakeStore::seeded(seed())).await;
    let err = agg.add_enemy(EnemyEdge::new(1, 42)).await.unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::UnknownPerson(42))));
  }

  #[tokio::test]
  async fn failed_writes_leave_the_snapshot_untouched() {
    let (store, mut agg) = loaded(FakeStore::seeded(seed())).await;
    store.fail("add_person");
    store.fail("remove_person");
    store.fail("remove_pair");

    assert!(matches!(agg.add_person(NewPerson::named("Dina")).await, Err(Error::Store(_))));
    assert!(agg.remove_person(1).await.is_err());
    assert!(agg.remove_pair(PairEdge::new(2, 1, 1)).await.is_err());
    assert_eq!(*agg.snapshot(), seed());
  }

  #[tokio::test]
  async fn confirmed_writes_are_merged() {
    let (store, mut agg) = loaded(FakeStore::seeded(seed())).await;

    let dina = agg.add_person(NewPerson::named("Dina")).await.unwrap();
    assert_eq!(dina.id, 4);
    assert_eq!(agg.snapshot().person(4), Some(&dina));

    let mut edge = FriendEdge::new(4, 1, 3);
    edge.emoji = Some("🥂".into());
    agg.add_friend(edge.clone()).await.unwrap();
    assert!(agg.snapshot().friends.contains(&edge));

    let updated = agg.set_active(4, false, 5).await.unwrap();
    assert_eq!(updated.deactivated, Some(5));
    assert_eq!(agg.snapshot().person(4).unwrap().deactivated, Some(5));

    // Local and remote agree after every step.
    let mut fresh = Aggregator::new(Arc::clone(&store));
    fresh.load().await;
    assert_eq!(fresh.snapshot(), agg.snapshot());
  }

  #[tokio::test]
  async fn updating_a_missing_person_is_not_found() {
    let (_, mut agg) = loaded(FakeStore::seeded(seed())).await;
    let err = agg.update_person(99, PersonPatch::activity(true, 1)).await.unwrap_err();
    assert!(matches!(err, Error::PersonNotFound(99)));
  }

  #[tokio::test]
  async fn removing_a_person_cascades_through_the_projection() {
    let (_, mut agg) = loaded(FakeStore::seeded(seed())).await;
    assert!(agg.remove_person(2).await.unwrap());

    let snap = agg.snapshot();
    assert!(snap.friends.iter().all(|f| !f.touches(2)));
    assert!(snap.pairs.iter().all(|p| !p.touches(2)));

    for ep in 1..=3 {
      let out = agg.project(ep, ProjectionOptions::default());
      assert!(out.node("2").is_none());
      assert!(out.edges().all(|e| e.source != "2" && e.target != "2"));
    }
  }

  #[tokio::test]
  async fn pairs_are_removed_by_either_order() {
    let (store, mut agg) = loaded(FakeStore::seeded(seed())).await;
    assert!(agg.remove_pair(PairEdge::new(2, 1, 1)).await.unwrap());
    assert!(agg.snapshot().pairs.is_empty());
    assert!(store.rows.lock().unwrap().pairs.is_empty());
  }
}
