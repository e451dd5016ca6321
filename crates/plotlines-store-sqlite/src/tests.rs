//! Integration tests for `SqliteStore` against an in-memory database.

use plotlines_core::{
  person::{NewPerson, PersonPatch},
  relation::{EnemyEdge, FriendEdge, PairEdge},
  store::PlotStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A store holding Ola (1), Kari (2) and Per (3).
async fn cast() -> SqliteStore {
  let s = store().await;
  for name in ["Ola", "Kari", "Per"] {
    s.add_person(NewPerson::named(name)).await.unwrap();
  }
  s
}

// ─── People ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_person() {
  let s = store().await;

  let mut input = NewPerson::named("Ingrid");
  input.picture_url = Some("https://img.example/ingrid.png".into());
  input.arrived = Some(3);
  let person = s.add_person(input).await.unwrap();
  assert_eq!(person.id, 1);

  let fetched = s.get_person(person.id).await.unwrap();
  assert_eq!(fetched, Some(person));
}

#[tokio::test]
async fn get_person_missing_returns_none() {
  let s = store().await;
  assert!(s.get_person(42).await.unwrap().is_none());
}

#[tokio::test]
async fn people_are_listed_by_name() {
  let s = store().await;
  for name in ["per", "Kari", "ola"] {
    s.add_person(NewPerson::named(name)).await.unwrap();
  }

  let names: Vec<_> = s
    .list_people()
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.name)
    .collect();
  assert_eq!(names, ["Kari", "ola", "per"]);
}

#[tokio::test]
async fn update_applies_only_present_fields() {
  let s = store().await;
  let mut input = NewPerson::named("Ola");
  input.bio = Some("Fisherman".into());
  let ola = s.add_person(input).await.unwrap();

  let updated = s
    .update_person(ola.id, PersonPatch::activity(false, 4))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(updated.deactivated, Some(4));
  assert_eq!(updated.bio.as_deref(), Some("Fisherman"));

  let cleared = s
    .update_person(ola.id, PersonPatch { bio: Some(None), ..PersonPatch::default() })
    .await
    .unwrap()
    .unwrap();
  assert_eq!(cleared.bio, None);
  assert_eq!(cleared.deactivated, Some(4));

  assert_eq!(s.get_person(ola.id).await.unwrap(), Some(cleared));
}

#[tokio::test]
async fn update_missing_person_returns_none() {
  let s = store().await;
  let out = s.update_person(7, PersonPatch::activity(true, 1)).await.unwrap();
  assert!(out.is_none());
}

#[tokio::test]
async fn removing_a_person_cascades_to_every_relation() {
  let s = cast().await;
  s.add_friend(FriendEdge::new(1, 2, 1)).await.unwrap();
  s.add_friend(FriendEdge::new(3, 1, 2)).await.unwrap();
  s.add_friend(FriendEdge::new(2, 3, 2)).await.unwrap();
  s.add_enemy(EnemyEdge::new(2, 1)).await.unwrap();
  s.add_pair(PairEdge::new(1, 3, 1)).await.unwrap();

  assert!(s.remove_person(1).await.unwrap());
  assert!(!s.remove_person(1).await.unwrap());

  assert_eq!(s.list_friends().await.unwrap(), [FriendEdge::new(2, 3, 2)]);
  assert!(s.list_enemies().await.unwrap().is_empty());
  assert!(s.list_pairs().await.unwrap().is_empty());
}

// ─── Friends ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn friends_round_trip_with_annotations() {
  let s = cast().await;
  let mut edge = FriendEdge::new(1, 2, 3);
  edge.emoji = Some("🤝".into());
  edge.context = Some("Cooked dinner together".into());
  edge.image_url = Some("https://img.example/dinner.jpg".into());

  s.add_friend(edge.clone()).await.unwrap();
  assert_eq!(s.list_friends().await.unwrap(), [edge]);
}

#[tokio::test]
async fn re_adding_a_friend_replaces_annotations() {
  let s = cast().await;
  s.add_friend(FriendEdge::new(1, 2, 1)).await.unwrap();

  let mut edge = FriendEdge::new(1, 2, 1);
  edge.emoji = Some("😂".into());
  s.add_friend(edge.clone()).await.unwrap();

  assert_eq!(s.list_friends().await.unwrap(), [edge]);
}

#[tokio::test]
async fn friend_removal_is_directional() {
  let s = cast().await;
  s.add_friend(FriendEdge::new(1, 2, 1)).await.unwrap();

  assert!(!s.remove_friend(FriendEdge::new(2, 1, 1).key()).await.unwrap());
  assert!(!s.remove_friend(FriendEdge::new(1, 2, 2).key()).await.unwrap());
  assert!(s.remove_friend(FriendEdge::new(1, 2, 1).key()).await.unwrap());
  assert!(s.list_friends().await.unwrap().is_empty());
}

#[tokio::test]
async fn friends_keep_insertion_order() {
  let s = cast().await;
  let edges = [FriendEdge::new(3, 1, 2), FriendEdge::new(1, 2, 1), FriendEdge::new(2, 3, 1)];
  for e in &edges {
    s.add_friend(e.clone()).await.unwrap();
  }
  assert_eq!(s.list_friends().await.unwrap(), edges);
}

#[tokio::test]
async fn friends_with_unknown_people_are_refused() {
  let s = cast().await;
  assert!(s.add_friend(FriendEdge::new(1, 99, 1)).await.is_err());
  assert!(s.list_friends().await.unwrap().is_empty());
}

// ─── Enemies ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn enemies_are_removed_in_either_order() {
  let s = cast().await;
  let mut edge = EnemyEdge::new(1, 3);
  edge.emoji = Some("😠".into());
  s.add_enemy(edge.clone()).await.unwrap();
  assert_eq!(s.list_enemies().await.unwrap(), [edge.clone()]);

  assert!(s.remove_enemy(EnemyEdge::new(3, 1).key()).await.unwrap());
  assert!(s.list_enemies().await.unwrap().is_empty());
}

#[tokio::test]
async fn self_rivalry_is_refused_by_the_schema() {
  let s = cast().await;
  assert!(s.add_enemy(EnemyEdge::new(2, 2)).await.is_err());
}

// ─── Pairs ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn pairs_are_unique_in_either_order() {
  let s = cast().await;
  s.add_pair(PairEdge::new(1, 2, 1)).await.unwrap();
  s.add_pair(PairEdge::new(2, 1, 1)).await.unwrap();
  s.add_pair(PairEdge::new(1, 2, 2)).await.unwrap();

  assert_eq!(
    s.list_pairs().await.unwrap(),
    [PairEdge::new(1, 2, 1), PairEdge::new(1, 2, 2)]
  );
}

#[tokio::test]
async fn pairs_are_removed_in_either_order_within_an_episode() {
  let s = cast().await;
  s.add_pair(PairEdge::new(1, 2, 1)).await.unwrap();
  s.add_pair(PairEdge::new(1, 2, 2)).await.unwrap();

  assert!(s.remove_pair(PairEdge::new(2, 1, 1)).await.unwrap());
  assert!(!s.remove_pair(PairEdge::new(2, 1, 1)).await.unwrap());
  assert_eq!(s.list_pairs().await.unwrap(), [PairEdge::new(1, 2, 2)]);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_a_file_keeps_rows() {
  let dir = std::env::temp_dir().join(format!("plotlines-store-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("reopen.db");
  let _ = std::fs::remove_file(&path);

  {
    let s = SqliteStore::open(&path).await.unwrap();
    s.add_person(NewPerson::named("Solveig")).await.unwrap();
  }

  let s = SqliteStore::open(&path).await.unwrap();
  let people = s.list_people().await.unwrap();
  assert_eq!(people.len(), 1);
  assert_eq!(people[0].name, "Solveig");

  std::fs::remove_dir_all(&dir).ok();
}
