//! JSON REST API for plotlines.
//!
//! Exposes an axum [`Router`] backed by any [`plotlines_core::store::PlotStore`]
//! plus the in-memory [`tips::TipBoard`]. TLS and static files are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", plotlines_api::api_router(store.clone(), tips.clone()))
//! ```

pub mod enemies;
pub mod error;
pub mod friends;
pub mod graph;
pub mod pairs;
pub mod people;
pub mod tips;

use std::sync::Arc;

use axum::{Router, routing::get};
use plotlines_core::{PersonId, ValidationError, store::PlotStore};

pub use error::ApiError;
pub use tips::TipBoard;

/// Build a fully-materialised API router for `store` and `tips`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>, tips: Arc<TipBoard>) -> Router<()>
where
  S: PlotStore + 'static,
{
  let rows = Router::new()
    // People
    .route("/people", get(people::list::<S>).post(people::create::<S>))
    .route(
      "/people/{id}",
      get(people::get_one::<S>).patch(people::update::<S>).delete(people::remove::<S>),
    )
    // Relations
    .route(
      "/friends",
      get(friends::list::<S>).post(friends::create::<S>).delete(friends::remove::<S>),
    )
    .route(
      "/enemies",
      get(enemies::list::<S>).post(enemies::create::<S>).delete(enemies::remove::<S>),
    )
    .route(
      "/pairs",
      get(pairs::list::<S>).post(pairs::create::<S>).delete(pairs::remove::<S>),
    )
    // Projection
    .route("/graph", get(graph::elements::<S>))
    .route("/graph/style", get(graph::style))
    .with_state(store);

  let board = Router::new()
    .route("/tips", get(tips::list).post(tips::create))
    .with_state(tips);

  rows.merge(board)
}

/// Reject a relation whose endpoints are not both stored people.
pub(crate) async fn require_people<S: PlotStore>(
  store: &S,
  a: PersonId,
  b: PersonId,
) -> Result<(), ApiError> {
  for id in [a, b] {
    if store.get_person(id).await.map_err(ApiError::store)?.is_none() {
      return Err(ValidationError::UnknownPerson(id).into());
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
  };
  use plotlines_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  use super::*;

  async fn app() -> Router {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    api_router(store, Arc::new(TipBoard::default()))
  }

  async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let req = Request::builder().method(method).uri(uri);
    let req = match body {
      Some(b) => req
        .header("content-type", "application/json")
        .body(Body::from(b.to_string()))
        .unwrap(),
      None => req.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
  }

  /// Adds Ola (1), Kari (2) and Per (3).
  async fn cast(app: &Router) {
    for name in ["Ola", "Kari", "Per"] {
      let (status, _) = call(app, Method::POST, "/people", Some(json!({ "name": name }))).await;
      assert_eq!(status, StatusCode::CREATED);
    }
  }

  // ── Tips ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn tips_start_seeded_and_accept_new_entries() {
    let app = app().await;

    let (status, body) = call(&app, Method::GET, "/tips", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tips"].as_array().unwrap().len(), 4);

    let (status, body) =
      call(&app, Method::POST, "/tips", Some(json!({ "participant": "Ta med matpakke" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tips"][4], "Ta med matpakke");

    let (_, body) = call(&app, Method::GET, "/tips", None).await;
    assert_eq!(body["tips"].as_array().unwrap().len(), 5);
  }

  #[tokio::test]
  async fn blank_tip_is_appended_as_sent() {
    let app = app().await;
    let (status, body) = call(&app, Method::POST, "/tips", Some(json!({ "participant": "  " }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tips"].as_array().unwrap().len(), 5);
    assert_eq!(body["tips"][4], "  ");
  }

  // ── People ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn people_crud() {
    let app = app().await;

    let (status, created) = call(
      &app,
      Method::POST,
      "/people",
      Some(json!({ "name": "Ola", "pictureURL": "https://img.example/ola.png", "arrived": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], 1);
    assert_eq!(created["pictureURL"], "https://img.example/ola.png");

    let (status, updated) =
      call(&app, Method::PATCH, "/people/1", Some(json!({ "deactivated": 5, "pictureURL": null })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["deactivated"], 5);
    assert_eq!(updated["arrived"], 2);
    assert!(updated["pictureURL"].is_null());

    let (status, fetched) = call(&app, Method::GET, "/people/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);

    let (status, _) = call(&app, Method::DELETE, "/people/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(&app, Method::GET, "/people/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::DELETE, "/people/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = call(&app, Method::GET, "/people", None).await;
    assert_eq!(list, json!([]));
  }

  #[tokio::test]
  async fn blank_name_is_bad_request() {
    let app = app().await;
    let (status, _) = call(&app, Method::POST, "/people", Some(json!({ "name": " " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn patching_missing_person_is_not_found() {
    let app = app().await;
    let (status, body) =
      call(&app, Method::PATCH, "/people/9", Some(json!({ "deactivated": null }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "person 9 not found");
  }

  // ── Relations ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn friends_create_list_and_delete() {
    let app = app().await;
    cast(&app).await;

    let edge = json!({ "friend_1": 1, "friend_2": 2, "episode": 3, "emoji": "🤝" });
    let (status, _) = call(&app, Method::POST, "/friends", Some(edge)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = call(&app, Method::GET, "/friends", None).await;
    assert_eq!(list[0]["friend_1"], 1);
    assert_eq!(list[0]["emoji"], "🤝");

    let (status, _) =
      call(&app, Method::DELETE, "/friends?friend_1=2&friend_2=1&episode=3", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) =
      call(&app, Method::DELETE, "/friends?friend_1=1&friend_2=2&episode=3", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }

  #[tokio::test]
  async fn self_relations_are_bad_requests() {
    let app = app().await;
    cast(&app).await;

    let cases = [
      ("/friends", json!({ "friend_1": 1, "friend_2": 1, "episode": 1 })),
      ("/enemies", json!({ "enemy_1": 2, "enemy_2": 2 })),
      ("/pairs", json!({ "pair_1": 3, "pair_2": 3, "episode": 1 })),
    ];
    for (uri, body) in cases {
      let (status, _) = call(&app, Method::POST, uri, Some(body)).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
  }

  #[tokio::test]
  async fn relations_to_unknown_people_are_bad_requests() {
    let app = app().await;
    cast(&app).await;
    let (status, body) =
      call(&app, Method::POST, "/enemies", Some(json!({ "enemy_1": 1, "enemy_2": 77 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("77"));
  }

  #[tokio::test]
  async fn enemies_delete_in_either_order() {
    let app = app().await;
    cast(&app).await;
    call(&app, Method::POST, "/enemies", Some(json!({ "enemy_1": 1, "enemy_2": 3 }))).await;

    let (status, _) = call(&app, Method::DELETE, "/enemies?enemy_1=3&enemy_2=1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, list) = call(&app, Method::GET, "/enemies", None).await;
    assert_eq!(list, json!([]));
  }

  #[tokio::test]
  async fn pairing_a_paired_person_is_a_conflict() {
    let app = app().await;
    cast(&app).await;

    let (status, _) =
      call(&app, Method::POST, "/pairs", Some(json!({ "pair_1": 1, "pair_2": 2, "episode": 1 })))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) =
      call(&app, Method::POST, "/pairs", Some(json!({ "pair_1": 3, "pair_2": 1, "episode": 1 })))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) =
      call(&app, Method::POST, "/pairs", Some(json!({ "pair_1": 3, "pair_2": 1, "episode": 2 })))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(&app, Method::DELETE, "/pairs?pair_1=2&pair_2=1&episode=1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
  }

  // ── Projection ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn graph_projects_the_selected_episode() {
    let app = app().await;
    cast(&app).await;
    call(&app, Method::PATCH, "/people/3", Some(json!({ "arrived": 2 }))).await;
    call(&app, Method::PATCH, "/people/2", Some(json!({ "deactivated": 2 }))).await;
    call(&app, Method::POST, "/pairs", Some(json!({ "pair_1": 1, "pair_2": 2, "episode": 1 })))
      .await;
    call(
      &app,
      Method::POST,
      "/friends",
      Some(json!({ "friend_1": 1, "friend_2": 2, "episode": 1, "emoji": "💕" })),
    )
    .await;

    let (status, ep1) = call(&app, Method::GET, "/graph?episode=1", None).await;
    assert_eq!(status, StatusCode::OK);
    let ep1 = ep1.as_array().unwrap();
    // Kari, Ola (Per has not arrived), then the friendship.
    assert_eq!(ep1.len(), 3);
    assert_eq!(ep1[0]["data"]["label"], "Kari");
    assert_eq!(ep1[0]["data"]["borderColor"], "#f032e6");
    assert_eq!(ep1[2]["data"]["type"], "friend");
    assert_eq!(ep1[2]["data"]["emoji"], "💕");

    let (_, ep2) = call(&app, Method::GET, "/graph?episode=2", None).await;
    let ep2 = ep2.as_array().unwrap();
    assert_eq!(ep2.len(), 3);
    assert_eq!(ep2[0]["classes"], "inactive");
    assert!(ep2.iter().all(|el| el["data"].get("source").is_none()));

    let (_, flag) = call(&app, Method::GET, "/graph?episode=1&visibility=flag", None).await;
    assert_eq!(flag.as_array().unwrap().len(), 4);
  }

  #[tokio::test]
  async fn graph_requires_an_episode() {
    let app = app().await;
    let (status, _) = call(&app, Method::GET, "/graph", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn stylesheet_is_served() {
    let app = app().await;
    let (status, body) = call(&app, Method::GET, "/graph/style", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["selector"], "node");
  }
}
