//! [`HttpStore`]: a [`PlotStore`] that talks to a plotlines server over its
//! JSON API.

use std::time::Duration;

use plotlines_core::{
  Episode,
  person::{NewPerson, Person, PersonId, PersonPatch},
  projection::{GraphElements, ProjectionOptions},
  relation::{EnemyEdge, EnemyKey, FriendEdge, FriendKey, PairEdge, PairKey},
  store::PlotStore,
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use thiserror::Error;

/// Connection settings for the plotlines API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("failed to build HTTP client: {0}")]
  Build(#[source] reqwest::Error),

  #[error("{method} {path} failed: {source}")]
  Transport {
    method: Method,
    path:   String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{method} {path} → {status}: {message}")]
  Status {
    method:  Method,
    path:    String,
    status:  StatusCode,
    message: String,
  },
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Async HTTP client for the plotlines JSON REST API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct HttpStore {
  client: Client,
  config: ApiConfig,
}

impl HttpStore {
  pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .map_err(ClientError::Build)?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}/api{}", self.config.base_url.trim_end_matches('/'), path)
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self.client.request(method, self.url(path))
  }

  /// Send and decode a JSON body. Non-success statuses become
  /// [`ClientError::Status`] carrying the server's `error` message.
  async fn fetch<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    req: RequestBuilder,
  ) -> Result<T, ClientError> {
    let resp = self.send(method.clone(), path, req).await?;
    if !resp.status().is_success() {
      return Err(status_error(method, path, resp).await);
    }
    resp
      .json()
      .await
      .map_err(|source| ClientError::Transport { method, path: path.to_owned(), source })
  }

  /// Send a request that answers `204` on success and `404` when there was
  /// nothing to act on.
  async fn found(
    &self,
    method: Method,
    path: &str,
    req: RequestBuilder,
  ) -> Result<bool, ClientError> {
    let resp = self.send(method.clone(), path, req).await?;
    match resp.status() {
      StatusCode::NOT_FOUND => Ok(false),
      s if s.is_success() => Ok(true),
      _ => Err(status_error(method, path, resp).await),
    }
  }

  async fn send(
    &self,
    method: Method,
    path: &str,
    req: RequestBuilder,
  ) -> Result<reqwest::Response, ClientError> {
    tracing::debug!(%method, path, "api request");
    req
      .send()
      .await
      .map_err(|source| ClientError::Transport { method, path: path.to_owned(), source })
  }

  /// `GET /api/graph`: the server-side projection, used by `plotlines graph`.
  pub async fn graph(
    &self,
    episode: Episode,
    options: ProjectionOptions,
  ) -> Result<GraphElements, ClientError> {
    let req = self.request(Method::GET, "/graph").query(&[
      ("episode", episode.to_string()),
      ("visibility", options.visibility.to_string()),
      ("pair_scope", options.pair_scope.to_string()),
    ]);
    self.fetch(Method::GET, "/graph", req).await
  }

  /// `GET /api/tips`
  pub async fn tips(&self) -> Result<Vec<String>, ClientError> {
    #[derive(Deserialize)]
    struct Tips {
      tips: Vec<String>,
    }
    let req = self.request(Method::GET, "/tips");
    let tips: Tips = self.fetch(Method::GET, "/tips", req).await?;
    Ok(tips.tips)
  }
}

async fn status_error(method: Method, path: &str, resp: reqwest::Response) -> ClientError {
  let status = resp.status();
  let text = resp.text().await.unwrap_or_default();
  let message = serde_json::from_str::<ErrorBody>(&text)
    .map(|b| b.error)
    .unwrap_or(text);
  ClientError::Status { method, path: path.to_owned(), status, message }
}

// ─── PlotStore impl ──────────────────────────────────────────────────────────

impl PlotStore for HttpStore {
  type Error = ClientError;

  // ── People ────────────────────────────────────────────────────────────────

  async fn list_people(&self) -> Result<Vec<Person>, ClientError> {
    self.fetch(Method::GET, "/people", self.request(Method::GET, "/people")).await
  }

  async fn get_person(&self, id: PersonId) -> Result<Option<Person>, ClientError> {
    let path = format!("/people/{id}");
    match self.fetch(Method::GET, &path, self.request(Method::GET, &path)).await {
      Ok(person) => Ok(Some(person)),
      Err(ClientError::Status { status: StatusCode::NOT_FOUND, .. }) => Ok(None),
      Err(e) => Err(e),
    }
  }

  async fn add_person(&self, input: NewPerson) -> Result<Person, ClientError> {
    let req = self.request(Method::POST, "/people").json(&input);
    self.fetch(Method::POST, "/people", req).await
  }

  async fn update_person(
    &self,
    id: PersonId,
    patch: PersonPatch,
  ) -> Result<Option<Person>, ClientError> {
    let path = format!("/people/{id}");
    let req = self.request(Method::PATCH, &path).json(&patch);
    match self.fetch(Method::PATCH, &path, req).await {
      Ok(person) => Ok(Some(person)),
      Err(ClientError::Status { status: StatusCode::NOT_FOUND, .. }) => Ok(None),
      Err(e) => Err(e),
    }
  }

  async fn remove_person(&self, id: PersonId) -> Result<bool, ClientError> {
    let path = format!("/people/{id}");
    self.found(Method::DELETE, &path, self.request(Method::DELETE, &path)).await
  }

  // ── Friends ───────────────────────────────────────────────────────────────

  async fn list_friends(&self) -> Result<Vec<FriendEdge>, ClientError> {
    self.fetch(Method::GET, "/friends", self.request(Method::GET, "/friends")).await
  }

  async fn add_friend(&self, edge: FriendEdge) -> Result<FriendEdge, ClientError> {
    let req = self.request(Method::POST, "/friends").json(&edge);
    self.fetch(Method::POST, "/friends", req).await
  }

  async fn remove_friend(&self, key: FriendKey) -> Result<bool, ClientError> {
    let req = self.request(Method::DELETE, "/friends").query(&key);
    self.found(Method::DELETE, "/friends", req).await
  }

  // ── Enemies ───────────────────────────────────────────────────────────────

  async fn list_enemies(&self) -> Result<Vec<EnemyEdge>, ClientError> {
    self.fetch(Method::GET, "/enemies", self.request(Method::GET, "/enemies")).await
  }

  async fn add_enemy(&self, edge: EnemyEdge) -> Result<EnemyEdge, ClientError> {
    let req = self.request(Method::POST, "/enemies").json(&edge);
    self.fetch(Method::POST, "/enemies", req).await
  }

  async fn remove_enemy(&self, key: EnemyKey) -> Result<bool, ClientError> {
    let req = self.request(Method::DELETE, "/enemies").query(&key);
    self.found(Method::DELETE, "/enemies", req).await
  }

  // ── Pairs ─────────────────────────────────────────────────────────────────

  async fn list_pairs(&self) -> Result<Vec<PairEdge>, ClientError> {
    self.fetch(Method::GET, "/pairs", self.request(Method::GET, "/pairs")).await
  }

  async fn add_pair(&self, pair: PairEdge) -> Result<PairEdge, ClientError> {
    let req = self.request(Method::POST, "/pairs").json(&pair);
    self.fetch(Method::POST, "/pairs", req).await
  }

  async fn remove_pair(&self, key: PairKey) -> Result<bool, ClientError> {
    let req = self.request(Method::DELETE, "/pairs").query(&key);
    self.found(Method::DELETE, "/pairs", req).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn urls_are_rooted_at_api() {
    let store = HttpStore::new(ApiConfig { base_url: "http://localhost:3000/".into() }).unwrap();
    assert_eq!(store.url("/people/4"), "http://localhost:3000/api/people/4");
  }
}
