//! HTTP front for plotlines.
//!
//! Mounts the JSON API under `/api` and serves the dashboard's static bundle
//! for everything else. Client-side routes all resolve to the bundle's
//! `index.html`.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use plotlines_api::TipBoard;
use plotlines_core::store::PlotStore;
use serde::Deserialize;
use tower_http::{
  services::{ServeDir, ServeFile},
  trace::TraceLayer,
};

/// Paths the browser client routes itself.
pub const CLIENT_ROUTES: [&str; 5] = ["/", "/hjelp", "/more-info", "/admin", "/home"];

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `plotlines.toml` and
/// `PLOTLINES_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Directory holding the built client bundle.
  pub static_dir: PathBuf,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       "127.0.0.1".to_owned(),
      port:       3000,
      store_path: PathBuf::from("plotlines.db"),
      static_dir: PathBuf::from("client/build"),
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

pub struct AppState<S> {
  pub store:  Arc<S>,
  pub tips:   Arc<TipBoard>,
  pub config: Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:  Arc::clone(&self.store),
      tips:   Arc::clone(&self.tips),
      config: Arc::clone(&self.config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application router.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: PlotStore + 'static,
{
  let static_dir = &state.config.static_dir;
  let index = static_dir.join("index.html");

  let mut app = Router::new().nest("/api", plotlines_api::api_router(state.store, state.tips));
  for route in CLIENT_ROUTES {
    app = app.route_service(route, ServeFile::new(&index));
  }

  app
    .fallback_service(ServeDir::new(static_dir))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use plotlines_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  /// A throwaway bundle directory with an index page and one asset.
  struct Bundle(PathBuf);

  impl Bundle {
    fn new(name: &str) -> Self {
      let dir = std::env::temp_dir().join(format!("plotlines-{name}-{}", std::process::id()));
      std::fs::create_dir_all(&dir).unwrap();
      std::fs::write(dir.join("index.html"), "<div id=\"root\"></div>").unwrap();
      std::fs::write(dir.join("app.js"), "console.log(1)").unwrap();
      Self(dir)
    }
  }

  impl Drop for Bundle {
    fn drop(&mut self) { std::fs::remove_dir_all(&self.0).ok(); }
  }

  async fn make_state(bundle: &Bundle) -> AppState<SqliteStore> {
    AppState {
      store:  Arc::new(SqliteStore::open_in_memory().await.unwrap()),
      tips:   Arc::new(TipBoard::default()),
      config: Arc::new(ServerConfig {
        static_dir: bundle.0.clone(),
        ..ServerConfig::default()
      }),
    }
  }

  async fn get(state: AppState<SqliteStore>, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
  }

  #[tokio::test]
  async fn client_routes_serve_the_index_page() {
    let bundle = Bundle::new("routes");
    let state = make_state(&bundle).await;
    for route in CLIENT_ROUTES {
      let (status, body) = get(state.clone(), route).await;
      assert_eq!(status, StatusCode::OK, "{route}");
      assert!(body.contains("root"), "{route}: {body}");
    }
  }

  #[tokio::test]
  async fn bundle_assets_are_served() {
    let bundle = Bundle::new("assets");
    let (status, body) = get(make_state(&bundle).await, "/app.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "console.log(1)");
  }

  #[tokio::test]
  async fn unknown_files_are_not_found() {
    let bundle = Bundle::new("missing");
    let (status, _) = get(make_state(&bundle).await, "/nope.css").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn api_is_mounted_under_api() {
    let bundle = Bundle::new("api");
    let (status, body) = get(make_state(&bundle).await, "/api/tips").await;
    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["tips"].as_array().unwrap().len(), 4);

    let (status, body) = get(make_state(&bundle).await, "/api/people").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "[]");
  }

  #[test]
  fn config_fields_fall_back_to_defaults() {
    let cfg: ServerConfig = config::Config::builder()
      .set_override("port", 8080)
      .unwrap()
      .build()
      .unwrap()
      .try_deserialize()
      .unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.store_path, PathBuf::from("plotlines.db"));
  }
}
