//! Server-side projection.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/graph?episode=N` | Optional `visibility=range\|flag`, `pair_scope=episode\|all` |
//! | `GET`  | `/graph/style` | The renderer stylesheet |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use plotlines_core::{
  Episode,
  person::VisibilityModel,
  projection::{GraphElements, PairScope, ProjectionOptions, project},
  snapshot::Snapshot,
  store::PlotStore,
  style::{StyleRule, stylesheet},
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct GraphParams {
  pub episode:    Episode,
  #[serde(default)]
  pub visibility: VisibilityModel,
  #[serde(default)]
  pub pair_scope: PairScope,
}

/// `GET /graph?episode=N`
///
/// Unlike the dashboard's own loader, a failure to read any table fails the
/// whole request.
pub async fn elements<S: PlotStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<GraphParams>,
) -> Result<Json<GraphElements>, ApiError> {
  let (people, friends, enemies, pairs) = tokio::try_join!(
    store.list_people(),
    store.list_friends(),
    store.list_enemies(),
    store.list_pairs(),
  )
  .map_err(ApiError::store)?;

  let snapshot = Snapshot { people, friends, enemies, pairs };
  let options = ProjectionOptions {
    visibility: params.visibility,
    pair_scope: params.pair_scope,
  };
  Ok(Json(project(&snapshot, params.episode, options)))
}

/// `GET /graph/style`
pub async fn style() -> Json<Vec<StyleRule>> { Json(stylesheet()) }
