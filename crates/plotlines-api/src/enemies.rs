//! Handlers for `/enemies` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/enemies` | |
//! | `POST`   | `/enemies` | Body: `{"enemy_1":1,"enemy_2":2,"emoji":..,"context":..}` |
//! | `DELETE` | `/enemies?enemy_1=&enemy_2=` | Either order |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use plotlines_core::{
  relation::{EnemyEdge, EnemyKey},
  store::PlotStore,
};

use crate::{error::ApiError, require_people};

/// `GET /enemies`
pub async fn list<S: PlotStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<EnemyEdge>>, ApiError> {
  let enemies = store.list_enemies().await.map_err(ApiError::store)?;
  Ok(Json(enemies))
}

/// `POST /enemies`
pub async fn create<S: PlotStore>(
  State(store): State<Arc<S>>,
  Json(edge): Json<EnemyEdge>,
) -> Result<impl IntoResponse, ApiError> {
  edge.validate()?;
  require_people(&*store, edge.person_a, edge.person_b).await?;
  let edge = store.add_enemy(edge).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(edge)))
}

/// `DELETE /enemies?enemy_1=&enemy_2=`
pub async fn remove<S: PlotStore>(
  State(store): State<Arc<S>>,
  Query(key): Query<EnemyKey>,
) -> Result<StatusCode, ApiError> {
  if !store.remove_enemy(key).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!(
      "no rivalry between {} and {}",
      key.person_a, key.person_b
    )));
  }
  Ok(StatusCode::NO_CONTENT)
}
