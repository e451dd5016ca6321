//! Handlers for `/pairs` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/pairs` | |
//! | `POST`   | `/pairs` | Body: `{"pair_1":1,"pair_2":2,"episode":3}`; 409 if either person is already paired that episode |
//! | `DELETE` | `/pairs?pair_1=&pair_2=&episode=` | Either order |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use plotlines_core::{
  relation::{PairEdge, PairKey, check_pair_available},
  store::PlotStore,
};

use crate::{error::ApiError, require_people};

/// `GET /pairs`
pub async fn list<S: PlotStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<PairEdge>>, ApiError> {
  let pairs = store.list_pairs().await.map_err(ApiError::store)?;
  Ok(Json(pairs))
}

/// `POST /pairs`
pub async fn create<S: PlotStore>(
  State(store): State<Arc<S>>,
  Json(pair): Json<PairEdge>,
) -> Result<impl IntoResponse, ApiError> {
  pair.validate()?;
  require_people(&*store, pair.person_a, pair.person_b).await?;

  // Exclusivity is not a table constraint; check against current rows.
  let existing = store.list_pairs().await.map_err(ApiError::store)?;
  check_pair_available(&existing, &pair)?;

  let pair = store.add_pair(pair).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(pair)))
}

/// `DELETE /pairs?pair_1=&pair_2=&episode=`
pub async fn remove<S: PlotStore>(
  State(store): State<Arc<S>>,
  Query(key): Query<PairKey>,
) -> Result<StatusCode, ApiError> {
  if !store.remove_pair(key).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!(
      "no pair of {} and {} in episode {}",
      key.person_a, key.person_b, key.episode
    )));
  }
  Ok(StatusCode::NO_CONTENT)
}
