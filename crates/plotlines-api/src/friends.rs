//! Handlers for `/friends` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/friends` | |
//! | `POST`   | `/friends` | Body: `{"friend_1":1,"friend_2":2,"episode":3,...}`; re-posting the same key replaces it |
//! | `DELETE` | `/friends?friend_1=&friend_2=&episode=` | Direction matters |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use plotlines_core::{
  relation::{FriendEdge, FriendKey},
  store::PlotStore,
};

use crate::{error::ApiError, require_people};

/// `GET /friends`
pub async fn list<S: PlotStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<FriendEdge>>, ApiError> {
  let friends = store.list_friends().await.map_err(ApiError::store)?;
  Ok(Json(friends))
}

/// `POST /friends`
pub async fn create<S: PlotStore>(
  State(store): State<Arc<S>>,
  Json(edge): Json<FriendEdge>,
) -> Result<impl IntoResponse, ApiError> {
  edge.validate()?;
  require_people(&*store, edge.person_a, edge.person_b).await?;
  let edge = store.add_friend(edge).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(edge)))
}

/// `DELETE /friends?friend_1=&friend_2=&episode=`
pub async fn remove<S: PlotStore>(
  State(store): State<Arc<S>>,
  Query(key): Query<FriendKey>,
) -> Result<StatusCode, ApiError> {
  if !store.remove_friend(key).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!(
      "no friendship {} -> {} in episode {}",
      key.person_a, key.person_b, key.episode
    )));
  }
  Ok(StatusCode::NO_CONTENT)
}
