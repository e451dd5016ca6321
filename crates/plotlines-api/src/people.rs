//! Handlers for `/people` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/people` | Ordered by name |
//! | `POST`   | `/people` | Body: `{"name":"..", "pictureURL":.., ...}`; 400 on a blank name |
//! | `GET`    | `/people/:id` | 404 if not found |
//! | `PATCH`  | `/people/:id` | Partial update; `null` clears a field; 404 if missing |
//! | `DELETE` | `/people/:id` | Cascades to every relation; 404 if missing |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use plotlines_core::{
  PersonId,
  person::{NewPerson, Person, PersonPatch},
  store::PlotStore,
};

use crate::error::ApiError;

/// `GET /people`
pub async fn list<S: PlotStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Person>>, ApiError> {
  let people = store.list_people().await.map_err(ApiError::store)?;
  Ok(Json(people))
}

/// `POST /people`
pub async fn create<S: PlotStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError> {
  body.validate()?;
  let person = store.add_person(body).await.map_err(ApiError::store)?;
  tracing::info!(id = person.id, name = %person.name, "person added");
  Ok((StatusCode::CREATED, Json(person)))
}

/// `GET /people/:id`
pub async fn get_one<S: PlotStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<PersonId>,
) -> Result<Json<Person>, ApiError> {
  let person = store
    .get_person(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

/// `PATCH /people/:id`
pub async fn update<S: PlotStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<PersonId>,
  Json(patch): Json<PersonPatch>,
) -> Result<Json<Person>, ApiError> {
  patch.validate()?;
  let person = store
    .update_person(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}

/// `DELETE /people/:id`
pub async fn remove<S: PlotStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<PersonId>,
) -> Result<StatusCode, ApiError> {
  if !store.remove_person(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound(format!("person {id} not found")));
  }
  tracing::info!(id, "person removed");
  Ok(StatusCode::NO_CONTENT)
}
