//! Handlers for `/instructors` endpoints. The body carries the full course
//! and metadata id sets; updates replace both sets wholesale.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  instructor::{Instructor, InstructorDetail, NewInstructor},
  query::{ListQuery, Page},
  store::RosterStore,
};
use uuid::Uuid;

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `GET /instructors`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(query): Query<ListQuery>,
) -> Result<Json<Page<Instructor>>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.store.list_instructors(&query).await?))
}

/// `POST /instructors`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Json(body): Json<NewInstructor>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  body.validate().map_err(ApiError::Validation)?;
  let instructor = state.store.create_instructor(body).await?;
  Ok((StatusCode::CREATED, Json(instructor)))
}

/// `GET /instructors/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<InstructorDetail>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let detail = state
    .store
    .get_instructor(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("instructor {id} not found")))?;
  Ok(Json(detail))
}

/// `PUT /instructors/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<NewInstructor>,
) -> Result<Json<Instructor>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  body.validate().map_err(ApiError::Validation)?;
  Ok(Json(state.store.update_instructor(id, body).await?))
}

/// `DELETE /instructors/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  if state.store.delete_instructor(id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("instructor {id} not found")))
  }
}
