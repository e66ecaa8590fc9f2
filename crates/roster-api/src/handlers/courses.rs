//! Handlers for `/courses` endpoints. Course metadata is a plain id set, so
//! the request body is [`NewCourse`] directly.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  course::{Course, CourseDetail, NewCourse},
  query::{ListQuery, Page},
  store::RosterStore,
};
use uuid::Uuid;

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `GET /courses`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(query): Query<ListQuery>,
) -> Result<Json<Page<Course>>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.store.list_courses(&query).await?))
}

/// `POST /courses`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Json(body): Json<NewCourse>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  body.validate().map_err(ApiError::Validation)?;
  let course = state.store.create_course(body).await?;
  Ok((StatusCode::CREATED, Json(course)))
}

/// `GET /courses/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<CourseDetail>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let detail = state
    .store
    .get_course(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("course {id} not found")))?;
  Ok(Json(detail))
}

/// `PUT /courses/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<NewCourse>,
) -> Result<Json<Course>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  body.validate().map_err(ApiError::Validation)?;
  Ok(Json(state.store.update_course(id, body).await?))
}

/// `DELETE /courses/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  if state.store.delete_course(id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("course {id} not found")))
  }
}
