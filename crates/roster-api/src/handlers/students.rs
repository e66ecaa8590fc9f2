//! Handlers for `/students` endpoints.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use roster_core::{
  metadata::MetadataLinkInput,
  query::{ListQuery, Page},
  store::RosterStore,
  student::{NewStudent, Student, StudentDetail},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Authenticated, error::ApiError};

/// Request body for create and update: the student fields plus the
/// metadata-link formset rows.
#[derive(Debug, Deserialize)]
pub struct StudentBody {
  #[serde(flatten)]
  pub student:  NewStudent,
  #[serde(default)]
  pub metadata: Vec<MetadataLinkInput>,
}

impl StudentBody {
  fn validated(self) -> Result<Self, ApiError> {
    self
      .student
      .validate(Utc::now().date_naive())
      .map_err(ApiError::Validation)?;
    Ok(self)
  }
}

/// `GET /students`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(query): Query<ListQuery>,
) -> Result<Json<Page<Student>>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.store.list_students(&query).await?))
}

/// `POST /students`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Json(body): Json<StudentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let body = body.validated()?;
  let student =
    state.store.create_student(body.student, body.metadata).await?;
  Ok((StatusCode::CREATED, Json(student)))
}

/// `GET /students/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<StudentDetail>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let detail = state
    .store
    .get_student(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("student {id} not found")))?;
  Ok(Json(detail))
}

/// `PUT /students/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<StudentBody>,
) -> Result<Json<Student>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let body = body.validated()?;
  let student =
    state.store.update_student(id, body.student, body.metadata).await?;
  Ok(Json(student))
}

/// `DELETE /students/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  if state.store.delete_student(id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("student {id} not found")))
  }
}
