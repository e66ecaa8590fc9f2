//! Handlers for `/enrollments` endpoints.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  enrollment::{Enrollment, EnrollmentDetail, NewEnrollment},
  metadata::MetadataLinkInput,
  query::{ListQuery, Page},
  store::RosterStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, auth::Authenticated, error::ApiError};

/// Request body for create and update: the enrollment fields plus the
/// metadata-link formset rows.
#[derive(Debug, Deserialize)]
pub struct EnrollmentBody {
  #[serde(flatten)]
  pub enrollment: NewEnrollment,
  #[serde(default)]
  pub metadata:   Vec<MetadataLinkInput>,
}

impl EnrollmentBody {
  fn validated(self) -> Result<Self, ApiError> {
    self.enrollment.validate().map_err(ApiError::Validation)?;
    Ok(self)
  }
}

/// `GET /enrollments`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(query): Query<ListQuery>,
) -> Result<Json<Page<Enrollment>>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.store.list_enrollments(&query).await?))
}

/// `POST /enrollments`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Json(body): Json<EnrollmentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let body = body.validated()?;
  let enrollment =
    state.store.create_enrollment(body.enrollment, body.metadata).await?;
  Ok((StatusCode::CREATED, Json(enrollment)))
}

/// `GET /enrollments/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<EnrollmentDetail>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let detail = state
    .store
    .get_enrollment(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("enrollment {id} not found")))?;
  Ok(Json(detail))
}

/// `PUT /enrollments/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<EnrollmentBody>,
) -> Result<Json<Enrollment>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let body = body.validated()?;
  let enrollment =
    state.store.update_enrollment(id, body.enrollment, body.metadata).await?;
  Ok(Json(enrollment))
}

/// `DELETE /enrollments/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  if state.store.delete_enrollment(id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("enrollment {id} not found")))
  }
}
