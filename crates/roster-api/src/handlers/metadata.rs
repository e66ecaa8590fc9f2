//! Handlers for `/metadata` endpoints.

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  metadata::{Metadata, NewMetadata},
  query::{ListQuery, Page},
  store::RosterStore,
};
use uuid::Uuid;

use crate::{AppState, auth::Authenticated, error::ApiError};

/// `GET /metadata`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Query(query): Query<ListQuery>,
) -> Result<Json<Page<Metadata>>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  Ok(Json(state.store.list_metadata(&query).await?))
}

/// `POST /metadata`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Json(body): Json<NewMetadata>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  body.validate().map_err(ApiError::Validation)?;
  let metadata = state.store.create_metadata(body).await?;
  Ok((StatusCode::CREATED, Json(metadata)))
}

/// `GET /metadata/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Metadata>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  let metadata = state
    .store
    .get_metadata(id)
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("metadata {id} not found")))?;
  Ok(Json(metadata))
}

/// `PUT /metadata/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
  Json(body): Json<NewMetadata>,
) -> Result<Json<Metadata>, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  body.validate().map_err(ApiError::Validation)?;
  Ok(Json(state.store.update_metadata(id, body).await?))
}

/// `DELETE /metadata/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  _auth: Authenticated,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  if state.store.delete_metadata(id).await? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("metadata {id} not found")))
  }
}
