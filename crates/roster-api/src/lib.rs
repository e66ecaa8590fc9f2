//! JSON REST API for Roster.
//!
//! Exposes an axum [`Router`] backed by any
//! [`RosterStore`](roster_core::store::RosterStore). List and detail reads
//! are public; creates, updates, and deletes require HTTP Basic auth checked
//! against an argon2 password hash.

pub mod auth;
pub mod error;
pub mod handlers;

pub use error::ApiError;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, routing::get};
use roster_core::store::RosterStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AuthConfig;
use handlers::{courses, enrollments, instructors, metadata, students};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` (with
/// `ROSTER_*` environment overrides).
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:               String,
  pub port:               u16,
  pub store_path:         PathBuf,
  pub auth_username:      String,
  pub auth_password_hash: String,
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RosterStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub auth:   Arc<AuthConfig>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the Roster API.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RosterStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route(
      "/students",
      get(students::list::<S>).post(students::create::<S>),
    )
    .route(
      "/students/{id}",
      get(students::get_one::<S>)
        .put(students::update::<S>)
        .delete(students::delete_one::<S>),
    )
    .route("/courses", get(courses::list::<S>).post(courses::create::<S>))
    .route(
      "/courses/{id}",
      get(courses::get_one::<S>)
        .put(courses::update::<S>)
        .delete(courses::delete_one::<S>),
    )
    .route(
      "/instructors",
      get(instructors::list::<S>).post(instructors::create::<S>),
    )
    .route(
      "/instructors/{id}",
      get(instructors::get_one::<S>)
        .put(instructors::update::<S>)
        .delete(instructors::delete_one::<S>),
    )
    .route(
      "/enrollments",
      get(enrollments::list::<S>).post(enrollments::create::<S>),
    )
    .route(
      "/enrollments/{id}",
      get(enrollments::get_one::<S>)
        .put(enrollments::update::<S>)
        .delete(enrollments::delete_one::<S>),
    )
    .route(
      "/metadata",
      get(metadata::list::<S>).post(metadata::create::<S>),
    )
    .route(
      "/metadata/{id}",
      get(metadata::get_one::<S>)
        .put(metadata::update::<S>)
        .delete(metadata::delete_one::<S>),
    )
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use roster_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn make_state(password: &str) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string();

    AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig {
        host:               "127.0.0.1".to_string(),
        port:               8080,
        store_path:         PathBuf::from(":memory:"),
        auth_username:      "admin".to_string(),
        auth_password_hash: hash.clone(),
      }),
      auth:   Arc::new(AuthConfig {
        username:      "admin".to_string(),
        password_hash: hash,
      }),
    }
  }

  fn basic(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn send(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(auth) = auth {
      builder = builder.header(header::AUTHORIZATION, auth);
    }
    let req = match body {
      Some(v) => builder
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(v.to_string()))
        .unwrap(),
      None => builder.body(Body::empty()).unwrap(),
    };
    router(state).oneshot(req).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes =
      axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  fn student_body(first: &str, last: &str, email: &str) -> Value {
    json!({
      "first_name": first,
      "last_name": last,
      "email": email,
      "date_of_birth": "2001-06-15",
    })
  }

  // ── Public reads ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_is_public_and_starts_empty() {
    let state = make_state("secret").await;
    let resp = send(state, "GET", "/students", None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["total"], 0);
    assert_eq!(body["pages"], 1);
  }

  #[tokio::test]
  async fn detail_of_missing_student_is_404() {
    let state = make_state("secret").await;
    let resp = send(
      state,
      "GET",
      &format!("/students/{}", uuid::Uuid::new_v4()),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Auth gating ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_without_credentials_is_401_and_writes_nothing() {
    let state = make_state("secret").await;

    let resp = send(
      state.clone(),
      "POST",
      "/students",
      None,
      Some(student_body("Rita", "Okafor", "rita@example.com")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));

    let resp = send(state, "GET", "/students", None, None).await;
    assert_eq!(json_body(resp).await["total"], 0);
  }

  #[tokio::test]
  async fn wrong_password_is_401() {
    let state = make_state("secret").await;
    let resp = send(
      state,
      "POST",
      "/students",
      Some(&basic("admin", "wrong")),
      Some(student_body("Rita", "Okafor", "rita@example.com")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  // ── Student CRUD ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn create_and_fetch_student() {
    let state = make_state("secret").await;
    let auth = basic("admin", "secret");

    let resp = send(
      state.clone(),
      "POST",
      "/students",
      Some(&auth),
      Some(student_body("Rita", "Okafor", "rita@example.com")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    let id = created["student_id"].as_str().unwrap().to_string();

    let resp =
      send(state, "GET", &format!("/students/{id}"), None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let detail = json_body(resp).await;
    assert_eq!(detail["email"], "rita@example.com");
    assert_eq!(detail["metadata"], json!([]));
  }

  #[tokio::test]
  async fn future_date_of_birth_is_422_with_field_errors() {
    let state = make_state("secret").await;
    let resp = send(
      state,
      "POST",
      "/students",
      Some(&basic("admin", "secret")),
      Some(json!({
        "first_name": "Rita",
        "last_name": "Okafor",
        "email": "rita@example.com",
        "date_of_birth": "2093-01-01",
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert_eq!(body["errors"][0]["field"], "date_of_birth");
  }

  #[tokio::test]
  async fn duplicate_email_is_409() {
    let state = make_state("secret").await;
    let auth = basic("admin", "secret");

    let resp = send(
      state.clone(),
      "POST",
      "/students",
      Some(&auth),
      Some(student_body("Rita", "Okafor", "rita@example.com")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send(
      state,
      "POST",
      "/students",
      Some(&auth),
      Some(student_body("Other", "Person", "rita@example.com")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn update_replaces_fields() {
    let state = make_state("secret").await;
    let auth = basic("admin", "secret");

    let resp = send(
      state.clone(),
      "POST",
      "/students",
      Some(&auth),
      Some(student_body("Rita", "Okafor", "rita@example.com")),
    )
    .await;
    let id = json_body(resp).await["student_id"]
      .as_str()
      .unwrap()
      .to_string();

    let resp = send(
      state.clone(),
      "PUT",
      &format!("/students/{id}"),
      Some(&auth),
      Some(student_body("Rita", "Okafor-Jones", "rita@example.com")),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["last_name"], "Okafor-Jones");
  }

  #[tokio::test]
  async fn delete_then_fetch_is_404() {
    let state = make_state("secret").await;
    let auth = basic("admin", "secret");

    let resp = send(
      state.clone(),
      "POST",
      "/students",
      Some(&auth),
      Some(student_body("Rita", "Okafor", "rita@example.com")),
    )
    .await;
    let id = json_body(resp).await["student_id"]
      .as_str()
      .unwrap()
      .to_string();

    let resp = send(
      state.clone(),
      "DELETE",
      &format!("/students/{id}"),
      Some(&auth),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(
      state.clone(),
      "GET",
      &format!("/students/{id}"),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // deleting again reports 404 rather than succeeding silently
    let resp =
      send(state, "DELETE", &format!("/students/{id}"), Some(&auth), None)
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Search ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn list_honours_the_q_parameter() {
    let state = make_state("secret").await;
    let auth = basic("admin", "secret");

    for (first, last, email) in [
      ("Rita", "Okafor", "rita@example.com"),
      ("Sam", "Hale", "sam@example.com"),
    ] {
      let resp = send(
        state.clone(),
        "POST",
        "/students",
        Some(&auth),
        Some(student_body(first, last, email)),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = send(state, "GET", "/students?q=okafor", None, None).await;
    let body = json_body(resp).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["email"], "rita@example.com");
  }

  // ── Enrollments ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn enrollment_flow_with_duplicate_conflict() {
    let state = make_state("secret").await;
    let auth = basic("admin", "secret");

    let resp = send(
      state.clone(),
      "POST",
      "/students",
      Some(&auth),
      Some(student_body("Rita", "Okafor", "rita@example.com")),
    )
    .await;
    let student_id = json_body(resp).await["student_id"]
      .as_str()
      .unwrap()
      .to_string();

    let resp = send(
      state.clone(),
      "POST",
      "/courses",
      Some(&auth),
      Some(json!({
        "name": "Algebra",
        "code": "MATH-101",
        "description": "",
        "metadata_ids": [],
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let course_id = json_body(resp).await["course_id"]
      .as_str()
      .unwrap()
      .to_string();

    let enrollment = json!({
      "student_id": student_id,
      "course_id": course_id,
      "grade": "A",
      "exam_score": 92.5,
    });
    let resp = send(
      state.clone(),
      "POST",
      "/enrollments",
      Some(&auth),
      Some(enrollment.clone()),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let enrollment_id = json_body(resp).await["enrollment_id"]
      .as_str()
      .unwrap()
      .to_string();

    // second enrollment of the same pair conflicts
    let resp = send(
      state.clone(),
      "POST",
      "/enrollments",
      Some(&auth),
      Some(enrollment),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // the detail view embeds the student and course
    let resp = send(
      state,
      "GET",
      &format!("/enrollments/{enrollment_id}"),
      None,
      None,
    )
    .await;
    let detail = json_body(resp).await;
    assert_eq!(detail["student"]["email"], "rita@example.com");
    assert_eq!(detail["course"]["code"], "MATH-101");
    assert_eq!(detail["grade"], "A");
  }

  #[tokio::test]
  async fn out_of_range_exam_score_is_422() {
    let state = make_state("secret").await;
    let resp = send(
      state,
      "POST",
      "/enrollments",
      Some(&basic("admin", "secret")),
      Some(json!({
        "student_id": uuid::Uuid::new_v4(),
        "course_id": uuid::Uuid::new_v4(),
        "exam_score": 1500.0,
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
  }

  // ── Metadata linking ─────────────────────────────────────────────────────

  #[tokio::test]
  async fn student_created_with_metadata_link_shows_notes_in_detail() {
    let state = make_state("secret").await;
    let auth = basic("admin", "secret");

    let resp = send(
      state.clone(),
      "POST",
      "/metadata",
      Some(&auth),
      Some(json!({ "key": "hobby", "value": "chess" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let metadata_id = json_body(resp).await["metadata_id"]
      .as_str()
      .unwrap()
      .to_string();

    let mut body = student_body("Rita", "Okafor", "rita@example.com");
    body["metadata"] =
      json!([{ "metadata_id": metadata_id, "notes": "club captain" }]);
    let resp =
      send(state.clone(), "POST", "/students", Some(&auth), Some(body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = json_body(resp).await["student_id"]
      .as_str()
      .unwrap()
      .to_string();

    let resp =
      send(state, "GET", &format!("/students/{id}"), None, None).await;
    let detail = json_body(resp).await;
    assert_eq!(detail["metadata"][0]["key"], "hobby");
    assert_eq!(detail["metadata"][0]["notes"], "club captain");
  }

  #[tokio::test]
  async fn linking_unknown_metadata_is_404() {
    let state = make_state("secret").await;
    let mut body = student_body("Rita", "Okafor", "rita@example.com");
    body["metadata"] =
      json!([{ "metadata_id": uuid::Uuid::new_v4(), "notes": "" }]);
    let resp = send(
      state,
      "POST",
      "/students",
      Some(&basic("admin", "secret")),
      Some(body),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
