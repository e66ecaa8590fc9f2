//! Error types for `roster-core`.

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// A validation problem attached to a single input field, suitable for
/// rendering next to that field in a client form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:   &'static str,
  pub message: String,
}

impl FieldError {
  pub fn new(field: &'static str, message: impl Into<String>) -> Self {
    Self { field, message: message.into() }
  }
}

#[derive(Debug, Error)]
pub enum Error {
  #[error("validation failed")]
  Validation(Vec<FieldError>),

  #[error("a student with email {0:?} already exists")]
  DuplicateEmail(String),

  #[error("a course with code {0:?} already exists")]
  DuplicateCourseCode(String),

  #[error("student {student_id} is already enrolled in course {course_id}")]
  DuplicateEnrollment { student_id: Uuid, course_id: Uuid },

  #[error("student not found: {0}")]
  StudentNotFound(Uuid),

  #[error("course not found: {0}")]
  CourseNotFound(Uuid),

  #[error("instructor not found: {0}")]
  InstructorNotFound(Uuid),

  #[error("enrollment not found: {0}")]
  EnrollmentNotFound(Uuid),

  #[error("metadata not found: {0}")]
  MetadataNotFound(Uuid),

  #[error("storage error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap an opaque storage-layer failure.
  pub fn backend(e: impl std::error::Error + Send + Sync + 'static) -> Self {
    Self::Backend(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
