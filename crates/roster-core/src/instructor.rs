//! Instructor — a person teaching one or more courses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  course::Course,
  error::FieldError,
  metadata::Metadata,
  student::email_is_well_formed,
};

/// A persisted instructor row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
  pub instructor_id: Uuid,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub created_at:    DateTime<Utc>,
}

/// An instructor with its taught courses and linked metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstructorDetail {
  #[serde(flatten)]
  pub instructor: Instructor,
  pub courses:    Vec<Course>,
  pub metadata:   Vec<Metadata>,
}

/// Input for creating or updating an instructor. `course_ids` and
/// `metadata_ids` are the full link sets after the write.
#[derive(Debug, Clone, Deserialize)]
pub struct NewInstructor {
  pub first_name:   String,
  pub last_name:    String,
  pub email:        String,
  #[serde(default)]
  pub course_ids:   Vec<Uuid>,
  #[serde(default)]
  pub metadata_ids: Vec<Uuid>,
}

impl NewInstructor {
  pub fn validate(&self) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if self.first_name.trim().is_empty() {
      errors.push(FieldError::new("first_name", "must not be empty"));
    }
    if self.last_name.trim().is_empty() {
      errors.push(FieldError::new("last_name", "must not be empty"));
    }
    if !email_is_well_formed(&self.email) {
      errors.push(FieldError::new("email", "not a valid email address"));
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
  }
}
