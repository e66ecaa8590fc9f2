//! Course — a unit of teaching identified by a unique code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::FieldError, metadata::Metadata};

/// A persisted course row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
  pub course_id:   Uuid,
  pub name:        String,
  pub code:        String,
  pub description: String,
  pub created_at:  DateTime<Utc>,
}

/// A course with its linked metadata, as returned by detail reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDetail {
  #[serde(flatten)]
  pub course:   Course,
  pub metadata: Vec<Metadata>,
}

/// Input for creating or updating a course. `metadata_ids` is the full set
/// of metadata records the course should be linked to after the write.
#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
  pub name:         String,
  pub code:         String,
  #[serde(default)]
  pub description:  String,
  #[serde(default)]
  pub metadata_ids: Vec<Uuid>,
}

impl NewCourse {
  pub fn validate(&self) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();
    if self.name.trim().is_empty() {
      errors.push(FieldError::new("name", "must not be empty"));
    }
    if self.code.trim().is_empty() {
      errors.push(FieldError::new("code", "must not be empty"));
    }
    if errors.is_empty() { Ok(()) } else { Err(errors) }
  }
}
