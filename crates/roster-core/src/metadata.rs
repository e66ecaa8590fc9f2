//! Metadata — a free-form key/value tag attachable to any primary entity.
//!
//! Students and enrollments link to metadata through a join entity that
//! carries per-link notes and an assignment timestamp; courses and
//! instructors link directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FieldError;

/// A persisted metadata row. Listed ordered by `(key, metadata_id)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
  pub metadata_id: Uuid,
  pub key:         String,
  pub value:       String,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// A metadata record as seen through a notes-bearing join entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataLink {
  #[serde(flatten)]
  pub metadata:    Metadata,
  pub notes:       String,
  pub assigned_at: DateTime<Utc>,
}

/// One row of the metadata-link formset submitted alongside a student or
/// enrollment: attach (or re-note) `metadata_id`, or delete the link when
/// `delete` is set.
#[derive(Debug, Clone, Deserialize)]
pub struct MetadataLinkInput {
  pub metadata_id: Uuid,
  #[serde(default)]
  pub notes:       String,
  #[serde(default)]
  pub delete:      bool,
}

/// Input for creating or updating a metadata record.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMetadata {
  pub key:   String,
  #[serde(default)]
  pub value: String,
}

impl NewMetadata {
  pub fn validate(&self) -> Result<(), Vec<FieldError>> {
    if self.key.trim().is_empty() {
      return Err(vec![FieldError::new("key", "must not be empty")]);
    }
    Ok(())
  }
}
