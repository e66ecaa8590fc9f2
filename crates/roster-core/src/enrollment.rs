//! Enrollment — the link between a student and a course, with an optional
//! grade and exam score. At most one enrollment exists per (student, course)
//! pair; the store enforces this with a uniqueness constraint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  course::Course,
  error::FieldError,
  metadata::MetadataLink,
  student::Student,
};

/// Letter grade. There is no E.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
  A,
  B,
  C,
  D,
  F,
}

impl Grade {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::A => "A",
      Self::B => "B",
      Self::C => "C",
      Self::D => "D",
      Self::F => "F",
    }
  }
}

/// A persisted enrollment row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
  pub enrollment_id: Uuid,
  pub student_id:    Uuid,
  pub course_id:     Uuid,
  pub grade:         Option<Grade>,
  pub exam_score:    Option<f64>,
  pub created_at:    DateTime<Utc>,
}

/// An enrollment with the joined student, course, and metadata links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentDetail {
  #[serde(flatten)]
  pub enrollment: Enrollment,
  pub student:    Student,
  pub course:     Course,
  pub metadata:   Vec<MetadataLink>,
}

/// Input for creating or updating an enrollment.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEnrollment {
  pub student_id: Uuid,
  pub course_id:  Uuid,
  pub grade:      Option<Grade>,
  pub exam_score: Option<f64>,
}

impl NewEnrollment {
  /// Exam scores mirror the original two-decimal, five-digit column:
  /// anything in `0.0..=999.99` is accepted.
  pub fn validate(&self) -> Result<(), Vec<FieldError>> {
    if let Some(score) = self.exam_score
      && !(0.0..=999.99).contains(&score)
    {
      return Err(vec![FieldError::new(
        "exam_score",
        "must be between 0 and 999.99",
      )]);
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input(score: Option<f64>) -> NewEnrollment {
    NewEnrollment {
      student_id: Uuid::new_v4(),
      course_id:  Uuid::new_v4(),
      grade:      Some(Grade::B),
      exam_score: score,
    }
  }

  #[test]
  fn score_bounds() {
    assert!(input(None).validate().is_ok());
    assert!(input(Some(0.0)).validate().is_ok());
    assert!(input(Some(999.99)).validate().is_ok());
    assert!(input(Some(-0.5)).validate().is_err());
    assert!(input(Some(1000.0)).validate().is_err());
  }
}
