//! Student — a person enrolled in courses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  error::FieldError,
  metadata::MetadataLink,
};

/// A persisted student row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
  pub student_id:    Uuid,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub date_of_birth: NaiveDate,
  pub created_at:    DateTime<Utc>,
}

/// A student together with its metadata links, as returned by detail reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentDetail {
  #[serde(flatten)]
  pub student:  Student,
  pub metadata: Vec<MetadataLink>,
}

/// Input for creating or updating a student. The id and `created_at` are
/// always assigned by the store.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStudent {
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub date_of_birth: NaiveDate,
}

impl NewStudent {
  /// Field-level validation. `today` is passed in so callers (and tests)
  /// control the clock.
  pub fn validate(&self, today: NaiveDate) -> Result<(), Vec<FieldError>> {
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
    if self.date_of_birth > today {
      errors.push(FieldError::new(
        "date_of_birth",
        "date of birth cannot be in the future",
      ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
  }
}

/// Minimal structural check: one `@`, non-empty local part, and a domain
/// containing a dot. Deliverability is not our problem.
pub(crate) fn email_is_well_formed(s: &str) -> bool {
  let Some((local, domain)) = s.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !domain.is_empty()
    && domain.contains('.')
    && !domain.starts_with('.')
    && !domain.ends_with('.')
    && !s.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn input() -> NewStudent {
    NewStudent {
      first_name:    "Rita".into(),
      last_name:     "Adhikari".into(),
      email:         "rita@example.com".into(),
      date_of_birth: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
    }
  }

  fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2026, 6, 1).unwrap() }

  #[test]
  fn past_date_of_birth_is_accepted() {
    assert!(input().validate(today()).is_ok());
  }

  #[test]
  fn future_date_of_birth_is_rejected() {
    let mut s = input();
    s.date_of_birth = NaiveDate::from_ymd_opt(2030, 1, 1).unwrap();
    let errors = s.validate(today()).unwrap_err();
    assert!(errors.iter().any(|e| e.field == "date_of_birth"));
  }

  #[test]
  fn empty_names_and_bad_email_collect_all_errors() {
    let mut s = input();
    s.first_name = "  ".into();
    s.last_name = String::new();
    s.email = "not-an-email".into();
    let errors = s.validate(today()).unwrap_err();
    let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
    assert_eq!(fields, ["first_name", "last_name", "email"]);
  }

  #[test]
  fn email_shapes() {
    assert!(email_is_well_formed("a@b.co"));
    assert!(!email_is_well_formed("a@b"));
    assert!(!email_is_well_formed("@b.co"));
    assert!(!email_is_well_formed("a b@c.co"));
    assert!(!email_is_well_formed("a@.co."));
  }
}
