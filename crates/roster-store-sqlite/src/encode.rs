//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings; calendar dates as
//! `YYYY-MM-DD`. UUIDs are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use roster_core::{
  Error, Result,
  course::Course,
  enrollment::{Enrollment, Grade},
  instructor::Instructor,
  metadata::{Metadata, MetadataLink},
  student::Student,
};
use uuid::Uuid;

use crate::error::DecodeError;

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(Error::backend)
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::backend(DecodeError(format!("timestamp {s:?}: {e}"))))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  s.parse()
    .map_err(|e| Error::backend(DecodeError(format!("date {s:?}: {e}"))))
}

// ─── Grade ────────────────────────────────────────────────────────────────────

pub fn encode_grade(g: Grade) -> &'static str { g.as_str() }

pub fn decode_grade(s: &str) -> Result<Grade> {
  match s {
    "A" => Ok(Grade::A),
    "B" => Ok(Grade::B),
    "C" => Ok(Grade::C),
    "D" => Ok(Grade::D),
    "F" => Ok(Grade::F),
    other => {
      Err(Error::backend(DecodeError(format!("unknown grade: {other:?}"))))
    }
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `students` row.
pub struct RawStudent {
  pub student_id:    String,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub date_of_birth: String,
  pub created_at:    String,
}

impl RawStudent {
  pub const COLUMNS: &'static str =
    "s.student_id, s.first_name, s.last_name, s.email, s.date_of_birth, s.created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      student_id:    row.get(0)?,
      first_name:    row.get(1)?,
      last_name:     row.get(2)?,
      email:         row.get(3)?,
      date_of_birth: row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      student_id:    decode_uuid(&self.student_id)?,
      first_name:    self.first_name,
      last_name:     self.last_name,
      email:         self.email,
      date_of_birth: decode_date(&self.date_of_birth)?,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `courses` row.
pub struct RawCourse {
  pub course_id:   String,
  pub name:        String,
  pub code:        String,
  pub description: String,
  pub created_at:  String,
}

impl RawCourse {
  pub const COLUMNS: &'static str =
    "c.course_id, c.name, c.code, c.description, c.created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      course_id:   row.get(0)?,
      name:        row.get(1)?,
      code:        row.get(2)?,
      description: row.get(3)?,
      created_at:  row.get(4)?,
    })
  }

  pub fn into_course(self) -> Result<Course> {
    Ok(Course {
      course_id:   decode_uuid(&self.course_id)?,
      name:        self.name,
      code:        self.code,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `instructors` row.
pub struct RawInstructor {
  pub instructor_id: String,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub created_at:    String,
}

impl RawInstructor {
  pub const COLUMNS: &'static str =
    "i.instructor_id, i.first_name, i.last_name, i.email, i.created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      instructor_id: row.get(0)?,
      first_name:    row.get(1)?,
      last_name:     row.get(2)?,
      email:         row.get(3)?,
      created_at:    row.get(4)?,
    })
  }

  pub fn into_instructor(self) -> Result<Instructor> {
    Ok(Instructor {
      instructor_id: decode_uuid(&self.instructor_id)?,
      first_name:    self.first_name,
      last_name:     self.last_name,
      email:         self.email,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `enrollments` row.
pub struct RawEnrollment {
  pub enrollment_id: String,
  pub student_id:    String,
  pub course_id:     String,
  pub grade:         Option<String>,
  pub exam_score:    Option<f64>,
  pub created_at:    String,
}

impl RawEnrollment {
  pub const COLUMNS: &'static str =
    "e.enrollment_id, e.student_id, e.course_id, e.grade, e.exam_score, e.created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      enrollment_id: row.get(0)?,
      student_id:    row.get(1)?,
      course_id:     row.get(2)?,
      grade:         row.get(3)?,
      exam_score:    row.get(4)?,
      created_at:    row.get(5)?,
    })
  }

  pub fn into_enrollment(self) -> Result<Enrollment> {
    Ok(Enrollment {
      enrollment_id: decode_uuid(&self.enrollment_id)?,
      student_id:    decode_uuid(&self.student_id)?,
      course_id:     decode_uuid(&self.course_id)?,
      grade:         self.grade.as_deref().map(decode_grade).transpose()?,
      exam_score:    self.exam_score,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `metadata` row.
pub struct RawMetadata {
  pub metadata_id: String,
  pub key:         String,
  pub value:       String,
  pub created_at:  String,
  pub updated_at:  String,
}

impl RawMetadata {
  pub const COLUMNS: &'static str =
    "m.metadata_id, m.key, m.value, m.created_at, m.updated_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      metadata_id: row.get(0)?,
      key:         row.get(1)?,
      value:       row.get(2)?,
      created_at:  row.get(3)?,
      updated_at:  row.get(4)?,
    })
  }

  pub fn into_metadata(self) -> Result<Metadata> {
    Ok(Metadata {
      metadata_id: decode_uuid(&self.metadata_id)?,
      key:         self.key,
      value:       self.value,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    })
  }
}

/// A metadata row joined with its link row (notes + assignment timestamp).
pub struct RawMetadataLink {
  pub metadata:    RawMetadata,
  pub notes:       String,
  pub assigned_at: String,
}

impl RawMetadataLink {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      metadata:    RawMetadata::from_row(row)?,
      notes:       row.get(5)?,
      assigned_at: row.get(6)?,
    })
  }

  pub fn into_link(self) -> Result<MetadataLink> {
    Ok(MetadataLink {
      metadata:    self.metadata.into_metadata()?,
      notes:       self.notes,
      assigned_at: decode_dt(&self.assigned_at)?,
    })
  }
}
