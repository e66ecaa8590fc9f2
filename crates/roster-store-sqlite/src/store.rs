//! [`SqliteStore`] — the SQLite implementation of [`RosterStore`].
//!
//! Writes touching more than one table (entity row + link rows) run inside a
//! single rusqlite transaction, so a failed link write never leaves a
//! partially updated entity behind.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use roster_core::{
  Error, Result,
  course::{Course, CourseDetail, NewCourse},
  enrollment::{Enrollment, EnrollmentDetail, NewEnrollment},
  instructor::{Instructor, InstructorDetail, NewInstructor},
  metadata::{Metadata, MetadataLinkInput, NewMetadata},
  query::{ListQuery, Page},
  store::RosterStore,
  student::{NewStudent, Student, StudentDetail},
};

use crate::{
  encode::{
    RawCourse, RawEnrollment, RawInstructor, RawMetadata, RawMetadataLink,
    RawStudent, decode_uuid, encode_date, encode_dt, encode_grade, encode_uuid,
  },
  error::unique_violation,
  filter::{ListSpec, ListSql, MetaLink, build_list_sql},
  schema::SCHEMA,
};

// ─── List specs ──────────────────────────────────────────────────────────────

const STUDENT_LIST: ListSpec = ListSpec {
  from:           "students s",
  id_column:      "s.student_id",
  select:         RawStudent::COLUMNS,
  search_columns: &["s.first_name", "s.last_name", "s.email"],
  meta_link:      Some(MetaLink { table: "student_metadata", fk: "student_id" }),
  order_by:       "s.last_name, s.first_name",
};

const COURSE_LIST: ListSpec = ListSpec {
  from:           "courses c",
  id_column:      "c.course_id",
  select:         RawCourse::COLUMNS,
  search_columns: &["c.name", "c.code"],
  meta_link:      Some(MetaLink { table: "course_metadata", fk: "course_id" }),
  order_by:       "c.name, c.code",
};

// Searching instructors traverses into their taught courses, so the FROM
// clause carries the joins and DISTINCT collapses the fan-out.
const INSTRUCTOR_LIST: ListSpec = ListSpec {
  from:           "instructors i \
                   LEFT JOIN instructor_courses ic ON ic.instructor_id = i.instructor_id \
                   LEFT JOIN courses c ON c.course_id = ic.course_id",
  id_column:      "i.instructor_id",
  select:         RawInstructor::COLUMNS,
  search_columns: &["i.first_name", "i.last_name", "i.email", "c.name", "c.code"],
  meta_link:      Some(MetaLink {
    table: "instructor_metadata",
    fk:    "instructor_id",
  }),
  order_by:       "i.first_name, i.last_name",
};

// The ordering columns ride along in the select list; SQLite insists they
// appear there under SELECT DISTINCT. The row mapper only reads the
// enrollment columns.
const ENROLLMENT_LIST: ListSpec = ListSpec {
  from:           "enrollments e \
                   JOIN students s ON s.student_id = e.student_id \
                   JOIN courses c ON c.course_id = e.course_id",
  id_column:      "e.enrollment_id",
  select:         "e.enrollment_id, e.student_id, e.course_id, e.grade, \
                   e.exam_score, e.created_at, s.last_name, s.first_name, c.code",
  search_columns: &[
    "s.first_name",
    "s.last_name",
    "c.code",
    "e.grade",
    "CAST(e.exam_score AS TEXT)",
  ],
  meta_link:      Some(MetaLink {
    table: "enrollment_metadata",
    fk:    "enrollment_id",
  }),
  order_by:       "s.last_name, s.first_name, c.code",
};

const METADATA_LIST: ListSpec = ListSpec {
  from:           "metadata m",
  id_column:      "m.metadata_id",
  select:         RawMetadata::COLUMNS,
  search_columns: &["m.key", "m.value"],
  meta_link:      None,
  order_by:       "m.key, m.metadata_id",
};

// ─── Transaction plumbing ────────────────────────────────────────────────────

/// Outcome of a multi-table write, reported from inside the database thread
/// so the async side can produce a typed error. Any non-`Ok` outcome leaves
/// the transaction uncommitted.
enum TxOutcome {
  Ok,
  RowNotFound,
  MissingStudent,
  MissingMetadata(String),
  MissingCourse(String),
}

/// A metadata-link formset row with its id pre-encoded for binding.
struct EncodedLink {
  metadata_id: String,
  notes:       String,
  delete:      bool,
}

fn encode_links(links: Vec<MetadataLinkInput>) -> Vec<EncodedLink> {
  links
    .into_iter()
    .map(|l| EncodedLink {
      metadata_id: encode_uuid(l.metadata_id),
      notes:       l.notes,
      delete:      l.delete,
    })
    .collect()
}

fn row_exists(
  tx: &rusqlite::Transaction<'_>,
  sql: &str,
  id: &str,
) -> rusqlite::Result<bool> {
  Ok(
    tx.query_row(sql, rusqlite::params![id], |_| Ok(true))
      .optional()?
      .unwrap_or(false),
  )
}

fn metadata_exists(
  tx: &rusqlite::Transaction<'_>,
  id: &str,
) -> rusqlite::Result<bool> {
  row_exists(tx, "SELECT 1 FROM metadata WHERE metadata_id = ?1", id)
}

/// Reconcile a notes-bearing link table against the submitted formset rows:
/// insert missing links, refresh notes on existing ones, delete flagged
/// ones. Rows not mentioned are left untouched.
fn reconcile_links(
  tx: &rusqlite::Transaction<'_>,
  table: &str,
  fk: &str,
  owner_id: &str,
  links: &[EncodedLink],
  now: &str,
) -> rusqlite::Result<Option<String>> {
  for link in links {
    if link.delete {
      tx.execute(
        &format!("DELETE FROM {table} WHERE {fk} = ?1 AND metadata_id = ?2"),
        rusqlite::params![owner_id, link.metadata_id],
      )?;
      continue;
    }
    if !metadata_exists(tx, &link.metadata_id)? {
      return Ok(Some(link.metadata_id.clone()));
    }
    tx.execute(
      &format!(
        "INSERT INTO {table} ({fk}, metadata_id, notes, assigned_at) \
         VALUES (?1, ?2, ?3, ?4) \
         ON CONFLICT({fk}, metadata_id) DO UPDATE SET notes = excluded.notes"
      ),
      rusqlite::params![owner_id, link.metadata_id, link.notes, now],
    )?;
  }
  Ok(None)
}

/// Replace the full link set of a plain (no-notes) metadata link table.
fn replace_metadata_set(
  tx: &rusqlite::Transaction<'_>,
  table: &str,
  fk: &str,
  owner_id: &str,
  metadata_ids: &[String],
) -> rusqlite::Result<Option<String>> {
  tx.execute(
    &format!("DELETE FROM {table} WHERE {fk} = ?1"),
    rusqlite::params![owner_id],
  )?;
  for id in metadata_ids {
    if !metadata_exists(tx, id)? {
      return Ok(Some(id.clone()));
    }
    tx.execute(
      &format!("INSERT INTO {table} ({fk}, metadata_id) VALUES (?1, ?2)"),
      rusqlite::params![owner_id, id],
    )?;
  }
  Ok(None)
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(Error::backend)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(Error::backend)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(Error::backend)
  }

  /// Run the count + page statements for one [`ListSpec`] and decode the
  /// raw rows.
  async fn list_page<R, T>(
    &self,
    spec: &ListSpec,
    query: &ListQuery,
    from_row: fn(&rusqlite::Row<'_>) -> rusqlite::Result<R>,
    into_item: fn(R) -> Result<T>,
  ) -> Result<Page<T>>
  where
    R: Send + 'static,
  {
    let page_no = query.page();
    let ListSql { page_sql, count_sql, params } = build_list_sql(spec, query);

    let (total, raws): (i64, Vec<R>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          &count_sql,
          rusqlite::params_from_iter(params.iter()),
          |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&page_sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await
      .map_err(Error::backend)?;

    let items =
      raws.into_iter().map(into_item).collect::<Result<Vec<_>>>()?;
    Ok(Page::new(items, page_no, total as usize))
  }

  /// `DELETE ... WHERE id = ?`; reports whether a row went away.
  async fn delete_by_id(&self, sql: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let affected = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, rusqlite::params![id_str])?))
      .await
      .map_err(Error::backend)?;
    Ok(affected > 0)
  }
}

// ─── RosterStore impl ────────────────────────────────────────────────────────

impl RosterStore for SqliteStore {
  // ── Students ──────────────────────────────────────────────────────────────

  async fn create_student(
    &self,
    input: NewStudent,
    links: Vec<MetadataLinkInput>,
  ) -> Result<Student> {
    let student = Student {
      student_id:    Uuid::new_v4(),
      first_name:    input.first_name,
      last_name:     input.last_name,
      email:         input.email,
      date_of_birth: input.date_of_birth,
      created_at:    Utc::now(),
    };

    let id_str    = encode_uuid(student.student_id);
    let first     = student.first_name.clone();
    let last      = student.last_name.clone();
    let email     = student.email.clone();
    let dob_str   = encode_date(student.date_of_birth);
    let at_str    = encode_dt(student.created_at);
    let enc_links = encode_links(links);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO students \
             (student_id, first_name, last_name, email, date_of_birth, created_at) \
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, first, last, email, dob_str, at_str],
        )?;
        if let Some(missing) =
          reconcile_links(&tx, "student_metadata", "student_id", &id_str, &enc_links, &at_str)?
        {
          return Ok(TxOutcome::MissingMetadata(missing));
        }
        tx.commit()?;
        Ok(TxOutcome::Ok)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e).is_some_and(|m| m.contains("students.email")) {
          return Error::DuplicateEmail(student.email.clone());
        }
        Error::backend(e)
      })?;

    match outcome {
      TxOutcome::Ok => Ok(student),
      TxOutcome::MissingMetadata(id) => {
        Err(Error::MetadataNotFound(decode_uuid(&id)?))
      }
      _ => unreachable!("student insert reports no other outcome"),
    }
  }

  async fn update_student(
    &self,
    id: Uuid,
    input: NewStudent,
    links: Vec<MetadataLinkInput>,
  ) -> Result<Student> {
    let id_str    = encode_uuid(id);
    let first     = input.first_name.clone();
    let last      = input.last_name.clone();
    let email     = input.email.clone();
    let dob_str   = encode_date(input.date_of_birth);
    let now_str   = encode_dt(Utc::now());
    let enc_links = encode_links(links);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let affected = tx.execute(
          "UPDATE students \
           SET first_name = ?2, last_name = ?3, email = ?4, date_of_birth = ?5 \
           WHERE student_id = ?1",
          rusqlite::params![id_str, first, last, email, dob_str],
        )?;
        if affected == 0 {
          return Ok(TxOutcome::RowNotFound);
        }
        if let Some(missing) =
          reconcile_links(&tx, "student_metadata", "student_id", &id_str, &enc_links, &now_str)?
        {
          return Ok(TxOutcome::MissingMetadata(missing));
        }
        tx.commit()?;
        Ok(TxOutcome::Ok)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e).is_some_and(|m| m.contains("students.email")) {
          return Error::DuplicateEmail(input.email.clone());
        }
        Error::backend(e)
      })?;

    match outcome {
      TxOutcome::Ok => self
        .get_student(id)
        .await?
        .map(|d| d.student)
        .ok_or(Error::StudentNotFound(id)),
      TxOutcome::RowNotFound => Err(Error::StudentNotFound(id)),
      TxOutcome::MissingMetadata(m) => {
        Err(Error::MetadataNotFound(decode_uuid(&m)?))
      }
      _ => unreachable!("student update reports no other outcome"),
    }
  }

  async fn get_student(&self, id: Uuid) -> Result<Option<StudentDetail>> {
    let id_str = encode_uuid(id);

    let raw: Option<(RawStudent, Vec<RawMetadataLink>)> = self
      .conn
      .call(move |conn| {
        let student = conn
          .query_row(
            &format!(
              "SELECT {} FROM students s WHERE s.student_id = ?1",
              RawStudent::COLUMNS
            ),
            rusqlite::params![id_str],
            RawStudent::from_row,
          )
          .optional()?;

        let Some(student) = student else { return Ok(None) };

        let mut stmt = conn.prepare(
          "SELECT m.metadata_id, m.key, m.value, m.created_at, m.updated_at, \
                  sm.notes, sm.assigned_at \
           FROM student_metadata sm \
           JOIN metadata m ON m.metadata_id = sm.metadata_id \
           WHERE sm.student_id = ?1 \
           ORDER BY m.key, m.metadata_id",
        )?;
        let links = stmt
          .query_map(rusqlite::params![id_str], RawMetadataLink::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((student, links)))
      })
      .await
      .map_err(Error::backend)?;

    let Some((raw_student, raw_links)) = raw else { return Ok(None) };
    Ok(Some(StudentDetail {
      student:  raw_student.into_student()?,
      metadata: raw_links
        .into_iter()
        .map(RawMetadataLink::into_link)
        .collect::<Result<_>>()?,
    }))
  }

  async fn delete_student(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM students WHERE student_id = ?1", id)
      .await
  }

  async fn list_students(&self, query: &ListQuery) -> Result<Page<Student>> {
    self
      .list_page(
        &STUDENT_LIST,
        query,
        RawStudent::from_row,
        RawStudent::into_student,
      )
      .await
  }

  // ── Courses ───────────────────────────────────────────────────────────────

  async fn create_course(&self, input: NewCourse) -> Result<Course> {
    let course = Course {
      course_id:   Uuid::new_v4(),
      name:        input.name,
      code:        input.code,
      description: input.description,
      created_at:  Utc::now(),
    };

    let id_str   = encode_uuid(course.course_id);
    let name     = course.name.clone();
    let code     = course.code.clone();
    let desc     = course.description.clone();
    let at_str   = encode_dt(course.created_at);
    let meta_ids: Vec<String> =
      input.metadata_ids.into_iter().map(encode_uuid).collect();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO courses (course_id, name, code, description, created_at) \
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, name, code, desc, at_str],
        )?;
        if let Some(missing) =
          replace_metadata_set(&tx, "course_metadata", "course_id", &id_str, &meta_ids)?
        {
          return Ok(TxOutcome::MissingMetadata(missing));
        }
        tx.commit()?;
        Ok(TxOutcome::Ok)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e).is_some_and(|m| m.contains("courses.code")) {
          return Error::DuplicateCourseCode(course.code.clone());
        }
        Error::backend(e)
      })?;

    match outcome {
      TxOutcome::Ok => Ok(course),
      TxOutcome::MissingMetadata(m) => {
        Err(Error::MetadataNotFound(decode_uuid(&m)?))
      }
      _ => unreachable!("course insert reports no other outcome"),
    }
  }

  async fn update_course(&self, id: Uuid, input: NewCourse) -> Result<Course> {
    let id_str = encode_uuid(id);
    let name   = input.name.clone();
    let code   = input.code.clone();
    let desc   = input.description.clone();
    let meta_ids: Vec<String> =
      input.metadata_ids.into_iter().map(encode_uuid).collect();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let affected = tx.execute(
          "UPDATE courses SET name = ?2, code = ?3, description = ?4 \
           WHERE course_id = ?1",
          rusqlite::params![id_str, name, code, desc],
        )?;
        if affected == 0 {
          return Ok(TxOutcome::RowNotFound);
        }
        if let Some(missing) =
          replace_metadata_set(&tx, "course_metadata", "course_id", &id_str, &meta_ids)?
        {
          return Ok(TxOutcome::MissingMetadata(missing));
        }
        tx.commit()?;
        Ok(TxOutcome::Ok)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e).is_some_and(|m| m.contains("courses.code")) {
          return Error::DuplicateCourseCode(input.code.clone());
        }
        Error::backend(e)
      })?;

    match outcome {
      TxOutcome::Ok => self
        .get_course(id)
        .await?
        .map(|d| d.course)
        .ok_or(Error::CourseNotFound(id)),
      TxOutcome::RowNotFound => Err(Error::CourseNotFound(id)),
      TxOutcome::MissingMetadata(m) => {
        Err(Error::MetadataNotFound(decode_uuid(&m)?))
      }
      _ => unreachable!("course update reports no other outcome"),
    }
  }

  async fn get_course(&self, id: Uuid) -> Result<Option<CourseDetail>> {
    let id_str = encode_uuid(id);

    let raw: Option<(RawCourse, Vec<RawMetadata>)> = self
      .conn
      .call(move |conn| {
        let course = conn
          .query_row(
            &format!(
              "SELECT {} FROM courses c WHERE c.course_id = ?1",
              RawCourse::COLUMNS
            ),
            rusqlite::params![id_str],
            RawCourse::from_row,
          )
          .optional()?;

        let Some(course) = course else { return Ok(None) };

        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM course_metadata cm \
           JOIN metadata m ON m.metadata_id = cm.metadata_id \
           WHERE cm.course_id = ?1 ORDER BY m.key, m.metadata_id",
          RawMetadata::COLUMNS
        ))?;
        let metadata = stmt
          .query_map(rusqlite::params![id_str], RawMetadata::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((course, metadata)))
      })
      .await
      .map_err(Error::backend)?;

    let Some((raw_course, raw_meta)) = raw else { return Ok(None) };
    Ok(Some(CourseDetail {
      course:   raw_course.into_course()?,
      metadata: raw_meta
        .into_iter()
        .map(RawMetadata::into_metadata)
        .collect::<Result<_>>()?,
    }))
  }

  async fn delete_course(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM courses WHERE course_id = ?1", id)
      .await
  }

  async fn list_courses(&self, query: &ListQuery) -> Result<Page<Course>> {
    self
      .list_page(
        &COURSE_LIST,
        query,
        RawCourse::from_row,
        RawCourse::into_course,
      )
      .await
  }

  // ── Instructors ───────────────────────────────────────────────────────────

  async fn create_instructor(
    &self,
    input: NewInstructor,
  ) -> Result<Instructor> {
    let instructor = Instructor {
      instructor_id: Uuid::new_v4(),
      first_name:    input.first_name,
      last_name:     input.last_name,
      email:         input.email,
      created_at:    Utc::now(),
    };

    let id_str = encode_uuid(instructor.instructor_id);
    let first  = instructor.first_name.clone();
    let last   = instructor.last_name.clone();
    let email  = instructor.email.clone();
    let at_str = encode_dt(instructor.created_at);
    let course_ids: Vec<String> =
      input.course_ids.into_iter().map(encode_uuid).collect();
    let meta_ids: Vec<String> =
      input.metadata_ids.into_iter().map(encode_uuid).collect();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO instructors \
             (instructor_id, first_name, last_name, email, created_at) \
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, first, last, email, at_str],
        )?;
        if let Some(outcome) =
          write_instructor_links(&tx, &id_str, &course_ids, &meta_ids)?
        {
          return Ok(outcome);
        }
        tx.commit()?;
        Ok(TxOutcome::Ok)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e)
          .is_some_and(|m| m.contains("instructors.email"))
        {
          return Error::DuplicateEmail(instructor.email.clone());
        }
        Error::backend(e)
      })?;

    match outcome {
      TxOutcome::Ok => Ok(instructor),
      TxOutcome::MissingMetadata(m) => {
        Err(Error::MetadataNotFound(decode_uuid(&m)?))
      }
      TxOutcome::MissingCourse(c) => {
        Err(Error::CourseNotFound(decode_uuid(&c)?))
      }
      TxOutcome::RowNotFound | TxOutcome::MissingStudent => {
        unreachable!("instructor insert reports no other outcome")
      }
    }
  }

  async fn update_instructor(
    &self,
    id: Uuid,
    input: NewInstructor,
  ) -> Result<Instructor> {
    let id_str = encode_uuid(id);
    let first  = input.first_name.clone();
    let last   = input.last_name.clone();
    let email  = input.email.clone();
    let course_ids: Vec<String> =
      input.course_ids.into_iter().map(encode_uuid).collect();
    let meta_ids: Vec<String> =
      input.metadata_ids.into_iter().map(encode_uuid).collect();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let affected = tx.execute(
          "UPDATE instructors \
           SET first_name = ?2, last_name = ?3, email = ?4 \
           WHERE instructor_id = ?1",
          rusqlite::params![id_str, first, last, email],
        )?;
        if affected == 0 {
          return Ok(TxOutcome::RowNotFound);
        }
        if let Some(outcome) =
          write_instructor_links(&tx, &id_str, &course_ids, &meta_ids)?
        {
          return Ok(outcome);
        }
        tx.commit()?;
        Ok(TxOutcome::Ok)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e)
          .is_some_and(|m| m.contains("instructors.email"))
        {
          return Error::DuplicateEmail(input.email.clone());
        }
        Error::backend(e)
      })?;

    match outcome {
      TxOutcome::Ok => self
        .get_instructor(id)
        .await?
        .map(|d| d.instructor)
        .ok_or(Error::InstructorNotFound(id)),
      TxOutcome::RowNotFound => Err(Error::InstructorNotFound(id)),
      TxOutcome::MissingMetadata(m) => {
        Err(Error::MetadataNotFound(decode_uuid(&m)?))
      }
      TxOutcome::MissingCourse(c) => {
        Err(Error::CourseNotFound(decode_uuid(&c)?))
      }
      TxOutcome::MissingStudent => {
        unreachable!("instructor update reports no other outcome")
      }
    }
  }

  async fn get_instructor(
    &self,
    id: Uuid,
  ) -> Result<Option<InstructorDetail>> {
    let id_str = encode_uuid(id);

    type RawDetail = (RawInstructor, Vec<RawCourse>, Vec<RawMetadata>);
    let raw: Option<RawDetail> = self
      .conn
      .call(move |conn| {
        let instructor = conn
          .query_row(
            &format!(
              "SELECT {} FROM instructors i WHERE i.instructor_id = ?1",
              RawInstructor::COLUMNS
            ),
            rusqlite::params![id_str],
            RawInstructor::from_row,
          )
          .optional()?;

        let Some(instructor) = instructor else { return Ok(None) };

        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM instructor_courses ic \
           JOIN courses c ON c.course_id = ic.course_id \
           WHERE ic.instructor_id = ?1 ORDER BY c.name, c.code",
          RawCourse::COLUMNS
        ))?;
        let courses = stmt
          .query_map(rusqlite::params![id_str], RawCourse::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM instructor_metadata im \
           JOIN metadata m ON m.metadata_id = im.metadata_id \
           WHERE im.instructor_id = ?1 ORDER BY m.key, m.metadata_id",
          RawMetadata::COLUMNS
        ))?;
        let metadata = stmt
          .query_map(rusqlite::params![id_str], RawMetadata::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((instructor, courses, metadata)))
      })
      .await
      .map_err(Error::backend)?;

    let Some((raw_instructor, raw_courses, raw_meta)) = raw else {
      return Ok(None);
    };
    Ok(Some(InstructorDetail {
      instructor: raw_instructor.into_instructor()?,
      courses:    raw_courses
        .into_iter()
        .map(RawCourse::into_course)
        .collect::<Result<_>>()?,
      metadata:   raw_meta
        .into_iter()
        .map(RawMetadata::into_metadata)
        .collect::<Result<_>>()?,
    }))
  }

  async fn delete_instructor(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM instructors WHERE instructor_id = ?1", id)
      .await
  }

  async fn list_instructors(
    &self,
    query: &ListQuery,
  ) -> Result<Page<Instructor>> {
    self
      .list_page(
        &INSTRUCTOR_LIST,
        query,
        RawInstructor::from_row,
        RawInstructor::into_instructor,
      )
      .await
  }

  // ── Enrollments ───────────────────────────────────────────────────────────

  async fn create_enrollment(
    &self,
    input: NewEnrollment,
    links: Vec<MetadataLinkInput>,
  ) -> Result<Enrollment> {
    let enrollment = Enrollment {
      enrollment_id: Uuid::new_v4(),
      student_id:    input.student_id,
      course_id:     input.course_id,
      grade:         input.grade,
      exam_score:    input.exam_score,
      created_at:    Utc::now(),
    };

    let id_str      = encode_uuid(enrollment.enrollment_id);
    let student_str = encode_uuid(enrollment.student_id);
    let course_str  = encode_uuid(enrollment.course_id);
    let grade_str   = enrollment.grade.map(encode_grade);
    let exam_score  = enrollment.exam_score;
    let at_str      = encode_dt(enrollment.created_at);
    let enc_links   = encode_links(links);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !row_exists(
          &tx,
          "SELECT 1 FROM students WHERE student_id = ?1",
          &student_str,
        )? {
          return Ok(TxOutcome::MissingStudent);
        }
        if !row_exists(
          &tx,
          "SELECT 1 FROM courses WHERE course_id = ?1",
          &course_str,
        )? {
          return Ok(TxOutcome::MissingCourse(course_str.clone()));
        }
        tx.execute(
          "INSERT INTO enrollments \
             (enrollment_id, student_id, course_id, grade, exam_score, created_at) \
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            student_str,
            course_str,
            grade_str,
            exam_score,
            at_str
          ],
        )?;
        if let Some(missing) = reconcile_links(
          &tx,
          "enrollment_metadata",
          "enrollment_id",
          &id_str,
          &enc_links,
          &at_str,
        )? {
          return Ok(TxOutcome::MissingMetadata(missing));
        }
        tx.commit()?;
        Ok(TxOutcome::Ok)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e).is_some_and(|m| m.contains("enrollments.")) {
          return Error::DuplicateEnrollment {
            student_id: enrollment.student_id,
            course_id:  enrollment.course_id,
          };
        }
        Error::backend(e)
      })?;

    match outcome {
      TxOutcome::Ok => Ok(enrollment),
      TxOutcome::MissingStudent => {
        Err(Error::StudentNotFound(enrollment.student_id))
      }
      TxOutcome::MissingCourse(_) => {
        Err(Error::CourseNotFound(enrollment.course_id))
      }
      TxOutcome::MissingMetadata(m) => {
        Err(Error::MetadataNotFound(decode_uuid(&m)?))
      }
      TxOutcome::RowNotFound => {
        unreachable!("enrollment insert reports no other outcome")
      }
    }
  }

  async fn update_enrollment(
    &self,
    id: Uuid,
    input: NewEnrollment,
    links: Vec<MetadataLinkInput>,
  ) -> Result<Enrollment> {
    let id_str      = encode_uuid(id);
    let student_str = encode_uuid(input.student_id);
    let course_str  = encode_uuid(input.course_id);
    let grade_str   = input.grade.map(encode_grade);
    let exam_score  = input.exam_score;
    let now_str     = encode_dt(Utc::now());
    let enc_links   = encode_links(links);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if !row_exists(
          &tx,
          "SELECT 1 FROM enrollments WHERE enrollment_id = ?1",
          &id_str,
        )? {
          return Ok(TxOutcome::RowNotFound);
        }
        if !row_exists(
          &tx,
          "SELECT 1 FROM students WHERE student_id = ?1",
          &student_str,
        )? {
          return Ok(TxOutcome::MissingStudent);
        }
        if !row_exists(
          &tx,
          "SELECT 1 FROM courses WHERE course_id = ?1",
          &course_str,
        )? {
          return Ok(TxOutcome::MissingCourse(course_str.clone()));
        }
        tx.execute(
          "UPDATE enrollments \
           SET student_id = ?2, course_id = ?3, grade = ?4, exam_score = ?5 \
           WHERE enrollment_id = ?1",
          rusqlite::params![id_str, student_str, course_str, grade_str, exam_score],
        )?;
        if let Some(missing) = reconcile_links(
          &tx,
          "enrollment_metadata",
          "enrollment_id",
          &id_str,
          &enc_links,
          &now_str,
        )? {
          return Ok(TxOutcome::MissingMetadata(missing));
        }
        tx.commit()?;
        Ok(TxOutcome::Ok)
      })
      .await
      .map_err(|e| {
        if unique_violation(&e).is_some_and(|m| m.contains("enrollments.")) {
          return Error::DuplicateEnrollment {
            student_id: input.student_id,
            course_id:  input.course_id,
          };
        }
        Error::backend(e)
      })?;

    match outcome {
      TxOutcome::Ok => self
        .get_enrollment(id)
        .await?
        .map(|d| d.enrollment)
        .ok_or(Error::EnrollmentNotFound(id)),
      TxOutcome::RowNotFound => Err(Error::EnrollmentNotFound(id)),
      TxOutcome::MissingStudent => {
        Err(Error::StudentNotFound(input.student_id))
      }
      TxOutcome::MissingCourse(_) => {
        Err(Error::CourseNotFound(input.course_id))
      }
      TxOutcome::MissingMetadata(m) => {
        Err(Error::MetadataNotFound(decode_uuid(&m)?))
      }
    }
  }

  async fn get_enrollment(
    &self,
    id: Uuid,
  ) -> Result<Option<EnrollmentDetail>> {
    let id_str = encode_uuid(id);

    type RawDetail =
      (RawEnrollment, RawStudent, RawCourse, Vec<RawMetadataLink>);
    let raw: Option<RawDetail> = self
      .conn
      .call(move |conn| {
        let enrollment = conn
          .query_row(
            &format!(
              "SELECT {} FROM enrollments e WHERE e.enrollment_id = ?1",
              RawEnrollment::COLUMNS
            ),
            rusqlite::params![id_str],
            RawEnrollment::from_row,
          )
          .optional()?;

        let Some(enrollment) = enrollment else { return Ok(None) };

        let student = conn.query_row(
          &format!(
            "SELECT {} FROM students s WHERE s.student_id = ?1",
            RawStudent::COLUMNS
          ),
          rusqlite::params![enrollment.student_id],
          RawStudent::from_row,
        )?;

        let course = conn.query_row(
          &format!(
            "SELECT {} FROM courses c WHERE c.course_id = ?1",
            RawCourse::COLUMNS
          ),
          rusqlite::params![enrollment.course_id],
          RawCourse::from_row,
        )?;

        let mut stmt = conn.prepare(
          "SELECT m.metadata_id, m.key, m.value, m.created_at, m.updated_at, \
                  em.notes, em.assigned_at \
           FROM enrollment_metadata em \
           JOIN metadata m ON m.metadata_id = em.metadata_id \
           WHERE em.enrollment_id = ?1 \
           ORDER BY m.key, m.metadata_id",
        )?;
        let links = stmt
          .query_map(rusqlite::params![id_str], RawMetadataLink::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((enrollment, student, course, links)))
      })
      .await
      .map_err(Error::backend)?;

    let Some((raw_enrollment, raw_student, raw_course, raw_links)) = raw
    else {
      return Ok(None);
    };
    Ok(Some(EnrollmentDetail {
      enrollment: raw_enrollment.into_enrollment()?,
      student:    raw_student.into_student()?,
      course:     raw_course.into_course()?,
      metadata:   raw_links
        .into_iter()
        .map(RawMetadataLink::into_link)
        .collect::<Result<_>>()?,
    }))
  }

  async fn delete_enrollment(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM enrollments WHERE enrollment_id = ?1", id)
      .await
  }

  async fn list_enrollments(
    &self,
    query: &ListQuery,
  ) -> Result<Page<Enrollment>> {
    self
      .list_page(
        &ENROLLMENT_LIST,
        query,
        RawEnrollment::from_row,
        RawEnrollment::into_enrollment,
      )
      .await
  }

  // ── Metadata ──────────────────────────────────────────────────────────────

  async fn create_metadata(&self, input: NewMetadata) -> Result<Metadata> {
    let now = Utc::now();
    let metadata = Metadata {
      metadata_id: Uuid::new_v4(),
      key:         input.key,
      value:       input.value,
      created_at:  now,
      updated_at:  now,
    };

    let id_str = encode_uuid(metadata.metadata_id);
    let key    = metadata.key.clone();
    let value  = metadata.value.clone();
    let at_str = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO metadata (metadata_id, key, value, created_at, updated_at) \
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, key, value, at_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::backend)?;

    Ok(metadata)
  }

  async fn update_metadata(
    &self,
    id: Uuid,
    input: NewMetadata,
  ) -> Result<Metadata> {
    let id_str  = encode_uuid(id);
    let key     = input.key;
    let value   = input.value;
    let now_str = encode_dt(Utc::now());

    let affected = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE metadata SET key = ?2, value = ?3, updated_at = ?4 \
           WHERE metadata_id = ?1",
          rusqlite::params![id_str, key, value, now_str],
        )?)
      })
      .await
      .map_err(Error::backend)?;

    if affected == 0 {
      return Err(Error::MetadataNotFound(id));
    }
    self.get_metadata(id).await?.ok_or(Error::MetadataNotFound(id))
  }

  async fn get_metadata(&self, id: Uuid) -> Result<Option<Metadata>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawMetadata> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {} FROM metadata m WHERE m.metadata_id = ?1",
                RawMetadata::COLUMNS
              ),
              rusqlite::params![id_str],
              RawMetadata::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(Error::backend)?;

    raw.map(RawMetadata::into_metadata).transpose()
  }

  async fn delete_metadata(&self, id: Uuid) -> Result<bool> {
    self
      .delete_by_id("DELETE FROM metadata WHERE metadata_id = ?1", id)
      .await
  }

  async fn list_metadata(&self, query: &ListQuery) -> Result<Page<Metadata>> {
    self
      .list_page(
        &METADATA_LIST,
        query,
        RawMetadata::from_row,
        RawMetadata::into_metadata,
      )
      .await
  }
}

// ─── Instructor link helper ──────────────────────────────────────────────────

/// Replace an instructor's course and metadata link sets. Returns a non-`Ok`
/// outcome when a referenced id does not exist.
fn write_instructor_links(
  tx: &rusqlite::Transaction<'_>,
  instructor_id: &str,
  course_ids: &[String],
  metadata_ids: &[String],
) -> rusqlite::Result<Option<TxOutcome>> {
  tx.execute(
    "DELETE FROM instructor_courses WHERE instructor_id = ?1",
    rusqlite::params![instructor_id],
  )?;
  for course_id in course_ids {
    if !row_exists(tx, "SELECT 1 FROM courses WHERE course_id = ?1", course_id)? {
      return Ok(Some(TxOutcome::MissingCourse(course_id.clone())));
    }
    tx.execute(
      "INSERT INTO instructor_courses (instructor_id, course_id) VALUES (?1, ?2)",
      rusqlite::params![instructor_id, course_id],
    )?;
  }
  if let Some(missing) = replace_metadata_set(
    tx,
    "instructor_metadata",
    "instructor_id",
    instructor_id,
    metadata_ids,
  )? {
    return Ok(Some(TxOutcome::MissingMetadata(missing)));
  }
  Ok(None)
}
