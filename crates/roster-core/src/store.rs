//! The `RosterStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! The HTTP layer (`roster-api`) depends on this abstraction, not on any
//! concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`). Every method
//! returns [`crate::Error`], which carries the typed constraint and
//! not-found failures the HTTP layer turns into status codes.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Result,
  course::{Course, CourseDetail, NewCourse},
  enrollment::{Enrollment, EnrollmentDetail, NewEnrollment},
  instructor::{Instructor, InstructorDetail, NewInstructor},
  metadata::{Metadata, MetadataLinkInput, NewMetadata},
  query::{ListQuery, Page},
  student::{NewStudent, Student, StudentDetail},
};

pub trait RosterStore: Send + Sync {
  // ── Students ──────────────────────────────────────────────────────────
  //
  // Create and update take the student's metadata-link formset alongside the
  // entity fields; the row write and the link reconciliation happen in one
  // transaction. Reconciliation inserts missing links, updates notes on
  // existing ones, and removes those flagged `delete`.

  fn create_student(
    &self,
    input: NewStudent,
    links: Vec<MetadataLinkInput>,
  ) -> impl Future<Output = Result<Student>> + Send + '_;

  fn update_student(
    &self,
    id: Uuid,
    input: NewStudent,
    links: Vec<MetadataLinkInput>,
  ) -> impl Future<Output = Result<Student>> + Send + '_;

  /// Retrieve a student with its metadata links. `None` if not found.
  fn get_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<StudentDetail>>> + Send + '_;

  /// Delete a student; enrollments and links go with it. Returns whether a
  /// row was removed.
  fn delete_student(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  /// Searchable fields: first name, last name, email.
  /// Ordered by (last_name, first_name).
  fn list_students<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Student>>> + Send + 'a;

  // ── Courses ───────────────────────────────────────────────────────────

  fn create_course(
    &self,
    input: NewCourse,
  ) -> impl Future<Output = Result<Course>> + Send + '_;

  fn update_course(
    &self,
    id: Uuid,
    input: NewCourse,
  ) -> impl Future<Output = Result<Course>> + Send + '_;

  fn get_course(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<CourseDetail>>> + Send + '_;

  fn delete_course(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  /// Searchable fields: name, code. Ordered by (name, code).
  fn list_courses<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Course>>> + Send + 'a;

  // ── Instructors ───────────────────────────────────────────────────────

  fn create_instructor(
    &self,
    input: NewInstructor,
  ) -> impl Future<Output = Result<Instructor>> + Send + '_;

  fn update_instructor(
    &self,
    id: Uuid,
    input: NewInstructor,
  ) -> impl Future<Output = Result<Instructor>> + Send + '_;

  fn get_instructor(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<InstructorDetail>>> + Send + '_;

  fn delete_instructor(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  /// Searchable fields: first name, last name, email, plus the names and
  /// codes of taught courses (relation traversal). Ordered by
  /// (first_name, last_name).
  fn list_instructors<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Instructor>>> + Send + 'a;

  // ── Enrollments ───────────────────────────────────────────────────────

  fn create_enrollment(
    &self,
    input: NewEnrollment,
    links: Vec<MetadataLinkInput>,
  ) -> impl Future<Output = Result<Enrollment>> + Send + '_;

  fn update_enrollment(
    &self,
    id: Uuid,
    input: NewEnrollment,
    links: Vec<MetadataLinkInput>,
  ) -> impl Future<Output = Result<Enrollment>> + Send + '_;

  fn get_enrollment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<EnrollmentDetail>>> + Send + '_;

  fn delete_enrollment(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  /// Searchable fields: student first/last name, course code, grade, exam
  /// score. Ordered by (student last name, student first name, course code).
  fn list_enrollments<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Enrollment>>> + Send + 'a;

  // ── Metadata ──────────────────────────────────────────────────────────

  fn create_metadata(
    &self,
    input: NewMetadata,
  ) -> impl Future<Output = Result<Metadata>> + Send + '_;

  /// Updates `updated_at` alongside the fields.
  fn update_metadata(
    &self,
    id: Uuid,
    input: NewMetadata,
  ) -> impl Future<Output = Result<Metadata>> + Send + '_;

  fn get_metadata(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Metadata>>> + Send + '_;

  /// Deleting a metadata record detaches it from every entity.
  fn delete_metadata(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  /// Searchable fields: key, value. Ordered by (key, metadata_id).
  fn list_metadata<'a>(
    &'a self,
    query: &'a ListQuery,
  ) -> impl Future<Output = Result<Page<Metadata>>> + Send + 'a;
}
