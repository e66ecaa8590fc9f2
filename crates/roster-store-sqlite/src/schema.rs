//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS metadata (
    metadata_id TEXT PRIMARY KEY,
    key         TEXT NOT NULL,
    value       TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    student_id    TEXT PRIMARY KEY,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    date_of_birth TEXT NOT NULL,   -- calendar date, YYYY-MM-DD
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS courses (
    course_id   TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    code        TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS instructors (
    instructor_id TEXT PRIMARY KEY,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    created_at    TEXT NOT NULL
);

-- One row per (student, course); removing either endpoint removes the
-- enrollment.
CREATE TABLE IF NOT EXISTS enrollments (
    enrollment_id TEXT PRIMARY KEY,
    student_id    TEXT NOT NULL REFERENCES students(student_id)  ON DELETE CASCADE,
    course_id     TEXT NOT NULL REFERENCES courses(course_id)    ON DELETE CASCADE,
    grade         TEXT,            -- 'A' | 'B' | 'C' | 'D' | 'F' or NULL
    exam_score    REAL,
    created_at    TEXT NOT NULL,
    UNIQUE (student_id, course_id)
);

CREATE TABLE IF NOT EXISTS instructor_courses (
    instructor_id TEXT NOT NULL REFERENCES instructors(instructor_id) ON DELETE CASCADE,
    course_id     TEXT NOT NULL REFERENCES courses(course_id)         ON DELETE CASCADE,
    PRIMARY KEY (instructor_id, course_id)
);

-- Notes-bearing join entities for students and enrollments.
CREATE TABLE IF NOT EXISTS student_metadata (
    student_id  TEXT NOT NULL REFERENCES students(student_id) ON DELETE CASCADE,
    metadata_id TEXT NOT NULL REFERENCES metadata(metadata_id) ON DELETE CASCADE,
    notes       TEXT NOT NULL DEFAULT '',
    assigned_at TEXT NOT NULL,
    PRIMARY KEY (student_id, metadata_id)
);

CREATE TABLE IF NOT EXISTS enrollment_metadata (
    enrollment_id TEXT NOT NULL REFERENCES enrollments(enrollment_id) ON DELETE CASCADE,
    metadata_id   TEXT NOT NULL REFERENCES metadata(metadata_id)      ON DELETE CASCADE,
    notes         TEXT NOT NULL DEFAULT '',
    assigned_at   TEXT NOT NULL,
    PRIMARY KEY (enrollment_id, metadata_id)
);

-- Plain link tables for courses and instructors.
CREATE TABLE IF NOT EXISTS course_metadata (
    course_id   TEXT NOT NULL REFERENCES courses(course_id)   ON DELETE CASCADE,
    metadata_id TEXT NOT NULL REFERENCES metadata(metadata_id) ON DELETE CASCADE,
    PRIMARY KEY (course_id, metadata_id)
);

CREATE TABLE IF NOT EXISTS instructor_metadata (
    instructor_id TEXT NOT NULL REFERENCES instructors(instructor_id) ON DELETE CASCADE,
    metadata_id   TEXT NOT NULL REFERENCES metadata(metadata_id)      ON DELETE CASCADE,
    PRIMARY KEY (instructor_id, metadata_id)
);

CREATE INDEX IF NOT EXISTS students_name_idx      ON students(last_name, first_name);
CREATE INDEX IF NOT EXISTS courses_code_idx       ON courses(code);
CREATE INDEX IF NOT EXISTS metadata_key_idx       ON metadata(key);
CREATE INDEX IF NOT EXISTS enrollments_student_idx ON enrollments(student_id);
CREATE INDEX IF NOT EXISTS enrollments_course_idx  ON enrollments(course_id);

PRAGMA user_version = 1;
";
