//! Mapping from SQLite-layer failures to [`roster_core::Error`].

use thiserror::Error;

/// A stored value that could not be decoded back into its domain type.
#[derive(Debug, Error)]
#[error("decode error: {0}")]
pub(crate) struct DecodeError(pub String);

/// If `e` is a SQLite UNIQUE-constraint violation, return its message
/// (e.g. `"UNIQUE constraint failed: students.email"`) so the caller can
/// classify which constraint fired.
pub(crate) fn unique_violation(e: &tokio_rusqlite::Error) -> Option<&str> {
  if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
    failure,
    Some(msg),
  )) = e
    && failure.code == rusqlite::ErrorCode::ConstraintViolation
    && msg.contains("UNIQUE constraint failed")
  {
    return Some(msg);
  }
  None
}
