//! Core types and trait definitions for the Roster student-records service.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod course;
pub mod enrollment;
pub mod error;
pub mod instructor;
pub mod metadata;
pub mod query;
pub mod store;
pub mod student;

pub use error::{Error, FieldError, Result};
