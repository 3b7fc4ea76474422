//! Assignment, submission and grading service for a classroom code-review
//! workflow.
//!
//! Instructors create assignments, students submit code against them, and
//! instructors grade (`pass`/`fail`) or delete submissions. [`ClassroomService`]
//! is the entry point; [`routes::router`] exposes it as JSON over HTTP.

pub mod assignments;
pub mod config;
pub mod db;
pub mod error;
pub mod grading;
pub mod routes;
pub mod selection;
pub mod service;
pub mod state;
pub mod submissions;

pub use error::{ErrorKind, ServiceError, ServiceResult};
pub use service::ClassroomService;
