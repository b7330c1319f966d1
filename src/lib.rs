//! # rollcall
//!
//! Classroom chores: random student groups, and posting assessment grades
//! from a Learn export to the students' Asana tasks.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Client for the Asana REST API
pub mod asana;
/// Entry points for each subcommand
pub mod commands;
/// Configuration read from the environment
pub mod config;
/// A module defining a bunch of constant values to be used throughout
pub mod constants;
/// Errors the operator can act on
pub mod error;
/// For all things related to grades
pub mod grades;
/// Random grouping of students
pub mod groups;
/// Fetching and caching the student roster
pub mod roster;
/// Records shared across modules
pub mod types;
/// Utility functions for convenience
pub mod util;

pub use config::Config;
pub use error::InternalError;
pub use types::{GradeRecord, PostableGrade, Student};
