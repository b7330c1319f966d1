#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Reading grade exports, matching them against the roster, and posting the
//! result to Asana.

/// Posting reconciled grades as Asana subtasks
pub mod publish;
/// Matching grade rows against the roster
pub mod reconcile;
/// Parsing CSV and JSON grade exports
pub mod source;

pub use publish::{GradePublisher, PublishFailure, PublishReport, PublishResult, subtask_name};
pub use reconcile::{Reconciliation, Warning, reconcile};
pub use source::{
    ExportFormat, GradeMapping, NameFields, ParsedExport, ScoreScale, SkippedRow, load_grades,
};
