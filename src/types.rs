#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::{Deserialize, Serialize};

/// An enrolled student, as recorded in the Asana project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Gid of the student's Asana task. Older caches call this `gid`.
    #[serde(alias = "gid")]
    pub id:    String,
    /// Display name (the task name).
    pub name:  String,
    /// Email address read from the email custom field.
    pub email: String,
}

/// One row of the grade export.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeRecord {
    /// Email of the student the row belongs to.
    pub student_email:   String,
    /// Name of the student as the export spells it.
    pub student_name:    String,
    /// Assessment the row is scoped to.
    pub assessment_name: String,
    /// Fraction in `[0, 1]`, or `None` when the student has no score yet.
    pub score:           Option<f64>,
}

/// A grade that survived reconciliation and can be posted.
#[derive(Debug, Clone, PartialEq)]
pub struct PostableGrade {
    /// Gid of the student's Asana task.
    pub student_id:      String,
    /// Name used when reporting on this grade.
    pub student_name:    String,
    /// Assessment being graded.
    pub assessment_name: String,
    /// Fraction in `[0, 1]`.
    pub score:           f64,
}
