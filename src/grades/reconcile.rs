#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::HashMap, fmt::Display};

use crate::{
    error::InternalError,
    types::{GradeRecord, PostableGrade, Student},
    util::format_score,
};

/// Something odd about a single record. Warnings never stop a run.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// The roster lists the same email more than once; the later student wins.
    DuplicateStudent {
        /// The repeated email.
        email: String,
    },
    /// The export has more than one row for the same email; the later row wins.
    DuplicateGrade {
        /// The repeated email.
        email: String,
    },
    /// The student has no score for the assessment. The grade is dropped.
    MissingScore {
        /// Student's name as spelled in the export.
        name:  String,
        /// Student's email.
        email: String,
    },
    /// The score is under the warning threshold. The grade is still posted.
    BelowThreshold {
        /// Student's name as spelled in the export.
        name:      String,
        /// The student's score.
        score:     f64,
        /// The configured threshold.
        threshold: f64,
    },
    /// Nobody in the roster has this email. The grade is dropped.
    NotInRoster {
        /// Student's name as spelled in the export.
        name:  String,
        /// Student's email.
        email: String,
    },
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::DuplicateStudent { email } => {
                write!(f, "{email} appears more than once in Asana; using the last task.")
            }
            Warning::DuplicateGrade { email } => {
                write!(f, "{email} has more than one grade row; using the last one.")
            }
            Warning::MissingScore { name, email } => write!(
                f,
                "No score found for \"{name}\" ({email}). Have they taken the assessment?"
            ),
            Warning::BelowThreshold {
                name,
                score,
                threshold,
            } => write!(
                f,
                "\"{name}\" scored below {} ({}).",
                format_score(*threshold),
                format_score(*score)
            ),
            Warning::NotInRoster { name, email } => {
                write!(f, "{name} ({email}) was not found in Asana.")
            }
        }
    }
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reconciliation {
    /// Grades to post, highest score first.
    pub grades:   Vec<PostableGrade>,
    /// Everything worth telling the operator about, in the order it was found.
    pub warnings: Vec<Warning>,
}

/// Matches grade rows for `assessment` against the roster by email.
///
/// Rows without a score and rows for unknown emails are dropped, low scores
/// are kept but flagged. The result is sorted by score, highest first, with
/// ties left in export order.
///
/// * `students`: the roster
/// * `records`: every row of the grade export
/// * `assessment`: the assessment to post
/// * `threshold`: scores below this fraction are flagged
pub fn reconcile(
    students: &[Student],
    records: &[GradeRecord],
    assessment: &str,
    threshold: f64,
) -> Result<Reconciliation, InternalError> {
    let records: Vec<&GradeRecord> = records
        .iter()
        .filter(|record| record.assessment_name == assessment)
        .collect();
    if records.is_empty() {
        return Err(InternalError::NoData(format!(
            "No grades found for assessment \"{assessment}\". Ensure the assessment name matches \
             the one in the grade export."
        )));
    }

    let mut warnings = Vec::new();

    let mut roster: HashMap<&str, &Student> = HashMap::new();
    for student in students {
        if roster.insert(student.email.as_str(), student).is_some() {
            warnings.push(Warning::DuplicateStudent {
                email: student.email.clone(),
            });
        }
    }

    // First-seen order of each email, holding the last row written for it.
    let mut by_email: Vec<&GradeRecord> = Vec::new();
    let mut positions: HashMap<&str, usize> = HashMap::new();
    for record in records {
        match positions.get(record.student_email.as_str()) {
            Some(&pos) => {
                warnings.push(Warning::DuplicateGrade {
                    email: record.student_email.clone(),
                });
                by_email[pos] = record;
            }
            None => {
                positions.insert(record.student_email.as_str(), by_email.len());
                by_email.push(record);
            }
        }
    }

    let mut grades = Vec::new();
    for record in by_email {
        let Some(score) = record.score else {
            warnings.push(Warning::MissingScore {
                name:  record.student_name.clone(),
                email: record.student_email.clone(),
            });
            continue;
        };

        if score < threshold {
            warnings.push(Warning::BelowThreshold {
                name: record.student_name.clone(),
                score,
                threshold,
            });
        }

        let Some(student) = roster.get(record.student_email.as_str()) else {
            warnings.push(Warning::NotInRoster {
                name:  record.student_name.clone(),
                email: record.student_email.clone(),
            });
            continue;
        };

        grades.push(PostableGrade {
            student_id: student.id.clone(),
            student_name: record.student_name.clone(),
            assessment_name: record.assessment_name.clone(),
            score,
        });
    }

    // `sort_by` is stable, so equal scores keep export order.
    grades.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(Reconciliation { grades, warnings })
}
