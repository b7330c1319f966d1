#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use futures::future::join_all;

use crate::{asana::TaskTracker, types::PostableGrade, util::format_score};

/// A grade that could not be posted, and why.
#[derive(Debug)]
pub struct PublishFailure {
    /// The grade that was being posted.
    pub grade: PostableGrade,
    /// What went wrong.
    pub error: anyhow::Error,
}

/// Outcome of posting one grade: the grade itself on success.
pub type PublishResult = Result<PostableGrade, PublishFailure>;

/// Name of the subtask that records `grade`, eg. `[Assessment: Arrays] - 90%`.
pub fn subtask_name(grade: &PostableGrade) -> String {
    format!(
        "[Assessment: {}] - {}",
        grade.assessment_name,
        format_score(grade.score)
    )
}

/// Posts grades as subtasks of each student's task.
pub struct GradePublisher<'a, T> {
    /// Where subtasks are created.
    tracker: &'a T,
}

impl<'a, T: TaskTracker> GradePublisher<'a, T> {
    /// Creates a publisher writing to `tracker`.
    pub fn new(tracker: &'a T) -> Self {
        Self { tracker }
    }

    /// Posts every grade concurrently and waits for all of them.
    ///
    /// A failed post does not cancel the others. Results are returned in the
    /// same order as `grades`.
    pub async fn publish(&self, grades: Vec<PostableGrade>) -> Vec<PublishResult> {
        let posts = grades.into_iter().map(|grade| async move {
            let name = subtask_name(&grade);
            match self.tracker.create_subtask(&grade.student_id, &name).await {
                Ok(_) => Ok(grade),
                Err(error) => Err(PublishFailure { grade, error }),
            }
        });

        join_all(posts).await
    }
}

/// Tally of a publish pass.
#[derive(Debug, Default)]
pub struct PublishReport {
    /// Grades that were posted.
    pub posted: Vec<PostableGrade>,
    /// Grades that failed to post.
    pub failed: Vec<PublishFailure>,
}

impl FromIterator<PublishResult> for PublishReport {
    fn from_iter<I: IntoIterator<Item = PublishResult>>(iter: I) -> Self {
        let mut report = PublishReport::default();
        for result in iter {
            match result {
                Ok(grade) => report.posted.push(grade),
                Err(failure) => report.failed.push(failure),
            }
        }
        report
    }
}
