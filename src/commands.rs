#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Write;

use anyhow::Result;
use rand::Rng;

use crate::{
    asana::{AsanaClient, TaskTracker},
    config::Config,
    error::InternalError,
    grades::{self, GradePublisher, PublishReport},
    groups::{self, parse_exclusions, parse_group_size, render_groups},
    roster::{fetch_students, load_cached_students, save_cached_students},
    types::{GradeRecord, PostableGrade, Student},
    util::format_score,
};

/// Fetches the roster from Asana and writes it to the roster cache.
pub async fn download_students(config: &Config) -> Result<Vec<Student>> {
    let client = AsanaClient::from_config(config)?;
    let project_id = config.asana_project_id()?;

    let students = fetch_students(&client, project_id, config.email_field_gid()).await?;
    save_cached_students(config.roster_path(), &students).await?;

    tracing::info!(
        "Saved {} students to {}",
        students.len(),
        config.roster_path().display()
    );
    Ok(students)
}

/// Builds random groups from the cached roster and renders them.
///
/// * `size`: group size as typed by the user
/// * `exclude`: `--exclude` arguments, each possibly comma separated
/// * `rng`: source of randomness for the shuffle
pub async fn make_groups<S, R>(
    config: &Config,
    size: &str,
    exclude: &[S],
    rng: &mut R,
) -> Result<String>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let size = parse_group_size(size)?;
    let exclude = parse_exclusions(exclude);

    let names = load_cached_students(config.roster_path())
        .await?
        .into_iter()
        .map(|student| student.name)
        .collect();

    let groups = groups::make_groups(names, &exclude, size, rng)?;
    Ok(render_groups(&groups))
}

/// What `post-grades` did.
#[derive(Debug)]
pub enum PostGradesOutcome {
    /// Nothing was posted; these grades would have been.
    DryRun(Vec<PostableGrade>),
    /// Grades were posted.
    Published(PublishReport),
}

/// Reconciles the grade export against the roster and posts the result.
///
/// A dry run reads the roster from the local cache and makes no Asana calls
/// at all. A real run fetches the roster fresh before posting.
pub async fn post_grades(
    config: &Config,
    assessment: &str,
    dry_run: bool,
) -> Result<PostGradesOutcome> {
    let assessment = assessment.trim();
    if assessment.is_empty() {
        return Err(InternalError::InvalidArgument("Missing assessment name.".into()).into());
    }
    config.check_grade_settings()?;

    if dry_run {
        let (students, records) = tokio::try_join!(
            load_cached_students(config.roster_path()),
            load_export(config),
        )?;
        let grades = reconcile_and_warn(config, &students, &records, assessment)?;
        return Ok(PostGradesOutcome::DryRun(grades));
    }

    let client = AsanaClient::from_config(config)?;
    publish_grades(&client, config, assessment)
        .await
        .map(PostGradesOutcome::Published)
}

/// Fetches the roster through `tracker`, reconciles, and posts every grade.
pub async fn publish_grades<T: TaskTracker>(
    tracker: &T,
    config: &Config,
    assessment: &str,
) -> Result<PublishReport> {
    config.check_grade_settings()?;
    let project_id = config.asana_project_id()?;

    let (students, records) = tokio::try_join!(
        fetch_students(tracker, project_id, config.email_field_gid()),
        async { load_export(config).await.map_err(anyhow::Error::from) },
    )?;
    let grades = reconcile_and_warn(config, &students, &records, assessment)?;

    let report: PublishReport = GradePublisher::new(tracker)
        .publish(grades)
        .await
        .into_iter()
        .collect();

    for failure in &report.failed {
        tracing::error!(
            "Could not post {} for {}: {:#}",
            format_score(failure.grade.score),
            failure.grade.student_name,
            failure.error
        );
    }
    Ok(report)
}

/// Reads the configured grade export.
async fn load_export(config: &Config) -> Result<Vec<GradeRecord>, InternalError> {
    grades::load_grades(
        config.grades_path(),
        config.grades_format(),
        config.grade_mapping(),
    )
    .await
}

/// Runs reconciliation, logs its warnings, and refuses an empty result.
fn reconcile_and_warn(
    config: &Config,
    students: &[Student],
    records: &[GradeRecord],
    assessment: &str,
) -> Result<Vec<PostableGrade>, InternalError> {
    let reconciliation =
        grades::reconcile(students, records, assessment, config.warning_threshold())?;

    for warning in &reconciliation.warnings {
        tracing::warn!("{warning}");
    }

    if reconciliation.grades.is_empty() {
        return Err(InternalError::NoData(format!(
            "No grades can be posted for assessment \"{assessment}\"."
        )));
    }
    Ok(reconciliation.grades)
}

/// Renders the grades a dry run would post, one per line, in posting order.
pub fn render_dry_run(grades: &[PostableGrade]) -> String {
    let mut out = String::from("Without --dry-run, the following grades will be posted:\n");
    for grade in grades {
        let _ = writeln!(
            out,
            "{} -> {} - {}",
            grade.student_name,
            grade.assessment_name,
            format_score(grade.score)
        );
    }
    out
}

/// Summarizes a publish pass, listing any grade that failed to post.
pub fn render_report(report: &PublishReport) -> String {
    let total = report.posted.len() + report.failed.len();
    let mut out = format!("Posted {} of {} grades.\n", report.posted.len(), total);
    if !report.failed.is_empty() {
        out.push_str("Failed to post:\n");
        for failure in &report.failed {
            let _ = writeln!(
                out,
                "{} -> {} - {}",
                failure.grade.student_name,
                failure.grade.assessment_name,
                format_score(failure.grade.score)
            );
        }
    }
    out
}
