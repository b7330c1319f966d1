#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::Path;

use anyhow::{Context, Result};

use crate::{asana::TaskTracker, error::InternalError, types::Student};

/// Fetches the students of an Asana project.
///
/// Tasks without a value in the email custom field are tracking tasks, not
/// students, and are skipped.
///
/// * `tracker`: the task tracker to read from
/// * `project_id`: gid of the project holding one task per student
/// * `email_field_gid`: gid of the custom field carrying student emails
pub async fn fetch_students<T: TaskTracker>(
    tracker: &T,
    project_id: &str,
    email_field_gid: &str,
) -> Result<Vec<Student>> {
    let tasks = tracker.project_tasks(project_id).await?;
    let total = tasks.len();

    let students: Vec<Student> = tasks
        .into_iter()
        .filter_map(|task| {
            let email = task.text_field(email_field_gid)?.to_string();
            Some(Student {
                id: task.gid,
                name: task.name,
                email,
            })
        })
        .collect();

    tracing::info!(
        "Found {} students ({} non-student tasks skipped)",
        students.len(),
        total - students.len()
    );
    Ok(students)
}

/// Reads the roster cache written by [`save_cached_students`].
pub async fn load_cached_students(path: &Path) -> Result<Vec<Student>, InternalError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| InternalError::roster_unavailable(path, e.to_string()))?;

    serde_json::from_str(&text).map_err(|e| InternalError::roster_unavailable(path, e.to_string()))
}

/// Replaces the roster cache at `path` with `students`.
///
/// The roster is written to a sibling temporary file that is then renamed
/// over `path`, so readers never see a half-written cache.
pub async fn save_cached_students(path: &Path, students: &[Student]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Could not create {}", parent.display()))?;
    }

    let json = serde_json::to_string_pretty(students).context("Could not serialize roster")?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = Path::new(&tmp);

    tokio::fs::write(tmp, json)
        .await
        .with_context(|| format!("Could not write {}", tmp.display()))?;
    if let Err(e) = tokio::fs::rename(tmp, path).await {
        let _ = tokio::fs::remove_file(tmp).await;
        return Err(e).with_context(|| format!("Could not replace {}", path.display()));
    }

    Ok(())
}
