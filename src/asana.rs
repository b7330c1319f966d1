#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode, header::RETRY_AFTER};
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    constants::{ASANA_PAGE_LIMIT, TASK_OPT_FIELDS},
    error::InternalError,
};

/// A custom field value attached to a task.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomField {
    /// Gid identifying which custom field this is.
    pub gid:        String,
    /// Text value, `null` when the field is empty.
    #[serde(default)]
    pub text_value: Option<String>,
}

/// A task as returned by a project listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Task {
    /// Task gid.
    pub gid:           String,
    /// Task name.
    pub name:          String,
    /// Custom field values requested through `opt_fields`.
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

impl Task {
    /// Returns the non-blank text value of the custom field `field_gid`.
    pub fn text_field(&self, field_gid: &str) -> Option<&str> {
        self.custom_fields
            .iter()
            .find(|field| field.gid == field_gid)
            .and_then(|field| field.text_value.as_deref())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }
}

/// Asana wraps every payload in a `data` envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    /// The payload.
    data:      T,
    /// Present on paginated responses when more pages remain.
    #[serde(default)]
    next_page: Option<NextPage>,
}

/// Pointer to the next page of a paginated listing.
#[derive(Debug, Deserialize)]
struct NextPage {
    /// Opaque offset token to pass back as `offset`.
    offset: String,
}

/// Request body for creating a subtask.
#[derive(Debug, Serialize)]
struct NewSubtask<'a> {
    /// Wrapped in `data` on the wire.
    data: SubtaskName<'a>,
}

/// The only field set on a new subtask.
#[derive(Debug, Serialize)]
struct SubtaskName<'a> {
    /// Name of the subtask.
    name: &'a str,
}

/// Response payload for a created subtask.
#[derive(Debug, Deserialize)]
struct CreatedTask {
    /// Gid of the new subtask.
    gid: String,
}

/// The operations the grading pipeline needs from a task tracker.
#[allow(async_fn_in_trait)]
pub trait TaskTracker {
    /// Lists every task in `project_id`, following pagination.
    async fn project_tasks(&self, project_id: &str) -> Result<Vec<Task>>;

    /// Creates a subtask named `name` under `parent_id`, returning its id.
    async fn create_subtask(&self, parent_id: &str, name: &str) -> Result<String>;
}

/// Thin client for the parts of the Asana REST API this tool uses.
#[derive(Clone)]
pub struct AsanaClient {
    /// Shared HTTP client.
    http:     Client,
    /// API base URL without a trailing slash.
    base_url: String,
    /// Personal access token.
    token:    String,
}

impl AsanaClient {
    /// Creates a client talking to `base_url` with `token`.
    pub fn new(http: Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    /// Creates a client from configuration. Fails if no token is configured.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            config.http_client()?,
            config.asana_base_url(),
            config.asana_token()?,
        ))
    }

    /// Starts a request against `path`, relative to the API base.
    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/json")
    }
}

/// Maps the status codes the operator can do something about to
/// [`InternalError`]; other failures surface as plain HTTP errors.
fn check_status(response: Response) -> Result<Response> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(InternalError::Unauthorized.into()),
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after_secs = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            Err(InternalError::RateLimited { retry_after_secs }.into())
        }
        _ => Ok(response.error_for_status()?),
    }
}

impl TaskTracker for AsanaClient {
    async fn project_tasks(&self, project_id: &str) -> Result<Vec<Task>> {
        let path = format!("/projects/{project_id}/tasks");
        let limit = ASANA_PAGE_LIMIT.to_string();
        let mut tasks = Vec::new();
        let mut offset: Option<String> = None;
        let mut pages = 0;

        loop {
            let mut query = vec![("opt_fields", TASK_OPT_FIELDS), ("limit", limit.as_str())];
            if let Some(offset) = offset.as_deref() {
                query.push(("offset", offset));
            }

            let response = self
                .request(reqwest::Method::GET, &path)
                .query(&query)
                .send()
                .await?;
            if response.status() == StatusCode::NOT_FOUND {
                return Err(InternalError::NotFound(project_id.to_string()).into());
            }

            let page: Envelope<Vec<Task>> = check_status(response)?
                .json()
                .await
                .with_context(|| format!("Unexpected response listing tasks of {project_id}"))?;
            pages += 1;
            tasks.extend(page.data);

            match page.next_page {
                Some(next) => offset = Some(next.offset),
                None => break,
            }
        }

        tracing::info!("Fetched {} tasks from Asana in {} page(s)", tasks.len(), pages);
        Ok(tasks)
    }

    async fn create_subtask(&self, parent_id: &str, name: &str) -> Result<String> {
        let body = NewSubtask {
            data: SubtaskName { name },
        };

        let response = self
            .request(reqwest::Method::POST, &format!("/tasks/{parent_id}/subtasks"))
            .json(&body)
            .send()
            .await?;

        let created: Envelope<CreatedTask> = check_status(response)?
            .json()
            .await
            .with_context(|| format!("Unexpected response creating a subtask of {parent_id}"))?;
        Ok(created.data.gid)
    }
}
