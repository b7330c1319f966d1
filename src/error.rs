#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::PathBuf;

use thiserror::Error;

/// Errors the operator can act on.
///
/// These are caught in `main`, printed without a backtrace, and turned into a
/// non-zero exit code. Anything that is not an `InternalError` is treated as
/// a bug and propagates with its full `anyhow` chain.
#[derive(Debug, Error)]
pub enum InternalError {
    /// A required configuration value is not set.
    #[error(
        "Missing {0} environment variable. Add it to .env or set it when running this command."
    )]
    MissingConfig(&'static str),

    /// Asana rejected the personal access token.
    #[error("Could not authorize with Asana API. Ensure your Personal Access Token is correct.")]
    Unauthorized,

    /// The Asana project reference did not resolve.
    #[error("Could not find Asana project \"{0}\". Double-check your Asana project id.")]
    NotFound(String),

    /// Asana throttled the request.
    #[error("Got rate-limited by Asana. {}", wait_hint(.retry_after_secs))]
    RateLimited {
        /// Seconds to wait, if the server said so.
        retry_after_secs: Option<u64>,
    },

    /// A local data file is missing or could not be parsed.
    #[error("Could not read \"{}\": {reason}. {hint}", .path.display())]
    DataUnavailable {
        /// The file that was expected.
        path:   PathBuf,
        /// What went wrong while reading it.
        reason: String,
        /// What the operator should do about it.
        hint:   String,
    },

    /// A caller-supplied argument is out of range or malformed.
    #[error("{0}")]
    InvalidArgument(String),

    /// There is nothing to work with.
    #[error("{0}")]
    NoData(String),
}

/// Renders the wait advice for a rate-limit error.
fn wait_hint(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!("Wait {secs} seconds before running again."),
        None => "Wait a minute before running again.".to_string(),
    }
}

impl InternalError {
    /// Shorthand for a grade export that cannot be used.
    pub fn grades_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        let path = path.into();
        let hint = format!("Ensure grades are downloaded to \"{}\".", path.display());
        Self::DataUnavailable {
            path,
            reason: reason.into(),
            hint,
        }
    }

    /// Shorthand for a roster cache that cannot be used.
    pub fn roster_unavailable(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            path:   path.into(),
            reason: reason.into(),
            hint:   "Run `rollcall download-students` first.".to_string(),
        }
    }
}
