#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use reqwest::Client;
use typed_builder::TypedBuilder;

use crate::{
    constants::{
        ASANA_API_BASE, DEFAULT_GRADES_PATH, DEFAULT_ROSTER_PATH, EMAIL_CUSTOM_FIELD_GID,
        GRADE_WARNING_THRESHOLD,
    },
    error::InternalError,
    grades::source::{ExportFormat, GradeMapping, NameFields, ScoreScale},
};

/// Everything a command needs to know about its environment.
///
/// Built once in `main` and handed to each command; nothing below the
/// command layer reads the environment itself.
#[derive(Debug, Clone, TypedBuilder)]
pub struct Config {
    /// Asana personal access token.
    #[builder(default, setter(strip_option, into))]
    asana_token:            Option<String>,
    /// Gid of the Asana project holding one task per student.
    #[builder(default, setter(strip_option, into))]
    asana_project_id:       Option<String>,
    /// Base URL of the Asana API, overridable for testing.
    #[builder(default = ASANA_API_BASE.to_string(), setter(into))]
    asana_base_url:         String,
    /// Gid of the custom field carrying student emails.
    #[builder(default = EMAIL_CUSTOM_FIELD_GID.to_string(), setter(into))]
    email_field_gid:        String,
    /// Location of the roster cache.
    #[builder(default = PathBuf::from(DEFAULT_ROSTER_PATH), setter(into))]
    roster_path:            PathBuf,
    /// Location of the grade export.
    #[builder(default = PathBuf::from(DEFAULT_GRADES_PATH), setter(into))]
    grades_path:            PathBuf,
    /// Format of the grade export.
    #[builder(default = ExportFormat::Csv)]
    grades_format:          ExportFormat,
    /// How export columns map onto grade records.
    #[builder(default = GradeMapping::learn_csv())]
    grade_mapping:          GradeMapping,
    /// Scores below this fraction produce a warning.
    #[builder(default = GRADE_WARNING_THRESHOLD)]
    warning_threshold:      f64,
    /// Grade settings that were set but could not be parsed. Only commands
    /// that read grades report them.
    #[builder(default, setter(skip))]
    invalid_grade_settings: Vec<String>,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`, which maps a variable name to its
    /// value. Blank values count as unset.
    ///
    /// Malformed grade settings fall back to their defaults and are surfaced
    /// by [`Config::check_grade_settings`] instead.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let grades_path =
            PathBuf::from(get("ROLLCALL_GRADES_PATH").unwrap_or(DEFAULT_GRADES_PATH.into()));
        let mut invalid_grade_settings = Vec::new();
        let mut defer = |err: InternalError| invalid_grade_settings.push(err.to_string());

        let format = get("ROLLCALL_GRADES_FORMAT").map(|f| f.parse::<ExportFormat>());
        let grades_format = match format {
            Some(Ok(format)) => format,
            Some(Err(err)) => {
                defer(err);
                ExportFormat::from_path(&grades_path)
            }
            None => ExportFormat::from_path(&grades_path),
        };

        let mut grade_mapping = match grades_format {
            ExportFormat::Csv => GradeMapping::learn_csv(),
            ExportFormat::Json => GradeMapping::learn_json(),
        };
        if let Some(field) = get("ROLLCALL_FIELD_ASSESSMENT") {
            grade_mapping.assessment = field;
        }
        if let Some(field) = get("ROLLCALL_FIELD_EMAIL") {
            grade_mapping.email = field;
        }
        if let Some(field) = get("ROLLCALL_FIELD_SCORE") {
            grade_mapping.score = field;
        }
        if let Some(field) = get("ROLLCALL_FIELD_NAME") {
            grade_mapping.name = NameFields::parse(&field);
        }
        if let Some(scale) = get("ROLLCALL_SCORE_SCALE") {
            match scale.parse::<ScoreScale>() {
                Ok(scale) => grade_mapping.scale = scale,
                Err(err) => defer(err),
            }
        }

        let threshold = get("ROLLCALL_WARNING_THRESHOLD").map(|raw| parse_threshold(&raw));
        let warning_threshold = match threshold {
            Some(Ok(threshold)) => threshold,
            Some(Err(err)) => {
                defer(err);
                GRADE_WARNING_THRESHOLD
            }
            None => GRADE_WARNING_THRESHOLD,
        };

        Self {
            asana_token: get("ASANA_TOKEN"),
            asana_project_id: get("ASANA_PROJECT_ID"),
            asana_base_url: get("ASANA_BASE_URL").unwrap_or(ASANA_API_BASE.into()),
            email_field_gid: get("ROLLCALL_EMAIL_FIELD_GID")
                .unwrap_or(EMAIL_CUSTOM_FIELD_GID.into()),
            roster_path: PathBuf::from(
                get("ROLLCALL_ROSTER_PATH").unwrap_or(DEFAULT_ROSTER_PATH.into()),
            ),
            grades_path,
            grades_format,
            grade_mapping,
            warning_threshold,
            invalid_grade_settings,
        }
    }

    /// Fails if any grade setting from the environment was malformed.
    pub fn check_grade_settings(&self) -> Result<(), InternalError> {
        match self.invalid_grade_settings.as_slice() {
            [] => Ok(()),
            problems => Err(InternalError::InvalidArgument(problems.join(" "))),
        }
    }

    /// Returns the Asana token, or an error naming the missing variable.
    pub fn asana_token(&self) -> Result<&str, InternalError> {
        self.asana_token
            .as_deref()
            .ok_or(InternalError::MissingConfig("ASANA_TOKEN"))
    }

    /// Returns the Asana project id, or an error naming the missing variable.
    pub fn asana_project_id(&self) -> Result<&str, InternalError> {
        self.asana_project_id
            .as_deref()
            .ok_or(InternalError::MissingConfig("ASANA_PROJECT_ID"))
    }

    /// Returns the Asana API base URL.
    pub fn asana_base_url(&self) -> &str {
        &self.asana_base_url
    }

    /// Returns the gid of the email custom field.
    pub fn email_field_gid(&self) -> &str {
        &self.email_field_gid
    }

    /// Returns the roster cache location.
    pub fn roster_path(&self) -> &Path {
        &self.roster_path
    }

    /// Returns the grade export location.
    pub fn grades_path(&self) -> &Path {
        &self.grades_path
    }

    /// Returns the grade export format.
    pub fn grades_format(&self) -> ExportFormat {
        self.grades_format
    }

    /// Returns the grade export field mapping.
    pub fn grade_mapping(&self) -> &GradeMapping {
        &self.grade_mapping
    }

    /// Returns the score below which a warning is emitted.
    pub fn warning_threshold(&self) -> f64 {
        self.warning_threshold
    }

    /// Builds the HTTP client used for Asana requests.
    pub fn http_client(&self) -> Result<Client> {
        Client::builder()
            // Asana is reached directly; system proxy discovery is skipped.
            .no_proxy()
            .build()
            .context("Failed to construct HTTP client")
    }
}

/// Parses a warning threshold, which must be a fraction in `[0, 1]`.
fn parse_threshold(raw: &str) -> Result<f64, InternalError> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| (0.0..=1.0).contains(value))
        .ok_or_else(|| {
            InternalError::InvalidArgument(format!(
                "ROLLCALL_WARNING_THRESHOLD must be a number between 0 and 1, got \"{raw}\"."
            ))
        })
}
