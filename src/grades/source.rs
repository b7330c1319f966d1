#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::HashMap, fmt, path::Path, str::FromStr};

use serde_json::Value;
use typed_builder::TypedBuilder;

use crate::{error::InternalError, types::GradeRecord};

/// File format of a grade export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma separated values with a header row.
    Csv,
    /// A JSON array of objects.
    Json,
}

impl ExportFormat {
    /// Guesses the format from a file extension, falling back to CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

impl FromStr for ExportFormat {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(InternalError::InvalidArgument(format!(
                "Unknown grade export format \"{other}\", expected \"csv\" or \"json\"."
            ))),
        }
    }
}

/// Range the export's scores are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreScale {
    /// `0` to `100`.
    Percent,
    /// `0` to `1`.
    Fraction,
}

impl ScoreScale {
    /// Largest score the scale allows.
    fn max(self) -> f64 {
        match self {
            Self::Percent => 100.0,
            Self::Fraction => 1.0,
        }
    }
}

impl FromStr for ScoreScale {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "percent" | "percentage" => Ok(Self::Percent),
            "fraction" => Ok(Self::Fraction),
            other => Err(InternalError::InvalidArgument(format!(
                "Unknown score scale \"{other}\", expected \"percent\" or \"fraction\"."
            ))),
        }
    }
}

/// Where a student's display name comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameFields {
    /// A single field holding the full name.
    Full(String),
    /// Separate first and last name fields, joined with a space.
    Split {
        /// Field holding the first name.
        first: String,
        /// Field holding the last name.
        last:  String,
    },
}

impl NameFields {
    /// Parses `first+last` into a split mapping, anything else into a single
    /// full-name field.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('+') {
            Some((first, last)) => Self::Split {
                first: first.trim().to_string(),
                last:  last.trim().to_string(),
            },
            None => Self::Full(raw.trim().to_string()),
        }
    }

    /// Field names this mapping reads.
    fn fields(&self) -> Vec<&str> {
        match self {
            Self::Full(field) => vec![field.as_str()],
            Self::Split { first, last } => vec![first.as_str(), last.as_str()],
        }
    }
}

/// Maps the columns (CSV) or keys (JSON) of a grade export onto
/// [`GradeRecord`] fields.
#[derive(Debug, Clone, PartialEq, TypedBuilder)]
pub struct GradeMapping {
    /// Field naming the assessment a row belongs to.
    #[builder(setter(into))]
    pub assessment: String,
    /// Field holding the student's email.
    #[builder(setter(into))]
    pub email:      String,
    /// Field holding the score.
    #[builder(setter(into))]
    pub score:      String,
    /// Field(s) holding the student's name.
    pub name:       NameFields,
    /// Range of the score field.
    pub scale:      ScoreScale,
}

impl GradeMapping {
    /// Column layout of the Learn CSV export.
    pub fn learn_csv() -> Self {
        Self {
            assessment: "standard_title".into(),
            email:      "email".into(),
            score:      "score_percentage".into(),
            name:       NameFields::Split {
                first: "first_name".into(),
                last:  "last_name".into(),
            },
            scale:      ScoreScale::Percent,
        }
    }

    /// Key layout of the Learn JSON export.
    pub fn learn_json() -> Self {
        Self {
            assessment: "Standard Title".into(),
            email:      "Email".into(),
            score:      "score".into(),
            name:       NameFields::Full("Full Name".into()),
            scale:      ScoreScale::Fraction,
        }
    }

    /// Every field name the mapping reads.
    fn fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.assessment.as_str(),
            self.email.as_str(),
            self.score.as_str(),
        ];
        fields.extend(self.name.fields());
        fields
    }
}

/// A row of the export that could not be turned into a [`GradeRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    /// 1-based row number, not counting the CSV header.
    pub row:    usize,
    /// Why the row was left out.
    pub reason: String,
}

impl fmt::Display for SkippedRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skipping grade export row {}: {}.", self.row, self.reason)
    }
}

/// Rows read from an export, split into usable records and skipped rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedExport {
    /// Rows that mapped cleanly.
    pub records: Vec<GradeRecord>,
    /// Rows left out, in file order.
    pub skipped: Vec<SkippedRow>,
}

impl FromIterator<(usize, Result<GradeRecord, String>)> for ParsedExport {
    fn from_iter<I: IntoIterator<Item = (usize, Result<GradeRecord, String>)>>(iter: I) -> Self {
        let mut export = ParsedExport::default();
        for (row, result) in iter {
            match result {
                Ok(record) => export.records.push(record),
                Err(reason) => export.skipped.push(SkippedRow { row, reason }),
            }
        }
        export
    }
}

/// Reads and normalizes a grade export.
///
/// Only problems with the file as a whole are errors. Rows that cannot be
/// mapped are logged and left out.
///
/// * `path`: location of the export
/// * `format`: whether the file is CSV or JSON
/// * `mapping`: which columns/keys hold which values
pub async fn load_grades(
    path: &Path,
    format: ExportFormat,
    mapping: &GradeMapping,
) -> Result<Vec<GradeRecord>, InternalError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| InternalError::grades_unavailable(path, e.to_string()))?;

    let parsed = match format {
        ExportFormat::Csv => parse_csv(&text, mapping),
        ExportFormat::Json => parse_json(&text, mapping),
    };
    let export = parsed.map_err(|reason| InternalError::grades_unavailable(path, reason))?;

    for skipped in &export.skipped {
        tracing::warn!("{skipped}");
    }
    tracing::info!(
        "Read {} grade rows from {}",
        export.records.len(),
        path.display()
    );
    Ok(export.records)
}

/// Parses CSV text with a header row.
///
/// Fails only when the header cannot be read or lacks a mapped column.
pub fn parse_csv(text: &str, mapping: &GradeMapping) -> Result<ParsedExport, String> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    let mut columns: HashMap<&str, usize> = HashMap::new();
    for field in mapping.fields() {
        let index = headers
            .iter()
            .position(|header| header == field)
            .ok_or_else(|| format!("missing column \"{field}\""))?;
        columns.insert(field, index);
    }

    Ok(reader
        .records()
        .enumerate()
        .map(|(i, row)| {
            let record = row.map_err(|e| e.to_string()).and_then(|row| {
                let lookup = |field: &str| {
                    columns
                        .get(field)
                        .and_then(|&index| row.get(index))
                        .map(str::to_string)
                };
                build_record(lookup, mapping)
            });
            (i + 1, record)
        })
        .collect())
}

/// Parses a JSON array of objects.
///
/// Fails only when the text is not a JSON array of objects.
pub fn parse_json(text: &str, mapping: &GradeMapping) -> Result<ParsedExport, String> {
    let rows: Vec<serde_json::Map<String, Value>> =
        serde_json::from_str(text).map_err(|e| e.to_string())?;

    Ok(rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let lookup = |field: &str| match row.get(field) {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                Some(Value::Bool(b)) => Some(b.to_string()),
                _ => None,
            };
            (i + 1, build_record(lookup, mapping))
        })
        .collect())
}

/// Turns one export row into a [`GradeRecord`].
///
/// * `lookup`: returns the raw value of a field, if present
/// * `mapping`: which fields to read
fn build_record(
    lookup: impl Fn(&str) -> Option<String>,
    mapping: &GradeMapping,
) -> Result<GradeRecord, String> {
    let value = |field: &str| {
        lookup(field)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let required = |field: &str| value(field).ok_or_else(|| format!("no value for \"{field}\""));

    let student_email = required(&mapping.email)?;
    let assessment_name = required(&mapping.assessment)?;
    let student_name = match &mapping.name {
        NameFields::Full(field) => value(field).unwrap_or_default(),
        NameFields::Split { first, last } => [value(first), value(last)]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" "),
    };

    let score = match value(&mapping.score) {
        None => None,
        Some(raw) => {
            let parsed = raw
                .parse::<f64>()
                .map_err(|_| format!("non-numeric score \"{raw}\""))?;
            let max = mapping.scale.max();
            if !parsed.is_finite() || !(0.0..=max).contains(&parsed) {
                return Err(format!("score {raw} is outside 0 to {max}"));
            }
            Some(parsed / max)
        }
    };

    Ok(GradeRecord {
        student_email,
        student_name,
        assessment_name,
        score,
    })
}
