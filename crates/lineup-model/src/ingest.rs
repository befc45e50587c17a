//! Dataset ingestion from polars frames.
//!
//! The view model consumes a role-tagged [`Dataset`]. This module builds one
//! from a `DataFrame` and a [`RoleAssignment`] that names which frame
//! columns carry which role. Type flags come from the polars dtype; string
//! columns that mostly hold date-looking values are flagged as dates.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, ResultExt, ViewModelError};
use crate::types::{CellValue, Dataset, DatasetMetadata, RawColumn, Role, TypeFlags};
use crate::utils::{DtypeCategory, get_dtype_category};

/// Number of leading non-empty values checked for date-looking strings.
const DATE_SAMPLE_SIZE: usize = 10;
/// Share of sampled values that must look like dates.
const DATE_MATCH_RATIO: f64 = 0.7;

// Date pattern regexes - compiled once. Every layout matched here must be
// readable by `parse_timestamp_millis`.
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}(-\d{1,2}-\d{1,2}|/\d{1,2}/\d{1,2})$")
            .expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}(-\d{1,2}-|/\d{1,2}/)\d{4}$").expect("Invalid regex: MM-DD-YYYY"),
        Regex::new(r"^\d{4}-\d{2}-\d{2} \d{2}:\d{2}(:\d{2}(\.\d+)?)?$")
            .expect("Invalid regex: datetime"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?)?$")
            .expect("Invalid regex: ISO"),
    ]
});

/// Which frame columns carry which role.
///
/// A column may be named under several roles. Event columns are ordered by
/// their position in `events`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoleAssignment {
    pub data: Vec<String>,
    pub events: Vec<String>,
    pub identifier: Option<String>,
    pub similar_ids: Option<String>,
    pub similar_durations: Option<String>,
    /// Host metadata passed through to the dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DatasetMetadata>,
}

impl RoleAssignment {
    /// Load a role assignment from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ViewModelError::from(e).with_context(path.display().to_string()))?;
        serde_json::from_str(&content)
            .map_err(ViewModelError::from)
            .context(format!("Invalid role assignment in {}", path.display()))
    }

    /// Every column name mentioned under any role.
    fn named_columns(&self) -> impl Iterator<Item = &String> {
        self.data
            .iter()
            .chain(&self.events)
            .chain(&self.identifier)
            .chain(&self.similar_ids)
            .chain(&self.similar_durations)
    }

    /// Roles of one column, with the event index where applicable.
    fn roles_of(&self, name: &str) -> Vec<(Role, Option<usize>)> {
        let is = |slot: &Option<String>| slot.as_deref() == Some(name);
        let mut roles = Vec::new();
        if self.data.iter().any(|c| c == name) {
            roles.push((Role::Data, None));
        }
        if let Some(index) = self.events.iter().position(|c| c == name) {
            roles.push((Role::Event, Some(index)));
        }
        if is(&self.identifier) {
            roles.push((Role::Identifier, None));
        }
        if is(&self.similar_ids) {
            roles.push((Role::SimilarIds, None));
        }
        if is(&self.similar_durations) {
            roles.push((Role::SimilarDurations, None));
        }
        roles
    }
}

/// Read a CSV file with a header row.
pub fn read_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ViewModelError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path.display()),
        )));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(1000))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .and_then(|reader| reader.finish())
        .context(format!("Failed to read {}", path.display()))?;

    info!(
        "Loaded {} rows x {} columns from {}",
        df.height(),
        df.width(),
        path.display()
    );
    Ok(df)
}

/// Build a dataset from the columns of `df` named in `roles`.
///
/// Columns keep frame order; unassigned columns are skipped.
pub fn dataset_from_frame(df: &DataFrame, roles: &RoleAssignment) -> Result<Dataset> {
    if let Some(missing) = roles
        .named_columns()
        .find(|name| df.column(name.as_str()).is_err())
    {
        return Err(ViewModelError::ColumnNotFound(missing.clone()));
    }

    let mut columns = Vec::new();
    for column in df.get_columns() {
        let name = column.name().as_str();
        let assigned = roles.roles_of(name);
        if assigned.is_empty() {
            debug!("Skipping unassigned column '{}'", name);
            continue;
        }

        let series = column.as_materialized_series();
        let (types, values) = read_series(series)?;
        let mut raw = RawColumn::new(name, name, types, values);
        for (role, index) in assigned {
            raw = match index {
                Some(index) => raw.with_role_at(role, index),
                None => raw.with_role(role),
            };
        }
        columns.push(raw);
    }

    let dataset = Dataset::new(columns);
    Ok(match &roles.metadata {
        Some(metadata) => dataset.with_metadata(metadata.clone()),
        None => dataset,
    })
}

/// Type flags and cell values of one series.
fn read_series(series: &Series) -> Result<(TypeFlags, Vec<CellValue>)> {
    match get_dtype_category(series.dtype()) {
        DtypeCategory::Numeric => {
            let cast = series.cast(&DataType::Float64)?;
            let values = cast.f64()?.into_iter().map(CellValue::from).collect();
            Ok((TypeFlags::numeric(), values))
        }
        DtypeCategory::Boolean => {
            let values = series.bool()?.into_iter().map(CellValue::from).collect();
            Ok((TypeFlags::boolean(), values))
        }
        DtypeCategory::String => {
            let values = stringify(series)?;
            let types = if looks_like_dates(&values) {
                TypeFlags::date_time()
            } else {
                TypeFlags::text()
            };
            Ok((types, values))
        }
        DtypeCategory::Datetime => Ok((TypeFlags::date_time(), stringify(series)?)),
        DtypeCategory::Other => {
            debug!(
                "Column '{}' has unsupported dtype {}",
                series.name(),
                series.dtype()
            );
            Ok((TypeFlags::default(), stringify(series)?))
        }
    }
}

fn stringify(series: &Series) -> Result<Vec<CellValue>> {
    let cast = series.cast(&DataType::String)?;
    Ok(cast.str()?.into_iter().map(CellValue::from).collect())
}

/// More than 70% of the leading non-empty values match a date pattern.
fn looks_like_dates(values: &[CellValue]) -> bool {
    let samples: Vec<&str> = values
        .iter()
        .filter_map(CellValue::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(DATE_SAMPLE_SIZE)
        .collect();

    if samples.is_empty() {
        return false;
    }

    let matched = samples
        .iter()
        .filter(|s| DATE_PATTERNS.iter().any(|p| p.is_match(**s)))
        .count();
    (matched as f64 / samples.len() as f64) > DATE_MATCH_RATIO
}
