//! Column classification.
//!
//! This module turns the ordered raw columns of a dataset into role groups:
//! - Deduplication by query name (first occurrence wins)
//! - One independent filter per role
//! - Singleton slots for identifier, similar-IDs and similar-durations
//! - Scalar type resolution for data columns

mod column_type;

use crate::error::{Result, ViewModelError};
use crate::types::{DataColumn, RawColumn, Role};
use std::collections::HashSet;
use tracing::{debug, warn};

pub(crate) use column_type::{describe_flags, is_identifier_type, resolve_scalar_type};

/// Columns of one dataset partitioned by declared role.
///
/// Groups borrow from the dataset and are not exclusive: a column declaring
/// two roles appears in both groups.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedColumns<'a> {
    /// All deduplicated columns, in input order.
    pub columns: Vec<&'a RawColumn>,
    pub data: Vec<&'a RawColumn>,
    pub events: Vec<&'a RawColumn>,
    pub identifier: Option<&'a RawColumn>,
    pub similar_ids: Option<&'a RawColumn>,
    pub similar_durations: Option<&'a RawColumn>,
}

impl ClassifiedColumns<'_> {
    /// Row count fixed by the first deduplicated column.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Fail if any column's length differs from [`Self::row_count`].
    pub fn validate_lengths(&self) -> Result<()> {
        let expected = self.row_count();
        match self.columns.iter().find(|c| c.values.len() != expected) {
            Some(column) => Err(ViewModelError::ColumnLengthMismatch {
                column: column.display_name.clone(),
                expected,
                actual: column.values.len(),
            }),
            None => Ok(()),
        }
    }
}

/// Classifies raw columns by role.
pub struct ColumnClassifier;

impl ColumnClassifier {
    /// Deduplicate and partition `columns` into role groups.
    pub fn classify(columns: &[RawColumn]) -> ClassifiedColumns<'_> {
        let columns = Self::deduplicate(columns);

        let with_role = |role: Role| {
            columns
                .iter()
                .copied()
                .filter(|c| c.has_role(role))
                .collect::<Vec<_>>()
        };

        let data = with_role(Role::Data);
        let events = with_role(Role::Event);
        let identifier = Self::single(with_role(Role::Identifier), Role::Identifier);
        let similar_ids = Self::single(with_role(Role::SimilarIds), Role::SimilarIds);
        let similar_durations =
            Self::single(with_role(Role::SimilarDurations), Role::SimilarDurations);

        debug!(
            "Classified {} columns: {} data, {} event, identifier: {}, similar ids: {}, durations: {}",
            columns.len(),
            data.len(),
            events.len(),
            identifier.is_some(),
            similar_ids.is_some(),
            similar_durations.is_some()
        );

        ClassifiedColumns {
            columns,
            data,
            events,
            identifier,
            similar_ids,
            similar_durations,
        }
    }

    /// Keep only the first column for every query name.
    ///
    /// Later duplicates are artifacts of the host's column negotiation and
    /// are dropped without error.
    pub fn deduplicate(columns: &[RawColumn]) -> Vec<&RawColumn> {
        let mut seen = HashSet::new();
        columns
            .iter()
            .filter(|column| {
                let first = seen.insert(column.query_name.as_str());
                if !first {
                    debug!("Dropping duplicate column '{}'", column.query_name);
                }
                first
            })
            .collect()
    }

    /// A singleton slot is filled only by exactly one candidate.
    fn single(candidates: Vec<&RawColumn>, role: Role) -> Option<&RawColumn> {
        match candidates.as_slice() {
            [only] => Some(*only),
            [] => None,
            many => {
                warn!(
                    "{} columns declare role '{}'; leaving the slot empty",
                    many.len(),
                    role.as_str()
                );
                None
            }
        }
    }
}

/// Build the data columns with their resolved scalar types.
pub(crate) fn build_data_columns(columns: &[&RawColumn], row_count: usize) -> Vec<DataColumn> {
    columns
        .iter()
        .map(|column| DataColumn {
            name: column.display_name.clone(),
            query_name: column.query_name.clone(),
            column_type: resolve_scalar_type(&column.types),
            values: (0..row_count).map(|i| column.cell(i).clone()).collect(),
        })
        .collect()
}
