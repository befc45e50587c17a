//! Identifier column pass-through.

use tracing::warn;

use crate::classifier::{describe_flags, is_identifier_type};
use crate::types::{IdColumn, RawColumn};

/// Take the identifier column if it is numeric or text typed.
///
/// Any other declared type means "no identifier configured".
pub(crate) fn parse_identifier_column(column: &RawColumn, row_count: usize) -> Option<IdColumn> {
    if !is_identifier_type(&column.types) {
        warn!(
            "Identifier column '{}' has type [{}]; ignoring it",
            column.display_name,
            describe_flags(&column.types)
        );
        return None;
    }

    Some(IdColumn {
        name: column.display_name.clone(),
        values: (0..row_count).map(|i| column.cell(i).clone()).collect(),
    })
}
