//! Event column parsing: date strings to epoch-millisecond timestamps.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::classifier::describe_flags;
use crate::error::{Result, ViewModelError};
use crate::model::GlobalSettingsBuilder;
use crate::types::{CellValue, EventColumn, RawColumn, Role};

/// Date-time layouts without an offset; read as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m-%d-%Y %H:%M:%S",
];

/// Date-only layouts; read as UTC midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%m-%d-%Y"];

/// Parse a date string into epoch milliseconds.
///
/// Accepts RFC 3339, RFC 2822 and the common naive layouts above. Returns
/// `None` for anything else.
pub fn parse_timestamp_millis(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.timestamp_millis());
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|dt| dt.and_utc().timestamp_millis())
}

/// Reject an event column whose declared type is not date.
pub(crate) fn ensure_date_column(column: &RawColumn) -> Result<()> {
    if column.types.date_time {
        return Ok(());
    }
    Err(ViewModelError::EventColumnNotDate {
        column: column.display_name.clone(),
        types: describe_flags(&column.types),
    })
}

fn timestamp_of(cell: &CellValue) -> Option<i64> {
    cell.as_str().and_then(parse_timestamp_millis)
}

/// Parse all event columns and record the event settings.
///
/// Every column is type checked before any cell is read. The result is
/// ordered by each column's event role index; columns without an index go
/// last and ties keep their input order. The first input column becomes the
/// default sort event and the ordered names become the display list.
pub(crate) fn parse_event_columns(
    columns: &[&RawColumn],
    row_count: usize,
    settings: &mut GlobalSettingsBuilder,
) -> Result<Vec<EventColumn>> {
    for column in columns {
        ensure_date_column(column)?;
    }

    if let Some(first) = columns.first() {
        settings.set_sort_event(first.display_name.clone());
    }

    let mut parsed: Vec<(Option<usize>, EventColumn)> = columns
        .iter()
        .map(|column| {
            let values: Vec<Option<i64>> =
                (0..row_count).map(|i| timestamp_of(column.cell(i))).collect();
            let invalid = values.iter().filter(|v| v.is_none()).count();
            if invalid > 0 {
                debug!(
                    "Event column '{}': {} of {} cells are not valid dates",
                    column.display_name, invalid, row_count
                );
            }
            (
                column.role_index(Role::Event),
                EventColumn {
                    name: column.display_name.clone(),
                    values,
                },
            )
        })
        .collect();

    parsed.sort_by_key(|(index, _)| index.unwrap_or(usize::MAX));

    let event_columns: Vec<EventColumn> = parsed.into_iter().map(|(_, column)| column).collect();
    settings.set_display_event_list(event_columns.iter().map(|c| c.name.clone()).collect());

    Ok(event_columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeFlags;

    fn event(name: &str, index: usize, values: Vec<CellValue>) -> RawColumn {
        RawColumn::new(format!("t.{name}"), name, TypeFlags::date_time(), values)
            .with_role_at(Role::Event, index)
    }

    // ==================== parse_timestamp_millis tests ====================

    #[test]
    fn test_parse_date_only_is_utc_midnight() {
        assert_eq!(parse_timestamp_millis("1970-01-02"), Some(86_400_000));
        assert_eq!(parse_timestamp_millis("1970/01/02"), Some(86_400_000));
    }

    #[test]
    fn test_parse_month_first_dates() {
        assert_eq!(parse_timestamp_millis("01/02/2024"), Some(1_704_153_600_000));
        assert_eq!(parse_timestamp_millis("01-02-2024"), Some(1_704_153_600_000));
        assert_eq!(parse_timestamp_millis("1-2-2024"), Some(1_704_153_600_000));
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        assert_eq!(parse_timestamp_millis("1970-01-01T01:00:00+01:00"), Some(0));
        assert_eq!(parse_timestamp_millis("1970-01-01T00:00:01.500Z"), Some(1_500));
    }

    #[test]
    fn test_parse_naive_datetime() {
        assert_eq!(parse_timestamp_millis("1970-01-01 00:01:00"), Some(60_000));
        assert_eq!(parse_timestamp_millis("1970-01-01T00:00:02"), Some(2_000));
    }

    #[test]
    fn test_parse_invalid_date_is_none() {
        assert_eq!(parse_timestamp_millis("not a date"), None);
        assert_eq!(parse_timestamp_millis(""), None);
        assert_eq!(parse_timestamp_millis("2024-13-45"), None);
    }

    // ==================== parse_event_columns tests ====================

    #[test]
    fn test_invalid_cells_become_none() {
        let column = event(
            "Admission",
            0,
            vec!["1970-01-02".into(), "garbage".into(), CellValue::Null, 5.0.into()],
        );
        let mut settings = GlobalSettingsBuilder::new("#ffff33");

        let parsed = parse_event_columns(&[&column], 4, &mut settings).unwrap();
        assert_eq!(parsed[0].values, vec![Some(86_400_000), None, None, None]);
    }

    #[test]
    fn test_non_date_column_fails_with_flag_listing() {
        let column = RawColumn::new(
            "t.x",
            "Admission",
            TypeFlags {
                numeric: true,
                text: true,
                ..TypeFlags::default()
            },
            vec!["2024-01-01".into()],
        )
        .with_role_at(Role::Event, 0);
        let mut settings = GlobalSettingsBuilder::new("#ffff33");

        let err = parse_event_columns(&[&column], 1, &mut settings).unwrap_err();
        match err {
            ViewModelError::EventColumnNotDate { column, types } => {
                assert_eq!(column, "Admission");
                assert_eq!(types, "numeric, text");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_columns_sorted_by_role_index() {
        let second = event("Discharge", 1, vec![]);
        let first = event("Admission", 0, vec![]);
        let mut settings = GlobalSettingsBuilder::new("#ffff33");

        let parsed = parse_event_columns(&[&second, &first], 0, &mut settings).unwrap();
        let names: Vec<&str> = parsed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Admission", "Discharge"]);

        let settings = settings.build();
        // Sort event is the first declared column, before ordering.
        assert_eq!(settings.event_settings.sort_event.as_deref(), Some("Discharge"));
        assert_eq!(
            settings.event_settings.display_event_list,
            vec!["Admission".to_string(), "Discharge".to_string()]
        );
    }

    #[test]
    fn test_equal_indices_keep_input_order() {
        let a = event("A", 0, vec![]);
        let b = event("B", 0, vec![]);
        let unindexed = RawColumn::new("t.c", "C", TypeFlags::date_time(), vec![])
            .with_role(Role::Event);
        let mut settings = GlobalSettingsBuilder::new("#ffff33");

        let parsed = parse_event_columns(&[&unindexed, &b, &a], 0, &mut settings).unwrap();
        let names: Vec<&str> = parsed.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_no_event_columns_leaves_settings_empty() {
        let mut settings = GlobalSettingsBuilder::new("#ffff33");
        let parsed = parse_event_columns(&[], 3, &mut settings).unwrap();
        assert!(parsed.is_empty());
        assert_eq!(settings.build().event_settings.sort_event, None);
    }
}
