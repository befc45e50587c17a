//! Similar-durations column parsing into box-plot summaries.

use tracing::debug;

use crate::config::ModelConfig;
use crate::error::{Result, ViewModelError};
use crate::statistics::BoxPlotSummary;
use crate::types::{CellValue, RawColumn, SimilarDurationsColumn};
use crate::utils::{parse_number_token, split_tokens};

/// Summarize one durations cell.
///
/// Blank tokens read as `0`. Other tokens that are not numbers become NaN and
/// are skipped by the order statistics, but still count toward `min_samples`.
/// Cells with fewer tokens than `min_samples` have no summary.
pub fn parse_duration_cell(
    cell: &str,
    delimiter: char,
    min_samples: usize,
    fence: f64,
) -> Option<BoxPlotSummary> {
    let sample: Vec<f64> = split_tokens(cell, delimiter)
        .map(|token| parse_number_token(token).unwrap_or(f64::NAN))
        .collect();

    if sample.len() < min_samples {
        return None;
    }
    Some(BoxPlotSummary::from_sample(&sample, fence))
}

/// Parse the similar-durations column.
///
/// Null cells have no summary; any other non-string cell fails the parse.
pub(crate) fn parse_durations_column(
    column: &RawColumn,
    row_count: usize,
    config: &ModelConfig,
) -> Result<SimilarDurationsColumn> {
    let values = (0..row_count)
        .map(|i| match column.cell(i) {
            CellValue::Null => Ok(None),
            CellValue::Text(cell) => Ok(parse_duration_cell(
                cell,
                config.list_delimiter,
                config.min_box_plot_samples,
                config.outlier_fence,
            )),
            other => Err(ViewModelError::InvalidDurationsValue {
                column: column.display_name.clone(),
                value: other.to_json(),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(
        "Durations column '{}': {} of {} rows summarized",
        column.display_name,
        values.iter().filter(|v| v.is_some()).count(),
        row_count
    );

    Ok(SimilarDurationsColumn {
        name: column.display_name.clone(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Role, TypeFlags};

    fn durations(values: Vec<CellValue>) -> RawColumn {
        RawColumn::new("t.dur", "Durations", TypeFlags::text(), values)
            .with_role(Role::SimilarDurations)
    }

    #[test]
    fn test_four_tokens_is_below_threshold() {
        assert_eq!(parse_duration_cell("1;2;3;4", ';', 5, 1.5), None);
    }

    #[test]
    fn test_five_tokens_with_outlier() {
        let summary = parse_duration_cell("1;2;3;4;100", ';', 5, 1.5).unwrap();
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 100.0);
        assert_eq!(summary.outliers, vec![100.0]);
    }

    #[test]
    fn test_non_numeric_tokens_count_toward_threshold() {
        let summary = parse_duration_cell("1;2;x;4;5", ';', 5, 1.5).unwrap();
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 5.0);
        assert_eq!(summary.median, 3.0);
    }

    #[test]
    fn test_trailing_delimiter_adds_zero_sample() {
        let summary = parse_duration_cell("1;2;3;4;", ';', 5, 1.5).unwrap();
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.q1, 1.0);
        assert_eq!(summary.median, 2.0);
        assert_eq!(summary.q3, 3.0);
        assert_eq!(summary.max, 4.0);
        assert!(summary.outliers.is_empty());
    }

    #[test]
    fn test_all_text_tokens_give_nan_fields() {
        let summary = parse_duration_cell("a;b;c;d;e", ';', 5, 1.5).unwrap();
        assert!(summary.median.is_nan());
        assert!(summary.outliers.is_empty());
    }

    #[test]
    fn test_column_nulls_and_short_cells() {
        let column = durations(vec![CellValue::Null, "1;2".into(), "5;4;3;2;1".into()]);
        let parsed = parse_durations_column(&column, 3, &ModelConfig::default()).unwrap();
        assert_eq!(parsed.values.len(), 3);
        assert!(parsed.values[0].is_none());
        assert!(parsed.values[1].is_none());
        assert_eq!(parsed.values[2].as_ref().map(|s| s.median), Some(3.0));
    }

    #[test]
    fn test_column_threshold_from_config() {
        let column = durations(vec!["1;2;3".into()]);
        let config = ModelConfig::builder().min_box_plot_samples(3).build().unwrap();
        let parsed = parse_durations_column(&column, 1, &config).unwrap();
        assert!(parsed.values[0].is_some());
    }

    #[test]
    fn test_numeric_cell_fails() {
        let column = durations(vec![12.0.into()]);
        let err = parse_durations_column(&column, 1, &ModelConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_DURATIONS_VALUE");
    }
}
