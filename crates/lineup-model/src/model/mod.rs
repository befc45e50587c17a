//! The view model: one parse of a dataset into rows plus column metadata.
//!
//! A parse runs the stages in a fixed order:
//! 1. Classify columns by role and fix the row count
//! 2. Build the data columns with resolved scalar types
//! 3. Parse events, similar durations, similar IDs and the identifier
//! 4. Assemble one record per row
//!
//! The model is rebuilt from scratch on every parse. `is_parsing_error`
//! is set at entry and only cleared once every stage has succeeded, so a
//! model left behind by a failed parse must not be read.

mod assembler;
mod settings;

pub use assembler::{DataRow, EVENTS_KEY, EventValue};
pub use settings::{
    ColorSettings, EventSettings, GlobalSettings, GlobalSettingsBuilder, LineupSettings,
};

use serde::Serialize;
use tracing::info;

use crate::classifier::{ColumnClassifier, build_data_columns};
use crate::config::ModelConfig;
use crate::error::Result;
use crate::mapping::{ColumnDescriptor, CustomMapping, describe_columns};
use crate::parsers::{
    parse_durations_column, parse_event_columns, parse_identifier_column,
    parse_similar_ids_column,
};
use crate::types::{
    DataColumn, Dataset, EventColumn, IdColumn, SimilarDurationsColumn, SimilarIdsColumn,
};

/// Row-oriented model of one dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewModel {
    column_data: Vec<DataColumn>,
    event_columns: Vec<EventColumn>,
    similar_data_duration_column: Option<SimilarDurationsColumn>,
    #[serde(rename = "similarDataIDsColumn")]
    similar_data_ids_column: Option<SimilarIdsColumn>,
    id_column: Option<IdColumn>,
    #[serde(rename = "rowcount")]
    row_count: usize,
    col_count: usize,
    data_rows: Vec<DataRow>,
    global_settings: GlobalSettings,
    is_parsing_error: bool,
    #[serde(skip)]
    config: ModelConfig,
}

static_assertions::assert_impl_all!(ViewModel: Send, Sync);

impl Default for ViewModel {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

impl ViewModel {
    /// Create an empty model. It reports a parsing error until the first
    /// successful [`ViewModel::parse_dataset`].
    pub fn new(config: ModelConfig) -> Self {
        let global_settings = GlobalSettingsBuilder::new(config.box_plot_color.clone()).build();
        Self {
            column_data: Vec::new(),
            event_columns: Vec::new(),
            similar_data_duration_column: None,
            similar_data_ids_column: None,
            id_column: None,
            row_count: 0,
            col_count: 0,
            data_rows: Vec::new(),
            global_settings,
            is_parsing_error: true,
            config,
        }
    }

    /// Parse `dataset` into a fresh model.
    pub fn from_dataset(dataset: &Dataset, config: ModelConfig) -> Result<Self> {
        let mut model = Self::new(config);
        model.parse_dataset(dataset)?;
        Ok(model)
    }

    /// Rebuild the model from `dataset`, discarding the previous state.
    ///
    /// On error the model keeps whatever the failed stage left behind and
    /// `is_parsing_error()` stays true.
    pub fn parse_dataset(&mut self, dataset: &Dataset) -> Result<&Self> {
        *self = Self::new(self.config.clone());
        self.config.validate()?;

        let mut settings = GlobalSettingsBuilder::new(self.config.box_plot_color.clone());
        if let Some(metadata) = &dataset.metadata {
            settings = settings.lineup_from_metadata(metadata, &self.config.settings_group);
        }

        let classified = ColumnClassifier::classify(&dataset.columns);
        self.row_count = classified.row_count();
        self.col_count = classified.columns.len();
        if self.config.strict_row_lengths {
            classified.validate_lengths()?;
        }

        info!(
            "Parsing dataset: {} rows, {} columns",
            self.row_count, self.col_count
        );

        self.column_data = build_data_columns(&classified.data, self.row_count);
        self.event_columns =
            parse_event_columns(&classified.events, self.row_count, &mut settings)?;

        if let Some(column) = classified.similar_durations {
            self.similar_data_duration_column =
                Some(parse_durations_column(column, self.row_count, &self.config)?);
        }
        if let Some(column) = classified.similar_ids {
            self.similar_data_ids_column = Some(parse_similar_ids_column(
                column,
                self.row_count,
                self.config.list_delimiter,
            )?);
        }
        if let Some(column) = classified.identifier {
            self.id_column = parse_identifier_column(column, self.row_count);
        }

        self.data_rows = assembler::assemble_rows(
            self.row_count,
            &self.column_data,
            &self.event_columns,
            self.similar_data_duration_column.as_ref(),
        );
        self.global_settings = settings.build();
        self.is_parsing_error = false;

        info!(
            "Built {} rows ({} data columns, {} event columns)",
            self.data_rows.len(),
            self.column_data.len(),
            self.event_columns.len()
        );
        Ok(self)
    }

    /// Presentation-neutral descriptors of the data columns.
    pub fn column_descriptors(&self, mappings: &[CustomMapping]) -> Result<Vec<ColumnDescriptor>> {
        describe_columns(&self.column_data, mappings)
    }

    /// Whether rows carry box-plot fields from a durations column.
    pub fn has_box_plots(&self) -> bool {
        self.similar_data_duration_column.is_some()
    }

    pub fn column_data(&self) -> &[DataColumn] {
        &self.column_data
    }

    pub fn event_columns(&self) -> &[EventColumn] {
        &self.event_columns
    }

    pub fn similar_data_duration_column(&self) -> Option<&SimilarDurationsColumn> {
        self.similar_data_duration_column.as_ref()
    }

    pub fn similar_data_ids_column(&self) -> Option<&SimilarIdsColumn> {
        self.similar_data_ids_column.as_ref()
    }

    pub fn id_column(&self) -> Option<&IdColumn> {
        self.id_column.as_ref()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Number of distinct columns after deduplication.
    pub fn col_count(&self) -> usize {
        self.col_count
    }

    pub fn data_rows(&self) -> &[DataRow] {
        &self.data_rows
    }

    pub fn global_settings(&self) -> &GlobalSettings {
        &self.global_settings
    }

    pub fn is_parsing_error(&self) -> bool {
        self.is_parsing_error
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewModelError;
    use crate::types::{CellValue, RawColumn, Role, ScalarType, TypeFlags};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn data(name: &str, types: TypeFlags, values: Vec<CellValue>) -> RawColumn {
        RawColumn::new(format!("t.{name}"), name, types, values).with_role(Role::Data)
    }

    fn sample_dataset() -> Dataset {
        Dataset::new(vec![
            data("Name", TypeFlags::text(), vec!["a".into(), "b".into()]),
            data("Score", TypeFlags::numeric(), vec![1.0.into(), 2.0.into()]),
            RawColumn::new(
                "t.Admission",
                "Admission",
                TypeFlags::date_time(),
                vec!["1970-01-01".into(), "bad".into()],
            )
            .with_role_at(Role::Event, 0),
            RawColumn::new(
                "t.Durations",
                "Durations",
                TypeFlags::text(),
                vec!["1;2;3;4;100".into(), CellValue::Null],
            )
            .with_role(Role::SimilarDurations),
            RawColumn::new(
                "t.Similar",
                "Similar",
                TypeFlags::text(),
                vec!["A;2".into(), CellValue::Null],
            )
            .with_role(Role::SimilarIds),
            RawColumn::new("t.ID", "ID", TypeFlags::numeric(), vec![10.0.into(), 11.0.into()])
                .with_role(Role::Identifier),
        ])
    }

    // ==================== parse_dataset tests ====================

    #[test]
    fn test_new_model_reports_error() {
        let model = ViewModel::default();
        assert!(model.is_parsing_error());
        assert_eq!(model.row_count(), 0);
    }

    #[test]
    fn test_full_parse() {
        let model = ViewModel::from_dataset(&sample_dataset(), ModelConfig::default()).unwrap();

        assert!(!model.is_parsing_error());
        assert_eq!(model.row_count(), 2);
        assert_eq!(model.col_count(), 6);
        assert_eq!(model.data_rows().len(), 2);
        assert_eq!(model.column_data().len(), 2);
        assert_eq!(model.column_data()[1].column_type, ScalarType::Numeric);
        assert!(model.has_box_plots());
        assert_eq!(model.id_column().map(|c| c.values.len()), Some(2));

        assert_eq!(
            serde_json::to_value(&model.data_rows()[0]).unwrap(),
            json!({
                "Name": "a",
                "Score": 1,
                "Events": {
                    "Admission": 0,
                    "min": 1,
                    "q1": 2,
                    "median": 3,
                    "q3": 4,
                    "max": 100
                }
            })
        );
        assert_eq!(
            serde_json::to_value(&model.data_rows()[1]).unwrap(),
            json!({"Name": "b", "Score": 2, "Events": {"Admission": null}})
        );

        let settings = model.global_settings();
        assert_eq!(settings.event_settings.sort_event.as_deref(), Some("Admission"));
        assert_eq!(settings.color_settings.box_plot_color, "#ffff33");
    }

    #[test]
    fn test_serialized_top_level_keys() {
        let model = ViewModel::from_dataset(&sample_dataset(), ModelConfig::default()).unwrap();
        let value = serde_json::to_value(&model).unwrap();
        let object = value.as_object().unwrap();

        for key in [
            "columnData",
            "eventColumns",
            "similarDataDurationColumn",
            "similarDataIDsColumn",
            "idColumn",
            "rowcount",
            "colCount",
            "dataRows",
            "globalSettings",
            "isParsingError",
        ] {
            assert!(object.contains_key(key), "missing key {key}");
        }
        assert!(!object.contains_key("config"));
        assert_eq!(object["isParsingError"], json!(false));
    }

    #[test]
    fn test_failed_parse_keeps_error_flag() {
        let mut model = ViewModel::default();
        model.parse_dataset(&sample_dataset()).unwrap();
        assert!(!model.is_parsing_error());

        let bad = Dataset::new(vec![
            RawColumn::new("t.e", "Visit", TypeFlags::numeric(), vec![1.0.into()])
                .with_role(Role::Event),
        ]);
        let err = model.parse_dataset(&bad).unwrap_err();
        assert!(matches!(err, ViewModelError::EventColumnNotDate { .. }));
        assert!(model.is_parsing_error());
        assert!(model.data_rows().is_empty());
    }

    #[test]
    fn test_length_mismatch_strict_and_lenient() {
        let dataset = Dataset::new(vec![
            data("A", TypeFlags::text(), vec!["x".into(), "y".into()]),
            data("B", TypeFlags::numeric(), vec![1.0.into()]),
        ]);

        let err = ViewModel::from_dataset(&dataset, ModelConfig::default()).unwrap_err();
        assert_eq!(err.error_code(), "COLUMN_LENGTH_MISMATCH");

        let lenient = ModelConfig::builder().strict_row_lengths(false).build().unwrap();
        let model = ViewModel::from_dataset(&dataset, lenient).unwrap();
        assert_eq!(model.data_rows()[1].get("B"), Some(&CellValue::Null));
    }

    #[test]
    fn test_empty_dataset_parses_to_no_rows() {
        let model = ViewModel::from_dataset(&Dataset::default(), ModelConfig::default()).unwrap();
        assert!(!model.is_parsing_error());
        assert_eq!(model.row_count(), 0);
        assert!(model.data_rows().is_empty());

        let err = model.column_descriptors(&[]).unwrap_err();
        assert_eq!(err.error_code(), "NO_COLUMNS");
    }

    #[test]
    fn test_duplicate_query_names_counted_once() {
        let mut dataset = sample_dataset();
        dataset.columns.push(data("Name", TypeFlags::text(), vec![]));
        let model = ViewModel::from_dataset(&dataset, ModelConfig::default()).unwrap();
        assert_eq!(model.col_count(), 6);
        assert_eq!(model.column_data().len(), 2);
    }

    #[test]
    fn test_invalid_config_is_rejected_at_parse() {
        let config = ModelConfig {
            min_box_plot_samples: 0,
            ..ModelConfig::default()
        };
        let mut model = ViewModel::new(config);
        let err = model.parse_dataset(&sample_dataset()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
        assert!(model.is_parsing_error());
    }
}
