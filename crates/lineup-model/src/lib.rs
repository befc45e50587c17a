//! View-model layer for ranked-list visualizations.
//!
//! Turns a columnar dataset whose columns are tagged by role into a
//! row-oriented model: one flat record per input row, with event timestamps
//! and box-plot summaries of embedded duration samples nested under a
//! reserved `Events` field.
//!
//! # Overview
//!
//! - **Classification**: columns are deduplicated and partitioned by role
//!   (data, event, identifier, similar IDs, similar durations)
//! - **Parsing**: event dates become epoch milliseconds, delimited ID lists
//!   become numeric-or-text tokens, delimited duration samples become
//!   quartiles and outliers
//! - **Assembly**: every row joins its data fields with its nested events
//! - **Ingestion**: datasets can be built from polars frames or CSV files
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use lineup_model::{ModelConfig, RoleAssignment, ViewModel, dataset_from_frame, read_csv};
//!
//! let df = read_csv("patients.csv")?;
//! let roles = RoleAssignment::from_json_file("roles.json")?;
//! let dataset = dataset_from_frame(&df, &roles)?;
//!
//! let model = ViewModel::from_dataset(&dataset, ModelConfig::default())?;
//! println!("{}", serde_json::to_string_pretty(&model)?);
//! ```
//!
//! # Configuration
//!
//! ```rust,ignore
//! let config = ModelConfig::builder()
//!     .list_delimiter('|')
//!     .min_box_plot_samples(3)
//!     .outlier_fence(3.0)
//!     .strict_row_lengths(false)
//!     .build()?;
//! ```
//!
//! # Errors
//!
//! Every failure is a [`ViewModelError`] with a stable code and a structured
//! context map. After a failed [`ViewModel::parse_dataset`] the model reports
//! `is_parsing_error() == true` and its contents must not be read.

pub mod classifier;
pub mod config;
pub mod error;
pub mod ingest;
pub mod mapping;
pub mod model;
pub mod parsers;
pub mod statistics;
pub mod types;
pub mod utils;

// Re-export main types for convenience
pub use classifier::{ClassifiedColumns, ColumnClassifier};
pub use config::{ConfigValidationError, ModelConfig, ModelConfigBuilder};
pub use error::{Result, ResultExt, ViewModelError};
pub use ingest::{RoleAssignment, dataset_from_frame, read_csv};
pub use mapping::{
    ColumnDescriptor, ColumnKind, CustomMapping, describe_columns, parse_custom_mappings,
};
pub use model::{
    DataRow, EVENTS_KEY, EventValue, GlobalSettings, GlobalSettingsBuilder, ViewModel,
};
pub use statistics::{BoxPlotKey, BoxPlotSummary, quantile};
pub use types::{
    CellValue, DataColumn, Dataset, DatasetMetadata, EventColumn, IdColumn, IdToken, RawColumn,
    Role, ScalarType, SimilarDurationsColumn, SimilarIdsColumn, TypeFlags,
};
