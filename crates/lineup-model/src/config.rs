//! Configuration types for the view-model layer.
//!
//! This module provides configuration options using the builder pattern
//! for flexible and ergonomic model setup.

use serde::{Deserialize, Serialize};

use crate::statistics::DEFAULT_OUTLIER_FENCE;

/// Default name of the metadata group that carries the lineup settings.
pub const DEFAULT_SETTINGS_GROUP: &str = "lineupSettings";

/// Default fill color for box plots.
pub const DEFAULT_BOX_PLOT_COLOR: &str = "#ffff33";

/// Configuration for parsing a dataset into a [`crate::ViewModel`].
///
/// Use [`ModelConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use lineup_model::config::ModelConfig;
///
/// let config = ModelConfig::builder()
///     .min_box_plot_samples(7)
///     .outlier_fence(3.0)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Separator between tokens of the similar-IDs and durations lists.
    /// Default: ';'
    pub list_delimiter: char,

    /// Minimum number of duration tokens needed to compute a box plot.
    /// Rows with fewer tokens get no summary.
    /// Default: 5
    pub min_box_plot_samples: usize,

    /// IQR multiplier for the outlier fences.
    /// Default: 1.5
    pub outlier_fence: f64,

    /// Whether every column must have exactly the row count of the first one.
    /// When false, missing trailing cells read as null.
    /// Default: true
    pub strict_row_lengths: bool,

    /// Metadata group name holding `showSidePanel` and `overviewMode`.
    /// Default: "lineupSettings"
    pub settings_group: String,

    /// Box plot color copied into the global settings (`#rrggbb`).
    /// Default: "#ffff33"
    pub box_plot_color: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            list_delimiter: ';',
            min_box_plot_samples: 5,
            outlier_fence: DEFAULT_OUTLIER_FENCE,
            strict_row_lengths: true,
            settings_group: DEFAULT_SETTINGS_GROUP.to_string(),
            box_plot_color: DEFAULT_BOX_PLOT_COLOR.to_string(),
        }
    }
}

impl ModelConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.list_delimiter.is_whitespace() {
            return Err(ConfigValidationError::InvalidDelimiter(self.list_delimiter));
        }

        if self.min_box_plot_samples == 0 {
            return Err(ConfigValidationError::InvalidSampleSize(
                self.min_box_plot_samples,
            ));
        }

        if !self.outlier_fence.is_finite() || self.outlier_fence < 0.0 {
            return Err(ConfigValidationError::InvalidOutlierFence(
                self.outlier_fence,
            ));
        }

        if self.settings_group.trim().is_empty() {
            return Err(ConfigValidationError::EmptySettingsGroup);
        }

        if !is_hex_color(&self.box_plot_color) {
            return Err(ConfigValidationError::InvalidColor(
                self.box_plot_color.clone(),
            ));
        }

        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid list delimiter {0:?} (must not be whitespace)")]
    InvalidDelimiter(char),

    #[error("Invalid box plot sample size: {0} (must be at least 1)")]
    InvalidSampleSize(usize),

    #[error("Invalid outlier fence: {0} (must be finite and non-negative)")]
    InvalidOutlierFence(f64),

    #[error("Settings group name must not be empty")]
    EmptySettingsGroup,

    #[error("Invalid box plot color '{0}' (expected #rrggbb)")]
    InvalidColor(String),
}

impl From<ConfigValidationError> for crate::error::ViewModelError {
    fn from(error: ConfigValidationError) -> Self {
        crate::error::ViewModelError::InvalidConfig(error.to_string())
    }
}

/// Builder for [`ModelConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ModelConfigBuilder {
    list_delimiter: Option<char>,
    min_box_plot_samples: Option<usize>,
    outlier_fence: Option<f64>,
    strict_row_lengths: Option<bool>,
    settings_group: Option<String>,
    box_plot_color: Option<String>,
}

impl ModelConfigBuilder {
    /// Set the separator between list tokens.
    pub fn list_delimiter(mut self, delimiter: char) -> Self {
        self.list_delimiter = Some(delimiter);
        self
    }

    /// Set the minimum token count for a box plot summary.
    pub fn min_box_plot_samples(mut self, samples: usize) -> Self {
        self.min_box_plot_samples = Some(samples);
        self
    }

    /// Set the IQR multiplier used for outlier detection.
    pub fn outlier_fence(mut self, fence: f64) -> Self {
        self.outlier_fence = Some(fence);
        self
    }

    /// Require all columns to share the first column's length.
    pub fn strict_row_lengths(mut self, strict: bool) -> Self {
        self.strict_row_lengths = Some(strict);
        self
    }

    /// Set the metadata group name that holds the lineup settings.
    pub fn settings_group(mut self, group: impl Into<String>) -> Self {
        self.settings_group = Some(group.into());
        self
    }

    /// Set the box plot color.
    pub fn box_plot_color(mut self, color: impl Into<String>) -> Self {
        self.box_plot_color = Some(color.into());
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `ModelConfig` or an error if validation fails.
    pub fn build(self) -> Result<ModelConfig, ConfigValidationError> {
        let config = ModelConfig {
            list_delimiter: self.list_delimiter.unwrap_or(';'),
            min_box_plot_samples: self.min_box_plot_samples.unwrap_or(5),
            outlier_fence: self.outlier_fence.unwrap_or(DEFAULT_OUTLIER_FENCE),
            strict_row_lengths: self.strict_row_lengths.unwrap_or(true),
            settings_group: self
                .settings_group
                .unwrap_or_else(|| DEFAULT_SETTINGS_GROUP.to_string()),
            box_plot_color: self
                .box_plot_color
                .unwrap_or_else(|| DEFAULT_BOX_PLOT_COLOR.to_string()),
        };

        config.validate()?;
        Ok(config)
    }
}
