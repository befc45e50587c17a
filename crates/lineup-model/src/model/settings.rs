//! Global settings snapshot and the builder that accumulates it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DEFAULT_BOX_PLOT_COLOR;
use crate::types::DatasetMetadata;

const SHOW_SIDE_PANEL: &str = "showSidePanel";
const OVERVIEW_MODE: &str = "overviewMode";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSettings {
    pub box_plot_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSettings {
    /// Default sort key of the event timeline: the first declared event column.
    pub sort_event: Option<String>,
    /// Event column names in display order.
    pub display_event_list: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupSettings {
    pub show_side_panel: bool,
    pub overview_mode: bool,
}

impl Default for LineupSettings {
    fn default() -> Self {
        Self {
            show_side_panel: true,
            overview_mode: false,
        }
    }
}

impl LineupSettings {
    /// Read the settings from `group` of the host metadata.
    ///
    /// Missing groups, missing keys and non-boolean values fall back to the
    /// defaults.
    pub fn from_metadata(metadata: &DatasetMetadata, group: &str) -> Self {
        let defaults = Self::default();
        let Some(objects) = metadata.group(group) else {
            return defaults;
        };

        let flag = |key: &str, default: bool| {
            objects
                .get(key)
                .and_then(Value::as_bool)
                .unwrap_or(default)
        };

        Self {
            show_side_panel: flag(SHOW_SIDE_PANEL, defaults.show_side_panel),
            overview_mode: flag(OVERVIEW_MODE, defaults.overview_mode),
        }
    }
}

/// Immutable settings produced by one parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    pub color_settings: ColorSettings,
    pub event_settings: EventSettings,
    pub lineup_settings: LineupSettings,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        GlobalSettingsBuilder::new(DEFAULT_BOX_PLOT_COLOR).build()
    }
}

/// Accumulates [`GlobalSettings`] across the parsing steps.
#[derive(Debug, Clone)]
pub struct GlobalSettingsBuilder {
    box_plot_color: String,
    sort_event: Option<String>,
    display_event_list: Vec<String>,
    lineup: LineupSettings,
}

impl GlobalSettingsBuilder {
    pub fn new(box_plot_color: impl Into<String>) -> Self {
        Self {
            box_plot_color: box_plot_color.into(),
            sort_event: None,
            display_event_list: Vec::new(),
            lineup: LineupSettings::default(),
        }
    }

    /// Take the lineup settings from the host metadata.
    pub fn lineup_from_metadata(mut self, metadata: &DatasetMetadata, group: &str) -> Self {
        self.lineup = LineupSettings::from_metadata(metadata, group);
        self
    }

    pub fn set_sort_event(&mut self, name: impl Into<String>) {
        self.sort_event = Some(name.into());
    }

    pub fn set_display_event_list(&mut self, names: Vec<String>) {
        self.display_event_list = names;
    }

    pub fn build(self) -> GlobalSettings {
        GlobalSettings {
            color_settings: ColorSettings {
                box_plot_color: self.box_plot_color,
            },
            event_settings: EventSettings {
                sort_event: self.sort_event,
                display_event_list: self.display_event_list,
            },
            lineup_settings: self.lineup,
        }
    }
}
