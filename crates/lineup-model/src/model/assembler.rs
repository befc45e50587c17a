//! Row assembly: joins parsed columns by row index into flat records.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::warn;

use crate::statistics::BoxPlotKey;
use crate::types::{CellValue, DataColumn, EventColumn, SimilarDurationsColumn};

/// Reserved row field holding event timestamps and box-plot fields.
pub const EVENTS_KEY: &str = "Events";

/// A value under a row's `Events` map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventValue {
    /// Epoch milliseconds of an event cell; `None` for an invalid date.
    Timestamp(Option<i64>),
    /// One of the five box-plot scalars of the row's durations summary.
    Statistic(#[serde(serialize_with = "crate::types::serialize_number")] f64),
}

/// One output record, in column order.
///
/// Serializes as `{..fields, "Events": {..events}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataRow {
    fields: Vec<(String, CellValue)>,
    events: Vec<(String, EventValue)>,
}

impl DataRow {
    /// Value of a data field by column name.
    pub fn get(&self, name: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Value under the `Events` map by key.
    pub fn event(&self, key: &str) -> Option<&EventValue> {
        self.events.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, CellValue)] {
        &self.fields
    }

    pub fn events(&self) -> &[(String, EventValue)] {
        &self.events
    }

    fn set_field(&mut self, name: &str, value: CellValue) {
        set_entry(&mut self.fields, name, value);
    }

    fn set_event(&mut self, key: &str, value: EventValue) {
        set_entry(&mut self.events, key, value);
    }
}

/// Insert or overwrite in place; a repeated key keeps its first position.
fn set_entry<V>(entries: &mut Vec<(String, V)>, key: &str, value: V) {
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key.to_string(), value)),
    }
}

struct EventsMap<'a>(&'a [(String, EventValue)]);

impl Serialize for EventsMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for DataRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(EVENTS_KEY, &EventsMap(&self.events))?;
        map.end()
    }
}

/// Build one record per row index, preserving input row order.
///
/// Box-plot fields are merged after the event timestamps and only when
/// finite; a key collision keeps the later value.
pub(crate) fn assemble_rows(
    row_count: usize,
    data: &[DataColumn],
    events: &[EventColumn],
    durations: Option<&SimilarDurationsColumn>,
) -> Vec<DataRow> {
    let data: Vec<&DataColumn> = data
        .iter()
        .filter(|column| {
            let reserved = column.name == EVENTS_KEY;
            if reserved {
                warn!(
                    "Data column '{}' collides with the reserved events field; skipping it",
                    column.name
                );
            }
            !reserved
        })
        .collect();

    (0..row_count)
        .map(|i| {
            let mut row = DataRow::default();

            for column in &data {
                let value = column.values.get(i).cloned().unwrap_or_default();
                row.set_field(&column.name, value);
            }

            for column in events {
                let value = column.values.get(i).copied().flatten();
                row.set_event(&column.name, EventValue::Timestamp(value));
            }

            if let Some(summary) = durations.and_then(|d| d.values.get(i)).and_then(Option::as_ref)
            {
                for key in BoxPlotKey::ALL {
                    let value = summary.get(key);
                    if value.is_finite() {
                        row.set_event(key.as_str(), EventValue::Statistic(value));
                    }
                }
            }

            row
        })
        .collect()
}
