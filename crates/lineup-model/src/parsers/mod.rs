//! Per-role value parsers.
//!
//! Each parser consumes one role group produced by the classifier and reads
//! exactly `row_count` cells from its column(s):
//! - Events: date strings to epoch milliseconds
//! - Similar IDs: delimited lists of numeric-or-text tokens
//! - Similar durations: delimited numeric samples to box-plot summaries
//! - Identifier: typed pass-through

mod durations;
mod events;
mod identifier;
mod similar_ids;

pub use durations::parse_duration_cell;
pub use events::parse_timestamp_millis;
pub use similar_ids::parse_id_list;

pub(crate) use durations::parse_durations_column;
pub(crate) use events::parse_event_columns;
pub(crate) use identifier::parse_identifier_column;
pub(crate) use similar_ids::parse_similar_ids_column;
