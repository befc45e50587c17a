use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};

use crate::statistics::BoxPlotSummary;

// ============================================================================
// Input Types
// ============================================================================

/// A raw cell as delivered by the data-acquisition layer.
///
/// Parsers narrow this explicitly; no implicit coercion happens between
/// variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Number(#[serde(serialize_with = "serialize_number")] f64),
    Text(String),
}

/// Largest magnitude at which every whole `f64` is an exact integer.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

fn whole_number(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER).then_some(value as i64)
}

/// Write whole numbers as JSON integers (`1`, not `1.0`).
pub(crate) fn serialize_number<S: Serializer>(
    value: &f64,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match whole_number(*value) {
        Some(n) => serializer.serialize_i64(n),
        None => serializer.serialize_f64(*value),
    }
}

/// JSON value of a number, with the same integer rule as [`serialize_number`].
pub(crate) fn number_to_json(value: f64) -> Value {
    match whole_number(value) {
        Some(n) => json!(n),
        None => json!(value),
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// JSON rendering used in error context maps.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => json!(b),
            CellValue::Number(n) => number_to_json(*n),
            CellValue::Text(s) => json!(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Null, Into::into)
    }
}

/// Semantic purpose of a column, as declared by the host schema.
///
/// Serialized with the host's role names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "dataColumns")]
    Data,
    #[serde(rename = "eventData")]
    Event,
    #[serde(rename = "dataID")]
    Identifier,
    #[serde(rename = "similarDataIds")]
    SimilarIds,
    #[serde(rename = "similarDataDuration")]
    SimilarDurations,
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Data,
        Role::Event,
        Role::Identifier,
        Role::SimilarIds,
        Role::SimilarDurations,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Data => "dataColumns",
            Role::Event => "eventData",
            Role::Identifier => "dataID",
            Role::SimilarIds => "similarDataIds",
            Role::SimilarDurations => "similarDataDuration",
        }
    }
}

/// Declared primitive kinds of a column. More than one flag may be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeFlags {
    pub numeric: bool,
    #[serde(rename = "dateTime")]
    pub date_time: bool,
    pub bool: bool,
    pub text: bool,
}

impl TypeFlags {
    pub fn numeric() -> Self {
        Self {
            numeric: true,
            ..Self::default()
        }
    }

    pub fn date_time() -> Self {
        Self {
            date_time: true,
            ..Self::default()
        }
    }

    pub fn boolean() -> Self {
        Self {
            bool: true,
            ..Self::default()
        }
    }

    pub fn text() -> Self {
        Self {
            text: true,
            ..Self::default()
        }
    }

    /// Names of the flags that are set, in declaration order.
    pub fn set_flag_names(&self) -> Vec<&'static str> {
        [
            (self.numeric, "numeric"),
            (self.date_time, "dateTime"),
            (self.bool, "bool"),
            (self.text, "text"),
        ]
        .into_iter()
        .filter_map(|(set, name)| set.then_some(name))
        .collect()
    }
}

/// Scalar type of a data column, resolved once during classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarType {
    #[serde(rename = "numberColumn")]
    Numeric,
    #[serde(rename = "dateColumn")]
    Date,
    #[serde(rename = "booleanColumn")]
    Boolean,
    #[serde(rename = "categoricalColumn")]
    Categorical,
    #[serde(rename = "unknown")]
    Unknown,
}

static NULL_CELL: CellValue = CellValue::Null;

/// One incoming column of the raw dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawColumn {
    /// Stable unique identifier used for deduplication.
    pub query_name: String,
    pub display_name: String,
    #[serde(default)]
    pub roles: BTreeSet<Role>,
    #[serde(default)]
    pub types: TypeFlags,
    /// Position the user assigned the column within a role slot.
    #[serde(default)]
    pub role_indices: BTreeMap<Role, usize>,
    #[serde(default)]
    pub values: Vec<CellValue>,
}

impl RawColumn {
    pub fn new(
        query_name: impl Into<String>,
        display_name: impl Into<String>,
        types: TypeFlags,
        values: Vec<CellValue>,
    ) -> Self {
        Self {
            query_name: query_name.into(),
            display_name: display_name.into(),
            roles: BTreeSet::new(),
            types,
            role_indices: BTreeMap::new(),
            values,
        }
    }

    /// Declare a role without an ordering index.
    pub fn with_role(mut self, role: Role) -> Self {
        self.roles.insert(role);
        self
    }

    /// Declare a role at a position within its slot.
    pub fn with_role_at(mut self, role: Role, index: usize) -> Self {
        self.roles.insert(role);
        self.role_indices.insert(role, index);
        self
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn role_index(&self, role: Role) -> Option<usize> {
        self.role_indices.get(&role).copied()
    }

    /// Cell at `row`, or null when the column is shorter than the dataset.
    pub fn cell(&self, row: usize) -> &CellValue {
        self.values.get(row).unwrap_or(&NULL_CELL)
    }
}

/// Host metadata object: settings groups keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetadata {
    #[serde(default)]
    pub objects: BTreeMap<String, Map<String, Value>>,
}

impl DatasetMetadata {
    pub fn group(&self, name: &str) -> Option<&Map<String, Value>> {
        self.objects.get(name)
    }
}

/// A complete raw dataset: ordered columns plus optional metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub columns: Vec<RawColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DatasetMetadata>,
}

impl Dataset {
    pub fn new(columns: Vec<RawColumn>) -> Self {
        Self {
            columns,
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: DatasetMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

// ============================================================================
// Model Types
// ============================================================================

/// A data-role column with its resolved scalar type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataColumn {
    pub name: String,
    #[serde(skip)]
    pub query_name: String,
    pub column_type: ScalarType,
    pub values: Vec<CellValue>,
}

/// An event-role column with epoch-millisecond timestamps.
///
/// `None` marks a cell whose date string could not be parsed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventColumn {
    pub name: String,
    pub values: Vec<Option<i64>>,
}

/// One token of a similar-IDs list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdToken {
    Number(#[serde(serialize_with = "serialize_number")] f64),
    Text(String),
}

impl From<&str> for IdToken {
    fn from(value: &str) -> Self {
        IdToken::Text(value.to_string())
    }
}

impl From<f64> for IdToken {
    fn from(value: f64) -> Self {
        IdToken::Number(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarIdsColumn {
    pub name: String,
    pub values: Vec<Vec<IdToken>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarDurationsColumn {
    pub name: String,
    pub values: Vec<Option<BoxPlotSummary>>,
}

/// The identifier column; values are passed through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdColumn {
    pub name: String,
    pub values: Vec<CellValue>,
}
