//! Custom column mappings and presentation-neutral column descriptors.
//!
//! A custom mapping is a JSON object keyed by column name whose values are
//! either `[]` or a `[min, max]` numeric domain:
//!
//! ```json
//! {"Score": [0, 100], "Name": []}
//! ```
//!
//! Descriptors tell a renderer what kind of column each data column is,
//! with the mapped domain attached to numeric columns.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ViewModelError};
use crate::types::{DataColumn, ScalarType};

/// One entry of the custom mapping setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomMapping {
    /// Lower-cased column name.
    pub column_key: String,
    /// `(min, max)` when a two-number array was given.
    pub domain: Option<(f64, f64)>,
}

impl CustomMapping {
    /// Case-insensitive match against a column name.
    pub fn matches(&self, column_name: &str) -> bool {
        self.column_key == column_name.to_lowercase()
    }
}

fn mapping_error(reason: impl Into<String>, input: &str) -> ViewModelError {
    ViewModelError::CustomMapping {
        reason: reason.into(),
        input: input.to_string(),
    }
}

/// Parse the custom mapping setting.
///
/// A blank setting means no mappings. Entries come out ordered by key.
pub fn parse_custom_mappings(input: &str) -> Result<Vec<CustomMapping>> {
    if input.trim().is_empty() {
        return Ok(Vec::new());
    }

    let parsed: Value =
        serde_json::from_str(input).map_err(|e| mapping_error(e.to_string(), input))?;
    let Value::Object(entries) = parsed else {
        return Err(mapping_error("The custom mapping is not a JSON object", input));
    };

    entries
        .iter()
        .map(|(key, value)| {
            let Value::Array(bounds) = value else {
                return Err(mapping_error(
                    format!("The value of the custom mapping {key} is not an array"),
                    input,
                ));
            };

            let domain = match bounds.as_slice() {
                [] => None,
                [min, max] => match (min.as_f64(), max.as_f64()) {
                    (Some(min), Some(max)) => Some((min, max)),
                    _ => {
                        return Err(mapping_error(
                            format!("The array of the custom mapping {key} does not contain numbers"),
                            input,
                        ));
                    }
                },
                _ => {
                    return Err(mapping_error(
                        format!(
                            "The array of the custom mapping {key} does not have the right length (0 or 2)"
                        ),
                        input,
                    ));
                }
            };

            Ok(CustomMapping {
                column_key: key.to_lowercase(),
                domain,
            })
        })
        .collect()
}

/// Kind of a data column as a renderer needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ColumnKind {
    Categorical,
    Number {
        #[serde(skip_serializing_if = "Option::is_none")]
        domain: Option<(f64, f64)>,
    },
    Date,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

/// Describe every data column, in order.
///
/// The first matching mapping supplies a numeric column's domain. Fails on
/// an empty column set or on a column whose type is unknown.
pub fn describe_columns(
    columns: &[DataColumn],
    mappings: &[CustomMapping],
) -> Result<Vec<ColumnDescriptor>> {
    if columns.is_empty() {
        return Err(ViewModelError::NoColumns);
    }

    columns
        .iter()
        .map(|column| {
            let kind = match column.column_type {
                ScalarType::Categorical => ColumnKind::Categorical,
                ScalarType::Numeric => ColumnKind::Number {
                    domain: mappings
                        .iter()
                        .find(|m| m.matches(&column.name))
                        .and_then(|m| m.domain),
                },
                ScalarType::Date => ColumnKind::Date,
                ScalarType::Boolean => ColumnKind::Boolean,
                ScalarType::Unknown => {
                    return Err(ViewModelError::UnknownColumnType {
                        column: column.name.clone(),
                        query_name: column.query_name.clone(),
                    });
                }
            };
            Ok(ColumnDescriptor {
                name: column.name.clone(),
                kind,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn column(name: &str, column_type: ScalarType) -> DataColumn {
        DataColumn {
            name: name.to_string(),
            query_name: format!("t.{name}"),
            column_type,
            values: Vec::new(),
        }
    }

    // ==================== parse_custom_mappings tests ====================

    #[test]
    fn test_parse_domain_and_empty_entries() {
        let mappings = parse_custom_mappings(r#"{"Score": [0, 100], "Name": []}"#).unwrap();
        assert_eq!(
            mappings,
            vec![
                CustomMapping {
                    column_key: "name".to_string(),
                    domain: None,
                },
                CustomMapping {
                    column_key: "score".to_string(),
                    domain: Some((0.0, 100.0)),
                },
            ]
        );
    }

    #[test]
    fn test_blank_setting_is_empty() {
        assert!(parse_custom_mappings("").unwrap().is_empty());
        assert!(parse_custom_mappings("{}").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_array_value() {
        let err = parse_custom_mappings(r#"{"Score": 5}"#).unwrap_err();
        assert_eq!(err.error_code(), "CUSTOM_MAPPING");
        assert_eq!(
            err.to_string(),
            "The value of the custom mapping Score is not an array"
        );
        assert_eq!(err.context()["invalid JSON"], json!(r#"{"Score": 5}"#));
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = parse_custom_mappings(r#"{"Score": [1]}"#).unwrap_err();
        assert!(err.to_string().contains("right length (0 or 2)"));
    }

    #[test]
    fn test_rejects_non_numbers() {
        let err = parse_custom_mappings(r#"{"Score": ["a", 2]}"#).unwrap_err();
        assert!(err.to_string().contains("does not contain numbers"));
    }

    #[test]
    fn test_rejects_invalid_json_and_non_object() {
        assert!(parse_custom_mappings("{not json").is_err());
        assert!(parse_custom_mappings("[1, 2]").is_err());
    }

    // ==================== describe_columns tests ====================

    #[test]
    fn test_describe_columns_applies_domain_case_insensitively() {
        let columns = vec![
            column("Score", ScalarType::Numeric),
            column("Name", ScalarType::Categorical),
            column("Seen", ScalarType::Date),
            column("Flag", ScalarType::Boolean),
            column("Other", ScalarType::Numeric),
        ];
        let mappings = parse_custom_mappings(r#"{"SCORE": [0, 10]}"#).unwrap();

        let descriptors = describe_columns(&columns, &mappings).unwrap();
        assert_eq!(
            descriptors[0].kind,
            ColumnKind::Number {
                domain: Some((0.0, 10.0))
            }
        );
        assert_eq!(descriptors[1].kind, ColumnKind::Categorical);
        assert_eq!(descriptors[2].kind, ColumnKind::Date);
        assert_eq!(descriptors[3].kind, ColumnKind::Boolean);
        assert_eq!(descriptors[4].kind, ColumnKind::Number { domain: None });
    }

    #[test]
    fn test_descriptor_serialization() {
        let descriptors = describe_columns(&[column("Score", ScalarType::Numeric)], &[]).unwrap();
        assert_eq!(
            serde_json::to_value(&descriptors).unwrap(),
            json!([{"name": "Score", "kind": "number"}])
        );
    }

    #[test]
    fn test_unknown_type_fails() {
        let err = describe_columns(&[column("Blob", ScalarType::Unknown)], &[]).unwrap_err();
        match err {
            ViewModelError::UnknownColumnType { column, query_name } => {
                assert_eq!(column, "Blob");
                assert_eq!(query_name, "t.Blob");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_no_columns_fails() {
        let err = describe_columns(&[], &[]).unwrap_err();
        assert_eq!(err.error_code(), "NO_COLUMNS");
    }
}
