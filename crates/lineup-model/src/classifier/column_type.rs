//! Scalar type resolution from declared type flags.

use crate::types::{ScalarType, TypeFlags};

/// Resolve the scalar type of a data column.
///
/// Flags are checked in priority order numeric, date, boolean, text. A column
/// with none of them set resolves to [`ScalarType::Unknown`]; that is not an
/// error here and only fails once the column has to be mapped for display.
pub(crate) fn resolve_scalar_type(flags: &TypeFlags) -> ScalarType {
    if flags.numeric {
        ScalarType::Numeric
    } else if flags.date_time {
        ScalarType::Date
    } else if flags.bool {
        ScalarType::Boolean
    } else if flags.text {
        ScalarType::Categorical
    } else {
        ScalarType::Unknown
    }
}

/// Identifiers must be directly comparable primitives.
pub(crate) fn is_identifier_type(flags: &TypeFlags) -> bool {
    flags.numeric || flags.text
}

/// Comma separated listing of the set flags, for diagnostics.
pub(crate) fn describe_flags(flags: &TypeFlags) -> String {
    flags.set_flag_names().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flag_types() {
        assert_eq!(resolve_scalar_type(&TypeFlags::numeric()), ScalarType::Numeric);
        assert_eq!(resolve_scalar_type(&TypeFlags::date_time()), ScalarType::Date);
        assert_eq!(resolve_scalar_type(&TypeFlags::boolean()), ScalarType::Boolean);
        assert_eq!(resolve_scalar_type(&TypeFlags::text()), ScalarType::Categorical);
    }

    #[test]
    fn test_priority_order() {
        let all = TypeFlags {
            numeric: true,
            date_time: true,
            bool: true,
            text: true,
        };
        assert_eq!(resolve_scalar_type(&all), ScalarType::Numeric);

        let date_and_text = TypeFlags {
            date_time: true,
            text: true,
            ..TypeFlags::default()
        };
        assert_eq!(resolve_scalar_type(&date_and_text), ScalarType::Date);
    }

    #[test]
    fn test_no_flags_is_unknown() {
        assert_eq!(resolve_scalar_type(&TypeFlags::default()), ScalarType::Unknown);
    }

    #[test]
    fn test_identifier_types() {
        assert!(is_identifier_type(&TypeFlags::numeric()));
        assert!(is_identifier_type(&TypeFlags::text()));
        assert!(!is_identifier_type(&TypeFlags::boolean()));
        assert!(!is_identifier_type(&TypeFlags::date_time()));
    }

    #[test]
    fn test_describe_flags() {
        let flags = TypeFlags {
            numeric: true,
            bool: true,
            ..TypeFlags::default()
        };
        assert_eq!(describe_flags(&flags), "numeric, bool");
    }
}
