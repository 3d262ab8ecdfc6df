//! Type inference for loaded columns
//!
//! CSV cells arrive as text and JSON strings may carry dates, so both
//! loaders share these checks to decide the `DataType` of a column and
//! therefore which filter widget the inferred schema offers for it.

use regex::Regex;
use std::sync::LazyLock;

use crate::data::datatable::DataType;

/// Maximum number of rows sampled per column
pub const INFERENCE_SAMPLE_SIZE: usize = 100;

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        // YYYY-MM-DD
        r"^(19|20)\d{2}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])$",
        // YYYY/MM/DD
        r"^(19|20)\d{2}/(0[1-9]|1[0-2])/(0[1-9]|[12]\d|3[01])$",
        // YYYY-MM-DD HH:MM[:SS]
        r"^(19|20)\d{2}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01]) \d{2}:\d{2}(:\d{2})?$",
        // ISO 8601 with optional fraction and zone
        r"^(19|20)\d{2}-(0[1-9]|1[0-2])-(0[1-9]|[12]\d|3[01])T\d{2}:\d{2}(:\d{2})?(\.\d+)?(Z|[+-]\d{2}:\d{2})?$",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

pub struct TypeInference;

impl TypeInference {
    /// Infer the type of a single text value. Order matters: cheap checks first.
    pub fn infer_from_string(value: &str) -> DataType {
        if value.is_empty() {
            return DataType::Null;
        }

        if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
            return DataType::Boolean;
        }

        if value.parse::<i64>().is_ok() {
            return DataType::Integer;
        }

        if value.parse::<f64>().is_ok() {
            return DataType::Float;
        }

        if Self::looks_like_datetime(value) {
            return DataType::DateTime;
        }

        DataType::String
    }

    /// Strict enough to keep ids like "ORDER-2024-001" as strings
    pub fn looks_like_datetime(value: &str) -> bool {
        if value.len() < 8 || value.len() > 35 {
            return false;
        }
        DATE_PATTERNS.iter().any(|pattern| pattern.is_match(value))
    }

    /// Column type from a sample of cell texts. Incompatible mixes degrade to String.
    pub fn infer_from_samples<'a, I>(values: I) -> DataType
    where
        I: Iterator<Item = &'a str>,
    {
        let mut result = DataType::Null;
        for value in values.take(INFERENCE_SAMPLE_SIZE) {
            result = match result.merge(&Self::infer_from_string(value)) {
                DataType::Mixed => return DataType::String,
                merged => merged,
            };
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_type_inference() {
        assert_eq!(TypeInference::infer_from_string("123"), DataType::Integer);
        assert_eq!(TypeInference::infer_from_string("123.45"), DataType::Float);
        assert_eq!(TypeInference::infer_from_string("FALSE"), DataType::Boolean);
        assert_eq!(TypeInference::infer_from_string("hello"), DataType::String);
        assert_eq!(TypeInference::infer_from_string(""), DataType::Null);
    }

    #[test]
    fn test_datetime_detection() {
        assert!(TypeInference::looks_like_datetime("2024-01-15"));
        assert!(TypeInference::looks_like_datetime("2024/01/15"));
        assert!(TypeInference::looks_like_datetime("2024-01-15 10:30:00"));
        assert!(TypeInference::looks_like_datetime("2024-01-15T10:30:00Z"));
        assert!(TypeInference::looks_like_datetime("2024-01-15T10:30:00.123+08:00"));
    }

    #[test]
    fn test_id_strings_not_detected_as_datetime() {
        assert_eq!(TypeInference::infer_from_string("BQ-81198596"), DataType::String);
        assert_eq!(TypeInference::infer_from_string("ORDER-2024-001"), DataType::String);
        assert_eq!(TypeInference::infer_from_string("2024-13-01"), DataType::String);
    }

    #[test]
    fn test_infer_from_samples() {
        let ints = ["1", "", "3"];
        assert_eq!(TypeInference::infer_from_samples(ints.into_iter()), DataType::Integer);

        let numbers = ["1", "2.5"];
        assert_eq!(TypeInference::infer_from_samples(numbers.into_iter()), DataType::Float);

        let mixed = ["1", "hello", "3"];
        assert_eq!(TypeInference::infer_from_samples(mixed.into_iter()), DataType::String);

        let empty: [&str; 0] = [];
        assert_eq!(TypeInference::infer_from_samples(empty.into_iter()), DataType::Null);
    }
}
