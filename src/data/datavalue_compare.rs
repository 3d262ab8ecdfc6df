use crate::data::datatable::DataValue;
use std::cmp::Ordering;

/// Natural ordering of two DataValues.
///
/// Same-typed values compare by value, integers and floats compare
/// numerically with each other, and values of unrelated types fall back
/// to a fixed rank: Null < Boolean < Integer/Float < String < DateTime.
pub fn compare_datavalues(a: &DataValue, b: &DataValue) -> Ordering {
    match (a, b) {
        (DataValue::Integer(a), DataValue::Integer(b)) => a.cmp(b),
        (DataValue::Float(a), DataValue::Float(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),

        // Compare actual numeric values, not types
        (DataValue::Integer(i), DataValue::Float(f)) => {
            (*i as f64).partial_cmp(f).unwrap_or(Ordering::Equal)
        }
        (DataValue::Float(f), DataValue::Integer(i)) => {
            f.partial_cmp(&(*i as f64)).unwrap_or(Ordering::Equal)
        }

        (DataValue::String(a), DataValue::String(b)) => a.cmp(b),
        (DataValue::Boolean(a), DataValue::Boolean(b)) => a.cmp(b),
        (DataValue::DateTime(a), DataValue::DateTime(b)) => a.cmp(b),

        (DataValue::Null, DataValue::Null) => Ordering::Equal,

        (a, b) => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &DataValue) -> u8 {
    match value {
        DataValue::Null => 0,
        DataValue::Boolean(_) => 1,
        DataValue::Integer(_) | DataValue::Float(_) => 2,
        DataValue::String(_) => 3,
        DataValue::DateTime(_) => 4,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_comparison() {
        assert_eq!(
            compare_datavalues(&DataValue::Integer(1), &DataValue::Integer(2)),
            Ordering::Less
        );
        assert_eq!(
            compare_datavalues(&DataValue::Integer(2), &DataValue::Integer(2)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_mixed_numeric_comparison() {
        assert_eq!(
            compare_datavalues(&DataValue::Integer(2), &DataValue::Float(1.5)),
            Ordering::Greater
        );
        assert_eq!(
            compare_datavalues(&DataValue::Float(2.0), &DataValue::Integer(2)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_string_comparison() {
        assert_eq!(
            compare_datavalues(
                &DataValue::String("apple".to_string()),
                &DataValue::String("banana".to_string())
            ),
            Ordering::Less
        );
    }

    #[test]
    fn test_boolean_comparison() {
        assert_eq!(
            compare_datavalues(&DataValue::Boolean(false), &DataValue::Boolean(true)),
            Ordering::Less
        );
    }

    #[test]
    fn test_cross_type_comparison() {
        assert_eq!(
            compare_datavalues(&DataValue::Boolean(true), &DataValue::Integer(1)),
            Ordering::Less
        );
        assert_eq!(
            compare_datavalues(&DataValue::Float(1.0), &DataValue::String("a".to_string())),
            Ordering::Less
        );
        assert_eq!(
            compare_datavalues(
                &DataValue::DateTime("2024-01-01".to_string()),
                &DataValue::String("z".to_string())
            ),
            Ordering::Greater
        );
        assert_eq!(
            compare_datavalues(&DataValue::Null, &DataValue::Integer(1)),
            Ordering::Less
        );
    }
}
