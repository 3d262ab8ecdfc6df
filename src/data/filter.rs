//! Filter evaluator: per-column predicates followed by a global search.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, trace};

use crate::data::column::ColumnDef;
use crate::data::datatable::{DataRow, DataValue};
use crate::data::date_range;

/// One selectable entry of a text filter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterTerm {
    Value(String),
    /// Matches null and empty cells only
    NotSet,
}

impl FilterTerm {
    pub fn value(text: impl Into<String>) -> Self {
        FilterTerm::Value(text.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoolTerm {
    Active,
    Inactive,
    NotSet,
}

/// An active constraint on one column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnFilter {
    /// OR-combined case-insensitive substring terms
    Text(Vec<FilterTerm>),
    /// Inclusive bounds exactly as typed; empty means unbounded
    Number { min: String, max: String },
    /// Inclusive day bounds; empty means unbounded
    Date { from: String, to: String },
    Boolean(Vec<BoolTerm>),
}

impl ColumnFilter {
    pub fn number(min: impl Into<String>, max: impl Into<String>) -> Self {
        ColumnFilter::Number {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn date(from: impl Into<String>, to: impl Into<String>) -> Self {
        ColumnFilter::Date {
            from: from.into(),
            to: to.into(),
        }
    }

    /// An entry with nothing selected constrains nothing
    pub fn is_empty(&self) -> bool {
        match self {
            ColumnFilter::Text(terms) => terms.is_empty(),
            ColumnFilter::Number { min, max } => min.is_empty() && max.is_empty(),
            ColumnFilter::Date { from, to } => from.is_empty() && to.is_empty(),
            ColumnFilter::Boolean(terms) => terms.is_empty(),
        }
    }

    /// Evaluate a non-empty filter against one cell
    pub fn matches(&self, value: &DataValue) -> bool {
        match self {
            ColumnFilter::Text(terms) => {
                if value.is_blank() {
                    return terms.contains(&FilterTerm::NotSet);
                }
                let cell = value.to_string().to_lowercase();
                terms.iter().any(|term| match term {
                    FilterTerm::Value(text) => cell.contains(&text.to_lowercase()),
                    FilterTerm::NotSet => false,
                })
            }
            ColumnFilter::Number { min, max } => {
                if value.is_blank() {
                    return false;
                }
                let Some(number) = value.as_f64() else {
                    return false;
                };
                bound_holds(min, |limit| number >= limit) && bound_holds(max, |limit| number <= limit)
            }
            ColumnFilter::Date { from, to } => !value.is_blank() && date_range::within(value, from, to),
            ColumnFilter::Boolean(terms) => match value {
                DataValue::Boolean(true) => terms.contains(&BoolTerm::Active),
                DataValue::Boolean(false) => terms.contains(&BoolTerm::Inactive),
                v if v.is_blank() => terms.contains(&BoolTerm::NotSet),
                _ => false,
            },
        }
    }
}

/// Empty bound holds trivially; a bound that is not a number never holds
fn bound_holds(bound: &str, check: impl Fn(f64) -> bool) -> bool {
    if bound.is_empty() {
        return true;
    }
    bound.parse::<f64>().map(check).unwrap_or(false)
}

/// Active filters keyed by column field name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    entries: BTreeMap<String, ColumnFilter>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, filter: ColumnFilter) -> Self {
        self.set(column, filter);
        self
    }

    pub fn set(&mut self, column: impl Into<String>, filter: ColumnFilter) {
        self.entries.insert(column.into(), filter);
    }

    pub fn get(&self, column: &str) -> Option<&ColumnFilter> {
        self.entries.get(column)
    }

    pub fn remove(&mut self, column: &str) -> Option<ColumnFilter> {
        self.entries.remove(column)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries that actually constrain rows
    pub fn active(&self) -> impl Iterator<Item = (&String, &ColumnFilter)> {
        self.entries.iter().filter(|(_, filter)| !filter.is_empty())
    }

    pub fn is_active(&self, column: &str) -> bool {
        self.get(column).is_some_and(|filter| !filter.is_empty())
    }

    pub fn has_active(&self) -> bool {
        self.active().next().is_some()
    }
}

/// Step 1: every filterable field column with a non-empty entry must match
pub fn passes_column_filters(row: &DataRow, columns: &[ColumnDef], filters: &FilterState) -> bool {
    columns.iter().all(|column| {
        if !column.is_filterable() {
            return true;
        }
        let Some(name) = column.field_name() else {
            return true;
        };
        match filters.get(name) {
            Some(filter) if !filter.is_empty() => filter.matches(row.get(name)),
            _ => true,
        }
    })
}

/// Step 2: any visible column contains the (already lower-cased) needle.
/// Derived columns are evaluated at index 0 so a row's match never
/// depends on where it sits in the input.
pub fn matches_search(row: &DataRow, columns: &[ColumnDef], needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    columns.iter().filter(|c| c.visible).any(|column| {
        column
            .value(row, 0)
            .search_text()
            .is_some_and(|text| text.contains(needle))
    })
}

/// Positions of the rows that survive both passes, in input order
pub fn matching_indices(
    rows: &[DataRow],
    columns: &[ColumnDef],
    filters: &FilterState,
    search: &str,
) -> Vec<usize> {
    let needle = search.to_lowercase();
    let matches: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| passes_column_filters(row, columns, filters))
        .filter(|(_, row)| matches_search(row, columns, &needle))
        .map(|(index, _)| index)
        .collect();

    debug!(
        target: "filter",
        "{} of {} rows match ({} active filters, search {:?})",
        matches.len(),
        rows.len(),
        filters.active().count(),
        search
    );
    matches
}

/// Filtered copy of `rows`; the input is left untouched
pub fn apply(
    rows: &[DataRow],
    columns: &[ColumnDef],
    filters: &FilterState,
    search: &str,
) -> Vec<DataRow> {
    matching_indices(rows, columns, filters, search)
        .into_iter()
        .map(|index| rows[index].clone())
        .collect()
}

/// A distinct value offered by a text filter widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFacets {
    pub values: Vec<Facet>,
    pub not_set: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BooleanFacets {
    pub active: usize,
    pub inactive: usize,
    pub not_set: usize,
}

/// Distinct non-blank values of a field with counts, sorted case-insensitively
pub fn text_facets(rows: &[DataRow], field: &str) -> TextFacets {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut not_set = 0;
    for row in rows {
        let value = row.get(field);
        if value.is_blank() {
            not_set += 1;
        } else {
            *counts.entry(value.to_string()).or_insert(0) += 1;
        }
    }

    let mut values: Vec<Facet> = counts
        .into_iter()
        .map(|(value, count)| Facet { value, count })
        .collect();
    values.sort_by(|a, b| {
        a.value
            .to_lowercase()
            .cmp(&b.value.to_lowercase())
            .then_with(|| a.value.cmp(&b.value))
    });

    trace!(target: "filter", "facets for {}: {} values, {} not set", field, values.len(), not_set);
    TextFacets { values, not_set }
}

pub fn boolean_facets(rows: &[DataRow], field: &str) -> BooleanFacets {
    rows.iter()
        .fold(BooleanFacets::default(), |mut facets, row| {
            match row.get(field) {
                DataValue::Boolean(true) => facets.active += 1,
                DataValue::Boolean(false) => facets.inactive += 1,
                v if v.is_blank() => facets.not_set += 1,
                _ => {}
            }
            facets
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::column::FilterType;

    fn people() -> Vec<DataRow> {
        vec![
            DataRow::new().with("name", "Bob").with("age", 30i64),
            DataRow::new().with("name", "Al").with("age", 25i64),
            DataRow::new().with("name", "Cy").with("age", 25i64),
        ]
    }

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::field("name").with_filter(FilterType::String),
            ColumnDef::field("age").with_filter(FilterType::Number),
        ]
    }

    #[test]
    fn test_text_terms_are_or_combined() {
        let filter = ColumnFilter::Text(vec![FilterTerm::value("bo"), FilterTerm::value("CY")]);
        assert!(filter.matches(&DataValue::from("Bob")));
        assert!(filter.matches(&DataValue::from("Cy")));
        assert!(!filter.matches(&DataValue::from("Al")));
        assert!(!filter.matches(&DataValue::Null));
    }

    #[test]
    fn test_not_set_term() {
        let filter = ColumnFilter::Text(vec![FilterTerm::NotSet]);
        assert!(filter.matches(&DataValue::Null));
        assert!(filter.matches(&DataValue::from("")));
        assert!(!filter.matches(&DataValue::from("Bob")));
    }

    #[test]
    fn test_number_range_inclusive() {
        let rows = people();
        let filters = FilterState::new().with("age", ColumnFilter::number("25", "25"));
        let result = apply(&rows, &columns(), &filters, "");
        let names: Vec<String> = result.iter().map(|r| r.get("name").to_string()).collect();
        assert_eq!(names, vec!["Al", "Cy"]);
    }

    #[test]
    fn test_number_open_bounds() {
        assert!(ColumnFilter::number("26", "").matches(&DataValue::Integer(30)));
        assert!(!ColumnFilter::number("", "29").matches(&DataValue::Integer(30)));
        assert!(ColumnFilter::number("-1.5", "").matches(&DataValue::Float(-1.0)));
    }

    #[test]
    fn test_number_filter_excludes_non_numeric_cells() {
        let filter = ColumnFilter::number("0", "");
        assert!(!filter.matches(&DataValue::from("n/a")));
        assert!(!filter.matches(&DataValue::Null));
        assert!(filter.matches(&DataValue::from("12")));
    }

    #[test]
    fn test_inverted_range_applied_literally() {
        let filter = ColumnFilter::number("30", "25");
        assert!(!filter.matches(&DataValue::Integer(25)));
        assert!(!filter.matches(&DataValue::Integer(30)));
        assert!(!filter.matches(&DataValue::Integer(27)));
    }

    #[test]
    fn test_incomplete_number_bound_matches_nothing() {
        let filter = ColumnFilter::number("-", "");
        assert!(!filter.is_empty());
        assert!(!filter.matches(&DataValue::Integer(1)));
    }

    #[test]
    fn test_empty_entries_behave_like_absence() {
        let rows = people();
        let filters = FilterState::new()
            .with("name", ColumnFilter::Text(vec![]))
            .with("age", ColumnFilter::number("", ""));
        assert!(!filters.has_active());
        assert_eq!(apply(&rows, &columns(), &filters, "").len(), 3);
    }

    #[test]
    fn test_filters_ignored_on_non_filterable_columns() {
        let rows = people();
        let columns = vec![ColumnDef::field("name"), ColumnDef::field("age")];
        let filters = FilterState::new().with("age", ColumnFilter::number("100", ""));
        assert_eq!(apply(&rows, &columns, &filters, "").len(), 3);
    }

    #[test]
    fn test_filter_applies_to_invisible_columns() {
        let rows = people();
        let columns = vec![
            ColumnDef::field("name"),
            ColumnDef::field("age").with_filter(FilterType::Number).with_visible(false),
        ];
        let filters = FilterState::new().with("age", ColumnFilter::number("30", ""));
        assert_eq!(apply(&rows, &columns, &filters, "").len(), 1);
    }

    #[test]
    fn test_search_spans_visible_columns() {
        let rows = vec![
            DataRow::new().with("name", "Bob").with("role", "Admin"),
            DataRow::new().with("name", "Al").with("role", "Owner"),
        ];
        let columns = vec![ColumnDef::field("name"), ColumnDef::field("role")];
        assert_eq!(matching_indices(&rows, &columns, &FilterState::new(), "o"), vec![0, 1]);
        assert_eq!(matching_indices(&rows, &columns, &FilterState::new(), "ADM"), vec![0]);

        let hidden_role = vec![ColumnDef::field("name"), ColumnDef::field("role").with_visible(false)];
        assert_eq!(matching_indices(&rows, &hidden_role, &FilterState::new(), "own"), Vec::<usize>::new());
    }

    #[test]
    fn test_search_ignores_row_position() {
        let rows = vec![
            DataRow::new().with("name", "Al"),
            DataRow::new().with("name", "Bo"),
        ];
        let columns = vec![ColumnDef::row_number("No"), ColumnDef::field("name")];
        assert!(matching_indices(&rows, &columns, &FilterState::new(), "2").is_empty());
        assert_eq!(matching_indices(&rows, &columns, &FilterState::new(), "1"), vec![0, 1]);
        assert_eq!(matching_indices(&rows[1..], &columns, &FilterState::new(), "bo"), vec![0]);
    }

    #[test]
    fn test_search_never_matches_null() {
        let rows = vec![DataRow::new().with("name", DataValue::Null)];
        let columns = vec![ColumnDef::field("name")];
        assert!(matching_indices(&rows, &columns, &FilterState::new(), "null").is_empty());
        assert_eq!(matching_indices(&rows, &columns, &FilterState::new(), "").len(), 1);
    }

    #[test]
    fn test_search_uses_boolean_labels() {
        let rows = vec![
            DataRow::new().with("enabled", true),
            DataRow::new().with("enabled", false),
        ];
        let columns = vec![ColumnDef::field("enabled")];
        assert_eq!(matching_indices(&rows, &columns, &FilterState::new(), "inact"), vec![1]);
        assert_eq!(matching_indices(&rows, &columns, &FilterState::new(), "active"), vec![0, 1]);
    }

    #[test]
    fn test_boolean_filter() {
        let filter = ColumnFilter::Boolean(vec![BoolTerm::Active, BoolTerm::NotSet]);
        assert!(filter.matches(&DataValue::Boolean(true)));
        assert!(!filter.matches(&DataValue::Boolean(false)));
        assert!(filter.matches(&DataValue::Null));
    }

    #[test]
    fn test_date_filter_excludes_blank_cells() {
        let filter = ColumnFilter::date("2024-01-01", "");
        assert!(!filter.matches(&DataValue::Null));
        assert!(filter.matches(&DataValue::DateTime("2024-02-01".to_string())));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let rows = people();
        let filters = FilterState::new().with("age", ColumnFilter::number("25", ""));
        let once = apply(&rows, &columns(), &filters, "y");
        let twice = apply(&once, &columns(), &filters, "y");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_text_facets() {
        let rows = vec![
            DataRow::new().with("city", "penang"),
            DataRow::new().with("city", "Ipoh"),
            DataRow::new().with("city", "penang"),
            DataRow::new().with("city", ""),
            DataRow::new(),
        ];
        let facets = text_facets(&rows, "city");
        assert_eq!(
            facets.values,
            vec![
                Facet { value: "Ipoh".to_string(), count: 1 },
                Facet { value: "penang".to_string(), count: 2 },
            ]
        );
        assert_eq!(facets.not_set, 2);
    }

    #[test]
    fn test_boolean_facets() {
        let rows = vec![
            DataRow::new().with("ok", true),
            DataRow::new().with("ok", true),
            DataRow::new().with("ok", false),
            DataRow::new(),
        ];
        assert_eq!(
            boolean_facets(&rows, "ok"),
            BooleanFacets { active: 2, inactive: 1, not_set: 1 }
        );
    }
}
