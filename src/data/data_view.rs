use std::sync::Arc;
use tracing::{debug, trace};

use crate::data::column::{find_column, ColumnDef};
use crate::data::data_exporter::{DataExporter, ExportFile, ExportOptions};
use crate::data::datatable::DataRow;
use crate::data::filter::{self, BooleanFacets, FilterState, TextFacets};
use crate::data::pager::{self, Page};
use crate::data::sort::{self, SortKey};

/// The query a view was last computed for
#[derive(Debug, Clone, Default, PartialEq)]
struct QueryKey {
    filters: FilterState,
    search: String,
    sort: Vec<SortKey>,
}

/// A view over shared rows that filters, sorts and pages them
/// without modifying the underlying data.
///
/// Results are memoized per query. Changing the rows or columns drops the
/// cache, so a refresh always equals a fresh recomputation.
#[derive(Clone)]
pub struct DataView {
    /// The underlying immutable data source
    source: Arc<Vec<DataRow>>,

    columns: Arc<Vec<ColumnDef>>,

    key: QueryKey,

    /// Rows passing filters and search, in input order
    matched_rows: Vec<usize>,

    /// `matched_rows` after sorting
    visible_rows: Vec<usize>,

    stale: bool,

    recomputations: usize,
}

impl DataView {
    /// Create a view showing every row unfiltered and unsorted
    pub fn new(source: Arc<Vec<DataRow>>, columns: Arc<Vec<ColumnDef>>) -> Self {
        let all: Vec<usize> = (0..source.len()).collect();
        Self {
            source,
            columns,
            key: QueryKey::default(),
            matched_rows: all.clone(),
            visible_rows: all,
            stale: false,
            recomputations: 0,
        }
    }

    /// Swap in new rows; the next refresh recomputes
    pub fn set_rows(&mut self, rows: Arc<Vec<DataRow>>) {
        self.source = rows;
        self.stale = true;
    }

    pub fn set_columns(&mut self, columns: Arc<Vec<ColumnDef>>) {
        self.columns = columns;
        self.stale = true;
    }

    pub fn source(&self) -> &[DataRow] {
        &self.source
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn column(&self, field: &str) -> Option<&ColumnDef> {
        find_column(&self.columns, field)
    }

    /// Bring the cached results in line with the query.
    /// Filtering reruns only when filters or search changed, sorting only
    /// when its input or the sort keys changed.
    pub fn refresh(&mut self, filters: &FilterState, search: &str, sort: &[SortKey]) -> &[usize] {
        let filter_changed =
            self.stale || self.key.filters != *filters || self.key.search != search;
        let sort_changed = filter_changed || self.key.sort != sort;

        if filter_changed {
            self.matched_rows = filter::matching_indices(&self.source, &self.columns, filters, search);
            self.key.filters = filters.clone();
            self.key.search = search.to_string();
        }

        if sort_changed {
            let mut ordered = self.matched_rows.clone();
            sort::sort_indices(&mut ordered, &self.source, sort);
            self.visible_rows = ordered;
            self.key.sort = sort.to_vec();
            self.recomputations += 1;
            debug!(
                target: "state",
                "view recomputed: {} of {} rows visible",
                self.visible_rows.len(),
                self.source.len()
            );
        } else {
            trace!(target: "state", "view cache hit");
        }

        self.stale = false;
        &self.visible_rows
    }

    /// How many times results were actually recomputed
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }

    pub fn filtered_count(&self) -> usize {
        self.visible_rows.len()
    }

    pub fn total_count(&self) -> usize {
        self.source.len()
    }

    /// Source positions in display order
    pub fn visible_row_indices(&self) -> &[usize] {
        &self.visible_rows
    }

    pub fn row(&self, index: usize) -> Option<&DataRow> {
        self.source.get(index)
    }

    /// Filtered rows in input order
    pub fn matched_rows(&self) -> Vec<DataRow> {
        self.matched_rows
            .iter()
            .map(|&index| self.source[index].clone())
            .collect()
    }

    /// One page of source positions
    pub fn page(&self, page: usize, page_size: usize) -> Page<usize> {
        pager::paginate(&self.visible_rows, page, page_size)
    }

    pub fn total_pages(&self, page_size: usize) -> usize {
        pager::total_pages(self.visible_rows.len(), page_size)
    }

    /// CSV of the filtered rows. Pagination does not apply.
    pub fn export(&self, options: &ExportOptions) -> ExportFile {
        DataExporter::export(&self.matched_rows(), &self.columns, options)
    }

    /// Filter widget choices, drawn from every row
    pub fn text_facets(&self, field: &str) -> TextFacets {
        filter::text_facets(&self.source, field)
    }

    pub fn boolean_facets(&self, field: &str) -> BooleanFacets {
        filter::boolean_facets(&self.source, field)
    }
}
