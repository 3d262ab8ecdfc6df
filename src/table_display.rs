use comfy_table::{Attribute, Cell, ContentArrangement, Table};

use crate::data::column::ColumnDef;
use crate::data::filter::{BooleanFacets, TextFacets};
use crate::data::pager::Page;
use crate::data::sort::{SortDirection, SortKey};
use crate::state::StateDispatcher;

pub const NO_RESULTS: &str = "No results found";

/// Header label with sort and filter markers, e.g. `age ↑1 *`
pub fn header_label(column: &ColumnDef, sort: &[SortKey], filtered: bool) -> String {
    let mut label = column.header.display_text();
    if let Some(name) = column.field_name() {
        if let Some(entry) = sort.iter().find(|entry| entry.key == name) {
            let arrow = match entry.direction {
                SortDirection::Asc => '↑',
                SortDirection::Desc => '↓',
            };
            if sort.len() > 1 {
                label.push_str(&format!(" {}{}", arrow, entry.priority + 1));
            } else {
                label.push_str(&format!(" {}", arrow));
            }
        }
    }
    if filtered {
        label.push_str(" *");
    }
    label
}

fn truncate(text: &str, max_width: usize) -> String {
    if max_width == 0 || text.chars().count() <= max_width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// The current page as a comfy-table, visible columns only
pub fn build_table(dispatcher: &StateDispatcher, max_column_width: usize) -> Table {
    let view = dispatcher.view();
    let state = dispatcher.state();
    let columns: Vec<&ColumnDef> = view.columns().iter().filter(|c| c.visible).collect();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        columns
            .iter()
            .map(|column| {
                let filtered = column
                    .field_name()
                    .is_some_and(|name| state.filters.is_active(name));
                Cell::new(header_label(column, &state.sort, filtered)).add_attribute(Attribute::Bold)
            })
            .collect::<Vec<_>>(),
    );

    let page = dispatcher.current_page();
    if page.is_empty() {
        table.add_row(vec![Cell::new(NO_RESULTS).add_attribute(Attribute::Italic)]);
        return table;
    }

    for (slot, &source_index) in page.rows.iter().enumerate() {
        let Some(row) = view.row(source_index) else {
            continue;
        };
        let position = page.offset() + slot;
        table.add_row(
            columns
                .iter()
                .map(|column| truncate(&column.render_cell(row, position), max_column_width))
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// `Showing 1 to 10 of 42 entries`, only when there is more than one page
pub fn page_summary<T>(page: &Page<T>) -> Option<String> {
    if !page.show_controls() {
        return None;
    }
    let first = page.offset() + 1;
    let last = (page.offset() + page.rows.len()).max(first);
    Some(format!(
        "Showing {} to {} of {} entries",
        first, last, page.total_rows
    ))
}

/// Pager buttons, current page bracketed: `< 1 [2] 3 >`
pub fn page_buttons<T>(page: &Page<T>) -> String {
    let mut parts = Vec::with_capacity(page.total_pages + 2);
    parts.push(if page.has_previous() { "<" } else { " " }.to_string());
    for number in 1..=page.total_pages {
        if number == page.page {
            parts.push(format!("[{}]", number));
        } else {
            parts.push(number.to_string());
        }
    }
    parts.push(if page.has_next() { ">" } else { " " }.to_string());
    parts.join(" ").trim().to_string()
}

/// Table plus footer lines
pub fn render_page(dispatcher: &StateDispatcher, max_column_width: usize) -> String {
    let mut out = build_table(dispatcher, max_column_width).to_string();

    let view = dispatcher.view();
    let page = dispatcher.current_page();
    if let Some(summary) = page_summary(&page) {
        out.push('\n');
        out.push_str(&summary);
        out.push_str("   ");
        out.push_str(&page_buttons(&page));
    }
    if view.filtered_count() != view.total_count() {
        out.push_str(&format!(
            "\n({} of {} rows match)",
            view.filtered_count(),
            view.total_count()
        ));
    }
    out
}

pub fn render_text_facets(field: &str, facets: &TextFacets) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(field).add_attribute(Attribute::Bold),
        Cell::new("count").add_attribute(Attribute::Bold),
    ]);
    for facet in &facets.values {
        table.add_row(vec![facet.value.clone(), facet.count.to_string()]);
    }
    if facets.not_set > 0 {
        table.add_row(vec!["Not Set".to_string(), facets.not_set.to_string()]);
    }
    table.to_string()
}

pub fn render_boolean_facets(field: &str, facets: &BooleanFacets) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        Cell::new(field).add_attribute(Attribute::Bold),
        Cell::new("count").add_attribute(Attribute::Bold),
    ]);
    table.add_row(vec!["Active".to_string(), facets.active.to_string()]);
    table.add_row(vec!["Inactive".to_string(), facets.inactive.to_string()]);
    table.add_row(vec!["Not Set".to_string(), facets.not_set.to_string()]);
    table.to_string()
}
