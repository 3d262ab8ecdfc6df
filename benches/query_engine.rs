use criterion::{black_box, criterion_group, criterion_main, Criterion};
use datagrid::data::column::{ColumnDef, FilterType};
use datagrid::data::data_view::DataView;
use datagrid::data::datatable::DataRow;
use datagrid::data::filter::{self, ColumnFilter, FilterState, FilterTerm};
use datagrid::data::sort::{self, SortKey};
use std::sync::Arc;

fn create_test_rows(rows: usize) -> Vec<DataRow> {
    let books = [
        "Commodities Trading",
        "Equity Trading",
        "FX Trading",
        "Bond Trading",
        "Derivatives",
        "Options",
        "Futures",
        "ETF Trading",
        "Structured Products",
        "Money Markets",
    ];

    (0..rows)
        .map(|i| {
            DataRow::new()
                .with("book", books[i % books.len()])
                .with("value", (i * 37 % 1000) as i64)
                .with("status", format!("STATUS_{}", i % 5))
        })
        .collect()
}

fn columns() -> Vec<ColumnDef> {
    vec![
        ColumnDef::field("book").with_filter(FilterType::String),
        ColumnDef::field("value").with_filter(FilterType::Number),
        ColumnDef::field("status").with_filter(FilterType::String),
    ]
}

fn two_key_sort() -> Vec<SortKey> {
    sort::toggle(&sort::toggle(&[], "status"), "value")
}

fn benchmark_filter(c: &mut Criterion) {
    let columns = columns();
    let filters = FilterState::new()
        .with("book", ColumnFilter::Text(vec![FilterTerm::value("trading")]))
        .with("value", ColumnFilter::number("100", "700"));

    let mut group = c.benchmark_group("filter");
    for (label, size) in [("10k_rows", 10_000), ("100k_rows", 100_000)] {
        let rows = create_test_rows(size);
        group.bench_function(label, |b| {
            b.iter(|| filter::matching_indices(&rows, &columns, black_box(&filters), "status_3"))
        });
    }
    group.finish();
}

fn benchmark_filter_and_sort(c: &mut Criterion) {
    let columns = Arc::new(columns());
    let filters = FilterState::new().with("value", ColumnFilter::number("", "500"));
    let sort = two_key_sort();

    let mut group = c.benchmark_group("filter_and_sort");
    for (label, size) in [("10k_rows", 10_000), ("100k_rows", 100_000)] {
        let rows = Arc::new(create_test_rows(size));
        group.bench_function(label, |b| {
            b.iter(|| {
                let mut view = DataView::new(rows.clone(), columns.clone());
                view.refresh(black_box(&filters), "", black_box(&sort)).len()
            })
        });
    }
    group.finish();
}

fn benchmark_memoized_refresh(c: &mut Criterion) {
    let rows = Arc::new(create_test_rows(100_000));
    let filters = FilterState::new();
    let sort = two_key_sort();
    let mut view = DataView::new(rows, Arc::new(columns()));
    view.refresh(&filters, "", &sort);

    c.bench_function("memoized_refresh_100k", |b| {
        b.iter(|| view.refresh(black_box(&filters), "", black_box(&sort)).len())
    });
}

criterion_group!(
    benches,
    benchmark_filter,
    benchmark_filter_and_sort,
    benchmark_memoized_refresh
);
criterion_main!(benches);
