//! Data layer: loaded rows, the column schema and the query engines
//! (filter, sort, pager, exporter) composed by `DataView`.

// Core data modules
pub mod column;
pub mod data_view;
pub mod datatable;
pub mod datatable_loaders;
pub mod type_inference;

// Query engines
pub mod data_exporter;
pub mod date_range;
pub mod datavalue_compare;
pub mod filter;
pub mod pager;
pub mod sort;
