//! Configuration module
//!
//! Application settings and column schema files.

pub mod config;
pub mod schema_config;

pub use config::Config;
pub use schema_config::SchemaConfig;
