//! Utility helpers shared by the binary

pub mod app_paths;
