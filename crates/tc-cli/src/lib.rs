//! CLI library components for the Table Constraints validator.

pub mod config;
pub mod logging;
pub mod progress;
pub mod summary;
