//! Loading schemas and streaming CSV tables for Table Constraints validation.

pub mod detect;
pub mod error;
pub mod loader;
pub mod rows;
pub mod source;

pub use detect::has_table_constraints;
pub use error::{IngestError, Result};
pub use loader::{extends_of, load_metadata, read_json};
pub use rows::CsvRows;
pub use source::{
    FileSource, FsSource, ReadFn, ZipSource, is_http_url, normalize, read_to_string,
    resolve_table_path,
};
