//! Data model for Table Constraints validation of xBRL-CSV reports.

pub mod error;
pub mod issue;
pub mod metadata;
pub mod names;
pub mod options;
pub mod report;
pub mod row;

pub use error::{ModelError, Result};
pub use issue::{Category, Code, Issue, Severity};
pub use metadata::{
    ColumnDef, Constraint, Facets, KeysConfig, Metadata, Namespaces, ParameterDef, ReferenceKey,
    TableConfig, TableConstraints, TableTemplate, UniqueKey,
};
pub use options::ValidationOptions;
pub use report::{CodeCount, TableStatus, TableSummary, ValidationReport};
pub use row::{Header, KeyValue, Row, is_nil};
