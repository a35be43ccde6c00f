//! Run options for a validation.

use serde::{Deserialize, Serialize};

/// Options controlling one validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Check the schema's own structure before streaming any table.
    pub validate_metadata: bool,

    /// Stream the tables even when the schema check reported errors.
    /// Without it a run with structural errors stops after the schema check.
    pub force_load: bool,

    /// Run the taxonomy linter when a concept catalogue is supplied.
    pub lint: bool,

    /// Keep at most this many issues of one code in the report.
    /// Counts always include every issue.
    pub max_issues_per_code: Option<usize>,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema check on, streaming only when the schema is clean.
    pub fn strict() -> Self {
        Self {
            validate_metadata: true,
            force_load: false,
            ..Default::default()
        }
    }

    pub fn with_metadata_validation(mut self, enable: bool) -> Self {
        self.validate_metadata = enable;
        self
    }

    pub fn with_force_load(mut self, enable: bool) -> Self {
        self.force_load = enable;
        self
    }

    pub fn with_lint(mut self, enable: bool) -> Self {
        self.lint = enable;
        self
    }

    pub fn with_max_issues_per_code(mut self, limit: Option<usize>) -> Self {
        self.max_issues_per_code = limit;
        self
    }
}
