//! Outcome of a completed validation run.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::issue::{Code, Issue, Severity};

/// What happened to one declared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    /// The CSV was streamed.
    Validated,
    /// The table declares no `url`.
    NoUrl,
    /// The CSV could not be found.
    MissingCsv,
}

impl TableStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Validated => "validated",
            Self::NoUrl => "no url",
            Self::MissingCsv => "missing csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub template: String,
    /// Resolved CSV location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub rows: u64,
    pub status: TableStatus,
}

/// Per-code tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CodeCount {
    pub errors: usize,
    pub warnings: usize,
}

/// Issues and table summaries of a run that completed.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub metadata_validated: bool,
    /// False when the run stopped after a failed schema check.
    pub tables_validated: bool,
    pub tables: Vec<TableSummary>,
    pub issues: Vec<Issue>,
    pub error_count: usize,
    pub warning_count: usize,
    pub code_counts: BTreeMap<Code, CodeCount>,
    /// Issues counted but not kept because of the per-code limit.
    pub suppressed: usize,
}

impl ValidationReport {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Number of issues of `code`, including suppressed ones.
    pub fn count(&self, code: Code) -> usize {
        self.code_counts
            .get(&code)
            .map(|count| count.errors + count.warnings)
            .unwrap_or(0)
    }

    pub fn issues_with(&self, code: Code) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |issue| issue.code == code)
    }

    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|table| table.rows).sum()
    }

    /// Record an issue in the tallies. Returns whether it should be kept
    /// given `limit`.
    pub fn tally(&mut self, code: Code, severity: Severity, limit: Option<usize>) -> bool {
        match severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        let count = self.code_counts.entry(code).or_default();
        match severity {
            Severity::Error => count.errors += 1,
            Severity::Warning => count.warnings += 1,
        }
        let seen = count.errors + count.warnings;
        let keep = limit.is_none_or(|limit| seen <= limit);
        if !keep {
            self.suppressed += 1;
        }
        keep
    }
}
