//! Issue sinks: where validators send what they find.

use tc_model::{Issue, Severity, ValidationReport};

/// Receives every issue a run produces.
pub trait IssueSink {
    fn report(&mut self, issue: Issue);
}

impl<S: IssueSink + ?Sized> IssueSink for &mut S {
    fn report(&mut self, issue: Issue) {
        (**self).report(issue);
    }
}

impl IssueSink for Vec<Issue> {
    fn report(&mut self, issue: Issue) {
        self.push(issue);
    }
}

/// Tallies issues into a [`ValidationReport`], keeping at most
/// `max_per_code` of each code.
#[derive(Debug, Default)]
pub struct IssueCollector {
    report: ValidationReport,
    max_per_code: Option<usize>,
}

impl IssueCollector {
    pub fn new(max_per_code: Option<usize>) -> Self {
        Self {
            report: ValidationReport::default(),
            max_per_code,
        }
    }

    pub fn error_count(&self) -> usize {
        self.report.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.report.warning_count
    }

    pub fn into_report(self) -> ValidationReport {
        self.report
    }
}

impl IssueSink for IssueCollector {
    fn report(&mut self, issue: Issue) {
        if self
            .report
            .tally(issue.code, issue.severity, self.max_per_code)
        {
            self.report.issues.push(issue);
        }
    }
}

/// Emits each issue as a `tracing` event before forwarding it.
#[derive(Debug, Default)]
pub struct TracingSink<S> {
    inner: S,
}

impl<S: IssueSink> TracingSink<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: IssueSink> IssueSink for TracingSink<S> {
    fn report(&mut self, issue: Issue) {
        let table = issue.table.as_deref().unwrap_or_default();
        let field = issue.field.as_deref().unwrap_or_default();
        let row = issue.row.unwrap_or_default();
        match issue.severity {
            Severity::Error => tracing::error!(
                code = %issue.code,
                table,
                row,
                field,
                "{}",
                issue.message
            ),
            Severity::Warning => tracing::warn!(
                code = %issue.code,
                table,
                row,
                field,
                "{}",
                issue.message
            ),
        }
        self.inner.report(issue);
    }
}

/// Counts errors and warnings on their way to another sink.
#[derive(Debug, Default)]
pub struct CountingSink<S> {
    inner: S,
    errors: usize,
    warnings: usize,
}

impl<S: IssueSink> CountingSink<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            errors: 0,
            warnings: 0,
        }
    }

    pub fn errors(&self) -> usize {
        self.errors
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }
}

impl<S: IssueSink> IssueSink for CountingSink<S> {
    fn report(&mut self, issue: Issue) {
        match issue.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
        self.inner.report(issue);
    }
}
