//! Table Constraints validation of xBRL-CSV reports.
//!
//! A [`Validator`] loads a schema document, optionally checks its structure,
//! then streams every declared CSV table once, checking values, unique and
//! reference keys, sort order and table cardinalities. Issues go to an
//! [`IssueSink`]; a run that cannot complete returns a [`ValidationError`].

pub mod error;
pub mod keys;
pub mod lint;
pub mod progress;
pub mod report;
pub mod schema;
pub mod sink;
pub mod sort;
pub mod types;
pub mod value;

use std::path::Path;

use tc_ingest::{FileSource, load_metadata};
use tc_model::{Code, Issue, TableSummary, ValidationOptions, ValidationReport};
use tracing::info;

pub use error::{Result, ValidationError};
pub use lint::{ConceptCatalog, ExpandedName, StaticCatalog};
pub use progress::{NoProgress, Progress};
pub use report::ReportValidator;
pub use schema::validate_metadata;
pub use sink::{CountingSink, IssueCollector, IssueSink, TracingSink};
pub use value::{ValueValidator, Violation};

/// What a completed run did, apart from the issues it reported.
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    pub metadata_validated: bool,
    /// False when a failed schema check stopped the run before streaming.
    pub tables_validated: bool,
    pub tables: Vec<TableSummary>,
    pub errors: usize,
    pub warnings: usize,
}

/// Configures and runs a validation.
pub struct Validator<'a> {
    source: &'a dyn FileSource,
    options: ValidationOptions,
    progress: &'a dyn Progress,
    catalog: Option<&'a dyn ConceptCatalog>,
}

impl<'a> Validator<'a> {
    pub fn new(source: &'a dyn FileSource) -> Self {
        Self {
            source,
            options: ValidationOptions::default(),
            progress: &NoProgress,
            catalog: None,
        }
    }

    pub fn with_options(mut self, options: ValidationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Concept catalogue for the taxonomy linter; used when `lint` is on.
    pub fn with_catalog(mut self, catalog: &'a dyn ConceptCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Validate the report described by the schema at `schema`, sending every
    /// issue to `sink`.
    ///
    /// An aborted run reports `tc:validationFailed` to the sink before
    /// returning the error.
    pub fn run(&self, schema: &Path, sink: &mut dyn IssueSink) -> Result<RunOutcome> {
        let mut sink = CountingSink::new(sink);
        info!(schema = %schema.display(), "starting Table Constraints validation");
        self.progress.status("Loading metadata...");

        let metadata = match load_metadata(schema, self.source) {
            Ok(metadata) => metadata,
            Err(source) => {
                return Err(abort(
                    ValidationError::Load {
                        path: schema.to_path_buf(),
                        source,
                    },
                    &mut sink,
                ));
            }
        };
        info!(
            templates = metadata.table_templates().len(),
            tables = metadata.tables().len(),
            "metadata loaded"
        );

        let mut outcome = RunOutcome::default();
        if self.options.validate_metadata {
            outcome.metadata_validated = true;
            let errors = validate_metadata(&metadata, &mut sink);
            if errors > 0 && !self.options.force_load {
                info!(errors, "metadata has structural errors, tables not streamed");
                return Ok(self.finish(outcome, &sink));
            }
        }

        if self.options.lint
            && let Some(catalog) = self.catalog
        {
            lint::lint(&metadata, catalog, &mut sink);
        }

        match ReportValidator::new(&metadata, self.source, self.progress).run(&mut sink) {
            Ok(tables) => {
                outcome.tables = tables;
                outcome.tables_validated = true;
            }
            Err(error) => return Err(abort(error, &mut sink)),
        }
        Ok(self.finish(outcome, &sink))
    }

    /// Run with an in-memory collector and return the assembled report.
    /// Every issue is also emitted as a `tracing` event.
    pub fn validate(&self, schema: &Path) -> Result<ValidationReport> {
        let mut sink = TracingSink::new(IssueCollector::new(self.options.max_issues_per_code));
        let outcome = self.run(schema, &mut sink)?;
        let mut report = sink.into_inner().into_report();
        report.schema = Some(schema.display().to_string());
        report.metadata_validated = outcome.metadata_validated;
        report.tables_validated = outcome.tables_validated;
        report.tables = outcome.tables;
        Ok(report)
    }

    fn finish<S: IssueSink>(&self, mut outcome: RunOutcome, sink: &CountingSink<S>) -> RunOutcome {
        outcome.errors = sink.errors();
        outcome.warnings = sink.warnings();
        let summary = format!(
            "Table Constraints validation complete: {} errors, {} warnings",
            outcome.errors, outcome.warnings
        );
        info!(errors = outcome.errors, warnings = outcome.warnings, "{summary}");
        self.progress.finished(&summary);
        outcome
    }
}

fn abort(error: ValidationError, sink: &mut dyn IssueSink) -> ValidationError {
    tracing::error!(stage = error.stage(), "{error}");
    sink.report(Issue::error(
        Code::ValidationFailed,
        format!("Table Constraints validation failed: {error}"),
    ));
    error
}
