//! Streams every declared table through the value, key and sort
//! validators, then checks table counts and resolves reference keys.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use tc_ingest::{CsvRows, FileSource, resolve_table_path};
use tc_model::{
    Code, Header, Issue, Metadata, TableConfig, TableStatus, TableSummary, TableTemplate,
};
use tracing::{debug, info_span, trace, warn};

use crate::error::{Result, ValidationError};
use crate::keys::{KeyIndexer, KeyRegistry};
use crate::progress::Progress;
use crate::sink::IssueSink;
use crate::sort::SortValidator;
use crate::value::{ValueValidator, Violation};

/// Rows between two progress callbacks.
const PROGRESS_INTERVAL: u64 = 10_000;

/// Key and sort state of one template, kept for the whole run.
struct TemplateState {
    name: String,
    keys: KeyIndexer,
    sort: SortValidator,
}

/// Validates the report data of one loaded schema.
pub struct ReportValidator<'a> {
    metadata: &'a Metadata,
    source: &'a dyn FileSource,
    progress: &'a dyn Progress,
    values: ValueValidator<'a>,
    registry: KeyRegistry,
    templates: Vec<TemplateState>,
    table_counts: HashMap<String, u64>,
}

impl<'a> ReportValidator<'a> {
    pub fn new(
        metadata: &'a Metadata,
        source: &'a dyn FileSource,
        progress: &'a dyn Progress,
    ) -> Self {
        Self {
            metadata,
            source,
            progress,
            values: ValueValidator::new(metadata.namespaces()),
            registry: KeyRegistry::new(),
            templates: Vec::new(),
            table_counts: HashMap::new(),
        }
    }

    /// Stream all tables in declaration order. `Err` aborts the run; issues
    /// already reported stay with the sink.
    pub fn run(mut self, sink: &mut dyn IssueSink) -> Result<Vec<TableSummary>> {
        let metadata = self.metadata;
        let mut summaries = Vec::with_capacity(metadata.tables().len());

        for table in metadata.tables() {
            self.progress
                .status(&format!("Validating table: {}", table.name));
            let span = info_span!("table", name = %table.name, template = %table.template);
            let _entered = span.enter();

            let summary = self.validate_table(table, sink)?;
            debug!(rows = summary.rows, status = summary.status.label(), "table done");
            *self.table_counts.entry(table.template.clone()).or_default() += 1;
            summaries.push(summary);
        }

        self.progress.status("Validating table/row counts...");
        self.check_table_counts(sink);

        self.progress.status("Finalizing key validation...");
        for state in &mut self.templates {
            debug!(
                template = %state.name,
                staged = state.keys.staged_references(),
                "resolving reference keys"
            );
            state.keys.finalize(&self.registry, sink);
        }
        Ok(summaries)
    }

    fn validate_table(
        &mut self,
        table: &TableConfig,
        sink: &mut dyn IssueSink,
    ) -> Result<TableSummary> {
        let metadata = self.metadata;
        let template = match metadata.template(&table.template) {
            Some(template) => Cow::Borrowed(template),
            None => {
                debug!("table uses an undeclared template");
                Cow::Owned(TableTemplate {
                    name: table.template.clone(),
                    ..TableTemplate::default()
                })
            }
        };
        let mut summary = TableSummary {
            name: table.name.clone(),
            template: template.name.clone(),
            source: None,
            rows: 0,
            status: TableStatus::NoUrl,
        };

        let Some(url) = table.url.as_deref() else {
            debug!("table has no url");
            return Ok(summary);
        };
        let path = resolve_table_path(metadata.base_dir(), url);
        let location = self.source.describe(&path);
        summary.source = Some(location.clone());
        if !self.source.exists(&path) {
            warn!(path = %location, "CSV file not found");
            sink.report(
                Issue::warning(Code::MissingCsv, format!("CSV file not found: {location}"))
                    .with_template(&template.name)
                    .with_table(&table.name),
            );
            summary.status = TableStatus::MissingCsv;
            return Ok(summary);
        }

        let index = self.template_state(&template);

        for parameter in &template.parameters {
            let context = format!("table:{}, parameter:{}", table.name, parameter.name);
            let violations = self.values.validate(
                table.parameter(&parameter.name),
                &parameter.constraint,
                &context,
                true,
            );
            for violation in violations {
                sink.report(
                    violation_issue(violation, &template.name, &table.name)
                        .with_field(&parameter.name),
                );
            }
        }

        let rows = self
            .stream_rows(table, &template, index, &path, sink)
            .map_err(|source| ValidationError::Table {
                table: table.name.clone(),
                source,
            })?;
        summary.rows = rows;
        summary.status = TableStatus::Validated;

        check_row_count(table, &template, rows, sink);
        Ok(summary)
    }

    fn stream_rows(
        &mut self,
        table: &TableConfig,
        template: &TableTemplate,
        index: usize,
        path: &Path,
        sink: &mut dyn IssueSink,
    ) -> tc_ingest::Result<u64> {
        let values = &self.values;
        let registry = &mut self.registry;
        let state = &mut self.templates[index];
        let progress = self.progress;
        let mut count = 0u64;

        self.source.read_with(path, &mut |reader| {
            let mut rows = CsvRows::new(reader, path)?;
            if let Some(order) = &template.column_order {
                check_column_order(table, template, rows.header(), order, sink);
            }

            while let Some(row) = rows.next_row()? {
                count += 1;
                trace!(row = count, "row");
                for (column, constraint) in template.constrained_columns() {
                    let context = format!("table:{}, column:{column}, row:{count}", table.name);
                    for violation in values.validate(row.get(column), constraint, &context, false)
                    {
                        sink.report(
                            violation_issue(violation, &template.name, &table.name)
                                .with_row(count)
                                .with_field(column),
                        );
                    }
                }

                let merged = row.with_parameters(&table.parameters);
                state.keys.add_row(&merged, count, &table.name, registry, sink);
                state.sort.check_row(&merged, count, &table.name, sink);

                if count % PROGRESS_INTERVAL == 0 {
                    progress.rows(&table.name, count);
                }
            }
            Ok(())
        })?;
        Ok(count)
    }

    /// Index of the template's key and sort state, created on first use.
    fn template_state(&mut self, template: &TableTemplate) -> usize {
        if let Some(index) = self
            .templates
            .iter()
            .position(|state| state.name == template.name)
        {
            return index;
        }
        let field_types = template.field_types();
        let mut keys = KeyIndexer::new(&template.name, &template.keys, &mut self.registry);
        keys.set_field_types(&field_types);
        let sort = SortValidator::new(
            &template.name,
            template.keys.sort_key(),
            &field_types,
            self.metadata.namespaces(),
        );
        self.templates.push(TemplateState {
            name: template.name.clone(),
            keys,
            sort,
        });
        self.templates.len() - 1
    }

    fn check_table_counts(&self, sink: &mut dyn IssueSink) {
        for template in self.metadata.table_templates() {
            let Some(bounds) = template.table_constraints else {
                continue;
            };
            let count = self.table_counts.get(&template.name).copied().unwrap_or(0);
            if let Some(min) = bounds.min_tables
                && count < min
            {
                sink.report(
                    Issue::error(
                        Code::MinTablesViolation,
                        format!(
                            "Template '{}' requires at least {min} table(s), but only {count} found",
                            template.name
                        ),
                    )
                    .with_template(&template.name),
                );
            }
            if let Some(max) = bounds.max_tables
                && count > max
            {
                sink.report(
                    Issue::error(
                        Code::MaxTablesViolation,
                        format!(
                            "Template '{}' allows at most {max} table(s), but {count} found",
                            template.name
                        ),
                    )
                    .with_template(&template.name),
                );
            }
        }
    }
}

fn violation_issue(violation: Violation, template: &str, table: &str) -> Issue {
    Issue::error(violation.code, violation.message)
        .with_template(template)
        .with_table(table)
}

/// Header order of template-declared columns against the declared order,
/// restricted to columns present in the header.
fn check_column_order(
    table: &TableConfig,
    template: &TableTemplate,
    header: &Header,
    order: &[String],
    sink: &mut dyn IssueSink,
) {
    let found: Vec<&str> = header
        .names()
        .iter()
        .map(String::as_str)
        .filter(|name| template.declares_column(name))
        .collect();
    let expected: Vec<&str> = order
        .iter()
        .map(String::as_str)
        .filter(|name| found.contains(name))
        .collect();
    if found != expected {
        sink.report(
            Issue::error(
                Code::InvalidColumnOrder,
                format!(
                    "Columns in CSV do not match columnOrder constraint for table '{}'. Expected: {expected:?}, Found: {found:?}",
                    table.name
                ),
            )
            .with_template(&template.name)
            .with_table(&table.name),
        );
    }
}

fn check_row_count(
    table: &TableConfig,
    template: &TableTemplate,
    rows: u64,
    sink: &mut dyn IssueSink,
) {
    let Some(bounds) = template.table_constraints else {
        return;
    };
    if let Some(min) = bounds.min_table_rows
        && rows < min
    {
        sink.report(
            Issue::error(
                Code::MinTableRowsViolation,
                format!("Table '{}' has {rows} rows, minimum is {min}", table.name),
            )
            .with_template(&template.name)
            .with_table(&table.name),
        );
    }
    if let Some(max) = bounds.max_table_rows
        && rows > max
    {
        sink.report(
            Issue::error(
                Code::MaxTableRowsViolation,
                format!("Table '{}' has {rows} rows, maximum is {max}", table.name),
            )
            .with_template(&template.name)
            .with_table(&table.name),
        );
    }
}
