//! End-to-end runs over schemas and CSV files on disk.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, json};
use tc_ingest::FsSource;
use tc_model::names::XSD_NAMESPACE;
use tc_model::{Code, Issue, TableStatus, ValidationOptions, ValidationReport};
use tc_validate::{Progress, ValidationError, Validator};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dir");
    }
    fs::write(&path, contents).expect("write file");
    path
}

fn schema(templates: Value, tables: Value) -> String {
    json!({
        "documentInfo": {
            "documentType": "https://xbrl.org/2021/xbrl-csv",
            "namespaces": {"xs": XSD_NAMESPACE, "tc": "https://xbrl.org/2025/tc"}
        },
        "tableTemplates": templates,
        "tables": tables
    })
    .to_string()
}

fn validate(schema: &Path, options: ValidationOptions) -> ValidationReport {
    Validator::new(&FsSource)
        .with_options(options)
        .validate(schema)
        .expect("run completes")
}

fn counted_rows_schema() -> String {
    schema(
        json!({"T": {
            "columns": {"a": {"tc:constraints": {"type": "xs:integer"}}},
            "tc:tableConstraints": {"minTableRows": 3}
        }}),
        json!({"t": {"template": "T", "url": "t.csv"}}),
    )
}

#[test]
fn row_counts_are_checked_per_table() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(dir.path(), "meta.json", &counted_rows_schema());

    write(dir.path(), "t.csv", "a\n1\n2\n");
    let report = validate(&path, ValidationOptions::default());
    assert_eq!(report.count(Code::MinTableRowsViolation), 1);
    assert_eq!(report.tables[0].rows, 2);

    write(dir.path(), "t.csv", "a\n1\n2\n3\n");
    let report = validate(&path, ValidationOptions::default());
    assert_eq!(report.count(Code::MinTableRowsViolation), 0);
    assert!(!report.has_errors());
}

#[test]
fn declared_columns_must_follow_the_column_order() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "meta.json",
        &schema(
            json!({"T": {
                "columns": {
                    "A": {"tc:constraints": {"type": "xs:string"}},
                    "B": {"tc:constraints": {"type": "xs:string"}},
                    "C": {"tc:constraints": {"type": "xs:string"}}
                },
                "tc:columnOrder": ["A", "B", "C"]
            }}),
            json!({"t": {"template": "T", "url": "t.csv"}}),
        ),
    );

    write(dir.path(), "t.csv", "B,A,C\nb,a,c\n");
    let report = validate(&path, ValidationOptions::default());
    let issues: Vec<&Issue> = report.issues_with(Code::InvalidColumnOrder).collect();
    assert_eq!(issues.len(), 1);
    insta::assert_snapshot!(
        issues[0].message,
        @r#"Columns in CSV do not match columnOrder constraint for table 't'. Expected: ["A", "B", "C"], Found: ["B", "A", "C"]"#
    );

    // undeclared columns are ignored
    write(dir.path(), "t.csv", "A,B,C,D\na,b,c,d\n");
    let report = validate(&path, ValidationOptions::default());
    assert_eq!(report.count(Code::InvalidColumnOrder), 0);
}

#[test]
fn missing_csv_is_a_warning() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(dir.path(), "meta.json", &counted_rows_schema());

    let report = validate(&path, ValidationOptions::default());
    assert_eq!(report.error_count, 0);
    assert_eq!(report.warning_count, 1);
    assert_eq!(report.count(Code::MissingCsv), 1);
    assert_eq!(report.tables[0].status, TableStatus::MissingCsv);
    // no row-count check without data
    assert_eq!(report.count(Code::MinTableRowsViolation), 0);
}

#[test]
fn report_serializes_issues_and_tallies() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "meta.json",
        &schema(
            json!({"T": {"columns": {"a": {"tc:constraints": {"type": "xs:string", "allowedValues": ["x", "y"]}}}}}),
            json!({"t": {"template": "T", "url": "t.csv"}}),
        ),
    );
    write(dir.path(), "t.csv", "a\nx\nz\n");

    let mut report = validate(&path, ValidationOptions::default());
    assert!(report.schema.is_some());
    report.schema = None;
    for table in &mut report.tables {
        table.source = None;
    }
    insta::assert_json_snapshot!(report, @r#"
    {
      "metadata_validated": false,
      "tables_validated": true,
      "tables": [
        {
          "name": "t",
          "template": "T",
          "rows": 2,
          "status": "validated"
        }
      ],
      "issues": [
        {
          "code": "tcre:invalidValue",
          "severity": "error",
          "message": "Value 'z' not in allowed values (table:t, column:a, row:2)",
          "template": "T",
          "table": "t",
          "row": 2,
          "field": "a"
        }
      ],
      "error_count": 1,
      "warning_count": 0,
      "code_counts": {
        "tcre:invalidValue": {
          "errors": 1,
          "warnings": 0
        }
      },
      "suppressed": 0
    }
    "#);
}

#[test]
fn references_resolve_across_tables_in_any_order() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "meta.json",
        &schema(
            json!({
                "facts": {
                    "columns": {"entity": {"tc:constraints": {"type": "xs:string"}}},
                    "tc:keys": {"reference": {"name": "entityRef", "fields": ["entity"], "referencedKeyName": "entityId"}}
                },
                "entities": {
                    "columns": {"code": {"tc:constraints": {"type": "xs:string"}}},
                    "tc:keys": {"unique": {"name": "entityId", "fields": ["code"]}}
                }
            }),
            json!({
                "facts": {"url": "facts.csv"},
                "entities": {"url": "entities.csv"}
            }),
        ),
    );
    write(dir.path(), "facts.csv", "entity\nE1\nE9\n");
    write(dir.path(), "entities.csv", "code\nE1\nE2\n");

    let report = validate(&path, ValidationOptions::strict());
    assert_eq!(report.error_count, 1);
    let violation = report
        .issues_with(Code::ReferenceKeyViolation)
        .next()
        .expect("reference violation");
    assert_eq!(violation.table.as_deref(), Some("facts"));
    assert_eq!(violation.row, Some(2));
}

#[test]
fn table_parameters_take_part_in_keys() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "meta.json",
        &schema(
            json!({"facts": {
                "columns": {"entity": {"tc:constraints": {"type": "xs:string"}}},
                "tc:parameters": {"period": {"type": "period"}},
                "tc:keys": {"unique": {"name": "factKey", "fields": ["entity", "period"]}}
            }}),
            json!({
                "facts2020": {"template": "facts", "url": "a.csv", "parameters": {"period": "2020"}},
                "facts2021": {"template": "facts", "url": "b.csv", "parameters": {"period": "2021"}},
                "again2021": {"template": "facts", "url": "c.csv", "parameters": {"period": "2021"}}
            }),
        ),
    );
    for name in ["a.csv", "b.csv", "c.csv"] {
        write(dir.path(), name, "entity\nE1\n");
    }

    let report = validate(&path, ValidationOptions::default());
    let duplicates: Vec<&Issue> = report.issues_with(Code::UniqueKeyViolation).collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].table.as_deref(), Some("again2021"));
}

#[test]
fn missing_table_parameters_are_reported() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "meta.json",
        &schema(
            json!({"T": {"tc:parameters": {"period": {"type": "period"}}}}),
            json!({"t": {"template": "T", "url": "t.csv"}}),
        ),
    );
    write(dir.path(), "t.csv", "a\n1\n");

    let report = validate(&path, ValidationOptions::default());
    let missing: Vec<&Issue> = report.issues_with(Code::MissingValue).collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].message, "Required value is missing: table:t, parameter:period");
    assert_eq!(missing[0].field.as_deref(), Some("period"));
}

#[test]
fn table_counts_include_tables_without_data() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "meta.json",
        &schema(
            json!({
                "Once": {"tc:tableConstraints": {"maxTables": 1}},
                "Needed": {"tc:tableConstraints": {"minTables": 1}}
            }),
            json!({
                "first": {"template": "Once"},
                "second": {"template": "Once", "url": "absent.csv"}
            }),
        ),
    );

    let report = validate(&path, ValidationOptions::default());
    assert_eq!(report.count(Code::MaxTablesViolation), 1);
    assert_eq!(report.count(Code::MinTablesViolation), 1);
    assert_eq!(report.tables[0].status, TableStatus::NoUrl);
    assert_eq!(report.tables[1].status, TableStatus::MissingCsv);
}

#[test]
fn templates_from_extended_documents_apply() {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "base/templates.json",
        &schema(
            json!({"T": {"columns": {"n": {"tc:constraints": {"type": "xs:integer"}}}}}),
            json!({}),
        ),
    );
    let path = write(
        dir.path(),
        "report/meta.json",
        &json!({
            "documentInfo": {"extends": ["../base/templates.json"]},
            "tables": {"t": {"template": "T", "url": "t.csv"}}
        })
        .to_string(),
    );
    write(dir.path(), "report/t.csv", "n\n1\nfive\n");

    let report = validate(&path, ValidationOptions::default());
    assert_eq!(report.count(Code::InvalidValue), 1);
    assert_eq!(report.issues[0].row, Some(2));
}

#[test]
fn schema_errors_stop_the_run_unless_forced() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "meta.json",
        &schema(
            json!({"T": {"columns": {"a": {"tc:constraints": {"type": "xs:bogus"}}}}}),
            json!({"t": {"template": "T", "url": "t.csv"}}),
        ),
    );
    write(dir.path(), "t.csv", "a\n1\n");

    let report = validate(&path, ValidationOptions::strict());
    assert!(report.metadata_validated);
    assert!(!report.tables_validated);
    assert!(report.tables.is_empty());
    assert_eq!(report.count(Code::InvalidTypeConstraint), 1);

    let forced = validate(&path, ValidationOptions::strict().with_force_load(true));
    assert!(forced.tables_validated);
    assert_eq!(forced.tables.len(), 1);
    // the undeclared type is also reported for the cell
    assert_eq!(forced.count(Code::InvalidValue), 1);
}

#[test]
fn unreadable_schema_aborts_with_validation_failed() {
    let dir = TempDir::new().expect("temp dir");
    let mut issues: Vec<Issue> = Vec::new();
    let error = Validator::new(&FsSource)
        .run(&dir.path().join("missing.json"), &mut issues)
        .unwrap_err();

    assert!(matches!(error, ValidationError::Load { .. }));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, Code::ValidationFailed);
    assert!(
        issues[0]
            .message
            .starts_with("Table Constraints validation failed:")
    );
}

#[test]
fn repeated_runs_report_the_same_issues() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "meta.json",
        &schema(
            json!({"T": {
                "columns": {"id": {"tc:constraints": {"type": "xs:integer"}}},
                "tc:keys": {"unique": {"name": "pk", "fields": ["id"]}, "sortKey": "pk"}
            }}),
            json!({"t": {"template": "T", "url": "t.csv"}}),
        ),
    );
    write(dir.path(), "t.csv", "id\n3\n1\n1\nx\n");

    let first = validate(&path, ValidationOptions::default());
    let second = validate(&path, ValidationOptions::default());
    assert!(first.error_count > 0);
    assert_eq!(first.issues, second.issues);
    assert_eq!(first.code_counts, second.code_counts);
}

#[test]
fn issue_limit_keeps_counts_complete() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(
        dir.path(),
        "meta.json",
        &schema(
            json!({"T": {"columns": {"n": {"tc:constraints": {"type": "xs:integer"}}}}}),
            json!({"t": {"template": "T", "url": "t.csv"}}),
        ),
    );
    write(dir.path(), "t.csv", "n\na\nb\nc\nd\ne\n");

    let report = validate(
        &path,
        ValidationOptions::default().with_max_issues_per_code(Some(2)),
    );
    assert_eq!(report.issues.len(), 2);
    assert_eq!(report.count(Code::InvalidValue), 5);
    assert_eq!(report.error_count, 5);
    assert_eq!(report.suppressed, 3);
}

#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<String>>,
}

impl Progress for Recorder {
    fn status(&self, message: &str) {
        self.events.borrow_mut().push(message.to_string());
    }

    fn finished(&self, summary: &str) {
        self.events.borrow_mut().push(format!("done: {summary}"));
    }
}

#[test]
fn progress_follows_the_run() {
    let dir = TempDir::new().expect("temp dir");
    let path = write(dir.path(), "meta.json", &counted_rows_schema());
    write(dir.path(), "t.csv", "a\n1\n");

    let recorder = Recorder::default();
    Validator::new(&FsSource)
        .with_progress(&recorder)
        .validate(&path)
        .expect("run completes");
    insta::assert_snapshot!(recorder.events.borrow().join("\n"), @r"
    Loading metadata...
    Validating table: t
    Validating table/row counts...
    Finalizing key validation...
    done: Table Constraints validation complete: 1 errors, 0 warnings
    ");
}
