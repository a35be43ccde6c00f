//! Rendered summary tables and the progress spinner.

use tc_cli::progress::Spinner;
use tc_cli::summary::{codes_table, issue_table, table_summary};
use tc_model::{Code, Issue, TableStatus, TableSummary, ValidationReport};
use tc_validate::Progress;

fn report() -> ValidationReport {
    let mut report = ValidationReport {
        tables_validated: true,
        tables: vec![
            TableSummary {
                name: "facts".into(),
                template: "facts".into(),
                source: Some("facts.csv".into()),
                rows: 12,
                status: TableStatus::Validated,
            },
            TableSummary {
                name: "notes".into(),
                template: "notes".into(),
                source: None,
                rows: 0,
                status: TableStatus::NoUrl,
            },
        ],
        ..ValidationReport::default()
    };
    for issue in [
        Issue::warning(Code::MissingCsv, "CSV file not found: other.csv").with_table("other"),
        Issue::error(Code::InvalidValue, "Value 'z' not in allowed values")
            .with_table("facts")
            .with_row(3)
            .with_field("a"),
    ] {
        report.tally(issue.code, issue.severity, None);
        report.issues.push(issue);
    }
    report
}

#[test]
fn table_summary_lists_each_table_and_totals() {
    let rendered = table_summary(&report()).to_string();
    for expected in ["facts", "notes", "validated", "no url", "TOTAL", "12"] {
        assert!(rendered.contains(expected), "missing {expected}:\n{rendered}");
    }
}

#[test]
fn issue_table_lists_errors_first() {
    let rendered = issue_table(&report()).expect("issues").to_string();
    let error = rendered.find("tcre:invalidValue").expect("error row");
    let warning = rendered.find("tc:missingCsv").expect("warning row");
    assert!(error < warning);
    assert!(issue_table(&ValidationReport::default()).is_none());
}

#[test]
fn codes_table_has_every_code() {
    let rendered = codes_table().to_string();
    assert!(
        Code::ALL
            .iter()
            .all(|code| rendered.contains(code.as_str()))
    );
}

#[test]
fn spinner_shows_the_latest_status() {
    let spinner = Spinner::hidden();
    spinner.status("Loading metadata...");
    assert_eq!(spinner.message(), "Loading metadata...");
    spinner.rows("facts", 20_000);
    assert_eq!(spinner.message(), "Validating table: facts (20000 rows)");
    spinner.finished("done");
    assert!(spinner.is_finished());
}
