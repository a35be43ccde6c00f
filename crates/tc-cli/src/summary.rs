//! Terminal tables for a finished run.

use std::collections::HashMap;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use tc_model::{Category, Code, Issue, Severity, TableStatus, ValidationReport};

pub fn print_summary(report: &ValidationReport) {
    if let Some(schema) = &report.schema {
        println!("Metadata: {schema}");
    }
    if !report.tables_validated {
        println!("Tables were not read: the metadata has structural errors (use --force-load).");
    }
    if !report.tables.is_empty() {
        println!("{}", table_summary(report));
    }
    if let Some(table) = issue_table(report) {
        println!();
        println!("Issues:");
        println!("{table}");
    }
    if report.suppressed > 0 {
        println!("{} more issue(s) counted but not listed", report.suppressed);
    }
    println!(
        "Table Constraints validation complete: {} errors, {} warnings",
        report.error_count, report.warning_count
    );
}

/// One row per declared table, with the issues listed for it.
pub fn table_summary(report: &ValidationReport) -> Table {
    let mut per_table: HashMap<&str, (usize, usize)> = HashMap::new();
    for issue in &report.issues {
        let Some(table) = issue.table.as_deref() else {
            continue;
        };
        let counts = per_table.entry(table).or_default();
        match issue.severity {
            Severity::Error => counts.0 += 1,
            Severity::Warning => counts.1 += 1,
        }
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Template"),
        header_cell("Rows"),
        header_cell("Status"),
        header_cell("Errors"),
        header_cell("Warnings"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);

    for summary in &report.tables {
        let (errors, warnings) = per_table
            .get(summary.name.as_str())
            .copied()
            .unwrap_or_default();
        table.add_row(vec![
            Cell::new(&summary.name).fg(Color::Cyan),
            Cell::new(&summary.template),
            Cell::new(summary.rows),
            status_cell(summary.status),
            count_cell(errors, Color::Red),
            count_cell(warnings, Color::Yellow),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(report.total_rows()).add_attribute(Attribute::Bold),
        dim_cell("-"),
        count_cell(report.error_count, Color::Red).add_attribute(Attribute::Bold),
        count_cell(report.warning_count, Color::Yellow).add_attribute(Attribute::Bold),
    ]);
    table
}

/// Listed issues, errors first; `None` when there are none.
pub fn issue_table(report: &ValidationReport) -> Option<Table> {
    if report.issues.is_empty() {
        return None;
    }
    let mut issues: Vec<&Issue> = report.issues.iter().collect();
    issues.sort_by_key(|issue| issue.severity);

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Code"),
        header_cell("Table"),
        header_cell("Row"),
        header_cell("Field"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);
    for issue in issues {
        table.add_row(vec![
            severity_cell(issue.severity),
            Cell::new(issue.code.as_str()),
            optional_cell(issue.table.as_deref()),
            issue.row.map_or_else(|| dim_cell("-"), Cell::new),
            optional_cell(issue.field.as_deref().or(issue.key.as_deref())),
            Cell::new(&issue.message),
        ]);
    }
    Some(table)
}

/// Every issue code with its category.
pub fn codes_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Code"), header_cell("Category")]);
    apply_table_style(&mut table);
    for code in Code::ALL {
        table.add_row(vec![
            Cell::new(code.as_str()),
            Cell::new(category_label(code.category())),
        ]);
    }
    table
}

pub fn category_label(category: Category) -> &'static str {
    match category {
        Category::Metadata => "metadata",
        Category::Report => "report",
        Category::Lint => "lint",
        Category::Processing => "processing",
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}

fn optional_cell(value: Option<&str>) -> Cell {
    value.map_or_else(|| dim_cell("-"), Cell::new)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new(severity.label()).fg(Color::Red),
        Severity::Warning => Cell::new(severity.label()).fg(Color::Yellow),
    }
}

fn status_cell(status: TableStatus) -> Cell {
    match status {
        TableStatus::Validated => Cell::new(status.label()).fg(Color::Green),
        TableStatus::NoUrl => dim_cell(status.label()),
        TableStatus::MissingCsv => Cell::new(status.label()).fg(Color::Yellow),
    }
}
