//! Taxonomy linter findings.

use std::fs;

use serde_json::{Value, json};
use tc_ingest::FsSource;
use tc_model::names::XSD_NAMESPACE;
use tc_model::{Code, Issue, Metadata, Severity, ValidationOptions};
use tc_validate::lint::lint;
use tc_validate::{ExpandedName, StaticCatalog, Validator};
use tempfile::TempDir;

const TAXONOMY: &str = "http://example.com/t";

fn catalog() -> StaticCatalog {
    serde_json::from_value(json!({
        "concepts": {
            "{http://example.com/t}Assets": "{http://example.com/t}monetary",
            "{http://example.com/t}Count": "{http://www.w3.org/2001/XMLSchema}integer"
        },
        "typedDimensions": {
            "{http://example.com/t}Region": "{http://example.com/t}regionCode"
        },
        "types": {
            "{http://example.com/t}monetary": "{http://www.w3.org/2001/XMLSchema}decimal",
            "{http://example.com/t}regionCode": "{http://www.w3.org/2001/XMLSchema}token"
        }
    }))
    .expect("catalog document")
}

fn document(columns: Value) -> Value {
    json!({
        "documentInfo": {"namespaces": {"xs": XSD_NAMESPACE, "eg": TAXONOMY}},
        "tableTemplates": {"T": {"columns": columns}}
    })
}

fn lint_columns(columns: Value) -> Vec<Issue> {
    let metadata = Metadata::from_document(document(columns), None).expect("schema object");
    let mut issues = Vec::new();
    let warnings = lint(&metadata, &catalog(), &mut issues);
    assert_eq!(warnings, issues.len());
    issues
}

#[test]
fn catalogue_names_use_clark_notation() {
    let catalog = catalog();
    assert_eq!(catalog.concepts.len(), 2);
    assert!(catalog.typed_dimensions.contains_key(&ExpandedName::new(TAXONOMY, "Region")));
    assert!(serde_json::from_value::<StaticCatalog>(json!({"concepts": {"Assets": "x"}})).is_err());
}

#[test]
fn matching_types_are_silent() {
    let issues = lint_columns(json!({
        "count": {
            "dimensions": {"concept": "eg:Count"},
            "tc:constraints": {"type": "xs:integer", "allowedValues": ["1", "2"]}
        },
        "region": {
            "dimensions": {"concept": "eg:Unknown", "eg:Region": "x"},
            "tc:constraints": {"type": "eg:regionCode"}
        },
        "free": {"tc:constraints": {"type": "xs:string"}}
    }));
    assert!(issues.is_empty(), "{issues:?}");
}

#[test]
fn conflicting_constraints_are_warnings() {
    let issues = lint_columns(json!({
        "amount": {
            "dimensions": {"concept": "eg:Assets"},
            "tc:constraints": {"type": "xs:string", "allowedValues": ["12.5", "lots"]}
        }
    }));
    let codes: Vec<Code> = issues.iter().map(|issue| issue.code).collect();
    assert_eq!(
        codes,
        [Code::LintInconsistentType, Code::LintInvalidAllowedValue]
    );
    assert!(issues.iter().all(|issue| issue.severity == Severity::Warning));
    assert_eq!(issues[0].field.as_deref(), Some("amount"));
    insta::assert_snapshot!(
        issues[0].message,
        @"Constraint type 'xs:string' may not be consistent with taxonomy type '{http://example.com/t}monetary' at template:T, column:amount"
    );
    assert!(issues[1].message.starts_with("Allowed value 'lots' may not be valid"));
}

#[test]
fn typed_dimensions_supply_the_type_without_a_concept() {
    let issues = lint_columns(json!({
        "region": {
            "dimensions": {"eg:Region": "x"},
            "tc:constraints": {"type": "xs:integer"}
        }
    }));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, Code::LintInconsistentType);
}

#[test]
fn runs_lint_only_when_enabled_with_a_catalogue() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("meta.json");
    let schema = document(json!({
        "amount": {
            "dimensions": {"concept": "eg:Assets"},
            "tc:constraints": {"type": "xs:string"}
        }
    }));
    fs::write(&path, schema.to_string()).expect("write schema");
    let catalog = catalog();

    let linted = Validator::new(&FsSource)
        .with_options(ValidationOptions::default().with_lint(true))
        .with_catalog(&catalog)
        .validate(&path)
        .expect("run completes");
    assert_eq!(linted.count(Code::LintInconsistentType), 1);
    assert_eq!(linted.warning_count, 1);
    assert_eq!(linted.error_count, 0);

    let plain = Validator::new(&FsSource)
        .with_catalog(&catalog)
        .validate(&path)
        .expect("run completes");
    assert_eq!(plain.count(Code::LintInconsistentType), 0);
}
