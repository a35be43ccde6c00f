//! Schema loading and `extends` merging.

use std::fs;
use std::path::{Path, PathBuf};

use tc_ingest::{FsSource, IngestError, has_table_constraints, load_metadata};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create dir");
    }
    fs::write(&path, contents).expect("write file");
    path
}

fn template_names(metadata: &tc_model::Metadata) -> Vec<String> {
    metadata
        .table_templates()
        .iter()
        .map(|template| template.name.clone())
        .collect()
}

#[test]
fn extended_templates_are_merged() {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "base.json",
        r#"{"documentInfo": {"namespaces": {"eg": "http://example.com/base"}},
            "tableTemplates": {"T1": {"columns": {"a": {}}}}}"#,
    );
    let child = write(
        dir.path(),
        "child.json",
        r#"{"documentInfo": {"extends": ["base.json"], "namespaces": {"xs": "http://www.w3.org/2001/XMLSchema"}},
            "tableTemplates": {"T2": {"columns": {"b": {}}}}}"#,
    );

    let metadata = load_metadata(&child, &FsSource).expect("load");
    assert_eq!(template_names(&metadata), ["T2", "T1"]);
    assert_eq!(metadata.namespaces().resolve("eg"), Some("http://example.com/base"));
    assert_eq!(
        metadata.namespaces().resolve("xs"),
        Some("http://www.w3.org/2001/XMLSchema")
    );
}

#[test]
fn extends_resolve_relative_to_each_document_and_recurse() {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "shared/root.json",
        r#"{"tableTemplates": {"R": {}}}"#,
    );
    write(
        dir.path(),
        "shared/middle.json",
        r#"{"documentInfo": {"extends": ["./root.json"]}, "tableTemplates": {"M": {}}}"#,
    );
    let top = write(
        dir.path(),
        "reports/top.json",
        r#"{"documentInfo": {"extends": ["../shared/middle.json"]}, "tableTemplates": {"T": {}}}"#,
    );

    let metadata = load_metadata(&top, &FsSource).expect("load");
    let mut names = template_names(&metadata);
    names.sort();
    assert_eq!(names, ["M", "R", "T"]);
}

#[test]
fn extended_templates_replace_same_named_templates() {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "base.json",
        r#"{"tableTemplates": {"T": {"columns": {"from_base": {}}}}}"#,
    );
    let child = write(
        dir.path(),
        "child.json",
        r#"{"documentInfo": {"extends": ["base.json"]},
            "tableTemplates": {"T": {"columns": {"from_child": {}}}}}"#,
    );

    let metadata = load_metadata(&child, &FsSource).expect("load");
    let template = metadata.template("T").expect("T");
    assert!(template.declares_column("from_base"));
    assert!(!template.declares_column("from_child"));
}

#[test]
fn cyclic_extends_terminate() {
    let dir = TempDir::new().expect("temp dir");
    write(
        dir.path(),
        "a.json",
        r#"{"documentInfo": {"extends": ["b.json"]}, "tableTemplates": {"A": {}}}"#,
    );
    write(
        dir.path(),
        "b.json",
        r#"{"documentInfo": {"extends": ["a.json"]}, "tableTemplates": {"B": {}}}"#,
    );

    let metadata = load_metadata(&dir.path().join("a.json"), &FsSource).expect("load");
    let mut names = template_names(&metadata);
    names.sort();
    assert_eq!(names, ["A", "B"]);
}

#[test]
fn missing_extended_documents_are_skipped() {
    let dir = TempDir::new().expect("temp dir");
    let child = write(
        dir.path(),
        "child.json",
        r#"{"documentInfo": {"extends": ["absent.json"]}, "tableTemplates": {"T": {}}}"#,
    );
    let metadata = load_metadata(&child, &FsSource).expect("load");
    assert_eq!(template_names(&metadata), ["T"]);
}

#[test]
fn load_failures_are_typed() {
    let dir = TempDir::new().expect("temp dir");

    let missing = load_metadata(&dir.path().join("nope.json"), &FsSource).expect_err("missing");
    assert!(missing.is_not_found());

    let broken = write(dir.path(), "broken.json", "{\"tableTemplates\": ");
    let error = load_metadata(&broken, &FsSource).expect_err("broken");
    assert!(matches!(error, IngestError::Json { .. }));

    let array = write(dir.path(), "array.json", "[]");
    let error = load_metadata(&array, &FsSource).expect_err("array");
    assert!(matches!(error, IngestError::Schema { .. }));
}

#[test]
fn detects_table_constraints_usage() {
    let dir = TempDir::new().expect("temp dir");
    let plain = write(
        dir.path(),
        "plain.json",
        r#"{"documentInfo": {"documentType": "https://xbrl.org/2021/xbrl-csv"}, "tableTemplates": {}}"#,
    );
    assert!(!has_table_constraints(&plain, &FsSource));

    let direct = write(
        dir.path(),
        "direct.json",
        r#"{"tableTemplates": {"T": {"tc:keys": {}}}}"#,
    );
    assert!(has_table_constraints(&direct, &FsSource));

    write(
        dir.path(),
        "base.json",
        r#"{"tableTemplates": {"T": {"tc:columnOrder": []}}}"#,
    );
    let extending = write(
        dir.path(),
        "extending.json",
        r#"{"documentInfo": {"documentType": "https://xbrl.org/2021/xbrl-csv", "extends": ["base.json"]}}"#,
    );
    assert!(has_table_constraints(&extending, &FsSource));

    assert!(!has_table_constraints(&dir.path().join("absent.json"), &FsSource));
}
