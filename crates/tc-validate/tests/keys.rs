//! Unique and reference key tracking across rows, tables and templates.

use serde_json::json;
use tc_model::{Code, Issue, KeysConfig, Row, Severity};
use tc_validate::keys::{KeyIndexer, KeyRegistry};

fn keys(value: serde_json::Value) -> KeysConfig {
    KeysConfig::from_json(&value)
}

fn row(pairs: &[(&str, Option<&str>)]) -> Row {
    Row::from_pairs(pairs.iter().copied())
}

#[test]
fn all_nil_rows_report_a_nil_violation_at_key_severity() {
    let mut registry = KeyRegistry::new();
    let config = keys(json!({"unique": {"name": "pk", "fields": ["a", "b"], "severity": "warning"}}));
    let mut indexer = KeyIndexer::new("T", &config, &mut registry);
    let mut issues: Vec<Issue> = Vec::new();

    indexer.add_row(&row(&[("a", Some("")), ("b", Some("#nil"))]), 1, "t", &mut registry, &mut issues);
    indexer.add_row(&row(&[("a", None), ("b", Some(""))]), 2, "t", &mut registry, &mut issues);

    assert_eq!(issues.len(), 2);
    assert!(issues.iter().all(|issue| issue.code == Code::UniqueKeyNilViolation));
    assert!(issues.iter().all(|issue| issue.severity == Severity::Warning));
    assert_eq!(issues[1].row, Some(2));
    assert_eq!(issues[1].key.as_deref(), Some("pk"));
    // nil rows never enter the value set
    assert_eq!(registry.len("pk"), 0);
}

#[test]
fn partially_nil_keys_still_collide() {
    let mut registry = KeyRegistry::new();
    let config = keys(json!({"unique": {"name": "pk", "fields": ["a", "b"]}}));
    let mut indexer = KeyIndexer::new("T", &config, &mut registry);
    let mut issues: Vec<Issue> = Vec::new();

    for number in 1..=2 {
        indexer.add_row(&row(&[("a", Some("1")), ("b", None)]), number, "t", &mut registry, &mut issues);
    }

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, Code::UniqueKeyViolation);
    assert_eq!(issues[0].severity, Severity::Error);
    insta::assert_snapshot!(
        issues[0].message,
        @r#"Duplicate unique key 'pk' in table 't' row 2: ("1", null)"#
    );
}

#[test]
fn key_values_are_compared_as_written() {
    let mut registry = KeyRegistry::new();
    let config = keys(json!({"unique": {"name": "pk", "fields": ["a"]}}));
    let mut indexer = KeyIndexer::new("T", &config, &mut registry);
    let mut issues: Vec<Issue> = Vec::new();

    indexer.add_row(&row(&[("a", Some("1"))]), 1, "t", &mut registry, &mut issues);
    indexer.add_row(&row(&[("a", Some("1.0"))]), 2, "t", &mut registry, &mut issues);
    assert!(issues.is_empty());
    assert_eq!(registry.len("pk"), 2);
}

#[test]
fn templates_sharing_a_key_name_share_its_values() {
    let mut registry = KeyRegistry::new();
    let config = keys(json!({"unique": {"name": "id", "fields": ["a"]}}));
    let mut first = KeyIndexer::new("A", &config, &mut registry);
    let mut second = KeyIndexer::new("B", &config, &mut registry);
    let mut issues: Vec<Issue> = Vec::new();

    first.add_row(&row(&[("a", Some("x"))]), 1, "a1", &mut registry, &mut issues);
    second.add_row(&row(&[("a", Some("y"))]), 1, "b1", &mut registry, &mut issues);
    second.add_row(&row(&[("a", Some("x"))]), 2, "b1", &mut registry, &mut issues);

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].template.as_deref(), Some("B"));
    assert_eq!(issues[0].table.as_deref(), Some("b1"));
    assert_eq!(registry.len("id"), 2);
}

#[test]
fn references_resolve_after_every_table_was_read() {
    let mut registry = KeyRegistry::new();
    let target = keys(json!({"unique": {"name": "id", "fields": ["a"]}}));
    let source = keys(json!({"reference": {"name": "fk", "fields": ["x"], "referencedKeyName": "id"}}));
    let mut owner = KeyIndexer::new("A", &target, &mut registry);
    let mut referrer = KeyIndexer::new("B", &source, &mut registry);
    let mut issues: Vec<Issue> = Vec::new();

    // referring rows arrive before the values they point at
    referrer.add_row(&row(&[("x", Some("1"))]), 1, "b1", &mut registry, &mut issues);
    referrer.add_row(&row(&[("x", Some("3"))]), 2, "b1", &mut registry, &mut issues);
    owner.add_row(&row(&[("a", Some("1"))]), 1, "a1", &mut registry, &mut issues);
    owner.add_row(&row(&[("a", Some("2"))]), 2, "a1", &mut registry, &mut issues);
    assert!(issues.is_empty());
    assert_eq!(referrer.staged_references(), 2);

    referrer.finalize(&registry, &mut issues);
    assert_eq!(referrer.staged_references(), 0);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, Code::ReferenceKeyViolation);
    insta::assert_snapshot!(
        issues[0].message,
        @r#"Reference key violation for 'fk' in table 'b1' row 2: ("3")"#
    );
}

#[test]
fn negated_references_must_not_exist() {
    let mut registry = KeyRegistry::new();
    let target = keys(json!({"unique": {"name": "id", "fields": ["a"]}}));
    let source = keys(json!({"reference": {
        "name": "notId", "fields": ["x"], "referencedKeyName": "id", "negate": true, "severity": "warning"
    }}));
    let mut owner = KeyIndexer::new("A", &target, &mut registry);
    let mut referrer = KeyIndexer::new("B", &source, &mut registry);
    let mut issues: Vec<Issue> = Vec::new();

    owner.add_row(&row(&[("a", Some("1"))]), 1, "a1", &mut registry, &mut issues);
    referrer.add_row(&row(&[("x", Some("1"))]), 1, "b1", &mut registry, &mut issues);
    referrer.add_row(&row(&[("x", Some("9"))]), 2, "b1", &mut registry, &mut issues);
    referrer.finalize(&registry, &mut issues);

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].row, Some(1));
    assert_eq!(issues[0].severity, Severity::Warning);
}

#[test]
fn skip_nils_drops_rows_with_any_nil_field() {
    let mut registry = KeyRegistry::new();
    let target = keys(json!({"unique": {"name": "id", "fields": ["a", "b"]}}));
    let skipping = keys(json!({"reference": {
        "name": "fk", "fields": ["x", "y"], "referencedKeyName": "id", "skipNils": true
    }}));
    let strict = keys(json!({"reference": {
        "name": "fk", "fields": ["x", "y"], "referencedKeyName": "id"
    }}));
    let mut owner = KeyIndexer::new("A", &target, &mut registry);
    let mut lenient = KeyIndexer::new("B", &skipping, &mut registry);
    let mut checked = KeyIndexer::new("C", &strict, &mut registry);
    let mut issues: Vec<Issue> = Vec::new();

    owner.add_row(&row(&[("a", Some("1")), ("b", Some("2"))]), 1, "a1", &mut registry, &mut issues);
    let partial = row(&[("x", Some("1")), ("y", Some("#nil"))]);
    lenient.add_row(&partial, 1, "b1", &mut registry, &mut issues);
    checked.add_row(&partial, 1, "c1", &mut registry, &mut issues);
    assert_eq!(lenient.staged_references(), 0);
    assert_eq!(checked.staged_references(), 1);

    lenient.finalize(&registry, &mut issues);
    checked.finalize(&registry, &mut issues);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].template.as_deref(), Some("C"));
}

#[test]
fn references_to_keys_without_values_are_skipped() {
    let mut registry = KeyRegistry::new();
    let source = keys(json!({"reference": {"name": "fk", "fields": ["x"], "referencedKeyName": "missing"}}));
    let mut referrer = KeyIndexer::new("B", &source, &mut registry);
    let mut issues: Vec<Issue> = Vec::new();

    referrer.add_row(&row(&[("x", Some("1"))]), 1, "b1", &mut registry, &mut issues);
    referrer.finalize(&registry, &mut issues);
    assert!(issues.is_empty());
    assert!(registry.is_empty());
}
