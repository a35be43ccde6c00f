//! Structural validation of the schema document (`tcme:*`).
//!
//! Every offense is reported as an error and checking continues; a few
//! malformed shapes stop the check of the object they occur in.

mod constraints;
mod keys;
mod placement;

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use tc_model::metadata::key_objects;
use tc_model::names::{self, key as kn, table_constraint as tn};
use tc_model::{Code, Issue, Metadata, UniqueKey};

use crate::sink::IssueSink;
use crate::types;

static TC_NAMESPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https://xbrl\.org/((CR|PWD|REC|PR)-\d{4}-\d{2}-\d{2}|\d{4})/tc$")
        .expect("Invalid TC namespace regex")
});

/// Run every structural check and return the number of errors found.
pub fn validate_metadata(metadata: &Metadata, sink: &mut dyn IssueSink) -> usize {
    MetadataValidator::new(metadata, sink).run()
}

/// Walks the raw document and the typed views of one schema.
pub struct MetadataValidator<'a> {
    metadata: &'a Metadata,
    sink: &'a mut dyn IssueSink,
    /// Template the checks are currently inside, attached to issues.
    template: Option<String>,
    errors: usize,
}

impl<'a> MetadataValidator<'a> {
    pub fn new(metadata: &'a Metadata, sink: &'a mut dyn IssueSink) -> Self {
        Self {
            metadata,
            sink,
            template: None,
            errors: 0,
        }
    }

    pub fn run(mut self) -> usize {
        let metadata = self.metadata;
        self.check_namespaces();
        if let Some(root) = metadata.document().as_object() {
            self.check_placement(root);
        }
        self.check_referenced_key_names();

        match metadata.document().get(names::TABLE_TEMPLATES) {
            None => {}
            Some(Value::Object(templates)) => {
                for (name, template) in templates {
                    self.template = Some(name.clone());
                    self.check_template(name, template);
                }
                self.template = None;
            }
            Some(_) => self.error(
                Code::InvalidJsonStructure,
                "'tableTemplates' must be an object",
            ),
        }

        self.check_shared_keys();
        self.check_referenced_field_types();
        tracing::debug!(errors = self.errors, "metadata validation finished");
        self.errors
    }

    fn error(&mut self, code: Code, message: impl Into<String>) {
        self.errors += 1;
        let mut issue = Issue::error(code, message);
        if let Some(template) = &self.template {
            issue = issue.with_template(template.clone());
        }
        self.sink.report(issue);
    }

    fn check_namespaces(&mut self) {
        let Some(uri) = self.metadata.namespaces().resolve(names::TC_PREFIX) else {
            return;
        };
        if names::TC_NAMESPACES.contains(&uri) || TC_NAMESPACE_PATTERN.is_match(uri) {
            return;
        }
        let message = format!(
            "Namespace prefix '{}' bound to '{uri}', must be a valid TC namespace",
            names::TC_PREFIX
        );
        self.error(Code::InvalidNamespacePrefix, message);
    }

    fn check_template(&mut self, name: &str, template: &Value) {
        let Some(template) = template.as_object() else {
            self.error(
                Code::InvalidJsonStructure,
                format!("Template '{name}' must be an object"),
            );
            return;
        };

        match template.get(names::COLUMNS) {
            None => {}
            Some(Value::Object(columns)) => {
                for (column_name, column) in columns {
                    let Some(constraint) = column.get(names::CONSTRAINTS) else {
                        continue;
                    };
                    if column.get(names::COMMENT) == Some(&Value::Bool(true)) {
                        self.error(
                            Code::InvalidCommentColumnConstraint,
                            format!(
                                "Column '{column_name}' is a comment column and cannot have {}",
                                names::CONSTRAINTS
                            ),
                        );
                        continue;
                    }
                    self.check_constraint(
                        &format!("template:{name}, column:{column_name}"),
                        constraint,
                    );
                }
            }
            Some(_) => self.error(
                Code::InvalidJsonStructure,
                format!("'columns' must be an object in template '{name}'"),
            ),
        }

        match template.get(names::PARAMETERS) {
            None => {}
            Some(Value::Object(parameters)) => {
                for (parameter, constraint) in parameters {
                    self.check_constraint(
                        &format!("template:{name}, parameter:{parameter}"),
                        constraint,
                    );
                }
            }
            Some(_) => self.error(
                Code::InvalidJsonStructure,
                format!("'{}' must be an object in template '{name}'", names::PARAMETERS),
            ),
        }
        self.check_column_parameter_types(name);

        if let Some(keys) = template.get(names::KEYS).filter(|keys| !keys.is_null()) {
            self.check_keys(name, keys);
        }
        if let Some(bounds) = template.get(names::TABLE_CONSTRAINTS).filter(|v| is_truthy(v)) {
            self.check_table_constraints(bounds);
        }
        if let Some(order) = template.get(names::COLUMN_ORDER).filter(|v| is_truthy(v)) {
            self.check_column_order(name, template, order);
        }
    }

    fn check_column_parameter_types(&mut self, name: &str) {
        let Some(template) = self.metadata.template(name) else {
            return;
        };
        for (column, constraint) in template.constrained_columns() {
            let Some(parameter) = template.parameter(column) else {
                continue;
            };
            if let (Some(column_type), Some(parameter_type)) =
                (&constraint.type_name, &parameter.type_name)
                && !self.same_type(column_type, parameter_type)
            {
                self.error(
                    Code::ColumnParameterTypeConflict,
                    format!(
                        "Field '{column}' is a column of type '{column_type}' and a parameter of type '{parameter_type}' in template '{name}'"
                    ),
                );
            }
        }
    }

    fn check_table_constraints(&mut self, value: &Value) {
        let Some(object) = value.as_object() else {
            self.error(
                Code::InvalidJsonStructure,
                format!("'{}' must be an object", names::TABLE_CONSTRAINTS),
            );
            return;
        };
        if let Some(property) = object.keys().find(|key| !tn::ALL.contains(&key.as_str())) {
            self.error(
                Code::InvalidJsonStructure,
                format!("Unknown property '{property}' in tableConstraints"),
            );
            return;
        }
        for property in tn::ALL {
            if let Some(bound) = object.get(*property)
                && tc_model::metadata::positive_whole_number(bound).is_none()
            {
                self.error(
                    Code::InvalidJsonStructure,
                    format!("Property '{property}' must be positive integer"),
                );
            }
        }
    }

    fn check_column_order(&mut self, name: &str, template: &Map<String, Value>, order: &Value) {
        let Some(items) = order.as_array() else {
            self.error(
                Code::InvalidJsonStructure,
                format!("'{}' must be an array in template '{name}'", names::COLUMN_ORDER),
            );
            return;
        };
        let Some(order) = items.iter().map(Value::as_str).collect::<Option<Vec<_>>>() else {
            self.error(
                Code::InvalidJsonStructure,
                format!("'{}' entries must be strings in template '{name}'", names::COLUMN_ORDER),
            );
            return;
        };
        let columns: std::collections::BTreeSet<&str> = template
            .get(names::COLUMNS)
            .and_then(Value::as_object)
            .map(|columns| columns.keys().map(String::as_str).collect())
            .unwrap_or_default();
        let ordered: std::collections::BTreeSet<&str> = order.iter().copied().collect();

        if columns != ordered {
            self.error(
                Code::InconsistentColumnOrderDefinition,
                format!("Column order must include all columns exactly once in template '{name}'"),
            );
        } else if ordered.len() != order.len() {
            self.error(
                Code::InconsistentColumnOrderDefinition,
                format!("Column order contains duplicates in template '{name}'"),
            );
        }
    }

    /// Every `referencedKeyName` must name a unique key somewhere in the
    /// schema with the same number of fields.
    fn check_referenced_key_names(&mut self) {
        let metadata = self.metadata;
        let Some(templates) = metadata.raw_templates() else {
            return;
        };
        let mut field_counts: BTreeMap<&str, usize> = BTreeMap::new();
        for template in templates.values() {
            for key in template_keys(template, kn::UNIQUE) {
                if let Some(name) = key.get(kn::NAME).and_then(Value::as_str) {
                    field_counts.entry(name).or_insert_with(|| field_count(key));
                }
            }
        }

        for (template_name, template) in templates {
            self.template = Some(template_name.clone());
            for key in template_keys(template, kn::REFERENCE) {
                let Some(referenced) = key
                    .get(kn::REFERENCED_KEY_NAME)
                    .and_then(Value::as_str)
                    .filter(|name| !name.is_empty())
                else {
                    continue;
                };
                let name = key.get(kn::NAME).and_then(Value::as_str).unwrap_or_default();
                match field_counts.get(referenced) {
                    None => self.error(
                        Code::InvalidKeyIdentifier,
                        format!("Referenced key name '{referenced}' not found in any template"),
                    ),
                    Some(&expected) if expected != field_count(key) => self.error(
                        Code::InvalidReferenceKey,
                        format!(
                            "Reference key '{name}' has {} fields but referenced key '{referenced}' has {expected} fields",
                            field_count(key)
                        ),
                    ),
                    Some(_) => {}
                }
            }
        }
        self.template = None;
    }

    /// Unique keys sharing a name across templates must agree with the
    /// first declaration.
    fn check_shared_keys(&mut self) {
        let metadata = self.metadata;
        let mut by_name: BTreeMap<&str, Vec<(&str, &UniqueKey)>> = BTreeMap::new();
        for template in metadata.table_templates() {
            for key in &template.keys.unique {
                by_name
                    .entry(key.name.as_str())
                    .or_default()
                    .push((template.name.as_str(), key));
            }
        }

        for (name, declarations) in by_name {
            let Some(((_, first), rest)) = declarations.split_first() else {
                continue;
            };
            for (template, key) in rest {
                self.template = Some((*template).to_string());
                if key.severity != first.severity {
                    self.error(
                        Code::InconsistentSharedKeySeverity,
                        format!("Inconsistent severity for shared key '{name}'"),
                    );
                }
                if key.fields.len() != first.fields.len() {
                    self.error(
                        Code::InconsistentSharedKeyFields,
                        format!("Inconsistent field count for shared key '{name}'"),
                    );
                }
                if key.sorted_rows != first.sorted_rows {
                    self.error(
                        Code::InconsistentSharedKeySorting,
                        format!("Inconsistent sortedRows for shared key '{name}'"),
                    );
                }
            }
        }
        self.template = None;
    }

    /// Reference key fields must be declared with the same types as the
    /// fields of the unique key they point at.
    fn check_referenced_field_types(&mut self) {
        let metadata = self.metadata;
        let templates = metadata.table_templates();
        for template in templates {
            let types = template.field_types();
            for reference in &template.keys.reference {
                let Some(referenced) = reference.referenced_key_name.as_deref() else {
                    continue;
                };
                let Some((owner, unique)) = templates.iter().find_map(|owner| {
                    owner.keys.unique_key(referenced).map(|key| (owner, key))
                }) else {
                    continue;
                };
                if unique.fields.len() != reference.fields.len() {
                    continue;
                }
                let owner_types = owner.field_types();
                for (field, target) in reference.fields.iter().zip(&unique.fields) {
                    let (Some(field_type), Some(target_type)) =
                        (types.get(field), owner_types.get(target))
                    else {
                        continue;
                    };
                    if !self.same_type(field_type, target_type) {
                        self.template = Some(template.name.clone());
                        self.error(
                            Code::InconsistentReferencedFieldType,
                            format!(
                                "Reference key '{}' field '{field}' has type '{field_type}' but referenced key '{referenced}' field '{target}' has type '{target_type}'",
                                reference.name
                            ),
                        );
                    }
                }
            }
        }
        self.template = None;
    }

    /// Type names denoting the same type, whatever prefix they use.
    fn same_type(&self, left: &str, right: &str) -> bool {
        if left == right {
            return true;
        }
        let namespaces = self.metadata.namespaces();
        let left = types::resolve_type(left, namespaces);
        left != types::TypeRef::Unknown && left == types::resolve_type(right, namespaces)
    }
}

/// Key objects of kind `kind` (`unique` or `reference`) in a raw template.
fn template_keys<'v>(template: &'v Value, kind: &str) -> Vec<&'v Map<String, Value>> {
    let keys = template.get(names::KEYS).and_then(Value::as_object);
    key_objects(keys.and_then(|keys| keys.get(kind)))
        .into_iter()
        .filter_map(Value::as_object)
        .collect()
}

fn field_count(key: &Map<String, Value>) -> usize {
    key.get(kn::FIELDS)
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

/// JSON truthiness: null, false, 0, "" and empty containers are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(object) => !object.is_empty(),
    }
}

/// Rendering of a JSON value inside a message: strings without quotes.
fn display_value(value: &Value) -> String {
    value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_string)
}
