//! Read-only views over a merged schema document.
//!
//! [`Metadata`] keeps the raw JSON document for structural validation and
//! builds lenient typed views (templates, tables, constraints, keys) for the
//! streaming validators. Malformed shapes degrade to "absent" in the typed
//! views; reporting them is the metadata validator's job.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{ModelError, Result, json_kind};
use crate::issue::Severity;
use crate::names::{self, constraint as cn, key as kn, table_constraint as tn};

/// Namespace prefix bindings from `documentInfo.namespaces`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Namespaces(BTreeMap<String, String>);

impl Namespaces {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, prefix: impl Into<String>, uri: impl Into<String>) {
        self.0.insert(prefix.into(), uri.into());
    }

    /// Namespace URI bound to `prefix`.
    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.0.get(prefix).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(prefix, uri)| (prefix.as_str(), uri.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Namespaces {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(prefix, uri)| (prefix.into(), uri.into()))
                .collect(),
        )
    }
}

/// The loaded schema: raw document plus typed views, never mutated after
/// construction.
#[derive(Debug, Clone)]
pub struct Metadata {
    document: Value,
    location: Option<PathBuf>,
    namespaces: Namespaces,
    templates: Vec<TableTemplate>,
    tables: Vec<TableConfig>,
}

impl Metadata {
    /// Build the views over an already merged document.
    ///
    /// `location` is the schema path used to resolve relative CSV URLs.
    pub fn from_document(document: Value, location: Option<PathBuf>) -> Result<Self> {
        let Some(root) = document.as_object() else {
            return Err(ModelError::NotAnObject {
                found: json_kind(&document),
            });
        };

        let namespaces = root
            .get(names::DOCUMENT_INFO)
            .and_then(|info| info.get(names::NAMESPACES))
            .and_then(Value::as_object)
            .map(|bindings| {
                bindings
                    .iter()
                    .filter_map(|(prefix, uri)| uri.as_str().map(|uri| (prefix.as_str(), uri)))
                    .collect()
            })
            .unwrap_or_default();

        let templates = root
            .get(names::TABLE_TEMPLATES)
            .and_then(Value::as_object)
            .map(|templates| {
                templates
                    .iter()
                    .map(|(name, template)| TableTemplate::from_json(name, template))
                    .collect()
            })
            .unwrap_or_default();

        let tables = root
            .get(names::TABLES)
            .and_then(Value::as_object)
            .map(|tables| {
                tables
                    .iter()
                    .map(|(name, table)| TableConfig::from_json(name, table))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            document,
            location,
            namespaces,
            templates,
            tables,
        })
    }

    /// The merged JSON document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn document_info(&self) -> Option<&Map<String, Value>> {
        self.document
            .get(names::DOCUMENT_INFO)
            .and_then(Value::as_object)
    }

    /// Raw `tableTemplates` object, in declaration order.
    pub fn raw_templates(&self) -> Option<&Map<String, Value>> {
        self.document
            .get(names::TABLE_TEMPLATES)
            .and_then(Value::as_object)
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Directory CSV URLs are resolved against.
    pub fn base_dir(&self) -> Option<&Path> {
        self.location.as_deref().and_then(Path::parent)
    }

    pub fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    pub fn table_templates(&self) -> &[TableTemplate] {
        &self.templates
    }

    pub fn template(&self, name: &str) -> Option<&TableTemplate> {
        self.templates.iter().find(|template| template.name == name)
    }

    /// Declared tables, in declaration order.
    pub fn tables(&self) -> &[TableConfig] {
        &self.tables
    }
}

/// A table template: columns, parameters, keys and table-level constraints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableTemplate {
    pub name: String,
    pub columns: Vec<ColumnDef>,
    pub parameters: Vec<ParameterDef>,
    pub keys: KeysConfig,
    pub table_constraints: Option<TableConstraints>,
    pub column_order: Option<Vec<String>>,
}

impl TableTemplate {
    pub fn from_json(name: &str, value: &Value) -> Self {
        let columns = value
            .get(names::COLUMNS)
            .and_then(Value::as_object)
            .map(|columns| {
                columns
                    .iter()
                    .map(|(name, column)| ColumnDef::from_json(name, column))
                    .collect()
            })
            .unwrap_or_default();

        let parameters = value
            .get(names::PARAMETERS)
            .and_then(Value::as_object)
            .map(|parameters| {
                parameters
                    .iter()
                    .map(|(name, constraint)| ParameterDef {
                        name: name.clone(),
                        constraint: Constraint::from_json(constraint),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: name.to_string(),
            columns,
            parameters,
            keys: value
                .get(names::KEYS)
                .map(KeysConfig::from_json)
                .unwrap_or_default(),
            table_constraints: value
                .get(names::TABLE_CONSTRAINTS)
                .and_then(Value::as_object)
                .map(TableConstraints::from_json),
            column_order: value
                .get(names::COLUMN_ORDER)
                .and_then(Value::as_array)
                .map(|order| string_items(order)),
        }
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|column| column.name == name)
    }

    pub fn declares_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Columns carrying `tc:constraints`, in declaration order.
    pub fn constrained_columns(&self) -> impl Iterator<Item = (&str, &Constraint)> {
        self.columns.iter().filter_map(|column| {
            column
                .constraint
                .as_ref()
                .map(|constraint| (column.name.as_str(), constraint))
        })
    }

    pub fn parameter(&self, name: &str) -> Option<&Constraint> {
        self.parameters
            .iter()
            .find(|parameter| parameter.name == name)
            .map(|parameter| &parameter.constraint)
    }

    /// A constrained column or a parameter of this name exists.
    pub fn has_field(&self, name: &str) -> bool {
        self.columns
            .iter()
            .any(|column| column.name == name && column.constraint.is_some())
            || self.parameter(name).is_some()
    }

    /// Declared type per field. Parameters shadow columns of the same name.
    pub fn field_types(&self) -> BTreeMap<String, String> {
        let mut types = BTreeMap::new();
        for (name, constraint) in self.constrained_columns() {
            if let Some(type_name) = &constraint.type_name {
                types.insert(name.to_string(), type_name.clone());
            }
        }
        for parameter in &self.parameters {
            if let Some(type_name) = &parameter.constraint.type_name {
                types.insert(parameter.name.clone(), type_name.clone());
            }
        }
        types
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    /// Declared with `"comment": true`.
    pub comment: bool,
    pub constraint: Option<Constraint>,
    /// Raw `dimensions` object, used by the taxonomy linter.
    pub dimensions: Option<Map<String, Value>>,
}

impl ColumnDef {
    pub fn from_json(name: &str, value: &Value) -> Self {
        Self {
            name: name.to_string(),
            comment: value.get(names::COMMENT).and_then(Value::as_bool) == Some(true),
            constraint: value.get(names::CONSTRAINTS).map(Constraint::from_json),
            dimensions: value
                .get(names::DIMENSIONS)
                .and_then(Value::as_object)
                .cloned(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterDef {
    pub name: String,
    pub constraint: Constraint,
}

/// Value constraints of a column or parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub type_name: Option<String>,
    pub optional: bool,
    pub nillable: bool,
    pub allowed_values: Option<Vec<String>>,
    pub allowed_patterns: Option<Vec<String>>,
    pub time_zone: Option<bool>,
    pub period_type: Option<String>,
    pub duration_type: Option<String>,
    pub facets: Facets,
    /// Property names outside the constraint vocabulary.
    pub unknown: Vec<String>,
}

impl Default for Constraint {
    fn default() -> Self {
        Self {
            type_name: None,
            optional: false,
            nillable: true,
            allowed_values: None,
            allowed_patterns: None,
            time_zone: None,
            period_type: None,
            duration_type: None,
            facets: Facets::default(),
            unknown: Vec::new(),
        }
    }
}

impl Constraint {
    /// Constraint of the given type with every other property defaulted.
    pub fn of_type(type_name: impl Into<String>) -> Self {
        Self {
            type_name: Some(type_name.into()),
            ..Self::default()
        }
    }

    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::default();
        };
        let text = |name: &str| {
            object
                .get(name)
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_string)
        };

        Self {
            type_name: text(cn::TYPE),
            optional: object.get(cn::OPTIONAL).and_then(Value::as_bool).unwrap_or(false),
            nillable: object.get(cn::NILLABLE).and_then(Value::as_bool).unwrap_or(true),
            allowed_values: object
                .get(cn::ALLOWED_VALUES)
                .and_then(Value::as_array)
                .map(|values| values.iter().filter_map(scalar_text).collect()),
            allowed_patterns: object
                .get(cn::ALLOWED_PATTERNS)
                .and_then(Value::as_array)
                .map(|patterns| string_items(patterns)),
            time_zone: object.get(cn::TIME_ZONE).and_then(Value::as_bool),
            period_type: text(cn::PERIOD_TYPE),
            duration_type: text(cn::DURATION_TYPE),
            facets: Facets::from_json(object),
            unknown: object
                .keys()
                .filter(|name| !cn::ALL.contains(&name.as_str()))
                .cloned()
                .collect(),
        }
    }
}

/// XML Schema style facets of a constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub length: Option<u64>,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub min_inclusive: Option<String>,
    pub max_inclusive: Option<String>,
    pub min_exclusive: Option<String>,
    pub max_exclusive: Option<String>,
    pub total_digits: Option<u64>,
    pub fraction_digits: Option<u64>,
}

impl Facets {
    fn from_json(object: &Map<String, Value>) -> Self {
        let count = |name: &str| object.get(name).and_then(Value::as_u64);
        let bound = |name: &str| {
            object.get(name).and_then(|value| match value {
                Value::String(text) => Some(text.clone()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
        };
        Self {
            length: count(cn::LENGTH),
            min_length: count(cn::MIN_LENGTH),
            max_length: count(cn::MAX_LENGTH),
            min_inclusive: bound(cn::MIN_INCLUSIVE),
            max_inclusive: bound(cn::MAX_INCLUSIVE),
            min_exclusive: bound(cn::MIN_EXCLUSIVE),
            max_exclusive: bound(cn::MAX_EXCLUSIVE),
            total_digits: count(cn::TOTAL_DIGITS),
            fraction_digits: count(cn::FRACTION_DIGITS),
        }
    }
}

/// `tc:keys` of a template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeysConfig {
    pub unique: Vec<UniqueKey>,
    pub reference: Vec<ReferenceKey>,
    pub sort_key: Option<String>,
}

impl KeysConfig {
    pub fn from_json(value: &Value) -> Self {
        Self {
            unique: key_objects(value.get(kn::UNIQUE))
                .into_iter()
                .filter_map(Value::as_object)
                .filter_map(UniqueKey::from_json)
                .collect(),
            reference: key_objects(value.get(kn::REFERENCE))
                .into_iter()
                .filter_map(Value::as_object)
                .filter_map(ReferenceKey::from_json)
                .collect(),
            sort_key: value
                .get(kn::SORT_KEY)
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        }
    }

    pub fn unique_key(&self, name: &str) -> Option<&UniqueKey> {
        self.unique.iter().find(|key| key.name == name)
    }

    /// The unique key named by `sortKey`, if both exist.
    pub fn sort_key(&self) -> Option<&UniqueKey> {
        self.sort_key
            .as_deref()
            .and_then(|name| self.unique_key(name))
    }

    pub fn is_empty(&self) -> bool {
        self.unique.is_empty() && self.reference.is_empty() && self.sort_key.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKey {
    pub name: String,
    pub fields: Vec<String>,
    pub severity: Severity,
    pub sorted_rows: bool,
}

impl UniqueKey {
    /// `None` when the key has no usable name.
    pub fn from_json(object: &Map<String, Value>) -> Option<Self> {
        Some(Self {
            name: key_name(object)?,
            fields: key_fields(object),
            severity: declared_severity(object),
            sorted_rows: object
                .get(kn::SORTED_ROWS)
                .and_then(Value::as_bool)
                .unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceKey {
    pub name: String,
    pub fields: Vec<String>,
    pub severity: Severity,
    pub referenced_key_name: Option<String>,
    pub negate: bool,
    pub skip_nils: bool,
}

impl ReferenceKey {
    pub fn from_json(object: &Map<String, Value>) -> Option<Self> {
        let flag = |name: &str| object.get(name).and_then(Value::as_bool).unwrap_or(false);
        Some(Self {
            name: key_name(object)?,
            fields: key_fields(object),
            severity: declared_severity(object),
            referenced_key_name: object
                .get(kn::REFERENCED_KEY_NAME)
                .and_then(Value::as_str)
                .map(str::to_string),
            negate: flag(kn::NEGATE),
            skip_nils: flag(kn::SKIP_NILS),
        })
    }
}

/// `tc:tableConstraints`; only positive whole numbers are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableConstraints {
    pub min_tables: Option<u64>,
    pub max_tables: Option<u64>,
    pub min_table_rows: Option<u64>,
    pub max_table_rows: Option<u64>,
}

impl TableConstraints {
    pub fn from_json(object: &Map<String, Value>) -> Self {
        let bound = |name: &str| object.get(name).and_then(positive_whole_number);
        Self {
            min_tables: bound(tn::MIN_TABLES),
            max_tables: bound(tn::MAX_TABLES),
            min_table_rows: bound(tn::MIN_TABLE_ROWS),
            max_table_rows: bound(tn::MAX_TABLE_ROWS),
        }
    }
}

/// One entry of `tables`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub name: String,
    /// Template name; the table name when `template` is not given.
    pub template: String,
    pub url: Option<String>,
    /// Table-level parameter values, null kept as `None`.
    pub parameters: Vec<(String, Option<String>)>,
}

impl TableConfig {
    pub fn from_json(name: &str, value: &Value) -> Self {
        Self {
            name: name.to_string(),
            template: value
                .get(names::TEMPLATE)
                .and_then(Value::as_str)
                .unwrap_or(name)
                .to_string(),
            url: value
                .get(names::URL)
                .and_then(Value::as_str)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            parameters: value
                .get(names::TABLE_PARAMETERS)
                .and_then(Value::as_object)
                .map(|parameters| {
                    parameters
                        .iter()
                        .map(|(name, value)| (name.clone(), scalar_text(value)))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Value supplied for a parameter; `None` when absent or null.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(parameter, _)| parameter == name)
            .and_then(|(_, value)| value.as_deref())
    }
}

/// `unique`/`reference` may be a single key object or an array of them.
pub fn key_objects(value: Option<&Value>) -> Vec<&Value> {
    match value {
        Some(object @ Value::Object(_)) => vec![object],
        Some(Value::Array(items)) => items.iter().collect(),
        _ => Vec::new(),
    }
}

/// String form of a JSON scalar as it would appear in a CSV cell.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Positive integer, accepting integral floats such as `2.0`.
pub fn positive_whole_number(value: &Value) -> Option<u64> {
    if let Some(number) = value.as_u64() {
        return (number > 0).then_some(number);
    }
    let number = value.as_f64()?;
    (number >= 1.0 && number.fract() == 0.0 && number <= u64::MAX as f64).then_some(number as u64)
}

fn string_items(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

fn key_name(object: &Map<String, Value>) -> Option<String> {
    object
        .get(kn::NAME)
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn key_fields(object: &Map<String, Value>) -> Vec<String> {
    object
        .get(kn::FIELDS)
        .and_then(Value::as_array)
        .map(|fields| string_items(fields))
        .unwrap_or_default()
}

/// Anything other than `"warning"` is treated as an error-level key.
fn declared_severity(object: &Map<String, Value>) -> Severity {
    match object.get(kn::SEVERITY).and_then(Value::as_str) {
        Some("warning") => Severity::Warning,
        _ => Severity::Error,
    }
}
