use std::collections::HashSet;
use std::ops::ControlFlow;

use serde_json::{Map, Value};
use tc_model::Code;
use tc_model::metadata::key_objects;
use tc_model::names::{self, key as kn};

use super::{MetadataValidator, display_value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    Unique,
    Reference,
}

impl KeyKind {
    fn label(self) -> &'static str {
        match self {
            Self::Unique => "Unique",
            Self::Reference => "Reference",
        }
    }

    fn properties(self) -> &'static [&'static str] {
        match self {
            Self::Unique => kn::UNIQUE_PROPERTIES,
            Self::Reference => kn::REFERENCE_PROPERTIES,
        }
    }

    fn flags(self) -> &'static [&'static str] {
        match self {
            Self::Unique => &[kn::SORTED_ROWS],
            Self::Reference => &[kn::NEGATE, kn::SKIP_NILS],
        }
    }

    fn field_code(self) -> Code {
        match self {
            Self::Unique => Code::IllegalUniqueKeyField,
            Self::Reference => Code::IllegalReferenceKeyField,
        }
    }
}

impl MetadataValidator<'_> {
    pub(super) fn check_keys(&mut self, template: &str, keys: &Value) {
        let Some(object) = keys.as_object() else {
            self.error(
                Code::InvalidJsonStructure,
                format!("'{}' must be an object in template '{template}'", names::KEYS),
            );
            return;
        };
        if let Some(property) = object
            .keys()
            .find(|key| !kn::KEYS_PROPERTIES.contains(&key.as_str()) && !names::is_tc_property(key))
        {
            self.error(
                Code::InvalidJsonStructure,
                format!("Unknown property '{property}' in keys object of template '{template}'"),
            );
            return;
        }

        for kind in [kn::UNIQUE, kn::REFERENCE] {
            match object.get(kind) {
                None | Some(Value::Null | Value::Object(_)) => {}
                Some(Value::Array(items)) if items.is_empty() => {
                    self.error(
                        Code::InvalidJsonStructure,
                        format!("'{kind}' array must not be empty in template '{template}'"),
                    );
                    return;
                }
                Some(Value::Array(_)) => {}
                Some(_) => {
                    self.error(
                        Code::InvalidJsonStructure,
                        format!(
                            "'{kind}' must be a key object or an array of key objects in template '{template}'"
                        ),
                    );
                    return;
                }
            }
        }

        let present = |kind: &str| object.get(kind).is_some_and(|value| !value.is_null());
        if !present(kn::UNIQUE) && !present(kn::REFERENCE) {
            self.error(
                Code::MissingKeyProperty,
                format!("Keys must have at least 'unique' or 'reference' in template '{template}'"),
            );
        }

        let mut seen = HashSet::new();
        let mut unique_names = Vec::new();
        for key in key_objects(object.get(kn::UNIQUE)) {
            if let Some(name) = key.get(kn::NAME).and_then(Value::as_str) {
                unique_names.push(name);
            }
            if self
                .check_key(KeyKind::Unique, template, key, &mut seen)
                .is_break()
            {
                return;
            }
        }
        for key in key_objects(object.get(kn::REFERENCE)) {
            if self
                .check_key(KeyKind::Reference, template, key, &mut seen)
                .is_break()
            {
                return;
            }
        }

        if let Some(sort_key) = object.get(kn::SORT_KEY) {
            match sort_key.as_str() {
                None => self.error(
                    Code::InvalidJsonStructure,
                    format!("'sortKey' must be a string in template '{template}'"),
                ),
                Some(name) if !unique_names.contains(&name) => self.error(
                    Code::UnknownUniqueKey,
                    format!("sortKey '{name}' does not name a unique key of template '{template}'"),
                ),
                Some(_) => {}
            }
        }
    }

    fn check_key(
        &mut self,
        kind: KeyKind,
        template: &str,
        key: &Value,
        seen: &mut HashSet<String>,
    ) -> ControlFlow<()> {
        let label = kind.label();
        let Some(object) = key.as_object() else {
            self.error(
                Code::InvalidJsonStructure,
                format!("{label} key must be an object in template '{template}'"),
            );
            return ControlFlow::Continue(());
        };
        if let Some(property) = object
            .keys()
            .find(|property| {
                !kind.properties().contains(&property.as_str()) && !names::is_tc_property(property)
            })
        {
            self.error(
                Code::InvalidJsonStructure,
                format!(
                    "Unknown property '{property}' in {} key",
                    label.to_lowercase()
                ),
            );
            return ControlFlow::Break(());
        }

        let name = object
            .get(kn::NAME)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty());
        match name {
            None => self.error(
                Code::MissingKeyProperty,
                format!("{label} key without a 'name' in template '{template}'"),
            ),
            Some(name) if !seen.insert(name.to_string()) => self.error(
                Code::DuplicateKeyName,
                format!("Duplicate key name '{name}' in template '{template}'"),
            ),
            Some(_) => {}
        }
        let display = name.unwrap_or("<unnamed>");

        self.check_key_fields(kind, template, display, object);

        if let Some(severity) = object.get(kn::SEVERITY)
            && !severity
                .as_str()
                .is_some_and(|severity| kn::SEVERITY_VALUES.contains(&severity))
        {
            self.error(
                Code::InvalidKeySeverity,
                format!(
                    "Invalid severity '{}' for key '{display}'",
                    display_value(severity)
                ),
            );
        }

        for flag in kind.flags() {
            if object.get(*flag).is_some_and(|value| !value.is_boolean()) {
                self.error(
                    Code::InvalidJsonStructure,
                    format!("'{flag}' must be a boolean in {} key '{display}'", label.to_lowercase()),
                );
            }
        }

        if kind == KeyKind::Reference
            && !object
                .get(kn::REFERENCED_KEY_NAME)
                .and_then(Value::as_str)
                .is_some_and(|name| !name.is_empty())
        {
            self.error(
                Code::MissingKeyProperty,
                format!("Reference key '{display}' has no 'referencedKeyName'"),
            );
        }
        ControlFlow::Continue(())
    }

    fn check_key_fields(
        &mut self,
        kind: KeyKind,
        template: &str,
        key: &str,
        object: &Map<String, Value>,
    ) {
        let label = kind.label();
        let Some(items) = object
            .get(kn::FIELDS)
            .and_then(Value::as_array)
            .filter(|items| !items.is_empty())
        else {
            self.error(
                Code::InvalidJsonStructure,
                format!("{label} key '{key}' must have non-empty fields"),
            );
            return;
        };
        let Some(fields) = items.iter().map(Value::as_str).collect::<Option<Vec<_>>>() else {
            self.error(
                Code::InvalidJsonStructure,
                format!("{label} key '{key}' fields must be strings"),
            );
            return;
        };
        if fields.iter().collect::<HashSet<_>>().len() != fields.len() {
            self.error(
                Code::InvalidJsonStructure,
                format!("{label} key '{key}' fields must be unique"),
            );
            return;
        }

        let metadata = self.metadata;
        let Some(declared) = metadata.template(template) else {
            return;
        };
        for field in fields {
            if !declared.has_field(field) {
                self.error(
                    kind.field_code(),
                    format!("{label} key '{key}' field '{field}' not found in columns or parameters"),
                );
            }
        }
    }
}
