use serde_json::{Map, Value};
use tc_model::Code;
use tc_model::names;

use super::MetadataValidator;

impl MetadataValidator<'_> {
    /// `tc:` properties may only appear on templates (`tc:parameters`,
    /// `tc:keys`, `tc:tableConstraints`, `tc:columnOrder`) and on column
    /// definitions (`tc:constraints`).
    pub(super) fn check_placement(&mut self, root: &Map<String, Value>) {
        for (key, value) in root {
            if names::is_tc_property(key) {
                self.misplaced(key, key);
                continue;
            }
            match (key.as_str(), value) {
                (names::TABLE_TEMPLATES, Value::Object(templates)) => {
                    for (name, template) in templates {
                        let path = format!("{}/{name}", names::TABLE_TEMPLATES);
                        match template.as_object() {
                            Some(template) => self.check_template_placement(&path, template),
                            None => self.check_nested(&path, template),
                        }
                    }
                }
                _ => self.check_nested(key, value),
            }
        }
    }

    fn check_template_placement(&mut self, path: &str, template: &Map<String, Value>) {
        for (key, value) in template {
            let child = format!("{path}/{key}");
            if names::is_tc_property(key) {
                if names::TEMPLATE_PROPERTIES.contains(&key.as_str()) {
                    self.check_nested(&child, value);
                } else {
                    self.misplaced(key, &child);
                }
                continue;
            }
            match (key.as_str(), value) {
                (names::COLUMNS, Value::Object(columns)) => {
                    for (column, definition) in columns {
                        let column_path = format!("{child}/{column}");
                        let Some(definition) = definition.as_object() else {
                            continue;
                        };
                        for (property, value) in definition {
                            let property_path = format!("{column_path}/{property}");
                            if names::is_tc_property(property)
                                && !names::COLUMN_PROPERTIES.contains(&property.as_str())
                            {
                                self.misplaced(property, &property_path);
                            } else {
                                self.check_nested(&property_path, value);
                            }
                        }
                    }
                }
                _ => self.check_nested(&child, value),
            }
        }
    }

    /// Below a sanctioned position no `tc:` property is allowed at all.
    fn check_nested(&mut self, path: &str, value: &Value) {
        match value {
            Value::Object(object) => {
                for (key, value) in object {
                    let child = format!("{path}/{key}");
                    if names::is_tc_property(key) {
                        self.misplaced(key, &child);
                    } else {
                        self.check_nested(&child, value);
                    }
                }
            }
            Value::Array(items) => {
                for (index, item) in items.iter().enumerate() {
                    self.check_nested(&format!("{path}/{index}"), item);
                }
            }
            _ => {}
        }
    }

    fn misplaced(&mut self, property: &str, path: &str) {
        self.error(
            Code::MisplacedOrUnknownProperty,
            format!("Property '{property}' is misplaced or unknown at '{path}'"),
        );
    }
}
