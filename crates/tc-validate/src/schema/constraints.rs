use std::collections::HashSet;

use serde_json::{Map, Value};
use tc_model::Code;
use tc_model::metadata::scalar_text;
use tc_model::names::{self, constraint as cn};

use super::{MetadataValidator, display_value, is_truthy};
use crate::types::{self, CoreDimension, FacetKind, TypeRef, XsdType, facet_applies_to};

impl MetadataValidator<'_> {
    /// Check one `tc:constraints` object of a column or parameter.
    pub(super) fn check_constraint(&mut self, context: &str, value: &Value) {
        let Some(object) = value.as_object() else {
            self.error(
                Code::InvalidJsonStructure,
                format!("Constraint object expected in {context}"),
            );
            return;
        };

        // tc:-prefixed keys are reported by the placement walk
        if let Some(property) = object
            .keys()
            .find(|key| !cn::ALL.contains(&key.as_str()) && !names::is_tc_property(key))
        {
            self.error(
                Code::InvalidJsonStructure,
                format!("Unknown property '{property}' in constraint object at {context}"),
            );
            return;
        }

        let Some(type_name) = object
            .get(cn::TYPE)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
        else {
            self.error(
                Code::InvalidJsonStructure,
                format!("Missing required 'type' property in {context}"),
            );
            return;
        };
        let ty = types::resolve_type(type_name, self.metadata.namespaces());
        if ty == TypeRef::Unknown {
            self.error(
                Code::InvalidTypeConstraint,
                format!("Invalid type '{type_name}' in {context}"),
            );
        }

        for flag in [cn::OPTIONAL, cn::NILLABLE, cn::TIME_ZONE] {
            if object.get(flag).is_some_and(|value| !value.is_boolean()) {
                self.error(
                    Code::InvalidJsonStructure,
                    format!("'{flag}' must be a boolean in {context}"),
                );
            }
        }

        self.check_allowed_values(context, object, type_name, ty);
        self.check_allowed_patterns(context, object);

        if object.contains_key(cn::TIME_ZONE) && !ty.accepts_time_zone() {
            self.error(
                Code::UnknownTimeZone,
                format!("timeZone not applicable to type '{type_name}' in {context}"),
            );
        }

        if let Some(period_type) = object.get(cn::PERIOD_TYPE).filter(|v| is_truthy(v)) {
            if ty != TypeRef::Dimension(CoreDimension::Period) {
                self.error(
                    Code::IllegalPeriodType,
                    format!("periodType requires type 'period' in {context}"),
                );
            } else if !period_type
                .as_str()
                .is_some_and(|name| names::PERIOD_TYPES.contains(&name))
            {
                self.error(
                    Code::UnknownPeriodType,
                    format!(
                        "Unknown periodType '{}' in {context}",
                        display_value(period_type)
                    ),
                );
            }
        }

        if let Some(duration_type) = object.get(cn::DURATION_TYPE).filter(|v| is_truthy(v)) {
            if ty != TypeRef::Xsd(XsdType::Duration) {
                self.error(
                    Code::IllegalDurationType,
                    format!("durationType requires type 'xs:duration' in {context}"),
                );
            } else if !duration_type
                .as_str()
                .is_some_and(|name| names::DURATION_TYPES.contains(&name))
            {
                self.error(
                    Code::UnknownDurationType,
                    format!(
                        "Unknown durationType '{}' in {context}",
                        display_value(duration_type)
                    ),
                );
            }
        }

        self.check_facets(context, object, type_name, ty);
    }

    fn check_allowed_values(
        &mut self,
        context: &str,
        object: &Map<String, Value>,
        type_name: &str,
        ty: TypeRef,
    ) {
        let Some(values) = object.get(cn::ALLOWED_VALUES) else {
            return;
        };
        let Some(items) = values.as_array().filter(|items| !items.is_empty()) else {
            self.error(
                Code::InvalidJsonStructure,
                format!("allowedValues must be non-empty array in {context}"),
            );
            return;
        };
        let Some(texts) = items.iter().map(scalar_text).collect::<Option<Vec<_>>>() else {
            self.error(
                Code::InvalidJsonStructure,
                format!("allowedValues entries must be scalar values in {context}"),
            );
            return;
        };
        if texts.iter().collect::<HashSet<_>>().len() != texts.len() {
            self.error(
                Code::InvalidJsonStructure,
                format!("allowedValues must be unique in {context}"),
            );
            return;
        }
        if matches!(ty, TypeRef::Dimension(_) | TypeRef::Unknown) {
            return;
        }
        let namespaces = self.metadata.namespaces();
        if let Some((text, Some(message))) = texts.iter().find_map(|text| {
            types::validate_typed(text, ty, namespaces)
                .err()
                .map(|message| (text, message))
        }) {
            self.error(
                Code::IllegalAllowedValue,
                format!(
                    "allowedValue '{text}' does not conform to type '{type_name}' in {context}: {message}"
                ),
            );
        }
    }

    fn check_allowed_patterns(&mut self, context: &str, object: &Map<String, Value>) {
        let Some(patterns) = object.get(cn::ALLOWED_PATTERNS) else {
            return;
        };
        let Some(items) = patterns.as_array().filter(|items| !items.is_empty()) else {
            self.error(
                Code::InvalidJsonStructure,
                format!("allowedPatterns must be non-empty array in {context}"),
            );
            return;
        };
        let Some(patterns) = items.iter().map(Value::as_str).collect::<Option<Vec<_>>>() else {
            self.error(
                Code::InvalidJsonStructure,
                format!("allowedPatterns entries must be strings in {context}"),
            );
            return;
        };
        if patterns.iter().collect::<HashSet<_>>().len() != patterns.len() {
            self.error(
                Code::InvalidJsonStructure,
                format!("allowedPatterns must be unique in {context}"),
            );
        }
    }

    fn check_facets(
        &mut self,
        context: &str,
        object: &Map<String, Value>,
        type_name: &str,
        ty: TypeRef,
    ) {
        let namespaces = self.metadata.namespaces();
        let value_type = ty.as_value_type().xsd();

        for facet in cn::FACETS {
            let Some(value) = object.get(*facet) else {
                continue;
            };
            let Some(kind) = FacetKind::of(facet) else {
                continue;
            };

            match kind {
                FacetKind::Length => {
                    if value.as_u64().is_none() {
                        self.error(
                            Code::InvalidJsonStructure,
                            format!("'{facet}' must be a non-negative integer in {context}"),
                        );
                        continue;
                    }
                }
                FacetKind::Digits => {
                    if !value.as_u64().is_some_and(|digits| digits > 0) {
                        self.error(
                            Code::InvalidJsonStructure,
                            format!("'{facet}' must be a positive integer in {context}"),
                        );
                        continue;
                    }
                }
                FacetKind::Boundary => {
                    let Some(bound) = value.as_str() else {
                        self.error(
                            Code::InvalidBoundaryValue,
                            format!("'{facet}' must be a string in {context}"),
                        );
                        continue;
                    };
                    if let Some(xsd) = value_type
                        && let Err(Some(message)) =
                            types::validate_typed(bound, TypeRef::Xsd(xsd), namespaces)
                    {
                        self.error(
                            Code::InvalidBoundaryValue,
                            format!(
                                "'{facet}' value '{bound}' is not valid for type '{type_name}' in {context}: {message}"
                            ),
                        );
                        continue;
                    }
                }
            }

            if !value_type.is_some_and(|xsd| facet_applies_to(kind, xsd)) {
                let code = match kind {
                    FacetKind::Length => Code::InvalidLengthType,
                    FacetKind::Boundary => Code::InvalidBoundaryType,
                    FacetKind::Digits => Code::InvalidDigitsType,
                };
                self.error(
                    code,
                    format!("Facet '{facet}' not applicable to type '{type_name}' in {context}"),
                );
            }
        }
    }
}
