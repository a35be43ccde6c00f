//! Constant-memory verification of row order against a sort key.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use tc_model::{Code, Issue, Namespaces, Row, Severity, UniqueKey, is_nil};

use crate::sink::IssueSink;
use crate::types::{self, TypeRef, XsdType, compare_typed};

#[derive(Debug)]
struct PreviousRow {
    values: Vec<Option<String>>,
    row: u64,
    table: String,
}

/// Keeps only the sort-key values of the last row of a template.
#[derive(Debug)]
pub struct SortValidator {
    template: String,
    key: Option<String>,
    fields: Vec<(String, TypeRef)>,
    severity: Severity,
    previous: Option<PreviousRow>,
}

impl SortValidator {
    /// A validator for `key`; with no sort key every row is accepted.
    pub fn new(
        template: &str,
        key: Option<&UniqueKey>,
        field_types: &BTreeMap<String, String>,
        namespaces: &Namespaces,
    ) -> Self {
        let fields = key
            .map(|key| {
                key.fields
                    .iter()
                    .map(|field| {
                        let ty = field_types
                            .get(field)
                            .map_or(TypeRef::Xsd(XsdType::String), |name| {
                                types::resolve_type(name, namespaces)
                            });
                        (field.clone(), ty)
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            template: template.to_string(),
            key: key.map(|key| key.name.clone()),
            fields,
            severity: key.map_or(Severity::Error, |key| key.severity),
            previous: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some() && !self.fields.is_empty()
    }

    pub fn check_row(&mut self, row: &Row, row_number: u64, table: &str, sink: &mut dyn IssueSink) {
        let Some(key) = self.key.as_deref() else {
            return;
        };
        if self.fields.is_empty() {
            return;
        }
        let values: Vec<Option<String>> = self
            .fields
            .iter()
            .map(|(field, _)| {
                row.get(field)
                    .filter(|value| !is_nil(Some(*value)))
                    .map(str::to_string)
            })
            .collect();

        if let Some(previous) = &self.previous {
            let mut verdict = Ordering::Equal;
            for ((field, ty), (before, after)) in
                self.fields.iter().zip(previous.values.iter().zip(&values))
            {
                let ordering = match (before, after) {
                    (None, None) => Ordering::Equal,
                    (None, Some(_)) => Ordering::Less,
                    (Some(_), None) => Ordering::Greater,
                    (Some(before), Some(after)) => match compare_typed(before, after, *ty) {
                        Ok(ordering) => ordering,
                        Err(incomparable) => {
                            sink.report(
                                Issue::error(
                                    incomparable.code(),
                                    format!(
                                        "Cannot compare '{before}' and '{after}' for sort key '{key}' field '{field}' in table '{table}' row {row_number}: {incomparable}"
                                    ),
                                )
                                .with_template(&self.template)
                                .with_table(table)
                                .with_row(row_number)
                                .with_field(field)
                                .with_key(key),
                            );
                            Ordering::Equal
                        }
                    },
                };
                if verdict == Ordering::Equal {
                    verdict = ordering;
                }
            }

            if verdict == Ordering::Greater {
                sink.report(
                    Issue::new(
                        Code::KeySortViolation,
                        self.severity,
                        format!(
                            "Sort order violation for key '{key}': row {row_number} in table '{table}' comes before row {} in table '{}'",
                            previous.row, previous.table
                        ),
                    )
                    .with_template(&self.template)
                    .with_table(table)
                    .with_row(row_number)
                    .with_key(key),
                );
            }
        }

        self.previous = Some(PreviousRow {
            values,
            row: row_number,
            table: table.to_string(),
        });
    }
}
