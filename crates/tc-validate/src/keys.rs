//! Streaming unique-key and reference-key tracking.
//!
//! Key value sets live in a [`KeyRegistry`] owned by the run and are
//! addressed by index, so templates declaring a unique key of the same name
//! accumulate into one set. Reference-key rows are staged until every table
//! has been streamed.

use std::collections::{BTreeMap, HashMap, HashSet};

use tc_model::{Code, Issue, KeyValue, KeysConfig, ReferenceKey, Row, Severity};

use crate::sink::IssueSink;

/// Index of a value set in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySetId(usize);

/// Value sets of every unique key seen in a run, shared by key name.
#[derive(Debug, Default)]
pub struct KeyRegistry {
    sets: Vec<HashSet<KeyValue>>,
    by_name: HashMap<String, KeySetId>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The set for `name`, created empty on first use.
    pub fn register(&mut self, name: &str) -> KeySetId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        let id = KeySetId(self.sets.len());
        self.sets.push(HashSet::new());
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn lookup(&self, name: &str) -> Option<KeySetId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, id: KeySetId, value: &KeyValue) -> bool {
        self.sets.get(id.0).is_some_and(|set| set.contains(value))
    }

    /// Insert `value`; false when it was already present.
    pub fn insert(&mut self, id: KeySetId, value: KeyValue) -> bool {
        self.sets.get_mut(id.0).is_some_and(|set| set.insert(value))
    }

    /// Distinct values recorded for `name`.
    pub fn len(&self, name: &str) -> usize {
        self.lookup(name)
            .and_then(|id| self.sets.get(id.0))
            .map_or(0, HashSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.sets.iter().all(HashSet::is_empty)
    }
}

#[derive(Debug)]
struct UniqueKeyState {
    name: String,
    fields: Vec<String>,
    severity: Severity,
    set: KeySetId,
    field_types: BTreeMap<String, String>,
}

#[derive(Debug)]
struct StagedReference {
    table: String,
    row: u64,
    value: KeyValue,
}

#[derive(Debug)]
struct ReferenceKeyState {
    key: ReferenceKey,
    staged: Vec<StagedReference>,
}

/// Key state of one template.
#[derive(Debug)]
pub struct KeyIndexer {
    template: String,
    unique: Vec<UniqueKeyState>,
    reference: Vec<ReferenceKeyState>,
}

impl KeyIndexer {
    pub fn new(template: &str, keys: &KeysConfig, registry: &mut KeyRegistry) -> Self {
        Self {
            template: template.to_string(),
            unique: keys
                .unique
                .iter()
                .map(|key| UniqueKeyState {
                    name: key.name.clone(),
                    fields: key.fields.clone(),
                    severity: key.severity,
                    set: registry.register(&key.name),
                    field_types: BTreeMap::new(),
                })
                .collect(),
            reference: keys
                .reference
                .iter()
                .map(|key| ReferenceKeyState {
                    key: key.clone(),
                    staged: Vec::new(),
                })
                .collect(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Record declared field types once the template's columns are known.
    ///
    /// Duplicate detection still compares the extracted values positionally.
    pub fn set_field_types(&mut self, types: &BTreeMap<String, String>) {
        for key in &mut self.unique {
            key.field_types = key
                .fields
                .iter()
                .filter_map(|field| types.get(field).map(|ty| (field.clone(), ty.clone())))
                .collect();
        }
    }

    /// Declared type of a unique key field, when known.
    pub fn field_type(&self, key: &str, field: &str) -> Option<&str> {
        self.unique
            .iter()
            .find(|state| state.name == key)
            .and_then(|state| state.field_types.get(field))
            .map(String::as_str)
    }

    /// Reference rows waiting for [`finalize`](Self::finalize).
    pub fn staged_references(&self) -> usize {
        self.reference.iter().map(|state| state.staged.len()).sum()
    }

    /// Check unique keys and stage reference keys for one (parameter-merged)
    /// row.
    pub fn add_row(
        &mut self,
        row: &Row,
        row_number: u64,
        table: &str,
        registry: &mut KeyRegistry,
        sink: &mut dyn IssueSink,
    ) {
        for key in &self.unique {
            let value = row.key_value(&key.fields);
            if value.all_nil() {
                sink.report(
                    Issue::new(
                        Code::UniqueKeyNilViolation,
                        key.severity,
                        format!(
                            "All key values are nil for unique key '{}' in table '{table}' row {row_number}",
                            key.name
                        ),
                    )
                    .with_template(&self.template)
                    .with_table(table)
                    .with_row(row_number)
                    .with_key(&key.name),
                );
                continue;
            }
            if registry.contains(key.set, &value) {
                sink.report(
                    Issue::new(
                        Code::UniqueKeyViolation,
                        key.severity,
                        format!(
                            "Duplicate unique key '{}' in table '{table}' row {row_number}: {value}",
                            key.name
                        ),
                    )
                    .with_template(&self.template)
                    .with_table(table)
                    .with_row(row_number)
                    .with_key(&key.name),
                );
            } else {
                registry.insert(key.set, value);
            }
        }

        for state in &mut self.reference {
            let value = row.key_value(&state.key.fields);
            if state.key.skip_nils && value.any_nil() {
                continue;
            }
            state.staged.push(StagedReference {
                table: table.to_string(),
                row: row_number,
                value,
            });
        }
    }

    /// Resolve staged reference rows against the registry. Referenced keys
    /// that never received a value set are skipped; metadata validation
    /// reports them.
    pub fn finalize(&mut self, registry: &KeyRegistry, sink: &mut dyn IssueSink) {
        for state in &mut self.reference {
            let key = &state.key;
            let staged = std::mem::take(&mut state.staged);
            let Some(set) = key
                .referenced_key_name
                .as_deref()
                .and_then(|name| registry.lookup(name))
            else {
                tracing::debug!(
                    key = %key.name,
                    skipped = staged.len(),
                    "referenced key has no recorded values"
                );
                continue;
            };
            for entry in staged {
                let exists = registry.contains(set, &entry.value);
                if exists == key.negate {
                    sink.report(
                        Issue::new(
                            Code::ReferenceKeyViolation,
                            key.severity,
                            format!(
                                "Reference key violation for '{}' in table '{}' row {}: {}",
                                key.name, entry.table, entry.row, entry.value
                            ),
                        )
                        .with_template(&self.template)
                        .with_table(&entry.table)
                        .with_row(entry.row)
                        .with_key(&key.name),
                    );
                }
            }
        }
    }
}
