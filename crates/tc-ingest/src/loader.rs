//! Schema loading with `documentInfo.extends` merging.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tc_model::Metadata;
use tc_model::names;
use tracing::{debug, warn};

use crate::error::{IngestError, Result};
use crate::source::{FileSource, normalize};

/// Load a schema document and everything it extends.
///
/// Extended documents are resolved relative to the extending document and
/// loaded recursively. Their `tableTemplates` entries and namespace bindings
/// are merged into the extending document, replacing entries of the same
/// name. A document already visited is not loaded again, and an extended
/// document that does not exist is skipped with a warning.
pub fn load_metadata(path: &Path, source: &dyn FileSource) -> Result<Metadata> {
    let path = normalize(path);
    let mut visited = HashSet::new();
    let document = load_document(&path, source, &mut visited)?;
    Metadata::from_document(document, Some(path.clone()))
        .map_err(|source| IngestError::Schema { path, source })
}

/// Parse one JSON document without following `extends`.
pub fn read_json(path: &Path, source: &dyn FileSource) -> Result<Value> {
    let mut document = Value::Null;
    source.read_with(path, &mut |reader| {
        document = serde_json::from_reader(reader).map_err(|error| IngestError::json(path, error))?;
        Ok(())
    })?;
    Ok(document)
}

fn load_document(
    path: &Path,
    source: &dyn FileSource,
    visited: &mut HashSet<PathBuf>,
) -> Result<Value> {
    visited.insert(path.to_path_buf());
    let mut document = read_json(path, source)?;

    let extends = extends_of(&document);
    if extends.is_empty() {
        return Ok(document);
    }

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    for extended in extends {
        let extended_path = normalize(&base_dir.join(&extended));
        if visited.contains(&extended_path) {
            debug!(path = %extended_path.display(), "extended document already loaded");
            continue;
        }
        if !source.exists(&extended_path) {
            warn!(
                path = %source.describe(&extended_path),
                "extended document not found, skipping"
            );
            continue;
        }
        debug!(path = %extended_path.display(), "merging extended document");
        let base = load_document(&extended_path, source, visited)?;
        merge_extended(&mut document, &base);
    }

    Ok(document)
}

/// Relative paths listed in `documentInfo.extends`.
pub fn extends_of(document: &Value) -> Vec<String> {
    document
        .get(names::DOCUMENT_INFO)
        .and_then(|info| info.get(names::EXTENDS))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Overlay the templates and namespace bindings of `base` onto `document`.
fn merge_extended(document: &mut Value, base: &Value) {
    let Some(root) = document.as_object_mut() else {
        return;
    };

    if let Some(templates) = base.get(names::TABLE_TEMPLATES).and_then(Value::as_object) {
        with_object(root, names::TABLE_TEMPLATES, |target| {
            for (name, template) in templates {
                target.insert(name.clone(), template.clone());
            }
        });
    }

    if let Some(bindings) = base
        .get(names::DOCUMENT_INFO)
        .and_then(|info| info.get(names::NAMESPACES))
        .and_then(Value::as_object)
    {
        with_object(root, names::DOCUMENT_INFO, |info| {
            with_object(info, names::NAMESPACES, |target| {
                for (prefix, uri) in bindings {
                    target.insert(prefix.clone(), uri.clone());
                }
            });
        });
    }
}

/// Run `update` on the object stored under `key`, creating it (or replacing a
/// non-object) first.
fn with_object(map: &mut Map<String, Value>, key: &str, update: impl FnOnce(&mut Map<String, Value>)) {
    let slot = map
        .entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(object) = slot {
        update(object);
    }
}
