//! Quick check whether a schema uses the Table Constraints extension.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tc_model::names;

use crate::loader::extends_of;
use crate::source::{FileSource, normalize, read_to_string};

/// Bytes inspected for a literal `tc:` before parsing the document.
const PREVIEW_BYTES: usize = 10_000;

/// True when the document at `path`, or any document it extends, carries
/// `tc:` properties. Unreadable or malformed documents count as `false`.
pub fn has_table_constraints(path: &Path, source: &dyn FileSource) -> bool {
    let mut checked = HashSet::new();
    check(&normalize(path), source, &mut checked)
}

fn check(path: &Path, source: &dyn FileSource, checked: &mut HashSet<PathBuf>) -> bool {
    if !checked.insert(path.to_path_buf()) {
        return false;
    }
    let Ok(content) = read_to_string(source, path) else {
        return false;
    };

    let preview = &content[..preview_end(&content)];
    if preview.contains("tc:") {
        return true;
    }
    if !preview.contains("\"documentInfo\"") || !preview.contains("xbrl-csv") {
        return false;
    }

    let Ok(document) = serde_json::from_str::<Value>(&content) else {
        return false;
    };
    if declares_tc_property(&document) {
        return true;
    }

    let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
    extends_of(&document).iter().any(|extended| {
        let extended = normalize(&base_dir.join(extended));
        source.exists(&extended) && check(&extended, source, checked)
    })
}

/// A `tc:` key on the root object or on any template.
fn declares_tc_property(document: &Value) -> bool {
    let has_tc_key = |value: &Value| {
        value
            .as_object()
            .is_some_and(|object| object.keys().any(|key| names::is_tc_property(key)))
    };
    has_tc_key(document)
        || document
            .get(names::TABLE_TEMPLATES)
            .and_then(Value::as_object)
            .is_some_and(|templates| templates.values().any(has_tc_key))
}

fn preview_end(content: &str) -> usize {
    let mut end = content.len().min(PREVIEW_BYTES);
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    end
}
