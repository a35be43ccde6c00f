//! Non-normative consistency checks of constraints against a concept
//! catalogue (`tcl:*`). Findings are always warnings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tc_model::names::{self, XSD_NAMESPACE};
use tc_model::{Code, Constraint, Issue, Metadata, Namespaces};

use crate::sink::IssueSink;
use crate::types::{self, XsdType};

/// Base-type chains longer than this are treated as cyclic.
const MAX_DERIVATION_DEPTH: usize = 64;

/// A namespace-qualified name, written `{namespace}local` in text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub struct ExpandedName {
    pub namespace: String,
    pub local: String,
}

impl ExpandedName {
    pub fn new(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            local: local.into(),
        }
    }

    /// Resolve a `prefix:local` name against the schema's bindings.
    pub fn resolve(qname: &str, namespaces: &Namespaces) -> Option<Self> {
        let (prefix, local) = qname.split_once(':')?;
        let namespace = namespaces.resolve(prefix).filter(|uri| !uri.is_empty())?;
        Some(Self::new(namespace, local))
    }

    pub fn is_xsd(&self) -> bool {
        self.namespace == XSD_NAMESPACE
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}{}", self.namespace, self.local)
    }
}

impl FromStr for ExpandedName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rest = s
            .strip_prefix('{')
            .ok_or_else(|| format!("expected '{{namespace}}local', got '{s}'"))?;
        let (namespace, local) = rest
            .split_once('}')
            .ok_or_else(|| format!("unterminated namespace in '{s}'"))?;
        if local.is_empty() {
            return Err(format!("missing local name in '{s}'"));
        }
        Ok(Self::new(namespace, local))
    }
}

impl TryFrom<String> for ExpandedName {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Concept and type lookups supplied by a loaded taxonomy.
pub trait ConceptCatalog {
    /// Declared type of a concept.
    fn concept_type(&self, concept: &ExpandedName) -> Option<ExpandedName>;

    /// Type of the typed domain of a typed dimension. `None` for explicit
    /// dimensions and unknown names.
    fn typed_domain_type(&self, dimension: &ExpandedName) -> Option<ExpandedName>;

    /// Direct base type of a type.
    fn base_type(&self, ty: &ExpandedName) -> Option<ExpandedName>;

    /// `ty` is `base` or derives from it through base types.
    fn is_derived_from(&self, ty: &ExpandedName, base: &ExpandedName) -> bool {
        let mut current = ty.clone();
        for _ in 0..MAX_DERIVATION_DEPTH {
            if &current == base {
                return true;
            }
            match self.base_type(&current) {
                Some(next) => current = next,
                None => return false,
            }
        }
        false
    }
}

/// A catalogue read from a JSON document:
///
/// ```json
/// {
///   "concepts": { "{ns}Concept": "{ns}type" },
///   "typedDimensions": { "{ns}Dim": "{ns}domainType" },
///   "types": { "{ns}type": "{ns}baseType" }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaticCatalog {
    pub concepts: BTreeMap<ExpandedName, ExpandedName>,
    pub typed_dimensions: BTreeMap<ExpandedName, ExpandedName>,
    pub types: BTreeMap<ExpandedName, ExpandedName>,
}

impl ConceptCatalog for StaticCatalog {
    fn concept_type(&self, concept: &ExpandedName) -> Option<ExpandedName> {
        self.concepts.get(concept).cloned()
    }

    fn typed_domain_type(&self, dimension: &ExpandedName) -> Option<ExpandedName> {
        self.typed_dimensions.get(dimension).cloned()
    }

    fn base_type(&self, ty: &ExpandedName) -> Option<ExpandedName> {
        self.types.get(ty).cloned()
    }
}

/// Lint every constrained column whose fixed concept or typed dimension is
/// known to `catalog`. Returns the number of warnings.
pub fn lint(metadata: &Metadata, catalog: &dyn ConceptCatalog, sink: &mut dyn IssueSink) -> usize {
    let namespaces = metadata.namespaces();
    let mut warnings = 0;
    for template in metadata.table_templates() {
        for column in &template.columns {
            let Some(constraint) = &column.constraint else {
                continue;
            };
            let Some(taxonomy_type) = column
                .dimensions
                .as_ref()
                .and_then(|dimensions| column_type(dimensions, namespaces, catalog))
            else {
                continue;
            };
            let context = format!("template:{}, column:{}", template.name, column.name);
            for (code, message) in findings(constraint, &taxonomy_type, namespaces, catalog) {
                warnings += 1;
                sink.report(
                    Issue::warning(code, format!("{message} at {context}"))
                        .with_template(&template.name)
                        .with_field(&column.name),
                );
            }
        }
    }
    tracing::debug!(warnings, "taxonomy lint finished");
    warnings
}

/// Type implied by a column's dimensions: the fixed concept's type, else the
/// domain type of the first typed dimension.
fn column_type(
    dimensions: &serde_json::Map<String, serde_json::Value>,
    namespaces: &Namespaces,
    catalog: &dyn ConceptCatalog,
) -> Option<ExpandedName> {
    let concept = dimensions
        .get("concept")
        .and_then(serde_json::Value::as_str)
        .and_then(|concept| ExpandedName::resolve(concept, namespaces))
        .and_then(|concept| catalog.concept_type(&concept));
    if concept.is_some() {
        return concept;
    }
    dimensions
        .keys()
        .filter(|name| !names::is_core_dimension(name))
        .filter_map(|name| ExpandedName::resolve(name, namespaces))
        .find_map(|dimension| catalog.typed_domain_type(&dimension))
}

fn findings(
    constraint: &Constraint,
    taxonomy_type: &ExpandedName,
    namespaces: &Namespaces,
    catalog: &dyn ConceptCatalog,
) -> Vec<(Code, String)> {
    let mut found = Vec::new();

    if let Some(type_name) = constraint.type_name.as_deref()
        && let Some(declared) = ExpandedName::resolve(type_name, namespaces)
        && declared != *taxonomy_type
        && !catalog.is_derived_from(&declared, taxonomy_type)
    {
        found.push((
            Code::LintInconsistentType,
            format!(
                "Constraint type '{type_name}' may not be consistent with taxonomy type '{taxonomy_type}'"
            ),
        ));
    }

    if let Some(allowed) = &constraint.allowed_values
        && let Some(base) = xsd_base(taxonomy_type, catalog)
    {
        for value in allowed {
            if let Err(message) = types::validate_typed(value, types::TypeRef::Xsd(base), namespaces)
            {
                let message = message.unwrap_or_default();
                found.push((
                    Code::LintInvalidAllowedValue,
                    format!(
                        "Allowed value '{value}' may not be valid for taxonomy type '{taxonomy_type}': {message}"
                    ),
                ));
            }
        }
    }
    found
}

/// The XML Schema built-in a type ultimately derives from.
fn xsd_base(ty: &ExpandedName, catalog: &dyn ConceptCatalog) -> Option<XsdType> {
    let mut current = ty.clone();
    for _ in 0..MAX_DERIVATION_DEPTH {
        if current.is_xsd() {
            return XsdType::from_local_name(&current.local);
        }
        current = catalog.base_type(&current)?;
    }
    None
}
