//! Validation options from a TOML file, with command-line flags on top.
//!
//! ```toml
//! validate_metadata = true
//! force_load = false
//! lint = false
//! max_issues_per_code = 100
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tc_model::ValidationOptions;
use tc_validate::StaticCatalog;

/// Read options from a TOML file. Missing keys take their defaults.
pub fn load_options(path: &Path) -> Result<ValidationOptions> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("invalid config file {}", path.display()))
}

/// Read a concept catalogue for the taxonomy linter.
pub fn load_catalog(path: &Path) -> Result<StaticCatalog> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read concept catalogue {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("invalid concept catalogue {}", path.display()))
}

/// Options given as flags. A flag that is set wins over the file; an unset
/// flag leaves the file's value alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionFlags {
    pub validate_metadata: bool,
    pub force_load: bool,
    pub lint: bool,
    pub max_issues: Option<usize>,
}

impl OptionFlags {
    pub fn apply(self, mut options: ValidationOptions) -> ValidationOptions {
        options.validate_metadata |= self.validate_metadata;
        options.force_load |= self.force_load;
        options.lint |= self.lint;
        if self.max_issues.is_some() {
            options.max_issues_per_code = self.max_issues;
        }
        options
    }
}
