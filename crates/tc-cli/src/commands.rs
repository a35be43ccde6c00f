use std::io::{self, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result};
use tc_cli::config::{OptionFlags, load_catalog, load_options};
use tc_cli::progress::Spinner;
use tc_ingest::{FileSource, FsSource, ZipSource, has_table_constraints};
use tc_model::{ValidationOptions, ValidationReport};
use tc_validate::{NoProgress, Progress, StaticCatalog, Validator};
use tracing::{info, warn};

use crate::cli::{DetectArgs, ValidateArgs};

pub fn run_validate(args: &ValidateArgs) -> Result<ValidationReport> {
    let file_options = match &args.config {
        Some(path) => load_options(path)?,
        None => ValidationOptions::default(),
    };
    let options = OptionFlags {
        validate_metadata: args.validate_metadata,
        force_load: args.force_load,
        lint: args.lint,
        max_issues: args.max_issues,
    }
    .apply(file_options);

    let catalog = args.concepts.as_deref().map(load_catalog).transpose()?;
    if options.lint && catalog.is_none() {
        warn!("taxonomy lint requested without a concept catalogue, skipping");
    }

    let spinner = (!args.no_progress && !args.json && io::stderr().is_terminal()).then(Spinner::new);
    let progress: &dyn Progress = match &spinner {
        Some(spinner) => spinner,
        None => &NoProgress,
    };

    match &args.archive {
        Some(archive) => {
            let source = ZipSource::open(archive)
                .with_context(|| format!("failed to open archive {}", archive.display()))?;
            let metadata = match &args.metadata {
                Some(path) => path.clone(),
                None => source.find_schema()?,
            };
            info!(archive = %archive.display(), metadata = %metadata.display(), "validating archived report");
            validate(&source, &metadata, options, progress, catalog.as_ref())
        }
        None => {
            let metadata = args
                .metadata
                .as_deref()
                .context("a METADATA file is required without --archive")?;
            validate(&FsSource, metadata, options, progress, catalog.as_ref())
        }
    }
}

fn validate(
    source: &dyn FileSource,
    metadata: &Path,
    options: ValidationOptions,
    progress: &dyn Progress,
    catalog: Option<&StaticCatalog>,
) -> Result<ValidationReport> {
    let mut validator = Validator::new(source)
        .with_options(options)
        .with_progress(progress);
    if let Some(catalog) = catalog {
        validator = validator.with_catalog(catalog);
    }
    Ok(validator.validate(metadata)?)
}

pub fn run_detect(args: &DetectArgs) -> Result<bool> {
    if !FsSource.exists(&args.metadata) {
        anyhow::bail!("metadata file not found: {}", args.metadata.display());
    }
    Ok(has_table_constraints(&args.metadata, &FsSource))
}
