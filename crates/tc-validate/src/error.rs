use std::path::PathBuf;

use tc_ingest::IngestError;

/// A run that aborted before completing. Violations found up to that point
/// have already been reported to the sink.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("failed to load metadata {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: IngestError,
    },

    #[error("failed to stream table '{table}': {source}")]
    Table {
        table: String,
        #[source]
        source: IngestError,
    },
}

impl ValidationError {
    /// The phase of the run that failed.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Load { .. } => "loading metadata",
            Self::Table { .. } => "streaming tables",
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
