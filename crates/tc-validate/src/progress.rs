//! Observational progress callbacks.

/// Receives status messages while a run proceeds. Purely informational.
pub trait Progress {
    fn status(&self, message: &str);

    /// Rows streamed so far for the current table.
    fn rows(&self, _table: &str, _rows: u64) {}

    fn finished(&self, _summary: &str) {}
}

/// Ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn status(&self, _message: &str) {}
}
