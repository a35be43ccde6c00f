//! Terminal spinner showing what a run is doing.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tc_validate::Progress;

pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    /// A spinner that draws nothing.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn message(&self) -> String {
        self.bar.message()
    }

    pub fn is_finished(&self) -> bool {
        self.bar.is_finished()
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for Spinner {
    fn status(&self, message: &str) {
        self.bar.set_message(message.to_string());
    }

    fn rows(&self, table: &str, rows: u64) {
        self.bar
            .set_message(format!("Validating table: {table} ({rows} rows)"));
    }

    fn finished(&self, summary: &str) {
        self.bar.set_message(summary.to_string());
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
