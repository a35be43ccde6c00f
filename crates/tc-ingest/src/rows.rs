//! Streaming CSV rows.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord};
use tc_model::{Header, Row};

use crate::error::{IngestError, Result};

/// Reads a CSV table one record at a time; the first record is the header.
///
/// Records shorter than the header leave the remaining cells absent, extra
/// cells are ignored, blank lines are skipped.
pub struct CsvRows<R: Read> {
    reader: csv::Reader<R>,
    header: Arc<Header>,
    record: StringRecord,
    path: PathBuf,
}

impl<R: Read> CsvRows<R> {
    /// Open a reader and consume the header record.
    pub fn new(input: R, path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(input);
        let names = reader
            .headers()
            .map_err(|error| IngestError::csv(path, error))?
            .iter()
            .enumerate()
            .map(|(position, name)| {
                if position == 0 {
                    name.trim_start_matches('\u{feff}').to_string()
                } else {
                    name.to_string()
                }
            })
            .collect();
        Ok(Self {
            reader,
            header: Arc::new(Header::new(names)),
            record: StringRecord::new(),
            path: path.to_path_buf(),
        })
    }

    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    /// Next data row, `None` at end of input.
    pub fn next_row(&mut self) -> Result<Option<Row>> {
        let more = self
            .reader
            .read_record(&mut self.record)
            .map_err(|error| IngestError::csv(&self.path, error))?;
        if !more {
            return Ok(None);
        }
        let cells = (0..self.header.len())
            .map(|position| self.record.get(position).map(str::to_string))
            .collect();
        Ok(Some(Row::new(Arc::clone(&self.header), cells)))
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}
