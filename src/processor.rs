//! Record consumers
//!
//! A [`RecordProcessor`] receives records one at a time as they are pulled
//! from a file, so only the record in hand is held in memory unless the
//! processor chooses to keep it.

use crate::models::Record;
use crate::source::parse_file;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

pub trait RecordProcessor {
    type Output;

    /// Called for each record in input order. `index` starts at 0.
    fn process_record(&mut self, record: Record, index: usize) -> Result<()>;
    fn finalize(self) -> Result<Self::Output>;
}

/// Keeps every record.
#[derive(Debug, Default)]
pub struct CollectorProcessor {
    records: Vec<Record>,
}

impl CollectorProcessor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordProcessor for CollectorProcessor {
    type Output = Vec<Record>;

    fn process_record(&mut self, record: Record, _index: usize) -> Result<()> {
        self.records.push(record);
        Ok(())
    }

    fn finalize(self) -> Result<Self::Output> {
        Ok(self.records)
    }
}

/// Counts records without keeping them.
#[derive(Debug, Default)]
pub struct CountProcessor {
    count: usize,
}

impl CountProcessor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordProcessor for CountProcessor {
    type Output = usize;

    fn process_record(&mut self, _record: Record, _index: usize) -> Result<()> {
        self.count += 1;
        Ok(())
    }

    fn finalize(self) -> Result<Self::Output> {
        Ok(self.count)
    }
}

/// Feeds every record of `path` to `processor`, stopping at the first error.
pub fn process_file<P: RecordProcessor>(path: &Path, mut processor: P) -> Result<P::Output> {
    let records =
        parse_file(path).with_context(|| format!("Failed to open {}", path.display()))?;

    let mut processed = 0;
    for (index, record) in records.enumerate() {
        let record = record.with_context(|| format!("Failed to parse {}", path.display()))?;
        processor.process_record(record, index)?;
        processed += 1;
    }

    debug!(path = %path.display(), records = processed, "finished processing file");
    processor.finalize()
}

/// Convenience wrapper collecting all records of a file.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    process_file(path, CollectorProcessor::new())
}
