//! Output Formatting
//!
//! Writes records for people or for other programs.
//!
//! ## Formats
//!
//! - **pretty** - a `Record N` header per record, then `name: value` lines.
//!   Multi-line values continue on lines indented by two spaces, so the
//!   output reads back as the same records. Field names are coloured when
//!   colour is enabled.
//! - **json** - all records of one input as a single JSON array.
//! - **jsonl** - one JSON object per line, written as each record arrives.
//!
//! [`RecordPrinter`] is a [`RecordProcessor`], so it streams straight from
//! [`crate::processor::process_file`].

use crate::models::Record;
use crate::processor::RecordProcessor;
use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
    Jsonl,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pretty => "pretty",
            Self::Json => "json",
            Self::Jsonl => "jsonl",
        };
        f.write_str(name)
    }
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "jsonl" => Ok(Self::Jsonl),
            other => anyhow::bail!("Unknown output format: {} (expected pretty, json or jsonl)", other),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOptions {
    pub format: OutputFormat,
    pub color: bool,
    pub json_pretty: bool,
}

/// Streams records to a writer in the configured format.
pub struct RecordPrinter<W: Write> {
    out: W,
    options: PrintOptions,
    // Records are buffered only for the single-array JSON format.
    pending_json: Vec<Record>,
    printed: usize,
}

impl<W: Write> RecordPrinter<W> {
    pub fn new(out: W, options: PrintOptions) -> Self {
        Self {
            out,
            options,
            pending_json: Vec::new(),
            printed: 0,
        }
    }

    fn write_pretty(&mut self, record: &Record, index: usize) -> Result<()> {
        if self.printed > 0 {
            writeln!(self.out)?;
        }

        let header = format!("Record {}", index + 1);
        if self.options.color {
            writeln!(self.out, "{}", header.bold())?;
        } else {
            writeln!(self.out, "{}", header)?;
        }

        for (name, value) in record {
            let name = if self.options.color {
                name.cyan().to_string()
            } else {
                name.to_string()
            };

            let mut lines = value.split('\n');
            let first = lines.next().unwrap_or_default();
            writeln!(self.out, "{}: {}", name, first)?;
            for line in lines {
                writeln!(self.out, "  {}", line)?;
            }
        }
        Ok(())
    }

    fn write_json_line(&mut self, record: &Record) -> Result<()> {
        serde_json::to_writer(&mut self.out, record).context("Failed to serialize record")?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> RecordProcessor for RecordPrinter<W> {
    /// Number of records written.
    type Output = usize;

    fn process_record(&mut self, record: Record, index: usize) -> Result<()> {
        match self.options.format {
            OutputFormat::Pretty => self.write_pretty(&record, index)?,
            OutputFormat::Jsonl => self.write_json_line(&record)?,
            OutputFormat::Json => self.pending_json.push(record),
        }
        self.printed += 1;
        Ok(())
    }

    fn finalize(mut self) -> Result<Self::Output> {
        if self.options.format == OutputFormat::Json {
            if self.options.json_pretty {
                serde_json::to_writer_pretty(&mut self.out, &self.pending_json)
            } else {
                serde_json::to_writer(&mut self.out, &self.pending_json)
            }
            .context("Failed to serialize records")?;
            writeln!(self.out)?;
        }
        self.out.flush()?;
        Ok(self.printed)
    }
}
