//! Record Chunks Library
//!
//! Reads text files made of `key: value` records separated by blank lines,
//! optionally gzip-compressed, and yields each record lazily as a field name
//! to value mapping.
//!
//! ```text
//! # comments start at column 0
//! id: 1
//! description: a value that
//!   continues on indented lines
//!
//! id: 2
//! ```
//!
//! ## Architecture Overview
//!
//! - [`parser`] - line classification and the record builder; works on any
//!   line source, with no file or compression concerns
//! - [`source`] - opens files, detects gzip by suffix, feeds lines to the parser
//! - [`processor`] - consumers that receive records as they are pulled
//! - [`display`] - pretty, JSON and JSON lines output
//! - [`config`] - configuration with file and environment variable support
//! - [`logging`] - structured logging setup
//! - [`error`] - error taxonomy
//!
//! ## Main Entry Point
//!
//! ```rust,no_run
//! use record_chunks::parse_file;
//!
//! # fn example() -> record_chunks::Result<()> {
//! for record in parse_file("data.txt.gz")? {
//!     let record = record?;
//!     println!("{:?}", record.get("id"));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Parsing stops at the first malformed line; see [`SyntaxError`].

pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
pub mod parser;
pub mod processor;
pub mod source;

pub use error::{RecordError, Result, SyntaxError};
pub use models::Record;
pub use parser::{classify, parse_lines, parse_str, LineKind, Records};
pub use source::{parse_file, parse_reader, Compression, LineReader};
