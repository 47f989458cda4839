//! Line sources backed by files
//!
//! Picks plain or gzip decoding from the file name and hands the record
//! builder a [`LineReader`] that owns the open file. The file is closed when
//! the returned [`Records`] iterator is dropped, whether it ran to the end,
//! stopped on an error or was abandoned half way.

use crate::error::{RecordError, Result};
use crate::parser::Records;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::debug;

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Records read from a file opened by [`parse_file`].
pub type FileRecords = Records<LineReader<Box<dyn BufRead>>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Plain,
    Gzip,
}

impl Compression {
    /// A file name ending in `.gz`, in any letter case, selects gzip.
    /// `.gz` on its own counts too.
    pub fn from_path(path: &Path) -> Self {
        let is_gzip = path.file_name().is_some_and(|name| {
            let name = name.to_string_lossy();
            let name = name.as_bytes();
            name.len() >= 3 && name[name.len() - 3..].eq_ignore_ascii_case(b".gz")
        });

        if is_gzip {
            Self::Gzip
        } else {
            Self::Plain
        }
    }
}

/// Iterator over the lines of a reader, terminators included.
///
/// `\r\n` is reported as `\n`; a lone `\r` is not a line break. Invalid
/// UTF-8 surfaces as an [`io::ErrorKind::InvalidData`] error.
#[derive(Debug)]
pub struct LineReader<R> {
    reader: R,
    strip_bom: bool,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            strip_bom: false,
        }
    }

    /// Drops a byte order mark at the start of the first line.
    pub fn skip_bom(mut self) -> Self {
        self.strip_bom = true;
        self
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                if std::mem::take(&mut self.strip_bom) && line.starts_with(BYTE_ORDER_MARK) {
                    line.replace_range(..BYTE_ORDER_MARK.len_utf8(), "");
                }
                if line.ends_with("\r\n") {
                    line.truncate(line.len() - 2);
                    line.push('\n');
                }
                Some(Ok(line))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// Parses records from any buffered reader.
pub fn parse_reader<R: BufRead>(reader: R) -> Records<LineReader<R>> {
    Records::new(LineReader::new(reader))
}

/// Opens `path` as a line source, decompressing gzip files transparently.
pub fn open_lines(path: &Path) -> Result<LineReader<Box<dyn BufRead>>> {
    let compression = Compression::from_path(path);
    debug!(path = %path.display(), ?compression, "opening record source");

    let file = File::open(path).map_err(|source| RecordError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let lines = match compression {
        Compression::Gzip => {
            let reader: Box<dyn BufRead> = Box::new(BufReader::new(MultiGzDecoder::new(file)));
            LineReader::new(reader)
        }
        Compression::Plain => {
            let reader: Box<dyn BufRead> = Box::new(BufReader::new(file));
            LineReader::new(reader).skip_bom()
        }
    };
    Ok(lines)
}

/// Opens `path` and returns its records as a lazy sequence.
pub fn parse_file(path: impl AsRef<Path>) -> Result<FileRecords> {
    Ok(Records::new(open_lines(path.as_ref())?))
}
