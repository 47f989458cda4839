//! Record Builder
//!
//! Turns a stream of text lines into [`Record`]s. Each line is classified on
//! its own, without lookahead:
//!
//! | Line                              | Kind         | Effect                                   |
//! |-----------------------------------|--------------|------------------------------------------|
//! | starts with `#`                   | Comment      | ignored                                  |
//! | empty or whitespace only          | Blank        | emits the pending block, if any          |
//! | starts with space or tab          | Continuation | appended to the current field            |
//! | contains `:`                      | Field-start  | sets or extends a field, becomes current |
//! | anything else                     | Malformed    | [`SyntaxError::MalformedFieldLine`]      |
//!
//! Values are kept raw while a block is accumulated, line terminators
//! included, so a continued field reads `first\nsecond` once finished. A
//! field named twice in one block is extended, never overwritten. Trailing
//! `\r`/`\n` are stripped once per value when the record is emitted.
//!
//! ## Usage
//!
//! ```rust
//! use record_chunks::parser::parse_str;
//!
//! let text = "id: 1\nnote: first\n  second\n\nid: 2\n";
//! let records = parse_str(text).collect::<Result<Vec<_>, _>>().unwrap();
//!
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[0].get("note"), Some("first\nsecond"));
//! ```
//!
//! The line source is any iterator of `io::Result` lines, so readers and
//! in-memory text share one implementation. File and gzip handling lives in
//! [`crate::source`].

use crate::error::{RecordError, Result, SyntaxError};
use crate::models::Record;
use std::collections::BTreeMap;
use std::io;
use std::iter::Map;
use std::str::SplitInclusive;
use tracing::trace;

/// Classification of a single input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    Comment,
    Blank,
    /// Indented line; holds the text after the indentation.
    Continuation(&'a str),
    /// `name: value` line; `value` has its leading whitespace removed.
    FieldStart { name: &'a str, value: &'a str },
    Malformed,
}

/// Classifies one line. Comment and blank take priority over everything
/// else, and the split happens at the first `:` only.
pub fn classify(line: &str) -> LineKind<'_> {
    if line.starts_with('#') {
        return LineKind::Comment;
    }
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if line.starts_with([' ', '\t']) {
        return LineKind::Continuation(line.trim_start_matches([' ', '\t']));
    }
    match line.split_once(':') {
        Some((name, value)) => LineKind::FieldStart {
            name,
            value: value.trim_start(),
        },
        None => LineKind::Malformed,
    }
}

/// Fields accumulated for the block being read, plus the field a
/// continuation line would extend.
#[derive(Debug, Default)]
struct PendingBlock {
    fields: BTreeMap<String, String>,
    current_key: Option<String>,
}

impl PendingBlock {
    /// Applies one line. Returns a record when the line closes a block.
    fn feed(
        &mut self,
        line: &str,
        line_number: usize,
    ) -> std::result::Result<Option<Record>, SyntaxError> {
        match classify(line) {
            LineKind::Comment => Ok(None),
            LineKind::Blank => Ok(self.finish()),
            LineKind::Continuation(rest) => {
                let Some(key) = self.current_key.as_ref() else {
                    return Err(SyntaxError::UnexpectedContinuation {
                        line_number,
                        line: line.to_string(),
                    });
                };
                self.fields.entry(key.clone()).or_default().push_str(rest);
                Ok(None)
            }
            LineKind::FieldStart { name, value } => {
                self.fields
                    .entry(name.to_string())
                    .or_default()
                    .push_str(value);
                self.current_key = Some(name.to_string());
                Ok(None)
            }
            LineKind::Malformed => Err(SyntaxError::MalformedFieldLine {
                line_number,
                line: line.to_string(),
            }),
        }
    }

    /// Takes the accumulated fields as a record and resets the block.
    /// An empty block yields nothing.
    fn finish(&mut self) -> Option<Record> {
        self.current_key = None;
        if self.fields.is_empty() {
            return None;
        }

        let mut fields = std::mem::take(&mut self.fields);
        for value in fields.values_mut() {
            let kept = value.trim_end_matches(['\r', '\n']).len();
            value.truncate(kept);
        }
        Some(Record::from(fields))
    }
}

/// Lazy sequence of records read from a line source.
///
/// Pulls one line at a time and holds at most one pending block. The first
/// error ends the sequence: it is yielded once and `None` follows. Dropping
/// the iterator drops the line source with it.
#[derive(Debug)]
pub struct Records<L> {
    lines: L,
    block: PendingBlock,
    line_number: usize,
    finished: bool,
}

impl<L> Records<L> {
    pub fn new(lines: L) -> Self {
        Self {
            lines,
            block: PendingBlock::default(),
            line_number: 0,
            finished: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn into_inner(self) -> L {
        self.lines
    }
}

impl<L, S> Iterator for Records<L>
where
    L: Iterator<Item = io::Result<S>>,
    S: AsRef<str>,
{
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(err)) => {
                    self.finished = true;
                    return Some(Err(RecordError::Io(err)));
                }
                None => {
                    self.finished = true;
                    return self.block.finish().map(|record| {
                        trace!(line_number = self.line_number, fields = record.len(), "record complete at end of input");
                        Ok(record)
                    });
                }
            };

            self.line_number += 1;
            match self.block.feed(line.as_ref(), self.line_number) {
                Ok(Some(record)) => {
                    trace!(line_number = self.line_number, fields = record.len(), "record complete");
                    return Some(Ok(record));
                }
                Ok(None) => {}
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err.into()));
                }
            }
        }
    }
}

impl<L, S> std::iter::FusedIterator for Records<L>
where
    L: Iterator<Item = io::Result<S>>,
    S: AsRef<str>,
{
}

/// Line source over lines that cannot fail.
pub type InfallibleLines<I, S> = Map<I, fn(S) -> io::Result<S>>;

/// Records parsed from in-memory text.
pub type StrRecords<'a> = Records<InfallibleLines<SplitInclusive<'a, char>, &'a str>>;

/// Parses lines that are already in memory. Each line should keep its
/// terminator; the last one may lack it.
pub fn parse_lines<I, S>(lines: I) -> Records<InfallibleLines<I::IntoIter, S>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Records::new(lines.into_iter().map(Ok as fn(S) -> io::Result<S>))
}

/// Parses a whole text buffer.
pub fn parse_str(text: &str) -> StrRecords<'_> {
    parse_lines(text.split_inclusive('\n'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_all(text: &str) -> Vec<Record> {
        parse_str(text).collect::<Result<Vec<_>>>().unwrap()
    }

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify("# a: b\n"), LineKind::Comment);
        assert_eq!(classify("   \t\n"), LineKind::Blank);
        assert_eq!(classify("\n"), LineKind::Blank);
        assert_eq!(classify(""), LineKind::Blank);
        assert_eq!(classify("  more\n"), LineKind::Continuation("more\n"));
        assert_eq!(classify("\tmore\n"), LineKind::Continuation("more\n"));
        assert_eq!(classify("novalue\n"), LineKind::Malformed);
    }

    #[test]
    fn test_classify_indented_comment_is_continuation() {
        assert_eq!(classify("  # not a comment\n"), LineKind::Continuation("# not a comment\n"));
    }

    #[test]
    fn test_classify_splits_at_first_colon() {
        assert_eq!(
            classify("url: http://example.com:80\n"),
            LineKind::FieldStart {
                name: "url",
                value: "http://example.com:80\n"
            }
        );
        assert_eq!(
            classify("Key Name :value\n"),
            LineKind::FieldStart {
                name: "Key Name ",
                value: "value\n"
            }
        );
    }

    #[test]
    fn test_single_field() {
        assert_eq!(parse_all("a:   1\n"), vec![record(&[("a", "1")])]);
    }

    #[test]
    fn test_continuation_keeps_line_break() {
        assert_eq!(parse_all("a: x\n y\n"), vec![record(&[("a", "x\ny")])]);
    }

    #[test]
    fn test_continuation_strips_indentation_only() {
        let records = parse_all("a: x\n \t y z  \n");
        assert_eq!(records[0].get("a"), Some("x\ny z  "));
    }

    #[test]
    fn test_repeated_key_appends() {
        assert_eq!(parse_all("a: x\na: y\n"), vec![record(&[("a", "x\ny")])]);
    }

    #[test]
    fn test_repeated_key_without_terminator_concatenates() {
        let records: Vec<Record> = parse_lines(["a: x", "a: y"])
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records, vec![record(&[("a", "xy")])]);
    }

    #[test]
    fn test_repeated_key_then_continuation() {
        let records = parse_all("a: 1\nb: 2\na: 3\n  4\n");
        assert_eq!(records, vec![record(&[("a", "1\n3\n4"), ("b", "2")])]);
    }

    #[test]
    fn test_empty_value_then_continuation() {
        assert_eq!(parse_all("a:\n  body\n"), vec![record(&[("a", "body")])]);
    }

    #[test]
    fn test_comments_are_invisible() {
        assert_eq!(
            parse_all("# note\na: 1\n# note\n\n"),
            vec![record(&[("a", "1")])]
        );
    }

    #[test]
    fn test_comment_keeps_current_key() {
        let records = parse_all("a: 1\n# c\n  more\n");
        assert_eq!(records[0].get("a"), Some("1\nmore"));
    }

    #[test]
    fn test_comment_between_blocks() {
        let records = parse_all("a: 1\n\n# between\n\nb: 2\n");
        assert_eq!(records, vec![record(&[("a", "1")]), record(&[("b", "2")])]);
    }

    #[test]
    fn test_no_trailing_newline() {
        assert_eq!(
            parse_all("a: 1\nb: 2"),
            vec![record(&[("a", "1"), ("b", "2")])]
        );
    }

    #[test]
    fn test_blank_lines_produce_no_empty_records() {
        let records = parse_all("\n\n  \na: 1\n\n\n\nb: 2\n\n\n");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_all("").is_empty());
        assert!(parse_all("# only a comment\n").is_empty());
    }

    #[test]
    fn test_crlf_terminators_stripped() {
        let records = parse_all("a: 1\r\nb: 2\r\n\r\n");
        assert_eq!(records, vec![record(&[("a", "1"), ("b", "2")])]);
    }

    #[test]
    fn test_trailing_spaces_kept() {
        assert_eq!(parse_all("a: 1  \n")[0].get("a"), Some("1  "));
    }

    #[test]
    fn test_unexpected_continuation() {
        let mut records = parse_str(" x: y\n");
        let err = records.next().unwrap().unwrap_err();
        assert_eq!(
            err.as_syntax(),
            Some(&SyntaxError::UnexpectedContinuation {
                line_number: 1,
                line: " x: y\n".to_string()
            })
        );
        assert!(records.next().is_none());
    }

    #[test]
    fn test_continuation_after_blank_line_fails() {
        let mut records = parse_str("a: 1\n\n  more\n");
        assert_eq!(records.next().unwrap().unwrap(), record(&[("a", "1")]));
        let err = records.next().unwrap().unwrap_err();
        assert!(matches!(
            err.as_syntax(),
            Some(SyntaxError::UnexpectedContinuation { line_number: 3, .. })
        ));
    }

    #[test]
    fn test_malformed_field_line() {
        let mut records = parse_str("a: 1\nnovalue\nb: 2\n");
        let err = records.next().unwrap().unwrap_err();
        assert_eq!(
            err.as_syntax(),
            Some(&SyntaxError::MalformedFieldLine {
                line_number: 2,
                line: "novalue\n".to_string()
            })
        );
        assert!(records.next().is_none());
        assert_eq!(records.line_number(), 2);
    }

    #[test]
    fn test_records_emitted_before_error_survive() {
        let results: Vec<_> = parse_str("a: 1\n\nbad\n").collect();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].as_ref().unwrap(), &record(&[("a", "1")]));
        assert!(results[1].is_err());
    }

    #[test]
    fn test_io_error_ends_sequence() {
        let lines = vec![
            Ok("a: 1\n".to_string()),
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad bytes")),
            Ok("b: 2\n".to_string()),
        ];
        let mut records = Records::new(lines.into_iter());
        assert!(matches!(records.next(), Some(Err(RecordError::Io(_)))));
        assert!(records.next().is_none());
    }

    #[test]
    fn test_lazy_pull() {
        let mut pulled = 0;
        let lines = ["a: 1\n", "\n", "b: 2\n", "\n"].into_iter().map(|line| {
            pulled += 1;
            Ok::<_, io::Error>(line)
        });
        let mut records = Records::new(lines);
        records.next().unwrap().unwrap();
        drop(records);
        assert_eq!(pulled, 2);
    }

    #[test]
    fn test_reparse_is_identical() {
        let text = "a: 1\n  2\n\n# c\nb: x:y\n";
        assert_eq!(parse_all(text), parse_all(text));
    }
}
