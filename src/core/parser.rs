//! Tolerant delimited-text tokenizer.
//!
//! One left-to-right scan with a field accumulator and a row accumulator.
//! Malformed input is never rejected:
//! * an unterminated quote runs to the end of the input,
//! * separators inside quotes are literal data,
//! * a trailing row shorter than the first row is dropped.

use std::iter::Peekable;
use std::str::Chars;

use crate::core::config::ParseOptions;

/// Rows of string fields, immutable once returned by [`parse`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Vec<String>>,
}

impl RawTable {
    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
    #[inline]
    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}

impl From<Vec<Vec<String>>> for RawTable {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }
}

/// Accumulators for one scan.
struct Scan {
    trim: bool,
    cur: String,
    row: Vec<String>,
    table: Vec<Vec<String>>,
}

impl Scan {
    fn close_field(&mut self) {
        let mut field = std::mem::take(&mut self.cur);
        if self.trim {
            let t = field.trim();
            if t.len() != field.len() {
                field = t.to_owned();
            }
        }
        self.row.push(field);
    }

    fn close_row(&mut self) {
        self.close_field();
        self.table.push(std::mem::take(&mut self.row));
    }
}

/// Does the record separator start at the current character?
#[inline]
fn at_record_end(second: Option<char>, rest: &mut Peekable<Chars<'_>>) -> bool {
    match second {
        None => true,
        Some(s) => rest.peek() == Some(&s),
    }
}

/// Split `text` into rows of fields.
///
/// Never fails. Empty input yields a single row holding one empty field.
#[must_use]
pub fn parse(text: &str, options: &ParseOptions) -> RawTable {
    let quote = options.quote_char;
    let field_sep = options.field_separator;
    let (rec_first, rec_second) = options.record_chars();

    let mut scan = Scan {
        trim: options.trim_fields,
        cur: String::new(),
        row: Vec::new(),
        table: Vec::new(),
    };
    let mut in_quotes = false;
    let mut it = text.chars().peekable();

    // Quote beats field separator beats record separator when options collide.
    while let Some(c) = it.next() {
        if c == quote {
            if in_quotes && it.peek() == Some(&quote) {
                scan.cur.push(quote);
                it.next();
            } else {
                in_quotes = !in_quotes;
            }
        } else if c == field_sep && !in_quotes {
            scan.close_field();
        } else if c == rec_first && !in_quotes && at_record_end(rec_second, &mut it) {
            scan.close_row();
            if rec_second.is_some() {
                it.next();
            }
        } else {
            scan.cur.push(c);
        }
    }
    scan.close_row();

    let mut table = scan.table;
    if options.strip_header && !table.is_empty() {
        table.remove(0);
    }
    if let (Some(first), Some(last)) = (table.first(), table.last()) {
        if last.len() < first.len() {
            table.pop();
        }
    }
    RawTable { rows: table }
}
