//! Typed table builder: header `name[:type]` annotations + cell coercion.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::core::{
    config::ParseOptions,
    parser::{RawTable, parse},
};

// --- Column Types ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    String,
    Number,
    Boolean,
}

impl ColumnType {
    /// Case-sensitive match; anything unrecognised is a string column.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        match token {
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            _ => Self::String,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ColumnType,
}

impl ColumnSpec {
    /// Split a header cell on its first `:` into name and type token.
    #[must_use]
    pub fn from_header(cell: &str) -> Self {
        match cell.split_once(':') {
            Some((name, token)) => Self {
                name: name.to_owned(),
                kind: ColumnType::from_token(token.trim()),
            },
            None => Self {
                name: cell.to_owned(),
                kind: ColumnType::String,
            },
        }
    }
}

// --- Cells ---
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    String(String),
    Number(f64),
    Boolean(bool),
}

impl CellValue {
    /// Coerce one raw cell. Never fails: bad numbers become NaN.
    #[must_use]
    pub fn coerce(kind: ColumnType, raw: &str) -> Self {
        match kind {
            ColumnType::String => Self::String(raw.to_owned()),
            ColumnType::Number => Self::Number(parse_number(raw)),
            ColumnType::Boolean => Self::Boolean(parse_bool(raw)),
        }
    }

    /// Filler for a cell the data row did not supply.
    #[must_use]
    pub fn missing(kind: ColumnType) -> Self {
        match kind {
            ColumnType::String => Self::String(String::new()),
            ColumnType::Number => Self::Number(f64::NAN),
            ColumnType::Boolean => Self::Boolean(false),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) if n.is_nan() => f.write_str("NaN"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

// --- Helpers ---

/// `true|yes|1` and `false|no|0|""` case-insensitively; anything else is true.
#[must_use]
pub fn parse_bool(raw: &str) -> bool {
    !matches!(raw.to_ascii_lowercase().as_str(), "false" | "no" | "0" | "")
}

/// Numeric literal with the usual spreadsheet-export leniency.
///
/// Surrounding whitespace is ignored, blank means zero, `0x`/`0o`/`0b`
/// integers and `±Infinity` are accepted. Returns NaN on failure.
#[must_use]
pub fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(n) = parse_radix(s) {
        return n;
    }
    let plain = s
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    let parsed = if plain {
        lexical_core::parse::<f64>(s.as_bytes()).ok()
    } else {
        None
    };
    parsed.unwrap_or_else(|| {
        debug!(cell = raw, "number coercion failed");
        f64::NAN
    })
}

#[allow(clippy::cast_precision_loss)]
fn parse_radix(s: &str) -> Option<f64> {
    let (radix, digits) = match s.get(..2)? {
        "0x" | "0X" => (16, &s[2..]),
        "0o" | "0O" => (8, &s[2..]),
        "0b" | "0B" => (2, &s[2..]),
        _ => return None,
    };
    Some(u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64))
}

// --- Typed Table ---

/// Columns from the header row, rows coerced per column type.
///
/// Every row holds exactly `columns.len()` cells: short rows are padded
/// with [`CellValue::missing`], surplus cells are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypedTable {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TypedTable {
    /// First row is the header. An empty raw table gives an empty typed table.
    #[must_use]
    pub fn build(raw: RawTable) -> Self {
        let mut rows = raw.into_rows().into_iter();
        let Some(header) = rows.next() else {
            return Self::default();
        };
        let columns: Vec<ColumnSpec> = header.iter().map(|c| ColumnSpec::from_header(c)).collect();

        let rows = rows
            .enumerate()
            .map(|(line, row)| {
                if row.len() != columns.len() {
                    trace!(
                        line = line + 1,
                        got = row.len(),
                        want = columns.len(),
                        "row width differs from header"
                    );
                }
                let mut cells = row.into_iter();
                columns
                    .iter()
                    .map(|col| match cells.next() {
                        Some(raw) => CellValue::coerce(col.kind, &raw),
                        None => CellValue::missing(col.kind),
                    })
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Index of the column called `name`; the last one wins on duplicates.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().rposition(|c| c.name == name)
    }

    #[must_use]
    pub fn first_column_of(&self, kind: ColumnType) -> Option<usize> {
        self.columns.iter().position(|c| c.kind == kind)
    }

    /// Values of a number column, NaN where a cell is not a number.
    #[must_use]
    pub fn numeric_column(&self, index: usize) -> Vec<f64> {
        self.rows
            .iter()
            .map(|r| r.get(index).and_then(CellValue::as_f64).unwrap_or(f64::NAN))
            .collect()
    }
}

/// Parse + build in one go.
///
/// The builder consumes the header row itself, so `strip_header` is
/// ignored here: the header never reaches the data rows either way.
#[must_use]
pub fn parse_typed(text: &str, options: &ParseOptions) -> TypedTable {
    let options = ParseOptions {
        strip_header: false,
        ..options.clone()
    };
    TypedTable::build(parse(text, &options))
}
