//! Module: decode
//! Responsibility: comma/newline literal tables → typed rows, and back.
//!
//! Format: one row per line, fields separated by commas, each field trimmed.
//! Blank lines are skipped. There is no quoting, so a field cannot contain a
//! comma or a line break, and a single-column row cannot be empty text.


use crate::value::{ColumnType, Value};
use derive_more::{Deref, From, IntoIterator};
use thiserror::Error as ThisError;

/// Bare word decoded as SQL NULL regardless of declared type.
pub const NULL_LITERAL: &str = "NULL";

///
/// DecodeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum DecodeError {
    #[error("row {row} has {found} field(s), expected {expected}")]
    FieldCount {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}, column {column}: '{field}' is not a valid {expected}")]
    Field {
        row: usize,
        column: usize,
        field: String,
        expected: ColumnType,
    },
}

///
/// RowSet
///
/// Ordered rows of values, each aligned to the same column order.
///

#[derive(Clone, Debug, Default, Deref, From, IntoIterator, PartialEq)]
#[into_iterator(owned, ref)]
pub struct RowSet(Vec<Vec<Value>>);

impl RowSet {
    #[must_use]
    pub const fn new(rows: Vec<Vec<Value>>) -> Self {
        Self(rows)
    }

    /// Width of the first row; an empty set has no width.
    #[must_use]
    pub fn width(&self) -> Option<usize> {
        self.0.first().map(Vec::len)
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.0
    }
}

/// Best-effort inference: integer, then float, then text.
#[must_use]
pub fn infer(field: &str) -> Value {
    if field == NULL_LITERAL {
        return Value::Null;
    }

    let digits = field.strip_prefix(['+', '-']).unwrap_or(field);
    if !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
        && let Ok(v) = field.parse::<i64>()
    {
        return Value::Int(v);
    }

    // require a digit so `inf` / `nan` stay text
    if field.bytes().any(|b| b.is_ascii_digit())
        && let Ok(v) = field.parse::<f64>()
        && v.is_finite()
    {
        return Value::Float(v);
    }

    Value::Text(field.to_string())
}

/// Decode one trimmed field, honouring a declared type when present.
#[must_use]
pub fn decode_field(field: &str, ty: Option<ColumnType>) -> Option<Value> {
    let field = field.trim();

    match ty {
        _ if field == NULL_LITERAL => Some(Value::Null),
        Some(ty) => ty.parse(field),
        None => Some(infer(field)),
    }
}

/// Non-blank lines of a literal table.
pub fn literal_lines(literal: &str) -> impl Iterator<Item = &str> {
    literal
        .split('\n')
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.trim().is_empty())
}

/// Decode one line.
///
/// `width` is the expected field count; declared `types` imply it when
/// `width` is not given.
pub fn decode_row(
    line: &str,
    row: usize,
    width: Option<usize>,
    types: Option<&[ColumnType]>,
) -> Result<Vec<Value>, DecodeError> {
    let fields: Vec<&str> = line.split(',').collect();
    let expected = width.or_else(|| types.map(<[ColumnType]>::len));

    if let Some(expected) = expected
        && fields.len() != expected
    {
        return Err(DecodeError::FieldCount {
            row,
            expected,
            found: fields.len(),
        });
    }

    fields
        .iter()
        .enumerate()
        .map(|(column, field)| {
            let ty = types.and_then(|types| types.get(column).copied());

            decode_field(field, ty).ok_or_else(|| DecodeError::Field {
                row,
                column,
                field: field.trim().to_string(),
                expected: ty.unwrap_or(ColumnType::Text),
            })
        })
        .collect()
}

/// Decode a whole literal table.
///
/// With no `width` and no `types`, the first row fixes the width for the rest.
pub fn decode_literal(
    literal: &str,
    width: Option<usize>,
    types: Option<&[ColumnType]>,
) -> Result<RowSet, DecodeError> {
    let mut width = width;
    let mut rows = Vec::new();

    for (row, line) in literal_lines(literal).enumerate() {
        let values = decode_row(line, row, width, types)?;
        width.get_or_insert(values.len());
        rows.push(values);
    }

    Ok(RowSet(rows))
}

/// Render rows in literal form. Decoding the output with the same column
/// types reproduces the input for values the decoder can itself produce.
#[must_use]
pub fn encode_literal(rows: &RowSet) -> String {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
