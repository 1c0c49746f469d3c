use crate::{
    decode::{RowSet, decode_row},
    error::Error,
    value::{ColumnType, FromRow, FromValue, ScanError, Value},
};
use std::sync::Arc;

///
/// Cursor
///

enum Cursor {
    Decoded {
        rows: Arc<RowSet>,
        next: usize,
    },
    Deferred {
        literal: Arc<str>,
        offset: usize,
        row: usize,
        width: Option<usize>,
        types: Option<Vec<ColumnType>>,
    },
    Done,
}

///
/// Rows
///
/// Forward-only, non-restartable row stream. Deferred literals decode one
/// line per `next` call; the stream ends after the first error.
///

pub struct Rows {
    columns: Arc<[String]>,
    cursor: Cursor,
}

impl Rows {
    pub(crate) fn decoded(columns: Vec<String>, rows: Arc<RowSet>) -> Self {
        Self {
            columns: columns.into(),
            cursor: Cursor::Decoded { rows, next: 0 },
        }
    }

    pub(crate) fn deferred(
        columns: Vec<String>,
        literal: Arc<str>,
        types: Option<Vec<ColumnType>>,
    ) -> Self {
        let width = (!columns.is_empty()).then_some(columns.len());

        Self {
            columns: columns.into(),
            cursor: Cursor::Deferred {
                literal,
                offset: 0,
                row: 0,
                width,
                types,
            },
        }
    }

    pub(crate) fn empty(columns: Vec<String>) -> Self {
        Self {
            columns: columns.into(),
            cursor: Cursor::Done,
        }
    }

    /// Column names: the stub's declared columns, else the query's.
    /// Empty when neither named any.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Scan every remaining row into `T`.
    pub fn scan_all<T: FromRow>(self) -> Result<Vec<T>, Error> {
        self.map(|row| row.and_then(|row| row.scan())).collect()
    }

    fn next_deferred(
        literal: &str,
        offset: &mut usize,
        row: &mut usize,
        width: &mut Option<usize>,
        types: Option<&[ColumnType]>,
    ) -> Option<Result<Vec<Value>, Error>> {
        loop {
            let rest = &literal[*offset..];
            if rest.is_empty() {
                return None;
            }

            let (line, consumed) = rest
                .find('\n')
                .map_or((rest, rest.len()), |nl| (&rest[..nl], nl + 1));
            *offset += consumed;

            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() {
                continue;
            }

            let result = decode_row(line, *row, *width, types).map_err(Error::from);
            *row += 1;
            if let Ok(values) = &result {
                width.get_or_insert(values.len());
            }

            return Some(result);
        }
    }
}

impl Iterator for Rows {
    type Item = Result<Row, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let values = match &mut self.cursor {
            Cursor::Decoded { rows, next } => {
                let values = rows.get(*next)?.clone();
                *next += 1;
                Ok(values)
            }
            Cursor::Deferred {
                literal,
                offset,
                row,
                width,
                types,
            } => Self::next_deferred(&**literal, offset, row, width, types.as_deref())?,
            Cursor::Done => return None,
        };

        match values {
            Ok(values) => Some(Ok(Row {
                columns: Arc::clone(&self.columns),
                values,
            })),
            Err(err) => {
                self.cursor = Cursor::Done;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for Rows {}

impl std::fmt::Debug for Rows {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rows")
            .field("columns", &self.columns)
            .finish_non_exhaustive()
    }
}

///
/// Row
///

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Convert the value at `index`.
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T, Error> {
        let value = self.values.get(index).ok_or(ScanError::ColumnOutOfRange {
            index,
            width: self.values.len(),
        })?;

        Ok(T::from_value(value)?)
    }

    /// Convert the value under column `name`, when column names are known.
    pub fn get_named<T: FromValue>(&self, name: &str) -> Result<T, Error> {
        let index = self
            .columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| ScanError::UnknownColumn {
                name: name.to_string(),
            })?;

        self.get(index)
    }

    /// Scan the whole row into a tuple whose arity equals the row width.
    pub fn scan<T: FromRow>(&self) -> Result<T, Error> {
        Ok(T::from_row(&self.values)?)
    }

    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
