//! Lazy row views over Arrow blocks.
//!
//! An [`ArrowRow`] is just a `(batch, row)` pair. Reading one field goes straight to that
//! column's array; enumerating keys walks the schema. Only `values`, `items` and `to_record`
//! convert the whole row, and they do so again on every call.

use std::fmt;

use arrow_array::RecordBatch;

use crate::{
    BlockError, Result,
    convert::value_at,
    value::{Record, Value},
};

/// Iterator over the rows of an Arrow batch as [`ArrowRow`] views.
#[derive(Debug, Clone)]
pub struct ArrowRows<'a> {
    batch: &'a RecordBatch,
    row: usize,
    len: usize,
}

impl<'a> ArrowRows<'a> {
    /// Iterate every row of `batch`, starting at row 0.
    pub fn new(batch: &'a RecordBatch) -> Self {
        Self {
            batch,
            row: 0,
            len: batch.num_rows(),
        }
    }
}

impl<'a> Iterator for ArrowRows<'a> {
    type Item = ArrowRow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.len {
            return None;
        }
        let view = ArrowRow {
            batch: self.batch,
            row: self.row,
        };
        self.row += 1;
        Some(view)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.len.saturating_sub(self.row);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ArrowRows<'_> {}

/// Borrowed view of one row of an Arrow batch.
#[derive(Debug, Clone, Copy)]
pub struct ArrowRow<'a> {
    batch: &'a RecordBatch,
    row: usize,
}

impl<'a> ArrowRow<'a> {
    /// View row `row` of `batch`.
    ///
    /// # Errors
    /// Returns [`BlockError::RowOutOfBounds`] if `row >= batch.num_rows()`.
    pub fn new(batch: &'a RecordBatch, row: usize) -> Result<Self> {
        if row >= batch.num_rows() {
            return Err(BlockError::RowOutOfBounds {
                row,
                len: batch.num_rows(),
            });
        }
        Ok(Self { batch, row })
    }

    /// Index of this row within its batch.
    #[inline]
    pub fn index(&self) -> usize {
        self.row
    }

    /// Number of columns in this row.
    #[inline]
    pub fn len(&self) -> usize {
        self.batch.num_columns()
    }

    /// Returns true when the row has zero columns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column names in schema order.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> + 'a {
        let batch: &'a RecordBatch = self.batch;
        batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
    }

    /// Read the value of column `name` without converting the rest of the row.
    ///
    /// # Errors
    /// Returns [`BlockError::UnknownColumn`] for a name not in the schema, or
    /// [`BlockError::UnsupportedType`] if the column cannot be read into a [`Value`].
    pub fn get(&self, name: &str) -> Result<Value> {
        let column = self
            .batch
            .schema_ref()
            .index_of(name)
            .map_err(|_| BlockError::UnknownColumn {
                name: name.to_string(),
            })?;
        value_at(name, self.batch.column(column).as_ref(), self.row)
    }

    /// Read the value of the column at position `column`.
    ///
    /// # Errors
    /// Returns [`BlockError::ColumnOutOfBounds`] past the last column.
    pub fn get_index(&self, column: usize) -> Result<Value> {
        let width = self.batch.num_columns();
        if column >= width {
            return Err(BlockError::ColumnOutOfBounds { column, width });
        }
        let name = self.batch.schema_ref().field(column).name();
        value_at(name, self.batch.column(column).as_ref(), self.row)
    }

    /// Convert the row into an owned [`Record`] in schema order.
    pub fn to_record(&self) -> Result<Record> {
        let mut record = Record::with_capacity(self.len());
        for (field, array) in self.batch.schema_ref().fields().iter().zip(self.batch.columns()) {
            record.insert(
                field.name().as_str(),
                value_at(field.name(), array.as_ref(), self.row)?,
            );
        }
        Ok(record)
    }

    /// Values in schema order.
    pub fn values(&self) -> Result<Vec<Value>> {
        Ok(self.to_record()?.into_iter().map(|(_, v)| v).collect())
    }

    /// `(name, value)` pairs in schema order.
    pub fn items(&self) -> Result<Vec<(String, Value)>> {
        Ok(self.to_record()?.into_iter().collect())
    }

    /// Zero-copy single-row table holding just this row.
    pub fn as_table(&self) -> RecordBatch {
        self.batch.slice(self.row, 1)
    }
}

impl PartialEq for ArrowRow<'_> {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_record(), other.to_record()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq<Record> for ArrowRow<'_> {
    fn eq(&self, other: &Record) -> bool {
        self.to_record().is_ok_and(|r| r == *other)
    }
}

impl fmt::Display for ArrowRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_record() {
            Ok(record) => {
                f.write_str("ArrowRow({")?;
                for (i, (k, v)) in record.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k:?}: {v:?}")?;
                }
                f.write_str("})")
            }
            Err(e) => write!(f, "ArrowRow(<{e}>)"),
        }
    }
}

/// A row yielded by an accessor of either representation.
#[derive(Debug, Clone, Copy)]
pub enum BlockRow<'a> {
    /// A lazy view into an Arrow block.
    Arrow(ArrowRow<'a>),
    /// A stored value of a simple block.
    Simple(&'a Value),
}

impl BlockRow<'_> {
    /// Materialize this row as an owned value. Arrow rows become [`Value::Record`].
    pub fn to_value(&self) -> Result<Value> {
        match self {
            BlockRow::Arrow(row) => row.to_record().map(Value::Record),
            BlockRow::Simple(v) => Ok((*v).clone()),
        }
    }
}
