//! Error types for block builders, accessors and row views.

use arrow_schema::{ArrowError, DataType};
use thiserror::Error;

use crate::block::BlockKind;

/// Convenience alias used throughout the crate.
pub type Result<T, E = BlockError> = std::result::Result<T, E>;

/// Errors that can occur while building or reading blocks.
#[derive(Debug, Error)]
pub enum BlockError {
    /// An item added on the columnar path was not a record.
    #[error("arrow block rows must be records, got a {kind} value")]
    NotARecord {
        /// Kind of the rejected value (e.g. `"string"`).
        kind: &'static str,
    },

    /// Values of a column could not be unified into one Arrow type.
    #[error("cannot convert column '{column}': {message}")]
    TypeConversion {
        /// Dot-annotated path to the offending column (e.g. `"a.b[]"`).
        column: String,
        /// Human-readable reason.
        message: String,
    },

    /// An Arrow column had a type this crate cannot read back into a `Value`.
    #[error("unsupported arrow type {data_type:?} in column '{column}'")]
    UnsupportedType {
        /// Column name.
        column: String,
        /// The Arrow logical type encountered.
        data_type: DataType,
    },

    /// Arrow rejected table construction or concatenation.
    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// A block of one representation was merged into a builder of another.
    #[error("cannot merge a {actual} block into a {expected} builder")]
    IncompatibleBlock {
        /// Representation the builder produces.
        expected: BlockKind,
        /// Representation of the block that was passed in.
        actual: BlockKind,
    },

    /// Slice bounds were reversed or exceeded the block length.
    #[error("slice [{start}, {end}) out of bounds for block of {len} rows")]
    SliceOutOfBounds {
        /// Inclusive start row.
        start: usize,
        /// Exclusive end row.
        end: usize,
        /// Number of rows in the block.
        len: usize,
    },

    /// Requested row index exceeded the block length.
    #[error("row index {row} out of bounds for block of {len} rows")]
    RowOutOfBounds {
        /// Provided row index.
        row: usize,
        /// Number of rows in the block.
        len: usize,
    },

    /// A column was looked up by a name the schema does not contain.
    #[error("no column named '{name}'")]
    UnknownColumn {
        /// The missing column name.
        name: String,
    },

    /// Requested column index exceeded the schema width.
    #[error("column index {column} out of bounds for schema width {width}")]
    ColumnOutOfBounds {
        /// Provided column index.
        column: usize,
        /// Number of columns in the schema.
        width: usize,
    },

    /// A simple block could not be exported as a table.
    #[error("row {row} is a {kind} value, not a record")]
    NotTabular {
        /// Index of the first non-record row.
        row: usize,
        /// Kind of the offending value.
        kind: &'static str,
    },

    /// Under [`MissingColumns::Reject`](crate::MissingColumns::Reject), a row omitted a column.
    #[error("row {row} is missing column '{column}'")]
    MissingColumn {
        /// Row index within the builder's pending rows.
        row: usize,
        /// Column absent from the row.
        column: String,
    },

    /// Under [`MissingColumns::Reject`](crate::MissingColumns::Reject), a row introduced a column
    /// after the first row.
    #[error("row {row} introduces column '{column}' not present in earlier rows")]
    UnexpectedColumn {
        /// Row index within the builder's pending rows.
        row: usize,
        /// The new column.
        column: String,
    },
}

impl BlockError {
    /// Whether this error came from converting values into Arrow columns.
    ///
    /// These are the only errors the delegating builder treats as a signal to
    /// fall back to the simple representation.
    pub fn is_conversion(&self) -> bool {
        matches!(
            self,
            BlockError::TypeConversion { .. }
                | BlockError::UnsupportedType { .. }
                | BlockError::Arrow(_)
        )
    }

    pub(crate) fn conversion(column: impl Into<String>, message: impl Into<String>) -> Self {
        BlockError::TypeConversion {
            column: column.into(),
            message: message.into(),
        }
    }
}
