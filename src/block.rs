//! The immutable block container and its two physical representations.

use std::{fmt, sync::Arc};

use arrow_array::RecordBatch;

use crate::{
    Result,
    accessor::{AnyBlockAccessor, ArrowBlockAccessor, BlockAccessor, SimpleBlockAccessor},
    value::Value,
};

/// Physical representation of a [`Block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Named, equal-length, typed Arrow columns.
    Arrow,
    /// An ordered sequence of opaque [`Value`]s.
    Simple,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BlockKind::Arrow => "arrow",
            BlockKind::Simple => "simple",
        })
    }
}

/// An immutable batch of rows in one physical encoding.
///
/// Cloning is cheap: both variants share their storage.
#[derive(Debug, Clone)]
pub enum Block {
    /// Columnar rows backed by an Arrow `RecordBatch`.
    Arrow(RecordBatch),
    /// Row objects with no enforced schema.
    Simple(SimpleBlock),
}

impl Block {
    /// Which representation this block uses.
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Arrow(_) => BlockKind::Arrow,
            Block::Simple(_) => BlockKind::Simple,
        }
    }

    /// Number of rows in the block.
    pub fn num_rows(&self) -> usize {
        match self {
            Block::Arrow(batch) => batch.num_rows(),
            Block::Simple(rows) => rows.len(),
        }
    }

    /// Accessor matching this block's representation.
    pub fn accessor(&self) -> AnyBlockAccessor<'_> {
        match self {
            Block::Arrow(batch) => AnyBlockAccessor::Arrow(ArrowBlockAccessor::new(batch)),
            Block::Simple(rows) => AnyBlockAccessor::Simple(SimpleBlockAccessor::new(rows)),
        }
    }

    /// Consume the block as an Arrow table.
    ///
    /// Arrow blocks hand over their batch without copying; simple blocks are converted as in
    /// [`BlockAccessor::to_arrow_table`].
    pub fn into_arrow_table(self) -> Result<RecordBatch> {
        match self {
            Block::Arrow(batch) => Ok(batch),
            Block::Simple(rows) => SimpleBlockAccessor::new(&rows).to_arrow_table(),
        }
    }

    /// Borrow the Arrow batch, if this is an Arrow block.
    pub fn as_arrow(&self) -> Option<&RecordBatch> {
        match self {
            Block::Arrow(batch) => Some(batch),
            Block::Simple(_) => None,
        }
    }

    /// Borrow the row sequence, if this is a simple block.
    pub fn as_simple(&self) -> Option<&SimpleBlock> {
        match self {
            Block::Arrow(_) => None,
            Block::Simple(rows) => Some(rows),
        }
    }
}

impl From<RecordBatch> for Block {
    fn from(batch: RecordBatch) -> Self {
        Block::Arrow(batch)
    }
}

impl From<SimpleBlock> for Block {
    fn from(rows: SimpleBlock) -> Self {
        Block::Simple(rows)
    }
}

impl From<Vec<Value>> for Block {
    fn from(rows: Vec<Value>) -> Self {
        Block::Simple(SimpleBlock::from(rows))
    }
}

/// A window over a shared, immutable sequence of row values.
///
/// Zero-copy slices narrow the window and keep pointing at the same storage.
#[derive(Debug, Clone)]
pub struct SimpleBlock {
    rows: Arc<Vec<Value>>,
    offset: usize,
    len: usize,
}

impl SimpleBlock {
    /// Number of rows in the window.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true when the window holds no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The rows of this window.
    pub fn rows(&self) -> &[Value] {
        &self.rows[self.offset..self.offset + self.len]
    }

    /// Zero-copy sub-window `[offset, offset + len)` relative to this window, or `None` if the
    /// range does not fit inside it.
    pub fn slice(&self, offset: usize, len: usize) -> Option<SimpleBlock> {
        if offset.checked_add(len)? > self.len {
            return None;
        }
        Some(SimpleBlock {
            rows: Arc::clone(&self.rows),
            offset: self.offset + offset,
            len,
        })
    }

    /// Whether two blocks are windows over the same storage.
    pub fn shares_storage(&self, other: &SimpleBlock) -> bool {
        Arc::ptr_eq(&self.rows, &other.rows)
    }
}

impl From<Vec<Value>> for SimpleBlock {
    fn from(rows: Vec<Value>) -> Self {
        let len = rows.len();
        SimpleBlock {
            rows: Arc::new(rows),
            offset: 0,
            len,
        }
    }
}

impl PartialEq for SimpleBlock {
    fn eq(&self, other: &Self) -> bool {
        self.rows() == other.rows()
    }
}
