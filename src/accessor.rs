//! Read-only access to built blocks.
//!
//! [`BlockAccessor`] is the one interface consumers read through. Each representation has its
//! own accessor; [`AnyBlockAccessor`] dispatches on a [`Block`]'s variant and is what
//! [`Block::accessor`] hands out.

use arrow_array::{RecordBatch, RecordBatchIterator, RecordBatchOptions};
use arrow_schema::{ArrowError, SchemaRef};

use crate::{
    BlockError, Result,
    block::{Block, BlockKind, SimpleBlock},
    builder::{AnyBlockBuilder, ArrowBlockBuilder, BlockBuilder, SimpleBlockBuilder},
    convert::deep_copy,
    row::{ArrowRow, ArrowRows, BlockRow},
    value::Value,
};

/// Single-batch reader handed across the dataframe boundary.
pub type DataFrameReader = RecordBatchIterator<Vec<Result<RecordBatch, ArrowError>>>;

/// Uniform read operations over one built block.
pub trait BlockAccessor<'a> {
    /// Row type yielded by [`BlockAccessor::iter_rows`].
    type Row;
    /// Iterator returned by [`BlockAccessor::iter_rows`].
    type Rows: Iterator<Item = Self::Row>;
    /// Builder that produces blocks of this accessor's representation.
    type Builder: BlockBuilder;

    /// Rows in order, starting from the first row on every call.
    fn iter_rows(&self) -> Self::Rows;

    /// Rows `[start, end)` as a new block.
    ///
    /// With `copy == false` the result shares storage with this block. With `copy == true`
    /// it owns freshly allocated storage.
    ///
    /// # Errors
    /// Returns [`BlockError::SliceOutOfBounds`] if `start > end` or `end > num_rows()`.
    fn slice(&self, start: usize, end: usize, copy: bool) -> Result<Block>;

    /// Ordered column names and types, or `None` for representations without a schema.
    fn schema(&self) -> Option<SchemaRef>;

    /// Number of rows.
    fn num_rows(&self) -> usize;

    /// Estimated memory footprint in bytes.
    fn size_bytes(&self) -> usize;

    /// The block as an Arrow table.
    fn to_arrow_table(&self) -> Result<RecordBatch>;

    /// The block as a record batch reader for dataframe libraries to consume.
    fn to_dataframe(&self) -> Result<DataFrameReader> {
        let batch = self.to_arrow_table()?;
        let schema = batch.schema();
        Ok(RecordBatchIterator::new(vec![Ok(batch)], schema))
    }

    /// A fresh, empty builder for this representation.
    fn builder(&self) -> Self::Builder;
}

fn check_slice(start: usize, end: usize, len: usize) -> Result<()> {
    if start > end || end > len {
        return Err(BlockError::SliceOutOfBounds { start, end, len });
    }
    Ok(())
}

/// Accessor over an Arrow block.
#[derive(Debug, Clone, Copy)]
pub struct ArrowBlockAccessor<'a> {
    batch: &'a RecordBatch,
}

impl<'a> ArrowBlockAccessor<'a> {
    /// Wrap a record batch.
    pub fn new(batch: &'a RecordBatch) -> Self {
        Self { batch }
    }

    /// View a single row.
    pub fn row(&self, row: usize) -> Result<ArrowRow<'a>> {
        ArrowRow::new(self.batch, row)
    }

    /// Column names in schema order.
    pub fn column_names(&self) -> Vec<&'a str> {
        let batch: &'a RecordBatch = self.batch;
        batch
            .schema_ref()
            .fields()
            .iter()
            .map(|f| f.name().as_str())
            .collect()
    }
}

impl<'a> BlockAccessor<'a> for ArrowBlockAccessor<'a> {
    type Row = ArrowRow<'a>;
    type Rows = ArrowRows<'a>;
    type Builder = ArrowBlockBuilder;

    fn iter_rows(&self) -> ArrowRows<'a> {
        ArrowRows::new(self.batch)
    }

    fn slice(&self, start: usize, end: usize, copy: bool) -> Result<Block> {
        check_slice(start, end, self.batch.num_rows())?;
        let view = self.batch.slice(start, end - start);
        if !copy {
            return Ok(Block::Arrow(view));
        }
        let columns = view
            .columns()
            .iter()
            .map(|c| deep_copy(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let options = RecordBatchOptions::new().with_row_count(Some(view.num_rows()));
        let copied = RecordBatch::try_new_with_options(view.schema(), columns, &options)?;
        Ok(Block::Arrow(copied))
    }

    fn schema(&self) -> Option<SchemaRef> {
        Some(self.batch.schema())
    }

    fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    fn size_bytes(&self) -> usize {
        self.batch.get_array_memory_size()
    }

    fn to_arrow_table(&self) -> Result<RecordBatch> {
        Ok(self.batch.clone())
    }

    fn builder(&self) -> ArrowBlockBuilder {
        ArrowBlockBuilder::new()
    }
}

/// Accessor over a simple block.
#[derive(Debug, Clone, Copy)]
pub struct SimpleBlockAccessor<'a> {
    block: &'a SimpleBlock,
}

impl<'a> SimpleBlockAccessor<'a> {
    /// Wrap a simple block.
    pub fn new(block: &'a SimpleBlock) -> Self {
        Self { block }
    }
}

impl<'a> BlockAccessor<'a> for SimpleBlockAccessor<'a> {
    type Row = &'a Value;
    type Rows = std::slice::Iter<'a, Value>;
    type Builder = SimpleBlockBuilder;

    fn iter_rows(&self) -> Self::Rows {
        let block: &'a SimpleBlock = self.block;
        block.rows().iter()
    }

    fn slice(&self, start: usize, end: usize, copy: bool) -> Result<Block> {
        let len = self.block.len();
        check_slice(start, end, len)?;
        let window = if copy {
            SimpleBlock::from(self.block.rows()[start..end].to_vec())
        } else {
            self.block
                .slice(start, end - start)
                .ok_or(BlockError::SliceOutOfBounds { start, end, len })?
        };
        Ok(Block::Simple(window))
    }

    fn schema(&self) -> Option<SchemaRef> {
        None
    }

    fn num_rows(&self) -> usize {
        self.block.len()
    }

    fn size_bytes(&self) -> usize {
        self.block.rows().iter().map(Value::estimated_size).sum()
    }

    /// Convert to an Arrow table when every row is a record.
    ///
    /// # Errors
    /// Returns [`BlockError::NotTabular`] naming the first non-record row, or any conversion
    /// error from building the table.
    fn to_arrow_table(&self) -> Result<RecordBatch> {
        let mut builder = ArrowBlockBuilder::new();
        for (row, value) in self.block.rows().iter().enumerate() {
            match value {
                Value::Record(record) => builder.add_record(record.clone())?,
                other => {
                    return Err(BlockError::NotTabular {
                        row,
                        kind: other.kind(),
                    });
                }
            }
        }
        builder.finish()
    }

    fn builder(&self) -> SimpleBlockBuilder {
        SimpleBlockBuilder::new()
    }
}

/// Accessor for a block of either representation.
#[derive(Debug, Clone, Copy)]
pub enum AnyBlockAccessor<'a> {
    /// Arrow block accessor.
    Arrow(ArrowBlockAccessor<'a>),
    /// Simple block accessor.
    Simple(SimpleBlockAccessor<'a>),
}

impl AnyBlockAccessor<'_> {
    /// Representation of the underlying block.
    pub fn kind(&self) -> BlockKind {
        match self {
            AnyBlockAccessor::Arrow(_) => BlockKind::Arrow,
            AnyBlockAccessor::Simple(_) => BlockKind::Simple,
        }
    }
}

/// Rows of a block of either representation.
#[derive(Debug, Clone)]
pub enum AnyRows<'a> {
    /// Rows of an Arrow block.
    Arrow(ArrowRows<'a>),
    /// Rows of a simple block.
    Simple(std::slice::Iter<'a, Value>),
}

impl<'a> Iterator for AnyRows<'a> {
    type Item = BlockRow<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            AnyRows::Arrow(rows) => rows.next().map(BlockRow::Arrow),
            AnyRows::Simple(rows) => rows.next().map(BlockRow::Simple),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            AnyRows::Arrow(rows) => rows.size_hint(),
            AnyRows::Simple(rows) => rows.size_hint(),
        }
    }
}

impl ExactSizeIterator for AnyRows<'_> {}

impl<'a> BlockAccessor<'a> for AnyBlockAccessor<'a> {
    type Row = BlockRow<'a>;
    type Rows = AnyRows<'a>;
    type Builder = AnyBlockBuilder;

    fn iter_rows(&self) -> AnyRows<'a> {
        match self {
            AnyBlockAccessor::Arrow(a) => AnyRows::Arrow(a.iter_rows()),
            AnyBlockAccessor::Simple(a) => AnyRows::Simple(a.iter_rows()),
        }
    }

    fn slice(&self, start: usize, end: usize, copy: bool) -> Result<Block> {
        match self {
            AnyBlockAccessor::Arrow(a) => a.slice(start, end, copy),
            AnyBlockAccessor::Simple(a) => a.slice(start, end, copy),
        }
    }

    fn schema(&self) -> Option<SchemaRef> {
        match self {
            AnyBlockAccessor::Arrow(a) => a.schema(),
            AnyBlockAccessor::Simple(a) => a.schema(),
        }
    }

    fn num_rows(&self) -> usize {
        match self {
            AnyBlockAccessor::Arrow(a) => a.num_rows(),
            AnyBlockAccessor::Simple(a) => a.num_rows(),
        }
    }

    fn size_bytes(&self) -> usize {
        match self {
            AnyBlockAccessor::Arrow(a) => a.size_bytes(),
            AnyBlockAccessor::Simple(a) => a.size_bytes(),
        }
    }

    fn to_arrow_table(&self) -> Result<RecordBatch> {
        match self {
            AnyBlockAccessor::Arrow(a) => a.to_arrow_table(),
            AnyBlockAccessor::Simple(a) => a.to_arrow_table(),
        }
    }

    fn builder(&self) -> AnyBlockBuilder {
        match self {
            AnyBlockAccessor::Arrow(a) => AnyBlockBuilder::Arrow(a.builder()),
            AnyBlockAccessor::Simple(a) => AnyBlockBuilder::Simple(a.builder()),
        }
    }
}
