//! Builder for Arrow blocks.

use std::{collections::HashMap, sync::Arc};

use arrow_array::{RecordBatch, RecordBatchOptions};
use arrow_schema::{ArrowError, Schema, SchemaRef};
use arrow_select::concat::concat_batches;
use log::{debug, trace};

use crate::{
    BlockError, BuilderConfig, MissingColumns, Result,
    block::{Block, BlockKind},
    builder::BlockBuilder,
    convert::table_from_columns,
    row::ArrowRow,
    value::{Record, Value},
};

/// Accumulates records into pending columns and collects whole Arrow tables.
///
/// Rows added one at a time are buffered per column and only converted to Arrow arrays by
/// [`ArrowBlockBuilder::finish`]. Merged tables are kept as-is and concatenated at that point,
/// in call order relative to the buffered rows.
#[derive(Debug, Clone, Default)]
pub struct ArrowBlockBuilder {
    config: BuilderConfig,
    columns: Vec<(String, Vec<Value>)>,
    index: HashMap<String, usize>,
    pending_rows: usize,
    /// Merged tables, each tagged with the pending row count when it was added.
    tables: Vec<(usize, RecordBatch)>,
    num_rows: usize,
}

impl ArrowBlockBuilder {
    /// Create an empty builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder with `config`.
    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Append a record, one value per column.
    ///
    /// # Errors
    /// Under [`MissingColumns::Reject`], returns [`BlockError::UnexpectedColumn`] or
    /// [`BlockError::MissingColumn`] when the record's keys differ from the first row's. Nothing
    /// is appended in that case.
    pub fn add_record(&mut self, record: Record) -> Result<()> {
        let row = self.pending_rows;
        if self.config.missing_columns == MissingColumns::Reject && row > 0 {
            if let Some(key) = record.keys().find(|k| !self.index.contains_key(*k)) {
                return Err(BlockError::UnexpectedColumn {
                    row,
                    column: key.to_string(),
                });
            }
            if let Some((name, _)) = self.columns.iter().find(|(name, _)| record.get(name).is_none())
            {
                return Err(BlockError::MissingColumn {
                    row,
                    column: name.clone(),
                });
            }
        }

        for (key, value) in record {
            let idx = match self.index.get(&key) {
                Some(&idx) => idx,
                None => {
                    let mut values = Vec::with_capacity(self.config.capacity.max(row + 1));
                    values.resize(row, Value::Null);
                    self.columns.push((key.clone(), values));
                    self.index.insert(key, self.columns.len() - 1);
                    self.columns.len() - 1
                }
            };
            self.columns[idx].1.push(value);
        }
        for (_, values) in &mut self.columns {
            if values.len() == row {
                values.push(Value::Null);
            }
        }
        self.pending_rows += 1;
        self.num_rows += 1;
        Ok(())
    }

    /// Append a row view by expanding it into a record first.
    pub fn add_row(&mut self, row: &ArrowRow<'_>) -> Result<()> {
        self.add_record(row.to_record()?)
    }

    /// Merge a whole table without unpacking it into rows.
    pub fn add_batch(&mut self, batch: RecordBatch) {
        self.num_rows += batch.num_rows();
        self.tables.push((self.pending_rows, batch));
    }

    /// Assemble everything added so far into one record batch.
    ///
    /// # Errors
    /// Returns a conversion error if a pending column cannot be typed, or
    /// [`BlockError::Arrow`] if the tables to concatenate have different schemas.
    pub fn finish(&self) -> Result<RecordBatch> {
        let pending = if self.pending_rows > 0 {
            trace!(
                "materializing {} pending rows into {} columns",
                self.pending_rows,
                self.columns.len()
            );
            Some(table_from_columns(&self.columns, self.pending_rows)?)
        } else {
            None
        };

        let mut pieces = Vec::with_capacity(2 * self.tables.len() + 1);
        let mut cursor = 0;
        for (at, table) in &self.tables {
            if let Some(p) = &pending {
                if *at > cursor {
                    pieces.push(p.slice(cursor, at - cursor));
                    cursor = *at;
                }
            }
            pieces.push(table.clone());
        }
        if let Some(p) = &pending {
            if cursor < self.pending_rows {
                pieces.push(p.slice(cursor, self.pending_rows - cursor));
            }
        }

        match pieces.len() {
            0 => Ok(RecordBatch::new_empty(Arc::new(Schema::empty()))),
            1 => Ok(pieces.remove(0)),
            _ => concat_tables(&pieces),
        }
    }
}

impl BlockBuilder for ArrowBlockBuilder {
    fn add(&mut self, item: Value) -> Result<()> {
        match item {
            Value::Record(record) => self.add_record(record),
            other => Err(BlockError::NotARecord { kind: other.kind() }),
        }
    }

    fn add_block(&mut self, block: Block) -> Result<()> {
        match block {
            Block::Arrow(batch) => {
                self.add_batch(batch);
                Ok(())
            }
            other => Err(BlockError::IncompatibleBlock {
                expected: BlockKind::Arrow,
                actual: other.kind(),
            }),
        }
    }

    fn build(&self) -> Result<Block> {
        self.finish().map(Block::Arrow)
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }
}

fn concat_tables(tables: &[RecordBatch]) -> Result<RecordBatch> {
    let schema = unify_schemas(tables)?;
    let num_rows: usize = tables.iter().map(RecordBatch::num_rows).sum();
    debug!("concatenating {} tables into {num_rows} rows", tables.len());
    if schema.fields().is_empty() {
        let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
        return Ok(RecordBatch::try_new_with_options(schema, vec![], &options)?);
    }
    Ok(concat_batches(&schema, tables)?)
}

/// Check that every table has the same column names and types, in the same order.
///
/// A column of the result is nullable if it is nullable in any input.
fn unify_schemas(tables: &[RecordBatch]) -> Result<SchemaRef, ArrowError> {
    let first = tables[0].schema_ref();
    let mut fields: Vec<_> = first.fields().iter().map(|f| f.as_ref().clone()).collect();
    for (i, table) in tables.iter().enumerate().skip(1) {
        let other = table.schema_ref();
        let compatible = other.fields().len() == fields.len()
            && other
                .fields()
                .iter()
                .zip(&fields)
                .all(|(a, b)| a.name() == b.name() && a.data_type() == b.data_type());
        if !compatible {
            return Err(ArrowError::SchemaError(format!(
                "cannot concatenate table {i} with columns [{}] onto columns [{}]",
                describe(other),
                describe(first)
            )));
        }
        for (field, o) in fields.iter_mut().zip(other.fields()) {
            if o.is_nullable() {
                field.set_nullable(true);
            }
        }
    }
    Ok(Arc::new(Schema::new_with_metadata(
        fields,
        first.metadata().clone(),
    )))
}

fn describe(schema: &Schema) -> String {
    schema
        .fields()
        .iter()
        .map(|f| format!("{}: {}", f.name(), f.data_type()))
        .collect::<Vec<_>>()
        .join(", ")
}
