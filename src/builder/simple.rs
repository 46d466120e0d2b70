//! Builder for simple blocks.

use crate::{
    BlockError, BuilderConfig, Result,
    block::{Block, BlockKind, SimpleBlock},
    builder::BlockBuilder,
    value::Value,
};

/// Accumulates arbitrary values, in order, with no validation.
#[derive(Debug, Clone, Default)]
pub struct SimpleBlockBuilder {
    items: Vec<Value>,
}

impl SimpleBlockBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder pre-sized for `config.capacity` rows.
    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            items: Vec::with_capacity(config.capacity),
        }
    }
}

impl BlockBuilder for SimpleBlockBuilder {
    fn add(&mut self, item: Value) -> Result<()> {
        self.items.push(item);
        Ok(())
    }

    fn add_block(&mut self, block: Block) -> Result<()> {
        match block {
            Block::Simple(rows) => {
                self.items.extend_from_slice(rows.rows());
                Ok(())
            }
            other => Err(BlockError::IncompatibleBlock {
                expected: BlockKind::Simple,
                actual: other.kind(),
            }),
        }
    }

    fn build(&self) -> Result<Block> {
        Ok(Block::Simple(SimpleBlock::from(self.items.clone())))
    }

    fn num_rows(&self) -> usize {
        self.items.len()
    }
}
