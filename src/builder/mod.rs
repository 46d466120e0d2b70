//! Block builders.
//!
//! - [`SimpleBlockBuilder`] keeps items verbatim.
//! - [`ArrowBlockBuilder`] accumulates records column by column and merges whole Arrow tables.
//! - [`DelegatingBlockBuilder`] picks one of the two from the first item it sees.

mod arrow;
mod delegating;
mod simple;

pub use arrow::ArrowBlockBuilder;
pub use delegating::DelegatingBlockBuilder;
pub use simple::SimpleBlockBuilder;

use crate::{
    BuilderConfig, Result,
    block::{Block, BlockKind},
    value::Value,
};

/// Incremental construction of a [`Block`].
///
/// Builders are single-writer; they hold no locks. `build` does not consume pending state, so
/// it can be called again to get an equivalent, independently built block.
///
/// Marked `Send` so boxed builders can be handed to another thread.
pub trait BlockBuilder: Send {
    /// Append one row.
    fn add(&mut self, item: Value) -> Result<()>;

    /// Append every row of a built block, in order.
    fn add_block(&mut self, block: Block) -> Result<()>;

    /// Assemble the rows added so far into an immutable block.
    fn build(&self) -> Result<Block>;

    /// Rows added so far, including rows of merged blocks.
    fn num_rows(&self) -> usize;
}

impl<B: BlockBuilder + ?Sized> BlockBuilder for Box<B> {
    fn add(&mut self, item: Value) -> Result<()> {
        (**self).add(item)
    }

    fn add_block(&mut self, block: Block) -> Result<()> {
        (**self).add_block(block)
    }

    fn build(&self) -> Result<Block> {
        (**self).build()
    }

    fn num_rows(&self) -> usize {
        (**self).num_rows()
    }
}

/// A concrete builder of either representation.
#[derive(Debug, Clone)]
pub enum AnyBlockBuilder {
    /// Builds Arrow blocks.
    Arrow(ArrowBlockBuilder),
    /// Builds simple blocks.
    Simple(SimpleBlockBuilder),
}

impl AnyBlockBuilder {
    /// An empty builder for `kind`.
    pub fn for_kind(kind: BlockKind, config: BuilderConfig) -> Self {
        match kind {
            BlockKind::Arrow => AnyBlockBuilder::Arrow(ArrowBlockBuilder::with_config(config)),
            BlockKind::Simple => AnyBlockBuilder::Simple(SimpleBlockBuilder::with_config(config)),
        }
    }

    /// Representation this builder produces.
    pub fn kind(&self) -> BlockKind {
        match self {
            AnyBlockBuilder::Arrow(_) => BlockKind::Arrow,
            AnyBlockBuilder::Simple(_) => BlockKind::Simple,
        }
    }
}

impl BlockBuilder for AnyBlockBuilder {
    fn add(&mut self, item: Value) -> Result<()> {
        match self {
            AnyBlockBuilder::Arrow(b) => b.add(item),
            AnyBlockBuilder::Simple(b) => b.add(item),
        }
    }

    fn add_block(&mut self, block: Block) -> Result<()> {
        match self {
            AnyBlockBuilder::Arrow(b) => b.add_block(block),
            AnyBlockBuilder::Simple(b) => b.add_block(block),
        }
    }

    fn build(&self) -> Result<Block> {
        match self {
            AnyBlockBuilder::Arrow(b) => b.build(),
            AnyBlockBuilder::Simple(b) => b.build(),
        }
    }

    fn num_rows(&self) -> usize {
        match self {
            AnyBlockBuilder::Arrow(b) => b.num_rows(),
            AnyBlockBuilder::Simple(b) => b.num_rows(),
        }
    }
}

#[cfg(test)]
mod tests;
