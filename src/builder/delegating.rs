//! Builder that chooses the block representation from the first item.

use log::debug;

use crate::{
    BuilderConfig, Result,
    accessor::BlockAccessor,
    block::{Block, BlockKind},
    builder::{AnyBlockBuilder, ArrowBlockBuilder, BlockBuilder},
    value::Value,
};

/// Defers the choice between Arrow and simple blocks until the first `add` or `add_block`.
///
/// - A first item that is a record is trial-built into a throwaway Arrow table. If Arrow accepts
///   it, the builder produces Arrow blocks; if conversion fails, it falls back to simple blocks.
/// - A first item of any other kind selects simple blocks.
/// - A first merged block selects the builder its own accessor reports.
///
/// The choice is made once. Later items go to the chosen builder unchecked, so a record after a
/// non-record lands in a simple block, and a non-record after a record is an error.
#[derive(Debug, Clone, Default)]
pub struct DelegatingBlockBuilder {
    config: BuilderConfig,
    inner: Option<AnyBlockBuilder>,
}

impl DelegatingBlockBuilder {
    /// Create an undecided builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an undecided builder whose concrete builder will use `config`.
    pub fn with_config(config: BuilderConfig) -> Self {
        Self {
            config,
            inner: None,
        }
    }

    /// The representation chosen so far, or `None` while undecided.
    pub fn kind(&self) -> Option<BlockKind> {
        self.inner.as_ref().map(AnyBlockBuilder::kind)
    }

    /// Config for the one-row trial build: same column policy, no pre-sizing.
    pub(super) fn trial_config(&self) -> BuilderConfig {
        BuilderConfig::default().with_missing_columns(self.config.missing_columns)
    }

    fn select(&self, item: &Value) -> Result<BlockKind> {
        let Value::Record(record) = item else {
            debug!("first item is a {} value; building a simple block", item.kind());
            return Ok(BlockKind::Simple);
        };
        let mut trial = ArrowBlockBuilder::with_config(self.trial_config());
        match trial.add_record(record.clone()).and_then(|()| trial.finish()) {
            Ok(_) => {
                debug!(
                    "first item is a record with {} fields; building an arrow block",
                    record.len()
                );
                Ok(BlockKind::Arrow)
            }
            Err(e) if e.is_conversion() => {
                debug!("first record rejected by arrow ({e}); building a simple block");
                Ok(BlockKind::Simple)
            }
            Err(e) => Err(e),
        }
    }
}

impl BlockBuilder for DelegatingBlockBuilder {
    fn add(&mut self, item: Value) -> Result<()> {
        let builder = match self.inner.take() {
            Some(builder) => builder,
            None => AnyBlockBuilder::for_kind(self.select(&item)?, self.config),
        };
        self.inner.insert(builder).add(item)
    }

    fn add_block(&mut self, block: Block) -> Result<()> {
        let builder = match self.inner.take() {
            Some(builder) => builder,
            None => {
                let kind = block.accessor().builder().kind();
                debug!("first merged block is {kind}; building a {kind} block");
                AnyBlockBuilder::for_kind(kind, self.config)
            }
        };
        self.inner.insert(builder).add_block(block)
    }

    fn build(&self) -> Result<Block> {
        match &self.inner {
            Some(builder) => builder.build(),
            None => ArrowBlockBuilder::with_config(self.config).build(),
        }
    }

    fn num_rows(&self) -> usize {
        self.inner.as_ref().map_or(0, BlockBuilder::num_rows)
    }
}
