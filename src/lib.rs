#![deny(missing_docs)]
//! typed-blocks: bounded batches of records that are either Arrow tables or plain row
//! sequences, behind one builder/accessor API.
//!
//! Producers push [`Value`]s into a [`BlockBuilder`]; [`DelegatingBlockBuilder`] decides from
//! the first item whether the rows fit an Arrow table. Consumers read a built [`Block`] through
//! [`Block::accessor`].
//!
//! ```
//! use typed_blocks::{BlockAccessor, BlockBuilder, BlockKind, DelegatingBlockBuilder, record};
//!
//! let mut builder = DelegatingBlockBuilder::new();
//! builder.add(record! { "a" => 1 }.into()).unwrap();
//! builder.add(record! { "a" => 2 }.into()).unwrap();
//! let block = builder.build().unwrap();
//! assert_eq!(block.kind(), BlockKind::Arrow);
//! assert_eq!(block.accessor().num_rows(), 2);
//! ```

mod accessor;
mod block;
mod builder;
mod config;
mod convert;
mod error;
mod row;
mod value;

pub use accessor::{
    AnyBlockAccessor, AnyRows, ArrowBlockAccessor, BlockAccessor, DataFrameReader,
    SimpleBlockAccessor,
};
pub use block::{Block, BlockKind, SimpleBlock};
pub use builder::{
    AnyBlockBuilder, ArrowBlockBuilder, BlockBuilder, DelegatingBlockBuilder, SimpleBlockBuilder,
};
pub use config::{BuilderConfig, MissingColumns};
pub use error::{BlockError, Result};
pub use row::{ArrowRow, ArrowRows, BlockRow};
pub use value::{Record, Value};

// Re-export Arrow crates so downstream users can name batches and schemas
// without depending on Arrow directly.
pub use arrow_array;
pub use arrow_schema;
