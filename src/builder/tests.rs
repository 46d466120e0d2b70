use std::sync::Arc;

use arrow_array::{Int64Array, RecordBatch, StringArray, cast::AsArray, types::Int64Type};
use arrow_schema::{DataType, Field, Schema};

use super::*;
use crate::{BlockError, MissingColumns, Record, record};

fn batch_a(values: Vec<i64>) -> RecordBatch {
    let schema = Arc::new(Schema::new(vec![Field::new("a", DataType::Int64, false)]));
    RecordBatch::try_new(schema, vec![Arc::new(Int64Array::from(values))]).unwrap()
}

fn column_a(block: &Block) -> Vec<Option<i64>> {
    let batch = block.as_arrow().expect("arrow block");
    let idx = batch.schema().index_of("a").unwrap();
    batch.column(idx).as_primitive::<Int64Type>().iter().collect()
}

#[test]
fn missing_columns_are_null_filled() {
    let mut b = ArrowBlockBuilder::new();
    b.add(record! { "a" => 1 }.into()).unwrap();
    b.add(record! { "b" => "x" }.into()).unwrap();
    b.add(record! { "a" => 3, "b" => "z" }.into()).unwrap();
    let block = b.build().unwrap();
    let batch = block.as_arrow().unwrap();

    assert_eq!(batch.num_rows(), 3);
    assert_eq!(column_a(&block), vec![Some(1), None, Some(3)]);
    let bs: Vec<_> = batch.column(1).as_string::<i32>().iter().collect();
    assert_eq!(bs, vec![None, Some("x"), Some("z")]);
}

#[test]
fn reject_policy_refuses_new_and_missing_columns() {
    let config = BuilderConfig::default().with_missing_columns(MissingColumns::Reject);
    let mut b = ArrowBlockBuilder::with_config(config);
    b.add(record! { "a" => 1, "b" => 2 }.into()).unwrap();

    let err = b.add(record! { "a" => 1, "b" => 2, "c" => 3 }.into()).unwrap_err();
    assert!(matches!(err, BlockError::UnexpectedColumn { row: 1, ref column } if column == "c"));
    let err = b.add(record! { "a" => 1 }.into()).unwrap_err();
    assert!(matches!(err, BlockError::MissingColumn { row: 1, ref column } if column == "b"));

    // Rejected rows leave no partial writes behind.
    assert_eq!(b.num_rows(), 1);
    b.add(record! { "b" => 4, "a" => 3 }.into()).unwrap();
    assert_eq!(column_a(&b.build().unwrap()), vec![Some(1), Some(3)]);
}

#[test]
fn arrow_builder_rejects_non_records() {
    let mut b = ArrowBlockBuilder::new();
    let err = b.add(Value::from("x")).unwrap_err();
    assert!(matches!(err, BlockError::NotARecord { kind: "string" }));
    assert_eq!(b.num_rows(), 0);
}

#[test]
fn merged_tables_keep_call_order() {
    let mut b = ArrowBlockBuilder::new();
    b.add_block(Block::Arrow(batch_a(vec![10, 11]))).unwrap();
    b.add(record! { "a" => 1 }.into()).unwrap();
    b.add(record! { "a" => 2 }.into()).unwrap();
    b.add_block(Block::Arrow(batch_a(vec![20]))).unwrap();
    b.add(record! { "a" => 3 }.into()).unwrap();
    assert_eq!(b.num_rows(), 6);

    let block = b.build().unwrap();
    assert_eq!(block.num_rows(), 6);
    assert_eq!(
        column_a(&block),
        vec![Some(10), Some(11), Some(1), Some(2), Some(20), Some(3)]
    );
    // Nullability widens to the pending rows' nullable column.
    assert!(block.as_arrow().unwrap().schema().field(0).is_nullable());
}

#[test]
fn single_merged_table_is_returned_unchanged() {
    let batch = batch_a(vec![1, 2]);
    let mut b = ArrowBlockBuilder::new();
    b.add_batch(batch.clone());
    let built = b.finish().unwrap();
    assert_eq!(built, batch);
    assert!(!built.schema().field(0).is_nullable());
}

#[test]
fn incompatible_schemas_fail_at_build() {
    let other = RecordBatch::try_new(
        Arc::new(Schema::new(vec![Field::new("a", DataType::Utf8, true)])),
        vec![Arc::new(StringArray::from(vec!["s"]))],
    )
    .unwrap();
    let mut b = ArrowBlockBuilder::new();
    b.add_block(Block::Arrow(batch_a(vec![1]))).unwrap();
    b.add_block(Block::Arrow(other)).unwrap();
    assert_eq!(b.num_rows(), 2);
    assert!(matches!(b.build().unwrap_err(), BlockError::Arrow(_)));
}

#[test]
fn empty_records_count_rows() {
    let mut b = ArrowBlockBuilder::new();
    b.add(Record::new().into()).unwrap();
    b.add(Record::new().into()).unwrap();
    let batch = b.finish().unwrap();
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(batch.num_columns(), 0);
}

#[test]
fn builders_reject_foreign_blocks() {
    let mut arrow = ArrowBlockBuilder::new();
    let err = arrow.add_block(Block::from(vec![Value::Int(1)])).unwrap_err();
    assert!(matches!(
        err,
        BlockError::IncompatibleBlock {
            expected: BlockKind::Arrow,
            actual: BlockKind::Simple
        }
    ));

    let mut simple = SimpleBlockBuilder::new();
    let err = simple.add_block(Block::Arrow(batch_a(vec![1]))).unwrap_err();
    assert!(matches!(
        err,
        BlockError::IncompatibleBlock {
            expected: BlockKind::Simple,
            actual: BlockKind::Arrow
        }
    ));
}

#[test]
fn build_twice_gives_independent_blocks() {
    let mut b = SimpleBlockBuilder::new();
    b.add(Value::from(1)).unwrap();
    let first = b.build().unwrap();
    let second = b.build().unwrap();
    let (Block::Simple(x), Block::Simple(y)) = (&first, &second) else {
        panic!("expected simple blocks");
    };
    assert_eq!(x, y);
    assert!(!x.shares_storage(y));
}

#[test]
fn delegating_trial_falls_back_on_conversion_error() {
    // A list mixing ints and strings cannot become one Arrow column.
    let mixed = record! { "xs" => vec![Value::from(1), Value::from("two")] };
    let mut b = DelegatingBlockBuilder::new();
    b.add(mixed.clone().into()).unwrap();
    assert_eq!(b.kind(), Some(BlockKind::Simple));
    b.add(record! { "a" => 1 }.into()).unwrap();

    let block = b.build().unwrap();
    let rows = block.as_simple().unwrap().rows();
    assert_eq!(rows, &[Value::Record(mixed), Value::Record(record! { "a" => 1 })]);
}

#[test]
fn delegating_does_not_revalidate_later_rows() {
    let mut b = DelegatingBlockBuilder::new();
    b.add(record! { "a" => 1 }.into()).unwrap();
    assert_eq!(b.kind(), Some(BlockKind::Arrow));
    b.add(record! { "a" => "one" }.into()).unwrap();
    assert_eq!(b.num_rows(), 2);
    assert!(b.build().unwrap_err().is_conversion());

    let err = b.add(Value::from(5)).unwrap_err();
    assert!(matches!(err, BlockError::NotARecord { kind: "int" }));
}

#[test]
fn delegating_add_block_selects_from_accessor() {
    let mut b = DelegatingBlockBuilder::new();
    b.add_block(Block::from(vec![Value::from("x")])).unwrap();
    assert_eq!(b.kind(), Some(BlockKind::Simple));
    b.add(record! { "a" => 1 }.into()).unwrap();
    assert_eq!(b.build().unwrap().kind(), BlockKind::Simple);

    let mut b = DelegatingBlockBuilder::new();
    b.add_block(Block::Arrow(batch_a(vec![1, 2]))).unwrap();
    assert_eq!(b.kind(), Some(BlockKind::Arrow));
    assert_eq!(b.num_rows(), 2);
    let err = b.add_block(Block::from(vec![Value::Null])).unwrap_err();
    assert!(matches!(err, BlockError::IncompatibleBlock { .. }));
}

#[test]
fn config_reaches_delegated_builder() {
    let config = BuilderConfig::default()
        .with_capacity(16)
        .with_missing_columns(MissingColumns::Reject);
    let mut b = DelegatingBlockBuilder::with_config(config);
    b.add(record! { "a" => 1 }.into()).unwrap();
    let err = b.add(record! { "b" => 1 }.into()).unwrap_err();
    assert!(matches!(err, BlockError::UnexpectedColumn { .. }));
}

#[test]
fn boxed_builders_are_builders() {
    let mut b: Box<dyn BlockBuilder> = Box::new(DelegatingBlockBuilder::new());
    b.add(Value::from(true)).unwrap();
    assert_eq!(b.num_rows(), 1);
    assert_eq!(b.build().unwrap().kind(), BlockKind::Simple);
}

#[test]
fn trial_build_skips_capacity() {
    let config = BuilderConfig::default()
        .with_capacity(1 << 20)
        .with_missing_columns(MissingColumns::Reject);
    let b = DelegatingBlockBuilder::with_config(config);
    let trial = b.trial_config();
    assert_eq!(trial.capacity, 0);
    assert_eq!(trial.missing_columns, MissingColumns::Reject);
}
