use typed_blocks::{
    Block, BlockAccessor, BlockBuilder, BlockKind, DelegatingBlockBuilder, Value,
    arrow_array::{Array, cast::AsArray, types::Int64Type},
    record,
};

#[test]
fn records_with_one_schema_build_an_arrow_block() {
    let mut builder = DelegatingBlockBuilder::new();
    for i in 1..=3 {
        builder.add(record! { "a" => i }.into()).unwrap();
    }
    assert_eq!(builder.kind(), Some(BlockKind::Arrow));
    assert_eq!(builder.num_rows(), 3);

    let block = builder.build().unwrap();
    let batch = block.as_arrow().expect("arrow block");
    assert_eq!(batch.num_rows(), 3);
    assert_eq!(batch.num_columns(), 1);
    assert_eq!(batch.schema().field(0).name(), "a");
    let a = batch.column(0).as_primitive::<Int64Type>();
    assert_eq!(a.values().to_vec(), vec![1, 2, 3]);
}

#[test]
fn non_record_first_keeps_everything_simple() {
    let mut builder = DelegatingBlockBuilder::new();
    builder.add(Value::from("x")).unwrap();
    builder.add(record! { "a" => 1 }.into()).unwrap();
    assert_eq!(builder.kind(), Some(BlockKind::Simple));

    let block = builder.build().unwrap();
    assert_eq!(block.kind(), BlockKind::Simple);
    let rows = block.as_simple().unwrap().rows();
    assert_eq!(
        rows,
        &[Value::from("x"), Value::Record(record! { "a" => 1 })]
    );
}

#[test]
fn untouched_builder_builds_empty_arrow_block() {
    let builder = DelegatingBlockBuilder::new();
    assert_eq!(builder.num_rows(), 0);
    assert_eq!(builder.kind(), None);

    let block = builder.build().unwrap();
    let batch = block.as_arrow().expect("arrow block");
    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 0);
}

#[test]
fn later_shapes_never_change_the_choice() {
    let mut builder = DelegatingBlockBuilder::new();
    builder.add(Value::List(vec![Value::from(1)])).unwrap();
    for i in 0..10 {
        builder.add(record! { "i" => i }.into()).unwrap();
    }
    let block = builder.build().unwrap();
    assert_eq!(block.kind(), BlockKind::Simple);
    assert_eq!(block.num_rows(), 11);
}

#[test]
fn merged_blocks_interleave_in_call_order() {
    let mut source = DelegatingBlockBuilder::new();
    source.add(record! { "a" => 100 }.into()).unwrap();
    source.add(record! { "a" => 200 }.into()).unwrap();
    let merged = source.build().unwrap();

    let mut builder = DelegatingBlockBuilder::new();
    builder.add(record! { "a" => 1 }.into()).unwrap();
    builder.add_block(merged.clone()).unwrap();
    builder.add(record! { "a" => 2 }.into()).unwrap();
    builder.add_block(merged).unwrap();
    assert_eq!(builder.num_rows(), 6);

    let block = builder.build().unwrap();
    assert_eq!(block.num_rows(), 6);
    let a: Vec<_> = block.as_arrow().unwrap().column(0).as_primitive::<Int64Type>().iter().collect();
    assert_eq!(
        a,
        vec![Some(1), Some(100), Some(200), Some(2), Some(100), Some(200)]
    );
}

#[test]
fn simple_blocks_merge_in_order() {
    let mut builder = DelegatingBlockBuilder::new();
    builder.add_block(Block::from(vec![Value::from(1), Value::from(2)])).unwrap();
    builder.add(Value::from("mid")).unwrap();
    builder.add_block(Block::from(vec![Value::Null])).unwrap();

    let block = builder.build().unwrap();
    let rows: Vec<Value> = block
        .accessor()
        .iter_rows()
        .map(|r| r.to_value().unwrap())
        .collect();
    assert_eq!(
        rows,
        vec![Value::from(1), Value::from(2), Value::from("mid"), Value::Null]
    );
}

#[test]
fn nested_records_stay_columnar() {
    let mut builder = DelegatingBlockBuilder::new();
    builder
        .add(record! { "id" => 1, "tags" => vec![Value::from("a")], "pos" => record! { "x" => 0.5 } }.into())
        .unwrap();
    builder
        .add(record! { "id" => 2, "tags" => Vec::<Value>::new(), "pos" => Value::Null }.into())
        .unwrap();
    let block = builder.build().unwrap();
    let batch = block.as_arrow().expect("arrow block");
    assert_eq!(batch.num_columns(), 3);
    assert!(batch.column(2).is_null(1));
}
