//! Conversions between dynamic [`Value`](crate::Value)s and Arrow arrays.
//!
//! This is the boundary with the Arrow library: building a table from named
//! columns, deep-copying arrays, and reading one slot back out.

mod build;
mod infer;
mod read;

use std::sync::Arc;

use arrow_array::{Array, ArrayRef, RecordBatch, RecordBatchOptions, make_array};
use arrow_buffer::{BooleanBuffer, Buffer, NullBuffer};
use arrow_data::{ArrayData, transform::MutableArrayData};
use arrow_schema::{ArrowError, Field, Schema};

pub(crate) use build::build_array;
pub(crate) use infer::infer_type;
pub(crate) use read::value_at;

use crate::{Result, value::Value};

/// Build a `RecordBatch` from named columns of equal length `num_rows`.
///
/// Every column's type is inferred from its values; all fields are nullable.
pub(crate) fn table_from_columns(
    columns: &[(String, Vec<Value>)],
    num_rows: usize,
) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(columns.len());
    let mut arrays = Vec::with_capacity(columns.len());
    for (name, values) in columns {
        let dt = infer_type(name, values)?;
        let refs: Vec<&Value> = values.iter().collect();
        arrays.push(build_array(name, &dt, &refs)?);
        fields.push(Field::new(name, dt, true));
    }
    let options = RecordBatchOptions::new().with_row_count(Some(num_rows));
    Ok(RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        arrays,
        &options,
    )?)
}

/// Copy `array` into freshly allocated buffers that share nothing with the source.
///
/// `MutableArrayData` compacts the array to its visible range but passes dictionary values and
/// view data buffers through untouched, so every buffer of the result, children included, is
/// then reallocated.
pub(crate) fn deep_copy(array: &dyn Array) -> Result<ArrayRef> {
    let data = array.to_data();
    let mut compact = MutableArrayData::new(vec![&data], false, data.len());
    compact.extend(0, 0, data.len());
    Ok(make_array(reallocate(compact.freeze())?))
}

fn reallocate(data: ArrayData) -> Result<ArrayData, ArrowError> {
    let buffers = data
        .buffers()
        .iter()
        .map(|b| Buffer::from_slice_ref(b.as_slice()))
        .collect();
    let children = data
        .child_data()
        .iter()
        .cloned()
        .map(reallocate)
        .collect::<Result<Vec<_>, _>>()?;
    let nulls = data.nulls().map(|n| {
        let bits = n.inner();
        NullBuffer::new(BooleanBuffer::new(
            Buffer::from_slice_ref(bits.inner().as_slice()),
            bits.offset(),
            bits.len(),
        ))
    });
    data.into_builder()
        .buffers(buffers)
        .child_data(children)
        .nulls(nulls)
        .build()
}
