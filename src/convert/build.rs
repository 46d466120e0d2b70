//! Materialize dynamic values into Arrow arrays of a known type.

use std::sync::Arc;

use arrow_array::{
    ArrayRef, BinaryArray, BooleanArray, Float64Array, Int64Array, ListArray, NullArray,
    StringArray, StructArray, UInt64Array,
};
use arrow_buffer::{NullBuffer, OffsetBuffer};
use arrow_schema::DataType;

use crate::{BlockError, Result, value::Value};

static NULL: Value = Value::Null;

/// Build an array of type `dt` from `values`. Nulls are allowed anywhere.
pub(crate) fn build_array(path: &str, dt: &DataType, values: &[&Value]) -> Result<ArrayRef> {
    let array: ArrayRef = match dt {
        DataType::Null => Arc::new(NullArray::new(values.len())),
        DataType::Boolean => Arc::new(BooleanArray::from(collect(path, dt, values, |v| {
            match v {
                Value::Bool(b) => Some(*b),
                _ => None,
            }
        })?)),
        DataType::Int64 => Arc::new(Int64Array::from(collect(
            path,
            dt,
            values,
            Value::as_i64,
        )?)),
        DataType::UInt64 => Arc::new(UInt64Array::from(collect(path, dt, values, |v| {
            match v {
                Value::UInt(x) => Some(*x),
                _ => None,
            }
        })?)),
        DataType::Float64 => Arc::new(Float64Array::from(collect(
            path,
            dt,
            values,
            Value::as_f64,
        )?)),
        DataType::Utf8 => Arc::new(StringArray::from(collect(path, dt, values, Value::as_str)?)),
        DataType::Binary => Arc::new(BinaryArray::from_opt_vec(collect(
            path,
            dt,
            values,
            |v| match v {
                Value::Bin(b) => Some(b.as_slice()),
                _ => None,
            },
        )?)),
        DataType::List(field) => {
            let child_path = format!("{path}[]");
            let mut lengths = Vec::with_capacity(values.len());
            let mut children = Vec::new();
            for v in values {
                match v {
                    Value::List(items) => {
                        lengths.push(items.len());
                        children.extend(items.iter());
                    }
                    Value::Null => lengths.push(0),
                    other => return Err(mismatch(path, dt, other)),
                }
            }
            let child = build_array(&child_path, field.data_type(), &children)?;
            Arc::new(ListArray::try_new(
                Arc::clone(field),
                OffsetBuffer::from_lengths(lengths),
                child,
                validity(values),
            )?)
        }
        DataType::Struct(fields) => {
            for v in values {
                if !matches!(v, Value::Record(_) | Value::Null) {
                    return Err(mismatch(path, dt, v));
                }
            }
            if fields.is_empty() {
                return Ok(Arc::new(StructArray::new_empty_fields(
                    values.len(),
                    validity(values),
                )));
            }
            let columns = fields
                .iter()
                .map(|field| {
                    let name = field.name();
                    let child: Vec<&Value> = values
                        .iter()
                        .map(|v| v.as_record().and_then(|r| r.get(name)).unwrap_or(&NULL))
                        .collect();
                    build_array(&format!("{path}.{name}"), field.data_type(), &child)
                })
                .collect::<Result<Vec<_>>>()?;
            Arc::new(StructArray::try_new(
                fields.clone(),
                columns,
                validity(values),
            )?)
        }
        other => {
            return Err(BlockError::UnsupportedType {
                column: path.to_string(),
                data_type: other.clone(),
            });
        }
    };
    Ok(array)
}

/// Extract native values, mapping `Null` to `None` and rejecting anything `extract` refuses.
fn collect<'v, T>(
    path: &str,
    dt: &DataType,
    values: &[&'v Value],
    extract: impl Fn(&'v Value) -> Option<T>,
) -> Result<Vec<Option<T>>> {
    values
        .iter()
        .map(|&v| match v {
            Value::Null => Ok(None),
            v => extract(v).map(Some).ok_or_else(|| mismatch(path, dt, v)),
        })
        .collect()
}

fn validity(values: &[&Value]) -> Option<NullBuffer> {
    if values.iter().any(|v| v.is_null()) {
        Some(NullBuffer::from(
            values.iter().map(|v| !v.is_null()).collect::<Vec<bool>>(),
        ))
    } else {
        None
    }
}

fn mismatch(path: &str, dt: &DataType, v: &Value) -> BlockError {
    BlockError::conversion(path, format!("expected {dt:?} value, found {}", v.kind()))
}
