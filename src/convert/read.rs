//! Read single Arrow array slots back into dynamic values.

use arrow_array::{
    Array,
    cast::AsArray,
    types::{
        Date32Type, Date64Type, Decimal128Type, Decimal256Type, DurationMicrosecondType, DurationMillisecondType,
        DurationNanosecondType, DurationSecondType, Float16Type, Float32Type, Float64Type,
        Int8Type, Int16Type, Int32Type, Int64Type, Time32MillisecondType, Time32SecondType,
        Time64MicrosecondType, Time64NanosecondType, TimestampMicrosecondType,
        TimestampMillisecondType, TimestampNanosecondType, TimestampSecondType, UInt8Type,
        UInt16Type, UInt32Type, UInt64Type,
    },
};
use arrow_schema::{DataType, TimeUnit};

use crate::{
    BlockError, Result,
    value::{Record, Value},
};

macro_rules! primitive {
    ($array:expr, $row:expr, $arrow:ty, $variant:ident) => {
        Value::$variant($array.as_primitive::<$arrow>().value($row).into())
    };
}

/// Convert the value at `row` of `array` into an owned [`Value`].
///
/// Temporal types are returned as their raw integer encoding (days, units since epoch, or
/// duration ticks) and decimals as their formatted string. Dictionaries read through to the
/// referenced value; a map slot becomes a list of `{key, value}` records. `column` is used
/// only for error context.
pub(crate) fn value_at(column: &str, array: &dyn Array, row: usize) -> Result<Value> {
    // `NullArray` reports no validity buffer, so `is_null` would say false.
    if matches!(array.data_type(), DataType::Null) || array.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match array.data_type() {
        DataType::Boolean => Value::Bool(array.as_boolean().value(row)),
        DataType::Int8 => primitive!(array, row, Int8Type, Int),
        DataType::Int16 => primitive!(array, row, Int16Type, Int),
        DataType::Int32 => primitive!(array, row, Int32Type, Int),
        DataType::Int64 => primitive!(array, row, Int64Type, Int),
        DataType::UInt8 => primitive!(array, row, UInt8Type, UInt),
        DataType::UInt16 => primitive!(array, row, UInt16Type, UInt),
        DataType::UInt32 => primitive!(array, row, UInt32Type, UInt),
        DataType::UInt64 => primitive!(array, row, UInt64Type, UInt),
        DataType::Float16 => {
            let v: half::f16 = array.as_primitive::<Float16Type>().value(row);
            Value::Float(v.to_f64())
        }
        DataType::Float32 => primitive!(array, row, Float32Type, Float),
        DataType::Float64 => primitive!(array, row, Float64Type, Float),
        DataType::Date32 => primitive!(array, row, Date32Type, Int),
        DataType::Date64 => primitive!(array, row, Date64Type, Int),
        DataType::Time32(TimeUnit::Second) => primitive!(array, row, Time32SecondType, Int),
        DataType::Time32(TimeUnit::Millisecond) => {
            primitive!(array, row, Time32MillisecondType, Int)
        }
        DataType::Time64(TimeUnit::Microsecond) => {
            primitive!(array, row, Time64MicrosecondType, Int)
        }
        DataType::Time64(TimeUnit::Nanosecond) => {
            primitive!(array, row, Time64NanosecondType, Int)
        }
        DataType::Timestamp(TimeUnit::Second, _) => {
            primitive!(array, row, TimestampSecondType, Int)
        }
        DataType::Timestamp(TimeUnit::Millisecond, _) => {
            primitive!(array, row, TimestampMillisecondType, Int)
        }
        DataType::Timestamp(TimeUnit::Microsecond, _) => {
            primitive!(array, row, TimestampMicrosecondType, Int)
        }
        DataType::Timestamp(TimeUnit::Nanosecond, _) => {
            primitive!(array, row, TimestampNanosecondType, Int)
        }
        DataType::Duration(TimeUnit::Second) => primitive!(array, row, DurationSecondType, Int),
        DataType::Duration(TimeUnit::Millisecond) => {
            primitive!(array, row, DurationMillisecondType, Int)
        }
        DataType::Duration(TimeUnit::Microsecond) => {
            primitive!(array, row, DurationMicrosecondType, Int)
        }
        DataType::Duration(TimeUnit::Nanosecond) => {
            primitive!(array, row, DurationNanosecondType, Int)
        }
        DataType::Utf8 => Value::Str(array.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => Value::Str(array.as_string::<i64>().value(row).to_string()),
        DataType::Utf8View => Value::Str(array.as_string_view().value(row).to_string()),
        DataType::Binary => Value::Bin(array.as_binary::<i32>().value(row).to_vec()),
        DataType::LargeBinary => Value::Bin(array.as_binary::<i64>().value(row).to_vec()),
        DataType::BinaryView => Value::Bin(array.as_binary_view().value(row).to_vec()),
        DataType::FixedSizeBinary(_) => {
            Value::Bin(array.as_fixed_size_binary().value(row).to_vec())
        }
        DataType::List(_) => list_values(column, array.as_list::<i32>().value(row).as_ref())?,
        DataType::LargeList(_) => {
            list_values(column, array.as_list::<i64>().value(row).as_ref())?
        }
        DataType::FixedSizeList(_, _) => {
            list_values(column, array.as_fixed_size_list().value(row).as_ref())?
        }
        DataType::Struct(fields) => {
            let s = array.as_struct();
            let mut record = Record::with_capacity(fields.len());
            for (field, child) in fields.iter().zip(s.columns()) {
                let path = format!("{column}.{}", field.name());
                record.insert(field.name().as_str(), value_at(&path, child.as_ref(), row)?);
            }
            Value::Record(record)
        }
        DataType::Decimal128(_, _) => {
            Value::Str(array.as_primitive::<Decimal128Type>().value_as_string(row))
        }
        DataType::Decimal256(_, _) => {
            Value::Str(array.as_primitive::<Decimal256Type>().value_as_string(row))
        }
        DataType::Dictionary(_, _) => {
            let dict = array.as_any_dictionary();
            let key = match value_at(column, dict.keys(), row)? {
                Value::Int(k) => usize::try_from(k).ok(),
                Value::UInt(k) => usize::try_from(k).ok(),
                _ => None,
            }
            .ok_or_else(|| BlockError::conversion(column, "invalid dictionary key"))?;
            value_at(column, dict.values().as_ref(), key)?
        }
        DataType::Map(_, _) => {
            let entries = array.as_map().value(row);
            let key_path = format!("{column}[].key");
            let value_path = format!("{column}[].value");
            let items = (0..entries.len())
                .map(|i| {
                    let key = value_at(&key_path, entries.column(0).as_ref(), i)?;
                    let value = value_at(&value_path, entries.column(1).as_ref(), i)?;
                    Ok(Value::Record(Record::new().with("key", key).with("value", value)))
                })
                .collect::<Result<Vec<_>>>()?;
            Value::List(items)
        }
        other => {
            return Err(BlockError::UnsupportedType {
                column: column.to_string(),
                data_type: other.clone(),
            });
        }
    };
    Ok(value)
}

fn list_values(column: &str, items: &dyn Array) -> Result<Value> {
    let path = format!("{column}[]");
    let values = (0..items.len())
        .map(|i| value_at(&path, items, i))
        .collect::<Result<Vec<_>>>()?;
    Ok(Value::List(values))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow_array::{
        ArrayRef, Decimal128Array, DictionaryArray, Float16Array, Int32Array,
        IntervalYearMonthArray, NullArray, StringArray, StructArray, TimestampMillisecondArray,
        builder::{Int64Builder, MapBuilder, StringBuilder},
    };
    use arrow_schema::Field;

    use super::*;
    use crate::record;

    #[test]
    fn narrow_ints_widen() {
        let arr = Int32Array::from(vec![Some(-4), None]);
        assert_eq!(value_at("c", &arr, 0).unwrap(), Value::Int(-4));
        assert_eq!(value_at("c", &arr, 1).unwrap(), Value::Null);
    }

    #[test]
    fn null_array_reads_null() {
        let arr = NullArray::new(2);
        assert_eq!(value_at("c", &arr, 1).unwrap(), Value::Null);
    }

    #[test]
    fn half_floats_and_timestamps() {
        let halves = Float16Array::from(vec![half::f16::from_f32(1.5)]);
        assert_eq!(value_at("c", &halves, 0).unwrap(), Value::Float(1.5));
        let ts = TimestampMillisecondArray::from(vec![1_700_000_000_000]);
        assert_eq!(value_at("c", &ts, 0).unwrap(), Value::Int(1_700_000_000_000));
    }

    #[test]
    fn struct_reads_as_record() {
        let a: ArrayRef = Arc::new(Int32Array::from(vec![1, 2]));
        let b: ArrayRef = Arc::new(StringArray::from(vec!["x", "y"]));
        let s = StructArray::from(vec![
            (Arc::new(Field::new("a", DataType::Int32, false)), a),
            (Arc::new(Field::new("b", DataType::Utf8, false)), b),
        ]);
        assert_eq!(
            value_at("s", &s, 1).unwrap(),
            Value::Record(record! { "a" => 2, "b" => "y" })
        );
    }

    #[test]
    fn dictionary_reads_through_keys() {
        let dict: DictionaryArray<Int32Type> =
            vec![Some("a"), None, Some("b"), Some("a")].into_iter().collect();
        assert_eq!(value_at("d", &dict, 0).unwrap(), Value::from("a"));
        assert_eq!(value_at("d", &dict, 1).unwrap(), Value::Null);
        assert_eq!(value_at("d", &dict, 3).unwrap(), Value::from("a"));
        let sliced = dict.slice(2, 2);
        assert_eq!(value_at("d", &sliced, 0).unwrap(), Value::from("b"));
    }

    #[test]
    fn map_reads_as_key_value_records() {
        let mut builder = MapBuilder::new(None, StringBuilder::new(), Int64Builder::new());
        builder.keys().append_value("x");
        builder.values().append_value(1);
        builder.keys().append_value("y");
        builder.values().append_null();
        builder.append(true).unwrap();
        builder.append(false).unwrap();
        let map = builder.finish();

        assert_eq!(
            value_at("m", &map, 0).unwrap(),
            Value::List(vec![
                record! { "key" => "x", "value" => 1 }.into(),
                record! { "key" => "y", "value" => Value::Null }.into(),
            ])
        );
        assert_eq!(value_at("m", &map, 1).unwrap(), Value::Null);
    }

    #[test]
    fn decimals_read_as_strings() {
        let dec = Decimal128Array::from(vec![12345])
            .with_precision_and_scale(10, 2)
            .unwrap();
        assert_eq!(value_at("p", &dec, 0).unwrap(), Value::from("123.45"));
    }

    #[test]
    fn intervals_are_unsupported() {
        let arr = IntervalYearMonthArray::from(vec![3]);
        let err = value_at("i", &arr, 0).unwrap_err();
        assert!(matches!(err, BlockError::UnsupportedType { column, .. } if column == "i"));
    }
}
