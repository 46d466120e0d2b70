//! Arrow type inference over a column of dynamic values.

use std::sync::Arc;

use arrow_schema::{DataType, Field, Fields};

use crate::{BlockError, Result, value::Value};

/// Running summary of the values seen in one column (or one nested child).
#[derive(Debug, Default)]
pub(crate) enum Shape {
    /// Only nulls so far.
    #[default]
    Unknown,
    Bool,
    Number {
        int: bool,
        uint: bool,
        big_uint: bool,
        float: bool,
    },
    Str,
    Bin,
    List(Box<Shape>),
    Struct(Vec<(String, Shape)>),
}

impl Shape {
    /// Fold one more value into the summary. `path` names the column for errors.
    pub(crate) fn observe(&mut self, path: &str, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }
        if matches!(self, Shape::Unknown) {
            *self = Shape::seed(value);
        }
        match (self, value) {
            (Shape::Bool, Value::Bool(_)) | (Shape::Str, Value::Str(_)) | (Shape::Bin, Value::Bin(_)) => {
                Ok(())
            }
            (
                Shape::Number {
                    int,
                    uint,
                    big_uint,
                    float,
                },
                v @ (Value::Int(_) | Value::UInt(_) | Value::Float(_)),
            ) => {
                match *v {
                    Value::Int(_) => *int = true,
                    Value::UInt(x) => {
                        *uint = true;
                        *big_uint |= i64::try_from(x).is_err();
                    }
                    _ => *float = true,
                }
                Ok(())
            }
            (Shape::List(item), Value::List(items)) => {
                let child = format!("{path}[]");
                items.iter().try_for_each(|v| item.observe(&child, v))
            }
            (Shape::Struct(fields), Value::Record(record)) => {
                for (key, v) in record.iter() {
                    let idx = match fields.iter().position(|(name, _)| name == key) {
                        Some(idx) => idx,
                        None => {
                            fields.push((key.to_string(), Shape::Unknown));
                            fields.len() - 1
                        }
                    };
                    fields[idx].1.observe(&format!("{path}.{key}"), v)?;
                }
                Ok(())
            }
            (shape, v) => Err(BlockError::conversion(
                path,
                format!("cannot mix {} and {} values", shape.name(), v.kind()),
            )),
        }
    }

    fn seed(value: &Value) -> Shape {
        match value {
            Value::Null => Shape::Unknown,
            Value::Bool(_) => Shape::Bool,
            Value::Int(_) | Value::UInt(_) | Value::Float(_) => Shape::Number {
                int: false,
                uint: false,
                big_uint: false,
                float: false,
            },
            Value::Str(_) => Shape::Str,
            Value::Bin(_) => Shape::Bin,
            Value::List(_) => Shape::List(Box::default()),
            Value::Record(_) => Shape::Struct(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Shape::Unknown => "null",
            Shape::Bool => "bool",
            Shape::Number { .. } => "numeric",
            Shape::Str => "string",
            Shape::Bin => "binary",
            Shape::List(_) => "list",
            Shape::Struct(_) => "record",
        }
    }

    /// Resolve the summary into the Arrow type the column will be built with.
    pub(crate) fn data_type(&self, path: &str) -> Result<DataType> {
        Ok(match self {
            Shape::Unknown => DataType::Null,
            Shape::Bool => DataType::Boolean,
            Shape::Number { float: true, .. } => DataType::Float64,
            Shape::Number {
                int: true,
                big_uint: true,
                ..
            } => {
                return Err(BlockError::conversion(
                    path,
                    "unsigned value exceeds i64::MAX in a signed integer column",
                ));
            }
            Shape::Number { int: true, .. } => DataType::Int64,
            Shape::Number { .. } => DataType::UInt64,
            Shape::Str => DataType::Utf8,
            Shape::Bin => DataType::Binary,
            Shape::List(item) => {
                let item = item.data_type(&format!("{path}[]"))?;
                DataType::List(Arc::new(Field::new_list_field(item, true)))
            }
            Shape::Struct(fields) => {
                let fields = fields
                    .iter()
                    .map(|(name, shape)| {
                        let dt = shape.data_type(&format!("{path}.{name}"))?;
                        Ok(Field::new(name, dt, true))
                    })
                    .collect::<Result<Vec<_>>>()?;
                DataType::Struct(Fields::from(fields))
            }
        })
    }
}

/// Infer a single Arrow type for every non-null value in `values`.
pub(crate) fn infer_type<'v>(
    column: &str,
    values: impl IntoIterator<Item = &'v Value>,
) -> Result<DataType> {
    let mut shape = Shape::Unknown;
    for v in values {
        shape.observe(column, v)?;
    }
    shape.data_type(column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    fn infer(values: &[Value]) -> Result<DataType> {
        infer_type("c", values)
    }

    #[test]
    fn numbers_promote() {
        assert_eq!(infer(&[1.into(), 2.into()]).unwrap(), DataType::Int64);
        assert_eq!(infer(&[1u64.into(), 2u8.into()]).unwrap(), DataType::UInt64);
        assert_eq!(infer(&[1.into(), 2u32.into()]).unwrap(), DataType::Int64);
        assert_eq!(infer(&[1.into(), 2.5.into()]).unwrap(), DataType::Float64);
        assert_eq!(infer(&[Value::Null, Value::Null]).unwrap(), DataType::Null);
    }

    #[test]
    fn signed_with_huge_unsigned_fails() {
        let err = infer(&[(-1).into(), u64::MAX.into()]).unwrap_err();
        assert!(err.is_conversion());
    }

    #[test]
    fn mixed_kinds_name_the_path() {
        let values = [
            Value::Record(record! { "a" => vec![Value::from(1)] }),
            Value::Record(record! { "a" => vec![Value::from("x")] }),
        ];
        let err = infer(&values).unwrap_err();
        match err {
            BlockError::TypeConversion { column, .. } => assert_eq!(column, "c.a[]"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn struct_fields_union_in_first_seen_order() {
        let values = [
            Value::Record(record! { "x" => 1 }),
            Value::Null,
            Value::Record(record! { "y" => "s", "x" => 2 }),
        ];
        let DataType::Struct(fields) = infer(&values).unwrap() else {
            panic!("expected struct");
        };
        let names: Vec<_> = fields.iter().map(|f| f.name().as_str()).collect();
        assert_eq!(names, ["x", "y"]);
        assert_eq!(fields[1].data_type(), &DataType::Utf8);
    }
}
