//! Dynamic row values accepted by block builders.
//!
//! Notes on mapping to Arrow types:
//! - `Int` and `UInt` widen to `Int64`/`UInt64` columns; a column mixing both becomes `Int64`.
//! - Any `Float` in an integer column promotes the column to `Float64`.
//! - `Record` values become `Struct` columns, `List` values become `List` columns. Both infer
//!   their child types from every element seen in the column.

use std::mem;

/// A dynamic value appended into a block builder or read back from a block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Absent value; becomes an Arrow null.
    Null,
    /// Boolean value for `DataType::Boolean`.
    Bool(bool),
    /// Signed integer, stored as `DataType::Int64`.
    Int(i64),
    /// Unsigned integer, stored as `DataType::UInt64`.
    UInt(u64),
    /// Floating point, stored as `DataType::Float64`.
    Float(f64),
    /// UTF-8 string for `DataType::Utf8`.
    Str(String),
    /// Arbitrary bytes for `DataType::Binary`.
    Bin(Vec<u8>),
    /// Variable-size list; items may be `Null`.
    List(Vec<Value>),
    /// Named fields. This is the only "mapping-shaped" value: only records can be
    /// rows of an Arrow block.
    Record(Record),
}

impl Value {
    /// Short lowercase name of this value's variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Bin(_) => "binary",
            Value::List(_) => "list",
            Value::Record(_) => "record",
        }
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the record if this value is one.
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    /// Borrow the string if this value is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this value is an `Int`, or a `UInt` that fits in `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            Value::UInt(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Returns the number as `f64` for any numeric variant.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::UInt(v) => Some(v as f64),
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Estimated in-memory footprint: the enum itself plus owned heap bytes.
    pub fn estimated_size(&self) -> usize {
        mem::size_of::<Value>() + self.heap_size()
    }

    fn heap_size(&self) -> usize {
        match self {
            Value::Str(s) => s.len(),
            Value::Bin(b) => b.len(),
            Value::List(items) => items.iter().map(Value::estimated_size).sum(),
            Value::Record(r) => r
                .iter()
                .map(|(k, v)| mem::size_of::<String>() + k.len() + v.estimated_size())
                .sum(),
            _ => 0,
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(<$target>::from(v))
                }
            }
        )*
    };
}

value_from! {
    bool => Bool as bool,
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    f32 => Float as f64,
    f64 => Float as f64,
    String => Str as String,
    &str => Str as String,
    Vec<u8> => Bin as Vec<u8>,
    &[u8] => Bin as Vec<u8>,
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// An ordered set of named values. Keys are unique; insertion order is kept.
///
/// Equality ignores field order, so two records with the same entries compare equal
/// however they were assembled.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record with room for `capacity` fields.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set `key` to `value`, replacing (in place) any existing entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Builder-style [`Record::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a field by name.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Number of fields.
    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true when the record has no fields.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    /// Field values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.fields.iter().map(|(_, v)| v)
    }

    /// `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// Build a [`Record`] from `key => value` pairs.
///
/// ```
/// use typed_blocks::{Value, record};
///
/// let r = record! { "id" => 7, "name" => "ada" };
/// assert_eq!(r.get("id"), Some(&Value::Int(7)));
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::Record::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut r = $crate::Record::new();
        $( r.insert($key, $value); )+
        r
    }};
}
