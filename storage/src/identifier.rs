use crate::Record;
use serde_json::Value;
use std::fmt::{Debug, Display};

/// Key extracted from the identifier field of a [Record].
///
/// A [crate::store::Store] is keyed by exactly one [Identifier] type, so identifiers of different
/// JSON types never meet in the same tree. A record whose identifier field holds a value of
/// another type is treated as if the field were missing.
pub trait Identifier: Ord + Clone + Debug + Display {
    /// Convert a JSON value into an identifier, if it has the right type.
    fn from_value(value: &Value) -> Option<Self>;

    /// Convert the identifier back into the JSON value stored in a record.
    fn to_value(&self) -> Value;

    /// Read the identifier stored under `field` in `record`.
    ///
    /// Returns `None` if the field is absent, `null`, or of another type.
    fn extract(record: &Record, field: &str) -> Option<Self> {
        record.get(field).and_then(Self::from_value)
    }
}

impl Identifier for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }

    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl Identifier for u64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_u64()
    }

    fn to_value(&self) -> Value {
        Value::from(*self)
    }
}

impl Identifier for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}
