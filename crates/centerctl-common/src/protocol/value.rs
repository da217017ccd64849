//! Wire Value Tree
//!
//! Replies from the two services are opaque to this client: there is no
//! generated code describing them. A reply is therefore decoded into a
//! generic [`Value`] tree keyed by field id, which can be inspected for the
//! few well-known fields and rendered in full for the operator.

use std::collections::BTreeMap;

use serde_json::{json, Map as JsonMap};

/// Binary protocol type codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TType {
    Stop,
    Void,
    Bool,
    Byte,
    Double,
    I16,
    I32,
    I64,
    String,
    Struct,
    Map,
    Set,
    List,
}

impl TType {
    pub fn as_u8(self) -> u8 {
        match self {
            TType::Stop => 0,
            TType::Void => 1,
            TType::Bool => 2,
            TType::Byte => 3,
            TType::Double => 4,
            TType::I16 => 6,
            TType::I32 => 8,
            TType::I64 => 10,
            TType::String => 11,
            TType::Struct => 12,
            TType::Map => 13,
            TType::Set => 14,
            TType::List => 15,
        }
    }

    pub fn from_u8(code: u8) -> Option<Self> {
        let ttype = match code {
            0 => TType::Stop,
            1 => TType::Void,
            2 => TType::Bool,
            3 => TType::Byte,
            4 => TType::Double,
            6 => TType::I16,
            8 => TType::I32,
            10 => TType::I64,
            11 => TType::String,
            12 => TType::Struct,
            13 => TType::Map,
            14 => TType::Set,
            15 => TType::List,
            _ => return None,
        };
        Some(ttype)
    }
}

/// A decoded wire value.
///
/// Strings and binaries share a type code on the wire; the decoder yields
/// [`Value::String`] when the payload is valid UTF-8 and [`Value::Binary`]
/// otherwise.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    Struct(BTreeMap<i16, Value>),
    List(TType, Vec<Value>),
    Set(TType, Vec<Value>),
    Map(TType, TType, Vec<(Value, Value)>),
}

impl Value {
    pub fn ttype(&self) -> TType {
        match self {
            Value::Bool(_) => TType::Bool,
            Value::Byte(_) => TType::Byte,
            Value::I16(_) => TType::I16,
            Value::I32(_) => TType::I32,
            Value::I64(_) => TType::I64,
            Value::Double(_) => TType::Double,
            Value::String(_) | Value::Binary(_) => TType::String,
            Value::Struct(_) => TType::Struct,
            Value::List(..) => TType::List,
            Value::Set(..) => TType::Set,
            Value::Map(..) => TType::Map,
        }
    }

    /// Returns field `id` when this value is a struct.
    pub fn field(&self, id: i16) -> Option<&Value> {
        match self {
            Value::Struct(fields) => fields.get(&id),
            _ => None,
        }
    }

    /// Widens any integer value to `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::I16(v) => Some(i64::from(*v)),
            Value::I32(v) => Some(i64::from(*v)),
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// First string found in a struct, in field-id order.
    ///
    /// Service exceptions carry their human-readable detail as a string
    /// field, but its id varies between exception types.
    pub fn first_string(&self) -> Option<&str> {
        match self {
            Value::Struct(fields) => fields.values().find_map(Value::as_str),
            _ => None,
        }
    }

    /// Renders the value as JSON.
    ///
    /// Struct fields are keyed by their numeric id. Maps whose keys are all
    /// strings become JSON objects; any other map becomes a list of
    /// `[key, value]` pairs.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(v) => json!(v),
            Value::Byte(v) => json!(v),
            Value::I16(v) => json!(v),
            Value::I32(v) => json!(v),
            Value::I64(v) => json!(v),
            Value::Double(v) => json!(v),
            Value::String(v) => json!(v),
            Value::Binary(v) => json!(v),
            Value::Struct(fields) => {
                let object: JsonMap<String, serde_json::Value> = fields
                    .iter()
                    .map(|(id, value)| (id.to_string(), value.to_json()))
                    .collect();
                serde_json::Value::Object(object)
            }
            Value::List(_, items) | Value::Set(_, items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(_, _, entries) => {
                if entries.iter().all(|(k, _)| k.as_str().is_some()) {
                    let object: JsonMap<String, serde_json::Value> = entries
                        .iter()
                        .filter_map(|(k, v)| k.as_str().map(|k| (k.to_string(), v.to_json())))
                        .collect();
                    serde_json::Value::Object(object)
                } else {
                    serde_json::Value::Array(
                        entries
                            .iter()
                            .map(|(k, v)| json!([k.to_json(), v.to_json()]))
                            .collect(),
                    )
                }
            }
        }
    }
}

/// Builds a [`Value::Struct`] field by field.
///
/// ```
/// use centerctl_common::protocol::value::{StructBuilder, Value};
///
/// let value = StructBuilder::new()
///     .i64(1, 42)
///     .string(2, "vol123")
///     .opt_string(3, None)
///     .build();
/// assert_eq!(value.field(1), Some(&Value::I64(42)));
/// assert!(value.field(3).is_none());
/// ```
#[derive(Debug, Default)]
pub struct StructBuilder {
    fields: BTreeMap<i16, Value>,
}

impl StructBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn i32(mut self, id: i16, value: i32) -> Self {
        self.fields.insert(id, Value::I32(value));
        self
    }

    pub fn i64(mut self, id: i16, value: i64) -> Self {
        self.fields.insert(id, Value::I64(value));
        self
    }

    pub fn string(mut self, id: i16, value: &str) -> Self {
        self.fields.insert(id, Value::String(value.to_string()));
        self
    }

    /// Unset optional fields are left off the wire entirely.
    pub fn opt_string(self, id: i16, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.string(id, value),
            None => self,
        }
    }

    pub fn value(mut self, id: i16, value: Value) -> Self {
        self.fields.insert(id, value);
        self
    }

    pub fn build(self) -> Value {
        Value::Struct(self.fields)
    }
}
