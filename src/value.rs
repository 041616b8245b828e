//! Record values and the streaming record codec
//!
//! Every record in a stream is one [`Value`]. Data records are conventionally
//! `Array([tick, Array(payload...)])`; the reserved streams use fixed tuple
//! shapes (see [`crate::inventory`] and [`crate::tags`]).
//!
//! ## Encoding
//! Records are encoded with bincode using fixed-width big-endian integers.
//! The encoding is self-delimiting, so records can be concatenated freely and
//! split across block boundaries.

use std::collections::BTreeMap;
use std::io::{self, Read};

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::error::{DdffError, Result};

/// One decoded record, or a component of one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Array(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

/// Shared `Nil` for projections that find nothing
pub(crate) static NIL: Value = Value::Nil;

impl Value {
    /// Build a `(tick, payload)` data record
    pub fn record(tick: impl Into<Value>, payload: Vec<Value>) -> Self {
        Value::Array(vec![tick.into(), Value::Array(payload)])
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            Value::UInt(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Numeric view used for tick comparisons
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::UInt(v) => Some(v as f64),
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Element `index` of an array value
    pub fn element(&self, index: usize) -> Option<&Value> {
        self.as_array().and_then(|items| items.get(index))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

// =============================================================================
// Record Codec
// =============================================================================

/// Outcome of one attempt to pull a record from a byte source
#[derive(Debug)]
pub enum Decoded {
    /// A complete record
    Record(Value),
    /// The input ends in the middle of a record
    Incomplete,
}

/// Encodes and decodes records with a bounded record size
#[derive(Debug, Clone, Copy)]
pub struct RecordCodec {
    max_record_size: u64,
}

impl RecordCodec {
    pub fn new(max_record_size: u64) -> Self {
        Self { max_record_size }
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .with_big_endian()
            .with_limit(self.max_record_size)
            .allow_trailing_bytes()
    }

    /// Serialize one record
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        self.options()
            .serialize(value)
            .map_err(|e| DdffError::Serialization(e.to_string()))
    }

    /// Decode one record from `reader`.
    ///
    /// Running out of input is reported as [`Decoded::Incomplete`]; any other
    /// failure is returned as the bincode error message.
    pub fn decode_from<R: Read>(&self, reader: R) -> std::result::Result<Decoded, String> {
        match self.options().deserialize_from::<_, Value>(reader) {
            Ok(value) => Ok(Decoded::Record(value)),
            Err(err) => match *err {
                bincode::ErrorKind::Io(ref io_err)
                    if io_err.kind() == io::ErrorKind::UnexpectedEof =>
                {
                    Ok(Decoded::Incomplete)
                }
                other => Err(other.to_string()),
            },
        }
    }
}
