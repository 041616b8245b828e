//! Named recording periods

use std::collections::BTreeMap;

use crate::error::{DdffError, Result};
use crate::value::Value;

/// A named, tick-bounded part of a recording.
///
/// Stored in stream 1 as
/// `Array([offset, cycle, index0, index1, time, name, inco])`.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub offset: Vec<Value>,
    pub cycle: i64,
    /// First tick inside the period
    pub index0: i64,
    /// Last tick inside the period
    pub index1: i64,
    /// Wall-clock description of when the period was recorded
    pub time: String,
    pub name: String,
    pub inco: String,
}

impl Period {
    /// A period covering ticks `index0..=index1`, other fields empty
    pub fn new(name: impl Into<String>, index0: i64, index1: i64) -> Self {
        Self {
            offset: Vec::new(),
            cycle: 0,
            index0,
            index1,
            time: String::new(),
            name: name.into(),
            inco: String::new(),
        }
    }

    /// Decode one stream-1 record
    pub fn from_record(record: &Value) -> Result<Self> {
        let malformed = || DdffError::Schema(format!("malformed period record: {}", record));

        let fields = record.as_array().ok_or_else(malformed)?;
        if fields.len() < 7 {
            return Err(malformed());
        }

        let offset = match &fields[0] {
            Value::Array(items) => items.clone(),
            Value::Nil => Vec::new(),
            other => vec![other.clone()],
        };
        let text = |v: &Value| -> Option<String> {
            match v {
                Value::Str(s) => Some(s.clone()),
                Value::Nil => Some(String::new()),
                _ => None,
            }
        };

        Ok(Self {
            offset,
            cycle: fields[1].as_i64().ok_or_else(malformed)?,
            index0: fields[2].as_i64().ok_or_else(malformed)?,
            index1: fields[3].as_i64().ok_or_else(malformed)?,
            time: text(&fields[4]).ok_or_else(malformed)?,
            name: fields[5].as_str().ok_or_else(malformed)?.to_string(),
            inco: text(&fields[6]).ok_or_else(malformed)?,
        })
    }

    /// Encode as a stream-1 record
    pub fn to_record(&self) -> Value {
        Value::Array(vec![
            Value::Array(self.offset.clone()),
            Value::Int(self.cycle),
            Value::Int(self.index0),
            Value::Int(self.index1),
            Value::from(self.time.as_str()),
            Value::from(self.name.as_str()),
            Value::from(self.inco.as_str()),
        ])
    }

    /// Whether `tick` falls within `[index0, index1]`
    pub fn contains(&self, tick: f64) -> bool {
        tick >= self.index0 as f64 && tick <= self.index1 as f64
    }
}

/// Periods keyed by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodIndex {
    periods: BTreeMap<String, Period>,
}

impl PeriodIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `period`, returning the one it replaced under the same name
    pub fn insert(&mut self, period: Period) -> Option<Period> {
        self.periods.insert(period.name.clone(), period)
    }

    pub fn get(&self, name: &str) -> Result<&Period> {
        self.periods
            .get(name)
            .ok_or_else(|| DdffError::not_found("period", name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.periods.contains_key(name)
    }

    /// Number of periods
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.periods.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Period> {
        self.periods.values()
    }
}
