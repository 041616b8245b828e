//! Stream Module
//!
//! Per-stream state on both sides of the file.
//!
//! ## Responsibilities
//! - [`Stream`]: the owned, ordered record list of one stream id
//! - [`StreamBuffer`]: write path, slices encoded records into blocks
//! - [`StreamAccumulator`]: read path, reassembles records across blocks
//!
//! Record boundaries never need to line up with block boundaries: the
//! buffer cuts the byte stream wherever a block fills up, and the
//! accumulator keeps undecoded bytes until the next block arrives.

mod accumulator;
mod buffer;

pub use accumulator::StreamAccumulator;
pub use buffer::{EmittedBlock, StreamBuffer};

use std::slice;

use crate::block::StreamId;
use crate::value::Value;

/// An ordered sequence of records belonging to one stream id
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    id: StreamId,
    records: Vec<Value>,
}

impl Stream {
    pub fn new(id: StreamId) -> Self {
        Self {
            id,
            records: Vec::new(),
        }
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[Value] {
        &self.records
    }

    pub fn iter(&self) -> slice::Iter<'_, Value> {
        self.records.iter()
    }

    pub(crate) fn push(&mut self, record: Value) {
        self.records.push(record);
    }

    pub(crate) fn extend(&mut self, records: impl IntoIterator<Item = Value>) {
        self.records.extend(records);
    }
}

impl<'a> IntoIterator for &'a Stream {
    type Item = &'a Value;
    type IntoIter = slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
