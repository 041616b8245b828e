//! Inventoried stream views

use crate::block::StreamId;
use crate::cursor::{Projection, Values};
use crate::error::{DdffError, Result};
use crate::value::Value;

use super::{InventoryEntry, Schema};

/// Selects what to read from each record of an inventoried stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKey<'k> {
    /// A declared member, by name
    Name(&'k str),
    /// A declared member, by position
    Index(usize),
    /// The whole payload
    Payload,
}

impl<'k> From<&'k str> for MemberKey<'k> {
    fn from(name: &'k str) -> Self {
        MemberKey::Name(name)
    }
}

impl<'k> From<&'k String> for MemberKey<'k> {
    fn from(name: &'k String) -> Self {
        MemberKey::Name(name)
    }
}

impl From<usize> for MemberKey<'_> {
    fn from(index: usize) -> Self {
        MemberKey::Index(index)
    }
}

impl<'k> From<Option<&'k str>> for MemberKey<'k> {
    fn from(name: Option<&'k str>) -> Self {
        name.map_or(MemberKey::Payload, MemberKey::Name)
    }
}

/// A stream seen through its inventory entry.
///
/// Borrows the container's records; every accessor returns a fresh cursor,
/// so the same view can be iterated any number of times.
#[derive(Debug, Clone, Copy)]
pub struct InventoriedStream<'a> {
    entry: &'a InventoryEntry,
    records: &'a [Value],
}

impl<'a> InventoriedStream<'a> {
    pub(crate) fn new(entry: &'a InventoryEntry, records: &'a [Value]) -> Self {
        Self { entry, records }
    }

    pub fn tag(&self) -> &'a str {
        &self.entry.tag
    }

    pub fn stream_id(&self) -> StreamId {
        self.entry.stream_id
    }

    pub fn class(&self) -> &'a str {
        &self.entry.schema.class
    }

    pub fn schema(&self) -> &'a Schema {
        &self.entry.schema
    }

    pub fn entry(&self) -> &'a InventoryEntry {
        self.entry
    }

    /// The raw records of the underlying stream
    pub fn records(&self) -> &'a [Value] {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Tick of every record
    pub fn time(&self) -> Values<'a> {
        Values::new(self.records, 0, Projection::Tick)
    }

    /// One member of every record's payload, or the whole payload
    pub fn member<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<Values<'a>> {
        let projection = self.resolve(key.into())?;
        Ok(Values::new(self.records, 0, projection))
    }

    /// Whole payload of every record
    pub fn payloads(&self) -> Values<'a> {
        Values::new(self.records, 0, Projection::Payload)
    }

    /// Map a member key onto a record projection
    pub fn resolve(&self, key: MemberKey<'_>) -> Result<Projection> {
        match key {
            MemberKey::Payload => Ok(Projection::Payload),
            MemberKey::Name(name) => self
                .entry
                .member_index(name)
                .map(Projection::Member)
                .ok_or_else(|| DdffError::not_found("member", format!("{}.{}", self.tag(), name))),
            MemberKey::Index(index) if index < self.entry.schema.members.len() => {
                Ok(Projection::Member(index))
            }
            MemberKey::Index(index) => Err(DdffError::not_found(
                "member",
                format!("{}[{}]", self.tag(), index),
            )),
        }
    }
}
