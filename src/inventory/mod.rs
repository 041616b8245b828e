//! Inventory Module
//!
//! Reserved stream 0 as a catalogue of every other stream.
//!
//! ## Record Format
//! Each record of stream 0 is `Array([tag: Str, stream_id: Int, description: Str])`
//! where `description` is the JSON [`Schema`] of the stream.
//!
//! ## Responsibilities
//! - Parse the catalogue when a container is wrapped
//! - Resolve tags and member names to streams and payload positions
//! - Register new streams in write mode

mod schema;
mod view;

pub use schema::{Member, Schema};
pub use view::{InventoriedStream, MemberKey};

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::block::StreamId;
use crate::config::Config;
use crate::container::{Container, Mode};
use crate::cursor::Values;
use crate::error::{DdffError, Result};
use crate::value::Value;

/// Stream id of the inventory catalogue
pub const INVENTORY_STREAM: StreamId = 0;

/// One catalogue entry: a named stream and its schema
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryEntry {
    pub tag: String,
    pub stream_id: StreamId,
    /// The JSON description exactly as stored
    pub description: String,
    pub schema: Schema,
    members: HashMap<String, usize>,
}

impl InventoryEntry {
    pub fn new(tag: impl Into<String>, stream_id: StreamId, description: impl Into<String>) -> Result<Self> {
        let description = description.into();
        let schema = Schema::from_json(&description)?;
        let members = schema
            .members
            .iter()
            .enumerate()
            .map(|(i, m)| (m.name.clone(), i))
            .collect();
        Ok(Self {
            tag: tag.into(),
            stream_id,
            description,
            schema,
            members,
        })
    }

    /// Decode one stream-0 record
    pub fn from_record(record: &Value) -> Result<Self> {
        let malformed = || DdffError::Schema(format!("malformed inventory record: {}", record));

        let fields = record.as_array().ok_or_else(malformed)?;
        if fields.len() < 3 {
            return Err(malformed());
        }
        let tag = fields[0].as_str().ok_or_else(malformed)?;
        let stream_id = fields[1]
            .as_i64()
            .and_then(|id| StreamId::try_from(id).ok())
            .ok_or_else(malformed)?;
        let description = fields[2].as_str().ok_or_else(malformed)?;

        Self::new(tag, stream_id, description)
    }

    /// Encode as a stream-0 record
    pub fn to_record(&self) -> Value {
        Value::Array(vec![
            Value::from(self.tag.as_str()),
            Value::Int(self.stream_id as i64),
            Value::from(self.description.as_str()),
        ])
    }

    pub fn member_index(&self, name: &str) -> Option<usize> {
        self.members.get(name).copied()
    }
}

/// A container whose streams are named and typed by the stream-0 catalogue
pub struct Inventory {
    container: Container,
    entries: BTreeMap<String, InventoryEntry>,
    by_id: BTreeMap<StreamId, String>,
}

impl Inventory {
    /// Open a file and read its catalogue
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        Self::new(Container::open(path, config)?)
    }

    /// Create a file whose stream 0 is the catalogue
    pub fn create(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        Self::new(Container::create(path, config)?)
    }

    /// Wrap `container`, reserving stream 0 first when it is being written
    pub fn new(mut container: Container) -> Result<Self> {
        if container.mode() == Mode::Write && !container.contains_stream(INVENTORY_STREAM) {
            container.create_stream_with_id(INVENTORY_STREAM as usize)?;
        }

        let mut entries = BTreeMap::new();
        let mut by_id = BTreeMap::new();

        if let Ok(stream) = container.stream(INVENTORY_STREAM) {
            for record in stream.iter() {
                let entry = InventoryEntry::from_record(record)?;
                if !container.contains_stream(entry.stream_id) {
                    tracing::warn!(
                        tag = %entry.tag,
                        stream_id = entry.stream_id,
                        "Inventory entry refers to a stream with no blocks"
                    );
                }
                by_id.insert(entry.stream_id, entry.tag.clone());
                entries.insert(entry.tag.clone(), entry);
            }
        }

        tracing::debug!(entries = entries.len(), "Loaded inventory");
        Ok(Self {
            container,
            entries,
            by_id,
        })
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Allocate a stream for `tag` and record it in the catalogue
    pub fn add_stream(&mut self, tag: &str, schema: &Schema) -> Result<StreamId> {
        if self.entries.contains_key(tag) {
            return Err(DdffError::Schema(format!("duplicate inventory tag: {}", tag)));
        }
        schema.validate()?;

        let id = self.container.create_stream()?;
        let entry = InventoryEntry::new(tag, id, schema.to_json()?)?;
        self.container.append(INVENTORY_STREAM, entry.to_record())?;

        self.by_id.insert(id, entry.tag.clone());
        self.entries.insert(entry.tag.clone(), entry);
        Ok(id)
    }

    /// Append a `(tick, payload)` record to the stream named `tag`
    pub fn append(&mut self, tag: &str, tick: impl Into<Value>, payload: Vec<Value>) -> Result<()> {
        let id = self.entry(tag)?.stream_id;
        self.container.append(id, Value::record(tick, payload))
    }

    // =========================================================================
    // Catalogue Access
    // =========================================================================

    /// All inventory tags
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// The catalogue, keyed by tag
    pub fn inventory(&self) -> &BTreeMap<String, InventoryEntry> {
        &self.entries
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, tag: &str) -> Result<&InventoryEntry> {
        self.entries
            .get(tag)
            .ok_or_else(|| DdffError::not_found("stream", tag))
    }

    /// The stream named `tag`
    pub fn get(&self, tag: &str) -> Result<InventoriedStream<'_>> {
        let entry = self.entry(tag)?;
        Ok(self.view(entry))
    }

    /// The inventoried stream with raw id `id`
    pub fn get_by_id(&self, id: StreamId) -> Result<InventoriedStream<'_>> {
        let tag = self
            .by_id
            .get(&id)
            .ok_or_else(|| DdffError::not_found("stream id", id))?;
        self.get(tag)
    }

    /// One member (or the whole payload) of every record of `tag`
    pub fn member<'k>(&self, tag: &str, key: impl Into<MemberKey<'k>>) -> Result<Values<'_>> {
        self.get(tag)?.member(key)
    }

    /// Ticks of every record of `tag`
    pub fn time(&self, tag: &str) -> Result<Values<'_>> {
        Ok(self.get(tag)?.time())
    }

    fn view<'a>(&'a self, entry: &'a InventoryEntry) -> InventoriedStream<'a> {
        // A catalogued stream that never received a block reads as empty
        let records = self
            .container
            .streams()
            .get(&entry.stream_id)
            .map(|s| s.records())
            .unwrap_or(&[]);
        InventoriedStream::new(entry, records)
    }

    // =========================================================================
    // Container Access
    // =========================================================================

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    pub fn into_container(self) -> Container {
        self.container
    }

    /// Write out buffered records (write mode)
    pub fn write(&mut self) -> Result<()> {
        self.container.write()
    }

    pub fn close(&mut self) -> Result<()> {
        self.container.close()
    }
}
