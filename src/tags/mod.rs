//! Tag Module
//!
//! Reserved stream 1 as a catalogue of named recording periods.
//!
//! ## Responsibilities
//! - Decode every stream-1 record into a [`Period`]
//! - Window any inventoried stream to one period
//! - Record new periods in write mode
//!
//! With the tag layer in use, data streams start at id 2.

mod period;
mod window;

pub use period::{Period, PeriodIndex};
pub use window::{TaggedStream, Window};

use std::path::Path;

use crate::block::StreamId;
use crate::config::Config;
use crate::container::Mode;
use crate::cursor::Values;
use crate::error::Result;
use crate::inventory::{Inventory, MemberKey, Schema};
use crate::value::Value;

/// Stream id of the period catalogue
pub const TAG_STREAM: StreamId = 1;

/// An inventory plus the named periods of stream 1
pub struct TagIndex {
    inventory: Inventory,
    index: PeriodIndex,
}

impl TagIndex {
    /// Open a file and read its inventory and periods
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        Self::new(Inventory::open(path, config)?)
    }

    /// Create a file with stream 0 as inventory and stream 1 as period index
    pub fn create(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        Self::new(Inventory::create(path, config)?)
    }

    /// Wrap `inventory`, reserving stream 1 first when it is being written
    pub fn new(mut inventory: Inventory) -> Result<Self> {
        let container = inventory.container_mut();
        if container.mode() == Mode::Write && !container.contains_stream(TAG_STREAM) {
            container.create_stream_with_id(TAG_STREAM as usize)?;
        }

        let mut index = PeriodIndex::new();
        if let Ok(stream) = inventory.container().stream(TAG_STREAM) {
            for record in stream.iter() {
                let period = Period::from_record(record)?;
                if let Some(old) = index.insert(period) {
                    tracing::warn!(name = %old.name, "Period redefined; keeping the later one");
                }
            }
        }

        tracing::debug!(periods = index.len(), "Loaded period index");
        Ok(Self { inventory, index })
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Record a period in stream 1
    pub fn add_period(&mut self, period: Period) -> Result<()> {
        self.inventory
            .container_mut()
            .append(TAG_STREAM, period.to_record())?;
        if let Some(old) = self.index.insert(period) {
            tracing::warn!(name = %old.name, "Period redefined; keeping the later one");
        }
        Ok(())
    }

    /// Allocate a data stream for `tag`
    pub fn add_stream(&mut self, tag: &str, schema: &Schema) -> Result<StreamId> {
        self.inventory.add_stream(tag, schema)
    }

    /// Append a `(tick, payload)` record to the stream named `tag`
    pub fn append(&mut self, tag: &str, tick: impl Into<Value>, payload: Vec<Value>) -> Result<()> {
        self.inventory.append(tag, tick, payload)
    }

    // =========================================================================
    // Period Access
    // =========================================================================

    /// The period dictionary
    pub fn index(&self) -> &PeriodIndex {
        &self.index
    }

    /// Period names
    pub fn periods(&self) -> impl Iterator<Item = &str> {
        self.index.names()
    }

    pub fn period(&self, name: &str) -> Result<&Period> {
        self.index.get(name)
    }

    // =========================================================================
    // Stream Access
    // =========================================================================

    /// The stream named `tag`, ready to be windowed
    pub fn stream(&self, tag: &str) -> Result<TaggedStream<'_>> {
        let stream = self.inventory.get(tag)?;
        Ok(TaggedStream::new(stream, &self.index))
    }

    /// The stream named `tag` restricted to `period`
    pub fn window(&self, tag: &str, period: &str) -> Result<Window<'_>> {
        self.stream(tag)?.window(period)
    }

    /// Ticks of `tag` inside `period`
    pub fn time(&self, tag: &str, period: &str) -> Result<Values<'_>> {
        Ok(self.window(tag, period)?.time())
    }

    /// Values of `key` in `tag`, windowed to `period` when one is given
    pub fn values<'k>(
        &self,
        tag: &str,
        period: Option<&str>,
        key: impl Into<MemberKey<'k>>,
    ) -> Result<Values<'_>> {
        self.stream(tag)?.get(period, key)
    }

    /// Inventory tags
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.inventory.keys()
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn into_inventory(self) -> Inventory {
        self.inventory
    }

    /// Write out buffered records (write mode)
    pub fn write(&mut self) -> Result<()> {
        self.inventory.write()
    }

    pub fn close(&mut self) -> Result<()> {
        self.inventory.close()
    }
}
