//! Container Module
//!
//! A DDFF file: a mapping from stream id to [`Stream`], persisted as blocks.
//!
//! ## Lifecycle
//! ```text
//!   open()   ──▶ Scanning ──▶ Ready ──▶ close() ──▶ Closed
//!   create() ───────────────▶ Ready ──▶ close() ──▶ Closed
//! ```
//!
//! - **Read mode** scans every block in file order when opened and groups
//!   them by `stream_id`. The `next_offset` chain is not followed.
//! - **Write mode** keeps a [`StreamBuffer`] per stream. `write()` emits
//!   each stream completely, in ascending id order, so streams are never
//!   interleaved on disk.

mod reader;
mod writer;

pub use reader::{scan_blocks, BlockLocation};

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::block::StreamId;
use crate::config::Config;
use crate::error::{DdffError, Result};
use crate::stream::{Stream, StreamAccumulator, StreamBuffer};
use crate::value::{RecordCodec, Value};

/// Whether the container was opened for reading or created for writing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Write,
}

/// Container state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    /// Reading blocks during open
    Scanning,
    /// All streams available
    Ready,
    /// File handle and decoded state released
    Closed,
}

/// The open file handle owned by a container
enum FileHandle {
    /// Held for the container lifetime; the scan has already consumed it
    #[allow(dead_code)]
    Reader(File),
    Writer(BufWriter<File>),
}

/// A DDFF file and all of its streams
pub struct Container {
    path: Option<PathBuf>,
    config: Config,
    mode: Mode,
    state: ContainerState,
    file: Option<FileHandle>,

    /// Every stream, keyed by id
    streams: BTreeMap<StreamId, Stream>,

    /// Read mode: one streaming decoder per stream
    accumulators: BTreeMap<StreamId, StreamAccumulator>,

    /// Write mode: one block buffer per stream
    buffers: BTreeMap<StreamId, StreamBuffer>,

    /// Write mode: file offset of the next block
    write_offset: u64,

    /// Write mode: records appended since the last write-out
    dirty: bool,

    span: tracing::Span,
}

impl Container {
    fn new(path: Option<PathBuf>, config: Config, mode: Mode, state: ContainerState) -> Self {
        let span = match &path {
            Some(p) => tracing::info_span!("ddff", path = %p.display()),
            None => tracing::info_span!("ddff", path = "<reader>"),
        };
        Self {
            path,
            config,
            mode,
            state,
            file: None,
            streams: BTreeMap::new(),
            accumulators: BTreeMap::new(),
            buffers: BTreeMap::new(),
            write_offset: 0,
            dirty: false,
            span,
        }
    }

    /// Open an existing file and materialize all of its streams.
    ///
    /// Fails with `CorruptBlock` or `CorruptStream` if any part of the file
    /// is damaged; no partially read container is ever returned.
    pub fn open(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let file = File::open(path)?;

        let mut container = Self::new(
            Some(path.to_path_buf()),
            config,
            Mode::Read,
            ContainerState::Scanning,
        );
        let file = container.scan_file(file)?;
        container.file = Some(FileHandle::Reader(file));
        container.state = ContainerState::Ready;
        Ok(container)
    }

    /// Materialize streams from any byte source (no file handle is kept)
    pub fn from_reader<R: std::io::Read>(mut reader: R, config: Config) -> Result<Self> {
        config.validate()?;
        let mut container = Self::new(None, config, Mode::Read, ContainerState::Scanning);
        container.scan(&mut reader)?;
        container.state = ContainerState::Ready;
        Ok(container)
    }

    /// Create (or truncate) a file for writing, with no streams
    pub fn create(path: impl AsRef<Path>, config: Config) -> Result<Self> {
        config.validate()?;
        let path = path.as_ref();
        let file = File::create(path)?;

        let mut container = Self::new(
            Some(path.to_path_buf()),
            config,
            Mode::Write,
            ContainerState::Ready,
        );
        container.file = Some(FileHandle::Writer(BufWriter::new(file)));

        let block_size = container.config.block_size;
        container
            .span
            .in_scope(|| tracing::debug!(block_size, "Created container"));

        Ok(container)
    }

    // =========================================================================
    // Stream Allocation (write mode)
    // =========================================================================

    /// Allocate the next stream id, which is always `len(streams)`
    pub fn create_stream(&mut self) -> Result<StreamId> {
        let next = self.streams.len();
        self.create_stream_with_id(next)
    }

    /// Allocate a specific stream id; it must be the next contiguous id
    pub fn create_stream_with_id(&mut self, id: usize) -> Result<StreamId> {
        self.ensure_writable()?;

        let next = self.streams.len();
        if id != next || id > StreamId::MAX as usize || self.streams.contains_key(&(id as StreamId)) {
            return Err(DdffError::NonContiguousStreamId {
                requested: id,
                next,
            });
        }

        let id = id as StreamId;
        let buffer = StreamBuffer::new(id, self.config.block_size, self.codec())?;
        self.streams.insert(id, Stream::new(id));
        self.buffers.insert(id, buffer);

        let _enter = self.span.enter();
        tracing::debug!(stream_id = id, "Created stream");
        Ok(id)
    }

    /// Append one record to stream `id`
    pub fn append(&mut self, id: StreamId, record: Value) -> Result<()> {
        self.ensure_writable()?;

        let buffer = self
            .buffers
            .get_mut(&id)
            .ok_or_else(|| DdffError::not_found("stream id", id))?;
        buffer.append(&record)?;

        if let Some(stream) = self.streams.get_mut(&id) {
            stream.push(record);
        }
        self.dirty = true;
        Ok(())
    }

    /// Write out pending data (write mode), then release the file handle
    /// and all decoded state. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.state == ContainerState::Closed {
            return Ok(());
        }
        if self.mode == Mode::Write {
            self.write()?;
        }

        self.file = None;
        self.streams.clear();
        self.accumulators.clear();
        self.buffers.clear();
        self.state = ContainerState::Closed;

        let _enter = self.span.enter();
        tracing::debug!("Closed container");
        Ok(())
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get stream `id`
    pub fn stream(&self, id: StreamId) -> Result<&Stream> {
        self.ensure_open()?;
        self.streams
            .get(&id)
            .ok_or_else(|| DdffError::not_found("stream id", id))
    }

    /// All streams, keyed by id
    pub fn streams(&self) -> &BTreeMap<StreamId, Stream> {
        &self.streams
    }

    pub fn stream_ids(&self) -> impl Iterator<Item = StreamId> + '_ {
        self.streams.keys().copied()
    }

    pub fn contains_stream(&self, id: StreamId) -> bool {
        self.streams.contains_key(&id)
    }

    /// Number of streams
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> ContainerState {
        self.state
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    fn codec(&self) -> RecordCodec {
        RecordCodec::new(self.config.max_record_size)
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state {
            ContainerState::Closed => Err(DdffError::Closed),
            _ => Ok(()),
        }
    }

    fn ensure_writable(&self) -> Result<()> {
        self.ensure_open()?;
        match self.mode {
            Mode::Write => Ok(()),
            Mode::Read => Err(DdffError::ReadOnly),
        }
    }
}

impl Drop for Container {
    fn drop(&mut self) {
        if self.mode == Mode::Write && self.dirty && self.state != ContainerState::Closed {
            let _enter = self.span.enter();
            tracing::warn!("Container dropped with records that were never written");
        }
    }
}
