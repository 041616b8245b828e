//! Stream Buffer
//!
//! Write path: buffers encoded records for one stream and cuts them into
//! blocks once enough bytes have accumulated.

use std::collections::VecDeque;

use bytes::BytesMut;

use crate::block::{Block, StreamId, HEADER_SIZE};
use crate::error::{DdffError, Result};
use crate::value::{RecordCodec, Value};

/// One encoded block ready to be written at `offset`
#[derive(Debug, Clone)]
pub struct EmittedBlock {
    pub offset: u64,
    pub block_number: u32,
    /// Meaningful bytes, header included
    pub fill: u32,
    pub bytes: Vec<u8>,
}

/// Append-only byte buffer for one stream
pub struct StreamBuffer {
    stream_id: StreamId,
    block_size: u32,
    codec: RecordCodec,
    /// Encoded bytes not yet emitted
    pending: BytesMut,
    /// Block offset of the first record starting in each pending block,
    /// front = next block to emit, 0 = no record starts there
    first_objects: VecDeque<u32>,
    /// Number of the next block to emit
    block_number: u32,
    records: u64,
}

impl StreamBuffer {
    /// Fails with `Config` if `block_size` leaves no room for payload
    pub fn new(stream_id: StreamId, block_size: u32, codec: RecordCodec) -> Result<Self> {
        if (block_size as usize) <= HEADER_SIZE {
            return Err(DdffError::Config(format!(
                "block size {} must exceed the {}-byte header",
                block_size, HEADER_SIZE
            )));
        }
        Ok(Self {
            stream_id,
            block_size,
            codec,
            pending: BytesMut::new(),
            first_objects: VecDeque::new(),
            block_number: 0,
            records: 0,
        })
    }

    fn capacity(&self) -> usize {
        self.block_size as usize - HEADER_SIZE
    }

    /// Encode `record` and append its bytes
    pub fn append(&mut self, record: &Value) -> Result<()> {
        let bytes = self.codec.encode(record)?;

        let capacity = self.capacity();
        let position = self.pending.len();
        let block = position / capacity;
        while self.first_objects.len() <= block {
            self.first_objects.push_back(0);
        }
        if self.first_objects[block] == 0 {
            self.first_objects[block] = (HEADER_SIZE + position % capacity) as u32;
        }

        self.pending.extend_from_slice(&bytes);
        self.records += 1;
        Ok(())
    }

    /// Emit blocks starting at file offset `offset`, advancing it per block.
    ///
    /// Without `last`, only blocks that can be completely filled are emitted
    /// and the remainder stays buffered. With `last`, every buffered byte is
    /// emitted and the final block is zero-padded.
    pub fn flush(&mut self, last: bool, offset: &mut u64) -> Result<Vec<EmittedBlock>> {
        let capacity = self.capacity();
        let mut emitted = Vec::new();

        loop {
            let take = if self.pending.len() > capacity {
                capacity
            } else if last && !self.pending.is_empty() {
                self.pending.len()
            } else {
                break;
            };

            let chunk = self.pending.split_to(take);
            let has_next = !self.pending.is_empty();
            let first_object = self.first_objects.pop_front().unwrap_or(0);

            let bytes = Block::encode(
                self.stream_id,
                self.block_size,
                &chunk,
                self.block_number,
                first_object,
                *offset,
                has_next,
            )?;

            emitted.push(EmittedBlock {
                offset: *offset,
                block_number: self.block_number,
                fill: (HEADER_SIZE + chunk.len()) as u32,
                bytes,
            });

            *offset += self.block_size as u64;
            self.block_number += 1;
        }

        if last {
            self.first_objects.clear();
        }
        Ok(emitted)
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    /// Bytes waiting to be emitted
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Blocks emitted so far
    pub fn blocks_emitted(&self) -> u32 {
        self.block_number
    }

    /// Records appended so far
    pub fn record_count(&self) -> u64 {
        self.records
    }
}
