//! Stream Accumulator
//!
//! Read path: collects one stream's block payloads and decodes every record
//! that has become complete.
//!
//! A record that spans many blocks is not re-decoded after every block. Once
//! a decode attempt runs out of input with more than [`EAGER_RETRY_LIMIT`]
//! bytes pending, the next attempt waits until the pending buffer has doubled,
//! which keeps the total decode work linear in the stream length.

use std::io::Cursor;

use bytes::{Buf, BytesMut};

use crate::block::{Block, StreamId};
use crate::error::{DdffError, Result};
use crate::value::{Decoded, RecordCodec, Value};

/// Pending lengths up to this size are retried after every block
pub const EAGER_RETRY_LIMIT: usize = 1024;

/// Streaming decoder state for one stream
pub struct StreamAccumulator {
    stream_id: StreamId,
    codec: RecordCodec,
    /// Bytes of a record that continues in a later block
    pending: BytesMut,
    /// Pending length at which decoding is attempted again
    retry_at: usize,
    next_block_number: u32,
    blocks: u64,
    decode_attempts: u64,
}

impl StreamAccumulator {
    pub fn new(stream_id: StreamId, codec: RecordCodec) -> Self {
        Self {
            stream_id,
            codec,
            pending: BytesMut::new(),
            retry_at: 0,
            next_block_number: 0,
            blocks: 0,
            decode_attempts: 0,
        }
    }

    /// Append the meaningful bytes of `block` and return every record
    /// completed by them, in order.
    pub fn feed(&mut self, block: &Block) -> Result<Vec<Value>> {
        let number = block.header.block_number;
        if number != self.next_block_number {
            tracing::warn!(
                stream_id = self.stream_id,
                expected = self.next_block_number,
                found = number,
                "Block number out of sequence"
            );
        }
        self.next_block_number = number.wrapping_add(1);
        self.blocks += 1;

        self.pending.extend_from_slice(block.data());

        if self.pending.len() < self.retry_at {
            return Ok(Vec::new());
        }
        self.drain()
    }

    /// Decode every record still pending once no more blocks follow.
    ///
    /// Fails if bytes of an unfinished record remain.
    pub fn finish(&mut self) -> Result<Vec<Value>> {
        let records = self.drain()?;
        if self.pending.is_empty() {
            return Ok(records);
        }
        Err(DdffError::CorruptStream {
            stream_id: self.stream_id,
            reason: format!(
                "{} trailing bytes do not form a complete record",
                self.pending.len()
            ),
        })
    }

    /// Decode complete records from the front of `pending`
    fn drain(&mut self) -> Result<Vec<Value>> {
        let mut records = Vec::new();
        while !self.pending.is_empty() {
            self.decode_attempts += 1;
            let mut cursor = Cursor::new(&self.pending[..]);
            match self.codec.decode_from(&mut cursor) {
                Ok(Decoded::Record(value)) => {
                    let used = cursor.position() as usize;
                    self.pending.advance(used);
                    records.push(value);
                }
                // The rest of this record lives in a later block
                Ok(Decoded::Incomplete) => {
                    let pending = self.pending.len();
                    self.retry_at = if pending > EAGER_RETRY_LIMIT {
                        pending.saturating_mul(2)
                    } else {
                        0
                    };
                    return Ok(records);
                }
                Err(reason) => {
                    return Err(DdffError::CorruptStream {
                        stream_id: self.stream_id,
                        reason,
                    })
                }
            }
        }

        self.retry_at = 0;
        Ok(records)
    }

    pub fn stream_id(&self) -> StreamId {
        self.stream_id
    }

    /// Blocks fed so far
    pub fn blocks(&self) -> u64 {
        self.blocks
    }

    /// Decode attempts made so far, successful or not
    pub fn decode_attempts(&self) -> u64 {
        self.decode_attempts
    }

    /// Undecoded bytes currently held
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
