//! Block framing
//!
//! Encoding and decoding of single blocks.

use std::io::{self, Read};

use crate::error::{DdffError, Result};

use super::checksum::block_crc;
use super::{StreamId, CRC_START, HEADER_SIZE, NO_NEXT_BLOCK};

/// The fixed 28-byte header at the start of every block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// File offset of the next block of the same stream, or -1
    pub next_offset: i64,
    /// CRC-16 over bytes 10..end of the block
    pub crc: u16,
    pub stream_id: StreamId,
    /// Total block length, header included
    pub block_size: u32,
    /// Meaningful bytes in the block, header included
    pub fill: u32,
    /// Block offset of the first record starting here, 0 if none
    pub first_object_offset: u32,
    /// 0-based position of the block within its stream
    pub block_number: u32,
}

impl BlockHeader {
    /// Serialize the header (big-endian)
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut buf = [0u8; HEADER_SIZE];
        buf[0..8].copy_from_slice(&self.next_offset.to_be_bytes());
        buf[8..10].copy_from_slice(&self.crc.to_be_bytes());
        buf[10..12].copy_from_slice(&self.stream_id.to_be_bytes());
        buf[12..16].copy_from_slice(&self.block_size.to_be_bytes());
        buf[16..20].copy_from_slice(&self.fill.to_be_bytes());
        buf[20..24].copy_from_slice(&self.first_object_offset.to_be_bytes());
        buf[24..28].copy_from_slice(&self.block_number.to_be_bytes());
        buf
    }

    /// Parse a header from its 28 raw bytes
    pub fn from_bytes(buf: &[u8; HEADER_SIZE]) -> Self {
        let mut next = [0u8; 8];
        next.copy_from_slice(&buf[0..8]);
        Self {
            next_offset: i64::from_be_bytes(next),
            crc: u16::from_be_bytes([buf[8], buf[9]]),
            stream_id: u16::from_be_bytes([buf[10], buf[11]]),
            block_size: u32::from_be_bytes([buf[12], buf[13], buf[14], buf[15]]),
            fill: u32::from_be_bytes([buf[16], buf[17], buf[18], buf[19]]),
            first_object_offset: u32::from_be_bytes([buf[20], buf[21], buf[22], buf[23]]),
            block_number: u32::from_be_bytes([buf[24], buf[25], buf[26], buf[27]]),
        }
    }

    /// Read the next header from `reader`.
    ///
    /// Returns:
    /// - `Ok(Some(header))`: a complete header was read
    /// - `Ok(None)`: the reader was already at end of file
    /// - `Err(TruncatedFile)`: between 1 and 27 bytes remained
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let mut buf = [0u8; HEADER_SIZE];
        let n = read_full(reader, &mut buf)?;

        if n == 0 {
            return Ok(None);
        }
        if n < HEADER_SIZE {
            return Err(DdffError::TruncatedFile {
                expected: HEADER_SIZE as u64,
                found: n as u64,
            });
        }

        Ok(Some(Self::from_bytes(&buf)))
    }

    /// Payload bytes following the header, padding included
    pub fn payload_len(&self) -> usize {
        (self.block_size as usize).saturating_sub(HEADER_SIZE)
    }

    /// Meaningful payload bytes (excludes padding)
    pub fn data_len(&self) -> usize {
        (self.fill as usize).saturating_sub(HEADER_SIZE)
    }

    pub fn has_next(&self) -> bool {
        self.next_offset != NO_NEXT_BLOCK
    }
}

/// A decoded block: header plus its full payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub header: BlockHeader,
    pub payload: Vec<u8>,
}

impl Block {
    /// Encode one block of exactly `block_size` bytes.
    ///
    /// `offset` is the file offset the block will be written at; when
    /// `has_next` is set the block points at the offset right after itself.
    /// Short payloads are zero-padded and `fill` records the unpadded length.
    #[allow(clippy::too_many_arguments)]
    pub fn encode(
        stream_id: StreamId,
        block_size: u32,
        payload: &[u8],
        block_number: u32,
        first_object_offset: u32,
        offset: u64,
        has_next: bool,
    ) -> Result<Vec<u8>> {
        let capacity = (block_size as usize).saturating_sub(HEADER_SIZE);
        if capacity == 0 || payload.len() > capacity {
            return Err(DdffError::Serialization(format!(
                "payload of {} bytes does not fit a {}-byte block",
                payload.len(),
                block_size
            )));
        }

        let next_offset = if has_next {
            (offset + block_size as u64) as i64
        } else {
            NO_NEXT_BLOCK
        };

        let mut header = BlockHeader {
            next_offset,
            crc: 0,
            stream_id,
            block_size,
            fill: (HEADER_SIZE + payload.len()) as u32,
            first_object_offset,
            block_number,
        };

        let mut padded = Vec::with_capacity(capacity);
        padded.extend_from_slice(payload);
        padded.resize(capacity, 0);

        let header_bytes = header.to_bytes();
        header.crc = block_crc(&header_bytes[CRC_START..], &padded);

        let mut out = Vec::with_capacity(block_size as usize);
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&padded);
        Ok(out)
    }

    /// Decode one complete block from `reader`.
    ///
    /// Fails with `TruncatedFile` when either the header or the payload is
    /// short, and with `CorruptBlock` on a CRC mismatch.
    pub fn decode<R: Read>(reader: &mut R) -> Result<Self> {
        Self::decode_at(reader, 0)
    }

    /// Like [`Block::decode`], reporting `offset` in corruption errors
    pub fn decode_at<R: Read>(reader: &mut R, offset: u64) -> Result<Self> {
        match BlockHeader::read_from(reader)? {
            Some(header) => Self::read_payload(header, reader, offset),
            None => Err(DdffError::TruncatedFile {
                expected: HEADER_SIZE as u64,
                found: 0,
            }),
        }
    }

    /// Read the payload belonging to `header` and verify the block
    pub fn read_payload<R: Read>(header: BlockHeader, reader: &mut R, offset: u64) -> Result<Self> {
        if (header.block_size as usize) <= HEADER_SIZE {
            return Err(DdffError::CorruptBlock {
                offset,
                reason: format!("block size {} too small", header.block_size),
            });
        }

        let expected = header.payload_len();
        let mut payload = Vec::new();
        reader.by_ref().take(expected as u64).read_to_end(&mut payload)?;
        if payload.len() < expected {
            return Err(DdffError::TruncatedFile {
                expected: expected as u64,
                found: payload.len() as u64,
            });
        }

        let block = Self { header, payload };
        block.verify(offset)?;
        Ok(block)
    }

    /// Recompute the CRC and check the fill bounds
    pub fn verify(&self, offset: u64) -> Result<()> {
        let header_bytes = self.header.to_bytes();
        let actual = block_crc(&header_bytes[CRC_START..], &self.payload);
        if actual != self.header.crc {
            return Err(DdffError::CorruptBlock {
                offset,
                reason: format!(
                    "CRC mismatch: stored 0x{:04x}, computed 0x{:04x}",
                    self.header.crc, actual
                ),
            });
        }

        let fill = self.header.fill as usize;
        if fill < HEADER_SIZE || fill > self.header.block_size as usize {
            return Err(DdffError::CorruptBlock {
                offset,
                reason: format!("fill {} outside block of {} bytes", fill, self.header.block_size),
            });
        }
        Ok(())
    }

    pub fn stream_id(&self) -> StreamId {
        self.header.stream_id
    }

    /// The meaningful payload bytes, never the padding
    pub fn data(&self) -> &[u8] {
        &self.payload[..self.header.data_len()]
    }
}

/// Read until `buf` is full or the reader is exhausted
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
