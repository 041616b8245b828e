//! Block Module
//!
//! Fixed-size framed units that make up a DDFF file.
//!
//! ## Responsibilities
//! - Encode one block: header fields, payload, zero padding
//! - Decode one block and verify its CRC-16
//! - Report truncation separately for the header and the payload
//!
//! ## Block Format (all integers big-endian)
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ Header (28 bytes)                                            │
//! │ ┌──────────┬─────────┬──────────┬──────────┬──────────┐      │
//! │ │ Next (8) │ CRC (2) │Stream (2)│ Size (4) │ Fill (4) │      │
//! │ └──────────┴─────────┴──────────┴──────────┴──────────┘      │
//! │ ┌──────────────────┬──────────────┐                          │
//! │ │ FirstObject (4)  │ BlockNo (4)  │                          │
//! │ └──────────────────┴──────────────┘                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │ Payload (size - 28 bytes)                                    │
//! │   fill - 28 meaningful bytes, then zero padding              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CRC covers every byte from offset 10 to the end of the block.
//! `next` is the file offset of the next block of the same stream, or -1.

mod checksum;
mod frame;

pub use checksum::crc16;
pub use frame::{Block, BlockHeader};

/// Stream identifier as stored in block headers
pub type StreamId = u16;

/// Header size: Next (8) + CRC (2) + Stream (2) + Size (4) + Fill (4)
/// + FirstObject (4) + BlockNo (4) = 28 bytes
pub const HEADER_SIZE: usize = 28;

/// Offset of the first byte covered by the CRC
pub(crate) const CRC_START: usize = 10;

/// `next_offset` value for the last block of a run
pub const NO_NEXT_BLOCK: i64 = -1;
