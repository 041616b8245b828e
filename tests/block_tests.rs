//! Tests for the block codec
//!
//! These tests verify:
//! - CRC-16/CCITT-FALSE reference value
//! - Header layout and big-endian field encoding
//! - Padding, fill and next-offset rules
//! - CRC and truncation failures on decode

use std::io::Cursor;

use ddff::block::{crc16, Block, BlockHeader, HEADER_SIZE, NO_NEXT_BLOCK};
use ddff::DdffError;

// =============================================================================
// Helper Functions
// =============================================================================

fn encode_sample(has_next: bool) -> Vec<u8> {
    Block::encode(3, 128, &[1, 2, 3], 7, 28, 256, has_next).unwrap()
}

// =============================================================================
// Checksum Tests
// =============================================================================

#[test]
fn test_crc16_reference_vector() {
    assert_eq!(crc16(b"123456789"), 0x29B1);
}

#[test]
fn test_crc16_empty_input_is_init_value() {
    assert_eq!(crc16(b""), 0xFFFF);
}

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_produces_exact_block_size() {
    let bytes = encode_sample(true);
    assert_eq!(bytes.len(), 128);
}

#[test]
fn test_encode_header_layout_is_big_endian() {
    let bytes = encode_sample(true);

    // next_offset: block written at 256 points right after itself
    assert_eq!(&bytes[0..8], &384i64.to_be_bytes());
    assert_eq!(&bytes[10..12], &[0, 3]);
    assert_eq!(&bytes[12..16], &128u32.to_be_bytes());
    assert_eq!(&bytes[16..20], &31u32.to_be_bytes());
    assert_eq!(&bytes[20..24], &28u32.to_be_bytes());
    assert_eq!(&bytes[24..28], &7u32.to_be_bytes());
    assert_eq!(&bytes[28..31], &[1, 2, 3]);
}

#[test]
fn test_encode_pads_with_zeros() {
    let bytes = encode_sample(false);
    assert!(bytes[31..].iter().all(|&b| b == 0));
}

#[test]
fn test_encode_last_block_has_no_next() {
    let bytes = encode_sample(false);
    let mut header = [0u8; HEADER_SIZE];
    header.copy_from_slice(&bytes[..HEADER_SIZE]);

    let header = BlockHeader::from_bytes(&header);
    assert_eq!(header.next_offset, NO_NEXT_BLOCK);
    assert!(!header.has_next());
}

#[test]
fn test_encode_crc_covers_bytes_after_crc_field() {
    let bytes = encode_sample(true);
    let stored = u16::from_be_bytes([bytes[8], bytes[9]]);
    assert_eq!(stored, crc16(&bytes[10..]));
}

#[test]
fn test_encode_full_payload_fill_equals_block_size() {
    let payload = vec![0xAB; 100];
    let bytes = Block::encode(0, 128, &payload, 0, 28, 0, false).unwrap();
    let block = Block::decode(&mut Cursor::new(bytes)).unwrap();

    assert_eq!(block.header.fill, 128);
    assert_eq!(block.data(), &payload[..]);
}

#[test]
fn test_encode_rejects_oversized_payload() {
    let payload = vec![0u8; 101];
    let result = Block::encode(0, 128, &payload, 0, 0, 0, false);
    assert!(matches!(result, Err(DdffError::Serialization(_))));
}

// =============================================================================
// Decoding Tests
// =============================================================================

#[test]
fn test_decode_restores_header_and_data() {
    let bytes = encode_sample(true);
    let block = Block::decode(&mut Cursor::new(bytes)).unwrap();

    assert_eq!(block.stream_id(), 3);
    assert_eq!(block.header.block_size, 128);
    assert_eq!(block.header.fill, 31);
    assert_eq!(block.header.first_object_offset, 28);
    assert_eq!(block.header.block_number, 7);
    assert_eq!(block.header.next_offset, 384);
    assert_eq!(block.payload.len(), 100);
    assert_eq!(block.data(), &[1, 2, 3]);
}

#[test]
fn test_decode_consecutive_blocks_from_one_reader() {
    let mut bytes = Block::encode(0, 64, b"first", 0, 28, 0, true).unwrap();
    bytes.extend(Block::encode(1, 96, b"second", 0, 28, 64, false).unwrap());

    let mut reader = Cursor::new(bytes);
    let a = Block::decode(&mut reader).unwrap();
    let b = Block::decode(&mut reader).unwrap();

    assert_eq!(a.data(), b"first");
    assert_eq!(b.data(), b"second");
    assert_eq!(b.header.block_size, 96);
}

#[test]
fn test_decode_detects_payload_corruption() {
    let mut bytes = encode_sample(true);
    bytes[40] ^= 0x01;

    let result = Block::decode(&mut Cursor::new(bytes));
    assert!(matches!(result, Err(DdffError::CorruptBlock { .. })));
}

#[test]
fn test_decode_detects_header_corruption() {
    let mut bytes = encode_sample(true);
    bytes[25] ^= 0x80; // block_number

    let result = Block::decode(&mut Cursor::new(bytes));
    assert!(matches!(result, Err(DdffError::CorruptBlock { .. })));
}

#[test]
fn test_decode_ignores_next_offset_changes() {
    let mut bytes = encode_sample(true);
    bytes[7] ^= 0x01;

    let block = Block::decode(&mut Cursor::new(bytes)).unwrap();
    assert_eq!(block.header.next_offset, 385);
}

#[test]
fn test_decode_short_header_is_truncated() {
    let bytes = encode_sample(true);
    let result = Block::decode(&mut Cursor::new(&bytes[..20]));

    match result {
        Err(DdffError::TruncatedFile { expected, found }) => {
            assert_eq!(expected, 28);
            assert_eq!(found, 20);
        }
        other => panic!("expected TruncatedFile, got {:?}", other),
    }
}

#[test]
fn test_decode_short_payload_is_truncated() {
    let bytes = encode_sample(true);
    let result = Block::decode(&mut Cursor::new(&bytes[..100]));

    match result {
        Err(DdffError::TruncatedFile { expected, found }) => {
            assert_eq!(expected, 100);
            assert_eq!(found, 72);
        }
        other => panic!("expected TruncatedFile, got {:?}", other),
    }
}

#[test]
fn test_decode_empty_input_is_truncated() {
    let result = Block::decode(&mut Cursor::new(Vec::<u8>::new()));
    assert!(matches!(result, Err(DdffError::TruncatedFile { found: 0, .. })));
}

#[test]
fn test_read_header_at_eof_returns_none() {
    let header = BlockHeader::read_from(&mut Cursor::new(Vec::<u8>::new())).unwrap();
    assert!(header.is_none());
}

#[test]
fn test_decode_rejects_block_size_below_header() {
    let mut bytes = encode_sample(true);
    bytes[12..16].copy_from_slice(&20u32.to_be_bytes());

    let result = Block::decode(&mut Cursor::new(bytes));
    assert!(matches!(result, Err(DdffError::CorruptBlock { .. })));
}

#[test]
fn test_header_bytes_round_trip() {
    let header = BlockHeader {
        next_offset: -1,
        crc: 0xBEEF,
        stream_id: 513,
        block_size: 4096,
        fill: 1000,
        first_object_offset: 40,
        block_number: 12,
    };
    assert_eq!(BlockHeader::from_bytes(&header.to_bytes()), header);
}
