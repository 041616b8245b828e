//! Block checksum
//!
//! CRC-16/CCITT-FALSE: poly 0x1021, init 0xFFFF, no reflection, no final xor.
//! The `crc` catalogue lists it as CRC-16/IBM-3740.

use crc::{Crc, CRC_16_IBM_3740};

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// Compute the CRC-16/CCITT-FALSE of `bytes`
pub fn crc16(bytes: &[u8]) -> u16 {
    CRC16.checksum(bytes)
}

/// CRC over a block's header fields (after the CRC) and its payload
pub(crate) fn block_crc(header_tail: &[u8], payload: &[u8]) -> u16 {
    let mut digest = CRC16.digest();
    digest.update(header_tail);
    digest.update(payload);
    digest.finalize()
}
