//! Container read path
//!
//! Linear scan of every block in file order.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::block::{Block, BlockHeader};
use crate::error::{DdffError, Result};
use crate::stream::{Stream, StreamAccumulator};

use super::Container;

/// A block header together with the file offset it was found at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLocation {
    pub offset: u64,
    pub header: BlockHeader,
}

/// Outcome of reading one block during a scan
enum Step {
    Block(Block),
    EndOfFile,
}

/// Read the block at `offset`, telling a clean or partial-header end of file
/// apart from a block cut short after its header.
fn next_block<R: Read>(reader: &mut R, offset: u64) -> Result<Step> {
    let header = match BlockHeader::read_from(reader) {
        Ok(Some(header)) => header,
        Ok(None) => return Ok(Step::EndOfFile),
        Err(DdffError::TruncatedFile { found, .. }) => {
            tracing::warn!(offset, found, "Ignoring partial block header at end of file");
            return Ok(Step::EndOfFile);
        }
        Err(e) => return Err(e),
    };

    match Block::read_payload(header, reader, offset) {
        Ok(block) => Ok(Step::Block(block)),
        Err(DdffError::TruncatedFile { expected, found }) => Err(DdffError::CorruptBlock {
            offset,
            reason: format!(
                "payload truncated: header promises {} bytes, {} remain",
                expected, found
            ),
        }),
        Err(e) => Err(e),
    }
}

impl Container {
    /// Scan `file` and hand the handle back once every block is consumed
    pub(super) fn scan_file(&mut self, file: File) -> Result<File> {
        let mut reader = BufReader::new(file);
        self.scan(&mut reader)?;
        Ok(reader.into_inner())
    }

    /// Route every block to its stream's accumulator.
    ///
    /// Blocks are read strictly in file order; each stream's records come
    /// out in the order its blocks appear, whatever the interleaving.
    pub(super) fn scan<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let _enter = self.span.enter();
        let codec = self.codec();
        let verbose = self.config.verbose;

        let mut offset: u64 = 0;
        let mut blocks: u64 = 0;

        loop {
            let block = match next_block(reader, offset)? {
                Step::Block(block) => block,
                Step::EndOfFile => break,
            };

            let header = block.header;
            if verbose {
                tracing::debug!(
                    offset,
                    stream_id = header.stream_id,
                    block_number = header.block_number,
                    fill = header.fill,
                    "Read block"
                );
            }

            let id = header.stream_id;
            let records = self
                .accumulators
                .entry(id)
                .or_insert_with(|| StreamAccumulator::new(id, codec))
                .feed(&block)?;
            self.streams
                .entry(id)
                .or_insert_with(|| Stream::new(id))
                .extend(records);

            offset += header.block_size as u64;
            blocks += 1;
        }

        for (id, accumulator) in self.accumulators.iter_mut() {
            let records = accumulator.finish()?;
            if let Some(stream) = self.streams.get_mut(id) {
                stream.extend(records);
            }
        }

        tracing::info!(
            streams = self.streams.len(),
            blocks,
            bytes = offset,
            "Scanned container"
        );
        Ok(())
    }
}

/// List every block header in file order, verifying each block's CRC
pub fn scan_blocks(path: impl AsRef<Path>) -> Result<Vec<BlockLocation>> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut locations = Vec::new();
    let mut offset: u64 = 0;

    while let Step::Block(block) = next_block(&mut reader, offset)? {
        locations.push(BlockLocation {
            offset,
            header: block.header,
        });
        offset += block.header.block_size as u64;
    }

    Ok(locations)
}
