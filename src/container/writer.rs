//! Container write path
//!
//! Serializes every stream, one after another, to the end of the file.

use std::io::Write;

use crate::error::{DdffError, Result};

use super::{Container, FileHandle};

impl Container {
    /// Emit all buffered records and flush the file.
    ///
    /// Streams are written in ascending id order, each as one contiguous run
    /// of blocks whose `next_offset` chain ends at -1. Calling `write()`
    /// again later appends only records added since.
    pub fn write(&mut self) -> Result<()> {
        self.ensure_writable()?;
        let _enter = self.span.enter();

        let writer = match self.file.as_mut() {
            Some(FileHandle::Writer(writer)) => writer,
            _ => return Err(DdffError::ReadOnly),
        };

        let start = self.write_offset;
        let mut blocks = 0usize;

        for (id, buffer) in self.buffers.iter_mut() {
            let emitted = buffer.flush(true, &mut self.write_offset)?;
            for block in &emitted {
                writer.write_all(&block.bytes)?;
                if self.config.verbose {
                    tracing::debug!(
                        stream_id = *id,
                        offset = block.offset,
                        block_number = block.block_number,
                        fill = block.fill,
                        "Wrote block"
                    );
                }
            }
            blocks += emitted.len();
        }

        writer.flush()?;
        if self.config.sync_on_write {
            writer.get_ref().sync_all()?;
        }
        self.dirty = false;

        tracing::info!(
            streams = self.buffers.len(),
            blocks,
            bytes = self.write_offset - start,
            "Wrote container"
        );
        Ok(())
    }
}
