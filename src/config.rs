//! Configuration for DDFF containers
//!
//! Centralized configuration with sensible defaults.

use crate::block::HEADER_SIZE;
use crate::error::{DdffError, Result};

/// Default block size used by new files
pub const DEFAULT_BLOCK_SIZE: u32 = 4096;

/// Default upper bound on one encoded record (16 MB)
pub const DEFAULT_MAX_RECORD_SIZE: u64 = 16 * 1024 * 1024;

/// Configuration handed to a [`Container`](crate::Container) at construction
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Format Configuration
    // -------------------------------------------------------------------------
    /// Total size of every block written, header included.
    /// Readers take the size from each block header instead.
    pub block_size: u32,

    /// Largest encoded record the streaming decoder will accept.
    /// Bounds allocations when a length prefix is corrupt.
    pub max_record_size: u64,

    // -------------------------------------------------------------------------
    // Logging Configuration
    // -------------------------------------------------------------------------
    /// Emit one debug event per block read or written
    pub verbose: bool,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// fsync the file after every write-out
    pub sync_on_write: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
            verbose: false,
            sync_on_write: true,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Payload bytes available in one block (0 if the block cannot hold a header)
    pub fn payload_capacity(&self) -> usize {
        (self.block_size as usize).saturating_sub(HEADER_SIZE)
    }

    /// Check that the values describe a usable container
    pub fn validate(&self) -> Result<()> {
        if self.payload_capacity() == 0 {
            return Err(DdffError::Config(format!(
                "block size {} must exceed the {}-byte header",
                self.block_size, HEADER_SIZE
            )));
        }
        if self.max_record_size == 0 {
            return Err(DdffError::Config(
                "max record size must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the block size (in bytes, header included)
    pub fn block_size(mut self, size: u32) -> Self {
        self.config.block_size = size;
        self
    }

    /// Set the maximum encoded record size (in bytes)
    pub fn max_record_size(mut self, size: u64) -> Self {
        self.config.max_record_size = size;
        self
    }

    /// Enable per-block logging
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.config.verbose = verbose;
        self
    }

    /// Enable or disable fsync after write-out
    pub fn sync_on_write(mut self, sync: bool) -> Self {
        self.config.sync_on_write = sync;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
