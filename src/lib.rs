//! # DDFF
//!
//! A self-describing, block-structured binary log format for recording
//! several independent, variable-rate data streams into one file:
//! - Fixed-size blocks with a CRC-16 over header and payload
//! - Records that freely span block boundaries
//! - Stream 0: inventory of stream names and member schemas
//! - Stream 1: named periods for windowed replay
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        TagIndex                             │
//! │            (stream 1: named periods, windowing)             │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Inventory                            │
//! │         (stream 0: tag → schema → stream id)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Container                            │
//! │        (scan on open / write-out one stream at a time)      │
//! └──────────┬──────────────────────────────────┬───────────────┘
//!            │                                  │
//!            ▼                                  ▼
//!   ┌──────────────────┐              ┌──────────────────┐
//!   │  StreamBuffer    │              │ StreamAccumulator│
//!   │  (write path)    │              │   (read path)    │
//!   └────────┬─────────┘              └────────┬─────────┘
//!            │                                  │
//!            └───────────────┬──────────────────┘
//!                            ▼
//!                    ┌──────────────┐
//!                    │ Block codec  │
//!                    │  (CRC-16)    │
//!                    └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod value;
pub mod block;
pub mod stream;
pub mod container;
pub mod cursor;
pub mod inventory;
pub mod tags;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DdffError, Result};
pub use config::Config;
pub use value::Value;
pub use block::StreamId;
pub use container::{Container, ContainerState, Mode};
pub use inventory::{Inventory, MemberKey, Schema};
pub use tags::{Period, TagIndex};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of DDFF
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
