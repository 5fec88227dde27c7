//! Core engine components.
//!
//! - [`config`] - Bus settings, wait modes and engine limits
//! - [`error`] - Error types and result aliases
//! - [`chunk`] - DMA chunk sizing
//! - [`engine`] - The transfer engine
//! - [`transaction`] - Exclusive bus ownership guard
//!
//! # Example
//!
//! ```ignore
//! use spi_dma_engine::driver::{SpiEngine, TransferSettings, WaitMode};
//!
//! let settings = TransferSettings::new()
//!     .with_clock_hz(8_000_000)
//!     .with_mode(embedded_hal::spi::MODE_3);
//! ```

// Submodules
pub mod chunk;
pub mod config;
pub mod engine;
pub mod error;
pub mod transaction;

// Re-exports for convenience
pub use chunk::{Chunks, next_chunk_len, next_dma_transfer_size};
pub use config::{BitOrder, EngineConfig, TransferSettings, WaitMode};
pub use engine::{SpiEngine, TransferStats};
pub use error::{ConfigError, DmaError, Error, IoError, IoResult, Result};
pub use transaction::Transaction;
