//! SPI DMA Transfer Engine
//!
//! A `no_std`, `no_alloc` engine that multiplexes one DMA-capable SPI
//! controller between concurrent tasks.
//!
//! Callers get a familiar byte/buffer API (`transfer`, `receive`, 16-bit
//! exchanges, transaction bracketing), while underneath every bulk transfer
//! is cut into DMA-sized chunks and each chunk's completion is handed from
//! the DMA interrupt back to the waiting task.
//!
//! # Architecture
//!
//! The crate is organized into three layers:
//!
//! 1. **Engine Layer** ([`driver`]): [`SpiEngine`], [`Transaction`], chunking
//! 2. **Sync Layer** ([`sync`]): bus locks and the ISR-to-task completion signal
//! 3. **HAL Layer** ([`hal`]): the [`SpiDmaDriver`] seam and [`Yielder`] policies
//!
//! ## Waiting
//!
//! Every bulk transfer takes a [`WaitMode`]:
//!
//! - [`WaitMode::Block`]: spin on the peripheral's busy flag, never yield
//!   (usable before a scheduler runs or with interrupts masked)
//! - [`WaitMode::Yield`]: park on the completion signal through the engine's
//!   [`Yielder`], letting other tasks run
//!
//! Both modes move identical data.
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for public types and engine logging
//!
//! The application must link a `critical-section` implementation.
//!
//! # Example
//!
//! ```ignore
//! use spi_dma_engine::{SpiEngine, TransferSettings, WaitMode, dma_completion_callback};
//!
//! static SPI: SpiEngine<VendorSpi, RtosYield> = SpiEngine::new(VendorSpi::new(), RtosYield);
//!
//! // Registered with the vendor driver as the DMA completion callback
//! dma_completion_callback!(pub fn spi0_dma_done => SPI);
//!
//! SPI.begin()?;
//!
//! let mut bus = SPI.begin_transaction(TransferSettings::new().with_clock_hz(8_000_000))?;
//! bus.transfer16(0x9F00)?;
//! let mut id = [0u8; 3];
//! bus.receive_with(&mut id, WaitMode::Yield)?;
//! bus.end();
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod sync;

// Internal implementation details (pub(crate) only)
mod internal;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::chunk::next_dma_transfer_size;
pub use driver::config::{BitOrder, EngineConfig, TransferSettings, WaitMode};
pub use driver::engine::{SpiEngine, TransferStats};
pub use driver::error::{ConfigError, DmaError, Error, IoError, IoResult, Result};
pub use driver::transaction::Transaction;
pub use hal::{DelayYield, DmaTransfer, Spin, SpiDmaDriver, TransferStatus, Yielder};
pub use sync::CompletionSignal;

/// Shared engine constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on engine types.
pub mod constants {
    pub use crate::internal::constants::{
        DEFAULT_CLOCK_HZ, DMA_MAX_TRANSFER_SIZE, DUMMY_TX_BYTE, DUMMY_TX_WORD,
    };
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Declare the DMA completion callback for a static engine.
///
/// The generated function takes the vendor status code (`0` for success)
/// and the number of bytes moved, and forwards both to
/// [`SpiEngine::dma_transfer_finished`]. Register it with the vendor driver
/// once per peripheral.
///
/// # Examples
///
/// ```ignore
/// static SPI0: SpiEngine<VendorSpi, RtosYield> = SpiEngine::new(VendorSpi::new(0), RtosYield);
/// static SPI1: SpiEngine<VendorSpi, RtosYield> = SpiEngine::new(VendorSpi::new(1), RtosYield);
///
/// spi_dma_engine::dma_completion_callback!(fn spi0_dma_done => SPI0);
/// spi_dma_engine::dma_completion_callback!(fn spi1_dma_done => SPI1);
/// ```
#[macro_export]
macro_rules! dma_completion_callback {
    ($vis:vis fn $name:ident => $engine:expr) => {
        $vis fn $name(status: u32, items: usize) {
            $engine.dma_transfer_finished($crate::hal::TransferStatus::from_code(status), items);
        }
    };
}
