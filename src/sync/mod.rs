//! Synchronization and Concurrency Support
//!
//! Primitives shared between task context and the DMA completion interrupt.
//! Everything here is built on the `critical-section` crate, so the
//! application must link a critical-section implementation (HAL, RTOS port,
//! or `critical-section/std` on a host).
//!
//! - [`CriticalSectionCell`] - ISR-safe interior mutability
//! - [`BusLock`] - binary lock whose waiters park through a [`Yielder`]
//! - [`CompletionSignal`] - single-slot ISR-to-task completion handoff
//!
//! [`Yielder`]: crate::hal::Yielder
//!
//! # Example
//!
//! ```ignore
//! use spi_dma_engine::sync::CompletionSignal;
//! use spi_dma_engine::hal::{Spin, TransferStatus};
//!
//! static DONE: CompletionSignal = CompletionSignal::new();
//!
//! DONE.arm();
//! start_dma();
//!
//! // In the DMA interrupt:
//! DONE.complete(TransferStatus::Complete, len);
//!
//! // Back in the task:
//! let completion = DONE.wait(&Spin, None)?;
//! ```

mod lock;
mod primitives;
mod signal;

pub use lock::BusLock;
pub use primitives::CriticalSectionCell;
pub(crate) use primitives::poll_until;
pub use signal::{ChunkCompletion, CompletionSignal};
