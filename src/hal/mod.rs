//! Hardware Abstraction Layer
//!
//! Seams between the transfer engine and the platform it runs on.
//!
//! # Modules
//!
//! - [`dma`]: The DMA-capable SPI driver the engine drives
//! - [`relax`]: What a waiting caller does with the CPU
//!
//! # Delay Integration
//!
//! [`DelayYield`] uses `embedded_hal::delay::DelayNs` directly. Pass any delay
//! implementation from your HAL or RTOS.

pub mod dma;
pub mod relax;

// Re-export commonly used types
pub use dma::{DmaTransfer, SpiDmaDriver, TransferStatus};
pub use relax::{DEFAULT_YIELD_US, DelayYield, Spin, Yielder};
