//! Centralized Constants
//!
//! Single source of truth for the limits and defaults used by the SPI
//! transfer engine.
//!
//! # Organization
//!
//! - **DMA limits**: descriptor-bound transfer sizes
//! - **Bus defaults**: settings applied by `begin()`
//! - **Dummy patterns**: words clocked out when only receiving

// =============================================================================
// DMA Limits
// =============================================================================

/// Largest number of bytes one DMA descriptor can move.
///
/// Bulk transfers longer than this are split into sequential chunks.
pub const DMA_MAX_TRANSFER_SIZE: usize = 2048;

// =============================================================================
// Bus Defaults
// =============================================================================

/// Default SPI clock rate in Hz (1 MHz)
pub const DEFAULT_CLOCK_HZ: u32 = 1_000_000;

// =============================================================================
// Dummy Patterns
// =============================================================================

/// Byte transmitted by the single-byte receive helpers
pub const DUMMY_TX_BYTE: u8 = 0xFF;

/// Word transmitted by the two-byte receive helper
pub const DUMMY_TX_WORD: u16 = 0xFFFF;
