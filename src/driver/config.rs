//! Configuration types for the SPI transfer engine

use embedded_hal::spi::{MODE_0, MODE_1, MODE_2, MODE_3, Mode};

use crate::internal::constants::DEFAULT_CLOCK_HZ;

/// Order in which the bits of each byte are shifted out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    /// Most significant bit first
    #[default]
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

/// How a bulk transfer waits for each DMA chunk to finish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WaitMode {
    /// Busy-wait on the driver's active flag; the caller never yields
    Block,
    /// Wait on the completion signal, yielding between polls
    #[default]
    Yield,
}

impl From<bool> for WaitMode {
    /// Maps the legacy `block` flag: `true` busy-waits, `false` yields.
    fn from(block: bool) -> Self {
        if block { WaitMode::Block } else { WaitMode::Yield }
    }
}

/// Per-transaction bus settings: clock rate, bit order and SPI mode.
///
/// Cached on the engine and pushed to the peripheral only when a
/// transaction begins with settings that differ from the cached ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferSettings {
    /// Requested SCK rate in Hz. The driver may round it; see
    /// `SpiEngine::current_bus_speed`.
    pub clock_hz: u32,
    /// Bit order within each byte
    pub bit_order: BitOrder,
    /// Clock polarity and phase
    pub mode: Mode,
}

impl TransferSettings {
    /// 1 MHz, MSB first, mode 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            clock_hz: DEFAULT_CLOCK_HZ,
            bit_order: BitOrder::MsbFirst,
            mode: MODE_0,
        }
    }

    /// Set the clock rate
    #[must_use]
    pub const fn with_clock_hz(mut self, clock_hz: u32) -> Self {
        self.clock_hz = clock_hz;
        self
    }

    /// Set the bit order
    #[must_use]
    pub const fn with_bit_order(mut self, bit_order: BitOrder) -> Self {
        self.bit_order = bit_order;
        self
    }

    /// Set the SPI mode
    #[must_use]
    pub const fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Map an Arduino-style mode number (0..=3) to a [`Mode`].
    ///
    /// Unknown numbers fall back to mode 0.
    #[must_use]
    pub const fn mode_from_number(number: u8) -> Mode {
        match number {
            1 => MODE_1,
            2 => MODE_2,
            3 => MODE_3,
            _ => MODE_0,
        }
    }
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Engine-wide wait limits.
///
/// Limits count poll iterations (one [`Yielder::yield_now`] or one spin per
/// iteration). `None` waits forever, which is the default and matches the
/// behaviour of the vendor driver this engine sits on.
///
/// [`Yielder::yield_now`]: crate::hal::Yielder::yield_now
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EngineConfig {
    /// Limit on acquiring the transaction or operation lock
    pub lock_timeout: Option<u32>,
    /// Limit on waiting for one chunk to complete
    pub completion_timeout: Option<u32>,
}

impl EngineConfig {
    /// No limits.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            lock_timeout: None,
            completion_timeout: None,
        }
    }

    /// Bound lock acquisition to `polls` iterations
    #[must_use]
    pub const fn with_lock_timeout(mut self, polls: u32) -> Self {
        self.lock_timeout = Some(polls);
        self
    }

    /// Bound each chunk completion wait to `polls` iterations
    #[must_use]
    pub const fn with_completion_timeout(mut self, polls: u32) -> Self {
        self.completion_timeout = Some(polls);
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
