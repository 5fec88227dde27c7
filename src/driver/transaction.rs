//! Exclusive bus ownership.
//!
//! A [`Transaction`] is returned by [`SpiEngine::begin_transaction`] and
//! holds the engine's transaction lock until it is dropped. It also
//! implements [`embedded_hal::spi::SpiBus`], so device drivers written
//! against `embedded-hal` can run on top of the engine unchanged.

use embedded_hal::spi::{ErrorType, SpiBus};

use super::config::{TransferSettings, WaitMode};
use super::engine::SpiEngine;
use super::error::{Error, Result};
use crate::hal::{SpiDmaDriver, Yielder};

/// Guard for an open transaction.
///
/// Bulk methods without an explicit mode use the guard's [`WaitMode`]
/// (default [`WaitMode::Yield`]).
pub struct Transaction<'a, D: SpiDmaDriver, Y: Yielder> {
    engine: &'a SpiEngine<D, Y>,
    wait_mode: WaitMode,
}

impl<'a, D: SpiDmaDriver, Y: Yielder> Transaction<'a, D, Y> {
    pub(crate) fn new(engine: &'a SpiEngine<D, Y>) -> Self {
        Self {
            engine,
            wait_mode: WaitMode::default(),
        }
    }

    /// Use `mode` for the bulk transfers of this transaction
    #[must_use]
    pub fn with_wait_mode(mut self, mode: WaitMode) -> Self {
        self.wait_mode = mode;
        self
    }

    /// Change the wait mode mid-transaction
    pub fn set_wait_mode(&mut self, mode: WaitMode) {
        self.wait_mode = mode;
    }

    /// Wait mode in effect
    pub fn wait_mode(&self) -> WaitMode {
        self.wait_mode
    }

    /// Settings applied when the transaction opened
    pub fn settings(&self) -> TransferSettings {
        self.engine.settings()
    }

    /// The engine this transaction runs on
    pub fn engine(&self) -> &'a SpiEngine<D, Y> {
        self.engine
    }

    /// See [`SpiEngine::transfer_byte`]
    pub fn transfer_byte(&mut self, byte: u8) -> Result<u8> {
        self.engine.transfer_byte(byte)
    }

    /// See [`SpiEngine::transfer16`]
    pub fn transfer16(&mut self, word: u16) -> Result<u16> {
        self.engine.transfer16(word)
    }

    /// See [`SpiEngine::receive_byte`]
    pub fn receive_byte(&mut self) -> Result<u8> {
        self.engine.receive_byte()
    }

    /// See [`SpiEngine::receive16`]
    pub fn receive16(&mut self) -> Result<u16> {
        self.engine.receive16()
    }

    /// See [`SpiEngine::write`]
    pub fn write_with(&mut self, tx: &[u8], mode: WaitMode) -> Result<()> {
        self.engine.write(tx, mode)
    }

    /// See [`SpiEngine::transfer`]
    pub fn transfer_with(&mut self, tx: &[u8], rx: &mut [u8], mode: WaitMode) -> Result<()> {
        self.engine.transfer(tx, rx, mode)
    }

    /// See [`SpiEngine::transfer_in_place`]
    pub fn transfer_in_place_with(&mut self, buf: &mut [u8], mode: WaitMode) -> Result<()> {
        self.engine.transfer_in_place(buf, mode)
    }

    /// See [`SpiEngine::receive`]
    pub fn receive_with(&mut self, rx: &mut [u8], mode: WaitMode) -> Result<()> {
        self.engine.receive(rx, mode)
    }

    /// Release the bus. Equivalent to dropping the guard.
    pub fn end(self) {}
}

impl<D: SpiDmaDriver, Y: Yielder> Drop for Transaction<'_, D, Y> {
    fn drop(&mut self) {
        self.engine.end_transaction();

        #[cfg(feature = "defmt")]
        defmt::trace!("SPI transaction released");
    }
}

// =============================================================================
// embedded-hal
// =============================================================================

impl<D: SpiDmaDriver, Y: Yielder> ErrorType for Transaction<'_, D, Y> {
    type Error = Error;
}

impl<D: SpiDmaDriver, Y: Yielder> SpiBus<u8> for Transaction<'_, D, Y> {
    fn read(&mut self, words: &mut [u8]) -> Result<()> {
        self.engine.receive(words, self.wait_mode)
    }

    fn write(&mut self, words: &[u8]) -> Result<()> {
        self.engine.write(words, self.wait_mode)
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<()> {
        let common = read.len().min(write.len());
        let (read_head, read_tail) = read.split_at_mut(common);
        let (write_head, write_tail) = write.split_at(common);

        self.engine.transfer(write_head, read_head, self.wait_mode)?;
        self.engine.write(write_tail, self.wait_mode)?;
        self.engine.receive(read_tail, self.wait_mode)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<()> {
        self.engine.transfer_in_place(words, self.wait_mode)
    }

    fn flush(&mut self) -> Result<()> {
        // Every transfer has completed by the time it returns.
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
