//! SPI transfer engine.
//!
//! [`SpiEngine`] owns one physical SPI controller (through its
//! [`SpiDmaDriver`]) and multiplexes it between callers:
//!
//! - a **transaction lock** serializes logical transactions
//!   ([`SpiEngine::begin_transaction`] until the [`Transaction`] guard drops);
//! - an **operation lock** serializes individual byte exchanges and bulk
//!   transfers, so legacy callers that skip the transaction bracket still
//!   never interleave on the wire;
//! - a [`CompletionSignal`] carries each DMA chunk's completion from the
//!   interrupt back to the waiting caller.
//!
//! Bulk transfers are cut into chunks of at most
//! [`SpiDmaDriver::MAX_TRANSFER_SIZE`] bytes and run strictly one after the
//! other.

use super::chunk::Chunks;
use super::config::{BitOrder, EngineConfig, TransferSettings, WaitMode};
use super::error::{ConfigError, DmaError, IoResult, Result};
use super::transaction::Transaction;
use crate::hal::{DmaTransfer, SpiDmaDriver, TransferStatus, Yielder};
use crate::internal::constants::{DUMMY_TX_BYTE, DUMMY_TX_WORD};
use crate::sync::{BusLock, ChunkCompletion, CompletionSignal, CriticalSectionCell, poll_until};

// =============================================================================
// Statistics
// =============================================================================

/// Counters maintained by the engine since construction or the last
/// [`SpiEngine::reset_stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TransferStats {
    /// Chunks handed to the driver
    pub chunks_dispatched: u32,
    /// Chunks whose completion was awaited in [`WaitMode::Yield`]
    pub completion_waits: u32,
    /// Bytes moved by successfully completed chunks
    pub bytes_transferred: usize,
    /// Chunks that failed, came up short, or timed out
    pub failed_chunks: u32,
}

impl TransferStats {
    const fn new() -> Self {
        Self {
            chunks_dispatched: 0,
            completion_waits: 0,
            bytes_transferred: 0,
            failed_chunks: 0,
        }
    }
}

struct EngineState<D> {
    driver: D,
    settings: TransferSettings,
    initialized: bool,
}

// =============================================================================
// Engine
// =============================================================================

/// Transfer engine bound to one SPI peripheral.
///
/// Construct one per physical controller and share it by reference (or put
/// it in a `static`; both constructors are `const`). All methods take `&self`.
///
/// # Type Parameters
/// * `D` - The DMA-capable driver for the peripheral
/// * `Y` - How waiting callers give up the CPU
///
/// The bus locks have no owner tracking and no priority inheritance; a
/// waiter only makes room for the holder through `Y`. Under a preemptive
/// scheduler `Y` must suspend the calling task (an RTOS delay through
/// [`DelayYield`](crate::DelayYield), or a task yield).
/// [`Spin`](crate::Spin) is only sound without preemption, where the holder
/// can never be starved by a spinning waiter.
///
/// # Example
/// ```ignore
/// static SPI: SpiEngine<VendorSpi, RtosYield> = SpiEngine::new(VendorSpi::new(), RtosYield);
///
/// SPI.begin()?;
/// let mut bus = SPI.begin_transaction(TransferSettings::new().with_clock_hz(8_000_000))?;
/// bus.write_with(&frame, WaitMode::Yield)?;
/// bus.end();
/// ```
pub struct SpiEngine<D: SpiDmaDriver, Y: Yielder> {
    state: CriticalSectionCell<EngineState<D>>,
    transaction: BusLock,
    operation: BusLock,
    completion: CompletionSignal,
    stats: CriticalSectionCell<TransferStats>,
    config: EngineConfig,
    yielder: Y,
}

impl<D: SpiDmaDriver, Y: Yielder> SpiEngine<D, Y> {
    /// Create an engine with default settings and no wait limits.
    ///
    /// The peripheral stays untouched until [`begin`](Self::begin).
    pub const fn new(driver: D, yielder: Y) -> Self {
        Self::with_config(driver, yielder, EngineConfig::new())
    }

    /// Create an engine with explicit wait limits
    pub const fn with_config(driver: D, yielder: Y, config: EngineConfig) -> Self {
        Self {
            state: CriticalSectionCell::new(EngineState {
                driver,
                settings: TransferSettings::new(),
                initialized: false,
            }),
            transaction: BusLock::new(),
            operation: BusLock::new(),
            completion: CompletionSignal::new(),
            stats: CriticalSectionCell::new(TransferStats::new()),
            config,
            yielder,
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Bring the peripheral up with the cached settings.
    ///
    /// Calling `begin` on a running engine does nothing.
    pub fn begin(&self) -> Result<()> {
        self.with_operation(|| {
            self.state.with(|state| {
                if state.initialized {
                    return Ok(());
                }
                state.driver.init(&state.settings)?;
                state.initialized = true;

                #[cfg(feature = "defmt")]
                defmt::info!("SPI engine started at {} Hz", state.driver.bitrate());

                Ok(())
            })
        })
    }

    /// Shut the peripheral down.
    ///
    /// Waits for any in-flight operation to finish first. Calling `end` on a
    /// stopped engine does nothing; `begin` afterwards restores full
    /// operation. An open [`Transaction`] is not released.
    pub fn end(&self) -> Result<()> {
        self.with_operation(|| {
            self.state.with(|state| {
                if state.initialized {
                    state.driver.deinit();
                    state.initialized = false;

                    #[cfg(feature = "defmt")]
                    defmt::info!("SPI engine stopped");
                }
            });
            Ok(())
        })
    }

    /// Check if [`begin`](Self::begin) has run (and `end` has not)
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.state.with_ref(|state| state.initialized)
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Take exclusive ownership of the bus and apply `settings`.
    ///
    /// Waits (through the yielder) while another transaction is open. The
    /// peripheral is only reconfigured when `settings` differ from the cached
    /// ones. The bus is released when the returned guard is dropped or
    /// [`Transaction::end`] is called.
    ///
    /// Opening a second transaction from the holder of the first never
    /// returns unless a lock limit is configured; see
    /// [`try_begin_transaction`](Self::try_begin_transaction).
    pub fn begin_transaction(&self, settings: TransferSettings) -> Result<Transaction<'_, D, Y>> {
        self.transaction.lock(&self.yielder, self.config.lock_timeout)?;
        self.open_transaction(settings)
    }

    /// Like [`begin_transaction`](Self::begin_transaction) but fails with
    /// [`IoError::Busy`](crate::IoError::Busy) instead of waiting.
    pub fn try_begin_transaction(&self, settings: TransferSettings) -> Result<Transaction<'_, D, Y>> {
        if !self.transaction.try_lock() {
            return Err(crate::IoError::Busy.into());
        }
        self.open_transaction(settings)
    }

    /// Check whether a transaction is open
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_locked()
    }

    fn open_transaction(&self, settings: TransferSettings) -> Result<Transaction<'_, D, Y>> {
        if let Err(err) = self.apply_settings(settings) {
            self.transaction.unlock();
            return Err(err);
        }
        Ok(Transaction::new(self))
    }

    pub(crate) fn end_transaction(&self) {
        self.transaction.unlock();
    }

    /// Settings currently cached (and, when running, applied)
    pub fn settings(&self) -> TransferSettings {
        self.state.with_ref(|state| state.settings)
    }

    /// Bit rate the peripheral actually runs at, which may be a rounded
    /// version of the requested clock. 0 while stopped.
    pub fn current_bus_speed(&self) -> u32 {
        self.state.with_ref(|state| {
            if state.initialized {
                state.driver.bitrate()
            } else {
                0
            }
        })
    }

    fn apply_settings(&self, settings: TransferSettings) -> Result<()> {
        if settings.clock_hz == 0 {
            return Err(ConfigError::InvalidSettings.into());
        }

        self.with_operation(|| {
            self.state.with(|state| {
                if state.settings == settings {
                    return Ok(());
                }
                let previous = core::mem::replace(&mut state.settings, settings);
                if !state.initialized {
                    return Ok(());
                }

                state.driver.deinit();
                if let Err(err) = state.driver.init(&settings) {
                    // Peripheral is down; `begin` brings it back with the last good settings.
                    state.settings = previous;
                    state.initialized = false;

                    #[cfg(feature = "defmt")]
                    defmt::error!("SPI reconfiguration failed: {}", err);

                    return Err(err);
                }

                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "SPI reconfigured: requested {} Hz, running {} Hz",
                    settings.clock_hz,
                    state.driver.bitrate()
                );

                Ok(())
            })
        })
    }

    // =========================================================================
    // Legacy configuration
    // =========================================================================

    /// Change the bit order outside a transaction.
    ///
    /// Legacy shortcut: the read-modify-write of the cached settings is not
    /// protected against a concurrent `begin_transaction`.
    #[deprecated(note = "pass the bit order to `begin_transaction` instead")]
    pub fn set_bit_order(&self, bit_order: BitOrder) -> Result<()> {
        self.apply_settings(self.settings().with_bit_order(bit_order))
    }

    /// Change the SPI mode (0..=3) outside a transaction.
    ///
    /// Unknown numbers select mode 0. Legacy shortcut with the same caveat
    /// as [`set_bit_order`](Self::set_bit_order).
    #[deprecated(note = "pass the mode to `begin_transaction` instead")]
    pub fn set_data_mode(&self, mode: u8) -> Result<()> {
        self.apply_settings(
            self.settings()
                .with_mode(TransferSettings::mode_from_number(mode)),
        )
    }

    /// AVR clock divider. Ignored: the clock is set through
    /// [`TransferSettings::clock_hz`].
    #[deprecated(note = "pass the clock rate to `begin_transaction` instead")]
    pub fn set_clock_divider(&self, _divider: u8) {}

    // =========================================================================
    // Single-unit transfers
    // =========================================================================

    /// Exchange one byte, busy-waiting on the peripheral.
    ///
    /// Returns 0 without touching the bus while the engine is stopped.
    pub fn transfer_byte(&self, byte: u8) -> Result<u8> {
        self.with_operation(|| {
            Ok(self.state.with(|state| {
                if state.initialized {
                    state.driver.transfer_byte(byte)
                } else {
                    0
                }
            }))
        })
    }

    /// Exchange two bytes, most significant byte first.
    ///
    /// Both bytes go out under one operation lock, so no other caller can
    /// slip a byte in between.
    pub fn transfer16(&self, word: u16) -> Result<u16> {
        let [high, low] = word.to_be_bytes();
        self.with_operation(|| {
            Ok(self.state.with(|state| {
                if !state.initialized {
                    return 0;
                }
                let rx_high = state.driver.transfer_byte(high);
                let rx_low = state.driver.transfer_byte(low);
                u16::from_be_bytes([rx_high, rx_low])
            }))
        })
    }

    /// Read one byte by clocking out `0xFF`
    pub fn receive_byte(&self) -> Result<u8> {
        self.transfer_byte(DUMMY_TX_BYTE)
    }

    /// Read two bytes by clocking out `0xFFFF`
    pub fn receive16(&self) -> Result<u16> {
        self.transfer16(DUMMY_TX_WORD)
    }

    // =========================================================================
    // Bulk transfers
    // =========================================================================

    /// Transmit `tx`, discarding received bytes
    pub fn write(&self, tx: &[u8], mode: WaitMode) -> Result<()> {
        self.run_chunked(DmaTransfer::Write(tx), mode)
    }

    /// Transmit `tx` while receiving into `rx`.
    ///
    /// # Errors
    ///
    /// [`DmaError::LengthMismatch`] if the buffers differ in length.
    pub fn transfer(&self, tx: &[u8], rx: &mut [u8], mode: WaitMode) -> Result<()> {
        if tx.len() != rx.len() {
            return Err(DmaError::LengthMismatch.into());
        }
        self.run_chunked(DmaTransfer::Duplex { tx, rx }, mode)
    }

    /// Transmit `buf` and replace its contents with the received bytes
    pub fn transfer_in_place(&self, buf: &mut [u8], mode: WaitMode) -> Result<()> {
        self.run_chunked(DmaTransfer::InPlace(buf), mode)
    }

    /// Receive into `rx` while the driver clocks out its dummy pattern
    pub fn receive(&self, rx: &mut [u8], mode: WaitMode) -> Result<()> {
        self.run_chunked(DmaTransfer::Read(rx), mode)
    }

    fn run_chunked(&self, mut transfer: DmaTransfer<'_>, mode: WaitMode) -> Result<()> {
        let total = transfer.len();
        if total == 0 {
            return Ok(());
        }

        self.with_operation(|| {
            if !self.is_initialized() {
                #[cfg(feature = "defmt")]
                defmt::warn!("SPI transfer of {} bytes dropped: engine not started", total);

                return Ok(());
            }

            for (offset, len) in Chunks::new(total, D::MAX_TRANSFER_SIZE) {
                self.run_chunk(transfer.chunk(offset..offset + len), mode)?;
            }
            Ok(())
        })
    }

    fn run_chunk(&self, chunk: DmaTransfer<'_>, mode: WaitMode) -> Result<()> {
        let len = chunk.len();

        self.completion.arm();
        let started = self
            .state
            .with(|state| state.driver.start_transfer(chunk, &self.completion));
        if let Err(err) = started {
            self.completion.disarm();
            self.record_failure();

            #[cfg(feature = "defmt")]
            defmt::error!("SPI DMA chunk of {} bytes not started: {}", len, err);

            return Err(err);
        }
        self.stats
            .with(|stats| stats.chunks_dispatched = stats.chunks_dispatched.wrapping_add(1));

        let waited = match mode {
            WaitMode::Block => self.spin_for_completion(len),
            WaitMode::Yield => {
                self.stats
                    .with(|stats| stats.completion_waits = stats.completion_waits.wrapping_add(1));
                self.completion
                    .wait(&self.yielder, self.config.completion_timeout)
            }
        };

        let completion = match waited {
            Ok(completion) => completion,
            Err(err) => {
                // The buffers are about to be released; stop the hardware first.
                self.state.with(|state| state.driver.abort_transfer());
                self.completion.disarm();
                self.record_failure();

                #[cfg(feature = "defmt")]
                defmt::error!("SPI DMA chunk of {} bytes timed out", len);

                return Err(err.into());
            }
        };

        self.check_completion(completion, len)
    }

    fn spin_for_completion(&self, len: usize) -> IoResult<ChunkCompletion> {
        poll_until(self.config.completion_timeout, core::hint::spin_loop, || {
            let active = self.state.with_ref(|state| state.driver.is_transfer_active());
            (!active).then_some(())
        })?;
        // The busy flag is authoritative here: with interrupts masked or no
        // scheduler running, the callback may never be delivered.
        Ok(self.completion.take_or_disarm().unwrap_or(ChunkCompletion {
            status: TransferStatus::Complete,
            items: len,
        }))
    }

    fn check_completion(&self, completion: ChunkCompletion, len: usize) -> Result<()> {
        if !completion.status.is_complete() {
            self.record_failure();

            #[cfg(feature = "defmt")]
            defmt::error!("SPI DMA chunk failed: {}", completion.status);

            return Err(DmaError::TransferFailed.into());
        }
        if completion.items < len {
            self.record_failure();

            #[cfg(feature = "defmt")]
            defmt::warn!("SPI DMA chunk short: {} of {} bytes", completion.items, len);

            return Err(DmaError::Incomplete.into());
        }

        self.stats.with(|stats| {
            stats.bytes_transferred = stats.bytes_transferred.wrapping_add(len);
        });
        Ok(())
    }

    fn record_failure(&self) {
        self.stats
            .with(|stats| stats.failed_chunks = stats.failed_chunks.wrapping_add(1));
    }

    fn with_operation<R>(&self, f: impl FnOnce() -> Result<R>) -> Result<R> {
        self.operation.lock(&self.yielder, self.config.lock_timeout)?;
        let result = f();
        self.operation.unlock();
        result
    }

    // =========================================================================
    // Interrupt side
    // =========================================================================

    /// DMA completion callback. Call from the peripheral's DMA interrupt.
    ///
    /// Never blocks. Returns `false` if the completion was ignored because
    /// no chunk was outstanding or one was already reported.
    #[inline]
    pub fn dma_transfer_finished(&self, status: TransferStatus, items: usize) -> bool {
        self.completion.complete(status, items)
    }

    /// The completion signal handed to the driver with every chunk
    #[inline]
    pub fn completion(&self) -> &CompletionSignal {
        &self.completion
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Wait limits in effect
    pub fn config(&self) -> EngineConfig {
        self.config
    }

    /// Snapshot of the transfer counters
    pub fn stats(&self) -> TransferStats {
        self.stats.with_ref(|stats| *stats)
    }

    /// Zero the transfer counters
    pub fn reset_stats(&self) {
        self.stats.with(|stats| *stats = TransferStats::new());
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
