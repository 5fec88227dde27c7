//! Testing utilities and mock implementations
//!
//! This module provides mock implementations for exercising the SPI engine
//! on the host without hardware access.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::vec::Vec;

use crate::driver::config::TransferSettings;
use crate::driver::error::{ConfigError, DmaError, Result};
use crate::hal::{DmaTransfer, SpiDmaDriver, TransferStatus, Yielder};
use crate::internal::constants::{DMA_MAX_TRANSFER_SIZE, DUMMY_TX_BYTE};
use crate::sync::CompletionSignal;

/// Reference clock the mock divides down to produce its bit rate
pub const MOCK_REF_CLOCK_HZ: u32 = 38_400_000;

// =============================================================================
// Mock SPI Driver
// =============================================================================

/// How the mock reports chunk completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionMode {
    /// Report from inside `start_transfer`
    #[default]
    Immediate,
    /// Leave the chunk active until the test plays the interrupt
    Deferred,
}

/// Kind of a dispatched chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    Write,
    Read,
    Duplex,
    InPlace,
}

/// One chunk the driver was asked to move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dispatch {
    pub kind: DispatchKind,
    pub len: usize,
}

#[derive(Debug, Clone, Copy)]
enum Fault {
    Status(TransferStatus),
    Short(usize),
}

#[derive(Debug)]
struct BusState {
    dispatches: Vec<Dispatch>,
    written: Vec<u8>,
    byte_log: Vec<u8>,
    applied: Vec<TransferSettings>,
    faults: Vec<(usize, Fault)>,
    init_count: usize,
    deinit_count: usize,
    abort_count: usize,
    loopback: bool,
    read_fill: u8,
    fail_init: bool,
    fail_start: bool,
    active: bool,
    pending: Option<usize>,
    bitrate: u32,
}

impl Default for BusState {
    fn default() -> Self {
        Self {
            dispatches: Vec::new(),
            written: Vec::new(),
            byte_log: Vec::new(),
            applied: Vec::new(),
            faults: Vec::new(),
            init_count: 0,
            deinit_count: 0,
            abort_count: 0,
            loopback: true,
            read_fill: 0,
            fail_init: false,
            fail_start: false,
            active: false,
            pending: None,
            bitrate: 0,
        }
    }
}

/// Test-side view of a [`MockSpiDriver`].
///
/// Cloning shares the same state, so a test keeps a handle while the engine
/// owns the driver.
#[derive(Debug, Clone, Default)]
pub struct MockBus {
    state: Arc<Mutex<BusState>>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap()
    }

    pub fn init_count(&self) -> usize {
        self.state().init_count
    }

    pub fn deinit_count(&self) -> usize {
        self.state().deinit_count
    }

    pub fn abort_count(&self) -> usize {
        self.state().abort_count
    }

    /// Every chunk started so far, in order
    pub fn dispatches(&self) -> Vec<Dispatch> {
        self.state().dispatches.clone()
    }

    /// Bytes clocked out by DMA chunks, in order
    pub fn written(&self) -> Vec<u8> {
        self.state().written.clone()
    }

    /// Bytes clocked out by single-byte exchanges, in order
    pub fn byte_log(&self) -> Vec<u8> {
        self.state().byte_log.clone()
    }

    /// Settings passed to every `init`, in order
    pub fn applied_settings(&self) -> Vec<TransferSettings> {
        self.state().applied.clone()
    }

    /// Echo transmitted bytes back (default) or return the fill byte
    pub fn set_loopback(&self, loopback: bool) {
        self.state().loopback = loopback;
    }

    /// Byte the peripheral "sends" when not echoing
    pub fn set_read_fill(&self, fill: u8) {
        self.state().read_fill = fill;
    }

    pub fn fail_init(&self, fail: bool) {
        self.state().fail_init = fail;
    }

    pub fn fail_start(&self, fail: bool) {
        self.state().fail_start = fail;
    }

    /// Report `status` for the chunk with dispatch index `index`
    pub fn fail_chunk(&self, index: usize, status: TransferStatus) {
        self.state().faults.push((index, Fault::Status(status)));
    }

    /// Report only `items` bytes for the chunk with dispatch index `index`
    pub fn short_chunk(&self, index: usize, items: usize) {
        self.state().faults.push((index, Fault::Short(items)));
    }

    /// Block until a deferred chunk is in flight; returns its length
    pub fn wait_for_pending(&self) -> usize {
        loop {
            if let Some(len) = self.state().pending {
                return len;
            }
            std::thread::yield_now();
        }
    }

    /// Let the in-flight deferred chunk finish on the "hardware" side
    pub fn finish_pending(&self) {
        let mut state = self.state();
        state.pending = None;
        state.active = false;
    }
}

/// Host-side stand-in for a vendor SPI driver.
///
/// Data moves synchronously inside `start_transfer`; only the completion is
/// optionally deferred. `MAX` sets the chunk limit.
#[derive(Debug)]
pub struct MockSpiDriver<const MAX: usize = DMA_MAX_TRANSFER_SIZE> {
    bus: MockBus,
    completion: CompletionMode,
}

impl MockSpiDriver {
    pub fn new() -> Self {
        Self::with_handle(MockBus::new())
    }
}

impl<const MAX: usize> MockSpiDriver<MAX> {
    pub fn with_handle(bus: MockBus) -> Self {
        Self {
            bus,
            completion: CompletionMode::Immediate,
        }
    }

    #[must_use]
    pub fn with_completion(mut self, completion: CompletionMode) -> Self {
        self.completion = completion;
        self
    }

    pub fn handle(&self) -> MockBus {
        self.bus.clone()
    }
}

impl<const MAX: usize> SpiDmaDriver for MockSpiDriver<MAX> {
    const MAX_TRANSFER_SIZE: usize = MAX;

    fn init(&mut self, settings: &TransferSettings) -> Result<()> {
        let mut state = self.bus.state();
        if state.fail_init {
            return Err(ConfigError::InitFailed.into());
        }
        state.init_count += 1;
        state.applied.push(*settings);
        let divider = MOCK_REF_CLOCK_HZ.div_ceil(settings.clock_hz.max(1));
        state.bitrate = MOCK_REF_CLOCK_HZ / divider;
        Ok(())
    }

    fn deinit(&mut self) {
        let mut state = self.bus.state();
        state.deinit_count += 1;
        state.bitrate = 0;
    }

    fn transfer_byte(&mut self, byte: u8) -> u8 {
        let mut state = self.bus.state();
        state.byte_log.push(byte);
        if state.loopback { byte } else { state.read_fill }
    }

    fn start_transfer(&mut self, transfer: DmaTransfer<'_>, done: &CompletionSignal) -> Result<()> {
        let (status, items) = {
            let mut state = self.bus.state();
            if state.fail_start {
                return Err(DmaError::StartFailed.into());
            }

            let len = transfer.len();
            let index = state.dispatches.len();
            let fill = state.read_fill;
            let loopback = state.loopback;
            let kind = match transfer {
                DmaTransfer::Write(tx) => {
                    state.written.extend_from_slice(tx);
                    DispatchKind::Write
                }
                DmaTransfer::Read(rx) => {
                    state.written.extend(core::iter::repeat_n(DUMMY_TX_BYTE, len));
                    rx.fill(fill);
                    DispatchKind::Read
                }
                DmaTransfer::Duplex { tx, rx } => {
                    state.written.extend_from_slice(tx);
                    if loopback {
                        rx.copy_from_slice(tx);
                    } else {
                        rx.fill(fill);
                    }
                    DispatchKind::Duplex
                }
                DmaTransfer::InPlace(buf) => {
                    state.written.extend_from_slice(buf);
                    if !loopback {
                        buf.fill(fill);
                    }
                    DispatchKind::InPlace
                }
            };
            state.dispatches.push(Dispatch { kind, len });

            let fault = state
                .faults
                .iter()
                .find(|(at, _)| *at == index)
                .map(|(_, fault)| *fault);
            let outcome = match fault {
                Some(Fault::Status(status)) => (status, 0),
                Some(Fault::Short(items)) => (TransferStatus::Complete, items),
                None => (TransferStatus::Complete, len),
            };

            if self.completion == CompletionMode::Deferred {
                state.active = true;
                state.pending = Some(len);
                return Ok(());
            }
            outcome
        };

        done.complete(status, items);
        Ok(())
    }

    fn is_transfer_active(&self) -> bool {
        self.bus.state().active
    }

    fn abort_transfer(&mut self) {
        let mut state = self.bus.state();
        state.abort_count += 1;
        state.active = false;
        state.pending = None;
    }

    fn bitrate(&self) -> u32 {
        self.bus.state().bitrate
    }
}

// =============================================================================
// Yielders
// =============================================================================

/// Yielder that hands the time slice to other test threads
#[derive(Debug, Clone, Copy, Default)]
pub struct StdYield;

impl Yielder for StdYield {
    fn yield_now(&self) {
        std::thread::yield_now();
    }
}

/// Yielder that counts how often a waiter gave up its slice.
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct CountingYield {
    count: Arc<AtomicUsize>,
}

impl CountingYield {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl Yielder for CountingYield {
    fn yield_now(&self) {
        self.count.fetch_add(1, Ordering::SeqCst);
        std::thread::yield_now();
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting. Clones share
/// the same total.
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: Arc<AtomicU64>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        self.total_ns.load(Ordering::SeqCst)
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.fetch_add(u64::from(ns), Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec;

    #[test]
    fn mock_bitrate_rounds_down_to_divider() {
        let mut driver = MockSpiDriver::new();
        driver
            .init(&TransferSettings::new().with_clock_hz(10_000_000))
            .unwrap();

        // ceil(38.4 / 10) = 4
        assert_eq!(driver.bitrate(), 9_600_000);
    }

    #[test]
    fn mock_immediate_completion_raises_signal() {
        let mut driver = MockSpiDriver::new();
        let signal = CompletionSignal::new();
        let tx = vec![1u8; 16];

        signal.arm();
        driver.start_transfer(DmaTransfer::Write(&tx), &signal).unwrap();

        let completion = signal.take().unwrap();
        assert_eq!(completion.items, 16);
        assert!(!driver.is_transfer_active());
    }

    #[test]
    fn mock_deferred_completion_stays_active() {
        let mut driver = MockSpiDriver::new().with_completion(CompletionMode::Deferred);
        let bus = driver.handle();
        let signal = CompletionSignal::new();

        signal.arm();
        driver.start_transfer(DmaTransfer::Write(&[0; 4]), &signal).unwrap();

        assert!(driver.is_transfer_active());
        assert_eq!(bus.wait_for_pending(), 4);
        bus.finish_pending();
        assert!(!driver.is_transfer_active());
        assert!(!signal.is_pending());
    }
}
