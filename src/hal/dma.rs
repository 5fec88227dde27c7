//! DMA-capable SPI driver interface
//!
//! The engine does not touch registers itself. It drives an implementation of
//! [`SpiDmaDriver`], typically a thin wrapper around the vendor SPI driver
//! (init/deinit, a direct single-byte exchange, and asynchronous DMA transfers
//! that report completion from interrupt context).

use core::ops::Range;

use crate::driver::config::TransferSettings;
use crate::driver::error::Result;
use crate::internal::constants::DMA_MAX_TRANSFER_SIZE;
use crate::sync::CompletionSignal;

/// Outcome reported by the driver when a DMA chunk finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferStatus {
    /// The chunk was clocked out/in completely
    Complete,
    /// The driver reported a failure; carries the vendor status code
    Failed(u32),
}

impl TransferStatus {
    /// Map a vendor status code where `0` means success
    #[inline]
    pub const fn from_code(code: u32) -> Self {
        if code == 0 { Self::Complete } else { Self::Failed(code) }
    }

    /// Check for a successful completion
    #[inline]
    pub const fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// One chunk handed to the driver.
///
/// All buffers are at most [`SpiDmaDriver::MAX_TRANSFER_SIZE`] bytes long.
#[derive(Debug)]
pub enum DmaTransfer<'a> {
    /// Transmit only, received bytes are discarded
    Write(&'a [u8]),
    /// Receive only, the driver clocks out its dummy pattern
    Read(&'a mut [u8]),
    /// Full duplex with separate buffers of equal length
    Duplex {
        /// Bytes to transmit
        tx: &'a [u8],
        /// Storage for received bytes
        rx: &'a mut [u8],
    },
    /// Full duplex, received bytes overwrite the transmitted ones
    InPlace(&'a mut [u8]),
}

impl DmaTransfer<'_> {
    /// Number of bytes clocked by this chunk
    pub fn len(&self) -> usize {
        match self {
            DmaTransfer::Write(tx) => tx.len(),
            DmaTransfer::Read(rx) | DmaTransfer::InPlace(rx) => rx.len(),
            DmaTransfer::Duplex { tx, .. } => tx.len(),
        }
    }

    /// Check for an empty chunk
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reborrow the bytes in `range` as a transfer of the same kind.
    ///
    /// # Panics
    ///
    /// Panics if `range` is out of bounds.
    pub fn chunk(&mut self, range: Range<usize>) -> DmaTransfer<'_> {
        match self {
            DmaTransfer::Write(tx) => DmaTransfer::Write(&tx[range]),
            DmaTransfer::Read(rx) => DmaTransfer::Read(&mut rx[range]),
            DmaTransfer::Duplex { tx, rx } => DmaTransfer::Duplex {
                tx: &tx[range.clone()],
                rx: &mut rx[range],
            },
            DmaTransfer::InPlace(buf) => DmaTransfer::InPlace(&mut buf[range]),
        }
    }
}

/// Underlying synchronous-init / asynchronous-transfer SPI driver.
///
/// # Buffer lifetime
///
/// [`start_transfer`](Self::start_transfer) may program DMA descriptors that
/// keep pointing at the chunk buffers after it returns. The engine never
/// touches those buffers, and never lets the caller's borrow end, until the
/// chunk's completion has been observed or
/// [`abort_transfer`](Self::abort_transfer) has been called.
///
/// # Completion
///
/// Exactly one completion must be reported per started chunk, by calling
/// [`CompletionSignal::complete`] on `done` (or the engine's
/// `dma_transfer_finished`, which forwards to the same signal). This is
/// normally done from the DMA interrupt.
pub trait SpiDmaDriver {
    /// Largest chunk a single DMA descriptor can move
    const MAX_TRANSFER_SIZE: usize = DMA_MAX_TRANSFER_SIZE;

    /// Bring the peripheral up with the given settings
    fn init(&mut self, settings: &TransferSettings) -> Result<()>;

    /// Shut the peripheral down
    fn deinit(&mut self);

    /// Exchange one byte using direct register access, busy-waiting
    fn transfer_byte(&mut self, byte: u8) -> u8;

    /// Start an asynchronous DMA transfer of one chunk
    fn start_transfer(&mut self, transfer: DmaTransfer<'_>, done: &CompletionSignal) -> Result<()>;

    /// Check if the last started chunk is still moving
    fn is_transfer_active(&self) -> bool;

    /// Stop an in-flight chunk; no completion is expected afterwards
    fn abort_transfer(&mut self);

    /// Bit rate actually in effect, which may differ from the requested one
    fn bitrate(&self) -> u32;
}
