//! Completion signal between the DMA interrupt and the waiting task.
//!
//! The signal is armed right before a chunk is handed to the driver. The
//! completion callback raises it once; the task consumes it with
//! [`CompletionSignal::take`] or [`CompletionSignal::wait`]. Giving while a
//! completion is already pending is a no-op, and giving while disarmed is
//! ignored, so a stray or late interrupt can never satisfy the wait for a
//! later chunk.

use super::primitives::{CriticalSectionCell, poll_until};
use crate::driver::error::IoResult;
use crate::hal::{TransferStatus, Yielder};

/// What the completion callback reported for one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChunkCompletion {
    /// Driver status for the chunk
    pub status: TransferStatus,
    /// Bytes the driver reports as transferred
    pub items: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SignalState {
    Idle,
    Armed,
    Raised(ChunkCompletion),
}

/// Single-slot, ISR-safe completion signal
pub struct CompletionSignal {
    state: CriticalSectionCell<SignalState>,
}

impl CompletionSignal {
    /// Create a disarmed signal (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            state: CriticalSectionCell::new(SignalState::Idle),
        }
    }

    /// Arm for the next chunk, dropping anything left over
    #[inline]
    pub fn arm(&self) {
        self.state.with(|state| *state = SignalState::Armed);
    }

    /// Disarm, dropping any pending completion
    #[inline]
    pub fn disarm(&self) {
        self.state.with(|state| *state = SignalState::Idle);
    }

    /// Raise the signal. Safe to call from interrupt context; never blocks.
    ///
    /// Returns `true` if this call raised it, `false` if it was ignored
    /// (already raised, or not armed).
    pub fn complete(&self, status: TransferStatus, items: usize) -> bool {
        self.state.with(|state| match state {
            SignalState::Armed => {
                *state = SignalState::Raised(ChunkCompletion { status, items });
                true
            }
            SignalState::Idle | SignalState::Raised(_) => false,
        })
    }

    /// Consume a pending completion
    #[inline]
    pub fn take(&self) -> Option<ChunkCompletion> {
        self.state.with(|state| match *state {
            SignalState::Raised(completion) => {
                *state = SignalState::Idle;
                Some(completion)
            }
            SignalState::Idle | SignalState::Armed => None,
        })
    }

    /// Consume a pending completion, or disarm if none arrived.
    ///
    /// Both happen under one critical section, so a callback racing with this
    /// call either lands in the result or is ignored afterwards.
    pub fn take_or_disarm(&self) -> Option<ChunkCompletion> {
        self.state.with(|state| {
            let pending = match *state {
                SignalState::Raised(completion) => Some(completion),
                SignalState::Idle | SignalState::Armed => None,
            };
            *state = SignalState::Idle;
            pending
        })
    }

    /// Check for a pending completion without consuming it
    pub fn is_pending(&self) -> bool {
        self.state
            .with_ref(|state| matches!(state, SignalState::Raised(_)))
    }

    /// Check whether a chunk is outstanding
    pub fn is_armed(&self) -> bool {
        self.state.with_ref(|state| *state == SignalState::Armed)
    }

    /// Wait for the completion, yielding between polls.
    ///
    /// # Errors
    ///
    /// [`IoError::Timeout`](crate::IoError::Timeout) after `limit` yields.
    pub fn wait<Y: Yielder + ?Sized>(&self, yielder: &Y, limit: Option<u32>) -> IoResult<ChunkCompletion> {
        poll_until(limit, || yielder.yield_now(), || self.take())
    }
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}
