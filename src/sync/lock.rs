//! Binary bus lock.
//!
//! The engine owns two of these: the transaction lock, held from
//! `begin_transaction` until the [`Transaction`](crate::Transaction) guard is
//! dropped, and the operation lock, held for the duration of one byte
//! exchange or one chunked bulk transfer.
//!
//! The lock has no owner tracking and no priority inheritance. Re-acquiring
//! it from the holder waits forever (or until the configured limit); use
//! [`BusLock::try_lock`] where re-entry is possible. A waiter lets the holder
//! run only through its [`Yielder`], so on a preemptive scheduler that yielder
//! must suspend the task; [`Spin`](crate::hal::Spin) there starves a
//! lower-priority holder.

use super::primitives::{CriticalSectionCell, poll_until};
use crate::driver::error::IoResult;
use crate::hal::Yielder;

/// Binary lock that parks waiters through a [`Yielder`]
pub struct BusLock {
    locked: CriticalSectionCell<bool>,
}

impl BusLock {
    /// Create an unlocked lock (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            locked: CriticalSectionCell::new(false),
        }
    }

    /// Acquire the lock if it is free
    #[inline]
    pub fn try_lock(&self) -> bool {
        self.locked.with(|locked| !core::mem::replace(locked, true))
    }

    /// Acquire the lock, yielding while another holder has it.
    ///
    /// # Errors
    ///
    /// [`IoError::Timeout`](crate::IoError::Timeout) once `limit` yields have
    /// passed without the lock becoming free.
    pub fn lock<Y: Yielder + ?Sized>(&self, yielder: &Y, limit: Option<u32>) -> IoResult<()> {
        poll_until(limit, || yielder.yield_now(), || self.try_lock().then_some(()))
    }

    /// Release the lock. Releasing a free lock is a no-op.
    #[inline]
    pub fn unlock(&self) {
        self.locked.with(|locked| *locked = false);
    }

    /// Check whether someone holds the lock
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.with_ref(|locked| *locked)
    }
}

impl Default for BusLock {
    fn default() -> Self {
        Self::new()
    }
}
