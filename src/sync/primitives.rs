//! Synchronization primitives for ISR-safe access.
//!
//! Low-level building block shared by the bus locks, the completion signal
//! and the engine state.

use core::cell::RefCell;
use critical_section::Mutex;

use crate::driver::error::{IoError, IoResult};

/// Cell providing interior mutability with critical section protection.
///
/// Combines `critical_section::Mutex` with `RefCell` for safe mutable access
/// from both task code and interrupt handlers.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Execute a closure with exclusive mutable access.
    ///
    /// Interrupts are disabled for the duration of the closure.
    ///
    /// # Panics
    ///
    /// Panics if the closure re-enters `with` on the same cell.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Execute a closure with immutable access.
    #[inline]
    pub fn with_ref<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        critical_section::with(|cs| {
            let value = self.inner.borrow_ref(cs);
            f(&value)
        })
    }
}

// SAFETY: every access goes through a critical section, so the value is only
// ever touched by one context at a time; `T: Send` lets it move between them.
unsafe impl<T: Send> Sync for CriticalSectionCell<T> {}

/// Poll `poll` until it yields a value, calling `relax` between attempts.
///
/// Gives up with [`IoError::Timeout`] after `limit` relaxes; `None` polls
/// forever.
pub(crate) fn poll_until<T>(
    limit: Option<u32>,
    mut relax: impl FnMut(),
    mut poll: impl FnMut() -> Option<T>,
) -> IoResult<T> {
    let mut polls = 0u32;
    loop {
        if let Some(value) = poll() {
            return Ok(value);
        }
        if limit.is_some_and(|max| polls >= max) {
            return Err(IoError::Timeout);
        }
        relax();
        polls = polls.saturating_add(1);
    }
}
