//! Wait strategies for callers parked on the bus.
//!
//! A [`Yielder`] decides what a task does while it waits for a lock or for a
//! DMA chunk in [`WaitMode::Yield`](crate::WaitMode::Yield): hand the CPU to
//! the RTOS scheduler, sleep for a few microseconds, or simply spin.

use embedded_hal::delay::DelayNs;

/// Default pause used by [`DelayYield`] between polls, in microseconds
pub const DEFAULT_YIELD_US: u32 = 10;

/// Gives up the CPU for one poll iteration
pub trait Yielder {
    /// Let other tasks run before the next poll
    fn yield_now(&self);
}

/// Pure spin: emits a spin-loop hint and returns.
///
/// Suitable for bare-metal code without a scheduler, or cooperative
/// schedulers where the lock holder cannot be preempted. Under a preemptive
/// RTOS a spinning high-priority waiter keeps a lower-priority lock holder
/// from ever running.
#[derive(Debug, Clone, Copy, Default)]
pub struct Spin;

impl Yielder for Spin {
    #[inline]
    fn yield_now(&self) {
        core::hint::spin_loop();
    }
}

/// Sleeps a fixed interval per poll using an `embedded_hal` delay.
///
/// With an RTOS-backed `DelayNs` (one that blocks the task rather than
/// spinning) this lets lower-priority tasks run while DMA is in flight.
/// The delay is cloned for every poll, so `D` should be a cheap handle such
/// as a HAL `Delay`.
#[derive(Debug, Clone)]
pub struct DelayYield<D: DelayNs + Clone> {
    delay: D,
    interval_us: u32,
}

impl<D: DelayNs + Clone> DelayYield<D> {
    /// Create a yielder sleeping [`DEFAULT_YIELD_US`] per poll
    pub const fn new(delay: D) -> Self {
        Self::with_interval_us(delay, DEFAULT_YIELD_US)
    }

    /// Create a yielder with a custom interval
    pub const fn with_interval_us(delay: D, interval_us: u32) -> Self {
        Self {
            delay,
            interval_us,
        }
    }

    /// Interval slept per poll
    pub fn interval_us(&self) -> u32 {
        self.interval_us
    }
}

impl<D: DelayNs + Clone> Yielder for DelayYield<D> {
    fn yield_now(&self) {
        self.delay.clone().delay_us(self.interval_us);
    }
}

impl<Y: Yielder + ?Sized> Yielder for &Y {
    #[inline]
    fn yield_now(&self) {
        (**self).yield_now();
    }
}
