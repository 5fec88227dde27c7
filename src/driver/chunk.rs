//! Chunking of bulk transfers into DMA-sized pieces.

use crate::internal::constants::DMA_MAX_TRANSFER_SIZE;

/// Length of the next chunk: `min(max, total - transferred)`.
///
/// Returns 0 once `transferred` reaches (or passes) `total`.
#[inline]
pub const fn next_chunk_len(transferred: usize, total: usize, max: usize) -> usize {
    let remaining = total.saturating_sub(transferred);
    if remaining >= max { max } else { remaining }
}

/// [`next_chunk_len`] bounded by [`DMA_MAX_TRANSFER_SIZE`].
#[inline]
pub const fn next_dma_transfer_size(transferred: usize, total: usize) -> usize {
    next_chunk_len(transferred, total, DMA_MAX_TRANSFER_SIZE)
}

/// Iterator over the `(offset, len)` chunks covering `total` bytes.
///
/// Offsets step by `max`; every chunk except possibly the last is exactly
/// `max` bytes long.
#[derive(Debug, Clone)]
pub struct Chunks {
    transferred: usize,
    total: usize,
    max: usize,
}

impl Chunks {
    /// Chunks of at most `max` bytes over `total` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `max` is zero.
    pub const fn new(total: usize, max: usize) -> Self {
        assert!(max > 0, "chunk size must be non-zero");
        Self {
            transferred: 0,
            total,
            max,
        }
    }
}

impl Iterator for Chunks {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let len = next_chunk_len(self.transferred, self.total, self.max);
        if len == 0 {
            return None;
        }
        let offset = self.transferred;
        self.transferred += len;
        Some((offset, len))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total.saturating_sub(self.transferred).div_ceil(self.max);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Chunks {}

impl core::iter::FusedIterator for Chunks {}
