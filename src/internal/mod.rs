//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`constants`]: DMA limits, bus defaults and dummy patterns
//!
//! Public constants are re-exported through the crate-level `constants` module.

pub(crate) mod constants;
