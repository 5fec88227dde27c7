//! Error types for the SPI transfer engine
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Peripheral initialization and settings failures
//! - [`DmaError`]: Chunk dispatch and completion failures
//! - [`IoError`]: Waiting on the bus (timeouts, contention)
//!
//! The unified [`Error`] enum wraps all domain errors and is returned
//! by every fallible engine method.
//!
//! Calling a transfer on an engine that was never started with `begin()` is
//! *not* an error: it is a silent no-op.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Peripheral initialization and settings errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The underlying driver refused to initialize the peripheral
    InitFailed,
    /// The requested settings cannot be applied (e.g. zero clock rate)
    InvalidSettings,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InitFailed => "peripheral initialization failed",
            ConfigError::InvalidSettings => "invalid transfer settings",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// Chunk dispatch and completion errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// The driver refused to start a chunk transfer
    StartFailed,
    /// The completion callback reported a hardware failure
    TransferFailed,
    /// The completion callback reported fewer bytes than the chunk length
    Incomplete,
    /// Transmit and receive buffers differ in length
    LengthMismatch,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::StartFailed => "DMA transfer could not be started",
            DmaError::TransferFailed => "DMA transfer failed",
            DmaError::Incomplete => "DMA transfer incomplete",
            DmaError::LengthMismatch => "buffer length mismatch",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Errors raised while waiting for the bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// A configured wait limit was exhausted
    Timeout,
    /// The bus is owned by another caller (non-waiting acquire only)
    Busy,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
            IoError::Busy => "bus busy",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// Match on the inner domain error for specific handling:
/// ```ignore
/// match result {
///     Err(Error::Dma(DmaError::TransferFailed)) => { /* retry */ }
///     Err(Error::Io(IoError::Timeout)) => { /* reset peripheral */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

impl core::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

impl embedded_hal::spi::Error for Error {
    fn kind(&self) -> embedded_hal::spi::ErrorKind {
        embedded_hal::spi::ErrorKind::Other
    }
}

/// Result type alias for engine operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;
    use std::format;

    use super::*;

    #[test]
    fn config_error_as_str_non_empty() {
        for variant in [ConfigError::InitFailed, ConfigError::InvalidSettings] {
            assert!(!variant.as_str().is_empty(), "ConfigError::{variant:?} has empty string");
        }
    }

    #[test]
    fn dma_error_as_str_non_empty() {
        let variants = [
            DmaError::StartFailed,
            DmaError::TransferFailed,
            DmaError::Incomplete,
            DmaError::LengthMismatch,
        ];

        for variant in variants {
            assert!(!variant.as_str().is_empty(), "DmaError::{variant:?} has empty string");
        }
    }

    #[test]
    fn io_error_display() {
        assert_eq!(format!("{}", IoError::Timeout), "operation timed out");
        assert_eq!(format!("{}", IoError::Busy), "bus busy");
    }

    #[test]
    fn unified_error_display_prefixes_domain() {
        assert_eq!(
            format!("{}", Error::from(ConfigError::InitFailed)),
            "config: peripheral initialization failed"
        );
        assert_eq!(
            format!("{}", Error::from(DmaError::TransferFailed)),
            "dma: DMA transfer failed"
        );
        assert_eq!(format!("{}", Error::from(IoError::Timeout)), "io: operation timed out");
    }

    #[test]
    fn from_impls_wrap_domain() {
        assert_eq!(Error::from(DmaError::Incomplete), Error::Dma(DmaError::Incomplete));
        assert_eq!(Error::from(IoError::Busy), Error::Io(IoError::Busy));
        assert_eq!(
            Error::from(ConfigError::InvalidSettings),
            Error::Config(ConfigError::InvalidSettings)
        );
    }

    #[test]
    fn question_mark_converts_domain_errors() {
        fn inner() -> Result<()> {
            Err(DmaError::StartFailed)?;
            Ok(())
        }

        assert_eq!(inner(), Err(Error::Dma(DmaError::StartFailed)));
    }

    #[test]
    fn embedded_hal_kind_is_other() {
        use embedded_hal::spi::{Error as _, ErrorKind};

        assert_eq!(Error::from(IoError::Timeout).kind(), ErrorKind::Other);
    }
}
