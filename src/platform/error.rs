//! Platform error types
//!
//! This module defines error types for platform and storage operations.

use core::fmt;

/// Result type for platform operations
pub type Result<T> = core::result::Result<T, PlatformError>;

/// Platform-level errors
///
/// All platform implementations map their HAL-specific errors to these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlatformError {
    /// Flash operation failed
    Flash(FlashError),
    /// Invalid configuration provided
    InvalidConfig,
}

/// Flash-specific errors
///
/// None of these is ever retried. A failed erase/program leaves the sector in an
/// unknown state; recovery means re-running the whole write with a freshly built
/// staging image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Erase operation failed
    EraseFailed,
    /// Write operation failed
    WriteFailed,
    /// Read operation failed
    ReadFailed,
    /// Invalid address (out of bounds or misaligned for a raw primitive)
    InvalidAddress,
    /// Write span does not fit inside one sector
    CrossesSectorBoundary,
    /// Executing code resides in the flash range about to be mutated
    SelfDestructionRisk,
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::Flash(e) => write!(f, "Flash error: {}", e),
            PlatformError::InvalidConfig => write!(f, "Invalid configuration"),
        }
    }
}

impl fmt::Display for FlashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlashError::EraseFailed => write!(f, "sector erase failed"),
            FlashError::WriteFailed => write!(f, "sector program failed"),
            FlashError::ReadFailed => write!(f, "flash read failed"),
            FlashError::InvalidAddress => write!(f, "address out of range"),
            FlashError::CrossesSectorBoundary => write!(f, "write crosses a sector boundary"),
            FlashError::SelfDestructionRisk => {
                write!(f, "refusing to modify flash the running code executes from")
            }
        }
    }
}

// From implementations for error conversion
impl From<FlashError> for PlatformError {
    fn from(error: FlashError) -> Self {
        PlatformError::Flash(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_error_converts_into_platform_error() {
        let err: PlatformError = FlashError::SelfDestructionRisk.into();
        assert_eq!(err, PlatformError::Flash(FlashError::SelfDestructionRisk));
    }

    #[test]
    fn test_display_names_the_flash_failure() {
        let err = PlatformError::from(FlashError::CrossesSectorBoundary);
        assert_eq!(
            format!("{}", err),
            "Flash error: write crosses a sector boundary"
        );
    }
}
