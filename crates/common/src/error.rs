//! Central error types for the engine (thiserror-based).
//!
//! Only configuration-time failures are errors. Steady-state losses
//! (ring overflow, timing desync) are counted in statistics because the
//! producer path is not allowed to raise or block.

use thiserror::Error;

use crate::pins::PinId;

/// Capture-session errors. All are synchronous and fatal to the session.
#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("pin {pin} outside the platform range 0..={limit}")]
    InvalidPinConfiguration { pin: PinId, limit: u8 },

    #[error("ring capacity must be non-zero")]
    InvalidCapacity,

    #[error("failed to allocate {requested}-byte ring buffer")]
    AllocationFailure { requested: usize },

    #[error("clock pin {pin} is already bound to an active capture session")]
    ClockPinBusy { pin: PinId },

    #[error("capture session is not configured")]
    NotConfigured,

    #[error("operation requires a stopped capture session")]
    AlreadyRunning,
}

/// Protocol decoder errors.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("invalid expected geometry {width}x{height}")]
    InvalidGeometry { width: u16, height: u16 },
}

/// Convenience Result type for capture operations.
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Convenience Result type for decoder operations.
pub type DecodeResult<T> = Result<T, DecodeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_error_display() {
        let err = CaptureError::InvalidPinConfiguration {
            pin: PinId(99),
            limit: 39,
        };
        assert_eq!(err.to_string(), "pin P99 outside the platform range 0..=39");

        let err = CaptureError::ClockPinBusy { pin: PinId(4) };
        assert!(err.to_string().contains("P4"));

        let err = CaptureError::AllocationFailure { requested: 4096 };
        assert!(err.to_string().contains("4096"));
    }

    #[test]
    fn decode_error_display() {
        let err = DecodeError::InvalidGeometry {
            width: 0,
            height: 576,
        };
        assert_eq!(err.to_string(), "invalid expected geometry 0x576");
    }
}
