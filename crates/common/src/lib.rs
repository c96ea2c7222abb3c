//! `bt656-common` -- Shared types, traits, and errors for the BT.656 capture stack.
//!
//! This crate is the foundation that the capture and decode crates depend on.
//! It defines the core abstractions:
//!
//! - **Pins**: `PinId`, `DataBus` (bus wiring newtypes)
//! - **Sync**: `SyncSignals` and the control-byte bit layout
//! - **Pixels**: `YCbCrPixel`, `RgbPixel` (sample and output formats)
//! - **HAL**: `InputBank` (platform pin-bank abstraction)
//! - **Sinks**: `ByteSink` (captured-byte consumer interface)
//! - **Errors**: `CaptureError`, `DecodeError` (thiserror-based)
//! - **Config**: `CaptureConfig`, `DecoderConfig` and the PAL timing constants

pub mod config;
pub mod error;
pub mod hal;
pub mod pins;
pub mod pixel;
pub mod sink;
pub mod sync;

// Re-export commonly used items at crate root
pub use config::{
    CaptureConfig, CaptureMode, DecoderConfig, DEFAULT_RING_CAPACITY, PAL_ACTIVE_LINES,
    PAL_ACTIVE_SAMPLES, PAL_TOTAL_LINES, PAL_TOTAL_SAMPLES, PIXEL_CLOCK_HZ,
};
pub use error::{CaptureError, CaptureResult, DecodeError, DecodeResult};
pub use hal::InputBank;
pub use pins::{DataBus, PinId};
pub use pixel::{RgbPixel, YCbCrPixel};
pub use sink::ByteSink;
pub use sync::SyncSignals;
