//! Configuration structs for capture sessions and the protocol decoder.

use serde::{Deserialize, Serialize};

use crate::pins::{DataBus, PinId};

/// Nominal BT.656 sample clock in Hz (one byte per cycle).
pub const PIXEL_CLOCK_HZ: u32 = 27_000_000;

/// Total lines per 625-line (PAL) frame, blanking included.
pub const PAL_TOTAL_LINES: u16 = 625;
/// Active lines per 625-line frame.
pub const PAL_ACTIVE_LINES: u16 = 576;
/// Active luma samples per 625-line scan line.
pub const PAL_ACTIVE_SAMPLES: u16 = 720;
/// Total luma samples per 625-line scan line, blanking included.
pub const PAL_TOTAL_SAMPLES: u16 = 864;

/// Default ring-buffer capacity in bytes.
pub const DEFAULT_RING_CAPACITY: usize = 1024;

/// How the capture producer is driven.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaptureMode {
    /// An edge-triggered interrupt bound to the sample-clock pin drives
    /// the edge path directly.
    #[default]
    Interrupt,
    /// The caller drives `poll()` from a fast loop; edges are detected
    /// against the previously observed clock level.
    Polling,
}

/// Immutable per-session capture configuration.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Data lanes, bus bit 0 first. Unwired lanes read zero.
    pub bus: DataBus,
    /// Sample-clock pin; one byte is captured per qualifying edge.
    pub clock: PinId,
    /// Ring-buffer capacity in bytes. Must be non-zero.
    pub capacity: usize,
    pub mode: CaptureMode,
    /// Emit full configuration and final-statistics dumps at debug level.
    pub verbose: bool,
}

impl Default for CaptureConfig {
    /// Placeholder topology: nothing wired, 1 KiB ring, interrupt mode.
    fn default() -> Self {
        Self {
            bus: DataBus::unwired(),
            clock: PinId(0),
            capacity: DEFAULT_RING_CAPACITY,
            mode: CaptureMode::Interrupt,
            verbose: false,
        }
    }
}

/// Protocol decoder configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Expected active width in luma samples. Pixels emitted at columns
    /// at or past this are counted as data errors.
    pub expected_width: u16,
    /// Active lines the stream is expected to carry per frame.
    pub expected_height: u16,
    /// Convert assembled pixels to RGB and fire the RGB callback too.
    pub rgb_conversion: bool,
}

impl DecoderConfig {
    /// 625-line system geometry (720x576 active).
    pub const PAL: Self = Self {
        expected_width: PAL_ACTIVE_SAMPLES,
        expected_height: PAL_ACTIVE_LINES,
        rgb_conversion: true,
    };

    /// 525-line system geometry (720x480 active).
    pub const NTSC: Self = Self {
        expected_width: 720,
        expected_height: 480,
        rgb_conversion: true,
    };
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self::PAL
    }
}
