//! BT.656 protocol decoder.
//!
//! A byte-at-a-time finite-state machine that recognizes the embedded
//! `FF 00 00 <control>` timing references, decodes frame/line/active-video
//! boundaries from the control byte, and assembles 4:2:2 YCbCr pixels
//! between SAV and the next timing reference. Observers register at most
//! one callback per event kind; all callbacks run synchronously in
//! whichever context feeds the decoder and must not block.
//!
//! The decoder is driven either from a capture session's edge path (it
//! implements [`ByteSink`]) or from a consumer draining the ring; never
//! both at once, since the automaton has no internal locking.

use std::fmt;
use std::time::Instant;

use tracing::debug;

use bt656_common::{
    ByteSink, DecodeError, DecodeResult, DecoderConfig, RgbPixel, SyncSignals, YCbCrPixel,
};

use crate::convert::ycbcr_to_rgb;

/// First byte of a timing reference.
pub const TIMING_REF_START: u8 = 0xFF;
/// Second and third bytes of a timing reference.
pub const TIMING_REF_FILL: u8 = 0x00;

// ---------------------------------------------------------------------------
// Automaton states
// ---------------------------------------------------------------------------

/// Timing-reference recognition state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DecoderState {
    /// Blanking or unsynchronized; bytes are ignored until an `FF`.
    #[default]
    Idle,
    /// Matched `FF`.
    SawFf,
    /// Matched `FF 00`.
    SawFf00,
    /// Matched `FF 00 00`; the next byte is the control byte.
    SawFf0000,
    /// Control byte under decode; transient within one `process_byte`.
    ControlByte,
    /// Between SAV and the next timing reference; bytes are pixel data.
    ActiveVideo,
}

impl fmt::Display for DecoderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Idle => "idle",
            Self::SawFf => "saw-ff",
            Self::SawFf00 => "saw-ff00",
            Self::SawFf0000 => "saw-ff0000",
            Self::ControlByte => "control-byte",
            Self::ActiveVideo => "active-video",
        })
    }
}

/// 4:2:2 sample phase inside an active-video window.
///
/// Two luma samples share one chroma pair, so a pixel completes only on
/// the `Cr` byte.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum DataPhase {
    #[default]
    Y1,
    Cb,
    Y2,
    Cr,
}

impl fmt::Display for DataPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Y1 => "y1",
            Self::Cb => "cb",
            Self::Y2 => "y2",
            Self::Cr => "cr",
        })
    }
}

/// Point-in-time copy of the decoder counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderStats {
    /// Vertical-sync rising edges seen.
    pub frames: u64,
    /// Horizontal-sync rising edges seen.
    pub lines: u64,
    /// Pixels assembled and emitted.
    pub pixels: u64,
    /// Partial timing-reference matches abandoned.
    pub timing_errors: u64,
    /// Control bytes without the mandatory MSB.
    pub sync_errors: u64,
    /// Pixels emitted at columns past the expected width.
    pub data_errors: u64,
    /// Microseconds from decoder creation to the most recent frame start.
    pub last_frame_micros: u64,
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

type PixelCallback = Box<dyn FnMut(YCbCrPixel, u16, u16) + Send>;
type RgbCallback = Box<dyn FnMut(RgbPixel, u16, u16) + Send>;
type FrameCallback = Box<dyn FnMut() + Send>;
type LineCallback = Box<dyn FnMut(u16) + Send>;

/// The BT.656 protocol state machine.
///
/// Created once per stream, reset on demand, never torn down per frame.
/// Feed it bytes with [`process_byte`](Self::process_byte) (or as a
/// [`ByteSink`] attached to a capture session) and observe frames, lines
/// and pixels through the registered callbacks.
///
/// Malformed sequences are not hard errors: the automaton falls back to
/// [`DecoderState::Idle`] and counts the loss. Every line and frame
/// boundary passes through the partial-match states in normal operation.
pub struct Bt656Decoder {
    config: DecoderConfig,
    state: DecoderState,
    phase: DataPhase,
    /// Sync flags from the previous control byte, for edge detection.
    sync: SyncSignals,
    /// In-flight pixel accumulator.
    pixel: YCbCrPixel,
    frame_started: bool,
    line: u16,
    column: u16,
    stats: DecoderStats,
    epoch: Instant,
    on_pixel: Option<PixelCallback>,
    on_rgb: Option<RgbCallback>,
    on_frame: Option<FrameCallback>,
    on_line: Option<LineCallback>,
}

impl Bt656Decoder {
    /// Decoder for the given stream geometry.
    ///
    /// # Errors
    ///
    /// [`DecodeError::InvalidGeometry`] when the expected width or height
    /// is zero.
    pub fn new(config: DecoderConfig) -> DecodeResult<Self> {
        if config.expected_width == 0 || config.expected_height == 0 {
            return Err(DecodeError::InvalidGeometry {
                width: config.expected_width,
                height: config.expected_height,
            });
        }
        debug!(
            width = config.expected_width,
            height = config.expected_height,
            rgb = config.rgb_conversion,
            "Protocol decoder created"
        );
        Ok(Self {
            config,
            state: DecoderState::Idle,
            phase: DataPhase::Y1,
            sync: SyncSignals::default(),
            pixel: YCbCrPixel::default(),
            frame_started: false,
            line: 0,
            column: 0,
            stats: DecoderStats::default(),
            epoch: Instant::now(),
            on_pixel: None,
            on_rgb: None,
            on_frame: None,
            on_line: None,
        })
    }

    // -- Observer registration (one per event kind, overwritable) --

    /// Register the YCbCr pixel observer, `(pixel, column, line)`.
    pub fn on_pixel<F>(&mut self, callback: F)
    where
        F: FnMut(YCbCrPixel, u16, u16) + Send + 'static,
    {
        self.on_pixel = Some(Box::new(callback));
    }

    /// Register the RGB pixel observer. Only invoked when the
    /// configuration enables RGB conversion.
    pub fn on_rgb<F>(&mut self, callback: F)
    where
        F: FnMut(RgbPixel, u16, u16) + Send + 'static,
    {
        self.on_rgb = Some(Box::new(callback));
    }

    /// Register the frame-boundary observer, invoked on each
    /// vertical-sync rising edge.
    pub fn on_frame_start<F>(&mut self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.on_frame = Some(Box::new(callback));
    }

    /// Register the line-boundary observer.
    ///
    /// Invoked on each horizontal-sync rising edge with the line index
    /// *before* the line counter advances, so observers can index into a
    /// fixed-size frame buffer.
    pub fn on_line_start<F>(&mut self, callback: F)
    where
        F: FnMut(u16) + Send + 'static,
    {
        self.on_line = Some(Box::new(callback));
    }

    // -- Byte supply --

    /// Advance the automaton by one byte.
    pub fn process_byte(&mut self, byte: u8) {
        match self.state {
            DecoderState::Idle => {
                // Blanking data; only the reference preamble matters.
                if byte == TIMING_REF_START {
                    self.state = DecoderState::SawFf;
                }
            }
            DecoderState::SawFf => match byte {
                TIMING_REF_FILL => self.state = DecoderState::SawFf00,
                // A repeated FF re-arms the match; the abandoned one is
                // counted as a timing error.
                TIMING_REF_START => self.stats.timing_errors += 1,
                _ => self.desync(),
            },
            DecoderState::SawFf00 => match byte {
                TIMING_REF_FILL => self.state = DecoderState::SawFf0000,
                TIMING_REF_START => {
                    self.stats.timing_errors += 1;
                    self.state = DecoderState::SawFf;
                }
                _ => self.desync(),
            },
            DecoderState::SawFf0000 => {
                self.state = DecoderState::ControlByte;
                self.apply_control(byte);
            }
            DecoderState::ControlByte => {
                // Not reachable between calls: apply_control always leaves
                // this state before process_byte returns.
                self.desync();
            }
            DecoderState::ActiveVideo => {
                if byte == TIMING_REF_START {
                    // Reference code words are never pixel data.
                    self.state = DecoderState::SawFf;
                } else {
                    self.advance_phase(byte);
                }
            }
        }
    }

    /// Feed a whole captured slice through the automaton.
    pub fn process_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.process_byte(byte);
        }
    }

    // -- Lifecycle --

    /// Return to `Idle` with a clean accumulator.
    ///
    /// Callbacks and statistics survive; use
    /// [`reset_stats`](Self::reset_stats) to clear the counters.
    pub fn reset(&mut self) {
        self.state = DecoderState::Idle;
        self.phase = DataPhase::Y1;
        self.sync = SyncSignals::default();
        self.pixel = YCbCrPixel::default();
        self.frame_started = false;
        self.line = 0;
        self.column = 0;
        debug!("Protocol decoder reset");
    }

    /// Zero the decoder counters.
    pub fn reset_stats(&mut self) {
        self.stats = DecoderStats::default();
    }

    // -- Accessors --

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn phase(&self) -> DataPhase {
        self.phase
    }

    /// Sync flags decoded from the most recent control byte.
    pub fn sync(&self) -> SyncSignals {
        self.sync
    }

    /// Line counter; the y coordinate the next pixel will carry.
    pub fn current_line(&self) -> u16 {
        self.line
    }

    /// Column counter; the x coordinate the next pixel will carry.
    pub fn current_column(&self) -> u16 {
        self.column
    }

    /// Whether a vertical-sync rising edge has been seen since the last
    /// reset.
    pub fn frame_active(&self) -> bool {
        self.frame_started
    }

    pub fn config(&self) -> DecoderConfig {
        self.config
    }

    pub fn stats(&self) -> DecoderStats {
        self.stats
    }

    // -- Internals --

    /// Abandon a partial timing-reference match.
    fn desync(&mut self) {
        self.stats.timing_errors += 1;
        self.state = DecoderState::Idle;
    }

    /// Decode one control byte and fire the boundary events its sync
    /// edges imply.
    fn apply_control(&mut self, byte: u8) {
        // The protocol requires the MSB; a clear MSB is counted but the
        // remaining bits are still honored.
        if !SyncSignals::well_formed(byte) {
            self.stats.sync_errors += 1;
        }
        let sync = SyncSignals::from_control_byte(byte);

        if sync.vsync && !self.sync.vsync {
            self.frame_started = true;
            self.line = 0;
            self.column = 0;
            self.stats.frames += 1;
            self.stats.last_frame_micros = self.epoch.elapsed().as_micros() as u64;
            if let Some(callback) = self.on_frame.as_mut() {
                callback();
            }
        }

        if sync.hsync && !self.sync.hsync {
            self.column = 0;
            self.stats.lines += 1;
            // The observer gets the pre-increment index.
            if let Some(callback) = self.on_line.as_mut() {
                callback(self.line);
            }
            self.line = self.line.wrapping_add(1);
        }

        if sync.sav {
            self.phase = DataPhase::Y1;
            self.column = 0;
            self.state = DecoderState::ActiveVideo;
        } else {
            self.state = DecoderState::Idle;
        }
        self.sync = sync;
    }

    /// Advance the 4:2:2 phase cycle by one active-video byte.
    fn advance_phase(&mut self, byte: u8) {
        match self.phase {
            DataPhase::Y1 => {
                self.pixel.y = byte;
                self.phase = DataPhase::Cb;
            }
            DataPhase::Cb => {
                self.pixel.cb = byte;
                self.phase = DataPhase::Y2;
            }
            DataPhase::Y2 => {
                self.pixel.y = byte;
                self.phase = DataPhase::Cr;
            }
            DataPhase::Cr => {
                self.pixel.cr = byte;
                self.emit_pixel();
                self.phase = DataPhase::Y1;
            }
        }
    }

    /// Hand the completed pixel to the observers and advance the column.
    fn emit_pixel(&mut self) {
        if self.column >= self.config.expected_width {
            self.stats.data_errors += 1;
        }
        let pixel = self.pixel;
        if let Some(callback) = self.on_pixel.as_mut() {
            callback(pixel, self.column, self.line);
        }
        if self.config.rgb_conversion {
            if let Some(callback) = self.on_rgb.as_mut() {
                callback(ycbcr_to_rgb(pixel), self.column, self.line);
            }
        }
        self.stats.pixels += 1;
        self.column = self.column.wrapping_add(1);
    }
}

impl fmt::Debug for Bt656Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bt656Decoder")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("line", &self.line)
            .field("column", &self.column)
            .field("stats", &self.stats)
            .finish()
    }
}

/// Lets a capture session feed the decoder from its edge path.
impl ByteSink for Bt656Decoder {
    fn process_byte(&mut self, byte: u8) {
        Bt656Decoder::process_byte(self, byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt656_common::sync::{CONTROL_MSB, HSYNC_BIT, SAV_BIT, VSYNC_BIT};

    fn decoder() -> Bt656Decoder {
        Bt656Decoder::new(DecoderConfig::PAL).unwrap()
    }

    fn control(vsync: bool, hsync: bool, sav: bool) -> u8 {
        let mut byte = CONTROL_MSB;
        if vsync {
            byte |= VSYNC_BIT;
        }
        if hsync {
            byte |= HSYNC_BIT;
        }
        if sav {
            byte |= SAV_BIT;
        }
        byte
    }

    #[test]
    fn rejects_zero_geometry() {
        let bad = DecoderConfig {
            expected_width: 0,
            ..DecoderConfig::PAL
        };
        assert!(matches!(
            Bt656Decoder::new(bad),
            Err(DecodeError::InvalidGeometry { width: 0, .. })
        ));

        let bad = DecoderConfig {
            expected_height: 0,
            ..DecoderConfig::PAL
        };
        assert!(Bt656Decoder::new(bad).is_err());
    }

    #[test]
    fn fresh_decoder_is_idle() {
        let dec = decoder();
        assert_eq!(dec.state(), DecoderState::Idle);
        assert_eq!(dec.phase(), DataPhase::Y1);
        assert!(!dec.frame_active());
        assert_eq!(dec.stats(), DecoderStats::default());
    }

    #[test]
    fn preamble_walks_the_match_states() {
        let mut dec = decoder();
        dec.process_byte(0xFF);
        assert_eq!(dec.state(), DecoderState::SawFf);
        dec.process_byte(0x00);
        assert_eq!(dec.state(), DecoderState::SawFf00);
        dec.process_byte(0x00);
        assert_eq!(dec.state(), DecoderState::SawFf0000);

        // EAV control byte: back to blanking.
        dec.process_byte(control(false, false, false));
        assert_eq!(dec.state(), DecoderState::Idle);
        assert_eq!(dec.stats().timing_errors, 0);
    }

    #[test]
    fn sav_control_enters_active_video() {
        let mut dec = decoder();
        dec.process_bytes(&[0xFF, 0x00, 0x00, control(false, false, true)]);
        assert_eq!(dec.state(), DecoderState::ActiveVideo);
        assert_eq!(dec.phase(), DataPhase::Y1);
        assert_eq!(dec.current_column(), 0);
    }

    #[test]
    fn deviation_mid_match_counts_and_idles() {
        let mut dec = decoder();
        dec.process_bytes(&[0xFF, 0x00, 0x37]);
        assert_eq!(dec.state(), DecoderState::Idle);
        assert_eq!(dec.stats().timing_errors, 1);

        dec.process_bytes(&[0xFF, 0x42]);
        assert_eq!(dec.state(), DecoderState::Idle);
        assert_eq!(dec.stats().timing_errors, 2);
    }

    #[test]
    fn repeated_ff_rearms_the_match() {
        let mut dec = decoder();
        dec.process_bytes(&[0xFF, 0xFF]);
        assert_eq!(dec.state(), DecoderState::SawFf);
        assert_eq!(dec.stats().timing_errors, 1);

        // The re-armed match still completes.
        dec.process_bytes(&[0x00, 0x00, control(false, false, true)]);
        assert_eq!(dec.state(), DecoderState::ActiveVideo);
    }

    #[test]
    fn malformed_control_byte_counts_sync_error() {
        let mut dec = decoder();
        // MSB clear but vsync bit set: counted, bits still honored.
        dec.process_bytes(&[0xFF, 0x00, 0x00, VSYNC_BIT]);
        let stats = dec.stats();
        assert_eq!(stats.sync_errors, 1);
        assert_eq!(stats.frames, 1);
        assert!(dec.sync().vsync);
    }

    #[test]
    fn sync_accessor_tracks_last_control() {
        let mut dec = decoder();
        dec.process_bytes(&[0xFF, 0x00, 0x00, control(true, true, true)]);
        let sync = dec.sync();
        assert!(sync.vsync && sync.hsync && sync.sav);
        assert!(!sync.eav());

        dec.process_bytes(&[0xFF, 0x00, 0x00, control(true, false, false)]);
        let sync = dec.sync();
        assert!(sync.vsync && !sync.hsync);
        assert!(sync.eav());
    }

    #[test]
    fn reset_clears_automaton_but_not_stats() {
        let mut dec = decoder();
        dec.process_bytes(&[0xFF, 0x00, 0x00, control(true, true, true), 1, 2]);
        assert_eq!(dec.state(), DecoderState::ActiveVideo);
        assert!(dec.frame_active());
        let frames_before = dec.stats().frames;

        dec.reset();
        assert_eq!(dec.state(), DecoderState::Idle);
        assert_eq!(dec.phase(), DataPhase::Y1);
        assert!(!dec.frame_active());
        assert_eq!(dec.current_line(), 0);
        assert_eq!(dec.stats().frames, frames_before);

        dec.reset_stats();
        assert_eq!(dec.stats(), DecoderStats::default());
    }

    #[test]
    fn state_names_render() {
        assert_eq!(DecoderState::Idle.to_string(), "idle");
        assert_eq!(DecoderState::SawFf0000.to_string(), "saw-ff0000");
        assert_eq!(DecoderState::ActiveVideo.to_string(), "active-video");
        assert_eq!(DataPhase::Y1.to_string(), "y1");
        assert_eq!(DataPhase::Cr.to_string(), "cr");
    }
}
