//! `bt656-decode` -- BT.656 protocol decoding for captured byte streams.
//!
//! This crate turns the raw bytes a capture session produces into video
//! structure:
//!
//! - **Decoder**: the `FF 00 00 <control>` timing-reference automaton,
//!   frame/line boundary detection and 4:2:2 pixel assembly
//! - **Convert**: fixed-point BT.601 YCbCr to RGB conversion suitable
//!   for the capture path's no-allocation discipline
//!
//! The decoder implements [`bt656_common::ByteSink`], so it can be
//! attached directly to a `bt656-capture` session or fed from a drained
//! buffer.

pub mod convert;
pub mod decoder;

// Re-export commonly used items at crate root
pub use convert::{ycbcr_to_rgb, ycbcr_to_rgb565};
pub use decoder::{Bt656Decoder, DataPhase, DecoderState, DecoderStats};
