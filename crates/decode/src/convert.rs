//! YCbCr-to-RGB color space conversion.
//!
//! Converts the decoder's 4:2:2 samples to full-range RGB inline, once per
//! assembled pixel, so it must stay cheap: integer fixed-point only.
//!
//! # Color space
//!
//! Uses the **BT.601** matrix for limited-range (16-235 luma) YCbCr to
//! full-range RGB, the standard for SD content:
//!
//! ```text
//! R = 1.164 * (Y - 16) + 1.596 * (Cr - 128)
//! G = 1.164 * (Y - 16) - 0.392 * (Cb - 128) - 0.813 * (Cr - 128)
//! B = 1.164 * (Y - 16) + 2.017 * (Cb - 128)
//! ```
//!
//! Nominal black `(16, 128, 128)` maps to `(0, 0, 0)` and nominal white
//! `(235, 128, 128)` to `(255, 255, 255)`.

use bt656_common::{RgbPixel, YCbCrPixel};

// ---------------------------------------------------------------------------
// BT.601 fixed-point conversion constants
// ---------------------------------------------------------------------------

// Fixed-point arithmetic with 10 bits of fractional precision (multiply by
// 1024); +512 rounds before the shift.
//
//   R = 1.164 * (Y - 16) + 1.596 * (Cr - 128)
//   G = 1.164 * (Y - 16) - 0.392 * (Cb - 128) - 0.813 * (Cr - 128)
//   B = 1.164 * (Y - 16) + 2.017 * (Cb - 128)
const Y_SCALE: i32 = 1192; // 1.164 * 1024
const CR_TO_R: i32 = 1634; // 1.596 * 1024
const CB_TO_G: i32 = 401; // 0.392 * 1024
const CR_TO_G: i32 = 833; // 0.813 * 1024
const CB_TO_B: i32 = 2065; // 2.017 * 1024

/// Clamp an i32 value to the [0, 255] range and return as u8.
#[inline(always)]
fn clamp_u8(val: i32) -> u8 {
    val.clamp(0, 255) as u8
}

/// Convert one YCbCr sample to full-range RGB.
///
/// # Example
/// ```
/// use bt656_common::YCbCrPixel;
/// use bt656_decode::convert::ycbcr_to_rgb;
///
/// let black = ycbcr_to_rgb(YCbCrPixel::new(16, 128, 128));
/// assert_eq!((black.r, black.g, black.b), (0, 0, 0));
/// ```
#[inline]
pub fn ycbcr_to_rgb(pixel: YCbCrPixel) -> RgbPixel {
    let y = Y_SCALE * (pixel.y as i32 - 16);
    let cb = pixel.cb as i32 - 128;
    let cr = pixel.cr as i32 - 128;

    let r = (y + CR_TO_R * cr + 512) >> 10;
    let g = (y - CB_TO_G * cb - CR_TO_G * cr + 512) >> 10;
    let b = (y + CB_TO_B * cb + 512) >> 10;

    RgbPixel::new(clamp_u8(r), clamp_u8(g), clamp_u8(b))
}

/// Convert one YCbCr sample straight to a packed RGB565 word.
#[inline]
pub fn ycbcr_to_rgb565(pixel: YCbCrPixel) -> u16 {
    ycbcr_to_rgb(pixel).to_rgb565()
}
