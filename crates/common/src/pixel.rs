//! Pixel sample types.

/// One YCbCr pixel as assembled from the active-video byte stream.
///
/// In 4:2:2 subsampling two adjacent luma samples share one chroma pair;
/// the decoder emits one `YCbCrPixel` per four active-video bytes, with
/// `y` holding the second luma sample of the group.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct YCbCrPixel {
    pub y: u8,
    pub cb: u8,
    pub cr: u8,
}

impl YCbCrPixel {
    pub const fn new(y: u8, cb: u8, cr: u8) -> Self {
        Self { y, cb, cr }
    }

    /// Grayscale is the raw luma sample, unconverted.
    pub fn grayscale(self) -> u8 {
        self.y
    }
}

/// An 8-bit-per-channel RGB pixel.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RgbPixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbPixel {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Pack into RGB565: the top 5/6/5 bits of R/G/B.
    pub fn to_rgb565(self) -> u16 {
        ((self.r as u16 >> 3) << 11) | ((self.g as u16 >> 2) << 5) | (self.b as u16 >> 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb565_primaries() {
        assert_eq!(RgbPixel::new(255, 0, 0).to_rgb565(), 0xF800);
        assert_eq!(RgbPixel::new(0, 255, 0).to_rgb565(), 0x07E0);
        assert_eq!(RgbPixel::new(0, 0, 255).to_rgb565(), 0x001F);
    }

    #[test]
    fn rgb565_extremes() {
        assert_eq!(RgbPixel::new(0, 0, 0).to_rgb565(), 0x0000);
        assert_eq!(RgbPixel::new(255, 255, 255).to_rgb565(), 0xFFFF);
    }

    #[test]
    fn rgb565_truncates_low_bits() {
        // 0b0000_0111 in each channel falls below the kept bits
        assert_eq!(RgbPixel::new(7, 3, 7).to_rgb565(), 0x0000);
    }

    #[test]
    fn grayscale_is_luma() {
        assert_eq!(YCbCrPixel::new(180, 17, 240).grayscale(), 180);
    }
}
