//! Control-byte sync decoding.
//!
//! Each BT.656 timing reference ends in one control byte carrying the
//! field, vertical-sync, horizontal-sync, and SAV/EAV flags. The layout is
//! `1 F V H x x x x` in the original standard; this stream family carries
//! the start-of-active-video indicator in bit 3.

/// Field flag, bit 6 of the control byte.
pub const FIELD_BIT: u8 = 0x40;
/// Vertical-sync flag, bit 5.
pub const VSYNC_BIT: u8 = 0x20;
/// Horizontal-sync flag, bit 4.
pub const HSYNC_BIT: u8 = 0x10;
/// Start-of-active-video indicator, bit 3.
pub const SAV_BIT: u8 = 0x08;
/// Every well-formed control byte has its MSB set.
pub const CONTROL_MSB: u8 = 0x80;

/// Sync flags decoded from one control byte.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncSignals {
    /// Which interlaced field the following data belongs to.
    pub field: bool,
    /// Vertical sync; a rising edge marks a frame boundary.
    pub vsync: bool,
    /// Horizontal sync; a rising edge marks a line boundary.
    pub hsync: bool,
    /// Start of active video. Clear means this reference is an EAV.
    pub sav: bool,
}

impl SyncSignals {
    pub fn from_control_byte(byte: u8) -> Self {
        Self {
            field: byte & FIELD_BIT != 0,
            vsync: byte & VSYNC_BIT != 0,
            hsync: byte & HSYNC_BIT != 0,
            sav: byte & SAV_BIT != 0,
        }
    }

    /// End-of-active-video is the complement of SAV in the same word.
    pub fn eav(self) -> bool {
        !self.sav
    }

    /// Encode back into a control byte (MSB set). Used to synthesize
    /// streams for loopback and tests.
    pub fn to_control_byte(self) -> u8 {
        let mut byte = CONTROL_MSB;
        if self.field {
            byte |= FIELD_BIT;
        }
        if self.vsync {
            byte |= VSYNC_BIT;
        }
        if self.hsync {
            byte |= HSYNC_BIT;
        }
        if self.sav {
            byte |= SAV_BIT;
        }
        byte
    }

    /// Whether a raw control byte carries the mandatory MSB.
    pub fn well_formed(byte: u8) -> bool {
        byte & CONTROL_MSB != 0
    }
}

impl From<u8> for SyncSignals {
    fn from(byte: u8) -> Self {
        Self::from_control_byte(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_individual_bits() {
        let s = SyncSignals::from_control_byte(0xA0); // MSB + vsync
        assert!(s.vsync);
        assert!(!s.field && !s.hsync && !s.sav);

        let s = SyncSignals::from_control_byte(0xD8); // MSB + field + hsync + sav
        assert!(s.field && s.hsync && s.sav);
        assert!(!s.vsync);
    }

    #[test]
    fn eav_is_complement_of_sav() {
        assert!(SyncSignals::from_control_byte(0x80).eav());
        assert!(!SyncSignals::from_control_byte(0x88).eav());
    }

    #[test]
    fn control_byte_roundtrip() {
        let s = SyncSignals {
            field: true,
            vsync: false,
            hsync: true,
            sav: true,
        };
        let byte = s.to_control_byte();
        assert_eq!(byte & CONTROL_MSB, CONTROL_MSB);
        assert_eq!(SyncSignals::from_control_byte(byte), s);
    }

    #[test]
    fn well_formed_checks_msb() {
        assert!(SyncSignals::well_formed(0x80));
        assert!(SyncSignals::well_formed(0xFF));
        assert!(!SyncSignals::well_formed(0x20));
        assert!(!SyncSignals::well_formed(0x00));
    }
}
