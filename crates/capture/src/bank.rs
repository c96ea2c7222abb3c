//! Bank-word sampling helpers.
//!
//! The edge path reads the whole input bank as one word and extracts the
//! data lanes afterwards, instead of issuing eight sequential single-pin
//! reads. [`LaneMap`] precomputes the word-bit positions for that
//! extraction; [`SoftBank`] is an in-memory bank for simulation and tests.

use std::sync::atomic::{AtomicU64, Ordering};

use bt656_common::{DataBus, InputBank, PinId};

/// Precomputed mapping from bank-word bits to bus bits.
///
/// Built once at configure time so the edge path does no lookups beyond
/// eight shifts and masks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LaneMap {
    /// `shifts[bit]` is the bank-word bit feeding bus bit `bit`.
    shifts: [Option<u32>; DataBus::WIDTH],
}

impl LaneMap {
    pub(crate) fn new(bus: &DataBus) -> Self {
        let mut shifts = [None; DataBus::WIDTH];
        for (bit, shift) in shifts.iter_mut().enumerate() {
            *shift = bus.lane(bit).map(PinId::bit);
        }
        Self { shifts }
    }

    /// Extract the bus byte from one sampled bank word.
    #[inline(always)]
    pub(crate) fn assemble(&self, word: u64) -> u8 {
        let mut byte = 0u8;
        for (bit, shift) in self.shifts.iter().enumerate() {
            if let Some(shift) = shift {
                byte |= (((word >> shift) & 1) as u8) << bit;
            }
        }
        byte
    }
}

/// In-memory input bank holding one level word.
///
/// Implements the single-word [`InputBank::read_bank`] primitive, so reads
/// see all pins at one instant, exactly like a register-word read on real
/// hardware. Levels are set by tests or simulations via [`set_pin`],
/// [`set_word`] or [`drive_byte`].
///
/// [`set_pin`]: Self::set_pin
/// [`set_word`]: Self::set_word
/// [`drive_byte`]: Self::drive_byte
#[derive(Debug)]
pub struct SoftBank {
    levels: AtomicU64,
    pin_limit: u8,
}

impl SoftBank {
    /// Bank with pins `0..=pin_limit`, all initially low.
    pub fn new(pin_limit: u8) -> Self {
        Self {
            levels: AtomicU64::new(0),
            pin_limit: pin_limit.min(63),
        }
    }

    /// Drive one pin high or low.
    pub fn set_pin(&self, pin: PinId, high: bool) {
        let mask = 1u64 << pin.bit();
        // Relaxed is enough: a level change only needs to become visible
        // by the next read_bank, not synchronize other memory.
        if high {
            self.levels.fetch_or(mask, Ordering::Relaxed);
        } else {
            self.levels.fetch_and(!mask, Ordering::Relaxed);
        }
    }

    /// Replace the entire level word.
    pub fn set_word(&self, word: u64) {
        self.levels.store(word, Ordering::Relaxed);
    }

    /// Drive `byte` onto the wired lanes of `bus`, leaving all other pins
    /// (the clock included) untouched.
    pub fn drive_byte(&self, bus: &DataBus, byte: u8) {
        for bit in 0..DataBus::WIDTH {
            if let Some(pin) = bus.lane(bit) {
                self.set_pin(pin, byte >> bit & 1 == 1);
            }
        }
    }
}

impl InputBank for SoftBank {
    fn pin_limit(&self) -> u8 {
        self.pin_limit
    }

    fn read_pin(&self, pin: PinId) -> bool {
        self.levels.load(Ordering::Relaxed) >> pin.bit() & 1 == 1
    }

    fn read_bank(&self) -> u64 {
        self.levels.load(Ordering::Relaxed)
    }
}
