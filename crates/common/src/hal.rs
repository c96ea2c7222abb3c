//! Hardware-access traits.
//!
//! The capture layer programs against these traits, not against a concrete
//! platform. A real port implements them over memory-mapped GPIO registers;
//! tests and simulations use the soft bank from `bt656-capture`.

use crate::pins::PinId;

/// Read access to a bank of digital input pins.
///
/// Implementations are called from the capture edge path, which may run in
/// interrupt context: every method must complete in bounded time and must
/// not block or allocate.
pub trait InputBank: Send + Sync {
    /// Highest addressable pin number on this platform (at most 63).
    fn pin_limit(&self) -> u8;

    /// Level of a single pin. `true` is high.
    fn read_pin(&self, pin: PinId) -> bool;

    /// Read every pin in one access; bit `n` of the word holds the level
    /// of pin `n`.
    ///
    /// The default body falls back to one `read_pin` call per pin, which
    /// widens the window in which lanes can change mid-read. Platforms
    /// with a register-word read must override this.
    fn read_bank(&self) -> u64 {
        let mut word = 0u64;
        for pin in 0..=self.pin_limit().min(63) {
            if self.read_pin(PinId(pin)) {
                word |= 1 << pin;
            }
        }
        word
    }

    /// Whether `pin` is addressable on this platform.
    fn contains(&self, pin: PinId) -> bool {
        pin.0 <= self.pin_limit()
    }
}
