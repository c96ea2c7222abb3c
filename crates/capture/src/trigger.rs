//! Edge dispatch table.
//!
//! Interrupt registration mechanisms accept no user context, so a
//! process-wide table maps each bound clock pin to the producer that owns
//! it. At most one active session per pin; independent sessions on
//! different clock pins each hold their own slot.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use bt656_common::{CaptureError, CaptureResult, PinId};

use crate::session::Producer;

/// Bound dispatch slots, one per active clock pin.
static SLOTS: RwLock<Vec<(PinId, Arc<Producer>)>> = RwLock::new(Vec::new());

/// Claim the dispatch slot for `pin`.
///
/// # Errors
///
/// [`CaptureError::ClockPinBusy`] when another session already holds the
/// slot.
pub(crate) fn bind(pin: PinId, producer: Arc<Producer>) -> CaptureResult<()> {
    let mut slots = SLOTS.write();
    if slots.iter().any(|(bound, _)| *bound == pin) {
        return Err(CaptureError::ClockPinBusy { pin });
    }
    slots.push((pin, producer));
    debug!(pin = %pin, "Edge dispatch slot bound");
    Ok(())
}

/// Release the dispatch slot for `pin`.
///
/// Takes the write side of the slot lock, so it returns only after any
/// in-flight [`dispatch_edge`] on this pin has completed. No-op when the
/// pin is not bound.
pub(crate) fn unbind(pin: PinId) {
    SLOTS.write().retain(|(bound, _)| *bound != pin);
    debug!(pin = %pin, "Edge dispatch slot released");
}

/// Route one qualifying clock edge on `pin` to the producer bound to it.
///
/// Returns whether a producer was bound. A real port calls this from the
/// interrupt service routine wired to the pin; simulations call it
/// directly. The producer's edge work runs under the table's read lock;
/// [`unbind`] takes the write side, which is what makes `stop()` a barrier
/// against in-flight edges.
pub fn dispatch_edge(pin: PinId) -> bool {
    let slots = SLOTS.read();
    match slots.iter().find(|(bound, _)| *bound == pin) {
        Some((_, producer)) => {
            producer.on_edge();
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::SoftBank;
    use bt656_common::{CaptureConfig, InputBank};

    // The slot table is process-global and unit tests run concurrently,
    // so every test here uses a clock pin no other test touches.

    fn producer_on(clock: u8) -> Arc<Producer> {
        let bank: Arc<dyn InputBank> = Arc::new(SoftBank::new(63));
        let config = CaptureConfig {
            clock: PinId(clock),
            ..Default::default()
        };
        Arc::new(Producer::new(bank, &config, None).unwrap())
    }

    #[test]
    fn second_bind_on_same_pin_is_busy() {
        let pin = PinId(61);
        bind(pin, producer_on(61)).unwrap();

        let err = bind(pin, producer_on(61)).unwrap_err();
        assert!(matches!(err, CaptureError::ClockPinBusy { pin: p } if p == pin));

        unbind(pin);
    }

    #[test]
    fn unbind_frees_the_slot() {
        let pin = PinId(62);
        bind(pin, producer_on(62)).unwrap();
        unbind(pin);
        // Slot is free again.
        bind(pin, producer_on(62)).unwrap();
        unbind(pin);
    }

    #[test]
    fn dispatch_without_binding_reports_unbound() {
        assert!(!dispatch_edge(PinId(63)));
    }

    #[test]
    fn unbind_of_unbound_pin_is_a_noop() {
        unbind(PinId(60));
        assert!(!dispatch_edge(PinId(60)));
    }
}
