//! Pin identifiers and the 8-lane parallel data bus.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical identifier of a digital input pin.
///
/// Pin numbers are opaque to this crate. Which numbers exist is decided by
/// the [`InputBank`](crate::hal::InputBank) implementation that samples them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PinId(pub u8);

impl PinId {
    /// Bit position of this pin inside a bank word.
    pub fn bit(self) -> u32 {
        self.0 as u32
    }
}

impl From<u8> for PinId {
    fn from(val: u8) -> Self {
        Self(val)
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Ordered set of up to 8 data-lane pins, bus bit 0 first.
///
/// A lane may be `None` when the corresponding bus bit is not wired; an
/// unwired lane always reads as zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataBus {
    lanes: [Option<PinId>; 8],
}

impl DataBus {
    /// Number of lanes on the bus.
    pub const WIDTH: usize = 8;

    pub const fn new(lanes: [Option<PinId>; 8]) -> Self {
        Self { lanes }
    }

    /// Bus with nothing wired; every lane reads zero.
    pub const fn unwired() -> Self {
        Self { lanes: [None; 8] }
    }

    /// Bus with all 8 lanes wired to consecutive pins starting at `first`.
    pub fn consecutive(first: u8) -> Self {
        assert!(
            first <= u8::MAX - 7,
            "consecutive bus starting at {first} would overflow pin numbering"
        );
        Self {
            lanes: std::array::from_fn(|i| Some(PinId(first + i as u8))),
        }
    }

    /// The pin wired to bus bit `bit`, if any.
    pub fn lane(&self, bit: usize) -> Option<PinId> {
        self.lanes[bit]
    }

    pub fn lanes(&self) -> &[Option<PinId>; 8] {
        &self.lanes
    }

    /// Iterator over the wired pins, lowest bus bit first.
    pub fn connected(&self) -> impl Iterator<Item = PinId> + '_ {
        self.lanes.iter().flatten().copied()
    }

    pub fn connected_count(&self) -> usize {
        self.lanes.iter().flatten().count()
    }
}

impl fmt::Display for DataBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (bit, lane) in self.lanes.iter().enumerate() {
            if bit > 0 {
                write!(f, " ")?;
            }
            match lane {
                Some(pin) => write!(f, "{pin}")?,
                None => write!(f, "-")?,
            }
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_bus_numbers_lanes() {
        let bus = DataBus::consecutive(13);
        assert_eq!(bus.lane(0), Some(PinId(13)));
        assert_eq!(bus.lane(7), Some(PinId(20)));
        assert_eq!(bus.connected_count(), 8);
    }

    #[test]
    #[should_panic]
    fn consecutive_bus_rejects_overflow() {
        DataBus::consecutive(250);
    }

    #[test]
    fn unwired_bus_is_empty() {
        let bus = DataBus::unwired();
        assert_eq!(bus.connected_count(), 0);
        assert!(bus.connected().next().is_none());
    }

    #[test]
    fn partial_bus_skips_gaps() {
        let mut lanes = [None; 8];
        lanes[0] = Some(PinId(4));
        lanes[5] = Some(PinId(9));
        let bus = DataBus::new(lanes);
        assert_eq!(bus.connected_count(), 2);
        let pins: Vec<_> = bus.connected().collect();
        assert_eq!(pins, vec![PinId(4), PinId(9)]);
    }

    #[test]
    fn pin_display() {
        assert_eq!(PinId(13).to_string(), "P13");
        let bus = DataBus::new([Some(PinId(1)), None, None, None, None, None, None, None]);
        assert_eq!(bus.to_string(), "[P1 - - - - - - -]");
    }
}
