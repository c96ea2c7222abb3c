//! `bt656-capture` -- Edge-driven byte capture for BT.656 parallel buses.
//!
//! Turns a clocked 8-bit parallel bus into a drainable byte sequence with
//! bounded work per clock edge. The pieces:
//!
//! - [`CaptureSession`]: configuration, start/stop, drain, statistics
//! - [`RingBuffer`]: fixed-capacity FIFO between producer and consumer
//! - [`SoftBank`]: in-memory input bank for simulation and tests
//! - [`dispatch_edge`]: entry point a platform's interrupt routine calls
//! - [`CaptureStats`]: point-in-time counter snapshots
//!
//! The producer path (one call per clock edge) never blocks, logs or
//! allocates; backpressure is resolved by dropping the newest byte and
//! counting the overflow.

pub mod bank;
pub mod ring;
pub mod session;
pub mod stats;
pub mod trigger;

// Re-export commonly used items at crate root
pub use bank::SoftBank;
pub use ring::RingBuffer;
pub use session::CaptureSession;
pub use stats::CaptureStats;
pub use trigger::dispatch_edge;
