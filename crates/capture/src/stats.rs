//! Capture-side statistics.
//!
//! Counters are written only by the producer path and read from any
//! context as a point-in-time snapshot. All fields are atomics so the
//! snapshot never takes a lock the edge path could be waiting on.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the capture counters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CaptureStats {
    /// Clock edges serviced (whether or not the byte fit in the ring).
    pub samples: u64,
    /// Bytes accepted into the ring.
    pub bytes_captured: u64,
    /// Bytes dropped because the ring was full.
    pub overflows: u64,
    /// Reserved; no portable way to observe a missed edge exists yet.
    pub missed_samples: u64,
    /// Running average of edge-path duration in microseconds,
    /// `avg = (avg + elapsed) / 2` per sample.
    pub avg_sample_micros: f64,
    /// Microseconds from the session epoch to the most recent sample.
    pub last_sample_micros: u64,
}

/// Producer-written counter cells behind the [`CaptureStats`] snapshot.
///
/// Single writer (the edge path), many readers. Relaxed ordering is enough:
/// readers only need eventually-current values, never ordering against
/// other memory.
#[derive(Debug)]
pub(crate) struct Counters {
    samples: AtomicU64,
    bytes: AtomicU64,
    overflows: AtomicU64,
    missed: AtomicU64,
    /// f64 stored as bits for atomic access.
    avg_micros_bits: AtomicU64,
    last_micros: AtomicU64,
}

impl Counters {
    pub(crate) fn new() -> Self {
        Self {
            samples: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            overflows: AtomicU64::new(0),
            missed: AtomicU64::new(0),
            avg_micros_bits: AtomicU64::new(0.0f64.to_bits()),
            last_micros: AtomicU64::new(0),
        }
    }

    /// Record one serviced edge. `pushed` is whether the byte entered the
    /// ring; `elapsed_micros` the edge-path duration; `at_micros` the
    /// timestamp relative to the session epoch.
    pub(crate) fn record_edge(&self, pushed: bool, elapsed_micros: f64, at_micros: u64) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        if pushed {
            self.bytes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.overflows.fetch_add(1, Ordering::Relaxed);
        }
        let avg = f64::from_bits(self.avg_micros_bits.load(Ordering::Relaxed));
        self.avg_micros_bits
            .store(((avg + elapsed_micros) / 2.0).to_bits(), Ordering::Relaxed);
        self.last_micros.store(at_micros, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            samples: self.samples.load(Ordering::Relaxed),
            bytes_captured: self.bytes.load(Ordering::Relaxed),
            overflows: self.overflows.load(Ordering::Relaxed),
            missed_samples: self.missed.load(Ordering::Relaxed),
            avg_sample_micros: f64::from_bits(self.avg_micros_bits.load(Ordering::Relaxed)),
            last_sample_micros: self.last_micros.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn reset(&self) {
        self.samples.store(0, Ordering::Relaxed);
        self.bytes.store(0, Ordering::Relaxed);
        self.overflows.store(0, Ordering::Relaxed);
        self.missed.store(0, Ordering::Relaxed);
        self.avg_micros_bits
            .store(0.0f64.to_bits(), Ordering::Relaxed);
        self.last_micros.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_counters_snapshot_to_default() {
        let counters = Counters::new();
        assert_eq!(counters.snapshot(), CaptureStats::default());
    }

    #[test]
    fn pushed_and_dropped_edges_count_separately() {
        let counters = Counters::new();
        counters.record_edge(true, 0.0, 10);
        counters.record_edge(true, 0.0, 20);
        counters.record_edge(false, 0.0, 30);

        let stats = counters.snapshot();
        assert_eq!(stats.samples, 3);
        assert_eq!(stats.bytes_captured, 2);
        assert_eq!(stats.overflows, 1);
        assert_eq!(stats.last_sample_micros, 30);
        assert_eq!(stats.missed_samples, 0);
    }

    #[test]
    fn average_halves_toward_new_samples() {
        let counters = Counters::new();
        counters.record_edge(true, 4.0, 0);
        // (0 + 4) / 2
        assert!((counters.snapshot().avg_sample_micros - 2.0).abs() < 1e-12);

        counters.record_edge(true, 6.0, 0);
        // (2 + 6) / 2
        assert!((counters.snapshot().avg_sample_micros - 4.0).abs() < 1e-12);
    }

    #[test]
    fn reset_clears_everything() {
        let counters = Counters::new();
        counters.record_edge(true, 9.0, 99);
        counters.record_edge(false, 9.0, 100);

        counters.reset();
        assert_eq!(counters.snapshot(), CaptureStats::default());
    }
}
