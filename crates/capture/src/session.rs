//! Capture session lifecycle and the edge-time producer path.
//!
//! A [`CaptureSession`] owns the configuration, the ring buffer and the
//! producer that services clock edges. The producer path must complete
//! well inside one 27 MHz clock period: it never logs, never allocates,
//! and holds each lock only for a bounded copy.
//!
//! Two consumer wirings exist and are mutually exclusive per decoder:
//! drain-then-decode (the default; call [`CaptureSession::drain`] or
//! [`CaptureSession::process_pending`] from a non-interrupt context) and
//! the integrated wiring, where an attached [`ByteSink`] is fed each byte
//! from inside the edge path itself.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use bt656_common::{
    ByteSink, CaptureConfig, CaptureError, CaptureMode, CaptureResult, InputBank, PinId,
};

use crate::bank::LaneMap;
use crate::ring::RingBuffer;
use crate::stats::{CaptureStats, Counters};
use crate::trigger;

/// Bytes moved per ring-lock window by [`CaptureSession::process_pending`].
/// 64 bytes is about 2.4 µs of stream at the nominal 27 MHz byte rate.
const DISPATCH_CHUNK: usize = 64;

/// Producer half of a capture session: everything the edge path touches.
///
/// In interrupt mode the dispatch table holds this as an `Arc`, so the
/// interrupt context and the owning session operate on one instance.
pub(crate) struct Producer {
    bank: Arc<dyn InputBank>,
    lanes: LaneMap,
    clock: PinId,
    ring: Mutex<RingBuffer>,
    sink: Mutex<Option<Box<dyn ByteSink>>>,
    counters: Counters,
    armed: AtomicBool,
    /// Last observed clock level, the polling-mode edge latch.
    clock_level: AtomicBool,
    epoch: Instant,
}

impl Producer {
    pub(crate) fn new(
        bank: Arc<dyn InputBank>,
        config: &CaptureConfig,
        sink: Option<Box<dyn ByteSink>>,
    ) -> CaptureResult<Self> {
        Ok(Self {
            lanes: LaneMap::new(&config.bus),
            clock: config.clock,
            ring: Mutex::new(RingBuffer::with_capacity(config.capacity)?),
            sink: Mutex::new(sink),
            counters: Counters::new(),
            armed: AtomicBool::new(false),
            clock_level: AtomicBool::new(false),
            epoch: Instant::now(),
            bank,
        })
    }

    /// Service one qualifying clock edge.
    ///
    /// Runs in whatever context drives the producer, possibly an interrupt
    /// handler: no logging, no allocation, bounded lock windows only.
    pub(crate) fn on_edge(&self) {
        if !self.armed.load(Ordering::Relaxed) {
            return;
        }
        let started = Instant::now();

        // One bank-word read, lanes extracted afterwards.
        let byte = self.lanes.assemble(self.bank.read_bank());
        let pushed = self.ring.lock().push(byte);

        // Integrated wiring: decode amortizes with buffer management.
        if pushed {
            if let Some(sink) = self.sink.lock().as_mut() {
                sink.process_byte(byte);
            }
        }

        let elapsed_micros = started.elapsed().as_secs_f64() * 1e6;
        let at_micros = self.epoch.elapsed().as_micros() as u64;
        self.counters.record_edge(pushed, elapsed_micros, at_micros);
    }

    /// Polling-mode edge detection: compare the live clock level against
    /// the latch and service a rising edge.
    pub(crate) fn poll_edge(&self) -> bool {
        let level = self.bank.read_pin(self.clock);
        let previous = self.clock_level.swap(level, Ordering::Relaxed);
        if !previous && level {
            self.on_edge();
            true
        } else {
            false
        }
    }

    pub(crate) fn take_sink(&self) -> Option<Box<dyn ByteSink>> {
        self.sink.lock().take()
    }
}

/// A configured byte-capture session over one clock pin and up to eight
/// data lanes.
///
/// Lifecycle: [`configure`](Self::configure) (repeatable while stopped),
/// [`start`](Self::start), then either drain from a consumer context or
/// let an attached sink decode inline, then [`stop`](Self::stop).
/// Dropping a running session stops it.
pub struct CaptureSession {
    bank: Arc<dyn InputBank>,
    config: Option<CaptureConfig>,
    producer: Option<Arc<Producer>>,
    on_data: Option<Box<dyn FnMut(&[u8]) + Send>>,
    running: bool,
}

impl CaptureSession {
    /// Session over the given input bank. Nothing is allocated until
    /// [`configure`](Self::configure).
    pub fn new(bank: Arc<dyn InputBank>) -> Self {
        Self {
            bank,
            config: None,
            producer: None,
            on_data: None,
            running: false,
        }
    }

    /// Validate `config` and allocate the ring buffer for it.
    ///
    /// An attached sink survives reconfiguration; bytes still buffered
    /// under the previous configuration are discarded. On error the
    /// previous configuration, if any, stays in place.
    ///
    /// # Errors
    ///
    /// [`CaptureError::AlreadyRunning`] while capturing;
    /// [`CaptureError::InvalidPinConfiguration`] when the clock or a wired
    /// lane lies outside the bank's range; capacity and allocation errors
    /// from the ring buffer.
    pub fn configure(&mut self, config: CaptureConfig) -> CaptureResult<()> {
        if self.running {
            return Err(CaptureError::AlreadyRunning);
        }
        let limit = self.bank.pin_limit();
        for pin in config.bus.connected() {
            if !self.bank.contains(pin) {
                return Err(CaptureError::InvalidPinConfiguration { pin, limit });
            }
        }
        if !self.bank.contains(config.clock) {
            return Err(CaptureError::InvalidPinConfiguration {
                pin: config.clock,
                limit,
            });
        }

        let producer = Producer::new(Arc::clone(&self.bank), &config, None)?;
        if let Some(previous) = self.producer.take() {
            let pending = previous.ring.lock().len();
            if pending > 0 {
                warn!(bytes = pending, "Reconfiguration discards buffered capture data");
            }
            *producer.sink.lock() = previous.take_sink();
        }
        self.producer = Some(Arc::new(producer));
        self.config = Some(config);

        info!(
            clock = %config.clock,
            lanes = config.bus.connected_count(),
            capacity = config.capacity,
            mode = ?config.mode,
            "Capture session configured"
        );
        if config.verbose {
            debug!(bus = %config.bus, "Data bus wiring");
        }
        Ok(())
    }

    /// Arm the producer.
    ///
    /// Interrupt mode claims the clock pin's dispatch slot; polling mode
    /// latches the live clock level so a clock idling high is not taken
    /// for a first edge. Statistics restart from zero.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NotConfigured`], [`CaptureError::AlreadyRunning`],
    /// or [`CaptureError::ClockPinBusy`] when another session owns the
    /// clock pin.
    pub fn start(&mut self) -> CaptureResult<()> {
        if self.running {
            return Err(CaptureError::AlreadyRunning);
        }
        let (producer, config) = match (self.producer.as_ref(), self.config.as_ref()) {
            (Some(producer), Some(config)) => (producer, config),
            _ => return Err(CaptureError::NotConfigured),
        };

        producer.counters.reset();
        match config.mode {
            CaptureMode::Interrupt => {
                // Armed before binding, so the first dispatched edge is
                // never dropped.
                producer.armed.store(true, Ordering::Relaxed);
                if let Err(err) = trigger::bind(config.clock, Arc::clone(producer)) {
                    producer.armed.store(false, Ordering::Relaxed);
                    return Err(err);
                }
            }
            CaptureMode::Polling => {
                let level = self.bank.read_pin(config.clock);
                producer.clock_level.store(level, Ordering::Relaxed);
                producer.armed.store(true, Ordering::Relaxed);
            }
        }
        self.running = true;
        info!(clock = %config.clock, mode = ?config.mode, "Capture started");
        Ok(())
    }

    /// Disarm the producer. Buffered bytes remain drainable.
    ///
    /// In interrupt mode this releases the dispatch slot and returns only
    /// once any in-flight edge has finished. Idempotent.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        if let (Some(producer), Some(config)) = (self.producer.as_ref(), self.config.as_ref()) {
            producer.armed.store(false, Ordering::Relaxed);
            if config.mode == CaptureMode::Interrupt {
                trigger::unbind(config.clock);
            }
            if config.verbose {
                let stats = producer.counters.snapshot();
                debug!(
                    samples = stats.samples,
                    bytes = stats.bytes_captured,
                    overflows = stats.overflows,
                    avg_micros = stats.avg_sample_micros,
                    "Session counters at stop"
                );
            }
        }
        self.running = false;
        info!("Capture stopped");
    }

    /// Polling-mode producer step: sample the clock, service a rising
    /// edge. Returns whether an edge was serviced.
    ///
    /// Returns `false` when the session is stopped or interrupt-driven.
    /// The caller owns the guarantee that this runs faster than the clock
    /// toggles.
    pub fn poll(&self) -> bool {
        if !self.running {
            return false;
        }
        match (self.producer.as_ref(), self.config.as_ref()) {
            (Some(producer), Some(config)) if config.mode == CaptureMode::Polling => {
                producer.poll_edge()
            }
            _ => false,
        }
    }

    /// Number of captured bytes waiting in the ring.
    pub fn available(&self) -> usize {
        match self.producer.as_ref() {
            Some(producer) => producer.ring.lock().len(),
            None => 0,
        }
    }

    /// Copy up to `out.len()` buffered bytes into `out` in FIFO order.
    /// Returns the count copied. Callable from any non-interrupt context;
    /// never blocks beyond the brief ring lock.
    pub fn drain(&self, out: &mut [u8]) -> usize {
        match self.producer.as_ref() {
            Some(producer) => producer.ring.lock().drain_into(out),
            None => 0,
        }
    }

    /// Drain-and-dispatch: move all buffered bytes to the registered
    /// [`on_data_ready`](Self::on_data_ready) callback in chunks of
    /// [`DISPATCH_CHUNK`], releasing the ring lock before each callback
    /// invocation. Returns the total moved.
    ///
    /// Without a registered callback this leaves the ring untouched and
    /// returns 0.
    pub fn process_pending(&mut self) -> usize {
        let producer = match self.producer.as_ref() {
            Some(producer) => producer,
            None => return 0,
        };
        let callback = match self.on_data.as_mut() {
            Some(callback) => callback,
            None => return 0,
        };

        let mut scratch = [0u8; DISPATCH_CHUNK];
        let mut total = 0;
        loop {
            let count = producer.ring.lock().drain_into(&mut scratch);
            if count == 0 {
                break;
            }
            total += count;
            callback(&scratch[..count]);
        }
        if total > 0 {
            debug!(bytes = total, "Dispatched pending capture data");
        }
        total
    }

    /// Register the raw-byte observer fed by
    /// [`process_pending`](Self::process_pending). Replaces any previous
    /// observer.
    pub fn on_data_ready<F>(&mut self, callback: F)
    where
        F: FnMut(&[u8]) + Send + 'static,
    {
        self.on_data = Some(Box::new(callback));
    }

    /// Attach a byte sink to the edge path (integrated wiring): every
    /// byte that enters the ring is also handed to the sink before the
    /// edge returns.
    ///
    /// The sink is owned by the producer until
    /// [`detach_sink`](Self::detach_sink) returns it, so the same decoder
    /// cannot simultaneously be driven from a consumer context.
    ///
    /// # Errors
    ///
    /// [`CaptureError::NotConfigured`] before the first `configure`.
    pub fn attach_sink(&mut self, sink: Box<dyn ByteSink>) -> CaptureResult<()> {
        let producer = self.producer.as_ref().ok_or(CaptureError::NotConfigured)?;
        *producer.sink.lock() = Some(sink);
        debug!("Byte sink attached to edge path");
        Ok(())
    }

    /// Remove and return the attached sink, if any.
    pub fn detach_sink(&mut self) -> Option<Box<dyn ByteSink>> {
        let sink = self
            .producer
            .as_ref()
            .and_then(|producer| producer.take_sink());
        if sink.is_some() {
            debug!("Byte sink detached from edge path");
        }
        sink
    }

    /// Point-in-time copy of the capture counters.
    pub fn stats(&self) -> CaptureStats {
        match self.producer.as_ref() {
            Some(producer) => producer.counters.snapshot(),
            None => CaptureStats::default(),
        }
    }

    /// Zero the capture counters without touching buffered data.
    pub fn reset_stats(&self) {
        if let Some(producer) = self.producer.as_ref() {
            producer.counters.reset();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> Option<&CaptureConfig> {
        self.config.as_ref()
    }
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("config", &self.config)
            .field("running", &self.running)
            .field("has_data_callback", &self.on_data.is_some())
            .finish()
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.stop();
    }
}
