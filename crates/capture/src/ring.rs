//! Fixed-capacity byte ring buffer.
//!
//! The producer (edge path) pushes one byte per clock edge; the consumer
//! drains in bulk. `head == tail` is ambiguous between empty and full, so
//! a separate `full` flag disambiguates. A push into a full ring drops the
//! new byte and reports the loss to the caller; the stored bytes are never
//! overwritten.

use bt656_common::{CaptureError, CaptureResult};

/// Fixed-capacity FIFO byte queue with wraparound indices.
///
/// Not internally synchronized. The capture session wraps it in a mutex and
/// keeps every lock window short enough for the edge path.
#[derive(Debug)]
pub struct RingBuffer {
    buf: Box<[u8]>,
    /// Next write index.
    head: usize,
    /// Next read index.
    tail: usize,
    /// True iff the buffer holds exactly `capacity` unread bytes.
    full: bool,
}

impl RingBuffer {
    /// Allocate a ring holding up to `capacity` bytes.
    ///
    /// # Errors
    ///
    /// [`CaptureError::InvalidCapacity`] for a zero capacity;
    /// [`CaptureError::AllocationFailure`] when the backing memory cannot
    /// be obtained.
    pub fn with_capacity(capacity: usize) -> CaptureResult<Self> {
        if capacity == 0 {
            return Err(CaptureError::InvalidCapacity);
        }
        let mut storage = Vec::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| CaptureError::AllocationFailure {
                requested: capacity,
            })?;
        storage.resize(capacity, 0);
        Ok(Self {
            buf: storage.into_boxed_slice(),
            head: 0,
            tail: 0,
            full: false,
        })
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of unread bytes.
    pub fn len(&self) -> usize {
        if self.full {
            self.buf.len()
        } else if self.head >= self.tail {
            self.head - self.tail
        } else {
            self.buf.len() - self.tail + self.head
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.full && self.head == self.tail
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Append one byte. Returns `false` (dropping the byte) when full.
    #[inline]
    pub fn push(&mut self, byte: u8) -> bool {
        if self.full {
            return false;
        }
        self.buf[self.head] = byte;
        self.head = (self.head + 1) % self.buf.len();
        if self.head == self.tail {
            self.full = true;
        }
        true
    }

    /// Copy up to `out.len()` bytes into `out` in FIFO order, advancing
    /// `tail`. Returns the number of bytes copied.
    pub fn drain_into(&mut self, out: &mut [u8]) -> usize {
        let count = self.len().min(out.len());
        if count == 0 {
            return 0;
        }
        let first = count.min(self.buf.len() - self.tail);
        out[..first].copy_from_slice(&self.buf[self.tail..self.tail + first]);
        out[first..count].copy_from_slice(&self.buf[..count - first]);
        self.tail = (self.tail + count) % self.buf.len();
        self.full = false;
        count
    }

    /// Discard all unread bytes.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.full = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_capacity() {
        assert!(matches!(
            RingBuffer::with_capacity(0),
            Err(CaptureError::InvalidCapacity)
        ));
    }

    #[test]
    fn new_ring_is_empty() {
        let ring = RingBuffer::with_capacity(8).unwrap();
        assert_eq!(ring.len(), 0);
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.capacity(), 8);
    }

    #[test]
    fn fifo_order() {
        let mut ring = RingBuffer::with_capacity(8).unwrap();
        for byte in [0x10, 0x20, 0x30] {
            assert!(ring.push(byte));
        }
        let mut out = [0u8; 8];
        let count = ring.drain_into(&mut out);
        assert_eq!(count, 3);
        assert_eq!(&out[..3], &[0x10, 0x20, 0x30]);
        assert!(ring.is_empty());
    }

    #[test]
    fn full_ring_drops_newest() {
        let mut ring = RingBuffer::with_capacity(4).unwrap();
        for byte in 1..=4 {
            assert!(ring.push(byte));
        }
        assert!(ring.is_full());
        assert_eq!(ring.len(), 4);

        // The fifth byte is dropped; the stored four survive intact.
        assert!(!ring.push(5));
        assert_eq!(ring.len(), 4);

        let mut out = [0u8; 4];
        assert_eq!(ring.drain_into(&mut out), 4);
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn partial_drain_respects_out_len() {
        let mut ring = RingBuffer::with_capacity(8).unwrap();
        for byte in 1..=6 {
            ring.push(byte);
        }
        let mut out = [0u8; 2];
        assert_eq!(ring.drain_into(&mut out), 2);
        assert_eq!(out, [1, 2]);
        assert_eq!(ring.len(), 4);

        let mut rest = [0u8; 8];
        assert_eq!(ring.drain_into(&mut rest), 4);
        assert_eq!(&rest[..4], &[3, 4, 5, 6]);
    }

    #[test]
    fn wraparound_preserves_order() {
        let mut ring = RingBuffer::with_capacity(4).unwrap();
        // Advance the indices past the end of the backing slice.
        for byte in 1..=3 {
            ring.push(byte);
        }
        let mut out = [0u8; 2];
        ring.drain_into(&mut out);
        for byte in 4..=6 {
            assert!(ring.push(byte));
        }
        assert_eq!(ring.len(), 4);

        let mut all = [0u8; 4];
        assert_eq!(ring.drain_into(&mut all), 4);
        assert_eq!(all, [3, 4, 5, 6]);
    }

    #[test]
    fn drain_after_full_wrap_returns_everything() {
        let mut ring = RingBuffer::with_capacity(3).unwrap();
        ring.push(9);
        let mut one = [0u8; 1];
        ring.drain_into(&mut one);
        // head == tail == 1 and the ring fills from the middle.
        for byte in [10, 11, 12] {
            assert!(ring.push(byte));
        }
        assert!(ring.is_full());

        let mut out = [0u8; 3];
        assert_eq!(ring.drain_into(&mut out), 3);
        assert_eq!(out, [10, 11, 12]);
    }

    #[test]
    fn clear_discards_content() {
        let mut ring = RingBuffer::with_capacity(4).unwrap();
        for byte in 1..=4 {
            ring.push(byte);
        }
        ring.clear();
        assert!(ring.is_empty());
        assert!(ring.push(7));
        let mut out = [0u8; 4];
        assert_eq!(ring.drain_into(&mut out), 1);
        assert_eq!(out[0], 7);
    }
}
