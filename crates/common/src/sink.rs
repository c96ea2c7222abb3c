//! Byte-stream consumer trait.

/// A consumer of captured bytes, fed one byte at a time.
///
/// When attached to a capture session the sink runs on the edge path, so
/// implementations must complete in bounded time and never block or
/// allocate. The protocol decoder implements this trait; closures work
/// too via the blanket impl.
pub trait ByteSink: Send {
    fn process_byte(&mut self, byte: u8);
}

impl<F: FnMut(u8) + Send> ByteSink for F {
    fn process_byte(&mut self, byte: u8) {
        self(byte)
    }
}
