//! Console Output Interface
//!
//! The boundary layer never drives output hardware itself; the device driver
//! (UART, framebuffer terminal) sits behind this seam.

/// Synchronous byte-sink for user-visible output.
///
/// One call is one atomic unit: implementations serialize internally for the
/// duration of the call, so bytes from concurrent writers never interleave
/// inside it.
pub trait Console {
    /// Emit `bytes` synchronously.
    fn write_bytes(&mut self, bytes: &[u8]);
}
