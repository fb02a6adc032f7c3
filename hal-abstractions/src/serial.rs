//! Serial link to the sensor module

use core::future::Future;

use embedded_io::ReadReady;
use embedded_io_async::Read;

/// Byte source delivering sensor frames
///
/// Any `embedded-io-async` reader that can report readiness is a serial
/// link, which covers buffered UART drivers.
pub trait SerialLink {
    type Error: core::fmt::Debug;

    /// Whether a read would return data without waiting.
    ///
    /// A readiness error is reported as "not readable".
    fn readable(&mut self) -> bool;

    /// Read up to `buf.len()` bytes.
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, Self::Error>>;
}

impl<T> SerialLink for T
where
    T: Read + ReadReady,
{
    type Error = T::Error;

    fn readable(&mut self) -> bool {
        self.read_ready().unwrap_or(false)
    }

    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, Self::Error>> {
        Read::read(self, buf)
    }
}
