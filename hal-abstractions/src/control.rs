//! Inbound control connection

use core::future::Future;

use embedded_io_async::{Read, Write};

/// Single-connection server socket for the control endpoint
///
/// Reads and writes go to the connection established by the last successful
/// [`accept`](ControlTransport::accept). Only one connection exists at a time.
pub trait ControlTransport: Read + Write {
    /// Block until a client connects on `port`.
    fn accept(&mut self, port: u16) -> impl Future<Output = Result<(), Self::Error>>;

    /// Drain and close the current connection so the next `accept` can run.
    fn close(&mut self) -> impl Future<Output = ()>;
}
