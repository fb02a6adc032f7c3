//! Outbound link to the remote collector

use core::future::Future;

/// Destination for formatted push requests
///
/// Each call delivers one complete request. Implementors bound the call with
/// a short timeout so a stalled collector cannot stall the caller, and do not
/// wait for or validate a response.
pub trait Collector {
    type Error: core::fmt::Debug;

    /// Transmit `request` to the collector.
    fn push(&mut self, request: &[u8]) -> impl Future<Output = Result<(), Self::Error>>;
}
