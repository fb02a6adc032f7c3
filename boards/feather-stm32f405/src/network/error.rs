#![deny(unsafe_code)]
#![deny(warnings)]
//! Network error types

use defmt::Format;

/// Collector and control socket errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum NetworkError {
    /// Collector hostname did not resolve
    DnsError,
    /// Socket accept/read/write error
    SocketError,
    /// Push did not complete within the send timeout
    Timeout,
    /// Collector refused or dropped the connection attempt
    ConnectFailed,
    /// Collector closed before the whole request was written
    WriteFailed,
}

impl core::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DnsError => write!(f, "DNS resolution failed"),
            Self::SocketError => write!(f, "Socket error"),
            Self::Timeout => write!(f, "Request timeout"),
            Self::ConnectFailed => write!(f, "Connect failed"),
            Self::WriteFailed => write!(f, "Write failed"),
        }
    }
}

impl core::error::Error for NetworkError {}

impl embedded_io_async::Error for NetworkError {
    fn kind(&self) -> embedded_io_async::ErrorKind {
        match self {
            Self::SocketError | Self::WriteFailed => embedded_io_async::ErrorKind::BrokenPipe,
            Self::Timeout => embedded_io_async::ErrorKind::TimedOut,
            Self::ConnectFailed => embedded_io_async::ErrorKind::ConnectionRefused,
            Self::DnsError => embedded_io_async::ErrorKind::Other,
        }
    }
}
