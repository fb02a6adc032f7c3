#![deny(unsafe_code)]
#![deny(warnings)]
//! Listening TCP socket for the control endpoint
//!
//! Wraps `embassy_net::tcp::TcpSocket` so the control listener in
//! `gateway-core` can drive it through `embedded-io-async` and
//! [`ControlTransport`].

use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_time::Duration;
use embedded_io_async::{ErrorType, Read, Write};
use gateway_hal::ControlTransport;

use super::error::NetworkError;

/// One-connection-at-a-time server socket
pub struct ControlSocket<'a> {
    socket: TcpSocket<'a>,
}

impl<'a> ControlSocket<'a> {
    /// Create the socket
    ///
    /// `idle_timeout` bounds how long an accepted client may stay silent
    /// before reads fail and the connection is dropped.
    pub fn new(
        stack: Stack<'a>,
        rx_buffer: &'a mut [u8],
        tx_buffer: &'a mut [u8],
        idle_timeout: Duration,
    ) -> Self {
        let mut socket = TcpSocket::new(stack, rx_buffer, tx_buffer);
        socket.set_timeout(Some(idle_timeout));
        Self { socket }
    }
}

impl ErrorType for ControlSocket<'_> {
    type Error = NetworkError;
}

impl Read for ControlSocket<'_> {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        self.socket
            .read(buf)
            .await
            .map_err(|_| NetworkError::SocketError)
    }
}

impl Write for ControlSocket<'_> {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.socket
            .write(buf)
            .await
            .map_err(|_| NetworkError::SocketError)
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        self.socket
            .flush()
            .await
            .map_err(|_| NetworkError::SocketError)
    }
}

impl ControlTransport for ControlSocket<'_> {
    async fn accept(&mut self, port: u16) -> Result<(), Self::Error> {
        self.socket
            .accept(port)
            .await
            .map_err(|_| NetworkError::SocketError)
    }

    async fn close(&mut self) {
        self.socket.close();
        // Lets the FIN go out; a peer that never acknowledges is aborted below.
        let _ = self.socket.flush().await;
        self.socket.abort();
        let _ = self.socket.flush().await;
    }
}
