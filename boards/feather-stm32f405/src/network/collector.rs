#![deny(unsafe_code)]
#![deny(warnings)]
//! Push connection to the remote collector
//!
//! Every push opens a fresh TCP connection, writes the request and closes.
//! The collector's response is never read.

use defmt::debug;
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{with_timeout, Duration};
use gateway_hal::Collector;

use super::error::NetworkError;

const RX_BUFFER_LEN: usize = 256;
const TX_BUFFER_LEN: usize = 1024;

pub struct TcpCollector<'a> {
    stack: Stack<'a>,
    endpoint: IpEndpoint,
    timeout: Duration,
}

impl<'a> TcpCollector<'a> {
    pub fn new(stack: Stack<'a>, endpoint: IpEndpoint, timeout_ms: u32) -> Self {
        Self {
            stack,
            endpoint,
            timeout: Duration::from_millis(u64::from(timeout_ms)),
        }
    }

    async fn send(&self, socket: &mut TcpSocket<'_>, request: &[u8]) -> Result<(), NetworkError> {
        socket
            .connect(self.endpoint)
            .await
            .map_err(|_| NetworkError::ConnectFailed)?;

        let mut written = 0;
        while written < request.len() {
            let n = socket
                .write(&request[written..])
                .await
                .map_err(|_| NetworkError::WriteFailed)?;
            if n == 0 {
                return Err(NetworkError::WriteFailed);
            }
            written += n;
        }

        socket.flush().await.map_err(|_| NetworkError::WriteFailed)?;
        debug!("Pushed {} bytes to collector", written);
        Ok(())
    }
}

impl Collector for TcpCollector<'_> {
    type Error = NetworkError;

    async fn push(&mut self, request: &[u8]) -> Result<(), Self::Error> {
        let mut rx_buffer = [0u8; RX_BUFFER_LEN];
        let mut tx_buffer = [0u8; TX_BUFFER_LEN];
        let mut socket = TcpSocket::new(self.stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(self.timeout));

        let result = match with_timeout(self.timeout, self.send(&mut socket, request)).await {
            Ok(result) => result,
            Err(_) => Err(NetworkError::Timeout),
        };

        socket.close();
        if result.is_err() {
            socket.abort();
        }
        let _ = with_timeout(self.timeout, socket.flush()).await;
        result
    }
}
