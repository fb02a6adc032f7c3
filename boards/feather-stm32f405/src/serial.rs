#![deny(unsafe_code)]
#![deny(warnings)]
//! UART link to the sensor module

use embassy_stm32::usart::{self, BufferedUart};
use gateway_hal::SerialLink;

/// Buffered USART carrying sensor frames
///
/// Reads return whatever the ring buffer holds, possibly part of a frame;
/// the ingest loop keeps reading until a frame is complete. The UART driver
/// speaks the 0.6 `embedded-io` traits, so readiness and reads are forwarded
/// through those rather than the workspace's 0.7 ones.
pub struct SensorPort<'d> {
    uart: BufferedUart<'d>,
}

impl<'d> SensorPort<'d> {
    pub fn new(uart: BufferedUart<'d>) -> Self {
        Self { uart }
    }
}

impl SerialLink for SensorPort<'_> {
    type Error = usart::Error;

    fn readable(&mut self) -> bool {
        embedded_io_06::ReadReady::read_ready(&mut self.uart).unwrap_or(false)
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        embedded_io_async_06::Read::read(&mut self.uart, buf).await
    }
}
