//! Host fakes for the collaborator traits

use core::cell::Cell;
use core::convert::Infallible;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use embedded_io::{ErrorKind, ErrorType, ReadReady};
use embedded_io_async::{Read, Write};
use gateway_hal::{Collector, ControlTransport};

/// Serial link replaying scripted chunks like a buffered UART
///
/// A read takes at most one chunk and leaves any bytes that did not fit for
/// the next read. Once drained, reads wait forever.
pub struct FakeSerial {
    chunks: VecDeque<Result<Vec<u8>, ErrorKind>>,
}

impl FakeSerial {
    pub fn with_chunks(chunks: impl IntoIterator<Item = Result<Vec<u8>, ErrorKind>>) -> Self {
        Self {
            chunks: chunks.into_iter().collect(),
        }
    }
}

impl ErrorType for FakeSerial {
    type Error = ErrorKind;
}

impl ReadReady for FakeSerial {
    fn read_ready(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.chunks.is_empty())
    }
}

impl Read for FakeSerial {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(chunk) = self.chunks.pop_front() else {
            return core::future::pending().await;
        };
        let mut chunk = chunk?;
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            self.chunks.push_front(Ok(chunk.split_off(n)));
        }
        Ok(n)
    }
}

/// Delay that completes on first poll
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl embedded_hal_async::delay::DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

/// Collector recording every request it is handed
#[derive(Default)]
pub struct RecordingCollector {
    pub requests: Vec<Vec<u8>>,
    pub attempts: usize,
    pub fail: bool,
}

impl Collector for RecordingCollector {
    type Error = ErrorKind;

    async fn push(&mut self, request: &[u8]) -> Result<(), Self::Error> {
        self.attempts += 1;
        if self.fail {
            return Err(ErrorKind::TimedOut);
        }
        self.requests.push(request.to_vec());
        Ok(())
    }
}

/// Control socket serving scripted requests, one per connection
pub struct FakeControl {
    pending: VecDeque<Vec<u8>>,
    current: Option<Vec<u8>>,
    /// Bytes written per accepted connection
    pub replies: Vec<Vec<u8>>,
    pub accepted_ports: Vec<u16>,
    pub closed: usize,
    pub fail_reads: bool,
}

impl FakeControl {
    pub fn with_requests(requests: &[&[u8]]) -> Self {
        Self {
            pending: requests.iter().map(|r| r.to_vec()).collect(),
            current: None,
            replies: Vec::new(),
            accepted_ports: Vec::new(),
            closed: 0,
            fail_reads: false,
        }
    }
}

impl ErrorType for FakeControl {
    type Error = ErrorKind;
}

impl Read for FakeControl {
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        if self.fail_reads {
            return Err(ErrorKind::ConnectionReset);
        }
        let data = self.current.as_mut().ok_or(ErrorKind::NotConnected)?;
        let n = data.len().min(buf.len());
        buf[..n].copy_from_slice(&data[..n]);
        data.drain(..n);
        Ok(n)
    }
}

impl Write for FakeControl {
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let reply = self.replies.last_mut().ok_or(ErrorKind::NotConnected)?;
        reply.extend_from_slice(buf);
        Ok(buf.len())
    }

    async fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl ControlTransport for FakeControl {
    async fn accept(&mut self, port: u16) -> Result<(), Self::Error> {
        let request = self.pending.pop_front().ok_or(ErrorKind::NotConnected)?;
        self.current = Some(request);
        self.accepted_ports.push(port);
        self.replies.push(Vec::new());
        Ok(())
    }

    async fn close(&mut self) {
        self.current = None;
        self.closed += 1;
    }
}

/// Output pin whose clones share one level
#[derive(Clone, Default)]
pub struct FakePin(Rc<Cell<bool>>);

impl FakePin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_high(&self) -> bool {
        self.0.get()
    }
}

impl embedded_hal::digital::ErrorType for FakePin {
    type Error = Infallible;
}

impl embedded_hal::digital::OutputPin for FakePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set(true);
        Ok(())
    }
}
