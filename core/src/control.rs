//! Inbound relay control endpoint
//!
//! One connection at a time: accept, read one buffer, parse the first line,
//! reply with a status line, close. A slow client only ever delays the next
//! control request, never the sensor pipeline, because the listener runs in
//! its own task.
//!
//! Recognized requests:
//!
//! | first line                  | command            |
//! |-----------------------------|--------------------|
//! | `POST /setup?gate=0 ...`    | [`RelayCommand::Off`] |
//! | `POST /setup?gate=1 ...`    | [`RelayCommand::On`]  |
//!
//! Anything else is answered with `403 BadRequest`. Both command values are
//! valid requests; only a parse failure is rejected.

use embedded_hal_async::delay::DelayNs;
use gateway_hal::ControlTransport;

use crate::config::{ControlConfig, REQUEST_BUFFER_LEN};
use crate::error::ControlError;
use crate::flags::RelayState;
use crate::stats::PipelineStats;

/// Relay command carried by a control request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RelayCommand {
    Off = 0,
    On = 1,
}

impl RelayCommand {
    pub const fn id(self) -> u8 {
        self as u8
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(Self::Off),
            1 => Some(Self::On),
            _ => None,
        }
    }
}

/// Status line sent back to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Reply {
    Ok,
    BadRequest,
}

impl Reply {
    pub const fn status_line(self) -> &'static str {
        match self {
            Self::Ok => "HTTP/1.1 200 OK\r\n\r\n",
            Self::BadRequest => "HTTP/1.1 403 BadRequest\r\n\r\n",
        }
    }
}

const GATE_PATH: &[u8] = b"/setup?gate=";

/// Map the first request line to a relay command
pub fn parse_request(request: &[u8]) -> Result<RelayCommand, ControlError> {
    let line_end = request
        .iter()
        .position(|&b| b == b'\r' || b == b'\n')
        .unwrap_or(request.len());
    let line = &request[..line_end];
    if line.is_empty() {
        return Err(ControlError::Empty);
    }

    let target = line
        .strip_prefix(b"POST ")
        .ok_or(ControlError::MethodNotAllowed)?;
    let path = target.split(|&b| b == b' ').next().unwrap_or(target);

    match path.strip_prefix(GATE_PATH) {
        Some(&[digit]) if digit.is_ascii_digit() => {
            RelayCommand::from_id(digit - b'0').ok_or(ControlError::UnknownPath)
        }
        _ => Err(ControlError::UnknownPath),
    }
}

/// Control endpoint server loop
pub struct ControlListener<'a, T> {
    transport: T,
    config: ControlConfig,
    relay: &'a RelayState,
    stats: &'a PipelineStats,
}

impl<'a, T> ControlListener<'a, T>
where
    T: ControlTransport,
{
    pub fn new(
        transport: T,
        config: ControlConfig,
        relay: &'a RelayState,
        stats: &'a PipelineStats,
    ) -> Self {
        Self {
            transport,
            config,
            relay,
            stats,
        }
    }

    /// Accept, answer and close one connection
    ///
    /// The connection is closed on every path once accepted.
    pub async fn serve_one(&mut self) -> Result<Reply, T::Error> {
        self.transport.accept(self.config.port).await?;
        let outcome = self.exchange().await;
        self.transport.close().await;
        outcome
    }

    async fn exchange(&mut self) -> Result<Reply, T::Error> {
        let mut buf = [0u8; REQUEST_BUFFER_LEN];
        let n = self.transport.read(&mut buf).await?;

        let reply = match parse_request(&buf[..n]) {
            Ok(command) => {
                self.relay.apply(command);
                self.stats.control_accepted();
                info!("Control request: relay command {}", command.id());
                Reply::Ok
            }
            Err(e) => {
                self.stats.control_rejected();
                debug!("Control request rejected: {}", e);
                Reply::BadRequest
            }
        };

        self.transport
            .write_all(reply.status_line().as_bytes())
            .await?;
        self.transport.flush().await?;
        Ok(reply)
    }

    /// Serve connections forever
    pub async fn run<D: DelayNs>(mut self, mut delay: D) -> ! {
        info!("Control listener on port {}", self.config.port);
        loop {
            if self.serve_one().await.is_err() {
                warn!("Control connection failed");
                delay.delay_ms(self.config.retry_ms).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeControl;
    use embassy_futures::block_on;

    #[test]
    fn test_parse_recognized_paths() {
        assert_eq!(
            parse_request(b"POST /setup?gate=1 HTTP/1.1\r\nHost: x\r\n\r\n"),
            Ok(RelayCommand::On)
        );
        assert_eq!(
            parse_request(b"POST /setup?gate=0 HTTP/1.1\r\n"),
            Ok(RelayCommand::Off)
        );
        assert_eq!(parse_request(b"POST /setup?gate=1"), Ok(RelayCommand::On));
    }

    #[test]
    fn test_parse_rejections() {
        assert_eq!(parse_request(b""), Err(ControlError::Empty));
        assert_eq!(parse_request(b"\r\nPOST /setup?gate=1"), Err(ControlError::Empty));
        assert_eq!(
            parse_request(b"GET /setup?gate=1 HTTP/1.1\r\n"),
            Err(ControlError::MethodNotAllowed)
        );
        assert_eq!(
            parse_request(b"POST /setup?gate=9 HTTP/1.1\r\n"),
            Err(ControlError::UnknownPath)
        );
        assert_eq!(
            parse_request(b"POST /setup?gate=10 HTTP/1.1\r\n"),
            Err(ControlError::UnknownPath)
        );
        assert_eq!(
            parse_request(b"POST /other HTTP/1.1\r\n"),
            Err(ControlError::UnknownPath)
        );
    }

    #[test]
    fn test_command_ids() {
        assert_eq!(RelayCommand::from_id(RelayCommand::On.id()), Some(RelayCommand::On));
        assert_eq!(RelayCommand::from_id(RelayCommand::Off.id()), Some(RelayCommand::Off));
        assert_eq!(RelayCommand::from_id(2), None);
    }

    #[test]
    fn test_accepted_then_rejected_request() {
        let relay = RelayState::new();
        let stats = PipelineStats::new();
        let transport = FakeControl::with_requests(&[
            b"POST /setup?gate=1 HTTP/1.1\r\nHost: gateway\r\n\r\n",
            b"POST /setup?gate=9 HTTP/1.1\r\nHost: gateway\r\n\r\n",
        ]);
        let mut listener =
            ControlListener::new(transport, ControlConfig::default(), &relay, &stats);

        assert_eq!(block_on(listener.serve_one()), Ok(Reply::Ok));
        assert!(relay.is_on());

        assert_eq!(block_on(listener.serve_one()), Ok(Reply::BadRequest));
        assert!(relay.is_on());

        let transport = &listener.transport;
        assert_eq!(transport.replies.len(), 2);
        assert_eq!(transport.replies[0], b"HTTP/1.1 200 OK\r\n\r\n");
        assert_eq!(transport.replies[1], b"HTTP/1.1 403 BadRequest\r\n\r\n");
        assert_eq!(transport.accepted_ports, [80, 80]);
        assert_eq!(transport.closed, 2);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.control_accepted, 1);
        assert_eq!(snapshot.control_rejected, 1);
    }

    #[test]
    fn test_gate_zero_turns_relay_off() {
        let relay = RelayState::new();
        relay.set(true);
        let stats = PipelineStats::new();
        let transport = FakeControl::with_requests(&[b"POST /setup?gate=0 HTTP/1.1\r\n\r\n"]);
        let mut listener =
            ControlListener::new(transport, ControlConfig::default(), &relay, &stats);

        assert_eq!(block_on(listener.serve_one()), Ok(Reply::Ok));
        assert!(!relay.is_on());
    }

    #[test]
    fn test_read_failure_still_closes_connection() {
        let relay = RelayState::new();
        let stats = PipelineStats::new();
        let mut transport = FakeControl::with_requests(&[b"POST /setup?gate=1 HTTP/1.1\r\n"]);
        transport.fail_reads = true;
        let mut listener =
            ControlListener::new(transport, ControlConfig::default(), &relay, &stats);

        assert!(block_on(listener.serve_one()).is_err());
        assert_eq!(listener.transport.closed, 1);
        assert!(listener.transport.replies[0].is_empty());
        assert!(!relay.is_on());
    }

    #[test]
    fn test_accept_failure_is_reported() {
        let relay = RelayState::new();
        let stats = PipelineStats::new();
        let mut listener = ControlListener::new(
            FakeControl::with_requests(&[]),
            ControlConfig::default(),
            &relay,
            &stats,
        );

        assert!(block_on(listener.serve_one()).is_err());
        assert_eq!(listener.transport.closed, 0);
    }
}
