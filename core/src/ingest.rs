//! Serial ingest loop
//!
//! Polls the sensor link, assembles whole frames and queues them for egress.
//! Every failure on this path drops the sample: the next one supersedes it.
//!
//! A buffered link reports readable as soon as the first byte of a frame is
//! in, so one poll keeps reading until all [`FRAME_LEN`] bytes are there or
//! the frame timeout expires. Frames therefore stay aligned however a poll
//! falls relative to the byte stream.

use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;
use gateway_hal::SerialLink;

use crate::config::{Timing, FRAME_TIMEOUT_MS};
use crate::flags::ActivityFlag;
use crate::frame::{self, InputResult, FRAME_LEN};
use crate::mailbox::Mailbox;
use crate::stats::PipelineStats;

/// Result of one ingest poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IngestOutcome {
    /// Link had nothing to read
    Idle,
    /// Fewer than [`FRAME_LEN`] bytes arrived before the frame timeout; discarded
    ShortRead(usize),
    /// Link reported a read error; discarded
    ReadError,
    /// Every mailbox slot was owned; frame discarded
    Dropped,
    /// Frame published to the mailbox
    Queued,
}

/// Wait before the next poll
///
/// An idle link is re-polled after the short receive-update interval; any
/// read attempt is followed by the full receive interval.
pub fn pause_for(outcome: IngestOutcome, timing: &Timing) -> u32 {
    match outcome {
        IngestOutcome::Idle => timing.receive_update_ms,
        _ => timing.receive_ms,
    }
}

pub struct SerialIngest<'a, S, D, const N: usize> {
    link: S,
    delay: D,
    frame_timeout_ms: u32,
    mailbox: &'a Mailbox<InputResult, N>,
    activity: &'a ActivityFlag,
    stats: &'a PipelineStats,
}

impl<'a, S, D, const N: usize> SerialIngest<'a, S, D, N>
where
    S: SerialLink,
    D: DelayNs,
{
    /// `delay` bounds frame assembly and paces [`run`](Self::run)
    pub fn new(
        link: S,
        delay: D,
        mailbox: &'a Mailbox<InputResult, N>,
        activity: &'a ActivityFlag,
        stats: &'a PipelineStats,
    ) -> Self {
        Self {
            link,
            delay,
            frame_timeout_ms: FRAME_TIMEOUT_MS,
            mailbox,
            activity,
            stats,
        }
    }

    pub fn with_frame_timeout(mut self, timeout_ms: u32) -> Self {
        self.frame_timeout_ms = timeout_ms;
        self
    }

    /// Read until `buf` is full, the link reports end of data, or the frame
    /// timeout expires; returns the bytes read
    async fn fill_frame(&mut self, buf: &mut [u8; FRAME_LEN]) -> Result<usize, S::Error> {
        let Self {
            link,
            delay,
            frame_timeout_ms,
            ..
        } = self;

        let mut filled = 0;
        let read_all = async {
            while filled < FRAME_LEN {
                let n = link.read(&mut buf[filled..]).await?;
                if n == 0 {
                    break;
                }
                filled += n;
            }
            Ok::<(), S::Error>(())
        };

        let outcome = select(read_all, delay.delay_ms(*frame_timeout_ms)).await;
        match outcome {
            Either::First(Err(e)) => Err(e),
            Either::First(Ok(())) | Either::Second(()) => Ok(filled),
        }
    }

    /// Read at most one frame and queue it
    pub async fn poll_once(&mut self) -> IngestOutcome {
        if !self.link.readable() {
            return IngestOutcome::Idle;
        }

        let mut buf = [0u8; FRAME_LEN];
        let n = match self.fill_frame(&mut buf).await {
            Ok(n) => n,
            Err(_) => {
                self.stats.read_error();
                warn!("Serial read failed, frame dropped");
                return IngestOutcome::ReadError;
            }
        };
        if n < FRAME_LEN {
            self.stats.short_read();
            debug!("Short serial read ({} of {} bytes) ignored", n, FRAME_LEN);
            return IngestOutcome::ShortRead(n);
        }

        let result = frame::decode(&buf);
        let Some(slot) = self.mailbox.try_alloc() else {
            self.stats.frame_dropped();
            warn!("Mailbox full, frame dropped");
            return IngestOutcome::Dropped;
        };
        self.mailbox.write(&slot, result);
        self.mailbox.publish(slot);

        self.activity.set();
        self.stats.frame_queued();
        debug!("Frame queued (code {})", result.code());
        IngestOutcome::Queued
    }

    /// Poll forever, pausing per [`pause_for`]
    pub async fn run(mut self, timing: Timing) -> ! {
        info!("Serial ingest running");
        loop {
            let outcome = self.poll_once().await;
            self.delay.delay_ms(pause_for(outcome, &timing)).await;
        }
    }
}
