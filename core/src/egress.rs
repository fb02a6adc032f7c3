//! Network egress loop
//!
//! Takes one queued result per tick and pushes successful readings to the
//! collector. The slot goes back to the mailbox before any network I/O, so
//! every taken slot is released exactly once whatever the push does.

use embedded_hal_async::delay::DelayNs;
use gateway_hal::Collector;

use crate::flags::ActivityFlag;
use crate::frame::InputResult;
use crate::mailbox::Mailbox;
use crate::payload;
use crate::stats::PipelineStats;

/// Result of one egress poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EgressOutcome {
    /// Nothing queued
    Idle,
    /// Reading pushed to the collector
    Sent,
    /// Sensor reported an error code; nothing to push
    SensorError(i32),
    /// Push failed or did not fit the request buffer; sample dropped
    PushFailed,
}

pub struct NetworkEgress<'a, C, const N: usize> {
    collector: C,
    host: &'a str,
    mailbox: &'a Mailbox<InputResult, N>,
    activity: &'a ActivityFlag,
    stats: &'a PipelineStats,
}

impl<'a, C, const N: usize> NetworkEgress<'a, C, N>
where
    C: Collector,
{
    /// `host` is sent as the `Host` header of every push
    pub fn new(
        collector: C,
        host: &'a str,
        mailbox: &'a Mailbox<InputResult, N>,
        activity: &'a ActivityFlag,
        stats: &'a PipelineStats,
    ) -> Self {
        Self {
            collector,
            host,
            mailbox,
            activity,
            stats,
        }
    }

    /// Forward at most one queued result
    pub async fn poll_once(&mut self) -> EgressOutcome {
        let Some(slot) = self.mailbox.try_take() else {
            return EgressOutcome::Idle;
        };
        self.activity.set();
        let result = self.mailbox.read(&slot);
        self.mailbox.release(slot);
        let Some(result) = result else {
            warn!("Taken slot held no result");
            return EgressOutcome::Idle;
        };

        debug!("Received result {}", result.code());
        let Some(reading) = result.reading() else {
            return EgressOutcome::SensorError(result.code());
        };
        debug!(
            "Air: temperature {}, humidity {}, dewpoint {}, dewpoint fast {}; ground humidity {}",
            reading.air_temperature,
            reading.air_humidity,
            reading.air_dewpoint,
            reading.air_dewpoint_fast,
            reading.water_humidity
        );

        let request = match payload::format_request(self.host, reading) {
            Ok(request) => request,
            Err(e) => {
                self.stats.push_failed();
                warn!("Push request not built: {}", e);
                return EgressOutcome::PushFailed;
            }
        };

        match self.collector.push(request.as_bytes()).await {
            Ok(()) => {
                self.stats.push_sent();
                debug!("Pushed {} bytes to collector", request.len());
                EgressOutcome::Sent
            }
            Err(_) => {
                self.stats.push_failed();
                warn!("Push to collector failed, sample dropped");
                EgressOutcome::PushFailed
            }
        }
    }

    /// Poll forever, one poll per `interval_ms`
    pub async fn run<D: DelayNs>(mut self, mut delay: D, interval_ms: u32) -> ! {
        info!("Network egress running");
        loop {
            self.poll_once().await;
            delay.delay_ms(interval_ms).await;
        }
    }
}
