//! Status LEDs, relay output and the main-loop tick
//!
//! Only the status panel writes LED and relay pins. Each tick turns an LED
//! on if its activity flag was set since the previous tick and off
//! otherwise, so every event produces a pulse one tick wide.

use embedded_hal::digital::OutputPin;
use embedded_hal_async::delay::DelayNs;

use crate::config::STATS_LOG_EVERY_TICKS;
use crate::debounce::DebouncedInput;
use crate::flags::{ActivityFlag, ActivityFlags, RelayState};
use crate::stats::PipelineStats;

fn drive<P: OutputPin>(pin: &mut P, high: bool) {
    let result = if high { pin.set_high() } else { pin.set_low() };
    if result.is_err() {
        warn!("Output pin write failed");
    }
}

/// One LED driven by one activity flag
pub struct Indicator<'a, P> {
    pin: P,
    flag: &'a ActivityFlag,
}

impl<'a, P: OutputPin> Indicator<'a, P> {
    pub fn new(pin: P, flag: &'a ActivityFlag) -> Self {
        Self { pin, flag }
    }

    /// Consume the flag and drive the LED; returns whether it is lit
    pub fn refresh(&mut self) -> bool {
        let lit = self.flag.take();
        drive(&mut self.pin, lit);
        lit
    }
}

/// Output lines owned by the status panel
pub struct StatusPins<M, R, S, Y> {
    pub heartbeat: M,
    pub receive: R,
    pub send: S,
    pub relay: Y,
}

/// Main-loop state: LEDs, relay line and the button event consumer
pub struct StatusPanel<'a, M, R, S, Y> {
    heartbeat: Indicator<'a, M>,
    receive: Indicator<'a, R>,
    send: Indicator<'a, S>,
    relay_pin: Y,
    relay: &'a RelayState,
    button: &'a DebouncedInput,
    stats: &'a PipelineStats,
    ticks: u32,
}

impl<'a, M, R, S, Y> StatusPanel<'a, M, R, S, Y>
where
    M: OutputPin,
    R: OutputPin,
    S: OutputPin,
    Y: OutputPin,
{
    pub fn new(
        pins: StatusPins<M, R, S, Y>,
        flags: &'a ActivityFlags,
        relay: &'a RelayState,
        button: &'a DebouncedInput,
        stats: &'a PipelineStats,
    ) -> Self {
        Self {
            heartbeat: Indicator::new(pins.heartbeat, &flags.heartbeat),
            receive: Indicator::new(pins.receive, &flags.receive),
            send: Indicator::new(pins.send, &flags.send),
            relay_pin: pins.relay,
            relay,
            button,
            stats,
            ticks: 0,
        }
    }

    /// One main-loop iteration
    pub fn tick(&mut self) {
        if self.button.take_event() {
            let on = self.relay.toggle();
            info!("Button toggled relay: {}", on);
        }

        let beat = self.heartbeat.refresh();
        self.receive.refresh();
        self.send.refresh();
        drive(&mut self.relay_pin, self.relay.is_on());

        // Lit on every other tick.
        if !beat {
            self.heartbeat.flag.set();
        }

        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % STATS_LOG_EVERY_TICKS == 0 {
            let snapshot = self.stats.snapshot();
            debug!("Pipeline stats: {}", snapshot);
        }
    }

    pub async fn run<D: DelayNs>(mut self, mut delay: D, interval_ms: u32) -> ! {
        info!("Status panel running every {} ms", interval_ms);
        loop {
            self.tick();
            delay.delay_ms(interval_ms).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePin;

    struct Fixture {
        flags: ActivityFlags,
        relay: RelayState,
        button: DebouncedInput,
        stats: PipelineStats,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                flags: ActivityFlags::new(),
                relay: RelayState::new(),
                button: DebouncedInput::new(),
                stats: PipelineStats::new(),
            }
        }
    }

    fn pins() -> (StatusPins<FakePin, FakePin, FakePin, FakePin>, [FakePin; 4]) {
        let probes = [FakePin::new(), FakePin::new(), FakePin::new(), FakePin::new()];
        let pins = StatusPins {
            heartbeat: probes[0].clone(),
            receive: probes[1].clone(),
            send: probes[2].clone(),
            relay: probes[3].clone(),
        };
        (pins, probes)
    }

    #[test]
    fn test_activity_is_a_one_tick_pulse() {
        let fx = Fixture::new();
        let (pins, [_, receive, send, _]) = pins();
        let mut panel = StatusPanel::new(pins, &fx.flags, &fx.relay, &fx.button, &fx.stats);

        fx.flags.receive.set();
        panel.tick();
        assert!(receive.is_high());
        assert!(!send.is_high());

        panel.tick();
        assert!(!receive.is_high());
        assert!(!fx.flags.receive.is_set());
    }

    #[test]
    fn test_heartbeat_alternates() {
        let fx = Fixture::new();
        let (pins, [heartbeat, ..]) = pins();
        let mut panel = StatusPanel::new(pins, &fx.flags, &fx.relay, &fx.button, &fx.stats);

        let mut levels = std::vec::Vec::new();
        for _ in 0..4 {
            panel.tick();
            levels.push(heartbeat.is_high());
        }
        assert_eq!(levels, [false, true, false, true]);
    }

    #[test]
    fn test_button_press_toggles_relay_on_next_tick() {
        let fx = Fixture::new();
        let (pins, [.., relay]) = pins();
        let mut panel = StatusPanel::new(pins, &fx.flags, &fx.relay, &fx.button, &fx.stats);

        panel.tick();
        assert!(!relay.is_high());

        fx.button.on_falling_edge();
        fx.button.on_falling_edge();
        panel.tick();
        assert!(relay.is_high());

        // Event was consumed; no further toggles without a new press.
        panel.tick();
        assert!(relay.is_high());

        fx.button.rearm();
        fx.button.on_falling_edge();
        panel.tick();
        assert!(!relay.is_high());
    }

    #[test]
    fn test_control_command_reaches_pin() {
        let fx = Fixture::new();
        let (pins, [.., relay]) = pins();
        let mut panel = StatusPanel::new(pins, &fx.flags, &fx.relay, &fx.button, &fx.stats);

        fx.relay.set(true);
        panel.tick();
        assert!(relay.is_high());
    }
}
