//! Compile-time gateway configuration
//!
//! Rates, ports and the collector endpoint are fixed at build time. There is
//! no runtime reconfiguration; the structs below only group the constants so
//! components can take them as one argument.

/// Interval between mailbox polls of the egress loop
pub const SEND_INTERVAL_MS: u32 = 2000;
/// Interval after each serial read attempt
pub const RECEIVE_INTERVAL_MS: u32 = 2000;
/// Re-poll interval while the serial link has nothing to read
pub const RECEIVE_UPDATE_INTERVAL_MS: u32 = 200;
/// Status panel refresh cadence
pub const MAIN_LOOP_INTERVAL_MS: u32 = 300;
/// Minimum time after an accepted button edge before the next one counts
pub const DEBOUNCE_WINDOW_MS: u32 = 300;
/// Upper bound on one push to the collector
pub const SEND_TIMEOUT_MS: u32 = 1000;
/// Pause before accepting again after a failed control connection
pub const CONTROL_RETRY_MS: u32 = 100;

/// Number of slots in the ingest/egress mailbox
pub const MAILBOX_CAPACITY: usize = 4;
/// Bytes read from a control client before parsing
pub const REQUEST_BUFFER_LEN: usize = 512;
/// Status panel ticks between two statistics log lines (about one minute)
pub const STATS_LOG_EVERY_TICKS: u32 = 200;

pub const SERIAL_BAUD_RATE: u32 = 9600;
/// Longest wait for the rest of a frame once its first byte is readable
/// (a whole frame takes about 25 ms at 9600 baud)
pub const FRAME_TIMEOUT_MS: u32 = 100;
pub const CONTROL_PORT: u16 = 80;
pub const COLLECTOR_HOST: &str = "192.168.1.10";
pub const COLLECTOR_PORT: u16 = 5000;

/// Remote collector endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Hostname or dotted IPv4 address, also sent as the `Host` header
    pub host: &'static str,
    pub port: u16,
    /// Timeout for connect plus write, in milliseconds
    pub send_timeout_ms: u32,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            host: COLLECTOR_HOST,
            port: COLLECTOR_PORT,
            send_timeout_ms: SEND_TIMEOUT_MS,
        }
    }
}

/// Inbound control endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlConfig {
    pub port: u16,
    pub retry_ms: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            port: CONTROL_PORT,
            retry_ms: CONTROL_RETRY_MS,
        }
    }
}

/// Serial link to the sensor module
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialConfig {
    pub baud_rate: u32,
    pub frame_timeout_ms: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: SERIAL_BAUD_RATE,
            frame_timeout_ms: FRAME_TIMEOUT_MS,
        }
    }
}

/// Loop cadences, all in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub send_ms: u32,
    pub receive_ms: u32,
    pub receive_update_ms: u32,
    pub main_loop_ms: u32,
    pub debounce_ms: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            send_ms: SEND_INTERVAL_MS,
            receive_ms: RECEIVE_INTERVAL_MS,
            receive_update_ms: RECEIVE_UPDATE_INTERVAL_MS,
            main_loop_ms: MAIN_LOOP_INTERVAL_MS,
            debounce_ms: DEBOUNCE_WINDOW_MS,
        }
    }
}

/// Complete gateway configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayConfig {
    pub collector: CollectorConfig,
    pub control: ControlConfig,
    pub serial: SerialConfig,
    pub timing: Timing,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = GatewayConfig::default();
        assert_eq!(config.timing.send_ms, 2000);
        assert_eq!(config.timing.receive_ms, 2000);
        assert_eq!(config.timing.receive_update_ms, 200);
        assert_eq!(config.timing.main_loop_ms, 300);
        assert_eq!(config.timing.debounce_ms, 300);
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.frame_timeout_ms, 100);
        assert_eq!(config.collector.host, COLLECTOR_HOST);
        assert_eq!(config.control.port, CONTROL_PORT);
    }
}
