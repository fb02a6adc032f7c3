#![deny(unsafe_code)]
#![deny(warnings)]
//! Board network configuration

/// Ethernet interface settings
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// MAC address for the W5500
    pub mac_addr: [u8; 6],
    /// Random seed for network stack
    pub seed: u64,
    /// SPI clock for the W5500 in Hz
    pub spi_frequency_hz: u32,
    /// Idle timeout applied to an accepted control connection, in seconds
    pub control_idle_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            mac_addr: [0x02, 0x00, 0x00, 0x12, 0x34, 0x56],
            seed: 0x1234_5678_u64,
            spi_frequency_hz: 10_000_000,
            control_idle_timeout_secs: 10,
        }
    }
}
