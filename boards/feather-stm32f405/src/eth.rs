#![deny(unsafe_code)]
#![deny(warnings)]
//! W5500 uplink for the gateway
//!
//! The FeatherWing shares nothing with the sensor side: SPI2 is owned by the
//! W5500 alone, behind a mutex only because `embassy-net-wiznet` wants an
//! `SpiDevice`.

use defmt::info;
use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice as SpiDeviceBus;
use embassy_net_wiznet::chip::W5500;
use embassy_net_wiznet::{Device, Runner, State};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::Output;
use embassy_stm32::mode::Async;
use embassy_stm32::spi::Spi;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Timer;
use static_cell::StaticCell;

/// Socket buffers the driver keeps per direction
const QUEUE_DEPTH: usize = 8;
/// RESET low time, then settle time before the first SPI access
const RESET_PULSE_MS: u64 = 1;
const RESET_SETTLE_MS: u64 = 2;

type SpiBus = Mutex<CriticalSectionRawMutex, Spi<'static, Async>>;
type W5500Spi = SpiDeviceBus<'static, CriticalSectionRawMutex, Spi<'static, Async>, Output<'static>>;

/// Driver task for the W5500; must be polled for the device to move packets
pub type W5500Runner = Runner<'static, W5500, W5500Spi, ExtiInput<'static>, Output<'static>>;

/// Lines wired to the FeatherWing
pub struct EthPeripherals {
    pub spi: Spi<'static, Async>,
    pub cs: Output<'static>,
    pub reset: Output<'static>,
    pub int: ExtiInput<'static>,
}

/// Hard-reset the W5500 and hand back the embassy-net device plus its runner
///
/// Without the chip the gateway has no uplink for collector pushes or
/// control requests, so a chip that does not answer halts the firmware.
pub async fn init_w5500(periph: EthPeripherals, mac_addr: [u8; 6]) -> (Device<'static>, W5500Runner) {
    let EthPeripherals {
        spi,
        cs,
        mut reset,
        int,
    } = periph;

    reset.set_low();
    Timer::after_millis(RESET_PULSE_MS).await;
    reset.set_high();
    Timer::after_millis(RESET_SETTLE_MS).await;

    static SPI_BUS: StaticCell<SpiBus> = StaticCell::new();
    let spi_device = SpiDeviceBus::new(SPI_BUS.init(Mutex::new(spi)), cs);

    static STATE: StaticCell<State<QUEUE_DEPTH, QUEUE_DEPTH>> = StaticCell::new();
    let state = STATE.init(State::new());

    match embassy_net_wiznet::new(mac_addr, state, spi_device, int, reset).await {
        Ok((device, runner)) => {
            info!(
                "Gateway uplink ready, MAC {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                mac_addr[0], mac_addr[1], mac_addr[2], mac_addr[3], mac_addr[4], mac_addr[5]
            );
            (device, runner)
        }
        Err(_) => defmt::panic!("W5500 did not answer after reset; no uplink"),
    }
}
