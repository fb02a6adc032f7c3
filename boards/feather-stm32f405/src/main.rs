#![deny(unsafe_code)]
#![deny(warnings)]
#![no_main]
#![no_std]

use defmt_rtt as _; // global logger
use panic_probe as _;
use rtic::app;
use gateway_core::{ActivityFlags, DebouncedInput, FrameMailbox, PipelineStats, RelayState};
use rtic_monotonics::stm32::prelude::*;

mod eth;
mod network;
mod serial;

stm32_tim2_monotonic!(Mono, 1_000_000);

// Shared between tasks and the button handler; all interior-mutable.
static MAILBOX: FrameMailbox = FrameMailbox::new();
static ACTIVITY: ActivityFlags = ActivityFlags::new();
static RELAY: RelayState = RelayState::new();
static BUTTON: DebouncedInput = DebouncedInput::new();
static STATS: PipelineStats = PipelineStats::new();

// USART3 carries the sensor link, so it cannot serve as a dispatcher.
#[app(device = embassy_stm32, peripherals = true, dispatchers = [SPI1, SPI3, UART4])]
mod app {
    use super::*;
    use defmt::{info, warn};
    use embassy_futures::join::{join, join3};
    use embassy_stm32::exti::ExtiInput;
    use embassy_stm32::gpio::{Level, Output, Pull, Speed};
    use embassy_stm32::peripherals;
    use embassy_stm32::rcc::{Hse, HseMode};
    use embassy_stm32::spi::{self, Spi};
    use embassy_stm32::time::Hertz;
    use embassy_stm32::usart::{self, BufferedUart};
    use embassy_time::{Delay, Duration};
    use gateway_core::config::{GatewayConfig, DEBOUNCE_WINDOW_MS};
    use gateway_core::{ControlListener, EdgeOutcome, NetworkEgress, SerialIngest, StatusPanel, StatusPins};
    use static_cell::StaticCell;

    use network::{manager, ControlSocket, NetworkConfig, TcpCollector};
    use serial::SensorPort;

    type Periph<P> = embassy_stm32::Peri<'static, P>;

    /// W5500 FeatherWing on SPI2
    struct NetworkPeripherals {
        spi: Periph<peripherals::SPI2>,
        sck: Periph<peripherals::PB13>,
        mosi: Periph<peripherals::PB15>,
        miso: Periph<peripherals::PB14>,
        cs: Periph<peripherals::PC6>,
        reset: Periph<peripherals::PC3>,
        int: Periph<peripherals::PC2>,
        exti: Periph<peripherals::EXTI2>,
        dma_tx: Periph<peripherals::DMA1_CH4>,
        dma_rx: Periph<peripherals::DMA1_CH3>,
    }

    /// Sensor module on the Feather TX/RX pins
    struct SerialPeripherals {
        usart: Periph<peripherals::USART3>,
        rx: Periph<peripherals::PB11>,
        tx: Periph<peripherals::PB10>,
    }

    /// Onboard red LED (D13) plus D9, D10 and the relay driver on D5
    struct StatusPeripherals {
        heartbeat: Periph<peripherals::PC1>,
        receive: Periph<peripherals::PB8>,
        send: Periph<peripherals::PB9>,
        relay: Periph<peripherals::PC7>,
    }

    /// Active-low push button on A0
    struct ButtonPeripherals {
        pin: Periph<peripherals::PA4>,
        exti: Periph<peripherals::EXTI4>,
    }

    embassy_stm32::bind_interrupts!(struct UartIrqs {
        USART3 => usart::BufferedInterruptHandler<peripherals::USART3>;
    });

    #[shared]
    struct Shared {}

    #[local]
    struct Local {}

    #[init]
    fn init(_cx: init::Context) -> (Shared, Local) {
        info!("Sensor gateway starting...");

        // Adafruit Feather STM32F405: 12 MHz HSE
        let mut config = embassy_stm32::Config::default();
        config.rcc.hse = Some(Hse {
            freq: Hertz(12_000_000),
            mode: HseMode::Oscillator,
        });

        // HSE (12 MHz) / PREDIV(6) = 2 MHz (PLL input)
        // 2 MHz * MUL(168) = 336 MHz (VCO)
        // VCO / DIVP(4) = 84 MHz (SYSCLK)
        config.rcc.pll_src = embassy_stm32::rcc::PllSource::HSE;
        config.rcc.pll = Some(embassy_stm32::rcc::Pll {
            prediv: embassy_stm32::rcc::PllPreDiv::DIV6,
            mul: embassy_stm32::rcc::PllMul::MUL168,
            divp: Some(embassy_stm32::rcc::PllPDiv::DIV4),
            divq: None,
            divr: None,
        });
        config.rcc.sys = embassy_stm32::rcc::Sysclk::PLL1_P;
        config.rcc.ahb_pre = embassy_stm32::rcc::AHBPrescaler::DIV1; // 84 MHz
        config.rcc.apb1_pre = embassy_stm32::rcc::APBPrescaler::DIV2; // 42 MHz
        config.rcc.apb2_pre = embassy_stm32::rcc::APBPrescaler::DIV1; // 84 MHz

        let p = embassy_stm32::init(config);
        info!("System initialized: HSE 12MHz, SYSCLK 84MHz");

        // TIM2 on APB1: timer clock = 2*APB1 when prescaler != 1
        let timer_clock_hz = 84_000_000;
        Mono::start(timer_clock_hz);
        info!("TIM2 monotonic timer initialized at 1 MHz");

        let status_periph = StatusPeripherals {
            heartbeat: p.PC1,
            receive: p.PB8,
            send: p.PB9,
            relay: p.PC7,
        };

        let serial_periph = SerialPeripherals {
            usart: p.USART3,
            rx: p.PB11,
            tx: p.PB10,
        };

        let button_periph = ButtonPeripherals {
            pin: p.PA4,
            exti: p.EXTI4,
        };

        let net_periph = NetworkPeripherals {
            spi: p.SPI2,
            sck: p.PB13,
            mosi: p.PB15,
            miso: p.PB14,
            cs: p.PC6,
            reset: p.PC3,
            int: p.PC2,
            exti: p.EXTI2,
            dma_tx: p.DMA1_CH4,
            dma_rx: p.DMA1_CH3,
        };

        status_panel::spawn(status_periph).ok();
        serial_ingest::spawn(serial_periph).ok();
        button_edge::spawn(button_periph).ok();
        network_task::spawn(net_periph).ok();

        (Shared {}, Local {})
    }

    /// LEDs, relay line and button handling at the main-loop cadence
    #[task(priority = 1)]
    async fn status_panel(_cx: status_panel::Context, periph: StatusPeripherals) -> ! {
        let timing = GatewayConfig::default().timing;

        let pins = StatusPins {
            heartbeat: Output::new(periph.heartbeat, Level::Low, Speed::Low),
            receive: Output::new(periph.receive, Level::Low, Speed::Low),
            send: Output::new(periph.send, Level::Low, Speed::Low),
            relay: Output::new(periph.relay, Level::Low, Speed::Low),
        };

        StatusPanel::new(pins, &ACTIVITY, &RELAY, &BUTTON, &STATS)
            .run(Delay, timing.main_loop_ms)
            .await
    }

    /// Sensor frames from USART3 into the mailbox
    #[task(priority = 1)]
    async fn serial_ingest(_cx: serial_ingest::Context, periph: SerialPeripherals) -> ! {
        let config = GatewayConfig::default();

        let mut uart_config = usart::Config::default();
        uart_config.baudrate = config.serial.baud_rate;

        static TX_BUFFER: StaticCell<[u8; 32]> = StaticCell::new();
        static RX_BUFFER: StaticCell<[u8; 128]> = StaticCell::new();

        let uart = match BufferedUart::new(
            periph.usart,
            periph.rx,
            periph.tx,
            TX_BUFFER.init([0; 32]),
            RX_BUFFER.init([0; 128]),
            UartIrqs,
            uart_config,
        ) {
            Ok(uart) => uart,
            Err(e) => defmt::panic!("USART3 rejected config: {:?}", defmt::Debug2Format(&e)),
        };
        info!("Sensor link on USART3 at {} baud", config.serial.baud_rate);

        SerialIngest::new(SensorPort::new(uart), Delay, &MAILBOX, &ACTIVITY.receive, &STATS)
            .with_frame_timeout(config.serial.frame_timeout_ms)
            .run(config.timing)
            .await
    }

    /// Falling-edge handler for the button
    ///
    /// Runs above the other tasks and does nothing but flip the debounce
    /// state and start the window timer.
    #[task(priority = 2)]
    async fn button_edge(_cx: button_edge::Context, periph: ButtonPeripherals) -> ! {
        let mut button = ExtiInput::new(periph.pin, periph.exti, Pull::Up);
        loop {
            button.wait_for_falling_edge().await;
            if BUTTON.on_falling_edge() == EdgeOutcome::Accepted
                && debounce_window::spawn().is_err()
            {
                warn!("Debounce timer still running, re-arming button");
                BUTTON.rearm();
            }
        }
    }

    /// One-shot debounce timer
    #[task(priority = 2)]
    async fn debounce_window(_cx: debounce_window::Context) {
        Mono::delay(u64::from(DEBOUNCE_WINDOW_MS).millis()).await;
        BUTTON.rearm();
    }

    /// Network task - W5500, embassy-net, collector egress and control listener
    ///
    /// Stack is !Send and must remain within this task.
    #[task(priority = 1)]
    async fn network_task(_cx: network_task::Context, periph: NetworkPeripherals) {
        use embassy_net::{Config, StackResources};

        info!("Network task started");
        let net_config = NetworkConfig::default();

        let mut spi_config = spi::Config::default();
        spi_config.frequency = Hertz(net_config.spi_frequency_hz);

        let spi = Spi::new(
            periph.spi,
            periph.sck,
            periph.mosi,
            periph.miso,
            periph.dma_tx,
            periph.dma_rx,
            spi_config,
        );

        let eth_periph = eth::EthPeripherals {
            spi,
            cs: Output::new(periph.cs, Level::High, Speed::VeryHigh),
            reset: Output::new(periph.reset, Level::High, Speed::Low),
            int: ExtiInput::new(periph.int, periph.exti, Pull::Up),
        };

        let (device, w5500_runner) = eth::init_w5500(eth_periph, net_config.mac_addr).await;

        // DHCP, DNS and two TCP sockets
        static RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
        let (stack, mut net_runner) = embassy_net::new(
            device,
            Config::dhcpv4(Default::default()),
            RESOURCES.init(StackResources::new()),
            net_config.seed,
        );
        info!("Network stack initialized with DHCP");

        let app_logic = async {
            manager::wait_for_uplink(&stack).await;
            run_gateway(stack, &net_config).await;
        };

        join3(w5500_runner.run(), net_runner.run(), app_logic).await;
    }

    async fn run_gateway(stack: embassy_net::Stack<'static>, net_config: &NetworkConfig) {
        let config = GatewayConfig::default();

        let endpoint = match manager::resolve_collector(&stack, &config.collector).await {
            Ok(endpoint) => endpoint,
            Err(e) => defmt::panic!("Collector {} unreachable: {}", config.collector.host, e),
        };

        let collector = TcpCollector::new(stack, endpoint, config.collector.send_timeout_ms);
        let egress = NetworkEgress::new(
            collector,
            config.collector.host,
            &MAILBOX,
            &ACTIVITY.send,
            &STATS,
        );

        let mut rx_buffer = [0u8; 1024];
        let mut tx_buffer = [0u8; 256];
        let socket = ControlSocket::new(
            stack,
            &mut rx_buffer,
            &mut tx_buffer,
            Duration::from_secs(net_config.control_idle_timeout_secs),
        );
        let control = ControlListener::new(socket, config.control, &RELAY, &STATS);

        info!("Gateway pipeline running");
        join(
            egress.run(Delay, config.timing.send_ms),
            control.run(Delay),
        )
        .await;
    }

    /// RTIC idle task - WFI sleep mode when no tasks active
    #[idle]
    fn idle(_cx: idle::Context) -> ! {
        info!("Idle task started - entering WFI loop");
        loop {
            cortex_m::asm::wfi();
        }
    }
}
