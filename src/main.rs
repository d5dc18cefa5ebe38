//! aqpncs probe firmware: main entry point.
//!
//! Hexagonal architecture, one measurement per wake.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  ChipController     UdpStatsdPublisher  RtcRetainedStore       │
//! │  (ProbePort, I2C)   (PublishPort)       (RetainedStore)        │
//! │  MacIdentity        DeepSleepPower      LogEventSink           │
//! │  (IdentityPort)     (PowerPort)         (EventSink)            │
//! │  NvsConfigStore     WifiAdapter                                │
//! │  (ConfigPort)       (Connectivity)                             │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           CycleService (pure logic)                    │    │
//! │  │  wake · measure · threshold · publish · sleep          │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On the device `run_cycle` ends in deep sleep and the chip restarts from
//! reset. On the host the bus is a simulated pH circuit and the loop
//! sleeps in-process.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{LevelFilter, debug, info, warn};

use aqpncs::adapters::device_id::MacIdentity;
use aqpncs::adapters::log_sink::LogEventSink;
use aqpncs::adapters::nvs::NvsConfigStore;
use aqpncs::adapters::power::DeepSleepPower;
use aqpncs::adapters::rtc_store::RtcRetainedStore;
use aqpncs::adapters::statsd::UdpStatsdPublisher;
use aqpncs::adapters::time::Esp32TimeAdapter;
use aqpncs::adapters::wifi::{self, WifiAdapter};
use aqpncs::app::ports::ProbePort;
use aqpncs::app::service::CycleService;
use aqpncs::chip::ChipDescriptor;
use aqpncs::chip::controller::ChipController;
use aqpncs::chip::transport::ChipTransport;
use aqpncs::config::SystemConfig;

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. Bootstrap + logging ────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    env_logger::Builder::new()
        .filter_level(LevelFilter::Trace)
        .parse_default_env()
        .init();

    info!("aqpncs v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let config = match NvsConfigStore::new() {
        Ok(nvs) => nvs.load_or_default(),
        Err(e) => {
            warn!("NVS init failed ({}), running with defaults", e);
            SystemConfig::default()
        }
    };
    log::set_max_level(if config.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    if config.verbose {
        let mut shown = config.clone();
        shown.wifi_password.clear();
        match serde_json::to_string(&shown) {
            Ok(json) => debug!("Config: {}", json),
            Err(e) => warn!("Config: JSON dump failed: {}", e),
        }
    }

    // ── 3. Platform wiring ────────────────────────────────────
    run(config)
}

#[cfg(target_os = "espidf")]
fn run(config: SystemConfig) -> Result<()> {
    use aqpncs::pins;
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::gpio::AnyIOPin;
    use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::units::Hertz;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

    let peripherals = Peripherals::take()?;

    // SAFETY: each GPIO is handed to exactly one driver.
    let sda = unsafe { AnyIOPin::new(pins::I2C_SDA_GPIO) };
    let scl = unsafe { AnyIOPin::new(pins::I2C_SCL_GPIO) };
    let i2c_config = I2cConfig::new().baudrate(Hertz(pins::I2C_BAUD_HZ));
    let i2c = I2cDriver::new(peripherals.i2c0, sda, scl, &i2c_config)?;
    let mut probe = ChipController::new(ChipTransport::new(i2c, FreeRtos));

    let sysloop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;
    let mut wifi = WifiAdapter::new();
    wifi.attach(BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sysloop.clone(), Some(nvs_partition))?,
        sysloop,
    )?);

    cycle_loop(config, &mut probe, &mut wifi)
}

#[cfg(not(target_os = "espidf"))]
fn run(config: SystemConfig) -> Result<()> {
    use aqpncs::adapters::sim_probe::SimPhCircuit;
    use aqpncs::adapters::time::StdDelay;

    info!("Host build: simulated pH circuit at 0x{:02X}", config.chip_address);
    let bus = SimPhCircuit::new(config.chip_address);
    let mut probe = ChipController::new(ChipTransport::new(bus, StdDelay));
    let mut wifi = WifiAdapter::new();

    cycle_loop(config, &mut probe, &mut wifi)
}

/// Bring up the network, then run cycles until power is cut.
fn cycle_loop(
    config: SystemConfig,
    probe: &mut impl ProbePort,
    wifi: &mut WifiAdapter,
) -> Result<()> {
    let _ = wifi::bring_up(wifi, &config.wifi_ssid, &config.wifi_password);

    let mut publisher = UdpStatsdPublisher::new(config.statsd_addr(), &config.metric_namespace);
    // SAFETY: the only retained-store handle, owned by the main task.
    let mut store = unsafe { RtcRetainedStore::new() };
    let mut identity = MacIdentity::new();
    let mut power = DeepSleepPower::new();
    let mut sink = LogEventSink::new();
    let clock = Esp32TimeAdapter::new();

    info!("Publishing to statsd at {}", publisher.target());
    let chip = ChipDescriptor::ph(config.chip_address);
    let mut service = CycleService::new(config, chip);

    loop {
        let started = clock.uptime_ms();
        let report = service.run_cycle(
            probe,
            &mut publisher,
            &mut store,
            &mut identity,
            &mut power,
            &mut sink,
        );
        debug!(
            "Cycle {} returned after {} ms ({} errors)",
            service.cycles(),
            clock.uptime_ms().saturating_sub(started),
            report.errors.len() + usize::from(report.dropped_errors)
        );
    }
}
