//! GateLink Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiStaDriver  MqttBusAdapter  HttpGatewayTransport           │
//! │  (LinkPort)     (LinkPort+Bus)  (RequestPort)                  │
//! │  Mfrc522Reader  RelayOutputs    LogEventSink  SerialConsole    │
//! │  (CardReader)   (OutputPort)    (EventSink)   (commands)       │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  LinkSupervisor ×2 · Debounce · Gateway · Relay        │    │
//! │  │  · ActuatorController                                  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use gatelink::adapters::console::SerialConsole;
use gatelink::adapters::device_id;
use gatelink::adapters::http::HttpGatewayTransport;
use gatelink::adapters::log_sink::LogEventSink;
use gatelink::adapters::mqtt::MqttBusAdapter;
use gatelink::adapters::outputs::{PolarityPin, RelayOutputs};
use gatelink::adapters::reader::Mfrc522Reader;
use gatelink::adapters::time::MonotonicClock;
use gatelink::adapters::wifi::WifiStaDriver;
use gatelink::app::service::AppService;
use gatelink::config::SystemConfig;

/// Site provisioning blob, baked in at build time.  Absent on bench
/// builds, which then run on defaults.
const PROVISIONED_CONFIG: Option<&str> = option_env!("GATELINK_CONFIG_JSON");

fn load_config() -> SystemConfig {
    match PROVISIONED_CONFIG {
        Some(json) => match serde_json::from_str(json) {
            Ok(config) => {
                info!("Config loaded from provisioning blob");
                config
            }
            Err(e) => {
                warn!("Provisioning blob rejected ({e}), using defaults");
                SystemConfig::default()
            }
        },
        None => {
            info!("No provisioning blob, using defaults");
            SystemConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // ── 1. Platform bootstrap ─────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }

    info!("╔══════════════════════════════════════╗");
    info!("║  GateLink v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration + identity ───────────────────────────
    let config = load_config();

    let dev_id = device_id::device_id().map_err(|e| anyhow::anyhow!("{e}"))?;
    info!("Device ID: {}", dev_id);

    // ── 3. Construct adapters ─────────────────────────────────
    #[cfg(target_os = "espidf")]
    let mut outputs = espidf_outputs(&config)?;
    #[cfg(not(target_os = "espidf"))]
    let mut outputs = {
        use gatelink::adapters::outputs::SimPin;
        RelayOutputs::new(
            PolarityPin::new(SimPin::new(), config.outputs_active_low),
            PolarityPin::new(SimPin::new(), config.outputs_active_low),
        )
    };

    let mut wifi = WifiStaDriver::new(&config);
    let mut bus = MqttBusAdapter::new(&config, dev_id);
    let mut http = HttpGatewayTransport::new();
    let mut reader = Mfrc522Reader::new();
    let mut sink = LogEventSink::new();
    let mut console = SerialConsole::new();
    let clock = MonotonicClock::new();

    // ── 4. Hardware bring-up ──────────────────────────────────
    //
    // The peripherals singleton is claimed exactly once; the modem goes
    // to the WiFi station, SPI2 to the card reader.
    #[cfg(target_os = "espidf")]
    {
        use esp_idf_svc::eventloop::EspSystemEventLoop;
        use esp_idf_svc::hal::peripherals::Peripherals;
        use esp_idf_svc::nvs::EspDefaultNvsPartition;

        let peripherals = Peripherals::take()?;
        let sysloop = EspSystemEventLoop::take()?;
        let nvs = EspDefaultNvsPartition::take()?;

        wifi.install_station(peripherals.modem, sysloop, nvs)
            .map_err(|e| anyhow::anyhow!("{e}"))?;
        espidf_reader_bringup(peripherals.spi2)?;
        SerialConsole::install().map_err(|e| anyhow::anyhow!("{e}"))?;
    }

    // ── 5. Construct app service ──────────────────────────────
    let mut app = AppService::new(&config);
    app.start(&mut outputs);

    info!("System ready. Entering control loop.");

    // ── 6. Control loop ───────────────────────────────────────
    loop {
        let now_ms = clock.now_ms();

        if let Some(cmd) = console.poll() {
            app.handle_command(cmd, &mut outputs, &mut sink);
        }

        app.tick(
            now_ms,
            &mut wifi,
            &mut bus,
            &mut reader,
            &mut http,
            &mut outputs,
            &mut sink,
        );

        std::thread::sleep(std::time::Duration::from_millis(u64::from(
            config.tick_interval_ms,
        )));
    }
}

// ── espidf peripheral wiring ──────────────────────────────────

#[cfg(target_os = "espidf")]
fn espidf_outputs(
    config: &SystemConfig,
) -> Result<
    RelayOutputs<
        esp_idf_svc::hal::gpio::PinDriver<'static, esp_idf_svc::hal::gpio::AnyOutputPin, esp_idf_svc::hal::gpio::Output>,
        esp_idf_svc::hal::gpio::PinDriver<'static, esp_idf_svc::hal::gpio::AnyOutputPin, esp_idf_svc::hal::gpio::Output>,
    >,
> {
    use esp_idf_svc::hal::gpio::{AnyOutputPin, PinDriver};

    // SAFETY: each GPIO number is claimed exactly once, here.
    let relay_pin = unsafe { AnyOutputPin::new(gatelink::pins::RELAY_GPIO) };
    let indicator_pin = unsafe { AnyOutputPin::new(gatelink::pins::INDICATOR_GPIO) };

    Ok(RelayOutputs::new(
        PolarityPin::new(PinDriver::output(relay_pin)?, config.outputs_active_low),
        PolarityPin::new(PinDriver::output(indicator_pin)?, config.outputs_active_low),
    ))
}

#[cfg(target_os = "espidf")]
fn espidf_reader_bringup(spi2: esp_idf_svc::hal::spi::SPI2) -> Result<()> {
    use esp_idf_svc::hal::gpio::AnyIOPin;
    use esp_idf_svc::hal::spi::{config::Config as SpiConfig, SpiDeviceDriver, SpiDriverConfig};
    use esp_idf_svc::hal::units::FromValueType;

    // Release the reader's hard reset line before the first exchange.
    let rst_pin = unsafe { esp_idf_svc::hal::gpio::AnyOutputPin::new(gatelink::pins::READER_RST_GPIO) };
    let mut rst = esp_idf_svc::hal::gpio::PinDriver::output(rst_pin)?;
    rst.set_high()?;
    // The driver resets the pin on drop; the line must stay released
    // for the life of the process.
    core::mem::forget(rst);

    let device = SpiDeviceDriver::new_single(
        spi2,
        unsafe { AnyIOPin::new(gatelink::pins::SPI_SCK_GPIO) },
        unsafe { AnyIOPin::new(gatelink::pins::SPI_MOSI_GPIO) },
        Some(unsafe { AnyIOPin::new(gatelink::pins::SPI_MISO_GPIO) }),
        Some(unsafe { AnyIOPin::new(gatelink::pins::READER_SS_GPIO) }),
        &SpiDriverConfig::new(),
        &SpiConfig::new().baudrate(4.MHz().into()),
    )?;
    gatelink::adapters::reader::install_spi_device(device);
    Ok(())
}
