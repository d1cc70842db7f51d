//! WiFi station-mode link driver.
//!
//! Implements [`LinkPort`] — connection *policy* (retry spacing, attempt
//! deadlines, edge logging) lives entirely in the
//! [`LinkSupervisor`](crate::link::LinkSupervisor); this adapter only
//! reports radio status and accepts non-blocking connect kicks.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: owns an `EspWifi` station handle,
//!   installed from `main()` via [`WifiStaDriver::install_station`]
//!   (the modem peripheral and event loop live there).
//! - **all other targets**: deterministic simulation for host-side
//!   tests and bench runs.

use log::{info, warn};

use crate::app::ports::LinkPort;
use crate::config::SystemConfig;

/// Station-mode WiFi driver behind the [`LinkPort`] seam.
pub struct WifiStaDriver {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    #[cfg(target_os = "espidf")]
    station: Option<esp_idf_svc::wifi::EspWifi<'static>>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimRadio,
}

#[cfg(not(target_os = "espidf"))]
#[derive(Default)]
struct SimRadio {
    up: bool,
    /// `is_up` polls remaining before a started attempt completes.
    pending_polls: u8,
    /// Attempt that will never associate (exercises the deadline path).
    doomed: bool,
    connect_counter: u32,
}

impl WifiStaDriver {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            ssid: config.wifi_ssid.clone(),
            password: config.wifi_password.clone(),
            #[cfg(target_os = "espidf")]
            station: None,
            #[cfg(not(target_os = "espidf"))]
            sim: SimRadio::default(),
        }
    }

    /// Bring up the station interface: construct the driver, apply the
    /// configured credentials, and start the radio.  Must run once
    /// before the first supervisor tick; connect kicks before it are
    /// warned and dropped.
    #[cfg(target_os = "espidf")]
    pub fn install_station(
        &mut self,
        modem: esp_idf_svc::hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: esp_idf_svc::nvs::EspDefaultNvsPartition,
    ) -> crate::error::Result<()> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration, EspWifi};

        let mut station = EspWifi::new(modem, sysloop, Some(nvs))
            .map_err(|_| crate::error::Error::Init("wifi driver init failed"))?;

        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        station
            .set_configuration(&Configuration::Client(ClientConfiguration {
                ssid: self.ssid.clone(),
                password: self.password.clone(),
                auth_method,
                ..Default::default()
            }))
            .map_err(|_| crate::error::Error::Init("wifi configuration rejected"))?;
        station
            .start()
            .map_err(|_| crate::error::Error::Init("wifi start failed"))?;

        info!("wifi: station started for '{}'", self.ssid);
        self.station = Some(station);
        Ok(())
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_is_up(&mut self) -> bool {
        self.station
            .as_ref()
            .is_some_and(|station| station.is_connected().unwrap_or(false))
    }

    #[cfg(target_os = "espidf")]
    fn platform_start_connect(&mut self) {
        // Association completes in the background; platform_is_up
        // observes it on later ticks.
        match self.station.as_mut() {
            Some(station) => {
                if let Err(err) = station.connect() {
                    warn!("wifi: connect kick failed: {err}");
                } else {
                    info!("wifi: associating with '{}'", self.ssid);
                }
            }
            None => warn!("wifi: station not installed, connect kick dropped"),
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_up(&mut self) -> bool {
        if self.sim.pending_polls > 0 {
            self.sim.pending_polls -= 1;
            if self.sim.pending_polls == 0 && !self.sim.doomed {
                self.sim.up = true;
                info!("wifi(sim): associated with '{}'", self.ssid);
            }
        }
        self.sim.up
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start_connect(&mut self) {
        self.sim.connect_counter = self.sim.connect_counter.wrapping_add(1);
        // Every 5th attempt stalls past the deadline, exercising the
        // supervisor's timeout path deterministically.
        self.sim.doomed = self.sim.connect_counter % 5 == 0;
        self.sim.pending_polls = 2;
        info!(
            "wifi(sim): connect attempt {} for '{}' ({}ch password)",
            self.sim.connect_counter,
            self.ssid,
            self.password.len()
        );
    }

    /// Simulation hook: force the radio down (link-loss injection).
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop(&mut self) {
        self.sim.up = false;
        self.sim.pending_polls = 0;
        warn!("wifi(sim): forced drop");
    }
}

impl LinkPort for WifiStaDriver {
    fn is_up(&mut self) -> bool {
        self.platform_is_up()
    }

    fn start_connect(&mut self) {
        self.platform_start_connect();
    }

    fn label(&self) -> &'static str {
        "wifi"
    }
}
