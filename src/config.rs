//! System configuration parameters.
//!
//! All tunable parameters for the GateLink device.  The deployed fleet
//! has historically diverged per site (credentials, broker address,
//! relay polarity), so everything lives on this one surface rather than
//! in per-revision code paths.  Values are provisioned as JSON and
//! hot-reloadable where the semantics allow (see
//! [`AppCommand::UpdateConfig`](crate::app::commands::AppCommand)).

use serde::{Deserialize, Serialize};

/// Core system configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Wireless link ---
    /// Station-mode SSID.
    pub wifi_ssid: heapless::String<32>,
    /// WPA2 passphrase (empty for an open network).
    pub wifi_password: heapless::String<64>,

    // --- Backend ---
    /// Full URL of the read-event registration endpoint.
    pub endpoint_url: heapless::String<128>,
    /// Bounded wait for one request/response round trip (ms).
    pub request_timeout_ms: u32,

    // --- Bus ---
    /// Broker hostname or dotted-quad address.
    pub broker_host: heapless::String<64>,
    /// Broker TCP port.
    pub broker_port: u16,
    /// The one control topic: read statuses are published here and the
    /// actuator subscribes here.
    pub control_topic: heapless::String<64>,

    // --- Link supervision ---
    /// Minimum spacing between connection attempts on either link (ms).
    pub link_retry_interval_ms: u32,
    /// Bounded connect-attempt window before it counts as failed (ms).
    pub connect_deadline_ms: u32,

    // --- Read pipeline ---
    /// Same-uid suppression window (ms).
    pub debounce_min_interval_ms: u32,

    // --- Outputs ---
    /// Relay/indicator polarity: false = active-high (HIGH energises the
    /// relay, matching the NO-terminal boards), true = active-low.
    /// Deployment choice, not a behavioural contract.
    pub outputs_active_low: bool,

    // --- Timing ---
    /// Control loop tick interval (ms).  Must stay well under the
    /// reader's presentation latency so no card is missed.
    pub tick_interval_ms: u32,
}

fn fixed<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    let _ = out.push_str(s);
    out
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Wireless — provisioned per site; defaults are placeholders.
            wifi_ssid: fixed(""),
            wifi_password: fixed(""),

            // Backend
            endpoint_url: fixed("http://10.0.0.10:8000/api/rfids"),
            request_timeout_ms: 10_000,

            // Bus
            broker_host: fixed("10.0.0.10"),
            broker_port: 1883,
            control_topic: fixed("RFID_LOGIN"),

            // Link supervision
            link_retry_interval_ms: 5000,
            connect_deadline_ms: 3000,

            // Read pipeline
            debounce_min_interval_ms: 2000,

            // Outputs
            outputs_active_low: false,

            // Timing
            tick_interval_ms: 50,
        }
    }
}
