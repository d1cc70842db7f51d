//! MQTT broker session adapter.
//!
//! One adapter, two seams: [`LinkPort`] for the supervised broker
//! session, and [`BusPort`] for publish + buffered inbound delivery.
//! Inbound messages on the subscribed control topic arrive
//! asynchronously (broker push) and are queued in a small bounded
//! buffer; the control loop drains it once per tick.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `esp_idf_svc::mqtt::client::EspMqttClient`
//!   with the event callback feeding the inbound queue.
//! - **all other targets**: loopback simulation — published messages on
//!   the subscribed topic are delivered back to the inbound queue, so
//!   the full read→relay→actuator pipeline runs without a live broker
//!   (the deployed system's reader and relay listener share one topic,
//!   so the loopback mirrors real traffic).

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use log::{info, warn};

use crate::app::ports::{BusMessage, BusPort, LinkPort, TransportError};
use crate::config::SystemConfig;

/// Bounded inbound buffer: control messages are a single digit and the
/// loop drains every tick, so depth 8 is already generous.
const INBOUND_DEPTH: usize = 8;

/// Broker session behind the [`LinkPort`] + [`BusPort`] seams.
pub struct MqttBusAdapter {
    broker_host: heapless::String<64>,
    broker_port: u16,
    subscribed_topic: heapless::String<64>,
    client_id: heapless::String<24>,
    inbound: heapless::Deque<BusMessage, INBOUND_DEPTH>,
    #[cfg(not(target_os = "espidf"))]
    sim_up: bool,
}

impl MqttBusAdapter {
    pub fn new(config: &SystemConfig, client_id: heapless::String<24>) -> Self {
        Self {
            broker_host: config.broker_host.clone(),
            broker_port: config.broker_port,
            subscribed_topic: config.control_topic.clone(),
            client_id,
            inbound: heapless::Deque::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_up: false,
        }
    }

    /// Queue one inbound message.  Called from the broker event path
    /// (or the loopback); on overflow the *newest* message is dropped —
    /// stale relay commands are superseded within a tick anyway.
    fn enqueue_inbound(&mut self, topic: &str, payload: &str) {
        let mut msg_topic = heapless::String::new();
        let _ = msg_topic.push_str(topic);
        let mut msg_payload = heapless::String::new();
        // Oversized payloads are truncated; the classifier fails them
        // safe to Off either way.
        let _ = msg_payload.push_str(truncate_utf8(payload, 32));

        let msg = BusMessage {
            topic: msg_topic,
            payload: msg_payload,
        };
        if self.inbound.push_back(msg).is_err() {
            warn!("bus: inbound queue full — message dropped");
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_is_up(&mut self) -> bool {
        espidf_glue::session_is_up()
    }

    #[cfg(target_os = "espidf")]
    fn platform_start_connect(&mut self) {
        info!(
            "bus: session → mqtt://{}:{} as '{}'",
            self.broker_host, self.broker_port, self.client_id
        );
        espidf_glue::start_session(
            self.broker_host.as_str(),
            self.broker_port,
            self.client_id.as_str(),
            self.subscribed_topic.as_str(),
        );
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        espidf_glue::publish(topic, payload.as_bytes())
    }

    /// Drain messages the broker callback parked since the last tick.
    #[cfg(target_os = "espidf")]
    fn drain_platform_inbound(&mut self) {
        while let Some((topic, payload)) = espidf_glue::take_inbound() {
            self.enqueue_inbound(topic.as_str(), payload.as_str());
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_is_up(&mut self) -> bool {
        self.sim_up
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start_connect(&mut self) {
        // Broker sessions establish promptly on a healthy LAN; the
        // interesting failure modes are injected via sim_drop.
        self.sim_up = true;
        info!(
            "bus(sim): session up → mqtt://{}:{} as '{}', subscribed '{}'",
            self.broker_host, self.broker_port, self.client_id, self.subscribed_topic
        );
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        if !self.sim_up {
            return Err(TransportError::ConnectFailed);
        }
        info!("bus(sim): publish '{}' → {}", payload, topic);
        // Loopback: we are subscribed to the control topic ourselves.
        if topic == self.subscribed_topic.as_str() {
            self.enqueue_inbound(topic, payload);
        }
        Ok(())
    }

    /// Simulation hook: drop the broker session.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_drop(&mut self) {
        self.sim_up = false;
        warn!("bus(sim): forced session drop");
    }

    /// Simulation hook: inject an inbound message as if pushed by the
    /// broker.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_receive(&mut self, topic: &str, payload: &str) {
        self.enqueue_inbound(topic, payload);
    }
}

/// Broker-session liveness keyed by a generation counter.
///
/// The client callback runs on the esp-idf event task and can outlive
/// the client it belongs to: when a retry replaces the session, the old
/// client's teardown may still deliver a late `Disconnected`.  Every
/// callback carries the generation it was created under, and state
/// writes from any generation but the current one are ignored.
pub struct SessionTracker {
    generation: AtomicU32,
    up: AtomicBool,
}

impl SessionTracker {
    pub const fn new() -> Self {
        Self {
            generation: AtomicU32::new(0),
            up: AtomicBool::new(false),
        }
    }

    /// Open a new session generation.  The session starts down, and
    /// events from all earlier generations are stale from here on.
    pub fn begin(&self) -> u32 {
        self.up.store(false, Ordering::Relaxed);
        self.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn is_current(&self, generation: u32) -> bool {
        generation == self.generation.load(Ordering::Relaxed)
    }

    /// Record a connect/disconnect edge reported by `generation`.
    /// Stale generations are dropped.
    pub fn set_up(&self, generation: u32, up: bool) {
        if self.is_current(generation) {
            self.up.store(up, Ordering::Relaxed);
        }
    }

    pub fn is_up(&self) -> bool {
        self.up.load(Ordering::Relaxed)
    }
}

impl Default for SessionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Trim to at most `max` bytes without splitting a UTF-8 sequence.
fn truncate_utf8(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

impl LinkPort for MqttBusAdapter {
    fn is_up(&mut self) -> bool {
        self.platform_is_up()
    }

    fn start_connect(&mut self) {
        self.platform_start_connect();
    }

    fn label(&self) -> &'static str {
        "bus"
    }
}

impl BusPort for MqttBusAdapter {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.platform_publish(topic, payload)
    }

    fn next_message(&mut self) -> Option<BusMessage> {
        #[cfg(target_os = "espidf")]
        self.drain_platform_inbound();
        self.inbound.pop_front()
    }
}

// ─── espidf session glue ───────────────────────────────────────────
//
// The MQTT client callback runs on the esp-idf event task, so the
// session flag and parked inbound messages live in shared statics and
// the adapter polls them from the control loop.

#[cfg(target_os = "espidf")]
mod espidf_glue {
    use std::sync::Mutex;

    use esp_idf_svc::mqtt::client::{EspMqttClient, EventPayload, MqttClientConfiguration, QoS};
    use log::{info, warn};

    use super::SessionTracker;
    use crate::app::ports::TransportError;

    static SESSION: SessionTracker = SessionTracker::new();
    static CLIENT: Mutex<Option<EspMqttClient<'static>>> = Mutex::new(None);
    static INBOUND: Mutex<Vec<(heapless::String<64>, heapless::String<32>)>> =
        Mutex::new(Vec::new());

    pub fn session_is_up() -> bool {
        SESSION.is_up()
    }

    pub fn take_inbound() -> Option<(heapless::String<64>, heapless::String<32>)> {
        match INBOUND.lock() {
            Ok(mut queue) => {
                if queue.is_empty() {
                    None
                } else {
                    Some(queue.remove(0))
                }
            }
            Err(_) => None,
        }
    }

    pub fn publish(topic: &str, payload: &[u8]) -> Result<(), TransportError> {
        let mut guard = CLIENT.lock().map_err(|_| TransportError::Io)?;
        match guard.as_mut() {
            Some(client) => client
                .enqueue(topic, QoS::AtLeastOnce, false, payload)
                .map(|_| ())
                .map_err(|_| TransportError::Io),
            None => Err(TransportError::ConnectFailed),
        }
    }

    pub fn start_session(host: &str, port: u16, client_id: &str, topic: &str) {
        // Tear down any previous client first; its callback may still
        // fire during teardown, so the new generation is opened only
        // after the old client is gone and stale events are gated out
        // by generation below.
        if let Ok(mut guard) = CLIENT.lock() {
            drop(guard.take());
        }
        if let Ok(mut queue) = INBOUND.lock() {
            queue.clear();
        }
        let generation = SESSION.begin();

        let url = format!("mqtt://{host}:{port}");
        let subscribe_topic: heapless::String<64> = topic.parse().unwrap_or_default();
        let config = MqttClientConfiguration {
            client_id: Some(client_id),
            ..Default::default()
        };

        let result = EspMqttClient::new_cb(&url, &config, move |event| match event.payload() {
            EventPayload::Connected(_) => {
                SESSION.set_up(generation, true);
                info!("bus: broker session established");
            }
            EventPayload::Disconnected => {
                SESSION.set_up(generation, false);
                warn!("bus: broker session lost");
            }
            EventPayload::Received { topic, data, .. } => {
                if !SESSION.is_current(generation) {
                    return;
                }
                let Some(topic) = topic else { return };
                if topic != subscribe_topic.as_str() {
                    return;
                }
                let Ok(payload) = core::str::from_utf8(data) else {
                    warn!("bus: non-utf8 payload dropped");
                    return;
                };
                let mut t = heapless::String::new();
                let _ = t.push_str(topic);
                let mut p = heapless::String::new();
                let _ = p.push_str(super::truncate_utf8(payload, 32));
                if let Ok(mut queue) = INBOUND.lock() {
                    queue.push((t, p));
                }
            }
            _ => {}
        });

        match result {
            Ok(mut client) => {
                if let Err(err) = client.subscribe(topic, QoS::AtLeastOnce) {
                    warn!("bus: subscribe failed: {err}");
                }
                if let Ok(mut guard) = CLIENT.lock() {
                    *guard = Some(client);
                }
            }
            Err(err) => warn!("bus: session start failed: {err}"),
        }
    }
}
