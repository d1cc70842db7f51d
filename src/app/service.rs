//! Application service — the hexagonal core.
//!
//! [`AppService`] owns the two link supervisors, the read debouncer, the
//! backend gateway, the event relay, and the actuator state machine, and
//! runs them as one cooperative tick.  All I/O flows through port traits
//! injected at call sites, making the entire service testable with mock
//! adapters.
//!
//! ```text
//!  CardReaderPort ──▶ ┌──────────────────────────────┐ ──▶ RequestPort
//!  BusPort (in)  ──▶  │          AppService          │ ──▶ BusPort (out)
//!                     │  links · debounce · gateway  │ ──▶ OutputPort
//!                     │  relay · actuator            │ ──▶ EventSink
//!                     └──────────────────────────────┘
//! ```
//!
//! Tick order is strict: link maintenance always precedes read/relay
//! processing, so a read is never forwarded over a link known to be
//! down in the same tick.

use log::{info, warn};

use crate::actuator::{ActuatorCommand, ActuatorController};
use crate::config::SystemConfig;
use crate::debounce::ReadDebouncer;
use crate::gateway::BackendGateway;
use crate::link::{LinkState, LinkSupervisor};
use crate::relay::EventRelay;

use super::commands::AppCommand;
use super::events::AppEvent;
use super::ports::{
    BusPort, CardReaderPort, EventSink, LinkPort, OutputPort, RequestPort, TagEvent,
};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    wifi: LinkSupervisor,
    bus: LinkSupervisor,
    debounce: ReadDebouncer,
    gateway: BackendGateway,
    relay: EventRelay,
    actuator: ActuatorController,
    tick_count: u64,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Does **not** touch any port — call [`start`](Self::start) next to
    /// drive the fail-safe output default.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            wifi: LinkSupervisor::new(
                "wifi",
                config.link_retry_interval_ms,
                config.connect_deadline_ms,
            ),
            bus: LinkSupervisor::new(
                "bus",
                config.link_retry_interval_ms,
                config.connect_deadline_ms,
            ),
            debounce: ReadDebouncer::new(config.debounce_min_interval_ms),
            gateway: BackendGateway::new(config),
            relay: EventRelay::new(config.control_topic.as_str()),
            actuator: ActuatorController::new(config.control_topic.as_str()),
            tick_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive the power-on defaults: actuator Off, outputs de-energised.
    pub fn start(&mut self, outputs: &mut impl OutputPort) {
        self.actuator.initialise(outputs);
        info!("AppService started (actuator Off, links Disconnected)");
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one full cooperative cycle.
    ///
    /// Strict order: (1) wireless link — gates everything else this
    /// tick; (2) bus link; (3) deliver buffered inbound bus messages to
    /// the actuator; (4) poll the reader once and run the read →
    /// submit → relay pipeline.  No step blocks past the configured
    /// deadlines.
    ///
    /// The `bus` parameter satisfies **both** [`LinkPort`] and
    /// [`BusPort`]: the broker session is one resource that is both
    /// supervised and used for messaging.
    pub fn tick(
        &mut self,
        now_ms: u64,
        wifi: &mut impl LinkPort,
        bus: &mut (impl LinkPort + BusPort),
        reader: &mut impl CardReaderPort,
        http: &mut impl RequestPort,
        outputs: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        self.tick_count += 1;

        // 1. Wireless link supervision.  Without the radio there is
        //    nothing useful to do: skip the rest of the tick and let
        //    the retry clock run.
        if self.wifi.tick(now_ms, wifi, sink) != LinkState::Connected {
            return;
        }

        // 2. Bus link supervision.
        let bus_state = self.bus.tick(now_ms, bus, sink);

        // 3. Deliver pending control messages.  The queue is bounded by
        //    the adapter, so this drain is bounded too.
        while let Some(msg) = bus.next_message() {
            self.actuator
                .on_message(msg.topic.as_str(), msg.payload.as_str(), outputs, sink);
        }

        // 4. Read → debounce → submit → relay pipeline.
        if let Some(raw_uid) = reader.card_present() {
            let event = TagEvent {
                uid: raw_uid.to_hex(),
                observed_at_ms: now_ms,
            };
            // Halt before the network round trip so the card is not
            // re-reported while we wait on the backend.
            reader.halt();
            sink.emit(&AppEvent::CardRead {
                uid: event.uid.clone(),
            });

            if self.debounce.should_forward(event.uid.as_str(), now_ms) {
                self.forward_read(&event, bus, http, sink, bus_state);
            }
        }
    }

    /// Submit one debounced read and relay the verdict.
    fn forward_read(
        &mut self,
        event: &TagEvent,
        bus: &mut impl BusPort,
        http: &mut impl RequestPort,
        sink: &mut impl EventSink,
        bus_state: LinkState,
    ) {
        match self
            .gateway
            .submit(http, event.uid.as_str(), self.wifi.state())
        {
            Ok(result) => {
                sink.emit(&AppEvent::BackendVerdict {
                    uid: event.uid.clone(),
                    status: result.raw_status,
                    registered: result.registered,
                });

                let code = EventRelay::status_code(&result);
                if self.relay.publish(bus, &result, bus_state) {
                    sink.emit(&AppEvent::StatusPublished { code });
                } else {
                    // Dropped relay messages are never retried; the
                    // verdict remains observable in the log.
                    sink.emit(&AppEvent::RelayDropped { code });
                }

                self.debounce
                    .record_forwarded(event.uid.as_str(), event.observed_at_ms);
            }
            Err(e) => {
                // One read event dropped; a fresh presentation retries.
                warn!("gateway: {} — read {} dropped", e, event.uid);
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Process an external command (serial console, provisioning).
    pub fn handle_command(
        &mut self,
        cmd: AppCommand,
        outputs: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        match cmd {
            AppCommand::SetActuator(target) => {
                self.actuator.set_manual(target, outputs, sink);
            }
            AppCommand::UpdateConfig(config) => {
                self.apply_config(&config);
                info!("configuration updated at runtime");
            }
        }
    }

    /// Apply hot-reloadable tunables.  Link sessions and credentials
    /// are deliberately untouched — those require a reconnect cycle.
    fn apply_config(&mut self, config: &SystemConfig) {
        self.wifi
            .set_intervals(config.link_retry_interval_ms, config.connect_deadline_ms);
        self.bus
            .set_intervals(config.link_retry_interval_ms, config.connect_deadline_ms);
        self.debounce
            .set_min_interval(config.debounce_min_interval_ms);
        self.gateway
            .set_endpoint(config.endpoint_url.as_str(), config.request_timeout_ms);
        self.relay.set_topic(config.control_topic.as_str());
        self.actuator.set_topic(config.control_topic.as_str());
    }

    // ── Queries ───────────────────────────────────────────────

    /// Current wireless link state.
    pub fn wifi_state(&self) -> LinkState {
        self.wifi.state()
    }

    /// Current bus link state.
    pub fn bus_state(&self) -> LinkState {
        self.bus.state()
    }

    /// Last applied actuator command.
    pub fn actuator_state(&self) -> ActuatorCommand {
        self.actuator.state()
    }

    /// Total cooperative ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
