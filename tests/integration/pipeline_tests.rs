//! End-to-end pipeline tests: card presentation through backend round
//! trip, status relay, and actuator reaction, all against mock
//! adapters.

use gatelink::app::commands::AppCommand;
use gatelink::app::events::AppEvent;
use gatelink::app::service::AppService;
use gatelink::actuator::ActuatorCommand;
use gatelink::config::SystemConfig;

use crate::mock_hw::{MockBus, MockHttp, MockLink, MockOutputs, MockReader, RecordingSink};

struct Rig {
    app: AppService,
    wifi: MockLink,
    bus: MockBus,
    reader: MockReader,
    http: MockHttp,
    outputs: MockOutputs,
    sink: RecordingSink,
    now_ms: u64,
    tick_ms: u64,
}

impl Rig {
    fn new(http: MockHttp) -> Self {
        let config = SystemConfig::default();
        let mut app = AppService::new(&config);
        let mut outputs = MockOutputs::default();
        app.start(&mut outputs);
        Self {
            app,
            wifi: MockLink::connected("wifi"),
            bus: MockBus::connected(),
            reader: MockReader::empty(),
            http,
            outputs,
            sink: RecordingSink::new(),
            now_ms: 0,
            tick_ms: u64::from(config.tick_interval_ms),
        }
    }

    fn tick(&mut self) {
        self.wifi.now_ms = self.now_ms;
        self.bus.link.now_ms = self.now_ms;
        self.app.tick(
            self.now_ms,
            &mut self.wifi,
            &mut self.bus,
            &mut self.reader,
            &mut self.http,
            &mut self.outputs,
            &mut self.sink,
        );
        self.now_ms += self.tick_ms;
    }

    fn advance(&mut self, ms: u64) {
        let ticks = ms / self.tick_ms;
        for _ in 0..ticks {
            self.tick();
        }
    }
}

fn registered_body(uid: &str) -> String {
    format!("{{\"rfid_number\":\"{uid}\",\"status\":1,\"registered\":true}}")
}

// ── Read → submit → relay → actuate ───────────────────────────

#[test]
fn card_read_flows_through_to_actuator() {
    let mut rig = Rig::new(MockHttp::answering(&registered_body("04A3F2")));

    rig.reader.present(&[0x04, 0xA3, 0xF2]);
    rig.tick();

    // Exact request body, regardless of backend field ordering.
    assert_eq!(rig.http.requests.len(), 1);
    assert_eq!(rig.http.requests[0].1, "{\"rfid_number\":\"04A3F2\"}");

    // Status relayed on the control topic.
    assert_eq!(
        rig.bus.published,
        vec![("RFID_LOGIN".to_string(), "1".to_string())]
    );

    // Loop the published status back, as the shared topic does live.
    let (topic, payload) = rig.bus.published[0].clone();
    rig.bus.queue_inbound(&topic, &payload);
    rig.tick();

    assert!(rig.outputs.actuator_on);
    assert!(rig.outputs.indicator_on);
    assert!(rig.sink.events.iter().any(|e| matches!(
        e,
        AppEvent::ActuatorChanged {
            from: ActuatorCommand::Off,
            to: ActuatorCommand::On,
        }
    )));
}

#[test]
fn startup_drives_actuator_off() {
    let rig = Rig::new(MockHttp::answering(""));
    assert_eq!(rig.outputs.actuator_calls.first(), Some(&false));
    assert!(!rig.outputs.actuator_on);
}

#[test]
fn unregistered_tag_publishes_zero_and_leaves_actuator_off() {
    let mut rig = Rig::new(MockHttp::answering(
        "{\"rfid_number\":\"BEEF01\",\"registered\":false}",
    ));

    rig.reader.present(&[0xBE, 0xEF, 0x01]);
    rig.tick();

    assert_eq!(rig.bus.published[0].1, "0");

    let (topic, payload) = rig.bus.published[0].clone();
    rig.bus.queue_inbound(&topic, &payload);
    rig.tick();
    assert!(!rig.outputs.actuator_on);
}

#[test]
fn backend_status_is_passed_through_verbatim() {
    let mut rig = Rig::new(MockHttp::answering(
        "{\"rfid_number\":\"04A3F2\",\"status\":7,\"registered\":true}",
    ));

    rig.reader.present(&[0x04, 0xA3, 0xF2]);
    rig.tick();

    assert_eq!(rig.bus.published[0].1, "7");
    assert_eq!(rig.sink.published_codes(), vec![7]);
}

// ── Debounce ──────────────────────────────────────────────────

#[test]
fn held_card_is_submitted_once_per_window() {
    let mut rig = Rig::new(MockHttp::answering(&registered_body("04A3F2")));

    rig.reader.present(&[0x04, 0xA3, 0xF2]);
    rig.tick();
    assert_eq!(rig.http.requests.len(), 1);

    // Re-presented well inside the debounce window: read and halted
    // again, but not re-submitted.
    rig.advance(500);
    rig.reader.present(&[0x04, 0xA3, 0xF2]);
    rig.tick();
    assert_eq!(rig.http.requests.len(), 1);
    assert!(rig.reader.halt_count >= 2);

    // Past the window the same card goes through again.
    rig.advance(2500);
    rig.reader.present(&[0x04, 0xA3, 0xF2]);
    rig.tick();
    assert_eq!(rig.http.requests.len(), 2);
}

#[test]
fn different_card_is_not_debounced() {
    let mut rig = Rig::new(MockHttp::answering(&registered_body("04A3F2")));

    rig.reader.present(&[0x04, 0xA3, 0xF2]);
    rig.tick();
    rig.reader.present(&[0xBE, 0xEF, 0x01]);
    rig.tick();

    assert_eq!(rig.http.requests.len(), 2);
}

// ── Failure paths ─────────────────────────────────────────────

#[test]
fn unreachable_backend_drops_read_and_later_presentation_retries() {
    let mut rig = Rig::new(MockHttp::unreachable());

    rig.reader.present(&[0x04, 0xA3, 0xF2]);
    rig.tick();

    // Request attempted, nothing relayed, no verdict emitted.
    assert_eq!(rig.http.requests.len(), 1);
    assert!(rig.bus.published.is_empty());
    assert!(!rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::BackendVerdict { .. })));

    // A dropped submission must not arm the debounce window: the very
    // next presentation reaches the backend again.
    rig.http.fail = false;
    rig.http.response_body = registered_body("04A3F2");
    rig.reader.present(&[0x04, 0xA3, 0xF2]);
    rig.tick();

    assert_eq!(rig.http.requests.len(), 2);
    assert_eq!(rig.bus.published.len(), 1);
}

#[test]
fn bus_down_drops_relay_without_retry() {
    let mut rig = Rig::new(MockHttp::answering(&registered_body("04A3F2")));
    rig.bus.link.up = false;

    rig.reader.present(&[0x04, 0xA3, 0xF2]);
    rig.tick();

    assert!(rig.bus.published.is_empty());
    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::RelayDropped { code: 1 })));

    // Bus recovery does not replay the dropped status.
    rig.bus.link.up = true;
    rig.advance(1000);
    assert!(rig.bus.published.is_empty());
}

#[test]
fn rejected_publish_is_reported_as_dropped() {
    let mut rig = Rig::new(MockHttp::answering(&registered_body("04A3F2")));
    rig.bus.reject_publish = true;

    rig.reader.present(&[0x04, 0xA3, 0xF2]);
    rig.tick();

    assert!(rig
        .sink
        .events
        .iter()
        .any(|e| matches!(e, AppEvent::RelayDropped { code: 1 })));
}

// ── Control messages and commands ─────────────────────────────

#[test]
fn garbled_control_payload_fails_safe_to_off() {
    let mut rig = Rig::new(MockHttp::answering(""));

    rig.bus.queue_inbound("RFID_LOGIN", "1");
    rig.tick();
    assert!(rig.outputs.actuator_on);

    rig.bus.queue_inbound("RFID_LOGIN", "01");
    rig.tick();
    assert!(!rig.outputs.actuator_on);
}

#[test]
fn active_low_board_sees_inverted_levels_end_to_end() {
    use gatelink::adapters::outputs::{PolarityPin, RelayOutputs, SimPin};

    let config = SystemConfig::default();
    let mut outputs = RelayOutputs::new(
        PolarityPin::new(SimPin::new(), true),
        PolarityPin::new(SimPin::new(), true),
    );
    let mut app = AppService::new(&config);
    app.start(&mut outputs);

    // Startup Off must leave both coil pins electrically high.
    assert_eq!(outputs.levels(), (true, true));

    let mut wifi = MockLink::connected("wifi");
    let mut bus = MockBus::connected();
    let mut reader = MockReader::empty();
    let mut http = MockHttp::answering("");
    let mut sink = RecordingSink::new();

    bus.queue_inbound("RFID_LOGIN", "1");
    app.tick(
        0, &mut wifi, &mut bus, &mut reader, &mut http, &mut outputs, &mut sink,
    );
    assert_eq!(outputs.levels(), (false, false));

    bus.queue_inbound("RFID_LOGIN", "0");
    app.tick(
        50, &mut wifi, &mut bus, &mut reader, &mut http, &mut outputs, &mut sink,
    );
    assert_eq!(outputs.levels(), (true, true));
}

#[test]
fn foreign_topic_is_ignored() {
    let mut rig = Rig::new(MockHttp::answering(""));

    rig.bus.queue_inbound("OTHER_TOPIC", "1");
    rig.tick();
    assert!(!rig.outputs.actuator_on);
}

#[test]
fn manual_override_drives_actuator() {
    let mut rig = Rig::new(MockHttp::answering(""));

    rig.app.handle_command(
        AppCommand::SetActuator(ActuatorCommand::On),
        &mut rig.outputs,
        &mut rig.sink,
    );
    assert!(rig.outputs.actuator_on);
    assert_eq!(rig.app.actuator_state(), ActuatorCommand::On);
}

#[test]
fn runtime_config_update_rebinds_control_topic() {
    let mut rig = Rig::new(MockHttp::answering(""));

    let mut config = SystemConfig::default();
    config.control_topic = "SITE_RELAY".parse().unwrap_or_default();
    rig.app
        .handle_command(AppCommand::UpdateConfig(config), &mut rig.outputs, &mut rig.sink);

    rig.bus.queue_inbound("RFID_LOGIN", "1");
    rig.tick();
    assert!(!rig.outputs.actuator_on);

    rig.bus.queue_inbound("SITE_RELAY", "1");
    rig.tick();
    assert!(rig.outputs.actuator_on);
}
