//! Link supervision through the full service loop: retry pacing,
//! drop/recover cycles, and pipeline gating while the radio is down.

use gatelink::app::events::AppEvent;
use gatelink::app::service::AppService;
use gatelink::config::SystemConfig;
use gatelink::link::LinkState;

use crate::mock_hw::{MockBus, MockHttp, MockLink, MockOutputs, MockReader, RecordingSink};

const TICK_MS: u64 = 50;

struct Rig {
    app: AppService,
    wifi: MockLink,
    bus: MockBus,
    reader: MockReader,
    http: MockHttp,
    outputs: MockOutputs,
    sink: RecordingSink,
    now_ms: u64,
}

impl Rig {
    fn new() -> Self {
        let config = SystemConfig::default();
        let mut app = AppService::new(&config);
        let mut outputs = MockOutputs::default();
        app.start(&mut outputs);
        Self {
            app,
            wifi: MockLink::new("wifi"),
            bus: MockBus::connected(),
            reader: MockReader::empty(),
            http: MockHttp::answering(""),
            outputs,
            sink: RecordingSink::new(),
            now_ms: 0,
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
        self.now_ms += TICK_MS;
    }

    fn run_for(&mut self, ms: u64) {
        for _ in 0..ms / TICK_MS {
            self.tick();
        }
    }
}

#[test]
fn wifi_attempts_are_rate_limited() {
    let mut rig = Rig::new();

    // Radio never associates: 12 s of ticking at the default 5 s retry
    // interval yields exactly three attempts.
    rig.run_for(12_000);
    assert_eq!(rig.wifi.connect_attempts, vec![0, 5000, 10_000]);
}

#[test]
fn pipeline_is_gated_while_wifi_is_down() {
    let mut rig = Rig::new();
    rig.reader.present(&[0x04, 0xA3, 0xF2]);

    rig.run_for(1000);

    // The reader must not even be polled without the radio.
    assert!(rig.http.requests.is_empty());
    assert_eq!(rig.reader.halt_count, 0);
    assert!(rig.bus.link.connect_attempts.is_empty());
}

#[test]
fn bus_supervision_starts_once_wifi_is_up() {
    let mut rig = Rig::new();
    rig.bus.link.up = false;

    rig.run_for(500);
    assert!(rig.bus.link.connect_attempts.is_empty());

    rig.wifi.up = true;
    rig.run_for(500);
    assert!(!rig.bus.link.connect_attempts.is_empty());
}

#[test]
fn wifi_drop_is_edge_logged_and_recovery_resumes_pipeline() {
    let mut rig = Rig::new();
    rig.wifi.up = true;
    rig.run_for(500);
    assert_eq!(rig.app.wifi_state(), LinkState::Connected);

    // Hold the drop for many ticks: exactly one LinkDown event.
    rig.wifi.up = false;
    rig.run_for(2000);
    assert_eq!(rig.sink.count_link_down("wifi"), 1);
    assert_ne!(rig.app.wifi_state(), LinkState::Connected);

    // Recovery, then a card flows end to end again.
    rig.wifi.up = true;
    rig.http.response_body =
        "{\"rfid_number\":\"04A3F2\",\"status\":1,\"registered\":true}".to_string();
    rig.reader.present(&[0x04, 0xA3, 0xF2]);
    rig.run_for(500);

    assert_eq!(rig.app.wifi_state(), LinkState::Connected);
    assert_eq!(rig.http.requests.len(), 1);
    assert_eq!(rig.sink.published_codes(), vec![1]);
}

#[test]
fn reconnect_attempt_after_drop_is_immediate() {
    let mut rig = Rig::new();
    rig.wifi.up = true;
    rig.run_for(200);
    assert!(rig.wifi.connect_attempts.is_empty());

    // The drop must not inherit the pre-connect retry clock: the next
    // attempt lands on the very next tick, not an interval later.
    rig.wifi.up = false;
    let drop_seen_at = rig.now_ms;
    rig.run_for(200);

    let first_attempt = rig.wifi.connect_attempts[0];
    assert!(first_attempt <= drop_seen_at + TICK_MS);
}

#[test]
fn bus_drop_does_not_take_down_wifi_supervision() {
    let mut rig = Rig::new();
    rig.wifi.up = true;
    rig.run_for(200);

    rig.bus.link.up = false;
    rig.run_for(2000);

    assert_eq!(rig.app.wifi_state(), LinkState::Connected);
    assert_eq!(rig.sink.count_link_down("bus"), 1);
    assert_eq!(rig.sink.count_link_down("wifi"), 0);

    rig.bus.link.up = true;
    rig.run_for(200);
    assert_eq!(rig.app.bus_state(), LinkState::Connected);

    // Exactly two LinkUp edges for the bus: initial and recovery.
    let bus_ups = rig
        .sink
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::LinkUp { link: "bus" }))
        .count();
    assert_eq!(bus_ups, 2);
}
