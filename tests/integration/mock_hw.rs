//! Mock adapters for integration tests.
//!
//! Each mock records its full call history so tests can assert on the
//! exact sequence of interactions without real radios or GPIO.

use gatelink::app::events::AppEvent;
use gatelink::app::ports::{
    BusMessage, BusPort, CardReaderPort, EventSink, HttpResponse, LinkPort, OutputPort,
    RequestPort, TagUid, TransportError,
};

// ── MockLink ──────────────────────────────────────────────────

/// Scriptable link: tests flip `up` to model association and drops,
/// and read `connect_attempts` to check retry pacing.
pub struct MockLink {
    pub label: &'static str,
    pub up: bool,
    pub connect_attempts: Vec<u64>,
    pub now_ms: u64,
}

#[allow(dead_code)]
impl MockLink {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            up: false,
            connect_attempts: Vec::new(),
            now_ms: 0,
        }
    }

    /// An always-up link, for tests that exercise the pipeline rather
    /// than supervision.
    pub fn connected(label: &'static str) -> Self {
        let mut link = Self::new(label);
        link.up = true;
        link
    }
}

impl LinkPort for MockLink {
    fn is_up(&mut self) -> bool {
        self.up
    }

    fn start_connect(&mut self) {
        self.connect_attempts.push(self.now_ms);
    }

    fn label(&self) -> &'static str {
        self.label
    }
}

// ── MockBus ───────────────────────────────────────────────────

/// Link + bus in one, like the real broker adapter.  Inbound messages
/// are queued by the test; published messages are recorded.
pub struct MockBus {
    pub link: MockLink,
    pub published: Vec<(String, String)>,
    pub inbound: std::collections::VecDeque<BusMessage>,
    pub reject_publish: bool,
}

#[allow(dead_code)]
impl MockBus {
    pub fn connected() -> Self {
        Self {
            link: MockLink::connected("bus"),
            published: Vec::new(),
            inbound: std::collections::VecDeque::new(),
            reject_publish: false,
        }
    }

    pub fn queue_inbound(&mut self, topic: &str, payload: &str) {
        let mut t = heapless::String::new();
        let _ = t.push_str(topic);
        let mut p = heapless::String::new();
        let _ = p.push_str(payload);
        self.inbound.push_back(BusMessage {
            topic: t,
            payload: p,
        });
    }
}

impl LinkPort for MockBus {
    fn is_up(&mut self) -> bool {
        self.link.is_up()
    }

    fn start_connect(&mut self) {
        self.link.start_connect();
    }

    fn label(&self) -> &'static str {
        self.link.label()
    }
}

impl BusPort for MockBus {
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        if self.reject_publish {
            return Err(TransportError::Io);
        }
        self.published.push((topic.to_string(), payload.to_string()));
        Ok(())
    }

    fn next_message(&mut self) -> Option<BusMessage> {
        self.inbound.pop_front()
    }
}

// ── MockHttp ──────────────────────────────────────────────────

/// Canned backend.  Records every request body; answers with the
/// queued response, or connection failure when `fail` is set.
pub struct MockHttp {
    pub requests: Vec<(String, String)>,
    pub response_body: String,
    pub response_code: i32,
    pub fail: bool,
}

#[allow(dead_code)]
impl MockHttp {
    pub fn answering(body: &str) -> Self {
        Self {
            requests: Vec::new(),
            response_body: body.to_string(),
            response_code: 200,
            fail: false,
        }
    }

    pub fn unreachable() -> Self {
        let mut http = Self::answering("");
        http.fail = true;
        http
    }
}

impl RequestPort for MockHttp {
    fn post_json(
        &mut self,
        url: &str,
        body: &str,
        _timeout_ms: u32,
    ) -> Result<HttpResponse, TransportError> {
        self.requests.push((url.to_string(), body.to_string()));
        if self.fail {
            return Err(TransportError::ConnectFailed);
        }
        Ok(HttpResponse {
            code: self.response_code,
            body: self.response_body.clone(),
        })
    }
}

// ── MockReader ────────────────────────────────────────────────

/// A card placed on the mock answers until halted, like a real tag.
pub struct MockReader {
    pub card: Option<TagUid>,
    pub halted: bool,
    pub halt_count: usize,
}

#[allow(dead_code)]
impl MockReader {
    pub fn empty() -> Self {
        Self {
            card: None,
            halted: false,
            halt_count: 0,
        }
    }

    pub fn present(&mut self, bytes: &[u8]) {
        self.card = Some(TagUid::new(bytes));
        self.halted = false;
    }

    pub fn remove(&mut self) {
        self.card = None;
    }
}

impl CardReaderPort for MockReader {
    fn card_present(&mut self) -> Option<TagUid> {
        if self.halted {
            return None;
        }
        self.card
    }

    fn halt(&mut self) {
        self.halted = true;
        self.halt_count += 1;
    }
}

// ── MockOutputs ───────────────────────────────────────────────

#[derive(Default)]
pub struct MockOutputs {
    pub actuator_on: bool,
    pub indicator_on: bool,
    pub actuator_calls: Vec<bool>,
}

impl OutputPort for MockOutputs {
    fn set_actuator(&mut self, on: bool) {
        self.actuator_on = on;
        self.actuator_calls.push(on);
    }

    fn set_indicator(&mut self, on: bool) {
        self.indicator_on = on;
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_link_down(&self, label: &str) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AppEvent::LinkDown { link } if *link == label))
            .count()
    }

    pub fn published_codes(&self) -> Vec<i32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                AppEvent::StatusPublished { code } => Some(*code),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
