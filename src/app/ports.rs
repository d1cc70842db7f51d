//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (WiFi radio, MQTT session, HTTP client, card reader,
//! relay outputs) implement these traits.  The
//! [`AppService`](super::service::AppService) consumes them via generics,
//! so the domain core never touches hardware or sockets directly.
//!
//! Every port here is non-blocking or time-bounded: the single control
//! loop must never stall past the configured deadlines.

use core::fmt;

// ───────────────────────────────────────────────────────────────
// Card identity
// ───────────────────────────────────────────────────────────────

/// Formatted card UID: uppercase hex, zero-padded, no separators.
/// MIFARE UIDs are 4, 7, or 10 bytes, so 20 hex chars is the ceiling.
pub type UidString = heapless::String<20>;

/// Raw UID bytes as reported by the reader hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagUid {
    bytes: [u8; 10],
    len: u8,
}

impl TagUid {
    /// Build from the raw reader bytes.  Anything past 10 bytes is
    /// ignored (no MIFARE UID is longer).
    pub fn new(raw: &[u8]) -> Self {
        let mut bytes = [0u8; 10];
        let len = raw.len().min(10);
        bytes[..len].copy_from_slice(&raw[..len]);
        Self {
            bytes,
            len: len as u8,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Format as the canonical wire representation: uppercase hex,
    /// each byte zero-padded to two digits, no separators.
    pub fn to_hex(&self) -> UidString {
        use core::fmt::Write;
        let mut out = UidString::new();
        for b in self.as_bytes() {
            let _ = write!(out, "{:02X}", b);
        }
        out
    }
}

/// One physical card presentation, as seen by the control loop.
/// Transient — consumed within a single pipeline pass.
#[derive(Debug, Clone)]
pub struct TagEvent {
    pub uid: UidString,
    pub observed_at_ms: u64,
}

// ───────────────────────────────────────────────────────────────
// Link port (driven adapter: network driver → supervisor)
// ───────────────────────────────────────────────────────────────

/// One independently connectable network resource: the WiFi station
/// association, or the application-level broker session.
///
/// [`LinkSupervisor`](crate::link::LinkSupervisor) owns all retry state;
/// the driver only reports status and accepts a non-blocking connect
/// kick.  A failed attempt is observed as `is_up` staying false — there
/// is no error return on this boundary.
pub trait LinkPort {
    /// Current driver-level connection status.
    fn is_up(&mut self) -> bool;

    /// Kick off one connection attempt.  Must return promptly; the
    /// outcome is observed via [`is_up`](Self::is_up) on later ticks.
    fn start_connect(&mut self);

    /// Short label for diagnostics ("wifi", "bus").
    fn label(&self) -> &'static str;
}

// ───────────────────────────────────────────────────────────────
// Card reader port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the proximity-card reader.
pub trait CardReaderPort {
    /// Poll once for a newly presented card.  Returns `None` when no
    /// new card is in the field.  Must not block.
    fn card_present(&mut self) -> Option<TagUid>;

    /// Halt the card and reset the reader's crypto unit.  Called once
    /// after every successful [`card_present`](Self::card_present), so
    /// the same physical presentation is not re-reported every poll.
    fn halt(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Request/response transport (driven adapter: domain → backend)
// ───────────────────────────────────────────────────────────────

/// Response from the request/response transport.  `code` follows the
/// HTTP-client convention: positive values are HTTP status codes,
/// non-positive values are client-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub code: i32,
    pub body: String,
}

/// Blocking-but-bounded POST transport.  The call may stall up to
/// `timeout_ms`, never longer — this is one of the two sanctioned
/// suspension points in the whole loop (the other is link connect).
pub trait RequestPort {
    fn post_json(
        &mut self,
        url: &str,
        body: &str,
        timeout_ms: u32,
    ) -> Result<HttpResponse, TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Publish/subscribe bus (driven adapter: domain ↔ broker)
// ───────────────────────────────────────────────────────────────

/// One inbound bus message.  Payloads on the control topic are a single
/// decimal status digit in practice; 32 bytes leaves margin for garbage
/// that the actuator classifier must still handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: heapless::String<64>,
    pub payload: heapless::String<32>,
}

/// Publish/subscribe port.  Inbound messages arrive asynchronously and
/// are buffered by the adapter; the control loop drains them once per
/// tick via [`next_message`](Self::next_message).
pub trait BusPort {
    /// Publish a payload on a topic.  Not retried on failure.
    fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError>;

    /// Pop the next buffered inbound message, if any.  Must not block.
    fn next_message(&mut self) -> Option<BusMessage>;
}

// ───────────────────────────────────────────────────────────────
// Digital output port (driven adapter: domain → relay + indicator)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the two logical outputs.  Levels here are
/// *logical* (true = energised); the concrete adapter maps them to
/// electrical High/Low according to the configured polarity.
pub trait OutputPort {
    fn set_actuator(&mut self, on: bool);
    fn set_indicator(&mut self, on: bool);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go (serial log today;
/// a telemetry uplink would implement the same trait).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`RequestPort`] and [`BusPort`] operations.  All of them
/// are transient from the domain's point of view — the read event or
/// relay message is dropped and a fresh presentation retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// TCP connect to the peer failed.
    ConnectFailed,
    /// The bounded wait expired before a response arrived.
    Timeout,
    /// Generic I/O error from the underlying client.
    Io,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectFailed => write!(f, "connect failed"),
            Self::Timeout => write!(f, "timed out"),
            Self::Io => write!(f, "I/O error"),
        }
    }
}
