//! Backend gateway — read-event submission and tolerant response parsing.
//!
//! Builds the fixed-shape request body `{"rfid_number":"<UID>"}`, POSTs
//! it under a bounded timeout, and extracts fields from the response by
//! locating fixed marker text rather than structurally parsing JSON.
//! The backend's response shape is not guaranteed stable, so absence of
//! a marker is a valid no-data outcome, never an error.
//!
//! Retry policy lives with the caller: any transport-level failure maps
//! to [`GatewayError::Unreachable`] and the read event is dropped — a
//! fresh card presentation triggers a new attempt.

use core::fmt;

use log::debug;

use crate::app::ports::{RequestPort, UidString};
use crate::config::SystemConfig;
use crate::link::LinkState;

// ───────────────────────────────────────────────────────────────
// Result of one submission
// ───────────────────────────────────────────────────────────────

/// Fields tolerantly extracted from a backend response.  `None` means
/// the marker text was absent from the body — partial responses are not
/// fatal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BackendResult {
    /// `"status":` field.  [`STATUS_SENTINEL`] when the marker is
    /// present but the delimited value does not parse as an integer.
    pub raw_status: Option<i32>,
    /// `"registered":` field, matched against the 4-character literal
    /// window `true`.
    pub registered: Option<bool>,
    /// `"rfid_number":"` field, as echoed back by the backend.
    pub echoed_uid: Option<UidString>,
}

/// Sentinel for a present-but-unparseable `status` value.
pub const STATUS_SENTINEL: i32 = -1;

/// The one gateway failure mode.  Transport errors, connect failures,
/// timeouts, and non-positive response codes all collapse into it; the
/// distinctions do not change the caller's behaviour (drop and wait for
/// a fresh presentation).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend could not be reached or did not answer in time.
    Unreachable,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable => write!(f, "backend unreachable"),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Gateway
// ───────────────────────────────────────────────────────────────

/// Issues the request/response call for a read event.
pub struct BackendGateway {
    endpoint_url: heapless::String<128>,
    request_timeout_ms: u32,
}

impl BackendGateway {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            endpoint_url: config.endpoint_url.clone(),
            request_timeout_ms: config.request_timeout_ms,
        }
    }

    /// Update endpoint and timeout at runtime (hot config reload).
    pub fn set_endpoint(&mut self, url: &str, request_timeout_ms: u32) {
        self.endpoint_url.clear();
        let _ = self.endpoint_url.push_str(url);
        self.request_timeout_ms = request_timeout_ms;
    }

    /// Submit one read event to the backend.
    ///
    /// Only meaningful while the wireless link is Connected; called with
    /// any other state it returns [`GatewayError::Unreachable`] without
    /// touching the transport.
    pub fn submit(
        &mut self,
        transport: &mut impl RequestPort,
        uid: &str,
        link: LinkState,
    ) -> Result<BackendResult, GatewayError> {
        if link != LinkState::Connected {
            return Err(GatewayError::Unreachable);
        }

        let body = serde_json::json!({ "rfid_number": uid }).to_string();
        let response = transport
            .post_json(&self.endpoint_url, &body, self.request_timeout_ms)
            .map_err(|_| GatewayError::Unreachable)?;

        if response.code <= 0 {
            return Err(GatewayError::Unreachable);
        }

        debug!("gateway: HTTP {} ({} bytes)", response.code, response.body.len());
        Ok(parse_response(&response.body))
    }
}

// ───────────────────────────────────────────────────────────────
// Tolerant extraction
// ───────────────────────────────────────────────────────────────

const UID_MARKER: &str = "\"rfid_number\":\"";
const STATUS_MARKER: &str = "\"status\":";
const REGISTERED_MARKER: &str = "\"registered\":";

/// Extract all known fields from a response body.
pub fn parse_response(body: &str) -> BackendResult {
    BackendResult {
        raw_status: extract_status(body),
        registered: extract_registered(body),
        echoed_uid: extract_uid(body),
    }
}

/// Value delimited by the closing quote after [`UID_MARKER`].
fn extract_uid(body: &str) -> Option<UidString> {
    let start = body.find(UID_MARKER)? + UID_MARKER.len();
    let rest = &body[start..];
    let end = rest.find('"')?;
    let mut out = UidString::new();
    out.push_str(&rest[..end]).ok()?;
    Some(out)
}

/// Integer after [`STATUS_MARKER`], delimited by `,` or `}` (or end of
/// body).  A value that does not parse yields [`STATUS_SENTINEL`].
fn extract_status(body: &str) -> Option<i32> {
    let start = body.find(STATUS_MARKER)? + STATUS_MARKER.len();
    let rest = &body[start..];
    let end = rest.find([',', '}']).unwrap_or(rest.len());
    Some(rest[..end].trim().parse().unwrap_or(STATUS_SENTINEL))
}

/// Exact 4-character window after [`REGISTERED_MARKER`], compared to the
/// literal `true`.  Anything else — including `"true"` with a leading
/// space — reads as false, matching the deployed backend's emission.
fn extract_registered(body: &str) -> Option<bool> {
    let start = body.find(REGISTERED_MARKER)? + REGISTERED_MARKER.len();
    let rest = &body[start..];
    let window = rest.get(..4).unwrap_or(rest);
    Some(window.trim_start().starts_with("true"))
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
