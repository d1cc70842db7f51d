//! Event relay — republishes the derived status onto the bus.
//!
//! One integer field, encoded as decimal text, published on the fixed
//! control topic immediately after each backend result.  The mapping
//! from [`BackendResult`] to that integer is a single deterministic
//! rule ([`status_code`]); no caller gets to improvise its own.
//!
//! A relay message that cannot be published (bus down, broker rejected)
//! is dropped, never retried: the verdict is also observable in the
//! local diagnostics, and the next card presentation produces a fresh
//! status anyway.

use core::fmt::Write;

use log::warn;

use crate::app::ports::BusPort;
use crate::gateway::BackendResult;
use crate::link::LinkState;

/// Publishes derived status codes on the control topic.
pub struct EventRelay {
    topic: heapless::String<64>,
}

impl EventRelay {
    pub fn new(topic: &str) -> Self {
        let mut t = heapless::String::new();
        let _ = t.push_str(topic);
        Self { topic: t }
    }

    /// Update the control topic at runtime (hot config reload).
    pub fn set_topic(&mut self, topic: &str) {
        self.topic.clear();
        let _ = self.topic.push_str(topic);
    }

    /// The one status-derivation rule: pass the backend's `status`
    /// through when present, otherwise derive 1/0 from `registered`.
    /// Absent both, the result is 0 — the fail-safe direction.
    pub fn status_code(result: &BackendResult) -> i32 {
        result
            .raw_status
            .unwrap_or(i32::from(result.registered == Some(true)))
    }

    /// Publish the derived status.  Returns false — leaving all state
    /// unchanged — when the bus link is not Connected or the transport
    /// rejects the publish.
    pub fn publish(
        &mut self,
        bus: &mut impl BusPort,
        result: &BackendResult,
        link: LinkState,
    ) -> bool {
        if link != LinkState::Connected {
            return false;
        }

        let code = Self::status_code(result);
        let mut payload: heapless::String<12> = heapless::String::new();
        let _ = write!(payload, "{}", code);

        match bus.publish(self.topic.as_str(), payload.as_str()) {
            Ok(()) => true,
            Err(e) => {
                warn!("relay: publish failed ({}) — message dropped", e);
                false
            }
        }
    }
}
