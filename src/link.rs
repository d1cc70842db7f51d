//! Link supervision engine.
//!
//! One [`LinkSupervisor`] instance per network resource (WiFi station,
//! broker session).  The supervisor owns all connect/retry bookkeeping;
//! the underlying driver is injected at each tick through
//! [`LinkPort`](crate::app::ports::LinkPort), which keeps the supervisor
//! independently testable and reusable across both links.
//!
//! ```text
//!                 driver up
//!   Disconnected ──────────────────────────▶ Connected
//!        │  ▲                                   │
//!        │  │ deadline elapsed                  │ driver down
//!        ▼  │ (silent)                          ▼ (logged once)
//!   Connecting ◀── retry interval elapsed ── Disconnected
//! ```
//!
//! The rate limit is the core invariant: no two connection attempts are
//! ever issued less than `retry_interval_ms` apart, preventing
//! busy-reconnect storms on a flapping link.  Reconnection is perpetual
//! by design — there is no attempt-count ceiling on an always-on field
//! device.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, LinkPort};

/// Connection state of one supervised link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Disconnected,
    Connecting,
    Connected,
}

/// Owns connect/retry state for one network resource.
pub struct LinkSupervisor {
    label: &'static str,
    state: LinkState,
    /// `None` after a successful connect — retry bookkeeping is reset so
    /// the first attempt after a drop is immediate.
    last_attempt_ms: Option<u64>,
    attempt_started_ms: u64,
    retry_interval_ms: u32,
    attempt_deadline_ms: u32,
}

impl LinkSupervisor {
    pub fn new(label: &'static str, retry_interval_ms: u32, attempt_deadline_ms: u32) -> Self {
        Self {
            label,
            state: LinkState::Disconnected,
            last_attempt_ms: None,
            attempt_started_ms: 0,
            retry_interval_ms,
            attempt_deadline_ms,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Update retry tunables at runtime (hot config reload).
    pub fn set_intervals(&mut self, retry_interval_ms: u32, attempt_deadline_ms: u32) {
        self.retry_interval_ms = retry_interval_ms;
        self.attempt_deadline_ms = attempt_deadline_ms;
    }

    /// Advance the supervisor by one tick.
    ///
    /// Never blocks: the driver's connect primitive is a kick whose
    /// outcome is observed on later ticks, bounded by
    /// `attempt_deadline_ms`.
    pub fn tick(
        &mut self,
        now_ms: u64,
        driver: &mut impl LinkPort,
        sink: &mut impl EventSink,
    ) -> LinkState {
        if driver.is_up() {
            if self.state != LinkState::Connected {
                info!("{}: link up", self.label);
                sink.emit(&AppEvent::LinkUp { link: self.label });
                self.state = LinkState::Connected;
                self.last_attempt_ms = None;
            }
            return self.state;
        }

        match self.state {
            LinkState::Connected => {
                // Edge-triggered: logged and emitted exactly once.
                warn!("{}: link down", self.label);
                sink.emit(&AppEvent::LinkDown { link: self.label });
                self.state = LinkState::Disconnected;
            }
            LinkState::Connecting => {
                if now_ms.saturating_sub(self.attempt_started_ms) >= self.attempt_deadline_ms as u64
                {
                    // A failed attempt is silent at the call site; it is
                    // retried on the next eligible tick.
                    debug!("{}: connect attempt timed out", self.label);
                    self.state = LinkState::Disconnected;
                }
            }
            LinkState::Disconnected => {}
        }

        if self.state == LinkState::Disconnected && self.attempt_eligible(now_ms) {
            info!("{}: connect attempt", self.label);
            self.last_attempt_ms = Some(now_ms);
            self.attempt_started_ms = now_ms;
            driver.start_connect();
            self.state = LinkState::Connecting;
        }

        self.state
    }

    fn attempt_eligible(&self, now_ms: u64) -> bool {
        match self.last_attempt_ms {
            None => true,
            Some(t) => now_ms.saturating_sub(t) >= self.retry_interval_ms as u64,
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
