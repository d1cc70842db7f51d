//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them — today that is the serial log sink;
//! a telemetry uplink would implement the same trait.

use crate::actuator::ActuatorCommand;

use super::ports::UidString;

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A supervised link transitioned to Connected.
    LinkUp { link: &'static str },

    /// A supervised link transitioned to Disconnected (edge-triggered,
    /// emitted exactly once per drop).
    LinkDown { link: &'static str },

    /// A card was presented and its UID read.
    CardRead { uid: UidString },

    /// The backend answered a read submission.  Fields mirror the
    /// tolerant parse: `None` means the marker was absent from the body.
    BackendVerdict {
        uid: UidString,
        status: Option<i32>,
        registered: Option<bool>,
    },

    /// The derived status was published on the control topic.
    StatusPublished { code: i32 },

    /// A derived status could not be relayed (bus down or publish
    /// rejected).  Never retried — observable here for diagnostics.
    RelayDropped { code: i32 },

    /// The actuator state machine transitioned.
    ActuatorChanged {
        from: ActuatorCommand,
        to: ActuatorCommand,
    },
}
