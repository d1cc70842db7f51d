//! Fail-safe actuator state machine.
//!
//! Interprets inbound bus messages into a binary physical command and
//! drives the relay + indicator outputs synchronously with every
//! transition.  The classification rule is deliberately strict:
//!
//! 1. payload exactly `"1"` → On, exactly `"0"` → Off;
//! 2. otherwise, the *trimmed* payload exactly `"1"` → On, `"0"` → Off;
//! 3. anything else → Off.
//!
//! The default branch is always Off, never "no change" — a malformed,
//! empty, or unexpected payload can only ever de-energise the relay.
//! Leading zeros and sign prefixes are rejected ("01" is Off), as is
//! any non-canonical numeral; an earlier firmware revision's lenient
//! `toInt()` accepted those, which left the relay On for garbage like
//! "01garbage".
//!
//! Power-on state is Off: the outputs are driven low-side before the
//! first bus message can possibly arrive.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, OutputPort};

/// Binary physical command, owned exclusively by [`ActuatorController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActuatorCommand {
    /// Fail-safe power-on default.
    #[default]
    Off,
    On,
}

/// Classify one control payload.  Pure function; exposed for property
/// tests.
pub fn classify(payload: &str) -> ActuatorCommand {
    match payload {
        "1" => ActuatorCommand::On,
        "0" => ActuatorCommand::Off,
        other => match other.trim() {
            "1" => ActuatorCommand::On,
            _ => ActuatorCommand::Off,
        },
    }
}

/// Drives the relay and indicator from bus control messages.
pub struct ActuatorController {
    control_topic: heapless::String<64>,
    state: ActuatorCommand,
}

impl ActuatorController {
    pub fn new(control_topic: &str) -> Self {
        let mut topic = heapless::String::new();
        let _ = topic.push_str(control_topic);
        Self {
            control_topic: topic,
            state: ActuatorCommand::Off,
        }
    }

    pub fn state(&self) -> ActuatorCommand {
        self.state
    }

    /// Update the control topic at runtime (hot config reload).
    pub fn set_topic(&mut self, topic: &str) {
        self.control_topic.clear();
        let _ = self.control_topic.push_str(topic);
    }

    /// Drive the power-on default (Off) out to the pins.  Called once
    /// at startup, before the first tick.
    pub fn initialise(&mut self, outputs: &mut impl OutputPort) {
        self.state = ActuatorCommand::Off;
        outputs.set_actuator(false);
        outputs.set_indicator(false);
        info!("actuator: initialised Off");
    }

    /// Handle one inbound bus message.  Messages on any other topic are
    /// ignored; messages on the control topic always resolve to a
    /// command (fail-safe Off on anything unrecognised) and drive the
    /// outputs within this call.
    pub fn on_message(
        &mut self,
        topic: &str,
        payload: &str,
        outputs: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> ActuatorCommand {
        if topic != self.control_topic.as_str() {
            return self.state;
        }

        let next = classify(payload);
        if next == ActuatorCommand::Off && payload != "0" && payload.trim() != "0" {
            warn!("actuator: unrecognised payload {:?} — failing safe to Off", payload);
        }
        self.apply(next, outputs, sink)
    }

    /// Manual override (serial console '1'/'0' during commissioning).
    pub fn set_manual(
        &mut self,
        target: ActuatorCommand,
        outputs: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> ActuatorCommand {
        info!("actuator: manual override → {:?}", target);
        self.apply(target, outputs, sink)
    }

    fn apply(
        &mut self,
        next: ActuatorCommand,
        outputs: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> ActuatorCommand {
        if next != self.state {
            info!("actuator: {:?} -> {:?}", self.state, next);
            sink.emit(&AppEvent::ActuatorChanged {
                from: self.state,
                to: next,
            });
        }
        self.state = next;

        // Physical change is observable within this call, not deferred.
        let on = next == ActuatorCommand::On;
        outputs.set_actuator(on);
        outputs.set_indicator(on);
        next
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
