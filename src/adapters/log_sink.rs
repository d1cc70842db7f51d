//! Event sink that renders application events onto the serial log.
//!
//! The deployed units are diagnosed over a serial console, so the
//! lines follow the operator-facing format the field techs grep for:
//! one `PREFIX | fields` line per event.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::gateway::STATUS_SENTINEL;

#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::LinkUp { link } => info!("LINK | {link} | up"),
            AppEvent::LinkDown { link } => warn!("LINK | {link} | down"),
            AppEvent::CardRead { uid } => info!("READ | {uid}"),
            AppEvent::BackendVerdict {
                uid,
                status,
                registered,
            } => {
                let verdict = match registered {
                    Some(true) => "FOUND",
                    Some(false) => "NOT FOUND",
                    None => "UNKNOWN",
                };
                let code = status.unwrap_or(STATUS_SENTINEL);
                info!("VERDICT | {uid} | status={code} | {verdict}");
            }
            AppEvent::StatusPublished { code } => info!("RELAY | published {code}"),
            AppEvent::RelayDropped { code } => warn!("RELAY | dropped {code} (bus down)"),
            AppEvent::ActuatorChanged { from, to } => {
                info!("ACTUATOR | {from:?} -> {to:?}");
            }
        }
    }
}
