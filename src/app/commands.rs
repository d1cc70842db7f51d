//! Inbound commands to the application service.
//!
//! These represent actions requested by the outside world (serial
//! console, future provisioning channel) that the
//! [`AppService`](super::service::AppService) interprets and acts upon.

use crate::actuator::ActuatorCommand;
use crate::config::SystemConfig;

/// Commands that external adapters can send into the application core.
#[derive(Debug, Clone)]
pub enum AppCommand {
    /// Manually force the actuator On or Off, bypassing the bus.  Used
    /// for commissioning via the serial console ('1'/'0').
    SetActuator(ActuatorCommand),

    /// Hot-reload tunable configuration (debounce window, timeouts,
    /// retry interval, topic).  Link sessions are not restarted.
    UpdateConfig(SystemConfig),
}
