//! Serial console commands.
//!
//! Field techs on the bench can force the actuator from a terminal:
//! `1` energises it, `0` releases it.  On hardware this polls the
//! UART0 console; host builds have no console and always return
//! nothing.

use crate::actuator::ActuatorCommand;
use crate::app::commands::AppCommand;

#[derive(Default)]
pub struct SerialConsole;

impl SerialConsole {
    pub fn new() -> Self {
        Self
    }

    /// Poll for one pending command.  Non-blocking.
    pub fn poll(&mut self) -> Option<AppCommand> {
        self.platform_read_byte().and_then(|byte| match byte {
            b'1' => Some(AppCommand::SetActuator(ActuatorCommand::On)),
            b'0' => Some(AppCommand::SetActuator(ActuatorCommand::Off)),
            _ => None,
        })
    }

    /// Install the UART0 driver.  Must run once before the first poll.
    #[cfg(target_os = "espidf")]
    pub fn install() -> crate::error::Result<()> {
        let ret = unsafe {
            esp_idf_svc::sys::uart_driver_install(0, 256, 0, 0, core::ptr::null_mut(), 0)
        };
        if ret != esp_idf_svc::sys::ESP_OK {
            return Err(crate::error::Error::Init("UART0 driver install failed"));
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_read_byte(&mut self) -> Option<u8> {
        let mut byte = 0u8;
        // Zero tick timeout keeps the control loop non-blocking.
        let read = unsafe {
            esp_idf_svc::sys::uart_read_bytes(0, (&mut byte as *mut u8).cast(), 1, 0)
        };
        (read == 1).then_some(byte)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_read_byte(&mut self) -> Option<u8> {
        None
    }
}
