//! Stable per-device identity derived from the factory MAC address.
//!
//! Used for the MQTT client id, so two readers on the same broker
//! never fight over a session.

use crate::error::{Error, Result};

const ID_PREFIX: &str = "GL-";

/// Read the station MAC address.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> Result<[u8; 6]> {
    let mut mac = [0u8; 6];
    let ret = unsafe {
        esp_idf_svc::sys::esp_read_mac(
            mac.as_mut_ptr(),
            esp_idf_svc::sys::esp_mac_type_t_ESP_MAC_WIFI_STA,
        )
    };
    if ret != esp_idf_svc::sys::ESP_OK {
        return Err(Error::Init("MAC read failed"));
    }
    Ok(mac)
}

#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> Result<[u8; 6]> {
    Ok([0x24, 0x6F, 0x28, 0x00, 0x00, 0x01])
}

/// `GL-` plus the last three MAC octets, e.g. `GL-28AB3F`.
pub fn device_id() -> Result<heapless::String<24>> {
    use core::fmt::Write;

    let mac = read_mac()?;
    let mut id = heapless::String::new();
    id.push_str(ID_PREFIX)
        .map_err(|_| Error::Init("device id overflow"))?;
    for octet in &mac[3..] {
        write!(id, "{octet:02X}").map_err(|_| Error::Init("device id overflow"))?;
    }
    Ok(id)
}
