//! GPIO / peripheral pin assignments for the GateLink board.
//!
//! Single source of truth — every adapter references this module rather
//! than hard-coding pin numbers.  Change a pin here and it propagates
//! everywhere.  Assignments match the deployed ESP32 DevKit wiring.

// ---------------------------------------------------------------------------
// MFRC522 card reader (SPI2 / VSPI)
// ---------------------------------------------------------------------------

/// SPI chip select for the MFRC522.
pub const READER_SS_GPIO: i32 = 5;
/// MFRC522 hard reset line.
pub const READER_RST_GPIO: i32 = 0;
/// SPI clock.
pub const SPI_SCK_GPIO: i32 = 18;
/// SPI MISO.
pub const SPI_MISO_GPIO: i32 = 19;
/// SPI MOSI.
pub const SPI_MOSI_GPIO: i32 = 23;

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Relay coil driver.  Electrical polarity is a deployment choice —
/// see `SystemConfig::outputs_active_low`.
pub const RELAY_GPIO: i32 = 27;
/// On-board indicator LED, driven in lockstep with the relay.
pub const INDICATOR_GPIO: i32 = 2;
