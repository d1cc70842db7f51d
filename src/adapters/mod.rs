//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements        | Connects to                 |
//! |-------------|-------------------|-----------------------------|
//! | `wifi`      | LinkPort          | ESP-IDF WiFi STA            |
//! | `mqtt`      | LinkPort          | MQTT broker session         |
//! |             | BusPort           | control topic pub/sub       |
//! | `http`      | RequestPort       | backend REST endpoint       |
//! | `reader`    | CardReaderPort    | MFRC522 over SPI            |
//! | `outputs`   | OutputPort        | relay + indicator GPIO      |
//! | `log_sink`  | EventSink         | serial log output           |
//! | `console`   | —                 | UART0 operator commands     |
//! | `time`      | —                 | ESP32 system timer          |
//! | `device_id` | —                 | factory MAC                 |
//!
//! Every adapter is dual-target: the `espidf` paths drive hardware,
//! everything else gets a deterministic host simulation.

pub mod console;
pub mod device_id;
pub mod http;
pub mod log_sink;
pub mod mqtt;
pub mod outputs;
pub mod reader;
pub mod time;
pub mod wifi;
