//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements         | Connects to                   |
//! |-------------|--------------------|-------------------------------|
//! | `device_id` | IdentityPort       | eFuse base MAC                |
//! | `log_sink`  | EventSink          | Serial log output             |
//! | `nvs`       | ConfigPort         | NVS / in-memory store         |
//! | `power`     | PowerPort          | ESP32 deep sleep / wake cause |
//! | `rtc_store` | RetainedStore      | RTC slow memory               |
//! | `sim_probe` | embedded-hal I2c   | Simulated EZO pH circuit      |
//! | `statsd`    | PublishPort        | UDP statsd collector          |
//! | `time`      | embedded-hal Delay | ESP32 system timer / host     |
//! | `wifi`      | ConnectivityPort   | ESP-IDF WiFi STA              |
//!
//! `ProbePort` itself is implemented in [`crate::chip::controller`]; the
//! bus underneath is `esp_idf_hal::i2c::I2cDriver` on the device and
//! [`sim_probe::SimPhCircuit`] on the host.

pub mod device_id;
pub mod log_sink;
pub mod nvs;
pub mod power;
pub mod rtc_store;
#[cfg(not(target_os = "espidf"))]
pub mod sim_probe;
pub mod statsd;
pub mod time;
pub mod wifi;
