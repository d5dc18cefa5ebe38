//! System configuration parameters
//!
//! All tunable parameters for the aqpncs probe. Defaults are compiled in;
//! a stored copy in NVS overrides them (see [`NvsConfigStore`]).
//!
//! EZO protocol timings and response sizes are deliberately absent: they
//! are fixed by the circuit firmware and live in [`crate::chip`].
//!
//! [`NvsConfigStore`]: crate::adapters::nvs::NvsConfigStore

use std::net::{Ipv4Addr, SocketAddrV4};

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Default I2C address of the EZO pH circuit.
pub const DEFAULT_PH_ADDRESS: u8 = 0x63;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Probe ---
    /// 7-bit I2C address of the pH circuit.
    pub chip_address: u8,
    /// Light the circuit LED while measuring.
    pub debug_led: bool,

    // --- Publishing ---
    /// statsd collector IPv4 address.
    pub statsd_ip: [u8; 4],
    /// statsd collector UDP port.
    pub statsd_port: u16,
    /// Metric namespace, the first dotted component of every gauge.
    pub metric_namespace: heapless::String<16>,
    /// Minimum change (pH units) before a new value is published.
    pub publish_threshold: f32,

    // --- Power ---
    /// Deep-sleep period between cycles (seconds).
    pub sleep_secs: u32,

    // --- Diagnostics ---
    /// Log at debug level instead of info.
    pub verbose: bool,

    // --- WiFi ---
    pub wifi_ssid: heapless::String<32>,
    pub wifi_password: heapless::String<64>,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Probe
            chip_address: DEFAULT_PH_ADDRESS,
            debug_led: false,

            // Publishing
            statsd_ip: [192, 168, 1, 100],
            statsd_port: 8888,
            metric_namespace: bounded("aqpncs"),
            publish_threshold: 0.05,

            // Power
            sleep_secs: 60,

            // Diagnostics
            verbose: false,

            // WiFi (baked in at build time, overridable via NVS)
            wifi_ssid: bounded(option_env!("AQPNCS_WIFI_SSID").unwrap_or("")),
            wifi_password: bounded(option_env!("AQPNCS_WIFI_PASSWORD").unwrap_or("")),
        }
    }
}

impl SystemConfig {
    /// Socket address of the statsd collector.
    pub fn statsd_addr(&self) -> SocketAddrV4 {
        let [a, b, c, d] = self.statsd_ip;
        SocketAddrV4::new(Ipv4Addr::new(a, b, c, d), self.statsd_port)
    }
}

/// Range-check every field. Called before persisting and after loading.
pub fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    if cfg.chip_address > 0x7F {
        return Err(ConfigError::ValidationFailed(
            "chip_address must be a 7-bit address",
        ));
    }
    if cfg.statsd_port == 0 {
        return Err(ConfigError::ValidationFailed("statsd_port must be non-zero"));
    }
    if Ipv4Addr::from(cfg.statsd_ip).is_unspecified() {
        return Err(ConfigError::ValidationFailed("statsd_ip must not be 0.0.0.0"));
    }
    if cfg.metric_namespace.is_empty()
        || !cfg
            .metric_namespace
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(ConfigError::ValidationFailed(
            "metric_namespace must be non-empty [A-Za-z0-9_-]",
        ));
    }
    if !(0.0..=14.0).contains(&cfg.publish_threshold) {
        return Err(ConfigError::ValidationFailed(
            "publish_threshold must be 0.0..=14.0",
        ));
    }
    if !(10..=86_400).contains(&cfg.sleep_secs) {
        return Err(ConfigError::ValidationFailed("sleep_secs must be 10..=86400"));
    }
    Ok(())
}

/// Copy `s` into a fixed-capacity string, truncating at capacity.
pub(crate) fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
