//! Port traits: the boundary between the wake cycle and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ CycleService (domain)
//! ```
//!
//! Driven adapters (EZO circuit, statsd socket, RTC memory, identity,
//! power management, event sinks) implement these traits. The
//! [`CycleService`](super::service::CycleService) consumes them via
//! generics, so the cycle never touches hardware directly.

use crate::chip::ChipDescriptor;
use crate::chip::response::ChipResponse;
use crate::config::SystemConfig;
use crate::error::{BusError, PublishError, RetainedError};
use crate::retained::{DeviceId, RetainedState};

// ───────────────────────────────────────────────────────────────
// Probe port (driven adapter: EZO circuit ↔ domain)
// ───────────────────────────────────────────────────────────────

/// Command sequences for one circuit.
pub trait ProbePort {
    /// Purge stale output before a reading is trusted.
    fn wake(&mut self, chip: &ChipDescriptor) -> Result<(), BusError>;

    /// Take one reading and store it in `chip.last_response`.
    fn measure(&mut self, chip: &mut ChipDescriptor) -> Result<ChipResponse, BusError>;

    /// Put the circuit into low-power mode.
    fn sleep(&mut self, chip: &ChipDescriptor) -> Result<(), BusError>;

    /// Switch the circuit's indicator LED.
    fn set_led(&mut self, chip: &ChipDescriptor, on: bool) -> Result<(), BusError>;
}

// ───────────────────────────────────────────────────────────────
// Publish port (driven adapter: domain → statsd collector)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget metric output.
pub trait PublishPort {
    /// Send `value` as the gauge for `device_id`. No retry.
    fn publish(&mut self, device_id: &str, value: &str) -> Result<(), PublishError>;
}

// ───────────────────────────────────────────────────────────────
// Retained-state port (driven adapter: domain ↔ RTC memory)
// ───────────────────────────────────────────────────────────────

/// Load at wake, save before power-down.
pub trait RetainedStore {
    fn load(&mut self) -> Result<RetainedState, RetainedError>;
    fn save(&mut self, state: &RetainedState);
}

// ───────────────────────────────────────────────────────────────
// Identity port
// ───────────────────────────────────────────────────────────────

/// Source of the device identifier. Only queried when the retained
/// cache is empty.
pub trait IdentityPort {
    fn device_id(&mut self) -> DeviceId;
}

// ───────────────────────────────────────────────────────────────
// Power port
// ───────────────────────────────────────────────────────────────

/// Why the CPU is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// Cold boot or reset.
    PowerOn,
    /// Deep-sleep timer expired.
    Timer,
    /// Any other wake source.
    Other,
}

pub trait PowerPort {
    fn wake_reason(&self) -> WakeReason;

    /// Suspend for `secs`. On hardware this does not return; execution
    /// restarts from reset with only retained memory intact.
    fn power_down(&mut self, secs: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The cycle emits structured [`CycleEvent`](super::events::CycleEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::CycleEvent);
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ flash)
// ───────────────────────────────────────────────────────────────

/// Persistent [`SystemConfig`] storage.
///
/// `save` runs [`validate_config`](crate::config::validate_config) first;
/// out-of-range values are refused, never clamped.
pub trait ConfigPort {
    /// Stored config, or [`SystemConfig::default()`] when nothing is stored.
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored bytes do not decode.
    Corrupted,
    /// Names the offending field and its allowed range.
    ValidationFailed(&'static str),
    /// Storage backend refused the operation.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => f.write_str("stored config does not decode"),
            Self::ValidationFailed(why) => write!(f, "invalid config: {}", why),
            Self::IoError => f.write_str("config storage error"),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(match e {
            ConfigError::ValidationFailed(why) => why,
            ConfigError::Corrupted => "stored config does not decode",
            ConfigError::IoError => "config storage error",
        })
    }
}
